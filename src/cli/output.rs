//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map service errors to a single line: `error[kind]: message`.
pub fn map_error(e: &ApiError) -> String {
    format!("error[{}]: {}", e.kind(), e)
}
