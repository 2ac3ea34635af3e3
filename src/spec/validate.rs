//! Spec Validator
//!
//! Structural validation of raw JSON graph requests. The whole request is rejected on
//! the first defect; nothing is partially accepted.

use super::{DegreeConstraint, GraphSpec, GraphType, WeightRange};
use crate::error::{ApiError, SpecError};
use crate::limits::Limits;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const COMMON_FIELDS: &[&str] = &[
    "type",
    "nodes",
    "connected",
    "weighted",
    "seed",
    "weight_min",
    "weight_max",
];
const MODE_FIELDS: &[&str] = &["node_degree", "node_degree_max", "node_degree_average"];

/// Weight range applied when a weighted request omits its bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightDefaults {
    pub min: u32,
    pub max: u32,
}

impl Default for WeightDefaults {
    fn default() -> Self {
        Self { min: 1, max: 100 }
    }
}

/// Validate a raw request body into a canonical [`GraphSpec`].
///
/// Checks, in order: object shape, unknown fields, `type`, fields allowed for the mode,
/// then each value's type and range. `nodes` above `limits.max_nodes` is reported as
/// [`ApiError::LimitExceeded`]; every other defect as [`ApiError::Validation`].
pub fn validate(
    raw: &Value,
    limits: &Limits,
    weight_defaults: &WeightDefaults,
) -> Result<GraphSpec, ApiError> {
    let body = raw.as_object().ok_or(SpecError::NotAnObject)?;

    if let Some(unknown) = body
        .keys()
        .find(|key| !COMMON_FIELDS.contains(&key.as_str()) && !MODE_FIELDS.contains(&key.as_str()))
    {
        return Err(SpecError::UnknownField(unknown.clone()).into());
    }

    let graph_type = match body.get("type") {
        None => return Err(SpecError::MissingField("type").into()),
        Some(Value::String(name)) => {
            GraphType::parse(name).ok_or_else(|| SpecError::UnknownGraphType(name.clone()))?
        }
        Some(_) => {
            return Err(SpecError::InvalidType {
                field: "type",
                expected: "a string",
            }
            .into())
        }
    };

    let allowed = mode_fields(graph_type);
    if let Some(field) = MODE_FIELDS
        .iter()
        .find(|field| body.contains_key(**field) && !allowed.contains(*field))
    {
        return Err(SpecError::FieldNotAllowed {
            field: (*field).to_string(),
            graph_type: graph_type.to_string(),
        }
        .into());
    }

    let nodes = required_count(body, "nodes")?;
    if nodes == 0 {
        return Err(SpecError::InvalidValue {
            field: "nodes",
            reason: "must be positive".to_string(),
        }
        .into());
    }
    if nodes > limits.max_nodes {
        return Err(ApiError::LimitExceeded {
            field: "nodes",
            value: nodes,
            limit: limits.max_nodes,
        });
    }

    let connected = optional_bool(body, "connected")?.unwrap_or(false);
    let weighted = optional_bool(body, "weighted")?.unwrap_or(false);
    let seed = optional_seed(body)?;

    let constraint = match graph_type {
        GraphType::ExactDegree => DegreeConstraint::Exact {
            degree: required_count(body, "node_degree")?,
        },
        GraphType::BetweenDegree => {
            let min = required_count(body, "node_degree")?;
            let max = required_count(body, "node_degree_max")?;
            if max <= min {
                return Err(SpecError::InvalidValue {
                    field: "node_degree_max",
                    reason: format!("must exceed node_degree ({})", min),
                }
                .into());
            }
            DegreeConstraint::Between { min, max }
        }
        GraphType::AverageDegree => DegreeConstraint::Average {
            average: required_average(body)?,
        },
    };

    let weights = weight_range(body, weighted, weight_defaults)?;

    Ok(GraphSpec {
        nodes,
        constraint,
        connected,
        weights,
        seed,
    })
}

fn mode_fields(graph_type: GraphType) -> &'static [&'static str] {
    match graph_type {
        GraphType::ExactDegree => &["node_degree"],
        GraphType::BetweenDegree => &["node_degree", "node_degree_max"],
        GraphType::AverageDegree => &["node_degree_average"],
    }
}

/// Non-negative integer field. Floats are rejected even when integral.
fn count(value: &Value, field: &'static str) -> Result<u64, SpecError> {
    if let Some(v) = value.as_u64() {
        return Ok(v);
    }
    if value.as_i64().is_some() {
        return Err(SpecError::InvalidValue {
            field,
            reason: "must not be negative".to_string(),
        });
    }
    Err(SpecError::InvalidType {
        field,
        expected: "an integer",
    })
}

fn required_count(body: &Map<String, Value>, field: &'static str) -> Result<u64, SpecError> {
    let value = body.get(field).ok_or(SpecError::MissingField(field))?;
    count(value, field)
}

fn optional_bool(body: &Map<String, Value>, field: &'static str) -> Result<Option<bool>, SpecError> {
    match body.get(field) {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(SpecError::InvalidType {
            field,
            expected: "a boolean",
        }),
    }
}

fn optional_seed(body: &Map<String, Value>) -> Result<Option<i64>, SpecError> {
    let Some(value) = body.get("seed") else {
        return Ok(None);
    };
    if let Some(seed) = value.as_i64() {
        return Ok(Some(seed));
    }
    if value.as_u64().is_some() {
        return Err(SpecError::InvalidValue {
            field: "seed",
            reason: "must fit in a signed 64-bit integer".to_string(),
        });
    }
    Err(SpecError::InvalidType {
        field: "seed",
        expected: "an integer",
    })
}

fn required_average(body: &Map<String, Value>) -> Result<f64, SpecError> {
    let field = "node_degree_average";
    let average = body
        .get(field)
        .ok_or(SpecError::MissingField(field))?
        .as_f64()
        .ok_or(SpecError::InvalidType {
            field,
            expected: "a number",
        })?;
    if !average.is_finite() || average < 0.0 {
        return Err(SpecError::InvalidValue {
            field,
            reason: "must be a non-negative number".to_string(),
        });
    }
    Ok(average)
}

fn weight_bound(
    body: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<u32>, SpecError> {
    let Some(value) = body.get(field) else {
        return Ok(None);
    };
    let bound = count(value, field)?;
    if bound == 0 {
        return Err(SpecError::InvalidValue {
            field,
            reason: "weights must be positive".to_string(),
        });
    }
    u32::try_from(bound).map(Some).map_err(|_| SpecError::InvalidValue {
        field,
        reason: format!("must not exceed {}", u32::MAX),
    })
}

fn weight_range(
    body: &Map<String, Value>,
    weighted: bool,
    defaults: &WeightDefaults,
) -> Result<Option<WeightRange>, SpecError> {
    let min = weight_bound(body, "weight_min")?;
    let max = weight_bound(body, "weight_max")?;

    if !weighted {
        if min.is_some() || max.is_some() {
            let field = if min.is_some() { "weight_min" } else { "weight_max" };
            return Err(SpecError::InvalidValue {
                field,
                reason: "only allowed when weighted is true".to_string(),
            });
        }
        return Ok(None);
    }

    let range = WeightRange {
        min: min.unwrap_or(defaults.min),
        max: max.unwrap_or(defaults.max),
    };
    if range.min > range.max {
        return Err(SpecError::InvalidValue {
            field: "weight_max",
            reason: format!("must be at least weight_min ({})", range.min),
        });
    }
    Ok(Some(range))
}
