//! CLI domain: parse, route and output only.
//! Runs the graph service in-process; every command goes through the service facade.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use route::RunContext;
