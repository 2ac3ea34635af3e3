//! Merge rules: defaults and override order.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with every default applied.
///
/// Sources added afterwards override these in the order they are added: global file,
/// explicit file, then environment.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("limits.max_nodes", 1000)?
        .set_default("limits.max_batch_size", 100)?
        .set_default("scheduler.workers", 4)?
        .set_default("scheduler.max_queue_size", 10000)?
        .set_default("scheduler.request_ttl_secs", 3600)?
        .set_default("scheduler.maintenance_interval_secs", 600)?
        .set_default("generation.weight_min", 1)?
        .set_default("generation.weight_max", 100)?
        .set_default("generation.stall_limit", 64)?
        .set_default("generation.swaps_per_edge", 4)?
        .set_default("generation.max_sequence_draws", 32)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
