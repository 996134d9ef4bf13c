//! Generator config validation.

use std::path::Path;

use trail_core::config::GeneratorConfig;

use crate::error::Result;

/// Load a RON generator config and check its ranges.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or holds
/// out-of-range values.
pub fn validate_config_file(path: &Path) -> Result<GeneratorConfig> {
    let config = GeneratorConfig::load(path)?;
    tracing::debug!(
        path = %path.display(),
        max_dimension = config.max_dimension,
        max_repair_attempts = config.max_repair_attempts,
        "Config parsed"
    );
    Ok(config)
}
