//! CLI configuration file.
//!
//! ```toml
//! [limits]
//! exhaustive_threshold = 500000
//! max_reported_gaps = 20
//! ```

use std::path::Path;

use ipfee_verify::VerifyLimits;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub limits: VerifyLimits,
}

/// Read and parse a config TOML file from `path`.
///
/// Returns a human-readable error string on failure.
pub fn read_config(path: &Path) -> Result<CliConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    parse_config(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

fn parse_config(content: &str) -> Result<CliConfig, toml::de::Error> {
    toml::from_str(content)
}
