//! CLI command implementations

pub mod animate;
pub mod generate;
pub mod init;

use std::path::Path;

use anyhow::{Context, Result};
use relief_runtime::LandscapeConfig;

/// Resolve the layered config, optionally from an explicit file
pub(crate) fn load_config(path: Option<&str>) -> Result<LandscapeConfig> {
    LandscapeConfig::load(path.map(Path::new)).with_context(|| match path {
        Some(p) => format!("Failed to load config from '{}'", p),
        None => "Failed to load config".to_string(),
    })
}
