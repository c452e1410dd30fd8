//! Config initialization command

use anyhow::{Context, Result};
use relief_runtime::LandscapeConfigFile;
use std::fs;
use std::path::Path;

pub fn run(path: &str, force: bool) -> Result<()> {
    let target = Path::new(path);

    if target.exists() && !force {
        anyhow::bail!("'{}' already exists (use --force to overwrite)", path);
    }

    let content = LandscapeConfigFile::with_default_gradient()
        .to_toml_string()
        .context("Failed to serialize default config")?;
    fs::write(target, content).with_context(|| format!("Failed to write '{}'", path))?;

    println!("Wrote default config to {}", path);
    println!();
    println!("Next steps:");
    println!("  relief generate --config {}", path);
    println!("  relief animate --config {}", path);

    Ok(())
}
