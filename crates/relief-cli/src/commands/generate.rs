//! Terrain and water generation command

use anyhow::{Context, Result};
use relief_core::ensure_finite;
use relief_runtime::{Landscape, LandscapeConfig};
use relief_water::WaterStrategy;
use std::fs;

use crate::export::MeshExport;

pub struct GenerateArgs {
    pub config: Option<String>,
    pub resolution: Option<f32>,
    pub height: Option<f32>,
    pub noise_scale: Option<f32>,
    pub seed: Option<u32>,
    pub water_depth: Option<f32>,
    pub water: Option<WaterStrategy>,
    pub output: Option<String>,
    pub pretty: bool,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;
    apply_flags(&mut config, &args)?;

    let landscape = Landscape::initialize(config).context("Failed to generate terrain")?;
    let snap = landscape
        .terrain()
        .context("Terrain was not published after generation")?;
    let water = landscape.water();

    println!("Terrain:");
    println!(
        "  Grid: {} x {} segments ({} x {} units)",
        snap.x_segments, snap.z_segments, snap.base_x_size, snap.base_z_size
    );
    println!(
        "  Vertices: {}  Triangles: {}",
        snap.vertex_count(),
        snap.triangle_count()
    );
    println!(
        "  Height range: {:.3} .. {:.3}",
        snap.min_height, snap.max_height
    );
    println!("  Seed: {}", snap.params.seed);

    if let Some(surface) = water.surface() {
        println!();
        println!("Water ({}):", surface.strategy);
        println!("  Height: {:.3}", surface.water_height);
        println!(
            "  Vertices: {}  Triangles: {}",
            surface.vertices.len(),
            surface.triangle_count()
        );
        println!("  Alpha: {:.2}", surface.color.a);
    }

    if let Some(ref path) = args.output {
        let export = MeshExport::new(&snap, water.surface());
        let json = if args.pretty {
            serde_json::to_string_pretty(&export)?
        } else {
            serde_json::to_string(&export)?
        };
        fs::write(path, json).with_context(|| format!("Failed to write '{}'", path))?;
        println!();
        println!("Wrote mesh data to {}", path);
    }

    Ok(())
}

/// Command-line flags win over config file and environment
fn apply_flags(config: &mut LandscapeConfig, args: &GenerateArgs) -> Result<()> {
    if let Some(v) = args.resolution {
        config.terrain.resolution = v;
    }
    if let Some(v) = args.height {
        config.terrain.height_multiplier = v;
    }
    if let Some(v) = args.noise_scale {
        config.terrain.noise_scale = v;
    }
    if let Some(v) = args.seed {
        config.terrain.seed = v;
    }
    if let Some(v) = args.water_depth {
        config.water.depth = ensure_finite("water_depth", v)?;
    }
    if let Some(strategy) = args.water {
        config.water.strategy = strategy;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GenerateArgs {
        GenerateArgs {
            config: None,
            resolution: None,
            height: None,
            noise_scale: None,
            seed: None,
            water_depth: None,
            water: None,
            output: None,
            pretty: false,
        }
    }

    #[test]
    fn flags_override_config() {
        let mut config = LandscapeConfig::default();
        let args = GenerateArgs {
            resolution: Some(2.0),
            seed: Some(9),
            water: Some(WaterStrategy::Masked),
            ..args()
        };
        apply_flags(&mut config, &args).unwrap();
        assert_eq!(config.terrain.resolution, 2.0);
        assert_eq!(config.terrain.seed, 9);
        assert_eq!(config.terrain.height_multiplier, 2.0);
        assert_eq!(config.water.strategy, WaterStrategy::Masked);
    }

    #[test]
    fn non_finite_depth_is_rejected() {
        let mut config = LandscapeConfig::default();
        let args = GenerateArgs {
            water_depth: Some(f32::NAN),
            ..args()
        };
        assert!(apply_flags(&mut config, &args).is_err());
    }
}
