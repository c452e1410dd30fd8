//! Headless wave animation command

use anyhow::{Context, Result};
use relief_runtime::Landscape;
use relief_water::{WaterStrategy, WaterSurface};

pub struct AnimateArgs {
    pub config: Option<String>,
    pub frames: u32,
    pub dt: f64,
    pub water: Option<WaterStrategy>,
    pub report_every: u32,
}

pub fn run(args: AnimateArgs) -> Result<()> {
    if !args.dt.is_finite() || args.dt <= 0.0 {
        anyhow::bail!("--dt must be a positive number of seconds, got {}", args.dt);
    }

    let mut config = super::load_config(args.config.as_deref())?;
    config.water.animated = true;
    if let Some(strategy) = args.water {
        config.water.strategy = strategy;
    }

    let mut landscape = Landscape::initialize(config).context("Failed to generate terrain")?;
    {
        let water = landscape.water();
        let surface = water
            .surface()
            .context("Water surface was not created")?;
        println!(
            "Animating {} water: {} vertices, {} frames at {:.4}s",
            surface.strategy,
            surface.vertices.len(),
            args.frames,
            args.dt
        );
    }

    let mut peak = 0.0f32;
    for frame in 1..=args.frames {
        landscape.advance(args.dt);

        let water = landscape.water();
        let Some(surface) = water.surface() else {
            continue;
        };
        let amplitude = displacement_range(surface);
        peak = peak.max(amplitude);

        if args.report_every > 0 && frame % args.report_every == 0 {
            println!(
                "  frame {:>5}  t = {:>7.3}s  displacement {:.4}",
                frame,
                water.elapsed(),
                amplitude
            );
        }
    }

    println!(
        "Done: {:.3}s simulated, peak displacement {:.4}",
        landscape.water().elapsed(),
        peak
    );
    Ok(())
}

/// Largest absolute vertical offset from the undisplaced surface
fn displacement_range(surface: &WaterSurface) -> f32 {
    surface
        .vertices
        .iter()
        .zip(surface.base_vertices())
        .map(|(moved, base)| (moved.y - base.y).abs())
        .fold(0.0, f32::max)
}
