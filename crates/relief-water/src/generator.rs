//! Keeps a water surface in step with the terrain

use std::sync::Arc;

use log::{debug, info};
use relief_core::{ensure_finite, Color, Result};
use relief_terrain::TerrainSnapshot;

use crate::surface::{water_height, WaterStrategy, WaterSurface};
use crate::waves::WaveParams;

/// User-facing water controls
#[derive(Clone, Debug, PartialEq)]
pub struct WaterSettings {
    pub strategy: WaterStrategy,
    /// Offset added above the reference water line
    pub depth: f32,
    /// Surface alpha in [0, 1]
    pub transparency: f32,
    /// Whether `update` runs the wave simulation
    pub animated: bool,
    /// Base surface color; alpha is replaced by `transparency`
    pub color: Color,
    pub waves: WaveParams,
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            strategy: WaterStrategy::Planar,
            depth: 0.5,
            transparency: 0.5,
            animated: false,
            color: Color::from_hex(0x2A6F97),
            waves: WaveParams::default(),
        }
    }
}

impl WaterSettings {
    fn surface_color(&self) -> Color {
        self.color.with_alpha(self.transparency)
    }
}

/// Builds the water mesh on the first terrain notification and updates it
/// in place afterwards.
#[derive(Debug, Default)]
pub struct WaterSurfaceGenerator {
    settings: WaterSettings,
    terrain: Option<Arc<TerrainSnapshot>>,
    surface: Option<WaterSurface>,
    elapsed: f32,
}

impl WaterSurfaceGenerator {
    pub fn new(settings: WaterSettings) -> Self {
        let mut settings = settings;
        settings.transparency = settings.transparency.clamp(0.0, 1.0);
        Self {
            settings,
            terrain: None,
            surface: None,
            elapsed: 0.0,
        }
    }

    pub fn settings(&self) -> &WaterSettings {
        &self.settings
    }

    pub fn surface(&self) -> Option<&WaterSurface> {
        self.surface.as_ref()
    }

    /// Water line for the current terrain, if any terrain has been seen
    pub fn water_height(&self) -> Option<f32> {
        self.terrain
            .as_ref()
            .map(|t| water_height(t.min_height, t.max_height, self.settings.depth))
    }

    /// Seconds of wave simulation run so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Terrain-generated handler: create the surface on first call, then
    /// reposition or re-mask it
    pub fn on_terrain_generated(&mut self, terrain: &Arc<TerrainSnapshot>) {
        self.terrain = Some(Arc::clone(terrain));
        self.refresh();
    }

    pub fn set_depth(&mut self, depth: f32) -> Result<()> {
        self.settings.depth = ensure_finite("water_depth", depth)?;
        self.refresh();
        Ok(())
    }

    /// Clamped to [0, 1]
    pub fn set_transparency(&mut self, transparency: f32) -> Result<()> {
        let alpha = ensure_finite("transparency", transparency)?.clamp(0.0, 1.0);
        self.settings.transparency = alpha;
        let color = self.settings.surface_color();
        if let Some(surface) = self.surface.as_mut() {
            surface.color = color;
        }
        Ok(())
    }

    /// Rebuilds the surface with the new strategy when it differs
    pub fn set_strategy(&mut self, strategy: WaterStrategy) {
        if self.settings.strategy == strategy {
            return;
        }
        self.settings.strategy = strategy;
        self.surface = None;
        self.refresh();
    }

    pub fn set_waves(&mut self, waves: WaveParams) -> Result<()> {
        waves.validate()?;
        self.settings.waves = waves;
        if self.settings.animated {
            self.apply_waves();
        }
        Ok(())
    }

    /// Turning animation off restores the undisplaced surface
    pub fn set_animated(&mut self, animated: bool) {
        self.settings.animated = animated;
        if animated {
            self.apply_waves();
        } else if let Some(surface) = self.surface.as_mut() {
            surface.reset_displacement();
        }
    }

    /// Flip between static and animated water; returns the new state
    pub fn toggle_animated(&mut self) -> bool {
        let animated = !self.settings.animated;
        self.set_animated(animated);
        animated
    }

    /// Per-frame tick. Advances time and, when animated, displaces the
    /// surface from its undisplaced heights.
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        if self.settings.animated {
            self.apply_waves();
        }
    }

    /// Jump the wave simulation to an absolute time. Static water only
    /// records the time.
    pub fn simulate_at(&mut self, time: f32) {
        self.elapsed = time;
        if self.settings.animated {
            self.apply_waves();
        }
    }

    fn apply_waves(&mut self) {
        let waves = self.settings.waves;
        let time = self.elapsed;
        if let Some(surface) = self.surface.as_mut() {
            let (original, displaced) = surface.displacement_buffers();
            waves.displace(original, displaced, time);
        }
    }

    fn refresh(&mut self) {
        let Some(terrain) = self.terrain.clone() else {
            return;
        };
        let height = water_height(terrain.min_height, terrain.max_height, self.settings.depth);
        let color = self.settings.surface_color();

        match self.surface.as_mut() {
            None => {
                let surface = match self.settings.strategy {
                    WaterStrategy::Planar => WaterSurface::planar(&terrain, height, color),
                    WaterStrategy::Masked => WaterSurface::masked(&terrain, height, color),
                };
                info!(
                    "water surface created ({}): height {:.3}, {} triangles",
                    self.settings.strategy,
                    height,
                    surface.triangle_count()
                );
                self.surface = Some(surface);
            }
            Some(surface) => {
                match surface.strategy {
                    WaterStrategy::Planar => surface.reposition(&terrain, height),
                    WaterStrategy::Masked => surface.remask(&terrain, height),
                }
                debug!(
                    "water surface updated: height {:.3}, {} triangles",
                    height,
                    surface.triangle_count()
                );
            }
        }

        if self.settings.animated {
            self.apply_waves();
        }
    }
}
