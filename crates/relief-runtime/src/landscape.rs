//! Terrain + water wiring driven by a parameter source
//!
//! `Landscape` owns the terrain orchestrator and a shared water generator
//! subscribed to its terrain-generated event. Parameter changes from the
//! outside (sliders, CLI flags, config) go through `set_parameters`; the
//! animation tick goes through `advance`/`tick`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::info;
use relief_core::{ensure_finite, Result};
use relief_terrain::{TerrainMesh, TerrainParams, TerrainSnapshot};
use relief_water::WaterSurfaceGenerator;

use crate::clock::FrameClock;
use crate::config::LandscapeConfig;

/// Values a parameter source can change at runtime. `None` leaves the
/// current value alone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParameterUpdate {
    pub resolution: Option<f32>,
    pub height_multiplier: Option<f32>,
    pub noise_scale: Option<f32>,
    pub water_depth: Option<f32>,
    pub transparency: Option<f32>,
}

impl ParameterUpdate {
    /// Reject the whole update if any supplied value is NaN or infinite
    fn validated(self) -> Result<Self> {
        let check = |name: &str, value: Option<f32>| -> Result<Option<f32>> {
            value.map(|v| ensure_finite(name, v)).transpose()
        };
        Ok(Self {
            resolution: check("resolution", self.resolution)?,
            height_multiplier: check("height_multiplier", self.height_multiplier)?,
            noise_scale: check("noise_scale", self.noise_scale)?,
            water_depth: check("water_depth", self.water_depth)?,
            transparency: check("transparency", self.transparency)?,
        })
    }

    fn touches_terrain(&self) -> bool {
        self.resolution.is_some() || self.height_multiplier.is_some() || self.noise_scale.is_some()
    }
}

pub struct Landscape {
    params: TerrainParams,
    terrain: TerrainMesh,
    water: Arc<Mutex<WaterSurfaceGenerator>>,
    clock: FrameClock,
}

impl Landscape {
    /// Wire terrain and water together. Nothing is generated until
    /// `regenerate` is called.
    pub fn new(config: LandscapeConfig) -> Self {
        let mut terrain = TerrainMesh::with_gradient(config.gradient);
        let water = Arc::new(Mutex::new(WaterSurfaceGenerator::new(config.water)));

        let listener = Arc::clone(&water);
        terrain.subscribe(move |snapshot| {
            lock(&listener).on_terrain_generated(snapshot);
        });

        Self {
            params: config.terrain,
            terrain,
            water,
            clock: FrameClock::new(),
        }
    }

    /// Build the initial terrain and water
    pub fn initialize(config: LandscapeConfig) -> Result<Self> {
        let mut landscape = Self::new(config);
        landscape.regenerate()?;
        Ok(landscape)
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn terrain(&self) -> Option<Arc<TerrainSnapshot>> {
        self.terrain.snapshot()
    }

    /// Exclusive access to the water generator
    pub fn water(&self) -> MutexGuard<'_, WaterSurfaceGenerator> {
        lock(&self.water)
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Rebuild the terrain from the current parameters. Water follows via
    /// the terrain-generated subscription.
    pub fn regenerate(&mut self) -> Result<Arc<TerrainSnapshot>> {
        self.terrain.regenerate(&self.params)
    }

    /// Apply changes from the parameter source.
    ///
    /// Water depth and transparency apply immediately. Terrain values
    /// trigger a regeneration, whose snapshot is returned.
    pub fn set_parameters(
        &mut self,
        update: ParameterUpdate,
    ) -> Result<Option<Arc<TerrainSnapshot>>> {
        let update = update.validated()?;

        let mut params = self.params.clone();
        if let Some(v) = update.resolution {
            params.resolution = v;
        }
        if let Some(v) = update.height_multiplier {
            params.height_multiplier = v;
        }
        if let Some(v) = update.noise_scale {
            params.noise_scale = v;
        }

        {
            let mut water = self.water();
            if let Some(depth) = update.water_depth {
                water.set_depth(depth)?;
            }
            if let Some(alpha) = update.transparency {
                water.set_transparency(alpha)?;
            }
        }

        if !update.touches_terrain() {
            return Ok(None);
        }

        info!(
            "parameters changed: resolution {}, height {}, noise scale {}",
            params.resolution, params.height_multiplier, params.noise_scale
        );
        self.params = params;
        self.regenerate().map(Some)
    }

    /// Advance animation time by `dt` seconds, running the wave pass once
    /// per whole fixed step
    pub fn advance(&mut self, dt: f64) {
        self.clock.advance(dt);
        self.run_fixed_steps();
    }

    /// Advance animation time from the wall clock
    pub fn tick(&mut self) {
        self.clock.tick();
        self.run_fixed_steps();
    }

    fn run_fixed_steps(&mut self) {
        let step = self.clock.fixed_timestep;
        while self.clock.should_fixed_update() {
            self.clock.consume_fixed_step();
            lock(&self.water).update(step as f32);
        }
    }
}

fn lock(water: &Mutex<WaterSurfaceGenerator>) -> MutexGuard<'_, WaterSurfaceGenerator> {
    // A panic mid-update leaves the generator usable; its next refresh
    // rebuilds from the stored terrain.
    water.lock().unwrap_or_else(PoisonError::into_inner)
}
