//! Relief Water - Water surfaces that follow the generated terrain
//!
//! Listens for terrain-generated notifications and keeps a water mesh in
//! step with the terrain's height range:
//! - Planar sheet scaled to the terrain extents
//! - Masked mesh covering only the submerged terrain triangles
//! - Optional sum-of-sines wave displacement, recomputed every frame from
//!   the undisplaced heights

pub mod generator;
pub mod surface;
pub mod waves;

pub use generator::{WaterSettings, WaterSurfaceGenerator};
pub use surface::{mask_submerged, water_height, WaterStrategy, WaterSurface};
pub use waves::WaveParams;

#[cfg(test)]
mod tests {
    use super::*;
    use relief_terrain::{TerrainMesh, TerrainParams};
    use std::sync::{Arc, Mutex};

    #[test]
    fn water_follows_terrain_notifications() {
        let water = Arc::new(Mutex::new(WaterSurfaceGenerator::default()));
        let mut terrain = TerrainMesh::new();

        let listener = Arc::clone(&water);
        terrain.subscribe(move |snap| {
            listener.lock().unwrap().on_terrain_generated(snap);
        });

        let low = terrain
            .regenerate(&TerrainParams {
                height_multiplier: 1.0,
                ..Default::default()
            })
            .unwrap();
        let first_height = water.lock().unwrap().surface().unwrap().water_height;
        assert_eq!(first_height, water_height(low.min_height, low.max_height, 0.5));

        let high = terrain
            .regenerate(&TerrainParams {
                height_multiplier: 10.0,
                ..Default::default()
            })
            .unwrap();
        let guard = water.lock().unwrap();
        let surface = guard.surface().unwrap();
        assert_eq!(
            surface.water_height,
            water_height(high.min_height, high.max_height, 0.5)
        );
        assert_eq!(surface.transform.position.y, surface.water_height);
    }
}
