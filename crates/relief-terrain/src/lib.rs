//! Relief Terrain - Procedural heightmap terrain generation
//!
//! Samples seeded coherent noise over a regular grid, triangulates it, and
//! colors each vertex by its normalized height. Does not depend on any
//! renderer; outputs raw vertex data (positions, colors, indices) for the
//! renderer to consume.

pub mod colorize;
pub mod events;
pub mod grid;
pub mod height_field;
pub mod terrain;
pub mod vertex;

pub use colorize::{normalized_height, HeightColorizer};
pub use events::{SubscriptionId, Subscribers};
pub use grid::{clamp_segments, GridMesh, GridMeshBuilder, HeightRange, MAX_SEGMENTS};
pub use height_field::{FlatHeightField, HeightField, NoiseHeightField, ScaledNoise};
pub use terrain::{TerrainMesh, TerrainParams, TerrainSnapshot, TerrainState};
pub use vertex::MeshVertex;

#[cfg(test)]
mod tests {
    use super::*;
    use relief_core::{Color, Gradient, GradientStop, Vec3};
    use std::sync::{Arc, Mutex};

    fn pool(threads: usize) -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
    }

    #[test]
    fn flat_single_quad_terrain() {
        let mut terrain = TerrainMesh::new();
        let params = TerrainParams {
            base_x_size: 10.0,
            base_z_size: 10.0,
            resolution: 0.1,
            height_multiplier: 0.0,
            ..Default::default()
        };

        let snap = terrain.regenerate(&params).unwrap();
        assert_eq!((snap.x_segments, snap.z_segments), (1, 1));
        assert_eq!(
            snap.vertices,
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 10.0),
                Vec3::new(10.0, 0.0, 10.0),
            ]
        );
        assert_eq!(snap.triangle_count(), 2);
        assert_eq!(snap.min_height, 0.0);
        assert_eq!(snap.max_height, 0.0);

        // Flat terrain colors everything with the gradient start
        let start = Gradient::default().evaluate(0.0);
        assert!(snap.colors.iter().all(|c| *c == start));
    }

    #[test]
    fn output_is_identical_across_pool_sizes() {
        let params = TerrainParams {
            base_x_size: 37.0,
            base_z_size: 23.0,
            resolution: 2.0,
            height_multiplier: 6.0,
            noise_scale: 0.17,
            seed: 5,
        };

        let mut reference: Option<Arc<TerrainSnapshot>> = None;
        for threads in [1, 2, 8] {
            let mut terrain = TerrainMesh::new();
            let snap = terrain.regenerate_in(&pool(threads), &params).unwrap();

            if let Some(expected) = &reference {
                let bits = |v: &[Vec3]| -> Vec<[u32; 3]> {
                    v.iter()
                        .map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
                        .collect()
                };
                assert_eq!(bits(&snap.vertices), bits(&expected.vertices));
                assert_eq!(snap.triangles, expected.triangles);
                assert_eq!(snap.colors, expected.colors);
                assert_eq!(snap.min_height.to_bits(), expected.min_height.to_bits());
                assert_eq!(snap.max_height.to_bits(), expected.max_height.to_bits());
            } else {
                reference = Some(snap);
            }
        }
    }

    #[test]
    fn generated_terrain_satisfies_invariants() {
        let mut terrain = TerrainMesh::new();
        for resolution in [0.05, 0.5, 1.0, 2.5] {
            let params = TerrainParams {
                resolution,
                height_multiplier: 4.0,
                ..Default::default()
            };
            let snap = terrain.regenerate(&params).unwrap();
            let (xs, zs) = (snap.x_segments as usize, snap.z_segments as usize);

            assert_eq!(snap.vertices.len(), (xs + 1) * (zs + 1));
            assert_eq!(snap.triangles.len(), xs * zs * 6);
            assert!(snap.triangles.iter().all(|&i| (i as usize) < snap.vertices.len()));
            assert!(snap
                .vertices
                .iter()
                .all(|v| snap.min_height <= v.y && v.y <= snap.max_height));
        }
    }

    #[test]
    fn subscribers_see_published_snapshot() {
        let mut terrain = TerrainMesh::new();
        let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        terrain.subscribe(move |snap| {
            assert_eq!(snap.colors.len(), snap.vertices.len());
            log.lock().unwrap().push(snap.generation);
        });

        terrain.regenerate(&TerrainParams::default()).unwrap();
        terrain.regenerate(&TerrainParams::default()).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn custom_gradient_applies_on_next_build() {
        let mut terrain = TerrainMesh::new();
        let red = Color::new(1.0, 0.0, 0.0, 1.0);
        terrain.set_gradient(Gradient::new(vec![GradientStop::new(0.0, red)]).unwrap());

        let snap = terrain.regenerate(&TerrainParams::default()).unwrap();
        assert!(snap.colors.iter().all(|c| *c == red));
        assert_eq!(snap.packed_vertices()[0].color, red.to_array());
    }
}
