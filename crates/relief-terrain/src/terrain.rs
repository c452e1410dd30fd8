//! Terrain parameters, published snapshots, and the regeneration entry point

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use relief_core::{ensure_finite, Color, Gradient, Result, Vec3};
use serde::{Deserialize, Serialize};

use crate::colorize::HeightColorizer;
use crate::events::{SubscriptionId, Subscribers};
use crate::grid::{GridMeshBuilder, MAX_SEGMENTS};
use crate::height_field::NoiseHeightField;
use crate::vertex::{pack_vertices, MeshVertex};

/// Inputs to a terrain build
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// World-space X extent; also the segment count at resolution 1.0
    pub base_x_size: f32,
    /// World-space Z extent; also the segment count at resolution 1.0
    pub base_z_size: f32,
    /// Detail factor multiplied into the base sizes to get segment counts
    pub resolution: f32,
    /// Amplitude applied to the [0, 1] noise value
    pub height_multiplier: f32,
    /// Frequency multiplier applied to world coordinates before sampling
    pub noise_scale: f32,
    pub seed: u32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            base_x_size: 20.0,
            base_z_size: 20.0,
            resolution: 1.0,
            height_multiplier: 2.0,
            noise_scale: 0.3,
            seed: 0,
        }
    }
}

impl TerrainParams {
    /// Reject values that would poison the build (NaN, infinities)
    pub fn validate(&self) -> Result<()> {
        ensure_finite("base_x_size", self.base_x_size)?;
        ensure_finite("base_z_size", self.base_z_size)?;
        ensure_finite("resolution", self.resolution)?;
        ensure_finite("height_multiplier", self.height_multiplier)?;
        ensure_finite("noise_scale", self.noise_scale)?;
        Ok(())
    }

    /// Segment counts: `base_size * resolution` rounded half to even, clamped
    /// to `[1, MAX_SEGMENTS]`
    pub fn segments(&self) -> (u32, u32) {
        (
            segments_for("x", self.base_x_size, self.resolution),
            segments_for("z", self.base_z_size, self.resolution),
        )
    }
}

fn segments_for(axis: &str, base_size: f32, resolution: f32) -> u32 {
    let raw = (base_size * resolution).round_ties_even();
    if raw < 1.0 || raw.is_nan() {
        warn!("{axis} segments {raw} below minimum, clamping to 1");
        1
    } else if raw > MAX_SEGMENTS as f32 {
        warn!("{axis} segments {raw} above maximum, clamping to {MAX_SEGMENTS}");
        MAX_SEGMENTS
    } else {
        raw as u32
    }
}

/// An immutable, fully built terrain. Shared with readers via `Arc`; a new
/// regeneration produces a new snapshot rather than modifying this one.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSnapshot {
    /// Increments on every regeneration, starting at 1
    pub generation: u64,
    pub params: TerrainParams,
    pub x_segments: u32,
    pub z_segments: u32,
    /// Effective extents after clamping negative sizes to 0
    pub base_x_size: f32,
    pub base_z_size: f32,
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<u32>,
    pub colors: Vec<Color>,
    pub min_height: f32,
    pub max_height: f32,
}

impl TerrainSnapshot {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Interleaved position/color records for GPU upload
    pub fn packed_vertices(&self) -> Vec<MeshVertex> {
        pack_vertices(&self.vertices, &self.colors)
    }

    /// Positions and grouped triangles, the shape collision builders expect
    pub fn trimesh_data(&self) -> (Vec<[f32; 3]>, Vec<[u32; 3]>) {
        let vertices = self.vertices.iter().map(|v| v.to_array()).collect();
        let triangles = self
            .triangles
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        (vertices, triangles)
    }

    /// Bilinear height at world (x, z), clamped to the terrain bounds
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let u = if self.base_x_size > 0.0 {
            (x / self.base_x_size).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let v = if self.base_z_size > 0.0 {
            (z / self.base_z_size).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let fx = u * self.x_segments as f32;
        let fz = v * self.z_segments as f32;

        let x0 = (fx as u32).min(self.x_segments - 1);
        let z0 = (fz as u32).min(self.z_segments - 1);
        let tx = fx - x0 as f32;
        let tz = fz - z0 as f32;

        let h00 = self.grid_height(x0, z0);
        let h10 = self.grid_height(x0 + 1, z0);
        let h01 = self.grid_height(x0, z0 + 1);
        let h11 = self.grid_height(x0 + 1, z0 + 1);

        let h0 = h00 * (1.0 - tx) + h10 * tx;
        let h1 = h01 * (1.0 - tx) + h11 * tx;

        h0 * (1.0 - tz) + h1 * tz
    }

    fn grid_height(&self, x: u32, z: u32) -> f32 {
        self.vertices[(z * (self.x_segments + 1) + x) as usize].y
    }
}

/// Lifecycle of a `TerrainMesh`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerrainState {
    Uninitialized,
    Ready,
}

/// Owns the current terrain snapshot and rebuilds it on demand.
///
/// `regenerate` takes `&mut self`, so only one rebuild can run at a time.
/// Readers hold `Arc<TerrainSnapshot>` clones and never see a partial build.
#[derive(Debug)]
pub struct TerrainMesh {
    noise: NoiseHeightField,
    colorizer: HeightColorizer,
    current: Option<Arc<TerrainSnapshot>>,
    subscribers: Subscribers,
    generation: u64,
}

impl Default for TerrainMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainMesh {
    pub fn new() -> Self {
        Self::with_gradient(Gradient::default())
    }

    pub fn with_gradient(gradient: Gradient) -> Self {
        Self {
            noise: NoiseHeightField::default(),
            colorizer: HeightColorizer::new(gradient),
            current: None,
            subscribers: Subscribers::new(),
            generation: 0,
        }
    }

    /// Takes effect on the next regeneration
    pub fn set_gradient(&mut self, gradient: Gradient) {
        self.colorizer = HeightColorizer::new(gradient);
    }

    pub fn state(&self) -> TerrainState {
        if self.current.is_some() {
            TerrainState::Ready
        } else {
            TerrainState::Uninitialized
        }
    }

    /// The most recently published snapshot
    pub fn snapshot(&self) -> Option<Arc<TerrainSnapshot>> {
        self.current.clone()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Arc<TerrainSnapshot>) + Send + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Rebuild on the global rayon pool, publish, then notify subscribers
    pub fn regenerate(&mut self, params: &TerrainParams) -> Result<Arc<TerrainSnapshot>> {
        params.validate()?;
        self.reseed(params.seed);
        let snapshot = build_snapshot(&self.noise, &self.colorizer, params, self.generation + 1);
        Ok(self.publish(snapshot))
    }

    /// Same as `regenerate`, but the parallel passes run on `pool`
    pub fn regenerate_in(
        &mut self,
        pool: &rayon::ThreadPool,
        params: &TerrainParams,
    ) -> Result<Arc<TerrainSnapshot>> {
        params.validate()?;
        self.reseed(params.seed);
        let (noise, colorizer) = (&self.noise, &self.colorizer);
        let generation = self.generation + 1;
        let snapshot = pool.install(|| build_snapshot(noise, colorizer, params, generation));
        Ok(self.publish(snapshot))
    }

    fn reseed(&mut self, seed: u32) {
        if self.noise.seed() != seed {
            self.noise = NoiseHeightField::new(seed);
        }
    }

    fn publish(&mut self, snapshot: TerrainSnapshot) -> Arc<TerrainSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.generation = snapshot.generation;
        self.current = Some(Arc::clone(&snapshot));

        info!(
            "terrain #{} generated: {}x{} segments, {} vertices, {} triangles, height {:.3}..{:.3}",
            snapshot.generation,
            snapshot.x_segments,
            snapshot.z_segments,
            snapshot.vertex_count(),
            snapshot.triangle_count(),
            snapshot.min_height,
            snapshot.max_height
        );

        self.subscribers.notify(&snapshot);
        snapshot
    }
}

fn build_snapshot(
    noise: &NoiseHeightField,
    colorizer: &HeightColorizer,
    params: &TerrainParams,
    generation: u64,
) -> TerrainSnapshot {
    let (x_segments, z_segments) = params.segments();
    let builder = GridMeshBuilder::new(
        x_segments,
        z_segments,
        params.base_x_size,
        params.base_z_size,
    );

    let start = Instant::now();
    let mesh = builder.build(&noise.scaled(params.noise_scale, params.height_multiplier));
    let built = start.elapsed();
    let colors = colorizer.colorize(&mesh.vertices, mesh.min_height, mesh.max_height);
    debug!(
        "grid build {:.2?}, colorize {:.2?} ({} threads)",
        built,
        start.elapsed() - built,
        rayon::current_num_threads()
    );

    TerrainSnapshot {
        generation,
        params: params.clone(),
        x_segments: mesh.x_segments,
        z_segments: mesh.z_segments,
        base_x_size: builder.base_x_size,
        base_z_size: builder.base_z_size,
        vertices: mesh.vertices,
        triangles: mesh.triangles,
        colors,
        min_height: mesh.min_height,
        max_height: mesh.max_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_core::ReliefError;

    #[test]
    fn segments_follow_resolution() {
        let params = TerrainParams {
            base_x_size: 20.0,
            base_z_size: 10.0,
            resolution: 1.5,
            ..Default::default()
        };
        assert_eq!(params.segments(), (30, 15));
    }

    #[test]
    fn half_segments_round_to_even() {
        let params = TerrainParams {
            base_x_size: 20.0,
            base_z_size: 14.0,
            resolution: 0.125,
            ..Default::default()
        };
        // 2.5 -> 2, 1.75 -> 2
        assert_eq!(params.segments(), (2, 2));

        let params = TerrainParams {
            base_x_size: 14.0,
            base_z_size: 18.0,
            resolution: 0.25,
            ..Default::default()
        };
        // 3.5 -> 4, 4.5 -> 4
        assert_eq!(params.segments(), (4, 4));
    }

    #[test]
    fn tiny_resolution_clamps_to_one_segment() {
        let params = TerrainParams {
            resolution: 0.001,
            ..Default::default()
        };
        assert_eq!(params.segments(), (1, 1));
    }

    #[test]
    fn huge_resolution_clamps_to_max() {
        let params = TerrainParams {
            resolution: 1000.0,
            ..Default::default()
        };
        assert_eq!(params.segments(), (MAX_SEGMENTS, MAX_SEGMENTS));
    }

    #[test]
    fn nan_parameters_are_rejected() {
        let mut terrain = TerrainMesh::new();
        let params = TerrainParams {
            height_multiplier: f32::NAN,
            ..Default::default()
        };
        let err = terrain.regenerate(&params).unwrap_err();
        assert!(matches!(err, ReliefError::InvalidParameter { .. }));
        assert_eq!(terrain.state(), TerrainState::Uninitialized);
    }

    #[test]
    fn regenerate_publishes_snapshot() {
        let mut terrain = TerrainMesh::new();
        assert_eq!(terrain.state(), TerrainState::Uninitialized);
        assert!(terrain.snapshot().is_none());

        let snap = terrain.regenerate(&TerrainParams::default()).unwrap();
        assert_eq!(terrain.state(), TerrainState::Ready);
        assert_eq!(snap.generation, 1);
        assert_eq!(snap.vertex_count(), 21 * 21);
        assert_eq!(snap.colors.len(), snap.vertex_count());
        assert!(Arc::ptr_eq(&snap, &terrain.snapshot().unwrap()));
    }

    #[test]
    fn old_snapshots_survive_regeneration() {
        let mut terrain = TerrainMesh::new();
        let first = terrain.regenerate(&TerrainParams::default()).unwrap();
        let second = terrain
            .regenerate(&TerrainParams {
                resolution: 0.5,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(first.vertex_count(), 21 * 21);
        assert_eq!(second.vertex_count(), 11 * 11);
        assert_eq!(second.generation, 2);
    }

    #[test]
    fn height_at_matches_grid_vertices() {
        let mut terrain = TerrainMesh::new();
        let snap = terrain.regenerate(&TerrainParams::default()).unwrap();
        for v in snap.vertices.iter().step_by(17) {
            assert!((snap.height_at(v.x, v.z) - v.y).abs() < 1e-4);
        }
        // Outside the bounds clamps to the edge
        assert_eq!(snap.height_at(-5.0, -5.0), snap.vertices[0].y);
    }

    #[test]
    fn trimesh_indices_in_range() {
        let mut terrain = TerrainMesh::new();
        let snap = terrain.regenerate(&TerrainParams::default()).unwrap();
        let (verts, tris) = snap.trimesh_data();
        assert_eq!(tris.len(), snap.triangle_count());
        for tri in &tris {
            assert!(tri.iter().all(|&i| (i as usize) < verts.len()));
        }
    }

    #[test]
    fn changing_seed_changes_heights() {
        let mut terrain = TerrainMesh::new();
        let a = terrain.regenerate(&TerrainParams::default()).unwrap();
        let b = terrain
            .regenerate(&TerrainParams {
                seed: 99,
                ..Default::default()
            })
            .unwrap();
        assert_ne!(a.vertices, b.vertices);
    }
}
