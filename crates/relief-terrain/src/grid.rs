//! Regular grid mesh generation
//!
//! Vertices are laid out row-major: row `z` (0..=z_segments) holds
//! `x_segments + 1` vertices, so vertex `(x, z)` lives at
//! `z * (x_segments + 1) + x`. Rows are sampled in parallel and each row
//! reports its own height range; the ranges are folded together afterwards.

use rayon::prelude::*;
use relief_core::Vec3;

use crate::height_field::HeightField;

/// Upper bound on segments along either axis
pub const MAX_SEGMENTS: u32 = 1000;

/// Indices emitted per grid cell (two triangles)
pub const INDICES_PER_CELL: usize = 6;

/// Clamp a segment count into `[1, MAX_SEGMENTS]`
pub fn clamp_segments(segments: u32) -> u32 {
    segments.clamp(1, MAX_SEGMENTS)
}

/// Output of a grid build
#[derive(Clone, Debug, PartialEq)]
pub struct GridMesh {
    pub x_segments: u32,
    pub z_segments: u32,
    /// World-space vertex positions, row-major
    pub vertices: Vec<Vec3>,
    /// Triangle list, three indices per triangle
    pub triangles: Vec<u32>,
    pub min_height: f32,
    pub max_height: f32,
}

impl GridMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

/// Height range accumulator. Folding is associative and commutative, so the
/// combined range does not depend on how rows were split across workers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightRange {
    pub min: f32,
    pub max: f32,
}

impl HeightRange {
    pub const EMPTY: Self = Self {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    pub fn include(self, h: f32) -> Self {
        Self {
            min: self.min.min(h),
            max: self.max.max(h),
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Builds vertex and index buffers for a `(x+1) * (z+1)` grid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMeshBuilder {
    pub x_segments: u32,
    pub z_segments: u32,
    /// World-space extent along X
    pub base_x_size: f32,
    /// World-space extent along Z
    pub base_z_size: f32,
}

impl GridMeshBuilder {
    /// Segment counts are clamped to `[1, MAX_SEGMENTS]`; negative sizes to 0.
    pub fn new(x_segments: u32, z_segments: u32, base_x_size: f32, base_z_size: f32) -> Self {
        Self {
            x_segments: clamp_segments(x_segments),
            z_segments: clamp_segments(z_segments),
            base_x_size: base_x_size.max(0.0),
            base_z_size: base_z_size.max(0.0),
        }
    }

    pub fn vertex_count(&self) -> usize {
        (self.x_segments as usize + 1) * (self.z_segments as usize + 1)
    }

    pub fn index_count(&self) -> usize {
        self.x_segments as usize * self.z_segments as usize * INDICES_PER_CELL
    }

    /// Sample `field` at every grid vertex and triangulate.
    ///
    /// Runs on the current rayon pool; wrap in `ThreadPool::install` to pick
    /// a specific pool. Output is identical for any pool size.
    pub fn build(&self, field: &impl HeightField) -> GridMesh {
        let (vertices, range) = self.build_vertices(field);
        let triangles = self.build_triangles();

        GridMesh {
            x_segments: self.x_segments,
            z_segments: self.z_segments,
            vertices,
            triangles,
            min_height: range.min,
            max_height: range.max,
        }
    }

    fn build_vertices(&self, field: &impl HeightField) -> (Vec<Vec3>, HeightRange) {
        let row_len = self.x_segments as usize + 1;
        let x_segs = self.x_segments as f32;
        let z_segs = self.z_segments as f32;

        let mut vertices = vec![Vec3::ZERO; self.vertex_count()];

        let range = vertices
            .par_chunks_mut(row_len)
            .enumerate()
            .map(|(z, row)| {
                let z_coord = z as f32 / z_segs * self.base_z_size;
                let mut local = HeightRange::EMPTY;

                for (x, vertex) in row.iter_mut().enumerate() {
                    let x_coord = x as f32 / x_segs * self.base_x_size;
                    let y = field.height_at(x_coord, z_coord);
                    *vertex = Vec3::new(x_coord, y, z_coord);
                    local = local.include(y);
                }

                local
            })
            .reduce(|| HeightRange::EMPTY, HeightRange::merge);

        (vertices, range)
    }

    fn build_triangles(&self) -> Vec<u32> {
        let x_segs = self.x_segments as usize;
        let stride = self.x_segments + 1;

        let mut triangles = vec![0u32; self.index_count()];

        triangles
            .par_chunks_mut(INDICES_PER_CELL)
            .enumerate()
            .for_each(|(cell, out)| {
                let x = (cell % x_segs) as u32;
                let z = (cell / x_segs) as u32;
                let v0 = z * stride + x;

                out[0] = v0;
                out[1] = v0 + stride;
                out[2] = v0 + 1;
                out[3] = v0 + 1;
                out[4] = v0 + stride;
                out[5] = v0 + stride + 1;
            });

        debug_assert!(triangles
            .iter()
            .all(|&i| (i as usize) < self.vertex_count()));

        triangles
    }
}
