//! GPU vertex layout for the renderer

use bytemuck::{Pod, Zeroable};
use relief_core::{Color, Vec3};

/// Interleaved position + color, matching a `vec3<f32>, vec4<f32>` vertex
/// input. 28 bytes, tightly packed.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl MeshVertex {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }
}

/// Interleave positions with colors. Vertices without a matching color get
/// white.
pub fn pack_vertices(positions: &[Vec3], colors: &[Color]) -> Vec<MeshVertex> {
    positions
        .iter()
        .enumerate()
        .map(|(i, p)| MeshVertex::new(*p, colors.get(i).copied().unwrap_or_default()))
        .collect()
}
