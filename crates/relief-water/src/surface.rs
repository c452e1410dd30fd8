//! Water surface geometry: planar sheet and terrain-masked variants

use rayon::prelude::*;
use relief_core::{lerp_f32, Color, Transform, Vec3};
use relief_terrain::{FlatHeightField, GridMeshBuilder, TerrainSnapshot};
use serde::{Deserialize, Serialize};

/// Fraction of the terrain height range where the water line sits before
/// the depth offset is added
pub const WATER_LEVEL_FRACTION: f32 = 0.2;

/// Side length of the planar sheet in local units
pub const PLANE_SIZE: f32 = 10.0;

/// Segments per side of the planar sheet
pub const PLANE_SEGMENTS: u32 = 10;

/// `lerp(min, max, 0.2) + depth`
pub fn water_height(min_height: f32, max_height: f32, depth: f32) -> f32 {
    lerp_f32(min_height, max_height, WATER_LEVEL_FRACTION) + depth
}

/// How the water mesh is shaped
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterStrategy {
    /// A flat sheet covering the terrain extents, placed at the water height
    #[default]
    Planar,
    /// Only the terrain triangles that lie entirely under the water height
    Masked,
}

impl std::fmt::Display for WaterStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaterStrategy::Planar => write!(f, "planar"),
            WaterStrategy::Masked => write!(f, "masked"),
        }
    }
}

impl std::str::FromStr for WaterStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "planar" => Ok(WaterStrategy::Planar),
            "masked" => Ok(WaterStrategy::Masked),
            other => Err(format!(
                "unknown water strategy '{}'; valid values: planar, masked",
                other
            )),
        }
    }
}

/// Mesh data for the water. Vertices are in local space; `transform` places
/// them in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct WaterSurface {
    pub strategy: WaterStrategy,
    pub transform: Transform,
    /// Undisplaced vertex positions
    base_vertices: Vec<Vec3>,
    /// Current positions, displaced when waves are running
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<u32>,
    pub color: Color,
    pub water_height: f32,
}

impl WaterSurface {
    /// A `PLANE_SIZE` square sheet centered on the terrain and scaled to its
    /// extents
    pub fn planar(terrain: &TerrainSnapshot, height: f32, color: Color) -> Self {
        let half = PLANE_SIZE * 0.5;
        let sheet = GridMeshBuilder::new(PLANE_SEGMENTS, PLANE_SEGMENTS, PLANE_SIZE, PLANE_SIZE)
            .build(&FlatHeightField(0.0));
        let vertices: Vec<Vec3> = sheet
            .vertices
            .iter()
            .map(|v| Vec3::new(v.x - half, 0.0, v.z - half))
            .collect();

        Self {
            strategy: WaterStrategy::Planar,
            transform: planar_transform(terrain, height),
            base_vertices: vertices.clone(),
            vertices,
            triangles: sheet.triangles,
            color,
            water_height: height,
        }
    }

    /// Terrain vertices clamped up to the water height, keeping only fully
    /// submerged triangles
    pub fn masked(terrain: &TerrainSnapshot, height: f32, color: Color) -> Self {
        let (vertices, triangles) = mask_submerged(&terrain.vertices, &terrain.triangles, height);

        Self {
            strategy: WaterStrategy::Masked,
            transform: Transform::IDENTITY,
            base_vertices: vertices.clone(),
            vertices,
            triangles,
            color,
            water_height: height,
        }
    }

    pub fn base_vertices(&self) -> &[Vec3] {
        &self.base_vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Current vertices with the transform applied
    pub fn world_vertices(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|v| self.transform.apply(*v)).collect()
    }

    /// Move the planar sheet to match new terrain, keeping its geometry
    pub(crate) fn reposition(&mut self, terrain: &TerrainSnapshot, height: f32) {
        self.transform = planar_transform(terrain, height);
        self.water_height = height;
    }

    /// Swap in a freshly masked mesh
    pub(crate) fn remask(&mut self, terrain: &TerrainSnapshot, height: f32) {
        let (vertices, triangles) = mask_submerged(&terrain.vertices, &terrain.triangles, height);
        self.base_vertices = vertices.clone();
        self.vertices = vertices;
        self.triangles = triangles;
        self.water_height = height;
    }

    /// Split borrow for the wave pass
    pub(crate) fn displacement_buffers(&mut self) -> (&[Vec3], &mut [Vec3]) {
        (&self.base_vertices, &mut self.vertices)
    }

    /// Drop any wave displacement
    pub fn reset_displacement(&mut self) {
        self.vertices.clone_from(&self.base_vertices);
    }
}

fn planar_transform(terrain: &TerrainSnapshot, height: f32) -> Transform {
    Transform::from_position(Vec3::new(
        terrain.base_x_size * 0.5,
        height,
        terrain.base_z_size * 0.5,
    ))
    .with_scale(Vec3::new(
        terrain.base_x_size / PLANE_SIZE,
        1.0,
        terrain.base_z_size / PLANE_SIZE,
    ))
}

/// Clamp vertices below `height` up to it, then keep the triangles whose
/// three vertices all sit exactly at `height`.
///
/// The vertex buffer keeps its length so existing indices stay valid;
/// vertices above the water are simply left unreferenced.
pub fn mask_submerged(vertices: &[Vec3], triangles: &[u32], height: f32) -> (Vec<Vec3>, Vec<u32>) {
    let clamped: Vec<Vec3> = vertices
        .par_iter()
        .map(|v| if v.y < height { v.with_y(height) } else { *v })
        .collect();

    let submerged = |i: u32| clamped[i as usize].y == height;
    let kept: Vec<u32> = triangles
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| submerged(i)))
        .flatten()
        .copied()
        .collect();

    (clamped, kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_terrain::{TerrainMesh, TerrainParams};
    use std::sync::Arc;

    fn flat_terrain(height_multiplier: f32) -> Arc<TerrainSnapshot> {
        let mut terrain = TerrainMesh::new();
        terrain
            .regenerate(&TerrainParams {
                base_x_size: 8.0,
                base_z_size: 6.0,
                height_multiplier,
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn water_height_formula() {
        assert!((water_height(0.0, 10.0, 0.5) - 2.5).abs() < 1e-6);
        assert!((water_height(-5.0, 5.0, 0.0) - -3.0).abs() < 1e-6);
    }

    #[test]
    fn fully_submerged_terrain_keeps_every_triangle() {
        let verts = vec![Vec3::new(0.0, 1.0, 0.0); 4];
        let tris = vec![0, 2, 1, 1, 2, 3];
        let (clamped, kept) = mask_submerged(&verts, &tris, 3.0);
        assert_eq!(kept, tris);
        assert!(clamped.iter().all(|v| v.y == 3.0));
    }

    #[test]
    fn terrain_above_water_keeps_nothing() {
        let verts = vec![Vec3::new(0.0, 5.0, 0.0); 4];
        let tris = vec![0, 2, 1, 1, 2, 3];
        let (clamped, kept) = mask_submerged(&verts, &tris, 3.0);
        assert!(kept.is_empty());
        assert_eq!(clamped, verts);
    }

    #[test]
    fn partially_submerged_quad() {
        // Vertex 3 sticks out of the water, so only the first triangle stays
        let verts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.5, 0.0),
            Vec3::new(0.0, 0.2, 1.0),
            Vec3::new(1.0, 4.0, 1.0),
        ];
        let tris = vec![0, 2, 1, 1, 2, 3];
        let (clamped, kept) = mask_submerged(&verts, &tris, 1.0);
        assert_eq!(kept, vec![0, 2, 1]);
        assert_eq!(clamped.len(), verts.len());
        assert_eq!(clamped[3].y, 4.0);
    }

    #[test]
    fn vertex_exactly_at_water_line_counts_as_submerged() {
        let verts = vec![Vec3::new(0.0, 2.0, 0.0); 3];
        let (_, kept) = mask_submerged(&verts, &[0, 1, 2], 2.0);
        assert_eq!(kept, vec![0, 1, 2]);
    }

    #[test]
    fn planar_sheet_spans_terrain() {
        let terrain = flat_terrain(0.0);
        let surface = WaterSurface::planar(&terrain, 1.5, Color::WHITE);

        assert_eq!(surface.vertices.len(), 121);
        assert_eq!(surface.triangle_count(), 200);
        assert_eq!(surface.transform.position, Vec3::new(4.0, 1.5, 3.0));

        let world = surface.world_vertices();
        let min_x = world.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
        let max_z = world.iter().map(|v| v.z).fold(f32::NEG_INFINITY, f32::max);
        assert!((min_x - 0.0).abs() < 1e-5);
        assert!((max_z - 6.0).abs() < 1e-5);
        assert!(world.iter().all(|v| v.y == 1.5));
    }

    #[test]
    fn masked_surface_over_flat_terrain() {
        let terrain = flat_terrain(0.0);
        let surface = WaterSurface::masked(&terrain, 0.5, Color::WHITE);
        assert_eq!(surface.triangles, terrain.triangles);
        assert_eq!(surface.vertices.len(), terrain.vertices.len());
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Masked".parse::<WaterStrategy>(), Ok(WaterStrategy::Masked));
        assert_eq!("planar".parse::<WaterStrategy>(), Ok(WaterStrategy::Planar));
        assert!("lake".parse::<WaterStrategy>().is_err());
        assert_eq!(WaterStrategy::Masked.to_string(), "masked");
    }
}
