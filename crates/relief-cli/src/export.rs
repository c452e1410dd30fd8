//! JSON export of generated mesh buffers

use relief_terrain::TerrainSnapshot;
use relief_water::WaterSurface;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MeshExport {
    pub terrain: TerrainExport,
    pub water: Option<WaterExport>,
}

#[derive(Debug, Serialize)]
pub struct TerrainExport {
    pub generation: u64,
    pub x_segments: u32,
    pub z_segments: u32,
    pub min_height: f32,
    pub max_height: f32,
    pub vertices: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub triangles: Vec<u32>,
}

/// Water vertices are written in world space
#[derive(Debug, Serialize)]
pub struct WaterExport {
    pub strategy: String,
    pub height: f32,
    pub color: [f32; 4],
    pub vertices: Vec<[f32; 3]>,
    pub triangles: Vec<u32>,
}

impl MeshExport {
    pub fn new(terrain: &TerrainSnapshot, water: Option<&WaterSurface>) -> Self {
        Self {
            terrain: TerrainExport::from(terrain),
            water: water.map(WaterExport::from),
        }
    }
}

impl From<&TerrainSnapshot> for TerrainExport {
    fn from(snap: &TerrainSnapshot) -> Self {
        Self {
            generation: snap.generation,
            x_segments: snap.x_segments,
            z_segments: snap.z_segments,
            min_height: snap.min_height,
            max_height: snap.max_height,
            vertices: snap.vertices.iter().map(|v| v.to_array()).collect(),
            colors: snap.colors.iter().map(|c| c.to_array()).collect(),
            triangles: snap.triangles.clone(),
        }
    }
}

impl From<&WaterSurface> for WaterExport {
    fn from(surface: &WaterSurface) -> Self {
        Self {
            strategy: surface.strategy.to_string(),
            height: surface.water_height,
            color: surface.color.to_array(),
            vertices: surface
                .world_vertices()
                .iter()
                .map(|v| v.to_array())
                .collect(),
            triangles: surface.triangles.clone(),
        }
    }
}
