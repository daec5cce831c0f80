//! Final tile types returned to the renderer.

use glam::DVec3;

use super::heightmap::HeightmapData;
use crate::geo::{BoundingSphere, OrientedBoundingBox};
use crate::mesh::MeshPayload;

/// Bit mask marking all four child tiles as potentially available.
pub const ALL_CHILDREN_AVAILABLE: u8 = 0b1111;

/// A quantized mesh tile with its culling volumes and skirt heights.
///
/// Ownership passes to the renderer; nothing here refers back into the
/// pipeline that produced it.
#[derive(Debug, Clone)]
pub struct QuantizedMeshData {
    /// The decoded mesh: vertices, indices, edge lists, height range.
    pub payload: MeshPayload,
    /// Sphere for coarse visibility culling.
    pub bounding_sphere: BoundingSphere,
    /// Tight box for finer culling; absent on near-global tiles.
    pub oriented_bounding_box: Option<OrientedBoundingBox>,
    /// Point for renderer-side horizon culling, in ellipsoid-scaled space.
    pub horizon_occlusion_point: DVec3,
    pub west_skirt_height: f64,
    pub south_skirt_height: f64,
    pub east_skirt_height: f64,
    pub north_skirt_height: f64,
    /// 4-bit mask of child tiles assumed available.
    pub child_tile_mask: u8,
}

/// A tile as handed to the renderer.
#[derive(Debug, Clone)]
pub enum TerrainTile {
    /// Simplified, quantized mesh.
    Mesh(Box<QuantizedMeshData>),
    /// Flat fallback heightmap.
    Heightmap(HeightmapData),
}

impl TerrainTile {
    /// True for a full quantized mesh tile.
    pub fn is_mesh(&self) -> bool {
        matches!(self, TerrainTile::Mesh(_))
    }

    /// True for a fallback heightmap tile.
    pub fn is_heightmap(&self) -> bool {
        matches!(self, TerrainTile::Heightmap(_))
    }

    /// The mesh data, when this is a mesh tile.
    pub fn as_mesh(&self) -> Option<&QuantizedMeshData> {
        match self {
            TerrainTile::Mesh(mesh) => Some(mesh),
            TerrainTile::Heightmap(_) => None,
        }
    }

    /// The heightmap data, when this is a fallback tile.
    pub fn as_heightmap(&self) -> Option<&HeightmapData> {
        match self {
            TerrainTile::Mesh(_) => None,
            TerrainTile::Heightmap(heightmap) => Some(heightmap),
        }
    }
}
