//! Per-tile orchestration: fetch, decode, augment, degrade.
//!
//! The flow for one tile:
//!
//! ```text
//! request_tile_geometry(x, y, z)
//!   ├── availability + admission gate ──► None (shed)
//!   ├── source.tile_pixels ─────────────► fetch failure ─► empty heightmap
//!   ├── farm.schedule(decode) ──────────► decode failure ─► empty heightmap
//!   └── assemble: skirts, bounding volumes, occlusion point
//!         └── degenerate guard ─────────► coarse heightmap
//! ```

mod heightmap;
mod provider;
mod quantized;

pub use heightmap::{fallback_resolution, HeightmapData};
pub use provider::{TerrainMeshProvider, TerrainOptions};
pub use quantized::{QuantizedMeshData, TerrainTile, ALL_CHILDREN_AVAILABLE};

use crate::farm::FarmError;
use crate::mesh::MeshError;
use crate::provider::ProviderError;
use std::fmt;

/// Per-tile failures the orchestrator recovers from.
#[derive(Debug)]
pub enum TerrainError {
    /// The tile image could not be fetched.
    Fetch(ProviderError),
    /// The inline decoder rejected the tile.
    Decode(MeshError),
    /// The dispatched decode task failed.
    Dispatch(FarmError),
}

impl fmt::Display for TerrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerrainError::Fetch(e) => write!(f, "Tile fetch failed: {}", e),
            TerrainError::Decode(e) => write!(f, "Tile decode failed: {}", e),
            TerrainError::Dispatch(e) => write!(f, "Decode dispatch failed: {}", e),
        }
    }
}

impl std::error::Error for TerrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TerrainError::Fetch(e) => Some(e),
            TerrainError::Decode(e) => Some(e),
            TerrainError::Dispatch(e) => Some(e),
        }
    }
}

impl From<ProviderError> for TerrainError {
    fn from(e: ProviderError) -> Self {
        TerrainError::Fetch(e)
    }
}

impl From<MeshError> for TerrainError {
    fn from(e: MeshError) -> Self {
        TerrainError::Decode(e)
    }
}

impl From<FarmError> for TerrainError {
    fn from(e: FarmError) -> Self {
        TerrainError::Dispatch(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_error_display() {
        let err = TerrainError::Fetch(ProviderError::Http("timeout".to_string()));
        assert!(err.to_string().contains("Tile fetch failed"));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_terrain_error_from_farm_error() {
        let err: TerrainError = FarmError::EmptyResponse.into();
        assert!(matches!(err, TerrainError::Dispatch(FarmError::EmptyResponse)));
    }
}
