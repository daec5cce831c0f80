//! Terrain tile orchestration.
//!
//! [`TerrainMeshProvider`] is the per-tile entry point: it checks
//! availability, takes an admission permit, fetches pixels from its
//! heightmap source, dispatches the decode to the worker farm, and dresses
//! the resulting mesh with skirts, culling volumes and the
//! horizon-occlusion point. Every per-tile failure degrades to a flat
//! heightmap; the renderer never sees a crash.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

use super::heightmap::{fallback_resolution, HeightmapData};
use super::quantized::{QuantizedMeshData, TerrainTile, ALL_CHILDREN_AVAILABLE};
use super::TerrainError;
use crate::coord::{TileCoord, WebMercatorTilingScheme};
use crate::farm::WorkerFarm;
use crate::geo::{self, BoundingSphere, Ellipsoid, OrientedBoundingBox};
use crate::mesh::{decode_mesh, MeshPayload, MeshRequest};
use crate::provider::HeightmapProvider;

/// Skirt height as a multiple of the level's geometric error.
const SKIRT_SCALE: f64 = 5.0;

/// Tiles at least this wide (radians, roughly 2.3°) get the
/// degenerate-mesh check.
const DEGENERATE_WIDTH: f64 = 0.04;

/// A wide tile with fewer mesh indices than this is implausibly coarse.
const DEGENERATE_INDEX_COUNT: usize = 500;

/// Resolution of the substitute for a degenerate wide tile.
const DEGENERATE_FALLBACK_SAMPLES: u32 = 64;

/// Widest rectangle (radians) that still gets an oriented bounding box.
const OBB_MAX_WIDTH: f64 = std::f64::consts::FRAC_PI_2 + 1e-5;

/// Orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainOptions {
    /// Tighter error budget per level, matching 512 px sources.
    pub high_resolution: bool,
    /// Decode tasks allowed in flight before requests are shed.
    pub max_in_flight: usize,
    /// Dispatch decodes to the background worker (inline when false).
    pub use_workers: bool,
}

impl Default for TerrainOptions {
    fn default() -> Self {
        Self {
            high_resolution: true,
            max_in_flight: 5,
            use_workers: true,
        }
    }
}

/// Serves quantized terrain mesh tiles from a heightmap source.
pub struct TerrainMeshProvider<P: HeightmapProvider> {
    source: P,
    options: TerrainOptions,
    farm: WorkerFarm,
    admission: Arc<Semaphore>,
    tiling: WebMercatorTilingScheme,
    ellipsoid: Ellipsoid,
}

impl<P: HeightmapProvider> TerrainMeshProvider<P> {
    /// Creates a provider over `source`.
    ///
    /// Spawns the decode worker, so it must be called from within a tokio
    /// runtime.
    pub fn new(source: P, options: TerrainOptions) -> Self {
        let admission = Arc::new(Semaphore::new(options.max_in_flight));
        Self {
            source,
            options,
            farm: WorkerFarm::new(),
            admission,
            tiling: WebMercatorTilingScheme,
            ellipsoid: Ellipsoid::WGS84,
        }
    }

    /// Requests the mesh for one tile.
    ///
    /// Returns `None` when the tile is out of range, unavailable from the
    /// source, or the in-flight decode ceiling is reached; the caller may
    /// retry later. Per-tile fetch and decode failures are not errors:
    /// they degrade to a flat heightmap whose resolution shrinks with
    /// depth.
    pub async fn request_tile_geometry(&self, x: u32, y: u32, z: u8) -> Option<TerrainTile> {
        let coord = TileCoord::checked(x, y, z).ok()?;
        if !self.source.tile_available(coord) {
            return None;
        }
        // admission gate: the permit is held across fetch and decode and
        // released on every path when dropped
        let _permit = self.admission.clone().try_acquire_owned().ok()?;

        match self.build_tile(coord).await {
            Ok(tile) => Some(tile),
            Err(e) => {
                debug!(%coord, error = %e, "tile failed, substituting empty heightmap");
                Some(TerrainTile::Heightmap(HeightmapData::empty(
                    fallback_resolution(z),
                )))
            }
        }
    }

    /// Maximum geometric error tolerated at `level`, in metres.
    pub fn level_maximum_geometric_error(&self, level: u8) -> f64 {
        let level_zero =
            geo::level_zero_geometric_error(&self.ellipsoid, self.tiling.tiles_at_level(0));
        let overzoom_scalar = if self.options.high_resolution { 4.0 } else { 2.0 };
        level_zero / overzoom_scalar / 2f64.powi(i32::from(level))
    }

    /// Whether a tile is worth requesting at all.
    pub fn tile_available(&self, x: u32, y: u32, z: u8) -> bool {
        TileCoord::checked(x, y, z)
            .map(|coord| self.source.tile_available(coord))
            .unwrap_or(false)
    }

    async fn build_tile(&self, coord: TileCoord) -> Result<TerrainTile, TerrainError> {
        let pixels = self.source.tile_pixels(coord).await?;
        let error_level = self.level_maximum_geometric_error(coord.z);
        let request = MeshRequest {
            tile_size: pixels.tile_size,
            pixels: pixels.data,
            x: coord.x,
            y: coord.y,
            z: coord.z,
            error_level,
            ellipsoid_radius: self.ellipsoid.maximum_radius(),
        };

        let payload = if self.options.use_workers {
            self.farm.schedule(request).await?
        } else {
            decode_mesh(&request)?
        };

        Ok(self.assemble(coord, error_level, payload))
    }

    /// Dresses a decoded mesh with skirts, culling volumes and the
    /// occlusion point, or rejects it as degenerate.
    fn assemble(&self, coord: TileCoord, error_level: f64, payload: MeshPayload) -> TerrainTile {
        let rectangle = self.tiling.tile_rectangle(coord);

        // implausibly coarse mesh on a wide tile: degrade rather than
        // render junk
        if rectangle.width() > DEGENERATE_WIDTH && payload.indices.len() < DEGENERATE_INDEX_COUNT {
            debug!(%coord, indices = payload.indices.len(), "degenerate mesh, substituting heightmap");
            return TerrainTile::Heightmap(HeightmapData::empty(DEGENERATE_FALLBACK_SAMPLES));
        }

        let (center_lon, center_lat) = rectangle.center();
        let tile_center = self
            .ellipsoid
            .cartographic_to_cartesian(center_lon, center_lat, 0.0);
        let horizon_occlusion_point = geo::horizon_occlusion_point(
            &self.ellipsoid,
            &rectangle,
            tile_center,
            payload.maximum_height,
        );

        let (oriented_bounding_box, bounding_sphere) = if rectangle.width() < OBB_MAX_WIDTH {
            let obb = OrientedBoundingBox::from_rectangle(
                &rectangle,
                payload.minimum_height,
                payload.maximum_height,
                &self.ellipsoid,
            );
            let sphere = BoundingSphere::from_oriented_bounding_box(&obb);
            (Some(obb), sphere)
        } else {
            // near-global extents make for ill-conditioned boxes
            (None, BoundingSphere::whole_globe())
        };

        let skirt_height = SKIRT_SCALE * error_level;
        TerrainTile::Mesh(Box::new(QuantizedMeshData {
            payload,
            bounding_sphere,
            oriented_bounding_box,
            horizon_occlusion_point,
            west_skirt_height: skirt_height,
            south_skirt_height: skirt_height,
            east_skirt_height: skirt_height,
            north_skirt_height: skirt_height,
            child_tile_mask: ALL_CHILDREN_AVAILABLE,
        }))
    }
}
