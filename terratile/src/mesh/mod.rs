//! Heightmap-to-mesh decoding.
//!
//! A pure transform from a tile's RGBA pixels to a quantized, simplified
//! terrain mesh: terrain-RGB decode into an elevation grid, RTIN greedy
//! refinement against the level's error budget, then quantization with
//! per-edge boundary index lists for neighbour stitching. Deterministic for
//! identical inputs; no I/O and no shared state, so it can run on any
//! thread the dispatcher picks.

mod grid;
mod quantize;
mod rtin;

pub use rtin::{GridMesh, Rtin, RtinTile};

use std::fmt;

/// Input to the mesh decoder.
#[derive(Debug, Clone)]
pub struct MeshRequest {
    /// RGBA samples, `tile_size² × 4` bytes, owned by this request.
    pub pixels: Vec<u8>,
    /// Tile column.
    pub x: u32,
    /// Tile row.
    pub y: u32,
    /// Zoom level.
    pub z: u8,
    /// Maximum allowed geometric error, in metres.
    pub error_level: f64,
    /// Maximum radius of the reference ellipsoid, in metres.
    pub ellipsoid_radius: f64,
    /// Edge length of the pixel buffer.
    pub tile_size: u32,
}

/// Quantized mesh produced by the decoder.
///
/// `quantized_vertices` holds all u values, then all v values, then all
/// heights, each in `0..=32767`. The edge index lists are ordered along
/// their edge (west/east south-to-north, north/south west-to-east).
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPayload {
    pub minimum_height: f64,
    pub maximum_height: f64,
    pub quantized_vertices: Vec<u16>,
    pub indices: Vec<u32>,
    pub west_indices: Vec<u32>,
    pub south_indices: Vec<u32>,
    pub east_indices: Vec<u32>,
    pub north_indices: Vec<u32>,
}

impl MeshPayload {
    /// Number of vertices in the quantized buffer.
    pub fn vertex_count(&self) -> usize {
        self.quantized_vertices.len() / 3
    }
}

/// Errors raised by the mesh decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The pixel buffer does not hold `tile_size² × 4` RGBA bytes.
    BufferSize { expected: usize, actual: usize },
    /// The tile size is not a power of two.
    TileSize(u32),
    /// The elevation grid length does not match the hierarchy.
    GridSize { expected: usize, actual: usize },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::BufferSize { expected, actual } => {
                write!(f, "Pixel buffer holds {} bytes, expected {}", actual, expected)
            }
            MeshError::TileSize(size) => {
                write!(f, "Tile size {} is not a power of two", size)
            }
            MeshError::GridSize { expected, actual } => {
                write!(f, "Elevation grid holds {} samples, expected {}", actual, expected)
            }
        }
    }
}

impl std::error::Error for MeshError {}

/// Decodes a terrain-RGB pixel buffer into a quantized mesh.
///
/// Deterministic for byte-identical requests. Any failure is reported as an
/// error; no retries happen at this layer.
pub fn decode_mesh(request: &MeshRequest) -> Result<MeshPayload, MeshError> {
    let tile_size = request.tile_size as usize;
    let terrain = grid::terrain_grid(&request.pixels, tile_size)?;
    let rtin = Rtin::new(tile_size + 1)?;
    let tile = rtin.create_tile(&terrain)?;
    let mesh = tile.mesh(request.error_level as f32);
    Ok(quantize::quantize_mesh(&terrain, mesh, tile_size))
}

/// RGBA buffer with every pixel encoding `elevation` metres.
#[cfg(test)]
pub(crate) fn flat_tile_pixels(tile_size: u32, elevation: f64) -> Vec<u8> {
    let value = ((elevation + 10_000.0) * 10.0).round() as u32;
    let pixel = [
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
        255,
    ];
    pixel
        .iter()
        .copied()
        .cycle()
        .take((tile_size * tile_size * 4) as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tile_size: u32, pixels: Vec<u8>, error_level: f64) -> MeshRequest {
        MeshRequest {
            pixels,
            x: 3,
            y: 5,
            z: 7,
            error_level,
            ellipsoid_radius: 6_378_137.0,
            tile_size,
        }
    }

    #[test]
    fn test_flat_tile_decodes_to_two_triangles() {
        let payload =
            decode_mesh(&request(256, flat_tile_pixels(256, 100.0), 1.0)).unwrap();

        assert_eq!(payload.indices.len(), 6);
        assert_eq!(payload.vertex_count(), 4);
        assert!((payload.minimum_height - 100.0).abs() < 1e-3);
        assert!((payload.maximum_height - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_indices_well_formed() {
        let mut pixels = flat_tile_pixels(64, 0.0);
        // carve an uneven patch so the mesh refines
        for (i, byte) in pixels.iter_mut().enumerate() {
            if i % 4 == 2 {
                *byte = (i % 251) as u8;
            }
        }
        let payload = decode_mesh(&request(64, pixels, 2.0)).unwrap();

        assert_eq!(payload.indices.len() % 3, 0);
        let vertex_count = payload.vertex_count() as u32;
        assert!(payload.indices.iter().all(|&i| i < vertex_count));
    }

    #[test]
    fn test_malformed_buffer_is_an_error() {
        let err = decode_mesh(&request(256, vec![0u8; 100], 1.0)).unwrap_err();
        assert!(matches!(err, MeshError::BufferSize { .. }));
    }

    #[test]
    fn test_non_power_of_two_tile_is_an_error() {
        let err = decode_mesh(&request(100, vec![0u8; 100 * 100 * 4], 1.0)).unwrap_err();
        assert_eq!(err, MeshError::TileSize(100));
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let req = request(64, flat_tile_pixels(64, 42.0), 3.0);
        let first = decode_mesh(&req).unwrap();
        let second = decode_mesh(&req).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_monotone_in_error_level() {
        let mut pixels = flat_tile_pixels(64, 0.0);
        for (i, byte) in pixels.iter_mut().enumerate() {
            if i % 4 == 1 {
                *byte = ((i / 4) % 199) as u8;
            }
        }
        let mut previous = usize::MAX;
        for error_level in [0.5, 2.0, 8.0, 32.0, 128.0] {
            let payload = decode_mesh(&request(64, pixels.clone(), error_level)).unwrap();
            let triangles = payload.indices.len() / 3;
            assert!(triangles <= previous);
            previous = triangles;
        }
    }
}
