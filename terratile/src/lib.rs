//! TerraTile - quantized terrain meshes from raster elevation tiles
//!
//! This library converts terrain-RGB heightmap tiles into simplified,
//! quantized triangulated meshes suitable for real-time 3D rendering,
//! dispatching the CPU-bound decode work to a background worker under a
//! bounded-concurrency admission gate.
//!
//! # High-Level API
//!
//! The [`terrain`] module provides the per-tile entry point:
//!
//! ```ignore
//! use terratile::provider::{AsyncReqwestClient, HeightmapSourceConfig, TerrainRgbSource};
//! use terratile::terrain::{TerrainMeshProvider, TerrainOptions};
//!
//! let http = AsyncReqwestClient::new()?;
//! let config = HeightmapSourceConfig {
//!     url_template: "https://tiles.example/{z}/{x}/{y}.png".to_string(),
//!     ..HeightmapSourceConfig::default()
//! };
//! let source = TerrainRgbSource::new(http, config);
//! let provider = TerrainMeshProvider::new(source, TerrainOptions::default());
//!
//! // inside the render loop
//! let tile = provider.request_tile_geometry(x, y, z).await;
//! ```

pub mod coord;
pub mod farm;
pub mod geo;
pub mod logging;
pub mod mesh;
pub mod provider;
pub mod raster;
pub mod terrain;

/// Version of the TerraTile library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
