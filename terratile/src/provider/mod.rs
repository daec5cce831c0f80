//! Heightmap tile source abstraction
//!
//! This module provides traits and implementations for fetching heightmap
//! tiles from terrain-RGB tile servers.
//!
//! # Example
//!
//! ```ignore
//! use terratile::provider::{AsyncReqwestClient, HeightmapSourceConfig, TerrainRgbSource};
//!
//! let http = AsyncReqwestClient::new()?;
//! let config = HeightmapSourceConfig {
//!     url_template: "https://tiles.example/{z}/{x}/{y}.png".to_string(),
//!     query: vec![("access_token".to_string(), token)],
//!     ..HeightmapSourceConfig::default()
//! };
//! let source = TerrainRgbSource::new(http, config);
//! ```

mod http;
mod terrain_rgb;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use terrain_rgb::{HeightmapSourceConfig, TerrainRgbSource};
pub use types::{HeightmapProvider, ProviderError};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
