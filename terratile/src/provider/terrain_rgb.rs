//! Terrain-RGB heightmap tile source.
//!
//! Fetches elevation tiles from a templated XYZ endpoint. The template may
//! reference `{z}`, `{x}`, `{y}` and `{reverse_y}`; the latter resolves to
//! `2^z − y − 1` so TMS-layout sources line up with XYZ addressing.
//! Configured query parameters (access tokens and the like) are appended to
//! every request unmodified.

use serde::{Deserialize, Serialize};

use super::{AsyncHttpClient, HeightmapProvider, ProviderError};
use crate::coord::TileCoord;
use crate::raster::{PixelBuffer, PixelExtractor};

fn default_tile_size() -> u32 {
    256
}

fn default_max_zoom() -> u8 {
    15
}

/// Configuration for a [`TerrainRgbSource`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeightmapSourceConfig {
    /// URL template with `{z}`, `{x}`, `{y}` and optional `{reverse_y}` slots.
    pub url_template: String,

    /// Query parameters appended to every request (e.g. access tokens).
    #[serde(default)]
    pub query: Vec<(String, String)>,

    /// Edge length of fetched tiles, in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Highest zoom level served by the source.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    /// Treat odd zoom levels as unavailable.
    ///
    /// Halves fetch volume for sources that only carry meaningful detail at
    /// even levels.
    #[serde(default)]
    pub skip_odd_levels: bool,
}

impl Default for HeightmapSourceConfig {
    fn default() -> Self {
        Self {
            url_template: String::new(),
            query: Vec::new(),
            tile_size: default_tile_size(),
            max_zoom: default_max_zoom(),
            skip_odd_levels: false,
        }
    }
}

/// Heightmap tile source backed by a templated HTTP endpoint.
pub struct TerrainRgbSource<C: AsyncHttpClient> {
    http: C,
    config: HeightmapSourceConfig,
    extractor: PixelExtractor,
}

impl<C: AsyncHttpClient> TerrainRgbSource<C> {
    /// Creates a source fetching through `http` as configured.
    pub fn new(http: C, config: HeightmapSourceConfig) -> Self {
        let extractor = PixelExtractor::new(config.tile_size);
        Self {
            http,
            config,
            extractor,
        }
    }

    /// Resolves the URL for one tile.
    pub fn build_url(&self, coord: TileCoord) -> String {
        let mut url = self
            .config
            .url_template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{reverse_y}", &coord.reverse_y().to_string());
        for (key, value) in &self.config.query {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        url
    }
}

impl<C: AsyncHttpClient> HeightmapProvider for TerrainRgbSource<C> {
    fn tile_size(&self) -> u32 {
        self.config.tile_size
    }

    fn tile_available(&self, coord: TileCoord) -> bool {
        if coord.z == self.config.max_zoom {
            return true;
        }
        if coord.z % 2 == 1 && self.config.skip_odd_levels {
            return false;
        }
        coord.z <= self.config.max_zoom
    }

    async fn tile_pixels(&self, coord: TileCoord) -> Result<PixelBuffer, ProviderError> {
        let url = self.build_url(coord);
        let bytes = self.http.get(&url).await?;
        self.extractor
            .extract(&bytes)
            .map_err(|e| ProviderError::InvalidImage(e.to_string()))
    }
}
