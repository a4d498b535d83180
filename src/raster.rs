//! Collaborator traits for the raster being clipped.
//!
//! Decoding the raster format and retrieving pixel samples are external
//! concerns; this crate only decides *which* window to read. A raster is a
//! [`RasterSource`] exposing one [`RasterImage`] per pyramid level, index 0
//! being the full-resolution base. All metadata and pixel access is async
//! (local or remote fetch); lazy caching of fetched levels is the
//! implementor's business, not this crate's.

use std::sync::Arc;

use async_trait::async_trait;

use crate::affine::Geotransform;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::window::ReadWindow;

/// Parameters for a pixel read at a fixed level.
#[derive(Debug, Clone)]
pub struct ReadRequest {
    /// Integer window in the level's own pixel space. May extend beyond the
    /// image bounds; out-of-bounds pixels take `fill_value`.
    pub window: ReadWindow,
    /// Value for pixels outside the image. `None` leaves them to the
    /// implementor's default.
    pub fill_value: Option<f64>,
    /// Cancellation flag, forwarded from the resolve call.
    pub cancel: CancelToken,
}

/// Decoded pixel data for a read window, one array per spectral band.
#[derive(Debug, Clone)]
pub struct RasterData {
    pub bands: Vec<Vec<f64>>,
    pub width: usize,
    pub height: usize,
}

/// One pyramid level of a raster.
#[async_trait]
pub trait RasterImage: Send + Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Number of spectral bands (samples per pixel).
    fn bands(&self) -> usize;

    /// The affine geotransform, derived from either a model-transformation
    /// tag or a tiepoint + pixel-scale pair. `None` when the raster carries
    /// neither.
    fn geotransform(&self) -> Option<Geotransform>;

    /// Whether this level is a transparency mask rather than imagery.
    /// Mask levels are skipped during overview selection.
    fn is_transparency_mask(&self) -> bool;

    /// Resolve the EPSG code from the image's geo-key bundle.
    /// `None` when the keys are absent or carry the undefined sentinel.
    async fn srs_code(&self) -> Result<Option<u32>>;

    /// Read decoded samples for a window at this level.
    async fn read_rasters(&self, request: ReadRequest) -> Result<RasterData>;
}

/// A multi-resolution raster: a base image plus optional overview levels.
#[async_trait]
pub trait RasterSource: Send + Sync {
    /// Fetch the image at a pyramid level. Index 0 is the base.
    async fn image(&self, index: usize) -> Result<Arc<dyn RasterImage>>;

    /// Total number of pyramid levels, the base included.
    async fn image_count(&self) -> Result<usize>;
}
