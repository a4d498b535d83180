//! Error taxonomy for bounding-box resolution.
//!
//! Every failure here is a caller-input problem and is fatal for the call:
//! there are no retries and no partial results. Bounding boxes that fall
//! outside the raster are deliberately *not* errors; they resolve to
//! fill-valued synthetic reads instead.

use thiserror::Error;

/// Errors produced while resolving a bounding box to a read window.
#[derive(Error, Debug)]
pub enum ClipError {
    /// The operation was cancelled before any I/O happened.
    #[error("operation cancelled")]
    Cancelled,

    /// The raster carries neither a model transformation nor a
    /// tiepoint + pixel-scale pair, so pixel/world mapping is impossible.
    #[error("raster has no geotransform (missing model transformation and tiepoint/pixel-scale tags)")]
    MissingGeoreferencing,

    /// The raster's SRS could not be determined from its geo-keys and the
    /// query is not in simple pixel coordinates.
    #[error("unable to resolve the SRS of the raster")]
    UnresolvableSrs,

    /// An SRS identifier is not WKT, not a proj4 string, and not a known
    /// EPSG definition.
    #[error("unrecognized srs: {0}")]
    UnknownSrs(String),

    /// The affine geotransform is not invertible.
    #[error("geotransform is degenerate (zero determinant)")]
    DegenerateTransform,

    /// A cartographic projection could not be built or applied.
    #[error("projection failed: {0}")]
    Projection(String),

    /// The pixel-read collaborator failed.
    #[error("raster read failed: {0}")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, ClipError>;
