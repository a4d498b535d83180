//! # geoclip - bounding-box to read-window resolution for pyramidal rasters
//!
//! Resolve a bounding box, expressed in any spatial reference, into the
//! concrete integer pixel window to read from a multi-resolution raster,
//! and report the exact world extent and affine transform that window
//! covers. This is the windowing core of a raster-clipping workflow:
//! decoding the raster format and fetching pixel samples stay behind the
//! [`RasterSource`] / [`RasterImage`] traits.
//!
//! ## Features
//!
//! - **SRS normalization**: EPSG codes, proj4 strings, WKT, or the `simple`
//!   pixel-coordinate mode, as a tagged [`Srs`] type
//! - **Reprojection**: pure Rust proj4rs + crs-definitions, edge-sampled so
//!   curved reprojected boundaries are bounded correctly
//! - **Window snapping**: floor/ceil so the window never under-covers the
//!   request
//! - **Overview selection**: greedy pyramid walk toward a target output
//!   size, skipping transparency masks
//! - **Out-of-bounds policy**: fully-outside boxes yield fill-valued bands
//!   instead of errors; `clamp` intersects with the image bounds
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geoclip::{read_bbox, BoundingBox, ResolveOptions};
//!
//! let source = open_my_raster()?; // impl RasterSource
//! let options = ResolveOptions::new(
//!     BoundingBox::new(-123.75, 39.91, -122.34, 40.98),
//!     4326u32,
//! );
//! let result = read_bbox(&source, options).await?;
//! println!("window {:?} covers {:?}", result.window, result.bbox);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod affine;
pub mod cancel;
pub mod compat;
pub mod error;
pub mod geometry;
pub mod overview;
pub mod raster;
pub mod resolve;
pub mod srs;
pub mod window;

// ============================================================================
// Core Types
// ============================================================================

pub use affine::{Affine, Geotransform};
pub use geometry::{reproject_bbox, BoundingBox, Point};
pub use srs::{Srs, EPSG_UNDEFINED};
pub use window::ReadWindow;

// ============================================================================
// Resolution
// ============================================================================

pub use resolve::{read_bbox, ResolveOptions, Resolution, DEFAULT_DENSITY};

// ============================================================================
// Collaborator Interfaces
// ============================================================================

pub use cancel::CancelToken;
pub use raster::{RasterData, RasterImage, RasterSource, ReadRequest};

// ============================================================================
// Projections
// ============================================================================

pub use geometry::projection::{known_epsg, SrsTransformer};

// ============================================================================
// Errors & Compatibility
// ============================================================================

pub use compat::{LegacySrs, LegacyView};
pub use error::{ClipError, Result};
