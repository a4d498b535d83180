//! Bounding-box to read-window resolution.
//!
//! This is the orchestration layer: normalize the SRS pair, project the
//! query bbox into base-level pixel space, snap it to an integer window,
//! optionally refine the window through the overview pyramid, decide how to
//! read (fully outside / clamped / as-is), and rebuild the geotransform and
//! world extent the returned window actually covers.

use std::sync::Arc;

use tracing::debug;

use crate::affine::{Affine, Geotransform};
use crate::cancel::CancelToken;
use crate::error::{ClipError, Result};
use crate::geometry::{reproject_bbox, BoundingBox, Point};
use crate::geometry::projection::SrsTransformer;
use crate::overview::{select_overview, Selection};
use crate::raster::{RasterData, RasterImage, RasterSource, ReadRequest};
use crate::srs::{resolve_raster_srs, Srs};
use crate::window::ReadWindow;

/// How many boundary samples per bbox edge when reprojecting between SRSs.
pub const DEFAULT_DENSITY: usize = 100;

/// Options for a resolve call.
///
/// Only `bbox` and `srs` are required; everything else defaults to the
/// plain base-level read.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// The query bounding box, in `srs` coordinates.
    pub bbox: BoundingBox,
    /// The SRS the bbox is expressed in.
    pub srs: Srs,
    /// Override for the raster's SRS, skipping geo-key resolution.
    pub raster_srs: Option<Srs>,
    /// Intersect the window with the image bounds before reading.
    pub clamp: bool,
    /// Boundary samples per bbox edge during reprojection.
    pub density: usize,
    /// Value for pixels outside the image.
    pub fill_value: Option<f64>,
    /// Symmetric window padding in (x, y) pixels.
    pub padding: (i64, i64),
    /// Opt in to overview selection. Only effective when both targets are
    /// set.
    pub use_overview: bool,
    pub target_width: Option<usize>,
    pub target_height: Option<usize>,
    /// Cooperative cancellation, checked at entry and forwarded to the read.
    pub cancel: CancelToken,
}

impl ResolveOptions {
    #[must_use]
    pub fn new(bbox: impl Into<BoundingBox>, srs: impl Into<Srs>) -> Self {
        Self {
            bbox: bbox.into(),
            srs: srs.into(),
            raster_srs: None,
            clamp: false,
            density: DEFAULT_DENSITY,
            fill_value: None,
            padding: (0, 0),
            use_overview: false,
            target_width: None,
            target_height: None,
            cancel: CancelToken::new(),
        }
    }
}

/// The outcome of a resolve call. Immutable once built.
///
/// Legacy field names from older callers are available through
/// [`Resolution::legacy`].
pub struct Resolution {
    /// The integer window that was read, in the selected level's pixel
    /// space.
    pub window: ReadWindow,
    /// World extent of the window, in the raster's SRS.
    pub bbox: BoundingBox,
    /// The window expressed as a continuous base-level pixel bbox.
    pub base_window: BoundingBox,
    /// The window as a "simple" pixel bbox: base-level columns, rows
    /// measured upward from the image bottom.
    pub simple_bbox: BoundingBox,
    /// Geotransform of the returned data at the selected level.
    pub geotransform: Geotransform,
    /// Pixel dimensions of the returned data. Signed: an inverted input
    /// bbox propagates into inverted dimensions.
    pub width: i64,
    pub height: i64,
    /// Selected pyramid level; 0 is the base.
    pub index: usize,
    /// The selected level's image handle.
    pub image: Arc<dyn RasterImage>,
    /// The raster's resolved SRS.
    pub srs: Srs,
    /// Decoded (or fill-synthesized) band arrays.
    pub data: RasterData,
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("window", &self.window)
            .field("bbox", &self.bbox)
            .field("base_window", &self.base_window)
            .field("simple_bbox", &self.simple_bbox)
            .field("geotransform", &self.geotransform)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("index", &self.index)
            .field("image", &"<dyn RasterImage>")
            .field("srs", &self.srs)
            .field("data", &self.data)
            .finish()
    }
}

/// Whether a window misses the image entirely, making pixel I/O pointless.
fn fully_outside(window: &ReadWindow, image_width: usize, image_height: usize) -> bool {
    window.right <= 0
        || window.bottom <= 0
        || window.left >= image_width as i64
        || window.top >= image_height as i64
}

/// Project the query bbox into base-level pixel coordinates.
fn bbox_to_base_pixels(
    bbox: BoundingBox,
    bbox_srs: &Srs,
    raster_srs: &Srs,
    affine: &Affine,
    image_height: usize,
    density: usize,
) -> Result<BoundingBox> {
    if bbox_srs.is_simple() {
        // Already pixel coordinates, y measured up from the image bottom:
        // flip rows and swap the y bounds.
        return Ok(BoundingBox::new(
            bbox.minx,
            image_height as f64 - bbox.maxy,
            bbox.maxx,
            image_height as f64 - bbox.miny,
        ));
    }

    if bbox_srs == raster_srs {
        debug!("query and raster srs are identical, skipping reprojection");
        let pixels = bbox.corners().map(|corner| affine.inverse(corner));
        let mut survivors = Vec::with_capacity(4);
        for pixel in pixels {
            survivors.push(pixel?);
        }
        return BoundingBox::enclosing(survivors).ok_or_else(|| {
            ClipError::Projection("bbox corners map to non-finite pixels".to_string())
        });
    }

    raster_srs.validate()?;
    bbox_srs.validate()?;
    let transformer = SrsTransformer::between(bbox_srs, raster_srs)?;
    reproject_bbox(
        bbox,
        |point| affine.inverse(transformer.forward(point)?),
        density,
    )
}

/// Resolve a bounding box against a raster and read the covered pixels.
///
/// The returned [`Resolution`] reports exactly which window was read, at
/// which pyramid level, and the geotransform and world extent that window
/// covers. A bbox entirely outside the raster is not an error: it yields
/// fill-valued band arrays without touching the pixel-read collaborator.
pub async fn read_bbox(source: &dyn RasterSource, options: ResolveOptions) -> Result<Resolution> {
    if options.cancel.is_cancelled() {
        return Err(ClipError::Cancelled);
    }

    let base_image = source.image(0).await?;
    let image_width = base_image.width();
    let image_height = base_image.height();
    debug!(image_width, image_height, "resolved base image");

    let geo_key = if options.raster_srs.is_none() {
        base_image.srs_code().await?
    } else {
        None
    };
    let raster_srs = resolve_raster_srs(options.raster_srs.clone(), geo_key, &options.srs)?;
    debug!(%raster_srs, "raster srs");

    let geotransform = base_image
        .geotransform()
        .ok_or(ClipError::MissingGeoreferencing)?;
    let affine = Affine::new(geotransform);
    debug!(?geotransform, "geotransform");

    let base_bbox = bbox_to_base_pixels(
        options.bbox,
        &options.srs,
        &raster_srs,
        &affine,
        image_height,
        options.density,
    )?;
    debug!(?base_bbox, "bbox in base pixel coordinates");

    let base_window = ReadWindow::snap(base_bbox, options.padding);
    debug!(?base_window, "base read window");

    let mut selected = Selection::base(Arc::clone(&base_image), base_window);
    if options.use_overview {
        if let (Some(target_width), Some(target_height)) =
            (options.target_width, options.target_height)
        {
            selected = select_overview(
                source,
                selected,
                base_bbox,
                options.padding,
                target_width,
                target_height,
            )
            .await?;
            debug!(index = selected.index, window = ?selected.window, "selected level");
        }
    }

    let data = if fully_outside(&selected.window, selected.image_width, selected.image_height) {
        debug!(window = ?selected.window, "window entirely outside raster, synthesizing fill");
        let fill = options.fill_value.unwrap_or(f64::NAN);
        let area = (selected.read_width * selected.read_height).max(0) as usize;
        RasterData {
            bands: vec![vec![fill; area]; base_image.bands()],
            width: selected.read_width.max(0) as usize,
            height: selected.read_height.max(0) as usize,
        }
    } else {
        if options.clamp {
            let bounds = ReadWindow::new(
                0,
                0,
                selected.image_width as i64,
                selected.image_height as i64,
            );
            selected.window = selected.window.intersect(&bounds);
            selected.read_width = selected.window.width();
            selected.read_height = selected.window.height();
            debug!(window = ?selected.window, "clamped read window");
        }
        debug!(window = ?selected.window, "reading rasters");
        selected
            .image
            .read_rasters(ReadRequest {
                window: selected.window,
                fill_value: options.fill_value,
                cancel: options.cancel.clone(),
            })
            .await?
    };

    // Everything below maps the level window back into base-level pixel
    // space and raster-SRS world space.
    let unscaled = selected.window.unscale(selected.ratio);
    let read_bbox = BoundingBox::enclosing(unscaled.corners().map(|c| affine.forward(c)))
        .ok_or_else(|| ClipError::Projection("window corners map to non-finite world coordinates".to_string()))?;

    let upper_left = affine.forward(Point::new(unscaled.minx, unscaled.miny));
    let read_geotransform = [
        upper_left.x,
        geotransform[1] / selected.ratio.0,
        geotransform[2] / selected.ratio.1,
        upper_left.y,
        geotransform[4] / selected.ratio.0,
        geotransform[5] / selected.ratio.1,
    ];

    let simple_bbox = BoundingBox::new(
        unscaled.minx,
        image_height as f64 - unscaled.maxy,
        unscaled.maxx,
        image_height as f64 - unscaled.miny,
    );

    Ok(Resolution {
        window: selected.window,
        bbox: read_bbox,
        base_window: unscaled,
        simple_bbox,
        geotransform: read_geotransform,
        width: selected.read_width,
        height: selected.read_height,
        index: selected.index,
        image: selected.image,
        srs: raster_srs,
        data,
    })
}
