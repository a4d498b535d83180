//! Greedy overview (pyramid level) selection.
//!
//! Given a target output size, walk the overview levels in ascending index
//! order and keep the coarsest level whose snapped window still meets the
//! target in both axes. Ascending index is assumed to mean non-increasing
//! resolution; this is not verified. The walk is greedy: the first non-mask
//! level that misses the target ends the search immediately, even though a
//! later level could in principle still satisfy it. Downstream consumers
//! depend on the exact index this picks, so the early exit is load-bearing,
//! not an optimization to revisit.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::Result;
use crate::geometry::BoundingBox;
use crate::raster::{RasterImage, RasterSource};
use crate::window::ReadWindow;

/// The level currently chosen to read from, with everything the read and the
/// later reconstruction need.
pub(crate) struct Selection {
    pub image: Arc<dyn RasterImage>,
    pub index: usize,
    /// (height ratio, width ratio) of this level relative to the base;
    /// the height ratio scales x bounds and the width ratio scales y bounds,
    /// matching how the scaled bbox has always been computed here.
    pub ratio: (f64, f64),
    pub window: ReadWindow,
    pub read_width: i64,
    pub read_height: i64,
    pub image_width: usize,
    pub image_height: usize,
}

impl Selection {
    /// The base-level selection: full resolution, unit ratio.
    pub fn base(image: Arc<dyn RasterImage>, window: ReadWindow) -> Self {
        let image_width = image.width();
        let image_height = image.height();
        Self {
            image,
            index: 0,
            ratio: (1.0, 1.0),
            window,
            read_width: window.width(),
            read_height: window.height(),
            image_width,
            image_height,
        }
    }
}

/// What to do with one candidate level.
pub(crate) enum LevelDecision {
    /// Transparency mask; ignore it and keep walking.
    Skip,
    /// Window still meets the target; becomes the current best.
    Accept(Selection),
    /// Window under target; the walk ends here.
    Stop,
}

/// Classify a single candidate level against the target dimensions.
pub(crate) fn classify_level(
    image: Arc<dyn RasterImage>,
    index: usize,
    base_width: usize,
    base_height: usize,
    base_bbox: BoundingBox,
    padding: (i64, i64),
    target_width: usize,
    target_height: usize,
) -> LevelDecision {
    if image.is_transparency_mask() {
        trace!(index, "ignoring transparency mask level");
        return LevelDecision::Skip;
    }

    let ratio = (
        image.height() as f64 / base_height as f64,
        image.width() as f64 / base_width as f64,
    );
    let window = ReadWindow::snap(base_bbox.scale(ratio), padding);
    let (read_width, read_height) = (window.width(), window.height());
    trace!(index, ?ratio, ?window, "candidate level");

    if read_height >= target_height as i64 && read_width >= target_width as i64 {
        let image_width = image.width();
        let image_height = image.height();
        LevelDecision::Accept(Selection {
            image,
            index,
            ratio,
            window,
            read_width,
            read_height,
            image_width,
            image_height,
        })
    } else {
        LevelDecision::Stop
    }
}

/// Walk the pyramid and return the coarsest level still meeting the target,
/// or the base selection when no level does.
///
/// Strictly sequential: each level's metadata fetch is awaited before the
/// next is considered, since the decision for level `i` ends the walk for
/// every level after it.
pub(crate) async fn select_overview(
    source: &dyn RasterSource,
    base: Selection,
    base_bbox: BoundingBox,
    padding: (i64, i64),
    target_width: usize,
    target_height: usize,
) -> Result<Selection> {
    let image_count = source.image_count().await?;
    debug!(image_count, "searching overviews");

    let base_width = base.image_width;
    let base_height = base.image_height;
    let mut selected = base;

    for index in 1..image_count {
        let image = source.image(index).await?;
        match classify_level(
            image,
            index,
            base_width,
            base_height,
            base_bbox,
            padding,
            target_width,
            target_height,
        ) {
            LevelDecision::Skip => continue,
            LevelDecision::Accept(selection) => {
                debug!(index, window = ?selection.window, "overview accepted");
                selected = selection;
            }
            LevelDecision::Stop => break,
        }
    }

    Ok(selected)
}
