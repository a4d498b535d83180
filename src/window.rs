//! Integer read windows and the discrete snapping that produces them.

use crate::geometry::BoundingBox;

/// An integer pixel rectangle, top-left origin, rows increasing downward.
///
/// `right > left` and `bottom > top` are expected but not enforced:
/// degenerate or inverted windows (a bbox fully outside the raster, say) are
/// legal inputs to the out-of-bounds path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadWindow {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl ReadWindow {
    #[must_use]
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self { left, top, right, bottom }
    }

    /// Snap a continuous pixel-space bbox to an integer window.
    ///
    /// Rounding is directional, not nearest-integer: floor on the min edges
    /// and ceil on the max edges, so the window never under-covers the
    /// requested area and partial edge pixels are kept. Padding widens the
    /// window symmetrically.
    #[must_use]
    pub fn snap(bbox: BoundingBox, padding: (i64, i64)) -> Self {
        let (pad_x, pad_y) = padding;
        Self {
            left: bbox.minx.floor() as i64 - pad_x,
            top: bbox.miny.floor() as i64 - pad_y,
            right: bbox.maxx.ceil() as i64 + pad_x,
            bottom: bbox.maxy.ceil() as i64 + pad_y,
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    /// Intersection with another window, e.g. the raster bounds when
    /// clamping.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }

    /// The window as a continuous bbox in the same pixel space.
    #[must_use]
    pub fn to_bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.left as f64,
            self.top as f64,
            self.right as f64,
            self.bottom as f64,
        )
    }

    /// The continuous base-level bbox equivalent to this window, obtained by
    /// dividing out the overview ratio.
    #[must_use]
    pub fn unscale(&self, ratio: (f64, f64)) -> BoundingBox {
        self.to_bbox().scale((1.0 / ratio.0, 1.0 / ratio.1))
    }
}

impl From<[i64; 4]> for ReadWindow {
    fn from([left, top, right, bottom]: [i64; 4]) -> Self {
        Self::new(left, top, right, bottom)
    }
}

impl From<ReadWindow> for [i64; 4] {
    fn from(w: ReadWindow) -> Self {
        [w.left, w.top, w.right, w.bottom]
    }
}
