pub mod projection;

/// A simple 2D point with x and y coordinates.
///
/// Represents a world coordinate (projected or geographic) or a continuous
/// pixel coordinate, depending on which space the surrounding code is
/// working in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    #[inline]
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    #[inline]
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// An axis-aligned bounding box in some coordinate space.
///
/// The box is an ordered `[minx, miny, maxx, maxy]` tuple. Which space it
/// lives in (query SRS, base-level pixel coordinates, or pixel coordinates
/// at an overview level) is implicit from context. Inverted boxes are legal
/// and propagate as-is; nothing here auto-corrects them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl BoundingBox {
    #[inline]
    #[must_use]
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self { minx, miny, maxx, maxy }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    /// The four corners, counter-clockwise from the lower-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.minx, self.miny),
            Point::new(self.maxx, self.miny),
            Point::new(self.maxx, self.maxy),
            Point::new(self.minx, self.maxy),
        ]
    }

    /// Scale the x bounds by `ratio.0` and the y bounds by `ratio.1`.
    #[must_use]
    pub fn scale(&self, ratio: (f64, f64)) -> Self {
        Self {
            minx: self.minx * ratio.0,
            miny: self.miny * ratio.1,
            maxx: self.maxx * ratio.0,
            maxy: self.maxy * ratio.1,
        }
    }

    /// Intersection with another box. Degenerate when the boxes are disjoint.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            minx: self.minx.max(other.minx),
            miny: self.miny.max(other.miny),
            maxx: self.maxx.min(other.maxx),
            maxy: self.maxy.min(other.maxy),
        }
    }

    /// The smallest box enclosing all finite points in the iterator.
    ///
    /// Returns `None` when no finite point survives.
    pub fn enclosing<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut extent: Option<Self> = None;
        for p in points {
            if !p.is_finite() {
                continue;
            }
            extent = Some(match extent {
                None => Self::new(p.x, p.y, p.x, p.y),
                Some(e) => Self {
                    minx: e.minx.min(p.x),
                    miny: e.miny.min(p.y),
                    maxx: e.maxx.max(p.x),
                    maxy: e.maxy.max(p.y),
                },
            });
        }
        extent
    }
}

impl From<[f64; 4]> for BoundingBox {
    #[inline]
    fn from([minx, miny, maxx, maxy]: [f64; 4]) -> Self {
        Self::new(minx, miny, maxx, maxy)
    }
}

impl From<BoundingBox> for [f64; 4] {
    #[inline]
    fn from(b: BoundingBox) -> Self {
        [b.minx, b.miny, b.maxx, b.maxy]
    }
}

/// Sample the boundary of `bbox` at `density` intervals per edge (corners
/// included) and map every sample through `point_fn`.
///
/// Samples that fail to project or come back non-finite are skipped rather
/// than aborting the whole reprojection; the result is the enclosing extent
/// of the survivors. Curved edges (e.g. a geographic box seen through a
/// projected CRS) are bounded correctly because interior edge points are
/// sampled, not just corners.
pub fn reproject_bbox<F>(
    bbox: BoundingBox,
    mut point_fn: F,
    density: usize,
) -> crate::error::Result<BoundingBox>
where
    F: FnMut(Point) -> crate::error::Result<Point>,
{
    let steps = density.max(1);
    let dx = bbox.width() / steps as f64;
    let dy = bbox.height() / steps as f64;

    let mut projected = Vec::with_capacity(4 * (steps + 1));
    for i in 0..=steps {
        let x = bbox.minx + dx * i as f64;
        let y = bbox.miny + dy * i as f64;
        for sample in [
            Point::new(x, bbox.miny),
            Point::new(x, bbox.maxy),
            Point::new(bbox.minx, y),
            Point::new(bbox.maxx, y),
        ] {
            if let Ok(p) = point_fn(sample) {
                projected.push(p);
            }
        }
    }

    BoundingBox::enclosing(projected).ok_or_else(|| {
        crate::error::ClipError::Projection("no boundary sample survived reprojection".to_string())
    })
}
