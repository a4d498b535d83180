//! Affine pixel/world mapping from a 6-coefficient geotransform.
//!
//! The geotransform is the GDAL-style tuple
//! `[origin_x, pixel_width, row_rotation, origin_y, column_rotation, pixel_height]`.
//! `pixel_height` is conventionally negative: rows grow downward while world
//! y grows upward.

use crate::error::{ClipError, Result};
use crate::geometry::Point;

/// Raw 6-coefficient geotransform.
pub type Geotransform = [f64; 6];

/// Immutable affine transform between pixel `(col, row)` and world `(x, y)`.
///
/// `forward` and `inverse` are exact mathematical inverses of each other up
/// to floating-point tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    coefficients: Geotransform,
}

impl Affine {
    #[must_use]
    pub fn new(coefficients: Geotransform) -> Self {
        Self { coefficients }
    }

    #[inline]
    #[must_use]
    pub fn coefficients(&self) -> &Geotransform {
        &self.coefficients
    }

    /// Map a pixel coordinate `(col, row)` to a world coordinate.
    #[must_use]
    pub fn forward(&self, pixel: Point) -> Point {
        let [gx, gw, rr, gy, cr, gh] = self.coefficients;
        Point::new(gx + pixel.x * gw + pixel.y * rr, gy + pixel.x * cr + pixel.y * gh)
    }

    /// Map a world coordinate back to a continuous pixel coordinate.
    ///
    /// Solves the 2x2 linear system; fails when the transform is not
    /// invertible.
    pub fn inverse(&self, world: Point) -> Result<Point> {
        let [gx, gw, rr, gy, cr, gh] = self.coefficients;
        let det = gw * gh - rr * cr;
        if det == 0.0 {
            return Err(ClipError::DegenerateTransform);
        }
        let dx = world.x - gx;
        let dy = world.y - gy;
        Ok(Point::new((dx * gh - dy * rr) / det, (dy * gw - dx * cr) / det))
    }
}

impl From<Geotransform> for Affine {
    fn from(coefficients: Geotransform) -> Self {
        Self::new(coefficients)
    }
}
