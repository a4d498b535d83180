//! Cartographic point transforms between two spatial reference systems,
//! pure Rust via proj4rs + the crs-definitions database.
//!
//! EPSG codes resolve to proj4 strings through crs-definitions (~thousands
//! of codes including UTM zones and national grids). Raw proj4 definitions
//! are consumed directly. WKT payloads are recognized identifiers but the
//! proj4rs backend cannot parse them, so building a transformer from one
//! fails.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::{ClipError, Result};
use crate::geometry::Point;
use crate::srs::Srs;

/// Whether an EPSG code exists in the bundled definitions table.
#[inline]
#[must_use]
pub fn known_epsg(code: u32) -> bool {
    u16::try_from(code)
        .ok()
        .and_then(crs_definitions::from_code)
        .is_some()
}

/// Get the proj4 definition string for an SRS identifier.
fn proj_definition(srs: &Srs) -> Result<String> {
    match srs {
        Srs::Epsg(code) => u16::try_from(*code)
            .ok()
            .and_then(crs_definitions::from_code)
            .map(|def| def.proj4.to_string())
            .ok_or_else(|| ClipError::UnknownSrs(format!("EPSG:{code}"))),
        Srs::Proj4(def) => Ok(def.clone()),
        Srs::Wkt(_) => Err(ClipError::Projection(
            "WKT definitions are not supported by the proj4rs backend".to_string(),
        )),
        Srs::Simple => Err(ClipError::Projection(
            "simple pixel coordinates have no cartographic definition".to_string(),
        )),
        Srs::Unrecognized(raw) => Err(ClipError::UnknownSrs(raw.clone())),
    }
}

/// Whether a proj4 definition describes a geographic (lon/lat, degrees) CRS.
fn is_geographic(definition: &str) -> bool {
    definition.contains("+proj=longlat")
}

/// A forward/inverse point transform between two spatial reference systems.
///
/// `forward` maps from the first SRS to the second, `inverse` the other way.
/// proj4rs works in radians for geographic ends; the degree/radian
/// conversion is handled here so callers only ever see degrees.
#[derive(Debug)]
pub struct SrsTransformer {
    from: Proj,
    to: Proj,
    from_is_geographic: bool,
    to_is_geographic: bool,
}

impl SrsTransformer {
    /// Build a transformer between two SRS identifiers.
    pub fn between(from: &Srs, to: &Srs) -> Result<Self> {
        let from_def = proj_definition(from)?;
        let to_def = proj_definition(to)?;

        let from_proj = Proj::from_proj_string(&from_def)
            .map_err(|e| ClipError::Projection(format!("invalid definition for {from}: {e:?}")))?;
        let to_proj = Proj::from_proj_string(&to_def)
            .map_err(|e| ClipError::Projection(format!("invalid definition for {to}: {e:?}")))?;

        Ok(Self {
            from: from_proj,
            to: to_proj,
            from_is_geographic: is_geographic(&from_def),
            to_is_geographic: is_geographic(&to_def),
        })
    }

    /// Map a point from the first SRS into the second.
    pub fn forward(&self, point: Point) -> Result<Point> {
        project(&self.from, &self.to, self.from_is_geographic, self.to_is_geographic, point)
    }

    /// Map a point from the second SRS back into the first.
    pub fn inverse(&self, point: Point) -> Result<Point> {
        project(&self.to, &self.from, self.to_is_geographic, self.from_is_geographic, point)
    }
}

fn project(
    from: &Proj,
    to: &Proj,
    from_is_geographic: bool,
    to_is_geographic: bool,
    point: Point,
) -> Result<Point> {
    let (x_in, y_in) = if from_is_geographic {
        (point.x.to_radians(), point.y.to_radians())
    } else {
        (point.x, point.y)
    };

    let mut coords = (x_in, y_in, 0.0);
    transform(from, to, &mut coords)
        .map_err(|e| ClipError::Projection(format!("transform failed: {e:?}")))?;

    if to_is_geographic {
        Ok(Point::new(coords.0.to_degrees(), coords.1.to_degrees()))
    } else {
        Ok(Point::new(coords.0, coords.1))
    }
}
