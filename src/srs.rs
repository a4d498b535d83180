//! Spatial reference identifiers and their normalization.
//!
//! An SRS arrives as a numeric EPSG code, an `EPSG:<n>` string, raw WKT, a
//! proj4 definition string, or the sentinel `"simple"` meaning the bounding
//! box is already in pixel coordinates with y measured upward from the image
//! bottom. The sentinel is a proper variant here rather than a magic string.
//!
//! Two identifiers are equal only structurally; no semantic SRS equivalence
//! checking happens anywhere in this crate.

use std::fmt;

use crate::error::{ClipError, Result};
use crate::geometry::projection::known_epsg;

/// The well-known geo-key value for "user-defined / undefined" SRS.
pub const EPSG_UNDEFINED: u32 = 32767;

/// A normalized spatial reference identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Srs {
    /// Pixel coordinates, y measured upward from the image bottom.
    Simple,
    /// A numeric EPSG code.
    Epsg(u32),
    /// A raw WKT definition (recognized by its bracket-delimited shape).
    Wkt(String),
    /// A raw proj4 definition (recognized by its `+` prefix).
    Proj4(String),
    /// Anything else; carried along and rejected if a transform is needed.
    Unrecognized(String),
}

impl Srs {
    /// Normalize a raw string identifier.
    ///
    /// Never fails: unrecognized values are carried as [`Srs::Unrecognized`]
    /// and only rejected by [`Srs::validate`] once a cartographic transform
    /// actually requires them.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("simple") {
            return Srs::Simple;
        }
        if let Some(code) = trimmed
            .strip_prefix("EPSG:")
            .or_else(|| trimmed.strip_prefix("epsg:"))
        {
            if let Ok(code) = code.parse::<u32>() {
                return Srs::Epsg(code);
            }
        }
        if trimmed.contains('[') {
            return Srs::Wkt(trimmed.to_string());
        }
        if trimmed.starts_with('+') {
            return Srs::Proj4(trimmed.to_string());
        }
        Srs::Unrecognized(trimmed.to_string())
    }

    #[inline]
    #[must_use]
    pub fn is_simple(&self) -> bool {
        matches!(self, Srs::Simple)
    }

    /// Check that this identifier can feed a cartographic transform.
    ///
    /// EPSG codes must exist in the bundled definitions table; WKT and proj4
    /// payloads pass on shape alone. Only consulted when the query and
    /// raster SRS differ.
    pub fn validate(&self) -> Result<()> {
        match self {
            Srs::Epsg(code) if !known_epsg(*code) => {
                Err(ClipError::UnknownSrs(format!("EPSG:{code}")))
            }
            Srs::Unrecognized(raw) => Err(ClipError::UnknownSrs(raw.clone())),
            _ => Ok(()),
        }
    }
}

impl From<u32> for Srs {
    fn from(code: u32) -> Self {
        Srs::Epsg(code)
    }
}

impl From<&str> for Srs {
    fn from(raw: &str) -> Self {
        Srs::parse(raw)
    }
}

impl fmt::Display for Srs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Srs::Simple => write!(f, "simple"),
            Srs::Epsg(code) => write!(f, "EPSG:{code}"),
            Srs::Wkt(s) | Srs::Proj4(s) | Srs::Unrecognized(s) => f.write_str(s),
        }
    }
}

/// Determine the raster's SRS from an explicit override or its geo-keys.
///
/// A raster whose geo-keys yield nothing (or the undefined sentinel) is only
/// acceptable when the query is in simple pixel coordinates; otherwise the
/// raster cannot be located in any world space and the call fails.
pub(crate) fn resolve_raster_srs(
    explicit: Option<Srs>,
    geo_key_code: Option<u32>,
    query: &Srs,
) -> Result<Srs> {
    let srs = match explicit {
        Some(srs) => srs,
        None => match geo_key_code {
            Some(code) => Srs::Epsg(code),
            None => {
                if query.is_simple() {
                    return Ok(Srs::Simple);
                }
                return Err(ClipError::UnresolvableSrs);
            }
        },
    };
    if srs == Srs::Epsg(EPSG_UNDEFINED) && !query.is_simple() {
        return Err(ClipError::UnresolvableSrs);
    }
    Ok(srs)
}
