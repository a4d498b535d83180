//! Backward-compatible field names for older callers.
//!
//! Earlier releases exposed `read_window`, `read_bbox`,
//! `selected_image_index`, `selected_image` and `srs_of_geotiff`. Those
//! names live on here as an explicit view over the canonical
//! [`Resolution`], each logging a deprecation notice once per process and
//! forwarding to the canonical field.

use std::sync::Arc;
use std::sync::Once;

use tracing::warn;

use crate::geometry::BoundingBox;
use crate::raster::RasterImage;
use crate::resolve::Resolution;
use crate::srs::Srs;

/// The legacy `srs_of_geotiff` value: numeric for EPSG-coded rasters,
/// textual otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacySrs {
    Code(u32),
    Text(String),
}

/// Read-only view exposing the deprecated field names.
pub struct LegacyView<'a> {
    resolution: &'a Resolution,
}

static READ_WINDOW_NOTICE: Once = Once::new();
static READ_BBOX_NOTICE: Once = Once::new();
static INDEX_NOTICE: Once = Once::new();
static IMAGE_NOTICE: Once = Once::new();
static SRS_NOTICE: Once = Once::new();

impl<'a> LegacyView<'a> {
    pub(crate) fn new(resolution: &'a Resolution) -> Self {
        Self { resolution }
    }

    /// Deprecated ordering `[left, bottom, right, top]`; use
    /// [`Resolution::window`] (`[left, top, right, bottom]`) instead.
    #[must_use]
    pub fn read_window(&self) -> [i64; 4] {
        READ_WINDOW_NOTICE.call_once(|| {
            warn!("read_window [left, bottom, right, top] is deprecated, use window [left, top, right, bottom] instead");
        });
        let w = self.resolution.window;
        [w.left, w.bottom, w.right, w.top]
    }

    /// Deprecated; use [`Resolution::bbox`] instead.
    #[must_use]
    pub fn read_bbox(&self) -> BoundingBox {
        READ_BBOX_NOTICE.call_once(|| {
            warn!("read_bbox is deprecated, use bbox instead");
        });
        self.resolution.bbox
    }

    /// Deprecated; use [`Resolution::index`] instead.
    #[must_use]
    pub fn selected_image_index(&self) -> usize {
        INDEX_NOTICE.call_once(|| {
            warn!("selected_image_index is deprecated, use index instead");
        });
        self.resolution.index
    }

    /// Deprecated; use [`Resolution::image`] instead.
    #[must_use]
    pub fn selected_image(&self) -> Arc<dyn RasterImage> {
        IMAGE_NOTICE.call_once(|| {
            warn!("selected_image is deprecated, use image instead");
        });
        Arc::clone(&self.resolution.image)
    }

    /// Deprecated; use [`Resolution::srs`] instead.
    #[must_use]
    pub fn srs_of_geotiff(&self) -> LegacySrs {
        SRS_NOTICE.call_once(|| {
            warn!("srs_of_geotiff is deprecated, use srs instead");
        });
        match &self.resolution.srs {
            Srs::Epsg(code) => LegacySrs::Code(*code),
            other => LegacySrs::Text(other.to_string()),
        }
    }
}

impl Resolution {
    /// The legacy-alias view over this result.
    #[must_use]
    pub fn legacy(&self) -> LegacyView<'_> {
        LegacyView::new(self)
    }
}
