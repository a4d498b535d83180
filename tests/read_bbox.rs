//! End-to-end resolution tests against an in-memory mock raster.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geoclip::{
    read_bbox, BoundingBox, CancelToken, ClipError, Geotransform, LegacySrs, RasterData,
    RasterImage, RasterSource, ReadRequest, ReadWindow, ResolveOptions, Srs,
};

struct MockLevel {
    width: usize,
    height: usize,
    bands: usize,
    geotransform: Option<Geotransform>,
    srs_code: Option<u32>,
    mask: bool,
    reads: Arc<Mutex<Vec<ReadWindow>>>,
}

#[async_trait]
impl RasterImage for MockLevel {
    fn width(&self) -> usize {
        self.width
    }
    fn height(&self) -> usize {
        self.height
    }
    fn bands(&self) -> usize {
        self.bands
    }
    fn geotransform(&self) -> Option<Geotransform> {
        self.geotransform
    }
    fn is_transparency_mask(&self) -> bool {
        self.mask
    }
    async fn srs_code(&self) -> geoclip::Result<Option<u32>> {
        Ok(self.srs_code)
    }
    async fn read_rasters(&self, request: ReadRequest) -> geoclip::Result<RasterData> {
        self.reads.lock().unwrap().push(request.window);
        let width = request.window.width().max(0) as usize;
        let height = request.window.height().max(0) as usize;
        let bands = (0..self.bands)
            .map(|band| vec![band as f64; width * height])
            .collect();
        Ok(RasterData { bands, width, height })
    }
}

struct MockRaster {
    levels: Vec<Arc<MockLevel>>,
    fetches: AtomicUsize,
}

#[async_trait]
impl RasterSource for MockRaster {
    async fn image(&self, index: usize) -> geoclip::Result<Arc<dyn RasterImage>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.levels
            .get(index)
            .cloned()
            .map(|level| level as Arc<dyn RasterImage>)
            .ok_or_else(|| ClipError::Read(format!("no level {index}").into()))
    }
    async fn image_count(&self) -> geoclip::Result<usize> {
        Ok(self.levels.len())
    }
}

/// Quarter-degree pixels over world x 0..100, y 0..100, origin top-left.
const QUARTER_DEGREE: Geotransform = [0.0, 0.25, 0.0, 100.0, 0.0, -0.25];

struct RasterBuilder {
    levels: Vec<Arc<MockLevel>>,
    reads: Arc<Mutex<Vec<ReadWindow>>>,
}

impl RasterBuilder {
    fn new() -> Self {
        Self { levels: Vec::new(), reads: Arc::new(Mutex::new(Vec::new())) }
    }

    fn base(self, width: usize, height: usize, geotransform: Geotransform, srs: u32) -> Self {
        self.push(width, height, Some(geotransform), Some(srs), false)
    }

    fn overview(self, width: usize, height: usize) -> Self {
        self.push(width, height, None, None, false)
    }

    fn mask(self, width: usize, height: usize) -> Self {
        self.push(width, height, None, None, true)
    }

    fn push(
        mut self,
        width: usize,
        height: usize,
        geotransform: Option<Geotransform>,
        srs_code: Option<u32>,
        mask: bool,
    ) -> Self {
        self.levels.push(Arc::new(MockLevel {
            width,
            height,
            bands: 3,
            geotransform,
            srs_code,
            mask,
            reads: Arc::clone(&self.reads),
        }));
        self
    }

    fn build(self) -> (MockRaster, Arc<Mutex<Vec<ReadWindow>>>) {
        (MockRaster { levels: self.levels, fetches: AtomicUsize::new(0) }, self.reads)
    }
}

fn quarter_degree_raster() -> (MockRaster, Arc<Mutex<Vec<ReadWindow>>>) {
    RasterBuilder::new().base(400, 400, QUARTER_DEGREE, 4326).build()
}

#[tokio::test]
async fn resolves_window_in_same_srs() {
    let (raster, reads) = quarter_degree_raster();
    let options = ResolveOptions::new(BoundingBox::new(10.1, 20.2, 30.3, 40.4), 4326u32);
    let result = read_bbox(&raster, options).await.unwrap();

    // floor(10.1/0.25)=40, floor((100-40.4)/0.25)=238,
    // ceil(30.3/0.25)=122, ceil((100-20.2)/0.25)=320
    assert_eq!(result.window, ReadWindow::new(40, 238, 122, 320));
    assert_eq!(result.width, 82);
    assert_eq!(result.height, 82);
    assert_eq!(result.index, 0);
    assert_eq!(result.srs, Srs::Epsg(4326));

    // Snapped outward to whole-pixel world bounds.
    assert_eq!(result.bbox, BoundingBox::new(10.0, 20.0, 30.5, 40.5));
    assert_eq!(result.geotransform, [10.0, 0.25, 0.0, 40.5, 0.0, -0.25]);
    assert_eq!(result.base_window, BoundingBox::new(40.0, 238.0, 122.0, 320.0));
    assert_eq!(result.simple_bbox, BoundingBox::new(40.0, 80.0, 122.0, 162.0));

    let recorded = reads.lock().unwrap();
    assert_eq!(*recorded, vec![ReadWindow::new(40, 238, 122, 320)]);
    assert_eq!(result.data.bands.len(), 3);
    assert_eq!(result.data.bands[0].len(), 82 * 82);
}

#[tokio::test]
async fn full_extent_query_covers_whole_image() {
    let (raster, _) = quarter_degree_raster();
    let options = ResolveOptions::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), 4326u32);
    let result = read_bbox(&raster, options).await.unwrap();

    assert_eq!(result.window, ReadWindow::new(0, 0, 400, 400));
    assert_eq!(result.index, 0);
    assert_eq!(result.bbox, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
}

#[tokio::test]
async fn padding_widens_window_symmetrically() {
    let (raster, _) = quarter_degree_raster();
    let mut options = ResolveOptions::new(BoundingBox::new(10.1, 20.2, 30.3, 40.4), 4326u32);
    options.padding = (2, 3);
    let result = read_bbox(&raster, options).await.unwrap();

    assert_eq!(result.window, ReadWindow::new(38, 235, 124, 323));
    assert_eq!(result.width, 86);
    assert_eq!(result.height, 88);
}

#[tokio::test]
async fn fully_outside_bbox_synthesizes_fill_without_io() {
    let (raster, reads) = quarter_degree_raster();
    let mut options = ResolveOptions::new(BoundingBox::new(-50.0, -50.0, -40.0, -40.0), 4326u32);
    options.fill_value = Some(99.5);
    let result = read_bbox(&raster, options).await.unwrap();

    assert_eq!(result.window, ReadWindow::new(-200, 560, -160, 600));
    assert_eq!(result.width, 40);
    assert_eq!(result.height, 40);
    assert_eq!(result.data.bands.len(), 3);
    for band in &result.data.bands {
        assert_eq!(band.len(), 40 * 40);
        assert!(band.iter().all(|&v| v == 99.5));
    }
    assert!(reads.lock().unwrap().is_empty(), "no pixel I/O may happen");
}

#[tokio::test]
async fn clamp_intersects_window_with_image_bounds() {
    let (raster, reads) = quarter_degree_raster();
    let mut options = ResolveOptions::new(BoundingBox::new(-10.0, 90.0, 10.0, 110.0), 4326u32);
    options.clamp = true;
    let result = read_bbox(&raster, options).await.unwrap();

    assert_eq!(result.window, ReadWindow::new(0, 0, 40, 40));
    assert_eq!(result.width, 40);
    assert_eq!(result.height, 40);
    assert_eq!(*reads.lock().unwrap(), vec![ReadWindow::new(0, 0, 40, 40)]);
}

/// One world unit per base pixel, 4096 square, with a 2x/4x/8x pyramid.
fn pyramid_raster() -> RasterBuilder {
    RasterBuilder::new().base(4096, 4096, [0.0, 1.0, 0.0, 4096.0, 0.0, -1.0], 4326)
}

#[tokio::test]
async fn overview_walk_selects_coarsest_level_meeting_target() {
    let (raster, reads) = pyramid_raster()
        .overview(2048, 2048)
        .overview(1024, 1024)
        .overview(512, 512)
        .build();

    // 1000x1000 base pixels: level 1 gives 500x500 (>= 256), level 2 would
    // give 250x250 and ends the walk.
    let mut options = ResolveOptions::new(BoundingBox::new(1000.0, 2096.0, 2000.0, 3096.0), 4326u32);
    options.use_overview = true;
    options.target_width = Some(256);
    options.target_height = Some(256);
    let result = read_bbox(&raster, options).await.unwrap();

    assert_eq!(result.index, 1);
    assert_eq!(result.window, ReadWindow::new(500, 500, 1000, 1000));
    assert_eq!(result.width, 500);
    assert_eq!(result.height, 500);

    // Reconstruction back to base-level pixel and world space.
    assert_eq!(result.base_window, BoundingBox::new(1000.0, 1000.0, 2000.0, 2000.0));
    assert_eq!(result.bbox, BoundingBox::new(1000.0, 2096.0, 2000.0, 3096.0));
    // Pixel size doubles at half resolution.
    assert_eq!(result.geotransform, [1000.0, 2.0, 0.0, 3096.0, 0.0, -2.0]);

    assert_eq!(*reads.lock().unwrap(), vec![ReadWindow::new(500, 500, 1000, 1000)]);
}

#[tokio::test]
async fn overview_walk_skips_transparency_masks() {
    let (raster, _) = pyramid_raster()
        .mask(2048, 2048)
        .overview(2048, 2048)
        .overview(512, 512)
        .build();

    let mut options = ResolveOptions::new(BoundingBox::new(1000.0, 2096.0, 2000.0, 3096.0), 4326u32);
    options.use_overview = true;
    options.target_width = Some(256);
    options.target_height = Some(256);
    let result = read_bbox(&raster, options).await.unwrap();

    // The mask at index 1 does not end the walk; the imagery at index 2 is
    // accepted, index 3 misses the target and stops the search.
    assert_eq!(result.index, 2);
    assert_eq!(result.width, 500);
}

#[tokio::test]
async fn overview_walk_stops_at_first_miss() {
    // Level 1 already misses the target; the satisfiable level 2 (identical
    // to the base) must never be considered. Greedy, not exhaustive.
    let (raster, _) = pyramid_raster()
        .overview(256, 256)
        .overview(4096, 4096)
        .build();

    let mut options = ResolveOptions::new(BoundingBox::new(1000.0, 2096.0, 2000.0, 3096.0), 4326u32);
    options.use_overview = true;
    options.target_width = Some(256);
    options.target_height = Some(256);
    let result = read_bbox(&raster, options).await.unwrap();

    assert_eq!(result.index, 0);
    assert_eq!(result.width, 1000);
}

#[tokio::test]
async fn overview_needs_both_target_dimensions() {
    let (raster, _) = pyramid_raster().overview(2048, 2048).build();

    let mut options = ResolveOptions::new(BoundingBox::new(1000.0, 2096.0, 2000.0, 3096.0), 4326u32);
    options.use_overview = true;
    options.target_width = Some(256);
    let result = read_bbox(&raster, options).await.unwrap();

    assert_eq!(result.index, 0);
}

#[tokio::test]
async fn simple_mode_flips_rows_from_image_bottom() {
    let (raster, reads) = quarter_degree_raster();
    let options = ResolveOptions::new(BoundingBox::new(10.0, 20.0, 30.0, 40.0), "simple");
    let result = read_bbox(&raster, options).await.unwrap();

    assert_eq!(result.window, ReadWindow::new(10, 360, 30, 380));
    // The simple bbox round-trips to the query.
    assert_eq!(result.simple_bbox, BoundingBox::new(10.0, 20.0, 30.0, 40.0));
    assert_eq!(result.srs, Srs::Epsg(4326));
    assert_eq!(reads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn differing_srs_reprojects_through_raster_space() {
    // One zoom-0 web mercator "tile": 256x256 pixels across the full extent.
    const MERC_EXTENT: f64 = 20_037_508.342_789_244;
    const MERC_PIXEL: f64 = MERC_EXTENT * 2.0 / 256.0;
    let (raster, _) = RasterBuilder::new()
        .base(256, 256, [-MERC_EXTENT, MERC_PIXEL, 0.0, MERC_EXTENT, 0.0, -MERC_PIXEL], 3857)
        .build();

    let options = ResolveOptions::new(BoundingBox::new(-10.0, -10.0, 10.0, 10.0), 4326u32);
    let result = read_bbox(&raster, options).await.unwrap();

    assert_eq!(result.srs, Srs::Epsg(3857));
    assert_eq!(result.window, ReadWindow::new(120, 120, 136, 136));
    // The recovered world extent (in EPSG:3857) encloses the query bbox.
    const TEN_DEG_MERC: f64 = 1_113_194.907_932_735_7;
    assert!(result.bbox.minx <= -TEN_DEG_MERC);
    assert!(result.bbox.maxx >= TEN_DEG_MERC);
    assert!(result.bbox.miny <= -1_118_889.974_857_959);
    assert!(result.bbox.maxy >= 1_118_889.974_857_959);
}

#[tokio::test]
async fn cancelled_token_fails_before_any_fetch() {
    let (raster, reads) = quarter_degree_raster();
    let mut options = ResolveOptions::new(BoundingBox::new(10.0, 20.0, 30.0, 40.0), 4326u32);
    options.cancel = CancelToken::new();
    options.cancel.cancel();
    let err = read_bbox(&raster, options).await.unwrap_err();

    assert!(matches!(err, ClipError::Cancelled));
    assert_eq!(raster.fetches.load(Ordering::SeqCst), 0);
    assert!(reads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_geotransform_is_fatal() {
    let (raster, _) = RasterBuilder::new()
        .push(400, 400, None, Some(4326), false)
        .build();
    let err = read_bbox(&raster, ResolveOptions::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 4326u32))
        .await
        .unwrap_err();
    assert!(matches!(err, ClipError::MissingGeoreferencing));
}

#[tokio::test]
async fn unresolvable_raster_srs_is_fatal() {
    let (raster, _) = RasterBuilder::new()
        .push(400, 400, Some(QUARTER_DEGREE), None, false)
        .build();
    let err = read_bbox(&raster, ResolveOptions::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 4326u32))
        .await
        .unwrap_err();
    assert!(matches!(err, ClipError::UnresolvableSrs));
}

#[tokio::test]
async fn undefined_srs_sentinel_is_fatal() {
    let (raster, _) = RasterBuilder::new()
        .push(400, 400, Some(QUARTER_DEGREE), Some(geoclip::EPSG_UNDEFINED), false)
        .build();
    let err = read_bbox(&raster, ResolveOptions::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 4326u32))
        .await
        .unwrap_err();
    assert!(matches!(err, ClipError::UnresolvableSrs));
}

#[tokio::test]
async fn explicit_raster_srs_skips_geo_key_lookup() {
    let (raster, _) = RasterBuilder::new()
        .push(400, 400, Some(QUARTER_DEGREE), None, false)
        .build();
    let mut options = ResolveOptions::new(BoundingBox::new(10.0, 20.0, 30.0, 40.0), 4326u32);
    options.raster_srs = Some(Srs::Epsg(4326));
    let result = read_bbox(&raster, options).await.unwrap();
    assert_eq!(result.srs, Srs::Epsg(4326));
}

#[tokio::test]
async fn unknown_query_srs_is_named_in_error() {
    let (raster, _) = quarter_degree_raster();
    let options = ResolveOptions::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), "ESRI:54009");
    let err = read_bbox(&raster, options).await.unwrap_err();
    assert!(matches!(err, ClipError::UnknownSrs(name) if name == "ESRI:54009"));
}

#[tokio::test]
async fn legacy_view_forwards_to_canonical_fields() {
    let (raster, _) = quarter_degree_raster();
    let options = ResolveOptions::new(BoundingBox::new(10.1, 20.2, 30.3, 40.4), 4326u32);
    let result = read_bbox(&raster, options).await.unwrap();

    let legacy = result.legacy();
    // Deprecated ordering is [left, bottom, right, top].
    assert_eq!(legacy.read_window(), [40, 320, 122, 238]);
    assert_eq!(legacy.read_bbox(), result.bbox);
    assert_eq!(legacy.selected_image_index(), 0);
    assert_eq!(legacy.srs_of_geotiff(), LegacySrs::Code(4326));
    assert_eq!(legacy.selected_image().width(), 400);
}
