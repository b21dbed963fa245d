//! Accuracy evaluation of a road detection raster against ground truth.
//!
//! Both measures use the same two-phase protocol on a [`ClassMap`]:
//! exclusion rectangles and coverage marks are laid down first, then the
//! reference pixels are counted against them. Exclusion always wins.

pub mod classification;
pub mod ground_truth;
pub mod metrics;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{DynamicImage, Rgb, RgbImage};

use crate::annotation::{Area, Tokens, Track};
use crate::config::{Config, DataLayout, DEFAULT_TOLERANCE_WIDTH};
use crate::error::Error;
use crate::models::{Georeference, Rect};
use crate::raster::{self, BLACK, DrawingBackend, WHITE};

pub use classification::{ClassMap, PixelClass};
pub use ground_truth::{GroundTruthSet, INK_THRESHOLD, TrackId};
pub use metrics::{Scores, Tally, display_metric, f_measure};

/// Lightness above which a detection pixel counts as detected.
pub const DETECTION_THRESHOLD: u8 = 100;

pub fn is_detected(px: Rgb<u8>) -> bool {
    raster::lightness(px) > DETECTION_THRESHOLD
}

/// Compares a detection raster with a set of reference tracks.
pub struct Evaluator {
    width: u32,
    height: u32,
    georef: Option<Georeference>,
    sector: String,
    tolerance_width: u32,
    layout: DataLayout,
    write_diagnostics: bool,

    detection: Option<RgbImage>,
    area: Option<Area>,
    ground_truth: GroundTruthSet,

    recall_map: ClassMap,
    precision_map: ClassMap,
    recall_tally: Tally,
    precision_tally: Tally,
    recall: Option<f32>,
    precision: Option<f32>,
    f_measure: Option<f32>,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("georef", &self.georef)
            .field("sector", &self.sector)
            .field("tracks", &self.ground_truth.len())
            .finish()
    }
}

impl Evaluator {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            width: 0,
            height: 0,
            georef: None,
            sector: String::new(),
            tolerance_width: DEFAULT_TOLERANCE_WIDTH,
            layout,
            write_diagnostics: false,
            detection: None,
            area: None,
            ground_truth: GroundTruthSet::new(),
            recall_map: ClassMap::default(),
            precision_map: ClassMap::default(),
            recall_tally: Tally::default(),
            precision_tally: Tally::default(),
            recall: None,
            precision: None,
            f_measure: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data.clone()).with_tolerance_width(config.evaluation.tolerance_width)
    }

    /// Write mask/recall/precision images to the layout's output directory.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.write_diagnostics = enabled;
        self
    }

    /// Stroke width of the buffered ground truth, used by the next rasterization.
    pub fn with_tolerance_width(mut self, width: u32) -> Self {
        self.tolerance_width = width;
        self
    }

    /// Sets the canvas and georeference and allocates the working rasters.
    ///
    /// Loaded ground truth was converted and rasterized for the previous
    /// canvas, so it is dropped; reload the road set afterwards.
    pub fn configure(&mut self, width: u32, height: u32, georef: Georeference) {
        self.width = width;
        self.height = height;
        self.georef = Some(georef);
        self.recall_map = ClassMap::new(width, height);
        self.precision_map = ClassMap::new(width, height);
        if !self.ground_truth.is_empty() {
            log::debug!("Canvas reconfigured, dropping {} tracks", self.ground_truth.len());
        }
        self.ground_truth.clear();
        self.recall_tally = Tally::default();
        self.precision_tally = Tally::default();
        self.recall = None;
        self.precision = None;
        self.f_measure = None;
    }

    pub fn set_sector_name(&mut self, name: impl Into<String>) {
        self.sector = name.into();
    }

    pub fn sector_name(&self) -> &str {
        &self.sector
    }

    pub fn tolerance_width(&self) -> u32 {
        self.tolerance_width
    }

    pub fn ground_truth(&self) -> &GroundTruthSet {
        &self.ground_truth
    }

    pub fn area(&self) -> Option<&Area> {
        self.area.as_ref()
    }

    pub fn recall_map(&self) -> &ClassMap {
        &self.recall_map
    }

    pub fn precision_map(&self) -> &ClassMap {
        &self.precision_map
    }

    pub fn recall_tally(&self) -> Tally {
        self.recall_tally
    }

    pub fn precision_tally(&self) -> Tally {
        self.precision_tally
    }

    pub fn scores(&self) -> Scores {
        Scores {
            recall: self.recall,
            precision: self.precision,
            f_measure: self.f_measure,
        }
    }

    fn georef(&self) -> Result<Georeference, Error> {
        self.georef.ok_or(Error::NotConfigured("canvas not configured"))
    }

    pub fn load_detection_map<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("Failed to open detection map {:?}", path))?;
        self.set_detection_map(img)?;
        log::debug!("Detection map {:?} loaded", path);
        Ok(())
    }

    pub fn set_detection_map(&mut self, img: DynamicImage) -> Result<(), Error> {
        self.georef()?;
        if img.width() != self.width || img.height() != self.height {
            return Err(Error::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: img.width(),
                height: img.height(),
            });
        }
        self.detection = Some(img.to_rgb8());
        Ok(())
    }

    /// Loads the discarded areas; a file that cannot be read leaves the
    /// exclusion set empty. Returns whether an area was loaded.
    pub fn load_discarded_areas<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<bool> {
        let path = path.as_ref();
        let georef = self.georef()?;
        match Area::from_file(path, &georef) {
            Ok(area) => {
                log::info!("{} loaded", path.display());
                self.area = Some(area);
                Ok(true)
            }
            Err(Error::Io(e)) => {
                log::info!("No {} file found ({})", path.display(), e);
                self.area = None;
                Ok(false)
            }
            Err(e) => Err(anyhow::Error::new(e))
                .with_context(|| format!("Failed to read discarded areas {:?}", path)),
        }
    }

    pub fn set_discarded_areas(&mut self, area: Option<Area>) {
        self.area = area;
    }

    /// Replaces the ground truth with the tracks named in a manifest.
    ///
    /// Tracks that fail to load are skipped with a warning. Fails only if
    /// the manifest itself cannot be read. Returns the number of tracks
    /// loaded.
    pub fn load_road_set<P: AsRef<Path>>(&mut self, manifest: P) -> anyhow::Result<usize> {
        let manifest = manifest.as_ref();
        let georef = self.georef()?;
        self.ground_truth.clear();

        let text = fs::read_to_string(manifest).map_err(|source| Error::MissingRoadSet {
            path: manifest.to_path_buf(),
            source,
        })?;
        let mut tokens = Tokens::new(&text);
        while let Some(id) = tokens.next_raw() {
            let path = self.layout.track_file(id);
            match Track::from_file(&path, &georef) {
                Ok(track) => {
                    log::debug!("Loaded {}", path.display());
                    self.ground_truth.add(track);
                }
                Err(e) => log::warn!("Cannot load {}: {}", path.display(), e),
            }
        }

        self.rasterize();
        Ok(self.ground_truth.len())
    }

    /// Adds one reference track. Call [`Evaluator::rasterize`] afterwards.
    pub fn add_track(&mut self, track: Track) -> TrackId {
        self.ground_truth.add(track)
    }

    /// Recomputes the centerline and buffered pixel sets.
    pub fn rasterize(&mut self) {
        self.ground_truth
            .rasterize(self.width, self.height, self.tolerance_width);
    }

    /// Renders the discarded areas in black over white.
    pub fn get_mask(&self) -> anyhow::Result<RgbImage> {
        self.georef()?;
        let mut mask = RgbImage::from_pixel(self.width, self.height, WHITE);
        if let Some(area) = &self.area {
            for rect in area.rectangles() {
                mask.fill_rect(rect, BLACK);
            }
        }
        self.write_diagnostic(&mask, self.layout.mask_output(&self.sector))?;
        Ok(mask)
    }

    /// Share of centerline pixels lying on a detection, in percent.
    pub fn get_recall(&mut self) -> anyhow::Result<Option<f32>> {
        let detection = checked_detection(&self.detection, self.width, self.height)?;
        let tally = classify_recall(
            &mut self.recall_map,
            detection,
            exclusions(&self.area),
            self.ground_truth.centerline_pixels(),
        );
        self.recall_tally = tally;
        self.recall = tally.percentage();
        log::info!("Recall : {}", display_metric(self.recall));

        self.write_diagnostic(&self.recall_map.to_image(), self.layout.recall_output(&self.sector))?;
        Ok(self.recall)
    }

    /// Share of detected pixels lying in the buffered ground truth, in percent.
    pub fn get_precision(&mut self) -> anyhow::Result<Option<f32>> {
        let detection = checked_detection(&self.detection, self.width, self.height)?;
        let tally = classify_precision(
            &mut self.precision_map,
            detection,
            exclusions(&self.area),
            self.ground_truth.buffered_pixels(),
        );
        self.precision_tally = tally;
        self.precision = tally.percentage();
        log::info!("Precision : {}", display_metric(self.precision));

        self.write_diagnostic(
            &self.precision_map.to_image(),
            self.layout.precision_output(&self.sector),
        )?;
        Ok(self.precision)
    }

    /// Harmonic mean of the last recall and precision.
    pub fn get_f_measure(&mut self) -> Option<f32> {
        self.f_measure = f_measure(self.recall, self.precision);
        log::info!("F-measure : {}", display_metric(self.f_measure));
        self.f_measure
    }

    /// Full comparison: optional mask, recall, precision, F-measure.
    pub fn evaluate(&mut self, with_mask: bool) -> anyhow::Result<Scores> {
        if with_mask {
            self.get_mask()?;
        }
        self.get_recall()?;
        self.get_precision()?;
        self.get_f_measure();
        Ok(self.scores())
    }

    fn write_diagnostic(&self, img: &RgbImage, path: PathBuf) -> anyhow::Result<()> {
        if !self.write_diagnostics {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        img.save_png(&path)
            .with_context(|| format!("Failed to save diagnostic image {:?}", path))?;
        log::debug!("Saved {}", path.display());
        Ok(())
    }
}

fn checked_detection(
    detection: &Option<RgbImage>,
    width: u32,
    height: u32,
) -> Result<&RgbImage, Error> {
    let img = detection
        .as_ref()
        .ok_or(Error::NotConfigured("detection map not loaded"))?;
    if img.dimensions() != (width, height) {
        return Err(Error::DimensionMismatch {
            expected_width: width,
            expected_height: height,
            width: img.width(),
            height: img.height(),
        });
    }
    Ok(img)
}

fn exclusions(area: &Option<Area>) -> &[Rect] {
    area.as_ref().map(|a| a.rectangles()).unwrap_or(&[])
}

/// Marks detections, then counts centerline pixels against them.
pub fn classify_recall(
    map: &mut ClassMap,
    detection: &RgbImage,
    excluded: &[Rect],
    centerline: &[(u32, u32)],
) -> Tally {
    map.clear();
    map.mark_excluded(excluded);
    for (x, y, px) in detection.enumerate_pixels() {
        if is_detected(*px) {
            map.mark_covered(x, y);
        }
    }

    let mut tally = Tally::default();
    for &(x, y) in centerline {
        map.count(x, y, &mut tally);
    }
    tally
}

/// Marks the buffered ground truth, then counts detections against it.
pub fn classify_precision(
    map: &mut ClassMap,
    detection: &RgbImage,
    excluded: &[Rect],
    buffered: &[(u32, u32)],
) -> Tally {
    map.clear();
    map.mark_excluded(excluded);
    for &(x, y) in buffered {
        map.mark_covered(x, y);
    }

    let mut tally = Tally::default();
    for (x, y, px) in detection.enumerate_pixels() {
        if is_detected(*px) {
            map.count(x, y, &mut tally);
        }
    }
    tally
}
