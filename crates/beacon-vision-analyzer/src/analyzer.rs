//! Frame-level pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;

use beacon_vision_core::rgb_to_hsv;
use image::imageops::{self, FilterType};
use image::RgbImage;
use log::{debug, warn};

use crate::beacon::{enumerate_candidates, Beacon};
use crate::buttons::{find_buttons, prepare_button_input, ButtonStrategy};
use crate::debug::{DebugStage, Intermediates};
use crate::params::AnalyzerParams;
use crate::region::{assign_buttons, BeaconColor, BeaconRegion};
use crate::segment::ColorSegmenter;
use crate::AnalyzeError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Detects and scores beacon candidates in RGB frames.
///
/// The analyzer owns its per-color segmenters, built on first use, and an
/// optional store of intermediate images that is reset on every call.
#[derive(Debug, Default)]
pub struct BeaconAnalyzer {
    params: AnalyzerParams,
    segmenters: BTreeMap<BeaconColor, ColorSegmenter>,
    intermediates: Intermediates,
}

impl BeaconAnalyzer {
    pub fn new(params: AnalyzerParams) -> Self {
        Self {
            params,
            segmenters: BTreeMap::new(),
            intermediates: Intermediates::default(),
        }
    }

    /// Capture intermediate images during analysis.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.intermediates.set_enabled(enabled);
        self
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.intermediates.set_enabled(enabled);
    }

    pub fn params(&self) -> &AnalyzerParams {
        &self.params
    }

    /// Intermediates of the most recent call; empty unless debugging is enabled.
    pub fn intermediates(&self) -> &Intermediates {
        &self.intermediates
    }

    /// Analyze with the strategy configured in [`AnalyzerParams`].
    pub fn analyze_default(&mut self, frame: &mut RgbImage) -> Vec<Beacon> {
        let strategy = self.params.button_strategy;
        self.analyze(frame, strategy)
    }

    /// Analyze with a strategy given by name (`"ellipse"` or `"hough"`).
    pub fn analyze_named(
        &mut self,
        frame: &mut RgbImage,
        strategy: &str,
    ) -> Result<Vec<Beacon>, AnalyzeError> {
        let strategy: ButtonStrategy = strategy.parse()?;
        Ok(self.analyze(frame, strategy))
    }

    /// Run the full pipeline and return candidates scoring at least `min_score`.
    ///
    /// `frame` is replaced by its downscaled version when larger than
    /// `max_dimension`.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, frame),
            fields(width = frame.width(), height = frame.height(), strategy = %strategy)
        )
    )]
    pub fn analyze(&mut self, frame: &mut RgbImage, strategy: ButtonStrategy) -> Vec<Beacon> {
        self.intermediates.clear();
        if frame.width() == 0 || frame.height() == 0 {
            warn!("empty frame, nothing to analyze");
            return Vec::new();
        }
        downscale_frame(frame, self.params.max_dimension);

        let regions = self.find_regions(frame, strategy);
        let candidates =
            enumerate_candidates(&regions, self.params.pair_bounds, &self.params.score);
        let total = candidates.len();
        let accepted: Vec<Beacon> = candidates
            .into_iter()
            .filter(|b| b.points() >= self.params.min_score)
            .collect();
        debug!(
            "{} region(s), {} candidate(s), {} accepted (min score {})",
            regions.len(),
            total,
            accepted.len(),
            self.params.min_score
        );
        accepted
    }

    /// Segment every target color and attach buttons; red regions come first.
    pub fn find_regions(
        &mut self,
        frame: &RgbImage,
        strategy: ButtonStrategy,
    ) -> Vec<Arc<BeaconRegion>> {
        let hsv = rgb_to_hsv(frame);
        let gray = imageops::grayscale(frame);

        let mut all = Vec::new();
        for color in BeaconColor::ALL {
            let seg = self.segmenter(color).segment_hsv(&hsv);
            self.intermediates
                .record(DebugStage::RawMask, color, || seg.raw_mask.clone());
            self.intermediates
                .record(DebugStage::SmoothedMask, color, || seg.mask.clone());

            let input = prepare_button_input(&gray, &seg.mask);
            self.intermediates
                .record(DebugStage::ThresholdedRegions, color, || input.clone());
            let buttons = find_buttons(
                &input,
                strategy,
                &self.params.ellipse,
                &self.params.hough,
                color,
                &mut self.intermediates,
            );

            let mut regions: Vec<BeaconRegion> = seg
                .regions
                .into_iter()
                .map(|r| BeaconRegion::new(r, color))
                .collect();
            assign_buttons(&mut regions, &buttons);
            debug!(
                "{color}: {} region(s), {} button(s)",
                regions.len(),
                buttons.len()
            );
            all.extend(regions.into_iter().map(Arc::new));
        }
        all
    }

    fn segmenter(&mut self, color: BeaconColor) -> &ColorSegmenter {
        let params = &self.params;
        self.segmenters.entry(color).or_insert_with(|| {
            let range = match color {
                BeaconColor::Red => params.red.clone(),
                BeaconColor::Blue => params.blue.clone(),
            };
            ColorSegmenter::new(range, params.segmenter)
        })
    }
}

/// Shrink `frame` in place so its larger side is at most `max_dimension`.
///
/// Frames already within the limit, and a limit of zero, leave it untouched.
pub fn downscale_frame(frame: &mut RgbImage, max_dimension: u32) -> bool {
    let (w, h) = frame.dimensions();
    let longest = w.max(h);
    if max_dimension == 0 || longest <= max_dimension {
        return false;
    }
    let scale = max_dimension as f64 / longest as f64;
    let nw = ((w as f64 * scale).round() as u32).clamp(1, max_dimension);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, max_dimension);
    *frame = imageops::resize(frame, nw, nh, FilterType::Triangle);
    true
}
