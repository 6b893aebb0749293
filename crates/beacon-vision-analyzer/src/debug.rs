use std::collections::BTreeMap;
use std::fmt;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::region::BeaconColor;

/// Intermediate images that can be captured during one analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugStage {
    /// Per-pixel color range test.
    RawMask,
    /// Mask after morphological smoothing.
    SmoothedMask,
    /// Inverted-Otsu dark blobs clipped to the mask.
    ThresholdedRegions,
    /// Image handed to the ellipse strategy.
    ButtonInput,
    /// Button image after opening.
    ButtonSmooth,
    /// Canny edges of the smoothed button image.
    ButtonEdges,
}

impl DebugStage {
    pub fn as_str(self) -> &'static str {
        match self {
            DebugStage::RawMask => "raw_mask",
            DebugStage::SmoothedMask => "smoothed_mask",
            DebugStage::ThresholdedRegions => "thresholded_regions",
            DebugStage::ButtonInput => "button_input",
            DebugStage::ButtonSmooth => "button_smooth",
            DebugStage::ButtonEdges => "button_edges",
        }
    }
}

impl fmt::Display for DebugStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store of captured intermediates, keyed by stage and color.
///
/// When disabled, [`Intermediates::record`] never evaluates its image closure.
#[derive(Clone, Debug, Default)]
pub struct Intermediates {
    enabled: bool,
    images: BTreeMap<(DebugStage, BeaconColor), GrayImage>,
}

impl Intermediates {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            images: BTreeMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.images.clear();
        }
    }

    pub fn record(
        &mut self,
        stage: DebugStage,
        color: BeaconColor,
        image: impl FnOnce() -> GrayImage,
    ) {
        if self.enabled {
            self.images.insert((stage, color), image());
        }
    }

    pub fn get(&self, stage: DebugStage, color: BeaconColor) -> Option<&GrayImage> {
        self.images.get(&(stage, color))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(DebugStage, BeaconColor), &GrayImage)> {
        self.images.iter()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}
