//! JSON configuration, reports and file-level helpers.

use std::fs;
use std::path::{Path, PathBuf};

use beacon_vision_analyzer::{
    sort_by_area_desc, AnalyzeError, AnalyzerParams, Beacon, BeaconAnalyzer, BeaconSummary,
    ButtonStrategy,
};
use image::RgbImage;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
}

/// Configuration of one detection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectConfig {
    pub image_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Overrides `analyzer.button_strategy` when set.
    #[serde(default)]
    pub strategy: Option<ButtonStrategy>,
    #[serde(default)]
    pub analyzer: AnalyzerParams,
}

impl DetectConfig {
    pub fn for_image(image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DetectError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DetectError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("beacon_report.json"))
    }

    pub fn strategy(&self) -> ButtonStrategy {
        self.strategy.unwrap_or(self.analyzer.button_strategy)
    }

    pub fn build_analyzer(&self) -> BeaconAnalyzer {
        BeaconAnalyzer::new(self.analyzer.clone())
    }
}

/// Serializable result of one run, beacons sorted largest first.
#[derive(Debug, Clone, Serialize)]
pub struct BeaconReport {
    pub image_path: String,
    /// Size of the analyzed (possibly downscaled) frame.
    pub width: u32,
    pub height: u32,
    pub strategy: ButtonStrategy,
    pub min_score: u32,
    pub beacons: Vec<BeaconSummary>,
}

impl BeaconReport {
    pub fn best(&self) -> Option<&BeaconSummary> {
        self.beacons.first()
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DetectError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Run the analyzer on `frame` and sort the result largest first.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(analyzer, frame),
        fields(width = frame.width(), height = frame.height())
    )
)]
pub fn detect_beacons(
    analyzer: &mut BeaconAnalyzer,
    frame: &mut RgbImage,
    strategy: ButtonStrategy,
) -> Vec<Beacon> {
    let mut beacons = analyzer.analyze(frame, strategy);
    sort_by_area_desc(&mut beacons);
    beacons
}

/// Load the configured image, detect beacons and build a report.
pub fn detect_file(cfg: &DetectConfig) -> Result<BeaconReport, DetectError> {
    let mut frame = image::open(&cfg.image_path)?.to_rgb8();
    let strategy = cfg.strategy();
    let mut analyzer = cfg.build_analyzer();
    let beacons = detect_beacons(&mut analyzer, &mut frame, strategy);
    log::info!(
        "{}: {} beacon(s) in {}x{} frame",
        cfg.image_path,
        beacons.len(),
        frame.width(),
        frame.height()
    );
    Ok(BeaconReport {
        image_path: cfg.image_path.clone(),
        width: frame.width(),
        height: frame.height(),
        strategy,
        min_score: cfg.analyzer.min_score,
        beacons: beacons.iter().map(Beacon::summary).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_json_round_trip_keeps_overrides() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("cfg.json");

        let mut cfg = DetectConfig::for_image("frame.png");
        cfg.strategy = Some(ButtonStrategy::Hough);
        cfg.analyzer.min_score = 4;
        cfg.write_json(&path).expect("write");

        let loaded = DetectConfig::load_json(&path).expect("load");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.strategy(), ButtonStrategy::Hough);
        assert_eq!(loaded.output_path(), PathBuf::from("beacon_report.json"));
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg: DetectConfig = serde_json::from_str(r#"{"image_path": "a.png"}"#).expect("json");
        assert_eq!(cfg.strategy(), ButtonStrategy::Ellipse);
        assert_eq!(cfg.analyzer, AnalyzerParams::default());
    }

    #[test]
    fn unknown_strategy_in_config_is_rejected() {
        let raw = r#"{"image_path": "a.png", "strategy": "canny"}"#;
        assert!(serde_json::from_str::<DetectConfig>(raw).is_err());
    }

    #[test]
    fn missing_image_is_an_error() {
        let cfg = DetectConfig::for_image("/nonexistent/beacon.png");
        assert!(matches!(detect_file(&cfg), Err(DetectError::Image(_))));
    }
}
