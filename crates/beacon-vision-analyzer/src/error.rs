use beacon_vision_core::ColorRangeError;

/// Errors returned by the beacon analyzer.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzeError {
    #[error("unknown button detection strategy: {0:?} (expected \"ellipse\" or \"hough\")")]
    UnknownButtonStrategy(String),
    #[error(transparent)]
    ColorRange(#[from] ColorRangeError),
}
