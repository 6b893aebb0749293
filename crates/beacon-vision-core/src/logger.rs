//! Logging setup for the beacon tools.
//!
//! Both backends share one target policy: `beacon_vision*` targets follow
//! the requested level, every other target is capped at `Warn` so image
//! decoder chatter does not drown the per-stage counts. The plain backend
//! prints records as `[elapsed LEVEL target] message`.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const OWN_TARGET_PREFIX: &str = "beacon_vision";

struct StageLogger {
    level: LevelFilter,
    started: Instant,
}

/// Most verbose level shown for targets outside the beacon crates.
fn foreign_ceiling(level: LevelFilter) -> LevelFilter {
    level.min(LevelFilter::Warn)
}

impl StageLogger {
    fn admits(&self, target: &str, level: Level) -> bool {
        if target.starts_with(OWN_TARGET_PREFIX) {
            level <= self.level
        } else {
            level <= foreign_ceiling(self.level)
        }
    }
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.admits(metadata.target(), metadata.level())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let target = record
            .target()
            .rsplit("::")
            .next()
            .unwrap_or(record.target());
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            target,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StageLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// `EnvFilter` directives equivalent to the stderr logger's target policy.
#[cfg(any(feature = "tracing", test))]
fn filter_directives(level: LevelFilter) -> String {
    let own = level.to_string().to_lowercase();
    let foreign = foreign_ceiling(level).to_string().to_lowercase();
    format!("{foreign},{OWN_TARGET_PREFIX}={own}")
}

/// Install a `tracing` subscriber that closes a span per pipeline stage.
///
/// `RUST_LOG` replaces the directives derived from `level` when set.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_targets_are_limited_to_warnings() {
        let logger = StageLogger {
            level: LevelFilter::Debug,
            started: Instant::now(),
        };
        assert!(logger.admits("beacon_vision_analyzer::segment", Level::Debug));
        assert!(!logger.admits("beacon_vision_analyzer::segment", Level::Trace));
        assert!(!logger.admits("png::decoder", Level::Info));
        assert!(logger.admits("png::decoder", Level::Warn));
    }

    #[test]
    fn quiet_levels_also_cap_foreign_targets() {
        let logger = StageLogger {
            level: LevelFilter::Error,
            started: Instant::now(),
        };
        assert!(!logger.admits("png::decoder", Level::Warn));
        assert!(logger.admits("png::decoder", Level::Error));
    }

    #[test]
    fn tracing_directives_follow_the_same_policy() {
        assert_eq!(filter_directives(LevelFilter::Debug), "warn,beacon_vision=debug");
        assert_eq!(filter_directives(LevelFilter::Error), "error,beacon_vision=error");
        assert_eq!(filter_directives(LevelFilter::Off), "off,beacon_vision=off");
    }
}
