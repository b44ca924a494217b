/// Structured logging for the ensemble statistics engine.
///
/// Provides context-rich logging with station identifiers, pipeline stage
/// tags, timestamps, and severity levels. Supports both console output and
/// file-based logging for embedding hosts that run headless.
///
/// The core never aborts on degraded input — missing control members,
/// binning fallbacks, and skipped records are logged here and reported to
/// the caller as explicit result states.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

/// Which part of the pipeline produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Aggregate,
    Circular,
    Binning,
    Layout,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ingest => write!(f, "INGEST"),
            Stage::Aggregate => write!(f, "AGG"),
            Stage::Circular => write!(f, "CIRC"),
            Stage::Binning => write!(f, "BIN"),
            Stage::Layout => write!(f, "LAYOUT"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *LOGGER.lock().unwrap() = Some(logger);
    }

    /// Log a message with the global logger
    fn log(&self, level: LogLevel, stage: Stage, station: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        let station_part = station.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, stage, station_part, message);

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info => println!("{}", log_entry),
                LogLevel::Debug => println!("[DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("✗ {}{}: {}", stage, station_part, message),
                LogLevel::Warning => eprintln!("⚠ {}{}: {}", stage, station_part, message),
                LogLevel::Info => println!("{}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(stage: Stage, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, stage, station, message);
    }
}

/// Log a warning message
pub fn warn(stage: Stage, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, stage, station, message);
    }
}

/// Log an error message
pub fn error(stage: Stage, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, stage, station, message);
    }
}

/// Log a debug message
pub fn debug(stage: Stage, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, stage, station, message);
    }
}

// ---------------------------------------------------------------------------
// Degradation Logging
// ---------------------------------------------------------------------------

/// Station context for a log entry: the one station a record set belongs
/// to, or `None` when the set is empty or spans several stations.
pub fn station_context<'a>(mut names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let first = names.next()?;
    names.all(|n| n == first).then_some(first)
}

/// Log a per-group aggregation degradation (missing control member, empty
/// group). These keep the rest of the series processing.
pub fn log_aggregation_issue(station: Option<&str>, err: &dyn std::error::Error) {
    warn(Stage::Aggregate, station, &err.to_string());
}

/// Log that the adaptive bin-width search hit its iteration cap and the
/// coarse-result fallback was applied. The layout is still usable — it is
/// an approximation, not a failure.
pub fn log_binning_fallback(station: Option<&str>, step: f64, max_steps: usize) {
    warn(
        Stage::Binning,
        station,
        &format!(
            "Iteration cap reached; reverted to coarse step {} (target occupancy {})",
            step, max_steps
        ),
    );
}

/// Log records skipped during ingest (missing or non-numeric value for the
/// active parameter).
pub fn log_skipped_records(station: Option<&str>, data_key: &str, skipped: usize) {
    if skipped > 0 {
        warn(
            Stage::Ingest,
            station,
            &format!("Skipped {} records without a usable '{}' value", skipped, data_key),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_station_context_requires_a_single_station() {
        assert_eq!(station_context(["Oslo", "Oslo"].into_iter()), Some("Oslo"));
        assert_eq!(station_context(["Oslo", "Bergen"].into_iter()), None);
        assert_eq!(station_context(std::iter::empty()), None);
    }

    #[test]
    fn test_degradation_entries_carry_the_station_tag() {
        use crate::analysis::dots::layout_time_slice;
        use crate::analysis::quantiles::aggregate_quantiles;
        use crate::config::{BinningOptions, TimeSettings};
        use crate::model::EnsembleRecord;

        let path =
            std::env::temp_dir().join(format!("epsgram_core_log_{}.txt", std::process::id()));
        let path_str = path.to_string_lossy().into_owned();
        init_logger(LogLevel::Warning, Some(&path_str), true);

        let record = |member: &str, value: f64| EnsembleRecord {
            station_name: "Bergen".to_string(),
            valid_time: "2022-08-15 06:00:00".to_string(),
            member_id: member.to_string(),
            value,
            symbol_code: String::new(),
        };

        // Missing control member: warning from the aggregation stage.
        let no_control = vec![record("mbr001", 1.0), record("mbr002", 3.0)];
        let _ = aggregate_quantiles(&no_control, None, &TimeSettings::default());

        // Seven duplicates plus an outlier: the bin-width search hits its
        // cap and the fallback is logged from the layout entry point.
        let mut crowded: Vec<EnsembleRecord> =
            (0..7).map(|i| record(&format!("mbr{:03}", i), 5.0)).collect();
        crowded.push(record("mbr007", 40.0));
        let _ = layout_time_slice(
            &crowded,
            BinningOptions { nominal_step: 1.0, force_step: false },
            None,
        );

        let contents = std::fs::read_to_string(&path).expect("log file should exist");
        assert!(
            contents.contains("AGG [Bergen]"),
            "aggregation warning should carry the station tag, got:\n{}",
            contents
        );
        assert!(
            contents.contains("BIN [Bergen]"),
            "binning fallback warning should carry the station tag, got:\n{}",
            contents
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_stage_tags_are_distinct() {
        let stages = [
            Stage::Ingest,
            Stage::Aggregate,
            Stage::Circular,
            Stage::Binning,
            Stage::Layout,
            Stage::System,
        ];
        let mut seen = std::collections::HashSet::new();
        for stage in &stages {
            assert!(seen.insert(stage.to_string()), "duplicate stage tag '{}'", stage);
        }
    }
}
