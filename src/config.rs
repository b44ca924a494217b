/// Immutable configuration for the aggregation, binning, and layout passes.
///
/// The upstream UI layer builds one of these value structs per interaction
/// (station change, threshold drag, time selection) and passes it by value
/// into the pure analysis functions. There is no mutable builder state —
/// recomputation at arbitrary frequency always sees a complete, consistent
/// configuration.
///
/// Parameter-catalog overrides (bin steps tuned per deployment) load from a
/// TOML file, the same way station/location config is handled elsewhere in
/// this codebase family.

use chrono::format::{Parsed, StrftimeItems};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Deserialize;

use crate::params::ParamSpec;

// ---------------------------------------------------------------------------
// Time settings
// ---------------------------------------------------------------------------

/// Default validity-time format used by the MEPS ensemble export.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How validity-time strings are parsed for chronological ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSettings {
    /// strftime-style format string.
    pub format: String,
    /// Interpret parsed times as UTC; otherwise as local time.
    pub utc: bool,
}

impl Default for TimeSettings {
    fn default() -> Self {
        TimeSettings {
            format: DEFAULT_TIME_FORMAT.to_string(),
            utc: true,
        }
    }
}

impl TimeSettings {
    /// Parses a validity-time string into a UTC instant.
    ///
    /// Fields the format leaves unset default to zero, so coarse formats
    /// down to date resolution (e.g. "%Y%m%d%H" or "%Y-%m-%d") parse to the
    /// top of the hour / midnight instead of erroring.
    ///
    /// Local times that are ambiguous across a DST transition resolve to the
    /// earlier instant; nonexistent local times are an error.
    pub fn parse(&self, valid_time: &str) -> Result<DateTime<Utc>, String> {
        let mut parsed = Parsed::new();
        chrono::format::parse(&mut parsed, valid_time, StrftimeItems::new(&self.format))
            .map_err(|e| format!("'{}' does not match '{}': {}", valid_time, self.format, e))?;

        // Default the time-of-day fields the format did not pin down. The
        // setters reject conflicting values, so a field the format already
        // set is left untouched.
        let _ = parsed.set_hour(0);
        let _ = parsed.set_minute(0);
        let _ = parsed.set_second(0);

        let naive = parsed.to_naive_datetime_with_offset(0).map_err(|e| {
            format!("'{}' does not resolve with '{}': {}", valid_time, self.format, e)
        })?;
        if self.utc {
            Ok(Utc.from_utc_datetime(&naive))
        } else {
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| format!("'{}' is not a valid local time", valid_time))
        }
    }
}

// ---------------------------------------------------------------------------
// Binning options
// ---------------------------------------------------------------------------

/// Bin-width settings consumed by the adaptive bin-width search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinningOptions {
    /// Starting bin width for the search.
    pub nominal_step: f64,
    /// Use the nominal step verbatim and skip the search.
    pub force_step: bool,
}

impl BinningOptions {
    /// Binning options for a registered parameter, honoring any override.
    pub fn for_param(param: &ParamSpec, overrides: &[ParamOverride]) -> BinningOptions {
        let overridden = overrides.iter().find(|o| o.key == param.key);
        BinningOptions {
            nominal_step: overridden
                .and_then(|o| o.nominal_step)
                .unwrap_or(param.nominal_step),
            force_step: overridden
                .and_then(|o| o.force_step)
                .unwrap_or(param.force_step),
        }
    }
}

/// The full scalar parameter set supplied by upstream selection. One value
/// per recomputation; the analysis functions take what they need from it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Selection key of the active parameter, e.g. "windspeed".
    pub param_key: String,
    /// Exceedance threshold in parameter units; `None` disables probability
    /// and exceedance-flag computation.
    pub threshold: Option<f64>,
    pub binning: BinningOptions,
    pub time: TimeSettings,
}

// ---------------------------------------------------------------------------
// Parameter overrides (TOML)
// ---------------------------------------------------------------------------

/// One per-parameter override entry from the deployment config file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ParamOverride {
    pub key: String,
    pub nominal_step: Option<f64>,
    pub force_step: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OverrideFile {
    #[serde(default)]
    param: Vec<ParamOverride>,
}

/// Loads parameter overrides from a TOML file of the form:
///
/// ```toml
/// [[param]]
/// key = "hum"
/// nominal_step = 2.5
/// ```
pub fn load_param_overrides(path: &str) -> Result<Vec<ParamOverride>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read parameter overrides from {}: {}", path, e))?;
    parse_param_overrides(&contents)
}

/// Parses override file contents. Split from `load_param_overrides` so tests
/// don't need the filesystem.
pub fn parse_param_overrides(contents: &str) -> Result<Vec<ParamOverride>, Box<dyn std::error::Error>> {
    let file: OverrideFile = toml::from_str(contents)
        .map_err(|e| format!("Failed to parse parameter overrides: {}", e))?;
    for entry in &file.param {
        if crate::params::find_param(&entry.key).is_none() {
            return Err(format!("Override for unknown parameter '{}'", entry.key).into());
        }
        if let Some(step) = entry.nominal_step {
            if !(step > 0.0) || !step.is_finite() {
                return Err(
                    format!("Override step for '{}' must be positive, got {}", entry.key, step)
                        .into(),
                );
            }
        }
    }
    Ok(file.param)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::find_param;

    #[test]
    fn test_default_format_parses_meps_timestamps() {
        let settings = TimeSettings::default();
        let parsed = settings
            .parse("2022-08-15 12:00:00")
            .expect("default format should parse the export timestamps");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2022, 8, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_unparseable_time_returns_error() {
        let settings = TimeSettings::default();
        let result = settings.parse("15/08/2022 12:00");
        assert!(result.is_err(), "mismatched format should error, got {:?}", result);
    }

    #[test]
    fn test_custom_format_is_honored() {
        let settings = TimeSettings {
            format: "%Y%m%d%H".to_string(),
            utc: true,
        };
        let parsed = settings.parse("2022081506").expect("compact format should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2022, 8, 15, 6, 0, 0).unwrap());
    }

    #[test]
    fn test_minute_resolution_format_defaults_seconds() {
        let settings = TimeSettings {
            format: "%Y-%m-%d %H:%M".to_string(),
            utc: true,
        };
        let parsed = settings.parse("2022-08-15 06:30").expect("minute format should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2022, 8, 15, 6, 30, 0).unwrap());
    }

    #[test]
    fn test_date_only_format_defaults_to_midnight() {
        let settings = TimeSettings {
            format: "%Y-%m-%d".to_string(),
            utc: true,
        };
        let parsed = settings.parse("2022-08-15").expect("date-only format should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2022, 8, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_binning_options_fall_back_to_registry() {
        let param = find_param("windspeed").unwrap();
        let options = BinningOptions::for_param(param, &[]);
        assert_eq!(options.nominal_step, 1.0);
        assert!(!options.force_step);
    }

    #[test]
    fn test_binning_options_apply_override() {
        let param = find_param("hum").unwrap();
        let overrides = vec![ParamOverride {
            key: "hum".to_string(),
            nominal_step: Some(2.5),
            force_step: None,
        }];
        let options = BinningOptions::for_param(param, &overrides);
        assert_eq!(options.nominal_step, 2.5);
        assert!(!options.force_step, "unset override field keeps the registry value");
    }

    #[test]
    fn test_override_file_parses() {
        let overrides = parse_param_overrides(
            r#"
            [[param]]
            key = "temp"
            nominal_step = 0.5

            [[param]]
            key = "cloud"
            force_step = false
            "#,
        )
        .expect("well-formed override file should parse");
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[0].nominal_step, Some(0.5));
        assert_eq!(overrides[1].force_step, Some(false));
    }

    #[test]
    fn test_override_for_unknown_parameter_is_rejected() {
        let result = parse_param_overrides(
            r#"
            [[param]]
            key = "vorticity"
            nominal_step = 1.0
            "#,
        );
        assert!(result.is_err(), "unknown parameter key should be rejected");
    }

    #[test]
    fn test_nonpositive_override_step_is_rejected() {
        let result = parse_param_overrides(
            r#"
            [[param]]
            key = "temp"
            nominal_step = 0.0
            "#,
        );
        assert!(result.is_err(), "zero step should be rejected");
    }
}
