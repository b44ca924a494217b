/// JSON record ingest and selection helpers.
///
/// The MEPS major-cities export is a flat array of objects, one per
/// (station, validity time, member), carrying every forecast parameter as a
/// numeric field:
///
/// ```json
/// {
///   "name": "Oslo",
///   "valid_dttm": "2022-08-15 12:00:00",
///   "member": "mbr003",
///   "img_code": "partlycloudy_day",
///   "T2m": 17.2, "S10m": 3.4, "D10m": 310.0, ...
/// }
/// ```
///
/// Records with a missing or non-numeric value for the active parameter are
/// skipped with a warning — they must never reach the statistics passes as
/// NaN.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::config::TimeSettings;
use crate::logging;
use crate::model::EnsembleRecord;
use crate::params::ParamSpec;

// ---------------------------------------------------------------------------
// Raw record schema
// ---------------------------------------------------------------------------

/// One entry of the loader's JSON array, before a parameter is selected.
/// Parameter values stay in the flattened map until `to_record` extracts
/// the active one.
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    /// Station display name.
    pub name: String,
    /// Validity timestamp string, parseable with `TimeSettings`.
    pub valid_dttm: String,
    /// Ensemble member id ("mbr000" for the control run).
    pub member: String,
    /// Weather symbol code for glyph rendering. Not every export carries it.
    #[serde(default)]
    pub img_code: Option<String>,
    /// All remaining fields, one per forecast parameter.
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl RawRecord {
    /// Extracts the active parameter's value, if present and numeric.
    fn value_for(&self, data_key: &str) -> Option<f64> {
        self.values.get(data_key).and_then(|v| v.as_f64())
    }

    /// Converts to a typed record for one parameter. `None` when the value
    /// is absent, null, or non-numeric.
    fn to_record(&self, param: &ParamSpec) -> Option<EnsembleRecord> {
        let value = self.value_for(param.data_key)?;
        if !value.is_finite() {
            return None;
        }
        Some(EnsembleRecord {
            station_name: self.name.clone(),
            valid_time: self.valid_dttm.clone(),
            member_id: self.member.clone(),
            value,
            symbol_code: self.img_code.clone().unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum IngestError {
    /// The response body could not be deserialized as a record array.
    ParseError(String),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for IngestError {}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

/// Parses the loader's JSON array into typed records for one parameter.
///
/// Records without a usable value for `param` are dropped and counted in a
/// single warning log entry; everything else is an error.
pub fn records_from_json(json: &str, param: &ParamSpec) -> Result<Vec<EnsembleRecord>, IngestError> {
    let raw: Vec<RawRecord> =
        serde_json::from_str(json).map_err(|e| IngestError::ParseError(e.to_string()))?;
    Ok(records_from_raw(&raw, param))
}

/// Selects one parameter out of already-deserialized raw records.
pub fn records_from_raw(raw: &[RawRecord], param: &ParamSpec) -> Vec<EnsembleRecord> {
    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = 0usize;
    for entry in raw {
        match entry.to_record(param) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }
    let station = logging::station_context(raw.iter().map(|r| r.name.as_str()));
    logging::log_skipped_records(station, param.data_key, skipped);
    records
}

// ---------------------------------------------------------------------------
// Selection helpers
// ---------------------------------------------------------------------------

/// Records for one station, preserving input order.
pub fn filter_station(records: &[EnsembleRecord], station_name: &str) -> Vec<EnsembleRecord> {
    records
        .iter()
        .filter(|r| r.station_name == station_name)
        .cloned()
        .collect()
}

/// Records for one validity time — the time slice the dot plot consumes.
pub fn filter_valid_time(records: &[EnsembleRecord], valid_time: &str) -> Vec<EnsembleRecord> {
    records
        .iter()
        .filter(|r| r.valid_time == valid_time)
        .cloned()
        .collect()
}

/// Sorted distinct station names, for the station selector.
pub fn station_names(records: &[EnsembleRecord]) -> Vec<String> {
    let mut names: Vec<String> = records.iter().map(|r| r.station_name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// Distinct validity times in chronological order per `time`. Times that
/// fail to parse sort last rather than being dropped.
pub fn valid_times(records: &[EnsembleRecord], time: &TimeSettings) -> Vec<String> {
    let mut times: Vec<String> = records.iter().map(|r| r.valid_time.clone()).collect();
    times.sort();
    times.dedup();
    times.sort_by_key(|t| match time.parse(t) {
        Ok(parsed) => (0u8, Some(parsed)),
        Err(_) => (1u8, None),
    });
    times
}

/// Data extent rounded outward to multiples of `step` — the bounds the
/// threshold slider uses so its stops land on bin edges.
pub fn threshold_range(records: &[EnsembleRecord], step: f64) -> Option<(f64, f64)> {
    if records.is_empty() || !(step > 0.0) {
        return None;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for record in records {
        min = min.min(record.value);
        max = max.max(record.value);
    }
    Some((step * (min / step).floor(), step * (max / step).ceil()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::find_param;

    const SAMPLE: &str = r#"[
        {"name": "Oslo", "valid_dttm": "2022-08-15 00:00:00", "member": "mbr000",
         "img_code": "clearsky_night", "T2m": 14.1, "S10m": 2.0, "D10m": 350.0},
        {"name": "Oslo", "valid_dttm": "2022-08-15 00:00:00", "member": "mbr001",
         "img_code": "clearsky_night", "T2m": 13.8, "S10m": 2.4, "D10m": 5.0},
        {"name": "Bergen", "valid_dttm": "2022-08-15 00:00:00", "member": "mbr000",
         "img_code": "rain", "T2m": 12.5, "S10m": 6.1, "D10m": 210.0},
        {"name": "Oslo", "valid_dttm": "2022-08-15 01:00:00", "member": "mbr000",
         "img_code": "clearsky_night", "T2m": 13.9, "S10m": null, "D10m": 348.0}
    ]"#;

    #[test]
    fn test_records_parse_for_temperature() {
        let param = find_param("temp").unwrap();
        let records = records_from_json(SAMPLE, param).expect("sample should parse");
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].station_name, "Oslo");
        assert_eq!(records[0].value, 14.1);
        assert!(records[0].is_control());
        assert_eq!(records[1].member_id, "mbr001");
    }

    #[test]
    fn test_null_parameter_value_is_skipped_not_nan() {
        // The 01:00 Oslo record has S10m: null — it must be dropped for
        // windspeed, not propagated as NaN into the statistics.
        let param = find_param("windspeed").unwrap();
        let records = records_from_json(SAMPLE, param).expect("sample should parse");
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.value.is_finite()));
    }

    #[test]
    fn test_malformed_json_returns_parse_error() {
        let param = find_param("temp").unwrap();
        let result = records_from_json("{not json", param);
        assert!(matches!(result, Err(IngestError::ParseError(_))));
    }

    #[test]
    fn test_filter_station_selects_only_that_station() {
        let param = find_param("temp").unwrap();
        let records = records_from_json(SAMPLE, param).unwrap();
        let oslo = filter_station(&records, "Oslo");
        assert_eq!(oslo.len(), 3);
        assert!(oslo.iter().all(|r| r.station_name == "Oslo"));
    }

    #[test]
    fn test_station_names_are_sorted_and_distinct() {
        let param = find_param("temp").unwrap();
        let records = records_from_json(SAMPLE, param).unwrap();
        assert_eq!(station_names(&records), vec!["Bergen", "Oslo"]);
    }

    #[test]
    fn test_valid_times_are_chronological() {
        let param = find_param("temp").unwrap();
        let records = records_from_json(SAMPLE, param).unwrap();
        let times = valid_times(&records, &TimeSettings::default());
        assert_eq!(times, vec!["2022-08-15 00:00:00", "2022-08-15 01:00:00"]);
    }

    #[test]
    fn test_threshold_range_rounds_outward_to_step() {
        let param = find_param("temp").unwrap();
        let records = records_from_json(SAMPLE, param).unwrap();
        // Temperatures span 12.5..14.1; with step 1.0 the slider bounds are
        // 12.0..15.0.
        assert_eq!(threshold_range(&records, 1.0), Some((12.0, 15.0)));
    }

    #[test]
    fn test_threshold_range_empty_input() {
        assert_eq!(threshold_range(&[], 1.0), None);
    }
}
