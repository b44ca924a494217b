/// Grouped quantile aggregation.
///
/// Groups ensemble records by validity time and computes one seven-number
/// summary per group: min, 10th/25th/50th/75th/90th percentiles, max, plus
/// the arithmetic mean, the control-member value, and the threshold
/// exceedance probability.
///
/// Quantiles use linear-interpolation rank estimation (R-7):
/// rank = p * (n - 1), interpolating between the floor and ceiling ranks.
///
/// Per-group isolation: a bad group (no members, no control member,
/// unparseable timestamp) is reported as an issue without aborting the
/// other groups.

use std::collections::HashMap;

use crate::config::TimeSettings;
use crate::logging;
use crate::model::{AggregationError, EnsembleRecord, QuantileSummary};

use super::circular::CorrectedRecord;

// ---------------------------------------------------------------------------
// Member values
// ---------------------------------------------------------------------------

/// One member's contribution to a group's statistics.
///
/// Directional data distinguishes the raw compass value from the
/// offset-corrected one: quantiles and the mean are computed on the
/// corrected value so the distribution is contiguous, while the control
/// value and the exceedance test stay in raw degrees — the threshold the
/// user sets is a raw compass reading.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberValue {
    pub member_id: String,
    pub raw: f64,
    pub stat: f64,
    pub is_control: bool,
}

impl MemberValue {
    fn from_record(record: &EnsembleRecord) -> MemberValue {
        MemberValue {
            member_id: record.member_id.clone(),
            raw: record.value,
            stat: record.value,
            is_control: record.is_control(),
        }
    }

    fn from_corrected(corrected: &CorrectedRecord) -> MemberValue {
        MemberValue {
            member_id: corrected.record.member_id.clone(),
            raw: corrected.record.value,
            stat: corrected.corrected_value(),
            is_control: corrected.record.is_control(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation result
// ---------------------------------------------------------------------------

/// Output of one aggregation pass: summaries in validity-time order, plus
/// the per-group degradations encountered along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// One summary per distinct validity time, ascending by parsed time.
    pub summaries: Vec<QuantileSummary>,
    /// Per-group issues. A `MissingControlMember` entry still has a
    /// corresponding summary (with `control: None`); an `EmptyGroup` entry
    /// does not.
    pub issues: Vec<AggregationError>,
}

// ---------------------------------------------------------------------------
// Quantile estimator
// ---------------------------------------------------------------------------

/// R-7 quantile of an ascending-sorted, non-empty slice.
fn quantile_r7(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = p * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

// ---------------------------------------------------------------------------
// Group summary
// ---------------------------------------------------------------------------

/// Summarizes one validity-time group.
///
/// Errors on an empty group. A group without a control member is *not* an
/// error here — the summary is returned with `control: None` and the caller
/// decides how to report it.
pub fn summarize_group(
    valid_time: &str,
    members: &[MemberValue],
    threshold: Option<f64>,
) -> Result<QuantileSummary, AggregationError> {
    if members.is_empty() {
        return Err(AggregationError::EmptyGroup(valid_time.to_string()));
    }

    let mut sorted: Vec<f64> = members.iter().map(|m| m.stat).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let control = members.iter().find(|m| m.is_control).map(|m| m.raw);
    let prob = threshold.map(|t| {
        let exceeding = members.iter().filter(|m| m.raw >= t).count();
        exceeding as f64 / n as f64
    });

    Ok(QuantileSummary {
        valid_time: valid_time.to_string(),
        q00: sorted[0],
        q10: quantile_r7(&sorted, 0.10),
        q25: quantile_r7(&sorted, 0.25),
        q50: quantile_r7(&sorted, 0.50),
        q75: quantile_r7(&sorted, 0.75),
        q90: quantile_r7(&sorted, 0.90),
        q100: sorted[n - 1],
        mean,
        control,
        prob,
    })
}

// ---------------------------------------------------------------------------
// Full-series aggregation
// ---------------------------------------------------------------------------

/// Aggregates a station's records into per-validity-time summaries.
pub fn aggregate_quantiles(
    records: &[EnsembleRecord],
    threshold: Option<f64>,
    time: &TimeSettings,
) -> Aggregation {
    let station = logging::station_context(records.iter().map(|r| r.station_name.as_str()));
    let members: Vec<(String, MemberValue)> = records
        .iter()
        .map(|r| (r.valid_time.clone(), MemberValue::from_record(r)))
        .collect();
    aggregate_members(members, station, threshold, time)
}

/// Aggregates directionally corrected records. Quantiles and the mean use
/// the unwrapped values; control and exceedance use the raw values.
pub fn aggregate_corrected(
    corrected: &[CorrectedRecord],
    threshold: Option<f64>,
    time: &TimeSettings,
) -> Aggregation {
    let station =
        logging::station_context(corrected.iter().map(|c| c.record.station_name.as_str()));
    let members: Vec<(String, MemberValue)> = corrected
        .iter()
        .map(|c| (c.record.valid_time.clone(), MemberValue::from_corrected(c)))
        .collect();
    aggregate_members(members, station, threshold, time)
}

fn aggregate_members(
    members: Vec<(String, MemberValue)>,
    station: Option<&str>,
    threshold: Option<f64>,
    time: &TimeSettings,
) -> Aggregation {
    // Group by validity time, preserving first-seen order until sorting.
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<MemberValue>)> = Vec::new();
    for (valid_time, member) in members {
        match group_index.get(&valid_time) {
            Some(&i) => groups[i].1.push(member),
            None => {
                group_index.insert(valid_time.clone(), groups.len());
                groups.push((valid_time, vec![member]));
            }
        }
    }

    let mut issues = Vec::new();

    // Chronological order for downstream band composition. Unparseable
    // times are reported and sorted after parseable ones.
    let mut keyed: Vec<(Option<chrono::DateTime<chrono::Utc>>, usize)> = Vec::new();
    for (i, (valid_time, _)) in groups.iter().enumerate() {
        match time.parse(valid_time) {
            Ok(parsed) => keyed.push((Some(parsed), i)),
            Err(detail) => {
                issues.push(AggregationError::BadValidTime {
                    valid_time: valid_time.clone(),
                    detail,
                });
                keyed.push((None, i));
            }
        }
    }
    keyed.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.1.cmp(&b.1),
    });

    let mut summaries = Vec::with_capacity(groups.len());
    for (_, i) in keyed {
        let (valid_time, group) = &groups[i];
        match summarize_group(valid_time, group, threshold) {
            Ok(summary) => {
                if summary.control.is_none() {
                    let issue = AggregationError::MissingControlMember(valid_time.clone());
                    logging::log_aggregation_issue(station, &issue);
                    issues.push(issue);
                }
                summaries.push(summary);
            }
            Err(err) => {
                logging::log_aggregation_issue(station, &err);
                issues.push(err);
            }
        }
    }

    Aggregation { summaries, issues }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
