/// Quadrant correction for directional (compass-degree) data.
///
/// Wind direction wraps at the 0/360 boundary: an ensemble clustered around
/// north (e.g. 350..10 degrees) looks like a 340-degree spread to naive
/// numeric statistics. This module decides, from the set of 90-degree
/// quadrants present in the data, whether to shift the wrapped side by
/// +/-360 so the cluster is contiguous before quantiles are computed.
///
/// The decision is a heuristic approximation of minimum-arc unwrapping,
/// expressed as a pure function from the quadrant set to a correction
/// policy. It is evaluated over whatever record set the caller passes —
/// the whole directional series by default, or one time slice at a time if
/// the caller prefers per-group granularity.
///
/// Originals are never mutated: the output is value copies annotated with
/// the applied offset. Values are normalized into [0, 360) before
/// classification, so correcting already-corrected output cannot
/// double-shift.

use crate::model::EnsembleRecord;

// ---------------------------------------------------------------------------
// Quadrants
// ---------------------------------------------------------------------------

/// One of the four 90-degree sectors of the compass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// [0, 90)
    Q1,
    /// [90, 180)
    Q2,
    /// [180, 270)
    Q3,
    /// [270, 360)
    Q4,
}

/// Classifies a compass value, normalizing into [0, 360) first.
pub fn quadrant_of(value: f64) -> Quadrant {
    let v = value.rem_euclid(360.0);
    if v < 90.0 {
        Quadrant::Q1
    } else if v < 180.0 {
        Quadrant::Q2
    } else if v < 270.0 {
        Quadrant::Q3
    } else {
        Quadrant::Q4
    }
}

/// Which quadrants occur among a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuadrantSet {
    pub q1: bool,
    pub q2: bool,
    pub q3: bool,
    pub q4: bool,
}

impl QuadrantSet {
    pub fn from_values(values: &[f64]) -> QuadrantSet {
        let mut set = QuadrantSet::default();
        for &value in values {
            match quadrant_of(value) {
                Quadrant::Q1 => set.q1 = true,
                Quadrant::Q2 => set.q2 = true,
                Quadrant::Q3 => set.q3 = true,
                Quadrant::Q4 => set.q4 = true,
            }
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Correction policy
// ---------------------------------------------------------------------------

/// What shift, if any, to apply to a quadrant's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionPolicy {
    NoShift,
    /// Shift Q4 values by -360 (cluster straddles north from the west side).
    ShiftQ4Negative,
    /// Shift Q1 values by +360 (cluster straddles north from the east side).
    ShiftQ1Positive,
    /// Shift Q4 by -360 only when the raw value range exceeds 180 degrees.
    ConditionalShiftQ4,
}

/// The quadrant-set decision table. Rules are checked in order; the first
/// match wins.
pub fn policy_for(set: QuadrantSet) -> CorrectionPolicy {
    if (set.q1 && set.q4) || (set.q1 && set.q2 && set.q4) {
        CorrectionPolicy::ShiftQ4Negative
    } else if set.q1 && set.q3 && set.q4 {
        CorrectionPolicy::ShiftQ1Positive
    } else if set.q2 && set.q4 {
        CorrectionPolicy::ConditionalShiftQ4
    } else {
        CorrectionPolicy::NoShift
    }
}

// ---------------------------------------------------------------------------
// Corrected records
// ---------------------------------------------------------------------------

/// A value copy of an input record plus the quadrant offset applied to it.
/// The original record is untouched; `corrected_value` is what the
/// statistics passes consume.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedRecord {
    pub record: EnsembleRecord,
    /// 0.0, +360.0, or -360.0.
    pub offset: f64,
}

impl CorrectedRecord {
    /// The unwrapped value: raw normalized into [0, 360), plus the offset.
    pub fn corrected_value(&self) -> f64 {
        self.record.value.rem_euclid(360.0) + self.offset
    }
}

/// Offset for one value under a given policy. `range` is the normalized
/// data range, consulted only by the conditional rule.
fn offset_for(value: f64, policy: CorrectionPolicy, range: f64) -> f64 {
    match (policy, quadrant_of(value)) {
        (CorrectionPolicy::ShiftQ4Negative, Quadrant::Q4) => -360.0,
        (CorrectionPolicy::ShiftQ1Positive, Quadrant::Q1) => 360.0,
        (CorrectionPolicy::ConditionalShiftQ4, Quadrant::Q4) if range > 180.0 => -360.0,
        _ => 0.0,
    }
}

/// Applies quadrant correction to a set of directional records.
///
/// The policy is chosen once for the whole input; pass one time slice at a
/// time for per-group correction.
pub fn correct_directional(records: &[EnsembleRecord]) -> Vec<CorrectedRecord> {
    let normalized: Vec<f64> = records.iter().map(|r| r.value.rem_euclid(360.0)).collect();
    let set = QuadrantSet::from_values(&normalized);
    let policy = policy_for(set);

    let range = match (
        normalized.iter().cloned().fold(f64::INFINITY, f64::min),
        normalized.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    ) {
        (min, max) if min.is_finite() && max.is_finite() => max - min,
        _ => 0.0,
    };

    records
        .iter()
        .map(|record| CorrectedRecord {
            record: record.clone(),
            offset: offset_for(record.value, policy, range),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
