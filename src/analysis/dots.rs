/// Bin assignment and dot-plot layout.
///
/// Places every ensemble member of one time slice as a distinguishable dot:
/// members are partitioned into the bins chosen by the adaptive bin-width
/// search, sorted ascending within each bin, and stacked upward from the
/// baseline in data units. The layout also reports the grid geometry the
/// renderer needs — bin centers, extent, and the side padding that centers
/// the occupied bins within the fixed-capacity grid.

use crate::config::BinningOptions;
use crate::logging;
use crate::model::{BinningError, DotPosition, EnsembleRecord, MemberKind};

use super::binning::{self, BinSearch};

// ---------------------------------------------------------------------------
// Layout result
// ---------------------------------------------------------------------------

/// A complete dot-plot layout for one time slice.
#[derive(Debug, Clone, PartialEq)]
pub struct DotLayout {
    /// One dot per input member.
    pub dots: Vec<DotPosition>,
    /// Distinct occupied bin centers, ascending.
    pub x_positions: Vec<f64>,
    /// Extent of the occupied bin centers (min, max).
    pub x_extent: (f64, f64),
    /// Bin width used for the layout.
    pub step: f64,
    /// Number of grid slots spanned by the occupied bins.
    pub data_steps: usize,
    /// Grid capacity, ceil(n / 2) — also the stack height limit.
    pub max_steps: usize,
    /// Empty slots added below / above the occupied span to center it in
    /// the grid. Negative when the data spans more slots than the grid
    /// holds (possible after a forced step).
    pub pad_lower: isize,
    pub pad_upper: isize,
    /// Full grid extent in data units, half a step beyond the padded span.
    pub grid_min: f64,
    pub grid_max: f64,
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Lays out one time slice of records using a previously chosen binning.
pub fn layout_dots(
    records: &[EnsembleRecord],
    search: &BinSearch,
    threshold: Option<f64>,
) -> Result<DotLayout, BinningError> {
    if records.is_empty() {
        return Err(BinningError::EmptyInput);
    }

    let step = search.step;
    let bins = search.bin_count();

    // Partition members into bins, then sort each bin ascending by value
    // for deterministic stacking order.
    let mut binned: Vec<Vec<&EnsembleRecord>> = vec![Vec::new(); bins.max(1)];
    for record in records {
        binned[binning::assign_bin(record.value, &search.thresholds)].push(record);
    }
    for bin in &mut binned {
        bin.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal));
    }

    let mut dots = Vec::with_capacity(records.len());
    for (i, bin) in binned.iter().enumerate() {
        // Every bin anchors its dots at the center under its upper edge;
        // the final bin anchors above its lower edge.
        let x = if i + 1 < bins {
            search.thresholds[i + 1] - step / 2.0
        } else {
            search.thresholds[i] + step / 2.0
        };
        for (j, record) in bin.iter().enumerate() {
            dots.push(DotPosition {
                x,
                y: step / 2.0 + j as f64 * step,
                member_id: record.member_id.clone(),
                member_kind: if record.is_control() {
                    MemberKind::Control
                } else {
                    MemberKind::Perturbed
                },
                exceeds_threshold: threshold.map(|t| record.value >= t).unwrap_or(false),
                threshold,
                symbol_code: record.symbol_code.clone(),
            });
        }
    }

    // Grid geometry: center the occupied span within the max_steps slots.
    let mut x_positions: Vec<f64> = dots.iter().map(|d| d.x).collect();
    x_positions.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    x_positions.dedup();

    let min_x = x_positions[0];
    let max_x = x_positions[x_positions.len() - 1];
    let data_steps = 1 + ((max_x - min_x) / step).round() as usize;

    let spare = search.max_steps as isize - data_steps as isize;
    let pad_lower = spare.div_euclid(2);
    let pad_upper = spare - pad_lower;
    if spare < 0 {
        logging::warn(
            logging::Stage::Layout,
            logging::station_context(records.iter().map(|r| r.station_name.as_str())),
            &format!(
                "Occupied bins span {} slots but the grid holds {}",
                data_steps, search.max_steps
            ),
        );
    }

    Ok(DotLayout {
        grid_min: min_x - step * pad_lower as f64 - step / 2.0,
        grid_max: max_x + step * pad_upper as f64 + step / 2.0,
        dots,
        x_positions,
        x_extent: (min_x, max_x),
        step,
        data_steps,
        max_steps: search.max_steps,
        pad_lower,
        pad_upper,
    })
}

/// Convenience entry point: run the adaptive bin-width search on a time
/// slice and lay out the dots in one call.
pub fn layout_time_slice(
    records: &[EnsembleRecord],
    options: BinningOptions,
    threshold: Option<f64>,
) -> Result<DotLayout, BinningError> {
    let values: Vec<f64> = records.iter().map(|r| r.value).collect();
    let search = binning::search_binning(&values, options)?;
    if search.outcome == binning::SearchOutcome::FallbackApplied {
        let station = logging::station_context(records.iter().map(|r| r.station_name.as_str()));
        logging::log_binning_fallback(station, search.step, search.max_steps);
    }
    layout_dots(records, &search, threshold)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
