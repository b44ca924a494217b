/// Adaptive bin-width search for the dot plot.
///
/// Given one time slice of member values, finds a bin width that keeps
/// every bin's occupancy at or below `max_steps = ceil(n / 2)` — the dot
/// plot's grid capacity — preferring the coarsest such width. The search is
/// a bounded local search in three named phases:
///
/// 1. **Coarsen** — starting from half the nominal step, double the step
///    until the bin count fits the grid.
/// 2. **Refine** — halve the step up to `REFINE_ITERATION_CAP` times,
///    stopping as soon as no bin's occupancy exceeds the target.
/// 3. **Fallback select** — if the cap is reached without satisfying the
///    constraint and refinement never beat the first coarse attempt,
///    revert to that coarse attempt. The discriminated outcome tells the
///    caller the result is an approximation.
///
/// A caller-forced step skips the search entirely and is used verbatim.

use crate::config::BinningOptions;
use crate::model::BinningError;

/// Maximum number of refine-phase halvings.
pub const REFINE_ITERATION_CAP: usize = 4;

// ---------------------------------------------------------------------------
// Search result
// ---------------------------------------------------------------------------

/// How the search terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Every bin's occupancy is within the target.
    Converged,
    /// The caller forced the step; no search was run.
    ForcedStep,
    /// Iteration cap reached; the result is the stability fallback and may
    /// exceed the target occupancy.
    FallbackApplied,
}

/// The chosen binning: ascending bin edges and the step between them.
/// Bins are the half-open intervals between consecutive edges, with the
/// final bin closed.
#[derive(Debug, Clone, PartialEq)]
pub struct BinSearch {
    pub thresholds: Vec<f64>,
    pub step: f64,
    /// Target maximum occupancy, also the dot-plot grid capacity.
    pub max_steps: usize,
    pub outcome: SearchOutcome,
}

impl BinSearch {
    /// Number of bins described by the edge list.
    pub fn bin_count(&self) -> usize {
        self.thresholds.len().saturating_sub(1)
    }
}

// ---------------------------------------------------------------------------
// Bin edges and occupancy
// ---------------------------------------------------------------------------

fn round_down(value: f64, step: f64) -> f64 {
    let inv = 1.0 / step;
    (value * inv).floor() / inv
}

fn round_up(value: f64, step: f64) -> f64 {
    let inv = 1.0 / step;
    (value * inv).ceil() / inv
}

/// Ascending bin edges covering the data range rounded outward to
/// multiples of `step`, with one step of headroom above the top value.
pub fn bin_thresholds(values: &[f64], step: f64) -> Vec<f64> {
    let (min, max) = extent(values);
    let low = round_down(min, step);
    let high = round_up(max, step) + step;
    let n = ((high - low) / step).ceil() as usize;
    (0..n).map(|i| low + i as f64 * step).collect()
}

/// Index of the bin holding `value`: the half-open interval
/// [thresholds[i], thresholds[i+1]), with values at or beyond the last
/// edge clamped into the final bin.
pub fn assign_bin(value: f64, thresholds: &[f64]) -> usize {
    let bins = thresholds.len().saturating_sub(1);
    if bins == 0 {
        return 0;
    }
    let idx = thresholds.partition_point(|&edge| edge <= value);
    idx.saturating_sub(1).min(bins - 1)
}

/// Occupancy of each bin.
pub fn bin_counts(values: &[f64], thresholds: &[f64]) -> Vec<usize> {
    let bins = thresholds.len().saturating_sub(1);
    let mut counts = vec![0usize; bins.max(1)];
    for &value in values {
        counts[assign_bin(value, thresholds)] += 1;
    }
    counts
}

fn extent(values: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &value in values {
        min = min.min(value);
        max = max.max(value);
    }
    (min, max)
}

// ---------------------------------------------------------------------------
// The search
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Candidate {
    thresholds: Vec<f64>,
    step: f64,
    max_occupancy: usize,
}

impl Candidate {
    fn evaluate(values: &[f64], step: f64) -> Candidate {
        let thresholds = bin_thresholds(values, step);
        let max_occupancy = bin_counts(values, &thresholds).into_iter().max().unwrap_or(0);
        Candidate {
            thresholds,
            step,
            max_occupancy,
        }
    }

    fn into_result(self, max_steps: usize, outcome: SearchOutcome) -> BinSearch {
        BinSearch {
            thresholds: self.thresholds,
            step: self.step,
            max_steps,
            outcome,
        }
    }
}

/// Runs the bounded bin-width search over one time slice of values.
pub fn search_binning(values: &[f64], options: BinningOptions) -> Result<BinSearch, BinningError> {
    if values.is_empty() {
        return Err(BinningError::EmptyInput);
    }
    let nominal = options.nominal_step;
    if !nominal.is_finite() || nominal <= 0.0 {
        return Err(BinningError::InvalidStep(nominal));
    }

    let max_steps = values.len().div_ceil(2);
    let (min, max) = extent(values);

    // Degenerate range: every member identical. One bin at the nominal
    // step; searching would never change anything.
    if max == min {
        let low = round_down(min, nominal);
        return Ok(BinSearch {
            thresholds: vec![low, low + nominal],
            step: nominal,
            max_steps,
            outcome: SearchOutcome::Converged,
        });
    }

    if options.force_step {
        let candidate = Candidate::evaluate(values, nominal);
        return Ok(candidate.into_result(max_steps, SearchOutcome::ForcedStep));
    }

    // Coarsen: double from half the nominal step until the bin count fits
    // the grid. Each doubling at least halves the bin count, so this
    // terminates after a handful of iterations for any finite range.
    let mut step = nominal / 2.0;
    let coarse = loop {
        step *= 2.0;
        let candidate = Candidate::evaluate(values, step);
        if candidate.thresholds.len().saturating_sub(1) <= max_steps {
            break candidate;
        }
    };

    if coarse.max_occupancy <= max_steps {
        return Ok(coarse.into_result(max_steps, SearchOutcome::Converged));
    }

    // Refine: halve toward the occupancy target, bounded by the cap.
    let first_max = coarse.max_occupancy;
    let mut best = coarse.clone();
    let mut current = coarse.clone();
    for _ in 0..REFINE_ITERATION_CAP {
        current = Candidate::evaluate(values, current.step / 2.0);
        if current.max_occupancy < best.max_occupancy {
            best = current.clone();
        }
        if current.max_occupancy <= max_steps {
            return Ok(current.into_result(max_steps, SearchOutcome::Converged));
        }
    }

    // Fallback select: refinement never satisfied the constraint. Keep the
    // best refinement if it improved on the coarse attempt; otherwise
    // revert to the coarse attempt to avoid oscillating on data that
    // cannot satisfy the target (e.g. many duplicate values).
    let chosen = if best.max_occupancy < first_max { best } else { coarse };
    Ok(chosen.into_result(max_steps, SearchOutcome::FallbackApplied))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
