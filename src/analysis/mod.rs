/// Statistical analysis for the ensemble meteogram core.
///
/// Everything here is a pure, synchronous transformation over the read-only
/// record collection — safe to rerun on every slider tick with identical
/// outputs for identical inputs.
///
/// Submodules:
/// - `quantiles` — per-validity-time seven-number summaries, control value,
///   exceedance probability.
/// - `circular` — quadrant-based unwrapping of directional (compass-degree)
///   data around the 0/360 discontinuity.
/// - `bands` — quantile-pair band series for plume and radial views.
/// - `binning` — bounded adaptive bin-width search for the dot plot.
/// - `dots` — bin assignment and dot-plot grid layout.

pub mod bands;
pub mod binning;
pub mod circular;
pub mod dots;
pub mod quantiles;
