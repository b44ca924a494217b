/// Statistics core for probabilistic ensemble-forecast visualization.
///
/// Ingests raw ensemble member records (many simulated trajectories per
/// station per validity time) and derives the summaries that drive the
/// charts: quantile bands over time for plume and radial views, exceedance
/// probabilities against a user threshold, and adaptive dot-plot layouts
/// that place every member as a distinguishable point.
///
/// The crate is a pure, synchronous, re-entrant transformation layer. It
/// owns no UI state, performs no rendering, persistence, or network I/O,
/// and is safe to invoke on every upstream interaction (station change,
/// threshold drag, time selection). The drawing layer consumes the plain
/// data structures produced here.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod params;
