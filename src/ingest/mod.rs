/// Record ingest for the ensemble statistics engine.
///
/// The external loader hands the core one flat JSON array per model run,
/// with one object per (station, validity time, member). This module turns
/// that array into typed `EnsembleRecord`s for a chosen parameter and
/// provides the station / time-slice selections the UI layer drives.
///
/// Submodules:
/// - `records` — JSON deserialization and record selection helpers.

pub mod records;
