/// Band composition.
///
/// Converts per-validity-time quantile summaries into the paired (min, max)
/// band series the plume and radial views draw. Output is range-major — all
/// segments of a band share the label the renderer maps to a fill and, for
/// the radial view, an arc width.

use crate::model::{Band, BandRange, QuantileSummary};

// ---------------------------------------------------------------------------
// Plume bands
// ---------------------------------------------------------------------------

/// Three nested envelope bands per validity time: q00–q100, q10–q90,
/// q25–q75. Drawn widest first so the inner bands overlay the outer.
pub fn compose_plume_bands(summaries: &[QuantileSummary]) -> Vec<Band> {
    let mut bands = Vec::with_capacity(summaries.len() * 3);
    for (range, pick) in [
        (BandRange::Q00Q100, pick_q00_q100 as fn(&QuantileSummary) -> (f64, f64)),
        (BandRange::Q10Q90, pick_q10_q90),
        (BandRange::Q25Q75, pick_q25_q75),
    ] {
        for summary in summaries {
            let (min, max) = pick(summary);
            bands.push(Band {
                valid_time: summary.valid_time.clone(),
                min,
                max,
                range,
            });
        }
    }
    bands
}

fn pick_q00_q100(s: &QuantileSummary) -> (f64, f64) {
    (s.q00, s.q100)
}

fn pick_q10_q90(s: &QuantileSummary) -> (f64, f64) {
    (s.q10, s.q90)
}

fn pick_q25_q75(s: &QuantileSummary) -> (f64, f64) {
    (s.q25, s.q75)
}

// ---------------------------------------------------------------------------
// Radial bands
// ---------------------------------------------------------------------------

/// Five arc segments per validity time for the directional view, symmetric
/// about the interquartile core: q90–q100 and q00–q10 reuse the outer
/// label, q75–q90 and q10–q25 the middle, q25–q75 the inner.
pub fn compose_radial_bands(summaries: &[QuantileSummary]) -> Vec<Band> {
    let segments: [(BandRange, fn(&QuantileSummary) -> (f64, f64)); 5] = [
        (BandRange::Q00Q100, |s| (s.q90, s.q100)),
        (BandRange::Q00Q100, |s| (s.q00, s.q10)),
        (BandRange::Q10Q90, |s| (s.q75, s.q90)),
        (BandRange::Q10Q90, |s| (s.q10, s.q25)),
        (BandRange::Q25Q75, |s| (s.q25, s.q75)),
    ];
    let mut bands = Vec::with_capacity(summaries.len() * segments.len());
    for (range, pick) in segments {
        for summary in summaries {
            let (min, max) = pick(summary);
            bands.push(Band {
                valid_time: summary.valid_time.clone(),
                min,
                max,
                range,
            });
        }
    }
    bands
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
