/// End-to-end pipeline tests: loader JSON -> typed records -> quantile
/// aggregation -> band composition -> adaptive binning -> dot layout.
///
/// The fixture mimics one station subset of a MEPS major-cities export:
/// two stations, three validity times, six members per (station, time).

use epsgram_core::analysis::bands::compose_plume_bands;
use epsgram_core::analysis::dots::layout_time_slice;
use epsgram_core::analysis::quantiles::aggregate_quantiles;
use epsgram_core::config::{BinningOptions, TimeSettings};
use epsgram_core::ingest::records::{
    filter_station, filter_valid_time, records_from_json, station_names, threshold_range,
};
use epsgram_core::model::BandRange;
use epsgram_core::params::find_param;

// ---------------------------------------------------------------------------
// Test Fixture
// ---------------------------------------------------------------------------

const STATIONS: [&str; 2] = ["Oslo", "Bergen"];
const TIMES: [&str; 3] = [
    "2022-08-15 00:00:00",
    "2022-08-15 06:00:00",
    "2022-08-15 12:00:00",
];
const MEMBERS: usize = 6;

/// Builds a loader-shaped JSON array. Temperatures rise over the day and
/// spread across members; Bergen runs two degrees cooler.
fn fixture_json() -> String {
    let mut entries = Vec::new();
    for (s, station) in STATIONS.iter().enumerate() {
        for (t, time) in TIMES.iter().enumerate() {
            for m in 0..MEMBERS {
                let t2m = 12.0 + 2.0 * t as f64 + 0.5 * m as f64 - 2.0 * s as f64;
                let s10m = 2.0 + 0.4 * m as f64 + t as f64;
                entries.push(format!(
                    r#"{{"name": "{station}", "valid_dttm": "{time}", "member": "mbr{m:03}",
                        "img_code": "cloudy", "T2m": {t2m}, "S10m": {s10m}, "D10m": 180.0}}"#
                ));
            }
        }
    }
    format!("[{}]", entries.join(","))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_ingest_sees_both_stations() {
    let param = find_param("temp").unwrap();
    let records = records_from_json(&fixture_json(), param).expect("fixture should parse");
    assert_eq!(records.len(), STATIONS.len() * TIMES.len() * MEMBERS);
    assert_eq!(station_names(&records), vec!["Bergen", "Oslo"]);
}

#[test]
fn test_aggregation_orders_and_summarizes_each_time() {
    let param = find_param("temp").unwrap();
    let records = records_from_json(&fixture_json(), param).unwrap();
    let oslo = filter_station(&records, "Oslo");

    let agg = aggregate_quantiles(&oslo, Some(14.0), &TimeSettings::default());
    assert!(agg.issues.is_empty(), "clean fixture should aggregate without issues: {:?}", agg.issues);
    assert_eq!(agg.summaries.len(), TIMES.len());

    let times: Vec<&str> = agg.summaries.iter().map(|s| s.valid_time.as_str()).collect();
    assert_eq!(times, TIMES.to_vec(), "summaries come back in chronological order");

    for summary in &agg.summaries {
        assert!(summary.q00 <= summary.q10);
        assert!(summary.q10 <= summary.q25);
        assert!(summary.q25 <= summary.q50);
        assert!(summary.q50 <= summary.q75);
        assert!(summary.q75 <= summary.q90);
        assert!(summary.q90 <= summary.q100);
        assert!(summary.control.is_some(), "every group carries mbr000");
        let prob = summary.prob.expect("threshold supplied, prob expected");
        assert!((0.0..=1.0).contains(&prob));
    }
}

#[test]
fn test_exceedance_probability_is_exact() {
    let param = find_param("temp").unwrap();
    let records = records_from_json(&fixture_json(), param).unwrap();
    let oslo = filter_station(&records, "Oslo");

    // At 00:00 Oslo members are 12.0, 12.5, ..., 14.5. Values at or above
    // 13.0 are 13.0, 13.5, 14.0, 14.5 — exactly 4 of 6, boundary included.
    let agg = aggregate_quantiles(&oslo, Some(13.0), &TimeSettings::default());
    let first = &agg.summaries[0];
    assert_eq!(first.valid_time, TIMES[0]);
    assert_eq!(first.prob, Some(4.0 / 6.0));
}

#[test]
fn test_plume_bands_cover_every_time_in_every_range() {
    let param = find_param("temp").unwrap();
    let records = records_from_json(&fixture_json(), param).unwrap();
    let oslo = filter_station(&records, "Oslo");
    let agg = aggregate_quantiles(&oslo, None, &TimeSettings::default());

    let bands = compose_plume_bands(&agg.summaries);
    assert_eq!(bands.len(), 3 * TIMES.len());
    for range in [BandRange::Q00Q100, BandRange::Q10Q90, BandRange::Q25Q75] {
        let of_range: Vec<_> = bands.iter().filter(|b| b.range == range).collect();
        assert_eq!(of_range.len(), TIMES.len());
        for band in of_range {
            assert!(band.min <= band.max);
        }
    }
}

#[test]
fn test_time_slice_layout_respects_occupancy_bound() {
    let param = find_param("temp").unwrap();
    let records = records_from_json(&fixture_json(), param).unwrap();
    let oslo = filter_station(&records, "Oslo");
    let slice = filter_valid_time(&oslo, TIMES[2]);
    assert_eq!(slice.len(), MEMBERS);

    let layout = layout_time_slice(
        &slice,
        BinningOptions { nominal_step: param.nominal_step, force_step: param.force_step },
        Some(17.0),
    )
    .expect("non-empty slice should lay out");

    assert_eq!(layout.dots.len(), MEMBERS, "one dot per member");
    assert_eq!(layout.max_steps, MEMBERS.div_ceil(2));

    // No stack exceeds the grid capacity.
    for &x in &layout.x_positions {
        let stacked = layout.dots.iter().filter(|d| d.x == x).count();
        assert!(
            stacked <= layout.max_steps,
            "bin at {} holds {} dots, grid capacity is {}",
            x,
            stacked,
            layout.max_steps
        );
    }

    // Exceedance flags agree with the member values.
    let slice_values: Vec<f64> = slice.iter().map(|r| r.value).collect();
    let expected_exceeding = slice_values.iter().filter(|&&v| v >= 17.0).count();
    let flagged = layout.dots.iter().filter(|d| d.exceeds_threshold).count();
    assert_eq!(flagged, expected_exceeding);
}

#[test]
fn test_recomputation_is_stable_under_slider_drags() {
    // The UI reruns the whole pipeline on every threshold tick; outputs for
    // identical inputs must be identical, with no hidden state.
    let param = find_param("temp").unwrap();
    let records = records_from_json(&fixture_json(), param).unwrap();
    let oslo = filter_station(&records, "Oslo");
    let settings = TimeSettings::default();

    for threshold in [Some(12.0), Some(13.5), Some(12.0), None, Some(12.0)] {
        let a = aggregate_quantiles(&oslo, threshold, &settings);
        let b = aggregate_quantiles(&oslo, threshold, &settings);
        assert_eq!(a, b);
    }
}

#[test]
fn test_threshold_slider_bounds_land_on_step_multiples() {
    let param = find_param("temp").unwrap();
    let records = records_from_json(&fixture_json(), param).unwrap();
    let oslo = filter_station(&records, "Oslo");

    // Oslo temperatures span 12.0..18.5; step 1.0 bounds are 12..19.
    let (lo, hi) = threshold_range(&oslo, param.nominal_step).unwrap();
    assert_eq!((lo, hi), (12.0, 19.0));
}
