mod common;
use common::{bangkok, eda_wave, recording, seconds, timestamps, T0};
use physio_combine::eda::{extract_eda_features, EDA, EDA_PHASIC, EDA_TONIC};

#[test]
fn one_row_per_second_spanned() {
    // 120.4 s at 15 Hz starting mid-second.
    let n = 1806;
    let ts = timestamps(T0 + 0.5, n, 15.0);
    let rec = recording("EA", ts, eda_wave(n, 15.0, &[40.0]));

    let out = extract_eda_features(&rec, 15.0, 0.01, bangkok()).unwrap();
    let first = T0 as i64;
    // Last sample at T0 + 0.5 + 1805/15 = T0 + 120.83.
    assert_eq!(seconds(&out.series.index), (first..=first + 120).collect::<Vec<_>>());
    assert_eq!(out.series.columns, vec![EDA, EDA_TONIC, EDA_PHASIC]);
}

#[test]
fn tonic_and_phasic_add_up_per_bucket() {
    let n = 3000;
    let rec = recording("EA", timestamps(T0, n, 15.0), eda_wave(n, 15.0, &[50.0, 120.0]));
    let out = extract_eda_features(&rec, 15.0, 0.01, bangkok()).unwrap();

    let eda = out.series.column(EDA).unwrap();
    let tonic = out.series.column(EDA_TONIC).unwrap();
    let phasic = out.series.column(EDA_PHASIC).unwrap();
    for i in 0..out.series.len() {
        approx::assert_abs_diff_eq!(
            tonic[i].unwrap() + phasic[i].unwrap(),
            eda[i].unwrap(),
            epsilon = 1e-9
        );
    }
}

#[test]
fn tonic_tracks_baseline_away_from_responses() {
    let n = 3000;
    let rec = recording("EA", timestamps(T0, n, 15.0), eda_wave(n, 15.0, &[50.0, 120.0]));
    let out = extract_eda_features(&rec, 15.0, 0.01, bangkok()).unwrap();
    let tonic = out.series.column(EDA_TONIC).unwrap();
    // Baseline is 2 + 0.002·t; second 90 is far from both bumps and the edges.
    approx::assert_abs_diff_eq!(tonic[90].unwrap(), 2.18, epsilon = 0.05);
}

#[test]
fn scr_peaks_found_at_responses() {
    let fs = 15.0;
    let n = 3000;
    let bumps = [50.0, 100.0, 150.0];
    let rec = recording("EA", timestamps(T0, n, fs), eda_wave(n, fs, &bumps));
    let out = extract_eda_features(&rec, fs, 0.01, bangkok()).unwrap();

    let mut largest = out.scr.clone();
    largest.sort_by(|a, b| b.amplitude.total_cmp(&a.amplitude));
    let mut found: Vec<f64> = largest[..3].iter().map(|p| p.peak as f64 / fs).collect();
    found.sort_by(f64::total_cmp);
    for (got, want) in found.iter().zip(bumps) {
        assert!((got - want).abs() < 1.0, "SCR at {got} s, expected {want} s");
    }
    assert!(out.scr.iter().all(|p| p.onset < p.peak));
}
