use physio_combine::filter::{bandpass, design_highpass, design_lowpass, filter_zero_phase};
use std::f64::consts::PI;

// ── Coefficient tests ─────────────────────────────────────────────────────────

#[test]
fn highpass_coeffs_sum_near_zero() {
    // Highpass: sum of coefficients ≈ 0 (zero DC gain).
    for (l, fs) in [(0.5, 100.0), (0.5, 10.0), (0.05, 15.0)] {
        let h = design_highpass(l, fs).unwrap();
        let s: f64 = h.iter().sum();
        assert!(s.abs() < 1e-10, "sum(h) = {s:.2e} for {l} Hz @ {fs} Hz");
    }
}

#[test]
fn lowpass_coeffs_unit_dc_gain() {
    let h = design_lowpass(3.0, 15.0).unwrap();
    let s: f64 = h.iter().sum();
    assert!((s - 1.0).abs() < 1e-12, "sum(h) = {s}");
}

#[test]
fn coeffs_symmetric() {
    let h = design_highpass(0.5, 100.0).unwrap();
    let n = h.len();
    assert_eq!(n % 2, 1);
    for i in 0..n / 2 {
        let diff = (h[i] - h[n - 1 - i]).abs();
        assert!(diff < 1e-15, "h[{i}]={} ≠ h[{}]={}", h[i], n - 1 - i, h[n - 1 - i]);
    }
}

#[test]
fn edge_outside_nyquist_rejected() {
    assert!(design_highpass(0.0, 100.0).is_err());
    assert!(design_lowpass(60.0, 100.0).is_err());
}

// ── Application tests ─────────────────────────────────────────────────────────

fn sines(n: usize, fs: f64, freqs: &[f64]) -> Vec<f64> {
    (0..n)
        .map(|i| freqs.iter().map(|f| (2.0 * PI * f * i as f64 / fs).sin()).sum())
        .collect()
}

fn rms(x: &[f64]) -> f64 {
    (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
}

#[test]
fn highpass_removes_sub_hz_content() {
    // 0.1 Hz (stop band) + 5 Hz (pass band), 60 s at 100 Hz.
    let fs = 100.0;
    let x = sines(6000, fs, &[0.1, 5.0]);
    let h = design_highpass(0.5, fs).unwrap();
    let y = filter_zero_phase(&x, &h).unwrap();
    assert_eq!(y.len(), x.len());

    // Skip edges (transient region).
    let guard = h.len();
    let r = rms(&y[guard..y.len() - guard]);
    // Pure 5 Hz sine has RMS = 1/sqrt(2) ≈ 0.707.
    assert!(r > 0.65, "RMS too low ({r:.3}), pass-band signal attenuated?");
    assert!(r < 0.76, "RMS too high ({r:.3}), stop-band not attenuated?");
}

#[test]
fn ppg_band_keeps_pulse_rate_drops_drift_and_noise() {
    let fs = 100.0;
    let x = sines(6000, fs, &[0.05, 1.2, 25.0]);
    let y = bandpass(&x, fs, Some(0.5), Some(8.0)).unwrap();
    let r = rms(&y[1000..5000]);
    assert!((r - 0.5_f64.sqrt()).abs() < 0.05, "RMS {r:.3}, expected only the 1.2 Hz line");
}

#[test]
fn lowpass_leg_skipped_at_or_above_nyquist() {
    // At 10 Hz an 8 Hz edge is above Nyquist: bandpass is highpass alone.
    let fs = 10.0;
    let x = sines(1000, fs, &[0.1, 1.0]);
    let band = bandpass(&x, fs, Some(0.5), Some(8.0)).unwrap();
    let high = filter_zero_phase(&x, &design_highpass(0.5, fs).unwrap()).unwrap();
    assert_eq!(band, high);
}

#[test]
fn zero_phase_keeps_peak_position() {
    let fs = 100.0;
    let mut x = vec![0.0; 1001];
    x[500] = 1.0;
    let y = filter_zero_phase(&x, &design_lowpass(5.0, fs).unwrap()).unwrap();
    let argmax = (0..y.len()).fold(0, |b, i| if y[i] > y[b] { i } else { b });
    assert_eq!(argmax, 500);
}

#[test]
fn short_signal_keeps_length() {
    let h = design_highpass(0.5, 100.0).unwrap();
    let y = filter_zero_phase(&[1.0, 2.0, 3.0], &h).unwrap();
    assert_eq!(y.len(), 3);
    assert!(y.iter().all(|v| v.is_finite()));
}
