//! Windowed-sinc FIR design (MNE / `scipy.signal.firwin` conventions).
//!
//! For a highpass at `l_freq` Hz:
//!   • transition bandwidth = min(max(0.25 * l_freq, 2.0), l_freq)
//!   • firwin cutoff        = l_freq − trans_bw / 2
//! For a lowpass at `h_freq` Hz:
//!   • transition bandwidth = min(max(0.25 * h_freq, 2.0), nyquist − h_freq)
//!   • firwin cutoff        = h_freq + trans_bw / 2
//! In both cases the length is `ceil(3.3 / trans_bw * sfreq)` rounded to odd
//! (Hamming window), so the kernel is linear-phase and can be applied
//! zero-phase by a `(N-1)/2` shift.
use anyhow::{bail, Result};
use std::f64::consts::PI;

/// Transition bandwidth for a highpass edge at `l_freq`.
pub fn highpass_trans_bandwidth(l_freq: f64) -> f64 {
    (0.25 * l_freq).max(2.0).min(l_freq)
}

/// Transition bandwidth for a lowpass edge at `h_freq`.
pub fn lowpass_trans_bandwidth(h_freq: f64, sfreq: f64) -> f64 {
    (0.25 * h_freq).max(2.0).min(sfreq / 2.0 - h_freq)
}

/// Number of taps for a given transition bandwidth, always odd.
///
/// Formula: `ceil(3.3 / trans_bw * sfreq)` rounded up to odd.
pub fn auto_filter_length(trans_bw: f64, sfreq: f64) -> usize {
    let n_raw = (3.3 / trans_bw * sfreq).ceil() as usize;
    if n_raw % 2 == 0 { n_raw + 1 } else { n_raw }
}

/// Zero-phase highpass kernel with its edge at `l_freq` Hz.
pub fn design_highpass(l_freq: f64, sfreq: f64) -> Result<Vec<f64>> {
    check_edge(l_freq, sfreq)?;
    let trans_bw = highpass_trans_bandwidth(l_freq);
    let n = auto_filter_length(trans_bw, sfreq);
    let cutoff_hz = l_freq - trans_bw / 2.0;
    Ok(firwin(n, cutoff_hz, sfreq, false))
}

/// Zero-phase lowpass kernel with its edge at `h_freq` Hz.
pub fn design_lowpass(h_freq: f64, sfreq: f64) -> Result<Vec<f64>> {
    check_edge(h_freq, sfreq)?;
    let trans_bw = lowpass_trans_bandwidth(h_freq, sfreq);
    let n = auto_filter_length(trans_bw, sfreq);
    let cutoff_hz = h_freq + trans_bw / 2.0;
    Ok(firwin(n, cutoff_hz, sfreq, true))
}

fn check_edge(freq: f64, sfreq: f64) -> Result<()> {
    if !(freq > 0.0 && freq < sfreq / 2.0) {
        bail!("filter edge {freq} Hz must lie strictly between 0 and Nyquist ({} Hz)", sfreq / 2.0);
    }
    Ok(())
}

/// Hamming-windowed sinc of odd length `n`.
///
/// `pass_zero=true` gives a lowpass normalised to unit DC gain; `false`
/// gives the spectrally inverted highpass.  `cutoff_hz` is the −6 dB point.
pub fn firwin(n: usize, cutoff_hz: f64, sfreq: f64, pass_zero: bool) -> Vec<f64> {
    assert!(n % 2 == 1, "firwin requires odd N for linear-phase filter");
    let alpha = (n - 1) as f64 / 2.0;
    let fc = cutoff_hz / (sfreq / 2.0);

    let win = hamming(n);

    let mut h: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - alpha;
            let sinc = if x == 0.0 { fc } else { (PI * fc * x).sin() / (PI * x) };
            sinc * win[i]
        })
        .collect();

    let s: f64 = h.iter().sum();
    h.iter_mut().for_each(|v| *v /= s);

    if !pass_zero {
        h.iter_mut().for_each(|v| *v = -*v);
        h[n / 2] += 1.0;
    }

    h
}

/// Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}
