//! PPG cleaning and systolic peak detection.
//!
//! Cleaning is a zero-phase 0.5–8 Hz bandpass (the Elgendi preprocessing
//! band).  Peaks are found with Elgendi's two-moving-average detector:
//!
//! ```text
//! y      = max(x, 0)²
//! MA_pk  = boxcar(y, 111 ms)        MA_bt = boxcar(y, 667 ms)
//! block  = run of samples with MA_pk > MA_bt + 0.02 · mean(y)
//! peak   = argmax of x inside each block at least 111 ms long
//! ```
//! with a 300 ms refractory period between accepted peaks, counted from
//! index 0 for the first one.  Only blocks that open and close inside the
//! signal count, and the argmax must be a local maximum of `x`.
use anyhow::Result;

use crate::filter::bandpass;

/// Lower edge of the cleaning band in Hz.
pub const CLEAN_LOW_HZ: f64 = 0.5;
/// Upper edge of the cleaning band in Hz.
pub const CLEAN_HIGH_HZ: f64 = 8.0;

const PEAK_WINDOW_S: f64 = 0.111;
const BEAT_WINDOW_S: f64 = 0.667;
const BEAT_OFFSET: f64 = 0.02;
const MIN_DELAY_S: f64 = 0.3;

/// Bandpass a raw PPG waveform.  Output has the same length as the input.
pub fn clean(signal: &[f64], sampling_rate: f64) -> Result<Vec<f64>> {
    bandpass(signal, sampling_rate, Some(CLEAN_LOW_HZ), Some(CLEAN_HIGH_HZ))
}

/// Indices of systolic peaks in a cleaned PPG signal, ascending.
pub fn find_peaks(cleaned: &[f64], sampling_rate: f64) -> Vec<usize> {
    if cleaned.len() < 3 {
        return vec![];
    }
    let squared: Vec<f64> = cleaned.iter().map(|&v| v.max(0.0).powi(2)).collect();
    let ma_peak = moving_average(&squared, samples(PEAK_WINDOW_S, sampling_rate));
    let ma_beat = moving_average(&squared, samples(BEAT_WINDOW_S, sampling_rate));
    let offset = BEAT_OFFSET * squared.iter().sum::<f64>() / squared.len() as f64;

    let min_len = samples(PEAK_WINDOW_S, sampling_rate);
    let min_delay = samples(MIN_DELAY_S, sampling_rate);

    let above = |i: usize| ma_peak[i] > ma_beat[i] + offset;
    let is_local_max = |p: usize| {
        p > 0 && p + 1 < cleaned.len() && cleaned[p] >= cleaned[p - 1] && cleaned[p] >= cleaned[p + 1]
    };

    // Index 0 acts as an accepted beat for the refractory check.
    let mut peaks: Vec<usize> = Vec::new();
    let mut i = 0;
    while i < cleaned.len() {
        if !above(i) {
            i += 1;
            continue;
        }
        let beg = i;
        while i < cleaned.len() && above(i) {
            i += 1;
        }
        // Blocks need a rising edge and a falling edge inside the window.
        if beg == 0 || i == cleaned.len() || i - beg < min_len {
            continue;
        }
        let peak = (beg..i)
            .fold(beg, |best, j| if cleaned[j] > cleaned[best] { j } else { best });
        if !is_local_max(peak) {
            continue;
        }
        if peak - peaks.last().copied().unwrap_or(0) > min_delay {
            peaks.push(peak);
        }
    }
    peaks
}

/// Inter-beat intervals in milliseconds from peak indices.
pub fn intervals_ms(peaks: &[usize], sampling_rate: f64) -> Vec<f64> {
    peaks
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 / sampling_rate * 1000.0)
        .collect()
}

fn samples(secs: f64, sampling_rate: f64) -> usize {
    ((secs * sampling_rate).round() as usize).max(1)
}

/// Centred boxcar average; the window shrinks at the edges.
fn moving_average(x: &[f64], k: usize) -> Vec<f64> {
    let n = x.len();
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    for &v in x {
        prefix.push(prefix.last().copied().unwrap_or(0.0) + v);
    }
    let half_l = (k - 1) / 2;
    let half_r = k / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half_l);
            let hi = (i + half_r + 1).min(n);
            (prefix[hi] - prefix[lo]) / (hi - lo) as f64
        })
        .collect()
}
