//! Sliding-window HRV extraction over a PPG recording.
//!
//! Windows of `window_samples` samples slide with a stride of one sample:
//!
//! ```text
//! start ∈ 0 .. len − window_samples      (exclusive upper bound)
//! count = max(0, len − window_samples)
//! ```
//!
//! Each window is processed independently: the chunk is re-cleaned, beats
//! are detected and the full HRV metric set is computed, then the row is
//! labelled with the instant of the window's *first* sample.  Overlapping
//! windows are recomputed from scratch; there is no incremental beat
//! tracking.  The irregular per-window table is then averaged into 1 s
//! buckets and a heart-rate column is derived from `HRV_MeanNN`.
use anyhow::{bail, Result};
use ndarray::Array2;
use std::ops::Range;

use crate::hrv::{self, HR, MEAN_NN};
use crate::io::RawRecording;
use crate::ppg;
use crate::resample::resample_1hz;
use crate::series::{Instant, TimeSeries};
use crate::time::{to_instants, TargetZone};

/// Start indices of every window over a signal of `len` samples.
pub fn window_starts(len: usize, window_samples: usize) -> Range<usize> {
    0..len.saturating_sub(window_samples)
}

/// `(start, chunk)` for every window, in order.
pub fn sliding_windows(
    signal: &[f64],
    window_samples: usize,
) -> impl Iterator<Item = (usize, &[f64])> + '_ {
    window_starts(signal.len(), window_samples).map(move |s| (s, &signal[s..s + window_samples]))
}

/// One HRV row per window of an already cleaned PPG signal.
///
/// `instants[i]` is the timestamp of sample `i`; row `k` of the result is
/// labelled `instants[k]`.
pub fn hrv_windows(
    cleaned: &[f64],
    instants: &[Instant],
    window_samples: usize,
    sampling_rate: f64,
) -> Result<TimeSeries> {
    if cleaned.len() != instants.len() {
        bail!("{} samples but {} timestamps", cleaned.len(), instants.len());
    }
    if window_samples == 0 {
        bail!("window must hold at least one sample");
    }
    let columns: Vec<String> = hrv::column_names().into_iter().map(String::from).collect();
    let n_windows = window_starts(cleaned.len(), window_samples).len();
    let mut values = Array2::from_elem((n_windows, columns.len()), None);

    for (start, chunk) in sliding_windows(cleaned, window_samples) {
        log::trace!(
            "window {:.2}s – {:.2}s",
            start as f64 / sampling_rate,
            (start + window_samples) as f64 / sampling_rate
        );
        let chunk = ppg::clean(chunk, sampling_rate)?;
        let peaks = ppg::find_peaks(&chunk, sampling_rate);
        let record = hrv::hrv_from_peaks(&peaks, sampling_rate);
        for (c, v) in record.values().into_iter().enumerate() {
            values[[start, c]] = v;
        }
    }

    TimeSeries::new(instants[..n_windows].to_vec(), columns, values)
}

/// Full HRV path for one PPG recording: clean, window, resample, derive HR.
pub fn extract_hrv_features(
    recording: &RawRecording,
    window_samples: usize,
    sampling_rate: f64,
    zone: impl Into<TargetZone>,
) -> Result<TimeSeries> {
    if ppg::CLEAN_HIGH_HZ >= sampling_rate / 2.0 {
        log::warn!(
            "PPG lowpass at {} Hz is at or above Nyquist for {sampling_rate} Hz, highpass only",
            ppg::CLEAN_HIGH_HZ
        );
    }
    let instants = to_instants(&recording.timestamps, zone)?;
    let cleaned = ppg::clean(&recording.values, sampling_rate)?;

    let per_window = hrv_windows(&cleaned, &instants, window_samples, sampling_rate)?;
    log::debug!(
        "{} samples → {} HRV windows of {} samples",
        cleaned.len(),
        per_window.len(),
        window_samples
    );

    let mut series = resample_1hz(&per_window)?;
    add_heart_rate(&mut series)?;
    Ok(series)
}

/// Append `HR = 60 / (HRV_MeanNN / 1000)` to a table holding `HRV_MeanNN`.
pub fn add_heart_rate(series: &mut TimeSeries) -> Result<()> {
    let Some(mean_nn) = series.column(MEAN_NN) else {
        bail!("table has no {MEAN_NN} column");
    };
    let hr: Vec<Option<f64>> = mean_nn.iter().map(|&v| hrv::heart_rate(v)).collect();
    series.push_column(HR, hr)
}
