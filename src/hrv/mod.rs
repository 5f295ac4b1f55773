//! Heart-rate-variability metrics from inter-beat intervals.
//!
//! - [`time`]: statistical measures of the NN series (MeanNN, SDNN, RMSSD, …).
//! - [`frequency`]: band powers of the interpolated tachogram (VLF, LF, HF, …).
//! - [`nonlinear`]: Poincaré descriptors and entropies (SD1, SD2, SampEn, …).
//!
//! Every metric is `Option<f64>`: `None` when the window holds too few beats
//! for that metric, or when the result is not finite (0/0 on perfectly
//! regular beats, log of zero power).  A window with no beats yields a record
//! where every metric is `None`; it is still a record.

pub mod frequency;
pub mod nonlinear;
pub mod time;

use crate::ppg::intervals_ms;

/// Column holding the mean NN interval, in ms.
pub const MEAN_NN: &str = "HRV_MeanNN";

/// Column holding the heart rate derived from [`MEAN_NN`], in beats/min.
pub const HR: &str = "HR";

/// HRV metrics of one window, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct HrvRecord {
    pub metrics: Vec<(&'static str, Option<f64>)>,
}

impl HrvRecord {
    /// Value of a metric by column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.iter().find(|(n, _)| *n == name).and_then(|&(_, v)| v)
    }

    /// Values only, aligned with [`column_names`].
    pub fn values(&self) -> Vec<Option<f64>> {
        self.metrics.iter().map(|&(_, v)| v).collect()
    }
}

/// Names of every metric produced by [`hrv_from_intervals`], in order.
pub fn column_names() -> Vec<&'static str> {
    time::TIME_COLUMNS
        .iter()
        .chain(frequency::FREQUENCY_COLUMNS.iter())
        .chain(nonlinear::NONLINEAR_COLUMNS.iter())
        .copied()
        .collect()
}

/// Full metric set from peak sample indices.
pub fn hrv_from_peaks(peaks: &[usize], sampling_rate: f64) -> HrvRecord {
    hrv_from_intervals(&intervals_ms(peaks, sampling_rate))
}

/// Full metric set from NN intervals in milliseconds.
pub fn hrv_from_intervals(rri: &[f64]) -> HrvRecord {
    let values = time::hrv_time(rri)
        .into_iter()
        .chain(frequency::hrv_frequency(rri))
        .chain(nonlinear::hrv_nonlinear(rri));
    HrvRecord { metrics: column_names().into_iter().zip(values).collect() }
}

/// Heart rate in beats/min from a mean NN interval in ms: `60 / (MeanNN / 1000)`.
///
/// `None` when the interval is undefined or zero.
///
/// ```
/// use physio_combine::hrv::heart_rate;
/// assert_eq!(heart_rate(Some(800.0)), Some(75.0));
/// assert_eq!(heart_rate(Some(0.0)), None);
/// assert_eq!(heart_rate(None), None);
/// ```
pub fn heart_rate(mean_nn_ms: Option<f64>) -> Option<f64> {
    ratio(Some(60.0), mean_nn_ms.map(|ms| ms / 1000.0))
}

// ── Shared statistics ─────────────────────────────────────────────────────────

pub(crate) fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// `a / b`, undefined for a zero or missing denominator.
pub(crate) fn ratio(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) if b != 0.0 => finite(a / b),
        _ => None,
    }
}

pub(crate) fn mean(x: &[f64]) -> Option<f64> {
    if x.is_empty() {
        return None;
    }
    finite(x.iter().sum::<f64>() / x.len() as f64)
}

/// Sample standard deviation (ddof = 1).
pub(crate) fn std_dev(x: &[f64]) -> Option<f64> {
    if x.len() < 2 {
        return None;
    }
    let m = mean(x)?;
    let ss: f64 = x.iter().map(|v| (v - m).powi(2)).sum();
    finite((ss / (x.len() - 1) as f64).sqrt())
}

/// Percentile with linear interpolation between order statistics (numpy default).
pub(crate) fn percentile(x: &[f64], p: f64) -> Option<f64> {
    if x.is_empty() {
        return None;
    }
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    finite(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
