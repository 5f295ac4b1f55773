//! Time-domain HRV metrics.
//!
//! All inputs are NN intervals in milliseconds.  Standard deviations use
//! ddof = 1, MadNN is the median absolute deviation scaled by 1.4826, and
//! pNNx is the share of successive differences above x ms relative to the
//! number of intervals.
use super::{finite, mean, percentile, ratio, std_dev};

/// Histogram bin width for HTI: 1/128 s.
pub const HTI_BIN_MS: f64 = 1000.0 / 128.0;

pub const TIME_COLUMNS: [&str; 18] = [
    "HRV_MeanNN",
    "HRV_SDNN",
    "HRV_RMSSD",
    "HRV_SDSD",
    "HRV_CVNN",
    "HRV_CVSD",
    "HRV_MedianNN",
    "HRV_MadNN",
    "HRV_MCVNN",
    "HRV_IQRNN",
    "HRV_SDRMSSD",
    "HRV_Prc20NN",
    "HRV_Prc80NN",
    "HRV_pNN50",
    "HRV_pNN20",
    "HRV_MinNN",
    "HRV_MaxNN",
    "HRV_HTI",
];

/// Time-domain metrics, aligned with [`TIME_COLUMNS`].
pub fn hrv_time(rri: &[f64]) -> [Option<f64>; 18] {
    let diffs: Vec<f64> = rri.windows(2).map(|w| w[1] - w[0]).collect();

    let mean_nn = mean(rri);
    let sdnn = std_dev(rri);
    let rmssd = rmssd(&diffs);
    let sdsd = std_dev(&diffs);
    let median_nn = percentile(rri, 50.0);
    let mad_nn = median_nn.and_then(|m| {
        let dev: Vec<f64> = rri.iter().map(|v| (v - m).abs()).collect();
        percentile(&dev, 50.0).map(|d| 1.4826 * d)
    });
    let iqr_nn = match (percentile(rri, 75.0), percentile(rri, 25.0)) {
        (Some(q3), Some(q1)) => finite(q3 - q1),
        _ => None,
    };

    [
        mean_nn,
        sdnn,
        rmssd,
        sdsd,
        ratio(sdnn, mean_nn),
        ratio(rmssd, mean_nn),
        median_nn,
        mad_nn,
        ratio(mad_nn, median_nn),
        iqr_nn,
        ratio(sdnn, rmssd),
        percentile(rri, 20.0),
        percentile(rri, 80.0),
        pnn(&diffs, rri.len(), 50.0),
        pnn(&diffs, rri.len(), 20.0),
        rri.iter().copied().reduce(f64::min),
        rri.iter().copied().reduce(f64::max),
        hti(rri),
    ]
}

fn rmssd(diffs: &[f64]) -> Option<f64> {
    mean(&diffs.iter().map(|d| d * d).collect::<Vec<_>>()).map(f64::sqrt)
}

/// Percentage of successive differences larger than `threshold_ms`.
fn pnn(diffs: &[f64], n_intervals: usize, threshold_ms: f64) -> Option<f64> {
    if diffs.is_empty() {
        return None;
    }
    let n = diffs.iter().filter(|d| d.abs() > threshold_ms).count();
    finite(n as f64 / n_intervals as f64 * 100.0)
}

/// HRV triangular index: intervals / height of the tallest histogram bin.
fn hti(rri: &[f64]) -> Option<f64> {
    let min = rri.iter().copied().reduce(f64::min)?;
    let max = rri.iter().copied().reduce(f64::max)?;
    let n_bins = ((max - min) / HTI_BIN_MS).floor() as usize + 1;
    let mut counts = vec![0usize; n_bins];
    for v in rri {
        let b = (((v - min) / HTI_BIN_MS).floor() as usize).min(n_bins - 1);
        counts[b] += 1;
    }
    let tallest = counts.into_iter().max().unwrap_or(0);
    ratio(Some(rri.len() as f64), Some(tallest as f64))
}
