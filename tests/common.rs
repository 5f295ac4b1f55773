/// Shared helpers: synthetic recordings and raw CSV fixtures.
use chrono::FixedOffset;
use physio_combine::{Instant, RawRecording};
use std::path::Path;

/// 2023-11-14 22:13:20 UTC.
pub const T0: f64 = 1_700_000_000.0;

#[allow(unused)]
pub fn bangkok() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap()
}

#[allow(unused)]
/// `n` epoch-second timestamps at `fs` Hz starting at `start`.
pub fn timestamps(start: f64, n: usize, fs: f64) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 / fs).collect()
}

#[allow(unused)]
/// Gaussian pulse once per `period` seconds, peaking mid-period.
pub fn pulse_wave(n: usize, fs: f64, period: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let phase = (i as f64 / fs) % period / period;
            (-0.5 * ((phase - 0.5) / 0.08).powi(2)).exp()
        })
        .collect()
}

#[allow(unused)]
/// Slow drift plus Gaussian skin-conductance bumps centred at `bumps` seconds.
pub fn eda_wave(n: usize, fs: f64, bumps: &[f64]) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / fs;
            let responses: f64 = bumps
                .iter()
                .map(|&c| 0.5 * (-0.5 * ((t - c) / 1.0).powi(2)).exp())
                .sum();
            2.0 + 0.002 * t + responses
        })
        .collect()
}

#[allow(unused)]
pub fn recording(channel: &str, timestamps: Vec<f64>, values: Vec<f64>) -> RawRecording {
    RawRecording { channel: channel.to_string(), timestamps, values }
}

#[allow(unused)]
/// Write a raw export with `LocalTimestamp` and one measurement column.
pub fn write_raw_csv(path: &Path, channel: &str, timestamps: &[f64], values: &[f64]) {
    let mut w = csv::Writer::from_path(path).unwrap();
    w.write_record(["LocalTimestamp", channel]).unwrap();
    for (t, v) in timestamps.iter().zip(values) {
        w.write_record([t.to_string(), v.to_string()]).unwrap();
    }
    w.flush().unwrap();
}

#[allow(unused)]
/// Whole epoch seconds of an index.
pub fn seconds(index: &[Instant]) -> Vec<i64> {
    index.iter().map(|t| t.timestamp()).collect()
}
