//! Frequency-domain HRV metrics.
//!
//! Algorithm:
//!   1. Place each NN interval at its beat time (cumulative sum of intervals).
//!   2. Linearly interpolate the tachogram onto a 4 Hz grid, remove the mean.
//!   3. Welch PSD: Hann segments of at most 1024 samples, 50 % overlap,
//!      per-segment mean removal, one-sided density scaling.
//!   4. Band power = Σ PSD · Δf over the bins inside each band.
//!
//! A band with no PSD bin inside it (recording too short to resolve it) is
//! undefined.  Powers are in ms².
use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;

use super::{finite, ratio};

/// Tachogram interpolation rate in Hz.
pub const INTERPOLATION_RATE: f64 = 4.0;

const MAX_SEGMENT: usize = 1024;

/// `[lo, hi)` edges in Hz of VLF, LF, HF, VHF.
pub const BANDS: [(f64, f64); 4] = [(0.0033, 0.04), (0.04, 0.15), (0.15, 0.4), (0.4, 0.5)];

pub const FREQUENCY_COLUMNS: [&str; 9] = [
    "HRV_VLF",
    "HRV_LF",
    "HRV_HF",
    "HRV_VHF",
    "HRV_TP",
    "HRV_LFHF",
    "HRV_LFn",
    "HRV_HFn",
    "HRV_LnHF",
];

/// Frequency-domain metrics, aligned with [`FREQUENCY_COLUMNS`].
pub fn hrv_frequency(rri: &[f64]) -> [Option<f64>; 9] {
    let Some((freqs, psd)) = tachogram(rri).and_then(|x| welch(&x, INTERPOLATION_RATE)) else {
        return [None; 9];
    };
    let df = freqs.get(1).copied().unwrap_or(0.0);

    let [vlf, lf, hf, vhf] = BANDS.map(|(lo, hi)| {
        let mut bins = freqs.iter().zip(&psd).filter(|&(&f, _)| f >= lo && f < hi).peekable();
        bins.peek()?;
        finite(bins.map(|(_, p)| p * df).sum())
    });
    let tp = [vlf, lf, hf, vhf]
        .into_iter()
        .flatten()
        .reduce(|a, b| a + b);

    [
        vlf,
        lf,
        hf,
        vhf,
        tp,
        ratio(lf, hf),
        ratio(lf, tp),
        ratio(hf, tp),
        hf.filter(|&p| p > 0.0).and_then(|p| finite(p.ln())),
    ]
}

/// Mean-removed tachogram sampled at [`INTERPOLATION_RATE`].
fn tachogram(rri: &[f64]) -> Option<Vec<f64>> {
    if rri.len() < 3 {
        return None;
    }
    let mut t = Vec::with_capacity(rri.len());
    let mut acc = 0.0;
    for &r in rri {
        acc += r / 1000.0;
        t.push(acc);
    }
    let duration = t[t.len() - 1] - t[0];
    let n = (duration * INTERPOLATION_RATE).floor() as usize + 1;
    if n < 4 {
        return None;
    }

    let mut seg = 0;
    let mut out: Vec<f64> = (0..n)
        .map(|k| {
            let tk = t[0] + k as f64 / INTERPOLATION_RATE;
            while seg + 2 < t.len() && t[seg + 1] < tk {
                seg += 1;
            }
            let (t0, t1) = (t[seg], t[seg + 1]);
            let w = if t1 > t0 { ((tk - t0) / (t1 - t0)).clamp(0.0, 1.0) } else { 0.0 };
            rri[seg] + (rri[seg + 1] - rri[seg]) * w
        })
        .collect();

    let m = out.iter().sum::<f64>() / n as f64;
    out.iter_mut().for_each(|v| *v -= m);
    Some(out)
}

/// One-sided Welch density estimate.  Returns `(frequencies, psd)`.
fn welch(x: &[f64], fs: f64) -> Option<(Vec<f64>, Vec<f64>)> {
    let nperseg = x.len().min(MAX_SEGMENT);
    if nperseg < 4 {
        return None;
    }
    let step = (nperseg / 2).max(1);
    let window: Vec<f64> = (0..nperseg)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / nperseg as f64).cos())
        .collect();
    let win_power: f64 = window.iter().map(|w| w * w).sum();

    let mut planner: FftPlanner<f64> = FftPlanner::new();
    let fft = planner.plan_fft_forward(nperseg);

    let n_freqs = nperseg / 2 + 1;
    let mut psd = vec![0.0_f64; n_freqs];
    let mut n_segments = 0usize;
    let mut start = 0;
    while start + nperseg <= x.len() {
        let seg = &x[start..start + nperseg];
        let seg_mean = seg.iter().sum::<f64>() / nperseg as f64;
        let mut buf: Vec<Complex<f64>> = seg
            .iter()
            .zip(&window)
            .map(|(&v, &w)| Complex { re: (v - seg_mean) * w, im: 0.0 })
            .collect();
        fft.process(&mut buf);
        for (p, c) in psd.iter_mut().zip(&buf) {
            *p += c.norm_sqr();
        }
        n_segments += 1;
        start += step;
    }

    let scale = 1.0 / (fs * win_power * n_segments as f64);
    for (k, p) in psd.iter_mut().enumerate() {
        *p *= scale;
        let nyquist = nperseg % 2 == 0 && k == nperseg / 2;
        if k != 0 && !nyquist {
            *p *= 2.0;
        }
    }
    let freqs = (0..n_freqs).map(|k| k as f64 * fs / nperseg as f64).collect();
    Some((freqs, psd))
}
