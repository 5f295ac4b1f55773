//! Pipeline configuration.
//!
//! [`PipelineConfig`] holds every tunable parameter for the EDA + HRV
//! combination pipeline.  Defaults describe the usual batch: Empatica-style
//! exports, Bangkok wall clock, subjects 1–25.
//!
//! The struct deserialises from JSON with every field optional, so a config
//! file only needs to list what it overrides:
//!
//! ```json
//! { "ppg_window_secs": 60.0, "last_subject": 3 }
//! ```
use anyhow::{bail, Context, Result};
use chrono::TimeDelta;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::time::TargetZone;

/// Configuration for the full per-subject pipeline.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use physio_combine::PipelineConfig;
///
/// let cfg = PipelineConfig {
///     ppg_window_secs: 60.0,   // 1-minute HRV windows instead of 5
///     last_subject:    3,
///     ..PipelineConfig::default()
/// };
/// assert_eq!(cfg.window_samples().unwrap(), 6000);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sampling rate of the EDA channel in Hz.
    ///
    /// Default: `15.0` Hz.
    pub eda_sampling_rate: f64,

    /// Minimum SCR amplitude, as a fraction of the largest response found in
    /// the recording.  Responses below it are discarded.
    ///
    /// Default: `0.01`.
    pub scr_min_amplitude: f64,

    /// Duration of each sliding HRV window in seconds.
    ///
    /// Together with [`ppg_sampling_rate`](Self::ppg_sampling_rate) this must
    /// give a whole number of samples; see [`window_samples`](Self::window_samples).
    ///
    /// At the defaults each window is **30 000 samples** (300 s × 100 Hz).
    ///
    /// Default: `300.0` s.
    pub ppg_window_secs: f64,

    /// Sampling rate of the PPG channel in Hz.
    ///
    /// Default: `100.0` Hz.
    pub ppg_sampling_rate: f64,

    /// Wall clock all timestamps are converted to: a `±HH:MM` offset or an
    /// IANA zone name such as `"Asia/Bangkok"`.
    ///
    /// Raw timestamps are epoch seconds (UTC).  Asia/Bangkok observes no DST,
    /// so the fixed offset default reproduces it exactly.
    ///
    /// Default: `"+07:00"`.
    pub timezone: String,

    /// Largest gap, in seconds, between an HRV row and the EDA row merged
    /// onto it.  Farther matches leave the EDA columns undefined.
    ///
    /// Default: `None`, every HRV row takes the nearest EDA row however far
    /// away it is, so EDA that does not overlap the PPG recording is filled
    /// from its first or last row.
    pub merge_tolerance_secs: Option<f64>,

    /// First subject id processed by the batch (inclusive).
    ///
    /// Default: `1`.
    pub first_subject: u32,

    /// Last subject id processed by the batch (inclusive).
    ///
    /// Default: `25`.
    pub last_subject: u32,

    /// Directory holding `S{nn}_eda.csv` files.
    pub eda_dir: PathBuf,

    /// Directory holding `s{nn}_pg.csv` files.
    pub ppg_dir: PathBuf,

    /// Directory receiving `S{nn}_combined.csv`.  Created when absent.
    pub output_dir: PathBuf,

    /// Name of the epoch-seconds column in both raw files.
    ///
    /// Default: `"LocalTimestamp"`.
    pub timestamp_column: String,

    /// Measurement column of the EDA file (channel A).
    ///
    /// Default: `"EA"`.
    pub eda_column: String,

    /// Measurement column of the PPG file (channel B).
    ///
    /// Default: `"PG"`.
    pub ppg_column: String,
}

impl Default for PipelineConfig {
    /// 15 Hz EDA · 100 Hz PPG · 300 s windows · UTC+07:00 · subjects 1–25.
    fn default() -> Self {
        Self {
            eda_sampling_rate: 15.0,
            scr_min_amplitude: 0.01,
            ppg_window_secs: 300.0,
            ppg_sampling_rate: 100.0,
            timezone: "+07:00".to_string(),
            merge_tolerance_secs: None,
            first_subject: 1,
            last_subject: 25,
            eda_dir: PathBuf::from("data/Raw/eda"),
            ppg_dir: PathBuf::from("data/Raw/ppg"),
            output_dir: PathBuf::from("data/Combined"),
            timestamp_column: "LocalTimestamp".to_string(),
            eda_column: "EA".to_string(),
            ppg_column: "PG".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file.  Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Number of samples per HRV window.
    ///
    /// `ppg_window_secs × ppg_sampling_rate` must be a positive whole number
    /// (within 1e-9); anything else is rejected rather than truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// use physio_combine::PipelineConfig;
    /// let cfg = PipelineConfig::default();
    /// assert_eq!(cfg.window_samples().unwrap(), 30_000);
    ///
    /// let odd = PipelineConfig { ppg_window_secs: 0.015, ..PipelineConfig::default() };
    /// assert!(odd.window_samples().is_err());
    /// ```
    pub fn window_samples(&self) -> Result<usize> {
        window_samples(self.ppg_window_secs, self.ppg_sampling_rate)
    }

    /// Parsed [`timezone`](Self::timezone).
    pub fn target_zone(&self) -> Result<TargetZone> {
        self.timezone.parse()
    }

    /// [`merge_tolerance_secs`](Self::merge_tolerance_secs) as a duration.
    pub fn merge_tolerance(&self) -> Result<Option<TimeDelta>> {
        let Some(secs) = self.merge_tolerance_secs else {
            return Ok(None);
        };
        if !secs.is_finite() || secs < 0.0 {
            bail!("merge_tolerance_secs must be a non-negative number, got {secs}");
        }
        match TimeDelta::try_milliseconds((secs * 1000.0).round() as i64) {
            Some(d) => Ok(Some(d)),
            None => bail!("merge_tolerance_secs {secs} is out of range"),
        }
    }

    /// Check every invariant up front so a batch never starts with a bad config.
    pub fn validate(&self) -> Result<()> {
        if !(self.eda_sampling_rate > 0.0) {
            bail!("eda_sampling_rate must be positive, got {}", self.eda_sampling_rate);
        }
        if !(self.ppg_sampling_rate > 0.0) {
            bail!("ppg_sampling_rate must be positive, got {}", self.ppg_sampling_rate);
        }
        if !(0.0..=1.0).contains(&self.scr_min_amplitude) {
            bail!("scr_min_amplitude must lie in [0, 1], got {}", self.scr_min_amplitude);
        }
        if self.first_subject > self.last_subject {
            bail!(
                "empty subject range {}..={}",
                self.first_subject,
                self.last_subject
            );
        }
        self.window_samples()?;
        self.target_zone()?;
        self.merge_tolerance()?;
        Ok(())
    }
}

/// `secs × rate` as an exact sample count.
pub fn window_samples(secs: f64, rate: f64) -> Result<usize> {
    let n = secs * rate;
    if !n.is_finite() || n < 1.0 {
        bail!("window of {secs} s at {rate} Hz holds no samples");
    }
    let rounded = n.round();
    if (n - rounded).abs() > 1e-9 * rounded.max(1.0) {
        bail!("window of {secs} s at {rate} Hz is {n} samples, not a whole number");
    }
    Ok(rounded as usize)
}
