//! # physio-combine: EDA + PPG/HRV features on one 1 Hz grid
//!
//! `physio-combine` turns two raw wearable exports per subject, an
//! electrodermal-activity (EDA) file and a photoplethysmogram (PPG) file,
//! into a single CSV with one row per second: HRV metrics from a sliding
//! window over the pulse wave, a derived heart rate, and the EDA signal
//! split into tonic and phasic parts.
//!
//! ## Pipeline overview
//!
//! ```text
//! S{nn}_eda.csv                         s{nn}_pg.csv
//!   │                                     │
//!   ├─ io::load_recording()               ├─ io::load_recording()
//!   ├─ eda::clean()       3 Hz lowpass    ├─ ppg::clean()        0.5–8 Hz bandpass
//!   ├─ eda::decompose()   tonic/phasic    ├─ window::hrv_windows()
//!   ├─ eda::detect_scr()  SCR peaks       │     stride 1 sample, per window:
//!   │                                     │     clean → find_peaks → hrv
//!   └─ resample_1hz()     bucket mean     ├─ resample_1hz()      bucket mean
//!        │                                └─ HR = 60 / (MeanNN / 1000)
//!        │                                     │
//!        └──────────── merge_nearest() ◄───────┘   (HRV rows drive)
//!                            │
//!                            └─→ S{nn}_combined.csv
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use physio_combine::{run_batch, PipelineConfig};
//!
//! let cfg = PipelineConfig { last_subject: 3, ..PipelineConfig::default() };
//! cfg.validate().unwrap();
//! let report = run_batch(&cfg);
//! println!("{} subjects written", report.processed.len());
//! ```
//!
//! ## Running individual steps
//!
//! ```no_run
//! use physio_combine::{ppg, hrv};
//!
//! let pulse: Vec<f64> = vec![0.0; 6000]; // 60 s at 100 Hz
//! let cleaned = ppg::clean(&pulse, 100.0).unwrap();
//! let peaks = ppg::find_peaks(&cleaned, 100.0);
//! let record = hrv::hrv_from_peaks(&peaks, 100.0);
//! println!("MeanNN = {:?}", record.get(hrv::MEAN_NN));
//! ```

pub mod config;
pub mod eda;
pub mod filter;
pub mod hrv;
pub mod io;
pub mod merge;
pub mod ppg;
pub mod resample;
pub mod series;
pub mod subject;
pub mod time;
pub mod window;

use anyhow::Result;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::PipelineConfig;

// data
pub use io::{load_recording, write_combined_csv, ChannelColumns, RawRecording};
pub use series::{Instant, TimeSeries};
pub use time::TargetZone;

// stages
pub use eda::{extract_eda_features, EdaFeatures, ScrPeak};
pub use merge::{merge_nearest, merge_nearest_within};
pub use resample::resample_1hz;
pub use window::extract_hrv_features;

// driver
pub use subject::{process_subject, run_batch, BatchReport, SubjectOutcome};

/// Combine one subject's EDA and PPG recordings into the 1 Hz table.
///
/// # Pipeline steps
///
/// 1. EDA: clean, decompose, detect SCRs, resample to 1 Hz.
/// 2. PPG: clean, sliding-window HRV, resample to 1 Hz, derive `HR`.
/// 3. Nearest-timestamp merge with the HRV table as the left side, limited
///    to `merge_tolerance_secs` when set.
///
/// Columns of the result are every `HRV_*` metric, `HR`, then `EDA`,
/// `EDA_Tonic`, `EDA_Phasic`.  There is one row per HRV bucket; a PPG
/// recording shorter than one window gives an empty table.
///
/// # Errors
///
/// Invalid window length, timezone or merge tolerance in `cfg`, or a filter
/// that cannot be designed for the configured sampling rates.
pub fn combine(eda: &RawRecording, ppg: &RawRecording, cfg: &PipelineConfig) -> Result<TimeSeries> {
    let zone = cfg.target_zone()?;
    let window_samples = cfg.window_samples()?;
    let tolerance = cfg.merge_tolerance()?;

    let eda_features =
        extract_eda_features(eda, cfg.eda_sampling_rate, cfg.scr_min_amplitude, zone)?;
    let hrv = extract_hrv_features(ppg, window_samples, cfg.ppg_sampling_rate, zone)?;
    log::debug!(
        "{} HRV buckets, {} EDA buckets, {} SCR peaks",
        hrv.len(),
        eda_features.series.len(),
        eda_features.scr.len()
    );

    merge_nearest_within(&hrv, &eda_features.series, tolerance)
}
