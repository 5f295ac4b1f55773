//! Electrodermal activity: cleaning, tonic/phasic decomposition, SCR peaks.
//!
//! ```text
//! clean  = lowpass(raw, 3 Hz)
//! phasic = highpass(clean, 0.05 Hz)
//! tonic  = clean − phasic
//! ```
//!
//! Both filters are zero-phase FIR, so `tonic + phasic` reproduces the clean
//! signal exactly.  Skin-conductance responses are the local maxima of the
//! phasic component, measured from the preceding trough.
use anyhow::Result;

use crate::filter::{design_highpass, design_lowpass, filter_zero_phase};
use crate::io::RawRecording;
use crate::resample::resample_1hz;
use crate::series::TimeSeries;
use crate::time::{to_instants, TargetZone};

/// Cleaning lowpass edge in Hz.
pub const CLEAN_HIGH_HZ: f64 = 3.0;
/// Tonic/phasic split frequency in Hz.
pub const PHASIC_LOW_HZ: f64 = 0.05;

pub const EDA: &str = "EDA";
pub const EDA_TONIC: &str = "EDA_Tonic";
pub const EDA_PHASIC: &str = "EDA_Phasic";

/// One skin-conductance response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrPeak {
    /// Sample index of the trough the response rises from.
    pub onset: usize,
    /// Sample index of the response maximum.
    pub peak: usize,
    /// `phasic[peak] − phasic[onset]`.
    pub amplitude: f64,
}

/// Tonic and phasic parts of a cleaned EDA signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub tonic: Vec<f64>,
    pub phasic: Vec<f64>,
}

/// Output of [`extract_eda_features`].
#[derive(Debug, Clone)]
pub struct EdaFeatures {
    /// 1 Hz table with columns [`EDA`], [`EDA_TONIC`], [`EDA_PHASIC`].
    pub series: TimeSeries,
    /// Responses found in the full-rate phasic signal.
    pub scr: Vec<ScrPeak>,
}

/// Lowpass a raw EDA signal.  Returned unchanged when the edge is at or
/// above Nyquist.
pub fn clean(signal: &[f64], sampling_rate: f64) -> Result<Vec<f64>> {
    if CLEAN_HIGH_HZ >= sampling_rate / 2.0 {
        return Ok(signal.to_vec());
    }
    filter_zero_phase(signal, &design_lowpass(CLEAN_HIGH_HZ, sampling_rate)?)
}

/// Split a cleaned signal into slow baseline and fast responses.
pub fn decompose(cleaned: &[f64], sampling_rate: f64) -> Result<Decomposition> {
    let phasic = filter_zero_phase(cleaned, &design_highpass(PHASIC_LOW_HZ, sampling_rate)?)?;
    let tonic = cleaned.iter().zip(&phasic).map(|(c, p)| c - p).collect();
    Ok(Decomposition { tonic, phasic })
}

/// Skin-conductance responses in a phasic signal.
///
/// A response is a local maximum paired with the closest preceding local
/// minimum.  Responses smaller than `min_amplitude` times the largest
/// response are discarded.
pub fn detect_scr(phasic: &[f64], min_amplitude: f64) -> Vec<ScrPeak> {
    let n = phasic.len();
    if n < 3 {
        return vec![];
    }
    let mut candidates = Vec::new();
    for i in 1..n - 1 {
        if !(phasic[i] > phasic[i - 1] && phasic[i] >= phasic[i + 1]) {
            continue;
        }
        let mut onset = i;
        while onset > 0 && phasic[onset - 1] <= phasic[onset] {
            onset -= 1;
        }
        let amplitude = phasic[i] - phasic[onset];
        if amplitude > 0.0 {
            candidates.push(ScrPeak { onset, peak: i, amplitude });
        }
    }

    let largest = candidates.iter().map(|p| p.amplitude).fold(0.0_f64, f64::max);
    let threshold = min_amplitude * largest;
    candidates.retain(|p| p.amplitude >= threshold);
    candidates
}

/// Full EDA path for one recording: clean, decompose, detect SCRs, resample.
pub fn extract_eda_features(
    recording: &RawRecording,
    sampling_rate: f64,
    scr_min_amplitude: f64,
    zone: impl Into<TargetZone>,
) -> Result<EdaFeatures> {
    if CLEAN_HIGH_HZ >= sampling_rate / 2.0 {
        log::warn!(
            "EDA lowpass at {CLEAN_HIGH_HZ} Hz is at or above Nyquist for {sampling_rate} Hz, signal left unfiltered"
        );
    }
    let instants = to_instants(&recording.timestamps, zone)?;
    let cleaned = clean(&recording.values, sampling_rate)?;
    let Decomposition { tonic, phasic } = decompose(&cleaned, sampling_rate)?;
    let scr = detect_scr(&phasic, scr_min_amplitude);
    log::debug!("{} EDA samples, {} SCR peaks", cleaned.len(), scr.len());

    let full_rate = TimeSeries::from_columns(
        instants,
        vec![
            (EDA.to_string(), cleaned),
            (EDA_TONIC.to_string(), tonic),
            (EDA_PHASIC.to_string(), phasic),
        ],
    )?;
    Ok(EdaFeatures { series: resample_1hz(&full_rate)?, scr })
}
