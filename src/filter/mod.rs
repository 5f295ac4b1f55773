//! FIR filter design and application.
//!
//! - [`design`]: Hamming-windowed sinc lowpass/highpass design with MNE's
//!   automatic transition bandwidth and length rules.
//! - [`apply`]: Overlap-add zero-phase convolution.
//!
//! [`bandpass`] chains the two for the common "keep `l_freq..h_freq`" case.

pub mod apply;
pub mod design;

use anyhow::Result;

pub use apply::filter_zero_phase;
pub use design::{
    auto_filter_length, design_highpass, design_lowpass, firwin, hamming,
    highpass_trans_bandwidth, lowpass_trans_bandwidth,
};

/// Zero-phase bandpass as highpass at `l_freq` followed by lowpass at `h_freq`.
///
/// Either edge may be `None` to skip that leg.  A lowpass edge at or above
/// Nyquist is skipped, since the signal holds nothing above it.
pub fn bandpass(x: &[f64], sfreq: f64, l_freq: Option<f64>, h_freq: Option<f64>) -> Result<Vec<f64>> {
    let mut y = x.to_vec();
    if let Some(l) = l_freq {
        y = filter_zero_phase(&y, &design_highpass(l, sfreq)?)?;
    }
    if let Some(h) = h_freq {
        if h >= sfreq / 2.0 {
            log::debug!("lowpass edge {h} Hz is at or above Nyquist for {sfreq} Hz, skipping");
        } else {
            y = filter_zero_phase(&y, &design_lowpass(h, sfreq)?)?;
        }
    }
    Ok(y)
}
