//! Epoch seconds → timezone-aware instants.
//!
//! Raw recordings store `f64` seconds since the Unix epoch (UTC).  Every
//! downstream timestamp is a `DateTime<FixedOffset>` on the configured
//! [`TargetZone`], so 1 Hz buckets and the merged output all share one wall
//! clock.  A named IANA zone is resolved per instant, so DST changes show up
//! as a change of offset.
use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

/// Wall clock the pipeline reports in: a fixed `±HH:MM` offset or an IANA zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetZone {
    Fixed(FixedOffset),
    Named(Tz),
}

impl TargetZone {
    /// Express a UTC instant on this wall clock.
    pub fn localize(&self, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            TargetZone::Fixed(offset) => utc.with_timezone(offset),
            TargetZone::Named(tz) => utc.with_timezone(tz).fixed_offset(),
        }
    }
}

impl From<FixedOffset> for TargetZone {
    fn from(offset: FixedOffset) -> Self {
        TargetZone::Fixed(offset)
    }
}

impl From<Tz> for TargetZone {
    fn from(tz: Tz) -> Self {
        TargetZone::Named(tz)
    }
}

impl FromStr for TargetZone {
    type Err = anyhow::Error;

    /// `"+07:00"` parses as a fixed offset, `"Asia/Bangkok"` as a named zone.
    fn from_str(s: &str) -> Result<Self> {
        if let Ok(offset) = s.parse::<FixedOffset>() {
            return Ok(TargetZone::Fixed(offset));
        }
        s.parse::<Tz>()
            .map(TargetZone::Named)
            .map_err(|e| anyhow!("invalid timezone {s:?}: not a ±HH:MM offset or IANA name ({e})"))
    }
}

impl fmt::Display for TargetZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetZone::Fixed(offset) => write!(f, "{offset}"),
            TargetZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

/// Convert one epoch-seconds value to an instant on `zone`.
///
/// Sub-second precision is kept to the nanosecond.
pub fn epoch_to_instant(secs: f64, zone: impl Into<TargetZone>) -> Result<DateTime<FixedOffset>> {
    if !secs.is_finite() {
        bail!("timestamp {secs} is not finite");
    }
    let whole = secs.floor();
    let mut nanos = ((secs - whole) * 1e9).round() as u32;
    let mut whole = whole as i64;
    if nanos >= 1_000_000_000 {
        whole += 1;
        nanos -= 1_000_000_000;
    }
    match Utc.timestamp_opt(whole, nanos).single() {
        Some(utc) => Ok(zone.into().localize(utc)),
        None => bail!("timestamp {secs} is out of range"),
    }
}

/// Convert a whole timestamp column.
pub fn to_instants(secs: &[f64], zone: impl Into<TargetZone>) -> Result<Vec<DateTime<FixedOffset>>> {
    let zone = zone.into();
    secs.iter().map(|&s| epoch_to_instant(s, zone)).collect()
}
