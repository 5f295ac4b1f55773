//! Bucket-mean resampler onto a uniform 1 s grid.
//!
//! Algorithm (pandas `resample("1s").mean()` semantics):
//!   1. Bucket key = whole epoch second of each row (`floor`).
//!   2. Output index = every second from the first to the last key, inclusive,
//!      so the grid has no gaps even where no row landed.
//!   3. Each cell = arithmetic mean of the *defined* source values in that
//!      bucket; a bucket with no defined values stays `None`.
//!
//! Each bucket keeps the UTC offset of the rows that landed in it, carried
//! forward across empty buckets, so a DST change in a named zone survives
//! resampling.  Local wall-clock seconds and UTC seconds coincide for
//! whole-minute offsets.
use anyhow::{bail, Result};
use chrono::{FixedOffset, TimeZone};
use ndarray::Array2;

use crate::series::{Instant, TimeSeries};

/// Resample `series` to one row per whole second.
pub fn resample_1hz(series: &TimeSeries) -> Result<TimeSeries> {
    let n_cols = series.columns.len();
    let (first, last) = match (
        series.index.iter().map(|t| t.timestamp()).min(),
        series.index.iter().map(|t| t.timestamp()).max(),
    ) {
        (Some(a), Some(b)) => (a, b),
        _ => return Ok(TimeSeries::empty(series.columns.clone())),
    };
    let n_buckets = (last - first + 1) as usize;
    let mut sums = Array2::<f64>::zeros((n_buckets, n_cols));
    let mut counts = Array2::<u32>::zeros((n_buckets, n_cols));
    let mut offsets: Vec<Option<FixedOffset>> = vec![None; n_buckets];

    for (row, t) in series.values.rows().into_iter().zip(&series.index) {
        let b = (t.timestamp() - first) as usize;
        offsets[b].get_or_insert(t.timezone());
        for (c, v) in row.iter().enumerate() {
            if let Some(v) = v {
                sums[[b, c]] += v;
                counts[[b, c]] += 1;
            }
        }
    }

    let values = Array2::from_shape_fn((n_buckets, n_cols), |(b, c)| {
        let n = counts[[b, c]];
        (n > 0).then(|| sums[[b, c]] / n as f64)
    });
    let mut offset = series.index[0].timezone();
    let index = (0..n_buckets)
        .map(|k| {
            if let Some(o) = offsets[k] {
                offset = o;
            }
            bucket_instant(first + k as i64, offset)
        })
        .collect::<Result<Vec<_>>>()?;

    TimeSeries::new(index, series.columns.clone(), values)
}

fn bucket_instant(secs: i64, offset: FixedOffset) -> Result<Instant> {
    match offset.timestamp_opt(secs, 0).single() {
        Some(t) => Ok(t),
        None => bail!("bucket second {secs} is out of range"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::epoch_to_instant;

    fn t(s: f64) -> Instant {
        epoch_to_instant(s, FixedOffset::east_opt(7 * 3600).unwrap()).unwrap()
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let ts = TimeSeries::empty(vec!["x".into()]);
        let out = resample_1hz(&ts).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.columns, vec!["x"]);
    }

    #[test]
    fn mean_per_second() {
        let ts = TimeSeries::from_columns(
            vec![t(100.0), t(100.5), t(101.2)],
            vec![("x".into(), vec![1.0, 3.0, 10.0])],
        )
        .unwrap();
        let out = resample_1hz(&ts).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.values[[0, 0]], Some(2.0));
        assert_eq!(out.values[[1, 0]], Some(10.0));
        assert_eq!(out.index[0].timestamp(), 100);
    }

    #[test]
    fn gaps_are_kept_as_none() {
        let ts = TimeSeries::from_columns(
            vec![t(10.1), t(13.9)],
            vec![("x".into(), vec![1.0, 2.0])],
        )
        .unwrap();
        let out = resample_1hz(&ts).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out.values[[1, 0]], None);
        assert_eq!(out.values[[2, 0]], None);
        assert_eq!(out.values[[3, 0]], Some(2.0));
    }

    #[test]
    fn bucket_offsets_follow_their_rows() {
        let summer = FixedOffset::east_opt(2 * 3600).unwrap();
        let winter = FixedOffset::east_opt(3600).unwrap();
        let ts = TimeSeries::from_columns(
            vec![
                epoch_to_instant(10.0, summer).unwrap(),
                epoch_to_instant(11.0, winter).unwrap(),
                epoch_to_instant(13.0, winter).unwrap(),
            ],
            vec![("x".into(), vec![1.0, 2.0, 3.0])],
        )
        .unwrap();
        let out = resample_1hz(&ts).unwrap();
        let offsets: Vec<i32> = out.index.iter().map(|t| t.offset().local_minus_utc()).collect();
        assert_eq!(offsets, vec![7200, 3600, 3600, 3600]);
    }

    #[test]
    fn undefined_values_skipped_in_mean() {
        let mut ts = TimeSeries::from_columns(vec![t(5.0), t(5.5)], vec![("x".into(), vec![4.0, 0.0])]).unwrap();
        ts.values[[1, 0]] = None;
        let out = resample_1hz(&ts).unwrap();
        assert_eq!(out.values[[0, 0]], Some(4.0));
    }
}
