//! Nearest-timestamp left join of two 1 Hz tables.
//!
//! Every left row is kept and receives the right row closest in time:
//!
//! ```text
//! prev = last right row with t_r ≤ t_l
//! next = first right row with t_r > t_l
//! pick = prev if |t_l − prev| ≤ |next − t_l| else next
//! ```
//!
//! so an exact tie resolves to the earlier right row.  Right rows that are
//! never picked are dropped.  An empty right table leaves every right cell
//! `None`.
//!
//! Without a tolerance there is no distance limit: a right table that lies
//! entirely before or after the left one fills every left row from its
//! closest edge row.  [`merge_nearest_within`] turns matches farther than the
//! tolerance into `None`.
use anyhow::{bail, Result};
use chrono::TimeDelta;
use ndarray::Array2;

use crate::series::{Instant, TimeSeries};

/// Join `right` onto `left` by nearest timestamp.  Columns are left's, then right's.
pub fn merge_nearest(left: &TimeSeries, right: &TimeSeries) -> Result<TimeSeries> {
    merge_nearest_within(left, right, None)
}

/// [`merge_nearest`], leaving right cells `None` where the nearest right row
/// is more than `tolerance` away.
pub fn merge_nearest_within(
    left: &TimeSeries,
    right: &TimeSeries,
    tolerance: Option<TimeDelta>,
) -> Result<TimeSeries> {
    if let Some(dup) = left.columns.iter().find(|c| right.columns.contains(c)) {
        bail!("column {dup:?} appears on both sides of the merge");
    }

    let mut left = left.clone();
    left.sort_by_index();
    let mut right = right.clone();
    right.sort_by_index();

    let matches: Vec<Option<usize>> = nearest_rows(&left.index, &right.index)
        .into_iter()
        .zip(&left.index)
        .map(|(m, &t)| {
            m.filter(|&m| match tolerance {
                Some(tol) => right.index[m] - t <= tol && t - right.index[m] <= tol,
                None => true,
            })
        })
        .collect();
    let (n_left, n_right) = (left.columns.len(), right.columns.len());
    let values = Array2::from_shape_fn((left.len(), n_left + n_right), |(r, c)| {
        if c < n_left {
            left.values[[r, c]]
        } else {
            matches[r].and_then(|m| right.values[[m, c - n_left]])
        }
    });

    let mut columns = left.columns;
    columns.extend(right.columns);
    TimeSeries::new(left.index, columns, values)
}

/// For each sorted `left` instant, the position of the nearest sorted `right` instant.
pub fn nearest_rows(left: &[Instant], right: &[Instant]) -> Vec<Option<usize>> {
    let mut j = 0;
    left.iter()
        .map(|&t| {
            if right.is_empty() {
                return None;
            }
            while j + 1 < right.len() && right[j + 1] <= t {
                j += 1;
            }
            if right[j] > t {
                // Every right row is later.
                return Some(j);
            }
            match right.get(j + 1) {
                Some(&next) if (next - t) < (t - right[j]) => Some(j + 1),
                _ => Some(j),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::epoch_to_instant;
    use chrono::FixedOffset;

    fn t(s: f64) -> Instant {
        epoch_to_instant(s, FixedOffset::east_opt(7 * 3600).unwrap()).unwrap()
    }

    #[test]
    fn nearest_picks_closest() {
        let left = [t(0.0), t(4.0), t(10.0), t(20.0)];
        let right = [t(1.0), t(5.0), t(9.0)];
        assert_eq!(nearest_rows(&left, &right), vec![Some(0), Some(1), Some(2), Some(2)]);
    }

    #[test]
    fn tie_goes_to_earlier_row() {
        let left = [t(5.0)];
        let right = [t(4.0), t(6.0)];
        assert_eq!(nearest_rows(&left, &right), vec![Some(0)]);
    }

    #[test]
    fn empty_right() {
        assert_eq!(nearest_rows(&[t(0.0), t(1.0)], &[]), vec![None, None]);
    }

    #[test]
    fn tolerance_drops_distant_matches() {
        let left = TimeSeries::from_columns(
            vec![t(0.0), t(5.0), t(100.0)],
            vec![("l".into(), vec![0.0, 5.0, 100.0])],
        )
        .unwrap();
        let right =
            TimeSeries::from_columns(vec![t(1.0), t(2.0)], vec![("r".into(), vec![1.0, 2.0])]).unwrap();
        let tol = TimeDelta::try_seconds(1);

        let m = merge_nearest_within(&left, &right, tol).unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(m.column("r").unwrap().to_vec(), vec![Some(1.0), None, None]);

        let unlimited = merge_nearest_within(&left, &right, None).unwrap();
        assert_eq!(unlimited.column("r").unwrap().to_vec(), vec![Some(1.0), Some(2.0), Some(2.0)]);
    }

    #[test]
    fn duplicate_columns_rejected() {
        let a = TimeSeries::from_columns(vec![t(0.0)], vec![("x".into(), vec![1.0])]).unwrap();
        assert!(merge_nearest(&a, &a).is_err());
    }

    #[test]
    fn unsorted_inputs_are_sorted() {
        let left = TimeSeries::from_columns(
            vec![t(2.0), t(0.0)],
            vec![("l".into(), vec![2.0, 0.0])],
        )
        .unwrap();
        let right = TimeSeries::from_columns(
            vec![t(2.0), t(0.0)],
            vec![("r".into(), vec![20.0, 0.0])],
        )
        .unwrap();
        let m = merge_nearest(&left, &right).unwrap();
        assert_eq!(m.index, vec![t(0.0), t(2.0)]);
        assert_eq!(m.column("r").unwrap().to_vec(), vec![Some(0.0), Some(20.0)]);
    }
}
