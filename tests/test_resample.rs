mod common;
use common::{bangkok, seconds, timestamps, T0};
use physio_combine::time::to_instants;
use physio_combine::{resample_1hz, TimeSeries};

#[test]
fn index_is_contiguous_and_keeps_offset() {
    // 15 Hz for 100.5 s, starting 0.3 s into a second.
    let ts = timestamps(T0 + 0.3, 1508, 15.0);
    let x: Vec<f64> = (0..ts.len()).map(|i| i as f64).collect();
    let series = TimeSeries::from_columns(to_instants(&ts, bangkok()).unwrap(), vec![("x".into(), x)]).unwrap();

    let out = resample_1hz(&series).unwrap();
    let secs = seconds(&out.index);
    let first = T0 as i64;
    assert_eq!(secs, (first..=first + 100).collect::<Vec<_>>());
    assert!(out.index.iter().all(|t| t.offset().local_minus_utc() == 7 * 3600));
    assert!(out.values.iter().all(Option::is_some));
}

#[test]
fn columns_resample_independently() {
    let ts = to_instants(&[T0, T0 + 0.5, T0 + 1.0], bangkok()).unwrap();
    let mut series = TimeSeries::from_columns(
        ts,
        vec![("a".into(), vec![1.0, 2.0, 3.0]), ("b".into(), vec![10.0, 0.0, 30.0])],
    )
    .unwrap();
    series.values[[1, 1]] = None;
    series.values[[2, 0]] = None;

    let out = resample_1hz(&series).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out.column("a").unwrap().to_vec(), vec![Some(1.5), None]);
    assert_eq!(out.column("b").unwrap().to_vec(), vec![Some(10.0), Some(30.0)]);
}

#[test]
fn dense_rows_average_within_bucket() {
    // 10 rows per second, value = tenth of a second.
    let ts = timestamps(T0, 30, 10.0);
    let v: Vec<f64> = (0..30).map(|i| (i % 10) as f64).collect();
    let series = TimeSeries::from_columns(to_instants(&ts, bangkok()).unwrap(), vec![("v".into(), v)]).unwrap();
    let out = resample_1hz(&series).unwrap();
    assert_eq!(out.len(), 3);
    for row in out.values.rows() {
        approx::assert_abs_diff_eq!(row[0].unwrap(), 4.5, epsilon = 1e-12);
    }
}
