//! CSV I/O for raw recordings and combined output.
//!
//! Reader: a headered CSV holding an epoch-seconds timestamp column plus one
//! measurement column (EDA `EA` or PPG `PG` by default).  Other columns are
//! ignored.
//!
//! Writer: the merged 1 Hz table, with the timestamp column spliced in
//! between the HRV and EDA blocks and undefined cells left empty.
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::Path;

use crate::series::TimeSeries;

/// Output format of the timestamp column, e.g. `2023-11-15 07:00:00+07:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Which columns to read from a raw file.
#[derive(Debug, Clone)]
pub struct ChannelColumns {
    /// Epoch-seconds column.
    pub timestamp: String,
    /// Preferred measurement column (channel A).
    pub primary: String,
    /// Fallback measurement column (channel B).
    pub fallback: String,
}

/// A single-channel recording as loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecording {
    /// Name of the measurement column that was found.
    pub channel: String,
    /// Epoch seconds, non-decreasing.
    pub timestamps: Vec<f64>,
    /// One value per timestamp.
    pub values: Vec<f64>,
}

impl RawRecording {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Load `path`, keeping the timestamp column and whichever measurement column
/// is present (primary wins if both are).
///
/// # Errors
///
/// * Neither measurement column, or no timestamp column, in the header.
/// * A cell that is not a number.
/// * Timestamps that go backwards or are not finite.
pub fn load_recording(path: &Path, cols: &ChannelColumns) -> Result<RawRecording> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_recording(file, cols).with_context(|| format!("reading {}", path.display()))
}

/// [`load_recording`] over any reader.
pub fn read_recording<R: std::io::Read>(rdr: R, cols: &ChannelColumns) -> Result<RawRecording> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let headers = reader.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h == name);

    let ts_idx = find(&cols.timestamp)
        .with_context(|| format!("missing timestamp column {:?}", cols.timestamp))?;
    let (channel, val_idx) = match (find(&cols.primary), find(&cols.fallback)) {
        (Some(i), _) => (cols.primary.clone(), i),
        (None, Some(i)) => (cols.fallback.clone(), i),
        (None, None) => bail!(
            "neither measurement column {:?} nor {:?} present (header: {:?})",
            cols.primary,
            cols.fallback,
            headers.iter().collect::<Vec<_>>()
        ),
    };

    let mut timestamps = Vec::new();
    let mut values = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1, so data row 0 is line 2.
        let line = row + 2;
        let ts = parse_cell(&record, ts_idx).with_context(|| format!("line {line}: {}", cols.timestamp))?;
        let v = parse_cell(&record, val_idx).with_context(|| format!("line {line}: {channel}"))?;
        if !ts.is_finite() {
            bail!("line {line}: timestamp {ts} is not finite");
        }
        if let Some(&prev) = timestamps.last() {
            if ts < prev {
                bail!("line {line}: timestamp {ts} is earlier than previous {prev}");
            }
        }
        timestamps.push(ts);
        values.push(v);
    }

    Ok(RawRecording { channel, timestamps, values })
}

fn parse_cell(record: &csv::StringRecord, idx: usize) -> Result<f64> {
    let cell = record.get(idx).context("row is shorter than the header")?;
    cell.parse::<f64>().with_context(|| format!("{cell:?} is not a number"))
}

/// Write a merged table to `path`.
///
/// Columns are `table.columns[..timestamp_at]`, then `timestamp_name`, then
/// the remaining columns.  No index column is written.
pub fn write_combined_csv(
    path: &Path,
    table: &TimeSeries,
    timestamp_name: &str,
    timestamp_at: usize,
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_combined(file, table, timestamp_name, timestamp_at)
        .with_context(|| format!("writing {}", path.display()))
}

/// [`write_combined_csv`] into any writer.
pub fn write_combined<W: std::io::Write>(
    w: W,
    table: &TimeSeries,
    timestamp_name: &str,
    timestamp_at: usize,
) -> Result<()> {
    if timestamp_at > table.columns.len() {
        bail!("timestamp position {timestamp_at} past {} columns", table.columns.len());
    }
    let mut writer = csv::Writer::from_writer(w);

    let mut header: Vec<&str> = table.columns.iter().map(String::as_str).collect();
    header.insert(timestamp_at, timestamp_name);
    writer.write_record(&header)?;

    for (t, row) in table.index.iter().zip(table.values.rows()) {
        let mut cells: Vec<String> = row
            .iter()
            .map(|v| v.map(|v| v.to_string()).unwrap_or_default())
            .collect();
        cells.insert(timestamp_at, t.format(TIMESTAMP_FORMAT).to_string());
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::epoch_to_instant;
    use chrono::FixedOffset;

    fn cols() -> ChannelColumns {
        ChannelColumns { timestamp: "LocalTimestamp".into(), primary: "EA".into(), fallback: "PG".into() }
    }

    #[test]
    fn keeps_timestamp_and_present_channel() {
        let csv = "LocalTimestamp,PG,Extra\n10.0,1.5,x\n10.01,2.5,y\n";
        let rec = read_recording(csv.as_bytes(), &cols()).unwrap();
        assert_eq!(rec.channel, "PG");
        assert_eq!(rec.timestamps, vec![10.0, 10.01]);
        assert_eq!(rec.values, vec![1.5, 2.5]);
    }

    #[test]
    fn primary_wins_when_both_present() {
        let csv = "EA,LocalTimestamp,PG\n0.3,1,9\n";
        let rec = read_recording(csv.as_bytes(), &cols()).unwrap();
        assert_eq!(rec.channel, "EA");
        assert_eq!(rec.values, vec![0.3]);
    }

    #[test]
    fn missing_channel_is_an_error() {
        let csv = "LocalTimestamp,HR\n1,60\n";
        let err = read_recording(csv.as_bytes(), &cols()).unwrap_err();
        assert!(err.to_string().contains("neither measurement column"), "{err}");
    }

    #[test]
    fn bad_cell_is_an_error() {
        let csv = "LocalTimestamp,EA\n1,0.2\n2,oops\n";
        assert!(read_recording(csv.as_bytes(), &cols()).is_err());
    }

    #[test]
    fn decreasing_timestamps_rejected() {
        let csv = "LocalTimestamp,EA\n2,0.2\n1,0.3\n";
        assert!(read_recording(csv.as_bytes(), &cols()).is_err());
    }

    #[test]
    fn combined_layout() {
        let off = FixedOffset::east_opt(7 * 3600).unwrap();
        let mut table = TimeSeries::from_columns(
            vec![epoch_to_instant(0.0, off).unwrap()],
            vec![("HR".into(), vec![60.0]), ("EDA".into(), vec![0.5])],
        )
        .unwrap();
        table.values[[0, 1]] = None;

        let mut out = Vec::new();
        write_combined(&mut out, &table, "Timestamp", 1).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "HR,Timestamp,EDA\n60,1970-01-01 07:00:00+07:00,\n");
    }
}
