//! Timestamp-indexed table with nullable columns.
//!
//! [`TimeSeries`] is the common currency between stages: the EDA extractor,
//! the HRV extractor, the 1 Hz resampler and the merger all produce one.
//! Values are `Option<f64>`; `None` marks an undefined cell (empty bucket,
//! window without beats, zero division) and is never replaced by a number.
use anyhow::{bail, Result};
use chrono::{DateTime, FixedOffset};
use ndarray::{Array2, ArrayView1, Axis};

/// Instant type used for every index in the crate.
pub type Instant = DateTime<FixedOffset>;

/// Rows are instants, columns are named features.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    /// Row timestamps.
    pub index: Vec<Instant>,
    /// Column names, in output order.
    pub columns: Vec<String>,
    /// `[rows, columns]`.
    pub values: Array2<Option<f64>>,
}

impl TimeSeries {
    /// Build a table, checking that `values` is `[index.len(), columns.len()]`.
    pub fn new(index: Vec<Instant>, columns: Vec<String>, values: Array2<Option<f64>>) -> Result<Self> {
        if values.dim() != (index.len(), columns.len()) {
            bail!(
                "values shape {:?} does not match {} rows × {} columns",
                values.dim(),
                index.len(),
                columns.len()
            );
        }
        Ok(Self { index, columns, values })
    }

    /// A table with the given columns and no rows.
    pub fn empty(columns: Vec<String>) -> Self {
        let n_cols = columns.len();
        Self { index: vec![], columns, values: Array2::from_elem((0, n_cols), None) }
    }

    /// Build from fully defined column vectors of equal length.
    pub fn from_columns(index: Vec<Instant>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let n = index.len();
        let mut values = Array2::from_elem((n, columns.len()), None);
        let mut names = Vec::with_capacity(columns.len());
        for (c, (name, col)) in columns.into_iter().enumerate() {
            if col.len() != n {
                bail!("column {name} has {} values, index has {n}", col.len());
            }
            for (r, v) in col.into_iter().enumerate() {
                values[[r, c]] = Some(v).filter(|v| v.is_finite());
            }
            names.push(name);
        }
        Self::new(index, names, values)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// View of one column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, Option<f64>>> {
        self.column_index(name).map(|c| self.values.column(c))
    }

    /// Append a column.  `values` must have one entry per row.
    pub fn push_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.len() {
            bail!("column {name} has {} values, table has {} rows", values.len(), self.len());
        }
        let col = ndarray::Array2::from_shape_vec((values.len(), 1), values)?;
        self.values.append(Axis(1), col.view())?;
        self.columns.push(name.to_string());
        Ok(())
    }

    /// Sort rows by timestamp.  Stable, so equal instants keep their order.
    pub fn sort_by_index(&mut self) {
        if self.index.windows(2).all(|w| w[0] <= w[1]) {
            return;
        }
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&i| self.index[i]);
        self.index = order.iter().map(|&i| self.index[i]).collect();
        self.values = self.values.select(Axis(0), &order);
    }
}
