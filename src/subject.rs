//! Per-subject driver and the batch loop over subject ids.
//!
//! File layout for subject `n` (two-digit, zero-padded):
//!
//! ```text
//! {eda_dir}/S{nn}_eda.csv   →┐
//! {ppg_dir}/s{nn}_pg.csv    →┴→ {output_dir}/S{nn}_combined.csv
//! ```
//!
//! The lower-case `s` of the PPG name is the naming used by the exports and
//! is kept as is.
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::eda::EDA;
use crate::io::{load_recording, write_combined_csv, ChannelColumns};

/// Name of the timestamp column in the combined output.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

pub fn eda_path(dir: &Path, id: u32) -> PathBuf {
    dir.join(format!("S{id:02}_eda.csv"))
}

pub fn ppg_path(dir: &Path, id: u32) -> PathBuf {
    dir.join(format!("s{id:02}_pg.csv"))
}

pub fn output_path(dir: &Path, id: u32) -> PathBuf {
    dir.join(format!("S{id:02}_combined.csv"))
}

/// What happened to one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectOutcome {
    /// Combined file written.
    Processed { rows: usize, path: PathBuf },
    /// At least one raw file was absent; nothing written.
    Skipped { missing: Vec<PathBuf> },
}

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// `(id, rows written)`.
    pub processed: Vec<(u32, usize)>,
    pub skipped: Vec<u32>,
    /// `(id, error chain)`.
    pub failed: Vec<(u32, String)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run the full pipeline for one subject.
///
/// Missing input files give [`SubjectOutcome::Skipped`]; malformed inputs are
/// errors.
pub fn process_subject(id: u32, cfg: &PipelineConfig) -> Result<SubjectOutcome> {
    let eda_file = eda_path(&cfg.eda_dir, id);
    let ppg_file = ppg_path(&cfg.ppg_dir, id);

    let missing: Vec<PathBuf> = [&eda_file, &ppg_file]
        .into_iter()
        .filter(|p| !p.is_file())
        .cloned()
        .collect();
    if !missing.is_empty() {
        for p in &missing {
            log::warn!("subject {id:02}: {} not found, skipping", p.display());
        }
        return Ok(SubjectOutcome::Skipped { missing });
    }

    log::info!("subject {id:02}: processing");
    let eda = load_recording(&eda_file, &channel_columns(cfg))?;
    let ppg = load_recording(&ppg_file, &channel_columns(cfg))?;
    log::debug!(
        "subject {id:02}: {} EDA samples ({}), {} PPG samples ({})",
        eda.len(),
        eda.channel,
        ppg.len(),
        ppg.channel
    );

    let table = crate::combine(&eda, &ppg, cfg)?;

    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating {}", cfg.output_dir.display()))?;
    let path = output_path(&cfg.output_dir, id);
    let timestamp_at = table.column_index(EDA).unwrap_or(table.columns.len());
    write_combined_csv(&path, &table, TIMESTAMP_COLUMN, timestamp_at)?;

    log::info!("subject {id:02}: {} rows → {}", table.len(), path.display());
    Ok(SubjectOutcome::Processed { rows: table.len(), path })
}

/// Process every subject in `cfg.first_subject..=cfg.last_subject`.
///
/// A failing subject is logged and recorded; the loop always continues.
pub fn run_batch(cfg: &PipelineConfig) -> BatchReport {
    let mut report = BatchReport::default();
    for id in cfg.first_subject..=cfg.last_subject {
        match process_subject(id, cfg) {
            Ok(SubjectOutcome::Processed { rows, .. }) => report.processed.push((id, rows)),
            Ok(SubjectOutcome::Skipped { .. }) => report.skipped.push(id),
            Err(e) => {
                log::error!("subject {id:02}: {e:#}");
                report.failed.push((id, format!("{e:#}")));
            }
        }
    }
    log::info!(
        "batch done: {} processed, {} skipped, {} failed",
        report.processed.len(),
        report.skipped.len(),
        report.failed.len()
    );
    report
}

/// Both raw files share the timestamp column; whichever of the EDA and PPG
/// measurement columns is present is used.
fn channel_columns(cfg: &PipelineConfig) -> ChannelColumns {
    ChannelColumns {
        timestamp: cfg.timestamp_column.clone(),
        primary: cfg.eda_column.clone(),
        fallback: cfg.ppg_column.clone(),
    }
}
