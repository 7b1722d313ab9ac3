//! Batch processing of burst records
//!
//! Each record is processed in both modes. A failing record (or mode) is
//! logged and reported with its identifier and timestamp; the rest of the
//! batch carries on.

use crate::calibration::CalibrationTable;
use crate::error::PsdError;
use crate::processor::{BurstProcessor, ResultBundle};
use crate::spectrum::ProcessingMode;
use crate::waveform::Waveform;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Records between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Gyrofrequencies computed upstream from magnetometer data (Hz)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroFrequencies {
    pub fce: f64,
    pub fce_05: f64,
    pub fce_005: f64,
}

/// Sidecar metadata forwarded unmodified to persistence
#[derive(Debug, Clone, PartialEq)]
pub struct BurstMetadata {
    /// Start of the burst capture
    pub burst_time: NaiveDateTime,
    pub gyro: GyroFrequencies,
}

impl BurstMetadata {
    /// Zero-padded day of month, the per-day output directory name
    pub fn day_directory(&self) -> String {
        self.burst_time.format("%d").to_string()
    }
}

/// One burst capture with its calibration context
#[derive(Debug, Clone)]
pub struct BurstRecord {
    pub id: String,
    pub metadata: BurstMetadata,
    /// U, V, W samples as read from the archive
    pub axes: [Vec<f64>; 3],
    pub calibration: CalibrationTable,
}

/// Products of one record; a mode that failed is `None`
#[derive(Debug, Clone)]
pub struct BurstProducts {
    pub record_id: String,
    pub metadata: BurstMetadata,
    pub fixed: Option<ResultBundle>,
    pub sliding: Option<ResultBundle>,
}

impl BurstProducts {
    pub fn bundles(&self) -> impl Iterator<Item = &ResultBundle> {
        self.fixed.iter().chain(self.sliding.iter())
    }
}

/// A record (or one mode of it) that could not be processed
#[derive(Error, Debug)]
#[error("burst {record_id} at {burst_time}{}: {source}", mode_suffix(.mode))]
pub struct RecordError {
    pub record_id: String,
    pub burst_time: NaiveDateTime,
    /// `None` when the record failed before either mode ran
    pub mode: Option<ProcessingMode>,
    #[source]
    pub source: PsdError,
}

fn mode_suffix(mode: &Option<ProcessingMode>) -> String {
    mode.map(|m| format!(" ({m} mode)")).unwrap_or_default()
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub products: Vec<BurstProducts>,
    pub failures: Vec<RecordError>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Process every record in both modes
pub fn process_batch<I>(records: I, processor: &BurstProcessor) -> BatchReport
where
    I: IntoIterator<Item = BurstRecord>,
{
    let mut report = BatchReport::default();
    let mut count = 0;

    for record in records {
        process_record(record, processor, &mut report);
        count += 1;
        if count % PROGRESS_INTERVAL == 0 {
            log::info!("{count} bursts processed");
        }
    }

    log::info!(
        "batch finished: {count} bursts, {} with products, {} failures",
        report.products.len(),
        report.failures.len()
    );
    report
}

fn process_record(record: BurstRecord, processor: &BurstProcessor, report: &mut BatchReport) {
    let BurstRecord {
        id,
        metadata,
        axes: [u, v, w],
        calibration,
    } = record;

    let waveform = match Waveform::new(u, v, w) {
        Ok(waveform) => waveform,
        Err(source) => {
            report.failures.push(failure(&id, &metadata, None, source));
            return;
        }
    };

    let (fixed, sliding) = processor.run_both(&waveform, &calibration);
    let fixed = keep_or_report(fixed, ProcessingMode::Fixed, &id, &metadata, report);
    let sliding = keep_or_report(sliding, ProcessingMode::Sliding, &id, &metadata, report);

    if fixed.is_some() || sliding.is_some() {
        report.products.push(BurstProducts {
            record_id: id,
            metadata,
            fixed,
            sliding,
        });
    }
}

fn keep_or_report(
    result: crate::error::Result<ResultBundle>,
    mode: ProcessingMode,
    id: &str,
    metadata: &BurstMetadata,
    report: &mut BatchReport,
) -> Option<ResultBundle> {
    match result {
        Ok(bundle) => Some(bundle),
        Err(source) => {
            report.failures.push(failure(id, metadata, Some(mode), source));
            None
        }
    }
}

fn failure(
    id: &str,
    metadata: &BurstMetadata,
    mode: Option<ProcessingMode>,
    source: PsdError,
) -> RecordError {
    let err = RecordError {
        record_id: id.to_string(),
        burst_time: metadata.burst_time,
        mode,
        source,
    };
    log::warn!("skipping {err}");
    err
}
