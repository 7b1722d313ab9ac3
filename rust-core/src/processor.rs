//! Burst processor - one generic pipeline for both windowing modes
//!
//! waveform → windows → apodize/FFT/calibrate → PSD rows → result bundle

use crate::calibration::{CalibrationMapper, CalibrationTable};
use crate::config::ProcessingConfig;
use crate::error::{PsdError, Result};
use crate::spectrum::analysis::{leading_rows, reference_rows, time_axis};
use crate::spectrum::{Apodization, ProcessingMode, PsdAssembler, SpectralEngine, WindowSpec};
use crate::waveform::Waveform;
use ndarray::Array2;
use std::ops::Range;
use std::sync::Arc;

pub const PSD_UNITS: &str = "nT^2/Hz";
pub const FREQUENCY_UNITS: &str = "Hz";
pub const TIME_UNITS: &str = "s";

/// PSD products of one burst record in one processing mode
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBundle {
    mode: ProcessingMode,
    psd: Array2<f64>,
    frequencies: Vec<f64>,
    time: Vec<f64>,
    psd_reference: Option<Array2<f64>>,
    df: f64,
    window_secs: f64,
}

impl ResultBundle {
    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// PSD matrix, shape (n_windows, n_f)
    pub fn psd(&self) -> &Array2<f64> {
        &self.psd
    }

    /// Calibrated frequency axis (Hz), length n_f
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Window times relative to burst start (s), length n_windows
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Sliding-mode rows within the first 0.468 s
    pub fn psd_reference(&self) -> Option<&Array2<f64>> {
        self.psd_reference.as_ref()
    }

    pub fn num_windows(&self) -> usize {
        self.psd.nrows()
    }

    pub fn num_bins(&self) -> usize {
        self.psd.ncols()
    }

    /// FFT frequency resolution (Hz)
    pub fn df(&self) -> f64 {
        self.df
    }

    /// Duration of one analysis window (s)
    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    /// Output file stem, e.g. `PSD_Kletzing_2019-03-01_12:00:00.000000`
    pub fn file_stem(&self, burst_time: &chrono::NaiveDateTime) -> String {
        format!(
            "PSD_{}_{}",
            self.mode.tag(),
            burst_time.format("%Y-%m-%d_%H:%M:%S%.6f")
        )
    }
}

/// Runs the windowed FFT pipeline with a fixed configuration
#[derive(Debug, Clone)]
pub struct BurstProcessor {
    config: ProcessingConfig,
}

impl BurstProcessor {
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Non-overlapping windows of `fixed_box` samples
    pub fn run_fixed_mode(
        &self,
        waveform: &Waveform,
        calibration: &CalibrationTable,
    ) -> Result<ResultBundle> {
        run_fixed_mode(
            waveform,
            calibration,
            self.config.fixed_spec(),
            self.config.sample_rate_hz,
        )
    }

    /// Windows of `sliding_box` samples advancing by `slider`
    pub fn run_sliding_mode(
        &self,
        waveform: &Waveform,
        calibration: &CalibrationTable,
    ) -> Result<ResultBundle> {
        run_sliding_mode(
            waveform,
            calibration,
            self.config.sliding_spec(),
            self.config.sample_rate_hz,
        )
    }

    pub fn run(
        &self,
        mode: ProcessingMode,
        waveform: &Waveform,
        calibration: &CalibrationTable,
    ) -> Result<ResultBundle> {
        match mode {
            ProcessingMode::Fixed => self.run_fixed_mode(waveform, calibration),
            ProcessingMode::Sliding => self.run_sliding_mode(waveform, calibration),
        }
    }

    /// Fixed and sliding results for one record
    ///
    /// The two modes are independent; with the `parallel` feature they run
    /// concurrently.
    pub fn run_both(
        &self,
        waveform: &Waveform,
        calibration: &CalibrationTable,
    ) -> (Result<ResultBundle>, Result<ResultBundle>) {
        #[cfg(feature = "parallel")]
        {
            rayon::join(
                || self.run_fixed_mode(waveform, calibration),
                || self.run_sliding_mode(waveform, calibration),
            )
        }
        #[cfg(not(feature = "parallel"))]
        {
            (
                self.run_fixed_mode(waveform, calibration),
                self.run_sliding_mode(waveform, calibration),
            )
        }
    }
}

/// Fixed-mode PSD; `spec` must not overlap
pub fn run_fixed_mode(
    waveform: &Waveform,
    calibration: &CalibrationTable,
    spec: WindowSpec,
    sample_rate_hz: f64,
) -> Result<ResultBundle> {
    if spec.is_overlapping() {
        return Err(PsdError::InvalidConfig(format!(
            "fixed mode needs stride == box length (got {} / {})",
            spec.stride, spec.box_len
        )));
    }
    run_pipeline(ProcessingMode::Fixed, waveform, calibration, spec, sample_rate_hz)
}

/// Sliding-mode PSD, including the 0.468 s reference sub-matrix
pub fn run_sliding_mode(
    waveform: &Waveform,
    calibration: &CalibrationTable,
    spec: WindowSpec,
    sample_rate_hz: f64,
) -> Result<ResultBundle> {
    run_pipeline(ProcessingMode::Sliding, waveform, calibration, spec, sample_rate_hz)
}

fn run_pipeline(
    mode: ProcessingMode,
    waveform: &Waveform,
    calibration: &CalibrationTable,
    spec: WindowSpec,
    sample_rate_hz: f64,
) -> Result<ResultBundle> {
    if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
        return Err(PsdError::InvalidConfig(format!(
            "sample rate must be positive and finite (got {sample_rate_hz})"
        )));
    }

    let windows: Vec<Range<usize>> = spec.segments(waveform.len())?.collect();
    let cal = Arc::new(CalibrationMapper::map(calibration, spec.box_len, sample_rate_hz)?);
    let apodization = Apodization::hanning(spec.box_len);
    let engine = SpectralEngine::new(&apodization, Arc::clone(&cal))?;
    let assembler = PsdAssembler::new(apodization.mean_square, spec.box_len, sample_rate_hz);

    log::debug!(
        "{mode} mode: {} windows of {} samples (stride {}), n_f={}, df={} Hz",
        windows.len(),
        spec.box_len,
        spec.stride,
        cal.num_bins(),
        cal.df
    );

    let axes = waveform.axes();
    let rows = map_windows(&windows, |window| {
        let frame = engine.frame(axes, window.clone())?;
        Ok(assembler.psd_row(&frame))
    })?;
    let psd = PsdAssembler::into_matrix(rows, cal.num_bins())?;

    let duration = assembler.duration(mode, windows.len(), waveform.len(), sample_rate_hz);
    let time = time_axis(duration, windows.len());
    let psd_reference = match mode {
        ProcessingMode::Fixed => None,
        ProcessingMode::Sliding => Some(leading_rows(
            psd.view(),
            reference_rows(duration, windows.len()),
        )),
    };

    Ok(ResultBundle {
        mode,
        psd,
        frequencies: cal.frequencies.clone(),
        time,
        psd_reference,
        df: cal.df,
        window_secs: assembler.window_secs(),
    })
}

#[cfg(feature = "parallel")]
fn map_windows<F>(windows: &[Range<usize>], f: F) -> Result<Vec<Vec<f64>>>
where
    F: Fn(&Range<usize>) -> Result<Vec<f64>> + Sync + Send,
{
    use rayon::prelude::*;
    windows.par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_windows<F>(windows: &[Range<usize>], f: F) -> Result<Vec<Vec<f64>>>
where
    F: Fn(&Range<usize>) -> Result<Vec<f64>>,
{
    windows.iter().map(f).collect()
}
