//! Instrument calibration lookup
//!
//! Maps a regularly spaced complex calibration table onto the native
//! frequency grid of an FFT box, truncated at the receiver cutoff.

use crate::error::{PsdError, Result};
use ndarray::ArrayView2;
use num_complex::Complex64;

/// Raw calibration table for one burst record
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    /// Complex coefficients at 0, df_cal, 2*df_cal, ...
    pub coefficients: Vec<Complex64>,

    /// Calibration frequency step (Hz)
    pub df_cal: f64,

    /// Receiver cutoff (Hz); bins at or above it are dropped
    pub f_max: f64,
}

impl CalibrationTable {
    pub fn new(coefficients: Vec<Complex64>, df_cal: f64, f_max: f64) -> Self {
        Self {
            coefficients,
            df_cal,
            f_max,
        }
    }

    /// Build from (real, imaginary) pairs
    pub fn from_pairs(pairs: &[[f64; 2]], df_cal: f64, f_max: f64) -> Self {
        let coefficients = pairs
            .iter()
            .map(|&[re, im]| Complex64::new(re, im))
            .collect();
        Self::new(coefficients, df_cal, f_max)
    }

    /// Build from an (M, 2) array whose columns are real and imaginary parts
    pub fn from_columns(table: ArrayView2<f64>, df_cal: f64, f_max: f64) -> Result<Self> {
        if table.ncols() != 2 {
            return Err(PsdError::MalformedCalibration(format!(
                "expected (M, 2) coefficient array, got {} columns",
                table.ncols()
            )));
        }
        let coefficients = table
            .rows()
            .into_iter()
            .map(|row| Complex64::new(row[0], row[1]))
            .collect();
        Ok(Self::new(coefficients, df_cal, f_max))
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

/// Calibration resampled onto an FFT grid
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationVector {
    /// One complex coefficient per retained FFT bin
    pub coefficients: Vec<Complex64>,

    /// Frequency of each retained bin (Hz), strictly below `f_max`
    pub frequencies: Vec<f64>,

    /// Native FFT frequency resolution (Hz)
    pub df: f64,

    /// Calibration table entries per FFT bin
    pub cal_step: usize,
}

impl CalibrationVector {
    /// Number of retained frequency bins (n_f)
    pub fn num_bins(&self) -> usize {
        self.coefficients.len()
    }
}

/// Builds per-bin calibration vectors for a given FFT box
pub struct CalibrationMapper;

impl CalibrationMapper {
    /// Resample `table` onto the grid of a `box_len`-point FFT at `sample_rate_hz`
    ///
    /// Bins run over the non-negative half of the spectrum (k < box_len/2)
    /// and stop at the first frequency >= `f_max`. Fails if the table runs
    /// out before the cutoff is reached.
    pub fn map(
        table: &CalibrationTable,
        box_len: usize,
        sample_rate_hz: f64,
    ) -> Result<CalibrationVector> {
        if !(table.df_cal.is_finite() && table.df_cal > 0.0) {
            return Err(PsdError::MalformedCalibration(format!(
                "calibration step must be positive (got {})",
                table.df_cal
            )));
        }
        if box_len == 0 {
            return Err(PsdError::InvalidConfig("box length must be non-zero".into()));
        }

        let df = sample_rate_hz / box_len as f64;
        let cal_step = (df / table.df_cal).round() as usize;
        if cal_step == 0 {
            return Err(PsdError::MalformedCalibration(format!(
                "FFT resolution {df} Hz is finer than calibration step {} Hz",
                table.df_cal
            )));
        }

        let native_bins = box_len / 2;
        let mut coefficients = Vec::with_capacity(native_bins);
        let mut frequencies = Vec::with_capacity(native_bins);

        for bin in 0..native_bins {
            let freq = bin as f64 * df;
            if freq >= table.f_max {
                break;
            }
            let index = bin * cal_step;
            let coeff = table
                .coefficients
                .get(index)
                .ok_or(PsdError::CalibrationTooShort {
                    bin,
                    index,
                    table_len: table.len(),
                })?;
            coefficients.push(*coeff);
            frequencies.push(freq);
        }

        if coefficients.is_empty() {
            return Err(PsdError::MalformedCalibration(format!(
                "cutoff {} Hz leaves no frequency bins",
                table.f_max
            )));
        }

        log::debug!(
            "calibration mapped: df={df} Hz, cal_step={cal_step}, n_f={}",
            coefficients.len()
        );

        Ok(CalibrationVector {
            coefficients,
            frequencies,
            df,
            cal_step,
        })
    }
}
