//! Calibrated FFT engine using realfft for real-valued signals
//!
//! Turns one analysis box of each field axis into a calibrated complex
//! spectrum over the retained frequency bins.

use crate::calibration::CalibrationVector;
use crate::error::{PsdError, Result};
use crate::spectrum::windowing::Apodization;
use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use std::ops::Range;
use std::sync::Arc;

/// Calibrated spectra of the three axes for one window
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFrame {
    /// U, V, W spectra, each `n_f` bins long
    pub axes: [Vec<Complex64>; 3],
}

impl SpectralFrame {
    pub fn num_bins(&self) -> usize {
        self.axes[0].len()
    }
}

/// FFT engine for one box length and one calibration
pub struct SpectralEngine {
    /// Box length (samples)
    box_len: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Hanning taper pre-scaled by 1/L
    taper: Vec<f64>,

    /// Per-bin complex instrument response
    calibration: Arc<CalibrationVector>,
}

impl SpectralEngine {
    /// Create new engine
    ///
    /// # Arguments
    /// * `apodization` - Window matching the box length
    /// * `calibration` - Calibration resampled onto this box's FFT grid
    pub fn new(apodization: &Apodization, calibration: Arc<CalibrationVector>) -> Result<Self> {
        let box_len = apodization.len();
        if calibration.num_bins() > box_len / 2 + 1 {
            return Err(PsdError::MalformedCalibration(format!(
                "{} calibration bins exceed the {}-point FFT",
                calibration.num_bins(),
                box_len
            )));
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(box_len);

        Ok(Self {
            box_len,
            r2c,
            taper: apodization.normalized(),
            calibration,
        })
    }

    pub fn box_len(&self) -> usize {
        self.box_len
    }

    /// Number of retained frequency bins
    pub fn num_bins(&self) -> usize {
        self.calibration.num_bins()
    }

    /// Calibrated spectrum of one box of samples
    ///
    /// # Arguments
    /// * `samples` - Exactly `box_len` samples
    ///
    /// # Returns
    /// FFT(w/L · x)[k] · cal[k] for the first `n_f` bins
    pub fn transform(&self, samples: &[f64]) -> Result<Vec<Complex64>> {
        if samples.len() != self.box_len {
            return Err(PsdError::InsufficientSamples {
                samples: samples.len(),
                box_len: self.box_len,
            });
        }

        let mut input: Vec<f64> = samples
            .iter()
            .zip(self.taper.iter())
            .map(|(&x, &w)| x * w)
            .collect();
        let mut output = self.r2c.make_output_vec();

        self.r2c
            .process(&mut input, &mut output)
            .map_err(|e| PsdError::Fft(e.to_string()))?;

        Ok(output
            .iter()
            .zip(self.calibration.coefficients.iter())
            .map(|(&bin, &cal)| bin * cal)
            .collect())
    }

    /// Calibrated spectra of all three axes over one window
    pub fn frame(&self, axes: [&[f64]; 3], window: Range<usize>) -> Result<SpectralFrame> {
        let [u, v, w] = axes;
        Ok(SpectralFrame {
            axes: [
                self.transform(slice(u, &window)?)?,
                self.transform(slice(v, &window)?)?,
                self.transform(slice(w, &window)?)?,
            ],
        })
    }
}

fn slice<'a>(samples: &'a [f64], window: &Range<usize>) -> Result<&'a [f64]> {
    samples
        .get(window.clone())
        .ok_or(PsdError::InsufficientSamples {
            samples: samples.len(),
            box_len: window.end,
        })
}
