//! Apodization windows for spectral analysis
//!
//! Tapers each analysis box before the FFT to reduce spectral leakage. The
//! energy removed by the taper is restored on the power spectrum through
//! the window's mean-square value.

use std::f64::consts::PI;

/// Hanning window and its power correction
#[derive(Debug, Clone, PartialEq)]
pub struct Apodization {
    /// Window coefficients w[k] for k = 0..L-1
    pub coefficients: Vec<f64>,

    /// mean(w²); divide power (not magnitude) by this
    pub mean_square: f64,
}

impl Apodization {
    /// Symmetric Hanning window: w[k] = 0.5 - 0.5*cos(2πk/(L-1))
    pub fn hanning(length: usize) -> Self {
        let coefficients = hanning_window(length);
        let mean_square = mean_square(&coefficients);
        Self {
            coefficients,
            mean_square,
        }
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Window coefficients scaled by 1/L
    ///
    /// Folding the FFT normalization into the taper keeps power independent
    /// of box length.
    pub fn normalized(&self) -> Vec<f64> {
        let scale = 1.0 / self.len() as f64;
        self.coefficients.iter().map(|&w| w * scale).collect()
    }
}

/// Generate Hanning window coefficients
pub fn hanning_window(length: usize) -> Vec<f64> {
    if length == 1 {
        return vec![1.0];
    }

    let m = length as f64;
    (0..length)
        .map(|n| {
            let angle = 2.0 * PI * n as f64 / (m - 1.0);
            0.5 - 0.5 * angle.cos()
        })
        .collect()
}

fn mean_square(window: &[f64]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().map(|&w| w * w).sum::<f64>() / window.len() as f64
}
