//! Power spectral density assembly
//!
//! Combines the calibrated spectra of the three field axes into one
//! one-sided PSD per window, and builds the matching time axis.

use super::fft::SpectralFrame;
use super::segments::ProcessingMode;
use crate::config::REFERENCE_WINDOW_SECS;
use crate::error::Result;
use ndarray::{s, Array1, Array2, ArrayView2};

/// Converts spectral frames into PSD rows
#[derive(Debug, Clone, Copy)]
pub struct PsdAssembler {
    /// mean(w²) of the apodization window
    mean_square: f64,

    /// Physical duration of one window, L / f_s (s)
    window_secs: f64,
}

impl PsdAssembler {
    pub fn new(mean_square: f64, box_len: usize, sample_rate_hz: f64) -> Self {
        Self {
            mean_square,
            window_secs: box_len as f64 / sample_rate_hz,
        }
    }

    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    /// PSD of one window: (|U|² + |V|² + |W|²) / wms · 2 · T_window
    ///
    /// The factor 2 folds the negative frequencies into the one-sided
    /// spectrum; multiplying by T_window (= 1/df) gives units per Hz.
    pub fn psd_row(&self, frame: &SpectralFrame) -> Vec<f64> {
        let scale = 2.0 * self.window_secs / self.mean_square;
        let mut row = vec![0.0; frame.num_bins()];
        for axis in frame.axes.iter() {
            for (acc, c) in row.iter_mut().zip(axis.iter()) {
                *acc += c.norm_sqr();
            }
        }
        row.iter_mut().for_each(|p| *p *= scale);
        row
    }

    /// Stack per-window rows into an (n_windows, n_f) matrix
    pub fn into_matrix(rows: Vec<Vec<f64>>, num_bins: usize) -> Result<Array2<f64>> {
        let num_windows = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Ok(Array2::from_shape_vec((num_windows, num_bins), flat)?)
    }

    /// Time span covered by the time axis for `mode`
    ///
    /// Fixed windows tile the record without gaps, so the span is
    /// n_windows · T_window. Sliding windows overlap, so the span is the
    /// full record length.
    pub fn duration(
        &self,
        mode: ProcessingMode,
        num_windows: usize,
        num_samples: usize,
        sample_rate_hz: f64,
    ) -> f64 {
        match mode {
            ProcessingMode::Fixed => num_windows as f64 * self.window_secs,
            ProcessingMode::Sliding => num_samples as f64 / sample_rate_hz,
        }
    }
}

/// `num_windows` evenly spaced times from 0 to `duration` inclusive
pub fn time_axis(duration: f64, num_windows: usize) -> Vec<f64> {
    Array1::linspace(0.0, duration, num_windows).to_vec()
}

/// Number of leading sliding-window rows kept for the reference comparison
///
/// round(duration / 0.468 · n_windows), capped at `num_windows`.
pub fn reference_rows(duration: f64, num_windows: usize) -> usize {
    let rows = (duration / REFERENCE_WINDOW_SECS * num_windows as f64).round() as usize;
    rows.min(num_windows)
}

/// Copy of the top `rows` rows of a PSD matrix
pub fn leading_rows(psd: ArrayView2<f64>, rows: usize) -> Array2<f64> {
    let rows = rows.min(psd.nrows());
    psd.slice(s![..rows, ..]).to_owned()
}
