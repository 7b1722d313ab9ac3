//! Tri-axial burst waveform

use crate::error::{PsdError, Result};

/// Three equal-length magnetic field sample sequences (U, V, W)
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    u: Vec<f64>,
    v: Vec<f64>,
    w: Vec<f64>,
}

impl Waveform {
    /// Fails if the axes differ in length
    pub fn new(u: Vec<f64>, v: Vec<f64>, w: Vec<f64>) -> Result<Self> {
        if u.len() != v.len() || u.len() != w.len() {
            return Err(PsdError::AxisLengthMismatch {
                u: u.len(),
                v: v.len(),
                w: w.len(),
            });
        }
        Ok(Self { u, v, w })
    }

    /// Number of samples per axis
    pub fn len(&self) -> usize {
        self.u.len()
    }

    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }

    pub fn axes(&self) -> [&[f64]; 3] {
        [&self.u, &self.v, &self.w]
    }

    /// Record length in seconds
    pub fn duration(&self, sample_rate_hz: f64) -> f64 {
        self.len() as f64 / sample_rate_hz
    }
}
