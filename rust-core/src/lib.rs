//! Burst PSD - calibrated power spectral density of tri-axial burst waveforms
//!
//! Windowed FFT analysis of magnetic field burst captures, with complex
//! instrument calibration, Hanning leakage correction, and fixed or sliding
//! window modes.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod batch;
pub mod calibration;
pub mod config;
pub mod error;
pub mod processor;
pub mod spectrum;
pub mod waveform;
#[cfg(feature = "python")]
pub mod python_bindings;

pub use batch::{process_batch, BatchReport, BurstMetadata, BurstRecord, GyroFrequencies};
pub use calibration::{CalibrationMapper, CalibrationTable, CalibrationVector};
pub use config::ProcessingConfig;
pub use error::{PsdError, Result};
pub use processor::{run_fixed_mode, run_sliding_mode, BurstProcessor, ResultBundle};
pub use spectrum::{ProcessingMode, WindowSpec};
pub use waveform::Waveform;
