//! Error types for the burst PSD pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsdError {
    #[error("Malformed calibration: bin {bin} needs table entry {index} but the table has {table_len} entries")]
    CalibrationTooShort {
        bin: usize,
        index: usize,
        table_len: usize,
    },

    #[error("Malformed calibration: {0}")]
    MalformedCalibration(String),

    #[error("Insufficient samples: waveform has {samples} samples, one window needs {box_len}")]
    InsufficientSamples { samples: usize, box_len: usize },

    #[error("Axis length mismatch: U={u}, V={v}, W={w}")]
    AxisLengthMismatch { u: usize, v: usize, w: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("FFT processing failed: {0}")]
    Fft(String),

    #[error("PSD rows do not form a matrix: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Failed to read config file '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PsdError>;
