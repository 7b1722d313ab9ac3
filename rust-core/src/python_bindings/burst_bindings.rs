//! Python bindings for the burst PSD processor

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1, PyReadonlyArray2};
use crate::calibration::CalibrationTable;
use crate::config::{ProcessingConfig, DEFAULT_SAMPLE_RATE_HZ, FIXED_BOX_LEN};
use crate::error::PsdError;
use crate::processor::{BurstProcessor, ResultBundle, FREQUENCY_UNITS, PSD_UNITS, TIME_UNITS};
use crate::waveform::Waveform;

impl From<PsdError> for PyErr {
    fn from(err: PsdError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Burst processor exposed to Python
#[pyclass(name = "BurstProcessor")]
pub struct PyBurstProcessor {
    processor: BurstProcessor,
}

#[pymethods]
impl PyBurstProcessor {
    /// Create a new burst processor
    ///
    /// Args:
    ///     sample_rate_hz: Waveform sample rate in Hz
    ///     fixed_box: Fixed-mode window length (samples)
    ///     sliding_box: Sliding-mode window length (samples)
    ///     slider: Sliding-mode stride (samples)
    #[new]
    #[pyo3(signature = (sample_rate_hz=DEFAULT_SAMPLE_RATE_HZ, fixed_box=FIXED_BOX_LEN, sliding_box=1024, slider=512))]
    fn new(sample_rate_hz: f64, fixed_box: usize, sliding_box: usize, slider: usize) -> PyResult<Self> {
        let config = ProcessingConfig {
            sample_rate_hz,
            fixed_box,
            sliding_box,
            slider,
        };
        Ok(Self {
            processor: BurstProcessor::new(config)?,
        })
    }

    /// Create a processor from a TOML config file
    #[staticmethod]
    fn from_toml(path: &str) -> PyResult<Self> {
        let config = ProcessingConfig::load(path)?;
        Ok(Self {
            processor: BurstProcessor::new(config)?,
        })
    }

    /// Non-overlapping window PSD
    ///
    /// Args:
    ///     bu, bv, bw: Field waveforms as 1-D numpy arrays
    ///     b_cal: (M, 2) array of real/imaginary calibration coefficients
    ///     df_cal: Calibration frequency step (Hz)
    ///     f_max: Receiver cutoff (Hz)
    ///
    /// Returns:
    ///     Dict with "psd", "frequencies", "time", "mode" and unit strings
    #[allow(clippy::too_many_arguments)]
    fn run_fixed_mode<'py>(
        &self,
        py: Python<'py>,
        bu: PyReadonlyArray1<f64>,
        bv: PyReadonlyArray1<f64>,
        bw: PyReadonlyArray1<f64>,
        b_cal: PyReadonlyArray2<f64>,
        df_cal: f64,
        f_max: f64,
    ) -> PyResult<&'py PyDict> {
        let (waveform, calibration) = burst_inputs(bu, bv, bw, b_cal, df_cal, f_max)?;
        let bundle = self.processor.run_fixed_mode(&waveform, &calibration)?;
        bundle_to_dict(py, bundle)
    }

    /// Overlapping window PSD
    ///
    /// Same arguments as `run_fixed_mode`. The returned dict also holds
    /// "psd_0468s", the leading round(duration / 0.468 · n_windows) rows
    /// (the whole matrix for records longer than 0.468 s).
    #[allow(clippy::too_many_arguments)]
    fn run_sliding_mode<'py>(
        &self,
        py: Python<'py>,
        bu: PyReadonlyArray1<f64>,
        bv: PyReadonlyArray1<f64>,
        bw: PyReadonlyArray1<f64>,
        b_cal: PyReadonlyArray2<f64>,
        df_cal: f64,
        f_max: f64,
    ) -> PyResult<&'py PyDict> {
        let (waveform, calibration) = burst_inputs(bu, bv, bw, b_cal, df_cal, f_max)?;
        let bundle = self.processor.run_sliding_mode(&waveform, &calibration)?;
        bundle_to_dict(py, bundle)
    }

    /// Get sample rate in Hz
    fn get_sample_rate(&self) -> f64 {
        self.processor.config().sample_rate_hz
    }
}

fn burst_inputs(
    bu: PyReadonlyArray1<f64>,
    bv: PyReadonlyArray1<f64>,
    bw: PyReadonlyArray1<f64>,
    b_cal: PyReadonlyArray2<f64>,
    df_cal: f64,
    f_max: f64,
) -> PyResult<(Waveform, CalibrationTable)> {
    let waveform = Waveform::new(
        bu.as_array().to_vec(),
        bv.as_array().to_vec(),
        bw.as_array().to_vec(),
    )?;
    let calibration = CalibrationTable::from_columns(b_cal.as_array(), df_cal, f_max)?;
    Ok((waveform, calibration))
}

fn bundle_to_dict(py: Python<'_>, bundle: ResultBundle) -> PyResult<&PyDict> {
    let dict = PyDict::new(py);
    dict.set_item("mode", bundle.mode().tag())?;
    dict.set_item("frequencies", PyArray1::from_slice(py, bundle.frequencies()))?;
    dict.set_item("time", PyArray1::from_slice(py, bundle.time()))?;
    dict.set_item("df", bundle.df())?;
    dict.set_item("window_secs", bundle.window_secs())?;
    dict.set_item("psd_units", PSD_UNITS)?;
    dict.set_item("frequency_units", FREQUENCY_UNITS)?;
    dict.set_item("time_units", TIME_UNITS)?;
    dict.set_item(
        "psd_0468s",
        bundle.psd_reference().map(|m| m.clone().into_pyarray(py)),
    )?;
    dict.set_item("psd", bundle.psd().clone().into_pyarray(py))?;
    Ok(dict)
}
