//! PyO3 bindings for Python integration

use pyo3::prelude::*;

mod burst_bindings;

/// Python module definition
#[pymodule]
fn burst_psd(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<burst_bindings::PyBurstProcessor>()?;
    m.add("DEFAULT_SAMPLE_RATE_HZ", crate::config::DEFAULT_SAMPLE_RATE_HZ)?;
    m.add("FIXED_BOX_LEN", crate::config::FIXED_BOX_LEN)?;

    Ok(())
}
