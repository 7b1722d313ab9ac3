//! End-to-end tests for the burst PSD pipeline.
//!
//! Exercise both processing modes on synthetic bursts sized like real
//! receiver captures.

use std::f64::consts::PI;

use burst_psd::{
    run_fixed_mode, run_sliding_mode, BurstProcessor, CalibrationTable, ProcessingConfig,
    ProcessingMode, PsdError, Waveform, WindowSpec,
};
use num_complex::Complex64;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SAMPLE_RATE: f64 = 16384.0;
const BURST_LEN: usize = 98304;

/// Three axes carrying the same tone with different amplitudes.
fn tone_burst(len: usize, freq_hz: f64) -> Waveform {
    let axis = |amp: f64| -> Vec<f64> {
        (0..len)
            .map(|n| amp * (2.0 * PI * freq_hz * n as f64 / SAMPLE_RATE).sin())
            .collect()
    };
    Waveform::new(axis(1.0), axis(0.5), axis(0.25)).unwrap()
}

/// Unit calibration on a 1 Hz grid up to Nyquist.
fn native_calibration() -> CalibrationTable {
    let len = (SAMPLE_RATE / 2.0) as usize;
    CalibrationTable::new(vec![Complex64::new(1.0, 0.0); len], 1.0, SAMPLE_RATE / 2.0)
}

fn reference_config() -> ProcessingConfig {
    ProcessingConfig {
        sample_rate_hz: SAMPLE_RATE,
        fixed_box: 16384,
        sliding_box: 1024,
        slider: 512,
    }
}

// ===========================================================================
// Reference burst geometry
// ===========================================================================

#[test]
fn fixed_mode_reference_shape() {
    let processor = BurstProcessor::new(reference_config()).unwrap();
    let bundle = processor
        .run_fixed_mode(&tone_burst(BURST_LEN, 1000.0), &native_calibration())
        .unwrap();

    assert_eq!(bundle.mode(), ProcessingMode::Fixed);
    assert_eq!(bundle.psd().dim(), (6, 8192));
    assert_eq!(bundle.frequencies().len(), 8192);
    assert_eq!(bundle.time().len(), 6);
    assert!((bundle.time()[5] - 6.0).abs() < 1e-12);
}

#[test]
fn sliding_mode_reference_shape() {
    let processor = BurstProcessor::new(reference_config()).unwrap();
    let bundle = processor
        .run_sliding_mode(&tone_burst(BURST_LEN, 1000.0), &native_calibration())
        .unwrap();

    assert_eq!(bundle.mode(), ProcessingMode::Sliding);
    assert_eq!(bundle.psd().dim(), (191, 512));
    assert!((bundle.time()[190] - 6.0).abs() < 1e-12);

    // round(6 / 0.468 * 191) = 2449 rows requested, capped at 191
    let reference = bundle.psd_reference().unwrap();
    assert_eq!(reference.dim(), (191, 512));
    assert_eq!(reference, bundle.psd());
}

#[test]
fn frequency_axis_is_increasing_and_below_cutoff() {
    let mut calibration = native_calibration();
    calibration.f_max = 3000.5;

    let bundle = run_fixed_mode(
        &tone_burst(BURST_LEN, 1000.0),
        &calibration,
        WindowSpec::non_overlapping(16384),
        SAMPLE_RATE,
    )
    .unwrap();

    let freqs = bundle.frequencies();
    assert_eq!(freqs.len(), 3001);
    assert_eq!(freqs.len(), bundle.psd().ncols());
    assert!(freqs.windows(2).all(|w| w[0] < w[1]));
    assert!(freqs.iter().all(|&f| f < 3000.5));
}

// ===========================================================================
// Physical scaling
// ===========================================================================

#[test]
fn tone_power_matches_parseval() {
    // A unit-amplitude sine has mean power 1/2. Integrating the one-sided
    // PSD over frequency should recover it for each axis.
    let bundle = run_fixed_mode(
        &tone_burst(16384, 1000.0),
        &native_calibration(),
        WindowSpec::non_overlapping(16384),
        SAMPLE_RATE,
    )
    .unwrap();

    let df = bundle.df();
    let total: f64 = bundle.psd().row(0).iter().sum::<f64>() * df;
    let expected = 0.5 * (1.0 + 0.25 + 0.0625);
    assert!(
        (total - expected).abs() / expected < 0.01,
        "integrated power {total} should be near {expected}"
    );
}

#[test]
fn complex_calibration_scales_power_by_magnitude_squared() {
    let waveform = tone_burst(16384, 1000.0);
    let mut calibration = native_calibration();
    calibration
        .coefficients
        .iter_mut()
        .for_each(|c| *c = Complex64::new(3.0, 4.0));

    let spec = WindowSpec::non_overlapping(16384);
    let plain = run_fixed_mode(&waveform, &native_calibration(), spec, SAMPLE_RATE).unwrap();
    let calibrated = run_fixed_mode(&waveform, &calibration, spec, SAMPLE_RATE).unwrap();

    for (c, p) in calibrated.psd().iter().zip(plain.psd().iter()) {
        assert!((c - 25.0 * p).abs() <= 1e-9 * (1.0 + p.abs()));
    }
}

#[test]
fn sliding_with_full_stride_equals_fixed() {
    let waveform = tone_burst(20000, 700.0);
    let spec = WindowSpec::non_overlapping(2048);

    let fixed = run_fixed_mode(&waveform, &native_calibration(), spec, SAMPLE_RATE).unwrap();
    let sliding = run_sliding_mode(&waveform, &native_calibration(), spec, SAMPLE_RATE).unwrap();

    assert_eq!(fixed.num_windows(), 9);
    assert_eq!(fixed.psd(), sliding.psd());
    assert_eq!(fixed.frequencies(), sliding.frequencies());
}

// ===========================================================================
// Failures
// ===========================================================================

#[test]
fn malformed_calibration_is_reported() {
    let mut calibration = native_calibration();
    calibration.coefficients.truncate(4000);

    let err = run_fixed_mode(
        &tone_burst(BURST_LEN, 1000.0),
        &calibration,
        WindowSpec::non_overlapping(16384),
        SAMPLE_RATE,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        PsdError::CalibrationTooShort { bin: 4000, index: 4000, table_len: 4000 }
    ));
}

#[test]
fn waveform_shorter_than_window_is_reported() {
    let processor = BurstProcessor::new(reference_config()).unwrap();
    let err = processor
        .run_fixed_mode(&tone_burst(16000, 1000.0), &native_calibration())
        .unwrap_err();

    assert!(matches!(
        err,
        PsdError::InsufficientSamples { samples: 16000, box_len: 16384 }
    ));
}

#[test]
fn config_round_trip_through_toml() {
    let config = ProcessingConfig::from_toml_str(
        "sample_rate_hz = 16384.0\nfixed_box = 16384\nsliding_box = 1024\nslider = 512\n",
    )
    .unwrap();
    assert_eq!(config, reference_config());
}
