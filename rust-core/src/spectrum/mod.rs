//! Windowed spectral analysis

pub mod analysis;
pub mod fft;
pub mod segments;
pub mod windowing;

pub use analysis::PsdAssembler;
pub use fft::{SpectralEngine, SpectralFrame};
pub use segments::{ProcessingMode, WindowSpec};
pub use windowing::Apodization;
