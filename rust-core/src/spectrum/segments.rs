//! Partitioning of a waveform into analysis windows

use crate::error::{PsdError, Result};
use std::ops::Range;

/// Windowing policy, also used as the result tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingMode {
    /// Non-overlapping boxes replicating the on-board (Kletzing) algorithm
    Fixed,

    /// Overlapping boxes at finer time resolution
    Sliding,
}

impl ProcessingMode {
    /// Tag written alongside persisted results
    pub fn tag(&self) -> &'static str {
        match self {
            ProcessingMode::Fixed => "Kletzing",
            ProcessingMode::Sliding => "sliding",
        }
    }
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Box length and stride, both in samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub box_len: usize,
    pub stride: usize,
}

impl WindowSpec {
    pub fn new(box_len: usize, stride: usize) -> Self {
        Self { box_len, stride }
    }

    /// Stride equal to the box length
    pub fn non_overlapping(box_len: usize) -> Self {
        Self::new(box_len, box_len)
    }

    pub fn is_overlapping(&self) -> bool {
        self.stride < self.box_len
    }

    pub fn validate(&self) -> Result<()> {
        if self.box_len == 0 {
            return Err(PsdError::InvalidConfig("box length must be non-zero".into()));
        }
        if self.stride == 0 || self.stride > self.box_len {
            return Err(PsdError::InvalidConfig(format!(
                "stride must be in 1..={} (got {})",
                self.box_len, self.stride
            )));
        }
        Ok(())
    }

    /// Number of whole windows fitting in `samples`
    ///
    /// floor((N - (L - S)) / S), which reduces to floor(N / L) when S == L.
    pub fn window_count(&self, samples: usize) -> usize {
        if self.stride == 0 || self.stride > self.box_len || samples < self.box_len {
            return 0;
        }
        (samples - (self.box_len - self.stride)) / self.stride
    }

    /// Sample ranges of every whole window, in time order
    ///
    /// Trailing samples that do not fill a window are dropped.
    pub fn segments(&self, samples: usize) -> Result<Segments> {
        self.validate()?;
        if samples < self.box_len {
            return Err(PsdError::InsufficientSamples {
                samples,
                box_len: self.box_len,
            });
        }
        Ok(Segments {
            spec: *self,
            next: 0,
            count: self.window_count(samples),
        })
    }
}

/// Iterator over window sample ranges
#[derive(Debug, Clone)]
pub struct Segments {
    spec: WindowSpec,
    next: usize,
    count: usize,
}

impl Iterator for Segments {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let lower = self.next * self.spec.stride;
        self.next += 1;
        Some(lower..lower + self.spec.box_len)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Segments {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_drops_partial_window() {
        let spec = WindowSpec::non_overlapping(100);
        let ranges: Vec<_> = spec.segments(350).unwrap().collect();

        assert_eq!(ranges, vec![0..100, 100..200, 200..300]);
    }

    #[test]
    fn test_sliding_ranges() {
        let spec = WindowSpec::new(4, 2);
        let ranges: Vec<_> = spec.segments(11).unwrap().collect();

        // floor((11 - 2) / 2) = 4
        assert_eq!(ranges, vec![0..4, 2..6, 4..8, 6..10]);
    }

    #[test]
    fn test_last_window_may_touch_end() {
        let spec = WindowSpec::new(1024, 512);
        let ranges: Vec<_> = spec.segments(98304).unwrap().collect();

        assert_eq!(ranges.len(), 191);
        assert_eq!(ranges.last().unwrap().end, 98304);
    }

    #[test]
    fn test_counts_match_formulas() {
        assert_eq!(WindowSpec::non_overlapping(16384).window_count(98304), 6);
        assert_eq!(WindowSpec::new(1024, 512).window_count(98304), 191);
        assert_eq!(WindowSpec::new(1000, 300).window_count(5000), 14);
    }

    #[test]
    fn test_short_waveform() {
        let spec = WindowSpec::new(1024, 512);
        assert!(matches!(
            spec.segments(1000),
            Err(PsdError::InsufficientSamples { samples: 1000, box_len: 1024 })
        ));
    }

    #[test]
    fn test_invalid_stride() {
        assert!(WindowSpec::new(64, 0).segments(1000).is_err());
        assert!(WindowSpec::new(64, 65).segments(1000).is_err());
    }

    #[test]
    fn test_count_is_zero_for_invalid_geometry() {
        assert_eq!(WindowSpec::new(64, 65).window_count(1000), 0);
        assert_eq!(WindowSpec::new(64, 0).window_count(1000), 0);
        assert_eq!(WindowSpec::new(64, 32).window_count(63), 0);
    }

    #[test]
    fn test_mode_tags() {
        assert_eq!(ProcessingMode::Fixed.tag(), "Kletzing");
        assert_eq!(ProcessingMode::Sliding.to_string(), "sliding");
    }
}
