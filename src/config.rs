//! Configuration for the pitch contour segmenter

use crate::constants::{
    MAX_FREQUENCY_HZ, MEDIAN_WINDOW, MIN_FREQUENCY_HZ, MIN_NOTE_DURATION_SECONDS,
    SEMITONE_THRESHOLD,
};
use crate::error::SegmentError;

/// Segmenter tuning parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SegmenterConfig {
    /// Frames below this frequency are treated as silence (default: 50.0 Hz)
    pub min_frequency: f64,

    /// Frames above this frequency are treated as noise (default: 800.0 Hz)
    pub max_frequency: f64,

    /// Maximum MIDI distance from the open note's reference pitch for a frame
    /// to continue that note (default: 3.0)
    pub semitone_threshold: f64,

    /// Width of the centered median filter applied before scanning, in frames.
    /// `None` disables smoothing (default: Some(7))
    pub median_window: Option<usize>,

    /// Candidate notes shorter than this are discarded (default: 0.06 s)
    pub min_note_duration: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_frequency: MIN_FREQUENCY_HZ,
            max_frequency: MAX_FREQUENCY_HZ,
            semitone_threshold: SEMITONE_THRESHOLD,
            median_window: Some(MEDIAN_WINDOW),
            min_note_duration: MIN_NOTE_DURATION_SECONDS,
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<(), SegmentError> {
        if !(self.min_frequency > 0.0 && self.min_frequency < self.max_frequency) {
            return Err(SegmentError::InvalidConfig(format!(
                "frequency band must satisfy 0 < min < max, got [{}, {}]",
                self.min_frequency, self.max_frequency
            )));
        }
        if !(self.semitone_threshold > 0.0) {
            return Err(SegmentError::InvalidConfig(format!(
                "semitone threshold must be positive, got {}",
                self.semitone_threshold
            )));
        }
        if !(self.min_note_duration >= 0.0) {
            return Err(SegmentError::InvalidConfig(format!(
                "minimum note duration must be non-negative, got {}",
                self.min_note_duration
            )));
        }
        if let Some(window) = self.median_window {
            if window == 0 || window % 2 == 0 {
                return Err(SegmentError::InvalidConfig(format!(
                    "median window must be a positive odd number, got {}",
                    window
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SegmenterConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_band() {
        let config = SegmenterConfig {
            min_frequency: 900.0,
            ..SegmenterConfig::default()
        };
        assert!(matches!(config.validate(), Err(SegmentError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_even_median_window() {
        let config = SegmenterConfig {
            median_window: Some(4),
            ..SegmenterConfig::default()
        };
        assert!(config.validate().is_err());

        let disabled = SegmenterConfig {
            median_window: None,
            ..SegmenterConfig::default()
        };
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn rejects_nan_threshold() {
        let config = SegmenterConfig {
            semitone_threshold: f64::NAN,
            ..SegmenterConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
