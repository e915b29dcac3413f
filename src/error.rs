//! Error types for pitch contour segmentation

use std::fmt;

/// Contract violations detected while segmenting a pitch track
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentError {
    /// Frame times must be finite and strictly increasing
    NonMonotonicTime {
        /// Index of the offending frame
        index: usize,
        /// Time of the preceding frame
        previous: f64,
        /// Time of the offending frame
        current: f64,
    },

    /// Configuration values that cannot produce a meaningful segmentation
    InvalidConfig(String),
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentError::NonMonotonicTime { index, previous, current } => write!(
                f,
                "Non-monotonic frame time at index {}: {} follows {}",
                index, current, previous
            ),
            SegmentError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for SegmentError {}
