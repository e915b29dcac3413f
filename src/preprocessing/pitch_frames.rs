use std::{error::Error, fs, path::Path};

use tracing::debug;

use crate::constants::FALLBACK_HOP_SECONDS;
use crate::error::SegmentError;

/// One timestamped pitch estimate from the tracker. A frequency of 0 Hz (or
/// below) marks an unvoiced frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchFrame {
    pub time: f64,
    pub frequency: f64,
}

/// Parse tracker output where each line is `<time_seconds> <frequency_hz>`.
///
/// Lines that do not start with two finite numbers are skipped.
pub fn parse_pitch_frames(text: &str) -> Vec<PitchFrame> {
    let mut skipped = 0;
    let frames: Vec<PitchFrame> = text
        .lines()
        .filter_map(|line| {
            let frame = parse_line(line);
            if frame.is_none() && !line.trim().is_empty() {
                skipped += 1;
            }
            frame
        })
        .collect();

    if skipped > 0 {
        debug!("Skipped {} malformed pitch lines", skipped);
    }

    frames
}

fn parse_line(line: &str) -> Option<PitchFrame> {
    let mut tokens = line.split_whitespace();
    let time = tokens.next()?.parse::<f64>().ok()?;
    let frequency = tokens.next()?.parse::<f64>().ok()?;

    if !time.is_finite() || !frequency.is_finite() {
        return None;
    }

    Some(PitchFrame { time, frequency })
}

pub fn read_pitch_frames<P: AsRef<Path>>(path: P) -> Result<Vec<PitchFrame>, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_pitch_frames(&text))
}

/// Time between consecutive frames, taken from the first two frames.
pub fn hop_duration(frames: &[PitchFrame]) -> f64 {
    match frames {
        [first, second, ..] => second.time - first.time,
        _ => FALLBACK_HOP_SECONDS,
    }
}

/// Fail on frame times that are not finite or not strictly increasing.
pub fn check_monotonic(frames: &[PitchFrame]) -> Result<(), SegmentError> {
    if let Some(first) = frames.first() {
        if !first.time.is_finite() {
            return Err(SegmentError::NonMonotonicTime {
                index: 0,
                previous: f64::NEG_INFINITY,
                current: first.time,
            });
        }
    }

    for (i, pair) in frames.windows(2).enumerate() {
        let (previous, current) = (pair[0].time, pair[1].time);
        if !current.is_finite() || current <= previous {
            return Err(SegmentError::NonMonotonicTime {
                index: i + 1,
                previous,
                current,
            });
        }
    }

    Ok(())
}
