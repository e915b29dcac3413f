use crate::preprocessing::pitch_frames::PitchFrame;

/// Smooth a pitch track with a centered running median.
///
/// Only voiced values (finite and above 0 Hz) take part in each median, so a
/// frame inside a short dropout is filled from its neighbours, while a frame
/// with no voiced neighbours at all keeps its original value. With an even
/// number of voiced values the upper of the two middle values is taken.
///
/// # Arguments
///
/// * `frames` - Pitch frames in time order.
/// * `window_size` - Window width in frames, centered on each frame.
///
/// # Returns
///
/// * A new frame sequence with the same times and smoothed frequencies.
pub fn median_filter(frames: &[PitchFrame], window_size: usize) -> Vec<PitchFrame> {
    let half = window_size / 2;

    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(frames.len());

            let mut freqs: Vec<f64> = frames[start..end]
                .iter()
                .map(|f| f.frequency)
                .filter(|f| f.is_finite() && *f > 0.0)
                .collect();

            if freqs.is_empty() {
                return *frame;
            }

            freqs.sort_by(|a, b| a.total_cmp(b));
            PitchFrame {
                time: frame.time,
                frequency: freqs[freqs.len() / 2],
            }
        })
        .collect()
}
