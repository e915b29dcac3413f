use std::borrow::Cow;

use tracing::debug;

use crate::config::SegmenterConfig;
use crate::error::SegmentError;
use crate::preprocessing::pitch_frames::{check_monotonic, hop_duration, PitchFrame};

use super::helpers::{median::median_filter, pitch::{hz_to_midi, quantize_hz}};

#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub onset: f64,
    /// Mean frequency snapped to the nearest equal-tempered semitone.
    pub frequency: f64,
    pub duration: f64,
    /// Mean frequency of the note's frames before quantization.
    pub mean_frequency: f64,
}

/// The note currently being extended by the scan.
#[derive(Debug, Clone)]
struct ActiveNote {
    start: f64,
    end: f64,
    /// MIDI pitch of the first frame; never updated while the note is open.
    reference_midi: f64,
    frequency_sum: f64,
    frame_count: usize,
}

impl ActiveNote {
    fn open(frame: &PitchFrame) -> Self {
        ActiveNote {
            start: frame.time,
            end: frame.time,
            reference_midi: hz_to_midi(frame.frequency),
            frequency_sum: frame.frequency,
            frame_count: 1,
        }
    }

    fn extend(&mut self, frame: &PitchFrame) {
        self.end = frame.time;
        self.frequency_sum += frame.frequency;
        self.frame_count += 1;
    }

    /// Close the note, returning `None` when it is too short to keep.
    fn finalize(self, hop: f64, min_duration: f64) -> Option<NoteEvent> {
        // the last frame's timestamp marks its start, so add one hop
        let duration = self.end - self.start + hop;
        if duration < min_duration {
            return None;
        }

        let mean_frequency = self.frequency_sum / self.frame_count as f64;
        let (_, frequency) = quantize_hz(mean_frequency);

        Some(NoteEvent {
            onset: self.start,
            frequency,
            duration,
            mean_frequency,
        })
    }
}

enum ScanState {
    Idle,
    Accumulating(ActiveNote),
}

fn is_voiced(frequency: f64, config: &SegmenterConfig) -> bool {
    frequency > 0.0 && frequency >= config.min_frequency && frequency <= config.max_frequency
}

/// Group a pitch track into discrete, quantized note events.
///
/// # Arguments
///
/// * `frames` - Pitch frames with strictly increasing times and a uniform hop.
/// * `config` - Segmenter tuning parameters.
///
/// # Returns
///
/// * Note events in onset order. Silence and out-of-band regions produce none.
pub fn segment_notes(
    frames: &[PitchFrame],
    config: &SegmenterConfig,
) -> Result<Vec<NoteEvent>, SegmentError> {
    config.validate()?;
    check_monotonic(frames)?;

    let hop = hop_duration(frames);
    let frames: Cow<[PitchFrame]> = match config.median_window {
        Some(window) => Cow::Owned(median_filter(frames, window)),
        None => Cow::Borrowed(frames),
    };

    let mut notes = Vec::new();
    let mut discarded = 0;
    let mut close = |note: ActiveNote, notes: &mut Vec<NoteEvent>| {
        match note.finalize(hop, config.min_note_duration) {
            Some(event) => notes.push(event),
            None => discarded += 1,
        }
    };

    let mut state = ScanState::Idle;
    for frame in frames.iter() {
        state = match (state, is_voiced(frame.frequency, config)) {
            (ScanState::Accumulating(mut note), true)
                if (hz_to_midi(frame.frequency) - note.reference_midi).abs()
                    < config.semitone_threshold =>
            {
                note.extend(frame);
                ScanState::Accumulating(note)
            }
            (ScanState::Accumulating(note), true) => {
                close(note, &mut notes);
                ScanState::Accumulating(ActiveNote::open(frame))
            }
            (ScanState::Idle, true) => ScanState::Accumulating(ActiveNote::open(frame)),
            (ScanState::Accumulating(note), false) => {
                close(note, &mut notes);
                ScanState::Idle
            }
            (ScanState::Idle, false) => ScanState::Idle,
        };
    }

    if let ScanState::Accumulating(note) = state {
        close(note, &mut notes);
    }

    debug!("Discarded {} notes shorter than {}s", discarded, config.min_note_duration);

    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOP: f64 = 0.012;

    fn track(freqs: &[f64]) -> Vec<PitchFrame> {
        freqs
            .iter()
            .enumerate()
            .map(|(i, &frequency)| PitchFrame { time: i as f64 * HOP, frequency })
            .collect()
    }

    fn unsmoothed(min_note_duration: f64) -> SegmenterConfig {
        SegmenterConfig {
            median_window: None,
            min_note_duration,
            ..SegmenterConfig::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn steady_pitch_becomes_one_note() {
        let notes = segment_notes(&track(&[440.0; 10]), &unsmoothed(0.04)).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].onset, 0.0);
        assert!(approx(notes[0].frequency, 440.0));
        assert!(approx(notes[0].duration, 0.12));
        assert_eq!(hz_to_midi(notes[0].frequency).round(), 69.0);
    }

    #[test]
    fn large_jump_splits_notes() {
        let mut freqs = vec![440.0; 5];
        freqs.extend(vec![660.0; 5]);

        for config in [unsmoothed(0.04), SegmenterConfig { min_note_duration: 0.04, ..SegmenterConfig::default() }] {
            let notes = segment_notes(&track(&freqs), &config).unwrap();
            assert_eq!(notes.len(), 2);
            assert_eq!(notes[0].onset, 0.0);
            assert!(approx(notes[1].onset, 5.0 * HOP));
            assert!(approx(notes[0].duration, 5.0 * HOP));
            assert!(approx(notes[1].duration, 5.0 * HOP));
            assert!(approx(notes[0].frequency, 440.0));
            // 660 Hz sits just above E5 (659.26 Hz)
            assert_eq!(hz_to_midi(notes[1].frequency).round(), 76.0);
        }
    }

    #[test]
    fn short_run_is_rejected() {
        let freqs = [0.0, 0.0, 300.0, 300.0, 0.0, 0.0];
        let notes = segment_notes(&track(&freqs), &unsmoothed(0.04)).unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn silence_yields_no_notes() {
        for len in [0, 1, 2, 50] {
            let frames = track(&vec![0.0; len]);
            let notes = segment_notes(&frames, &SegmenterConfig::default()).unwrap();
            assert!(notes.is_empty());
        }
    }

    #[test]
    fn out_of_band_frames_are_unvoiced() {
        let mut freqs = vec![30.0; 10];
        freqs.extend(vec![1200.0; 10]);
        let notes = segment_notes(&track(&freqs), &unsmoothed(0.0)).unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn single_frame_uses_fallback_hop() {
        let frames = [PitchFrame { time: 2.0, frequency: 220.0 }];
        let notes = segment_notes(&frames, &unsmoothed(0.01)).unwrap();
        assert_eq!(notes.len(), 1);
        assert!(approx(notes[0].duration, 0.012));

        let notes = segment_notes(&frames, &unsmoothed(0.04)).unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn reference_pitch_does_not_follow_glide() {
        // Rises 1.1 semitones per frame; every frame is within 3 semitones of
        // its predecessor but the note still splits against its first pitch.
        let freqs: Vec<f64> = (0..8).map(|i| 220.0 * 2f64.powf(i as f64 * 1.1 / 12.0)).collect();
        let notes = segment_notes(&track(&freqs), &unsmoothed(0.0)).unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].onset, 0.0);
        assert!(approx(notes[1].onset, 3.0 * HOP));
        assert!(approx(notes[2].onset, 6.0 * HOP));
    }

    #[test]
    fn threshold_distance_is_exclusive() {
        // An octave is exactly 12 semitones, so a threshold of 12 must split it
        let mut freqs = vec![440.0; 5];
        freqs.extend(vec![880.0; 5]);
        let config = SegmenterConfig {
            max_frequency: 1000.0,
            semitone_threshold: 12.0,
            ..unsmoothed(0.04)
        };
        let notes = segment_notes(&track(&freqs), &config).unwrap();
        assert_eq!(notes.len(), 2);

        let wider = SegmenterConfig { semitone_threshold: 12.5, ..config };
        let notes = segment_notes(&track(&freqs), &wider).unwrap();
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn noisy_frame_near_reference_is_absorbed() {
        let mut freqs = vec![200.0; 10];
        freqs[5] = 200.0 * 2f64.powf(2.5 / 12.0);
        let notes = segment_notes(&track(&freqs), &unsmoothed(0.04)).unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].mean_frequency > 200.0);
    }

    #[test]
    fn unvoiced_gap_closes_note() {
        let mut freqs = vec![300.0; 6];
        freqs.extend(vec![0.0; 3]);
        freqs.extend(vec![300.0; 6]);
        let notes = segment_notes(&track(&freqs), &unsmoothed(0.04)).unwrap();
        assert_eq!(notes.len(), 2);
        assert!(approx(notes[1].onset, 9.0 * HOP));
    }

    #[test]
    fn median_filter_bridges_single_dropout() {
        let mut freqs = vec![300.0; 12];
        freqs[6] = 0.0;
        let notes = segment_notes(&track(&freqs), &SegmenterConfig::default()).unwrap();
        assert_eq!(notes.len(), 1);
        assert!(approx(notes[0].duration, 12.0 * HOP));
    }

    #[test]
    fn invariants_hold_on_noisy_track() {
        let config = SegmenterConfig { min_note_duration: 0.05, ..SegmenterConfig::default() };
        // Deterministic pseudo-random contour mixing silence, noise and speech-range pitches
        let freqs: Vec<f64> = (0..600u64)
            .map(|i| {
                let x = i.wrapping_mul(2654435761) % 1000;
                match (i / 17) % 4 {
                    0 => 0.0,
                    1 => 120.0 + (x % 40) as f64,
                    2 => 40.0 + x as f64,
                    _ => 180.0 + ((i % 30) as f64) * 4.0,
                }
            })
            .collect();

        let notes = segment_notes(&track(&freqs), &config).unwrap();
        assert!(!notes.is_empty());
        for pair in notes.windows(2) {
            assert!(pair[0].onset <= pair[1].onset);
        }
        for note in &notes {
            assert!(note.duration >= config.min_note_duration);
            assert!(note.mean_frequency >= config.min_frequency);
            assert!(note.mean_frequency <= config.max_frequency);
        }
    }

    #[test]
    fn rejects_non_monotonic_times() {
        let mut frames = track(&[200.0; 4]);
        frames[2].time = 0.0;
        assert!(matches!(
            segment_notes(&frames, &SegmenterConfig::default()),
            Err(SegmentError::NonMonotonicTime { index: 2, .. })
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let config = SegmenterConfig { semitone_threshold: 0.0, ..SegmenterConfig::default() };
        assert!(matches!(
            segment_notes(&track(&[200.0; 4]), &config),
            Err(SegmentError::InvalidConfig(_))
        ));
    }
}
