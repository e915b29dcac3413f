use std::error::Error;

use midly::num::{u15, u24, u28, u4, u7};
use midly::Format;
use midly::Header;
use midly::MetaMessage;
use midly::MidiMessage;
use midly::Smf;
use midly::Timing;
use midly::Track;
use midly::TrackEvent;
use midly::TrackEventKind;

use crate::constants::{MIDI_VELOCITY, TICKS_PER_BEAT};

use super::helpers::pitch::quantize_hz;
use super::note_list::NoteRecord;

const MAX_MICROS_PER_BEAT: u32 = 0xFF_FFFF;

#[derive(Debug, Clone)]
struct TrackEventAbsolute<'a> {
    tick: u32,
    kind: TrackEventKind<'a>,
}

fn note_key(freq: f64) -> u7 {
    let (midi, _) = quantize_hz(freq);
    u7::new(midi.clamp(0.0, 127.0) as u8)
}

fn seconds_to_tick(seconds: f64, ticks_per_second: f64) -> u32 {
    (seconds.max(0.0) * ticks_per_second).round() as u32
}

/// Build delta-timed NoteOn/NoteOff events for a note list.
///
/// Events at the same tick are ordered with NoteOff first, so back-to-back
/// notes at one pitch do not cut each other off.
pub fn generate_ordered_midi_events(notes: &[NoteRecord], ticks_per_second: f64) -> Vec<TrackEvent<'static>> {
    let channel = u4::new(0);
    let vel = u7::new(MIDI_VELOCITY);

    let mut track_events_absolute: Vec<TrackEventAbsolute> = vec![];
    for note in notes {
        let key = note_key(note.freq);
        let start_tick = seconds_to_tick(note.time, ticks_per_second);
        let end_tick = seconds_to_tick(note.time + note.duration, ticks_per_second).max(start_tick);

        track_events_absolute.push(TrackEventAbsolute {
            tick: start_tick,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel },
            },
        });
        track_events_absolute.push(TrackEventAbsolute {
            tick: end_tick,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff { key, vel },
            },
        });
    }

    track_events_absolute.sort_by_key(|event| {
        let is_note_on = matches!(event.kind, TrackEventKind::Midi { message: MidiMessage::NoteOn { .. }, .. });
        (event.tick, is_note_on)
    });

    let mut previous_tick = 0;
    track_events_absolute
        .into_iter()
        .map(|event| {
            let delta = event.tick - previous_tick;
            previous_tick = event.tick;
            TrackEvent {
                delta: u28::new(delta),
                kind: event.kind,
            }
        })
        .collect()
}

/// Generate Standard MIDI File data from a note list.
///
/// # Arguments
///
/// * `notes` - Notes with onset and duration in seconds.
/// * `beats_per_minute` - Tempo used to map seconds onto ticks.
///
/// # Returns
///
/// * The bytes of a single-track MIDI file.
pub fn generate_midi_file_data(notes: &[NoteRecord], beats_per_minute: u32) -> Result<Vec<u8>, Box<dyn Error>> {
    // the tempo meta event stores microseconds per beat in 24 bits
    let micros_per_beat = match 60_000_000u32.checked_div(beats_per_minute) {
        Some(micros) if (1..=MAX_MICROS_PER_BEAT).contains(&micros) => micros,
        _ => {
            return Err(format!(
                "tempo must be between {} and 60000000 BPM, got {}",
                60_000_000 / MAX_MICROS_PER_BEAT + 1,
                beats_per_minute
            )
            .into())
        }
    };

    let timing = Timing::Metrical(u15::new(TICKS_PER_BEAT));
    let ticks_per_second = TICKS_PER_BEAT as f64 * beats_per_minute as f64 / 60.0;

    let mut smf = Smf::new(Header {
        format: Format::SingleTrack,
        timing,
    });
    let mut track = Track::new();

    // Set tempo to match the BPM
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros_per_beat))),
    });

    track.extend(generate_ordered_midi_events(notes, ticks_per_second));

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    smf.tracks.push(track);

    let mut buffer = Vec::new();
    smf.write_std(&mut buffer)?;

    Ok(buffer)
}
