use std::{error::Error, f64::consts::TAU, path::Path};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::constants::{
    FLUTE_AMP, FLUTE_ATTACK, FLUTE_DETUNE_AMP, FLUTE_DETUNE_RATIO, FLUTE_MIN_DURATION,
    FLUTE_MIN_SUSTAIN, FLUTE_RELEASE, MAX_RENDER_SECONDS,
};

use super::note_list::NoteRecord;

/// One sine partial of the flute voice.
struct Layer {
    ratio: f64,
    amp: f64,
    attack: f64,
    release: f64,
}

static FLUTE_LAYERS: [Layer; 2] = [
    Layer { ratio: 1.0, amp: FLUTE_AMP, attack: FLUTE_ATTACK, release: FLUTE_RELEASE },
    // slightly detuned and slower for warmth
    Layer {
        ratio: FLUTE_DETUNE_RATIO,
        amp: FLUTE_DETUNE_AMP,
        attack: FLUTE_ATTACK * 1.2,
        release: FLUTE_RELEASE * 1.3,
    },
];

fn sustain_for(duration: f64) -> f64 {
    let duration = duration.max(FLUTE_MIN_DURATION);
    (duration - FLUTE_ATTACK - FLUTE_RELEASE).max(FLUTE_MIN_SUSTAIN)
}

/// Linear attack/sustain/release envelope at `t` seconds into the note.
fn envelope(t: f64, attack: f64, sustain: f64, release: f64) -> f64 {
    if t < 0.0 {
        0.0
    } else if t < attack {
        t / attack
    } else if t < attack + sustain {
        1.0
    } else if t < attack + sustain + release {
        1.0 - (t - attack - sustain) / release
    } else {
        0.0
    }
}

/// Render a note list with a two-layer sine flute voice.
///
/// # Returns
///
/// * Mono samples in [-1, 1], long enough to hold every note's release tail,
///   or an error when the notes run past `MAX_RENDER_SECONDS`.
pub fn render_notes(notes: &[NoteRecord], sample_rate: u32) -> Result<Vec<f32>, Box<dyn Error>> {
    let sr = sample_rate as f64;

    let total_seconds = notes
        .iter()
        .flat_map(|note| {
            let sustain = sustain_for(note.duration);
            FLUTE_LAYERS
                .iter()
                .map(move |layer| note.time + layer.attack + sustain + layer.release)
        })
        .fold(0.0, f64::max);

    if let Some(note) = notes
        .iter()
        .find(|n| !(n.time.is_finite() && n.freq.is_finite() && n.duration.is_finite()))
    {
        return Err(format!("note has a non-finite value: {:?}", note).into());
    }
    if total_seconds > MAX_RENDER_SECONDS {
        return Err(format!(
            "note list spans {:.3}s, longer than the {}s preview limit",
            total_seconds, MAX_RENDER_SECONDS
        )
        .into());
    }

    let mut mix = vec![0.0f64; (total_seconds * sr).ceil() as usize];

    for note in notes {
        let sustain = sustain_for(note.duration);
        let start = (note.time.max(0.0) * sr).round() as usize;

        for layer in &FLUTE_LAYERS {
            let length = ((layer.attack + sustain + layer.release) * sr).ceil() as usize;
            let freq = note.freq * layer.ratio;

            for (n, sample) in mix.iter_mut().skip(start).take(length).enumerate() {
                let t = n as f64 / sr;
                *sample += layer.amp
                    * envelope(t, layer.attack, sustain, layer.release)
                    * (TAU * freq * t).sin();
            }
        }
    }

    Ok(mix.into_iter().map(|s| s.clamp(-1.0, 1.0) as f32).collect())
}

pub fn write_preview<P: AsRef<Path>>(path: P, notes: &[NoteRecord], sample_rate: u32) -> Result<(), Box<dyn Error>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let samples = render_notes(notes, sample_rate)?;

    let mut writer = WavWriter::create(path, spec)?;
    for sample in samples {
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}
