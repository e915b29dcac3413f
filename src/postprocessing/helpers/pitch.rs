/* EQUAL TEMPERAMENT CONVERSIONS */

use crate::constants::{A4_HZ, A4_MIDI};

/// Converts a frequency in Hz to the corresponding (real-valued) MIDI pitch.
///
/// # Arguments
///
/// * `hz` - A frequency in Hz.
///
/// # Returns
///
/// * The corresponding MIDI pitch, or 0 for non-positive frequencies.
pub fn hz_to_midi(hz: f64) -> f64 {
    if hz <= 0.0 {
        return 0.0;
    }
    12.0 * (hz / A4_HZ).log2() + A4_MIDI
}

/// Converts a MIDI pitch to the corresponding frequency in Hz.
///
/// # Arguments
///
/// * `midi` - A MIDI pitch.
///
/// # Returns
///
/// * The corresponding frequency in Hz.
pub fn midi_to_hz(midi: f64) -> f64 {
    A4_HZ * 2.0f64.powf((midi - A4_MIDI) / 12.0)
}

/// Snaps a frequency to the nearest semitone of 12-tone equal temperament.
///
/// # Returns
///
/// * A pair of the nearest whole MIDI pitch and its frequency in Hz.
pub fn quantize_hz(hz: f64) -> (f64, f64) {
    let midi = hz_to_midi(hz).round();
    (midi, midi_to_hz(midi))
}
