use std::{error::Error, path::Path};

use hound::WavReader;

#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub duration_seconds: f64,
}

/// Read the header of a WAV file without decoding its samples.
pub fn probe_audio<P: AsRef<Path>>(path: P) -> Result<AudioInfo, Box<dyn Error>> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    // duration() counts samples per channel
    let duration_seconds = reader.duration() as f64 / spec.sample_rate as f64;

    Ok(AudioInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        duration_seconds,
    })
}
