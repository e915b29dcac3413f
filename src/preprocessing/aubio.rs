use std::{error::Error, path::Path, process::Command};

use tracing::{debug, info};

use crate::constants::{AUBIO_BUFFER_SIZE, AUBIO_HOP_SIZE, AUBIO_METHOD};

use super::pitch_frames::{parse_pitch_frames, PitchFrame};

/// Settings for the external `aubio pitch` tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerOptions {
    pub program: String,
    pub hop_size: usize,
    pub buffer_size: usize,
    pub method: String,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            program: "aubio".to_string(),
            // 512 samples is ~86 frames/sec at 44.1 kHz
            hop_size: AUBIO_HOP_SIZE,
            buffer_size: AUBIO_BUFFER_SIZE,
            method: AUBIO_METHOD.to_string(),
        }
    }
}

impl TrackerOptions {
    fn command(&self, audio_path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("pitch")
            .arg("-i")
            .arg(audio_path)
            .arg("-H")
            .arg(self.hop_size.to_string())
            .arg("-B")
            .arg(self.buffer_size.to_string())
            .arg("-m")
            .arg(&self.method);
        cmd
    }
}

/// Run the pitch tracker on an audio file and parse its output into frames.
///
/// # Arguments
///
/// * `audio_path` - Path to the audio file to analyze.
/// * `options` - Tracker program and analysis settings.
///
/// # Returns
///
/// * Pitch frames in the order the tracker printed them.
pub fn track_pitch<P: AsRef<Path>>(
    audio_path: P,
    options: &TrackerOptions,
) -> Result<Vec<PitchFrame>, Box<dyn Error>> {
    let mut cmd = options.command(audio_path.as_ref());
    info!("Running: {:?}", cmd);

    let output = cmd
        .output()
        .map_err(|e| format!("failed to run {}: {}", options.program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{} exited with {}: {}",
            options.program,
            output.status,
            stderr.trim()
        )
        .into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    debug!("Tracker produced {} bytes of output", stdout.len());

    Ok(parse_pitch_frames(&stdout))
}
