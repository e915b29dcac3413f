use std::{error::Error, fs, path::{Path, PathBuf}};

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use config::SegmenterConfig;
use constants::{DEFAULT_BPM, DEFAULT_OUTPUT_PATH, RENDER_SAMPLE_RATE};
use postprocessing::{
    midi::generate_midi_file_data,
    note_events::segment_notes,
    note_list::{read_note_list, to_records, write_note_list, NoteRecord},
    render::write_preview,
    summary::summarize,
};
use preprocessing::{
    aubio::{track_pitch, TrackerOptions},
    load_audio::probe_audio,
    pitch_frames::{read_pitch_frames, PitchFrame},
};

pub mod config;
pub mod constants;
pub mod error;
pub mod preprocessing {
    pub mod aubio;
    pub mod load_audio;
    pub mod pitch_frames;
}
pub mod postprocessing {
    pub mod helpers {
        pub mod median;
        pub mod pitch;
    }
    pub mod midi;
    pub mod note_events;
    pub mod note_list;
    pub mod render;
    pub mod summary;
}

#[derive(Parser)]
#[command(name = "speech-flute")]
#[command(about = "Turn a speech pitch contour into quantized flute notes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track the pitch of a WAV file with aubio and group it into notes
    Analyze {
        /// Input WAV file
        #[arg(default_value = "samples/bobEdwards.wav")]
        input: PathBuf,

        /// Output note list (JSON)
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        #[command(flatten)]
        tracker: TrackerArgs,

        #[command(flatten)]
        segmenter: SegmenterArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Group a saved pitch track ("<time> <hz>" per line) into notes
    Segment {
        /// Pitch track text file
        frames: PathBuf,

        /// Output note list (JSON)
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        #[command(flatten)]
        segmenter: SegmenterArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Convert a note list to a MIDI file
    Midi {
        /// Note list (JSON)
        notes: PathBuf,

        /// Output MIDI file
        #[arg(short, long, default_value = "speech-flute.mid")]
        output: PathBuf,

        /// Tempo used to map seconds to ticks
        #[arg(long, default_value_t = DEFAULT_BPM)]
        bpm: u32,
    },

    /// Render a note list to a WAV preview with a sine flute voice
    Render {
        /// Note list (JSON)
        notes: PathBuf,

        /// Output WAV file
        #[arg(short, long, default_value = "speech-flute.wav")]
        output: PathBuf,

        #[arg(long, default_value_t = RENDER_SAMPLE_RATE)]
        sample_rate: u32,
    },
}

#[derive(Args)]
struct TrackerArgs {
    /// Pitch tracker executable
    #[arg(long, default_value = "aubio")]
    aubio: String,

    /// Tracker hop size in samples
    #[arg(long, default_value_t = constants::AUBIO_HOP_SIZE)]
    hop_size: usize,

    /// Tracker buffer size in samples
    #[arg(long, default_value_t = constants::AUBIO_BUFFER_SIZE)]
    buffer_size: usize,

    /// Tracker pitch detection method
    #[arg(long, default_value = constants::AUBIO_METHOD)]
    method: String,
}

impl From<TrackerArgs> for TrackerOptions {
    fn from(args: TrackerArgs) -> Self {
        TrackerOptions {
            program: args.aubio,
            hop_size: args.hop_size,
            buffer_size: args.buffer_size,
            method: args.method,
        }
    }
}

#[derive(Args)]
struct SegmenterArgs {
    /// Frames below this frequency are silence (Hz)
    #[arg(long, default_value_t = constants::MIN_FREQUENCY_HZ)]
    min_freq: f64,

    /// Frames above this frequency are noise (Hz)
    #[arg(long, default_value_t = constants::MAX_FREQUENCY_HZ)]
    max_freq: f64,

    /// Max semitone distance from a note's first frame to extend it
    #[arg(long, default_value_t = constants::SEMITONE_THRESHOLD)]
    semitone_threshold: f64,

    /// Median filter width in frames (odd)
    #[arg(long, default_value_t = constants::MEDIAN_WINDOW)]
    median_window: usize,

    /// Skip median smoothing
    #[arg(long)]
    no_median: bool,

    /// Notes shorter than this are dropped (seconds)
    #[arg(long, default_value_t = constants::MIN_NOTE_DURATION_SECONDS)]
    min_duration: f64,
}

impl From<SegmenterArgs> for SegmenterConfig {
    fn from(args: SegmenterArgs) -> Self {
        SegmenterConfig {
            min_frequency: args.min_freq,
            max_frequency: args.max_freq,
            semitone_threshold: args.semitone_threshold,
            median_window: (!args.no_median).then_some(args.median_window),
            min_note_duration: args.min_duration,
        }
    }
}

#[derive(Args)]
struct ExportArgs {
    /// Also write the notes as a MIDI file
    #[arg(long)]
    midi: Option<PathBuf>,

    /// Also render the notes to a WAV preview
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Tempo for the MIDI export
    #[arg(long, default_value_t = DEFAULT_BPM)]
    bpm: u32,
}

fn segment_and_write(
    frames: &[PitchFrame],
    config: &SegmenterConfig,
    output: &Path,
    export: &ExportArgs,
) -> Result<Vec<NoteRecord>, Box<dyn Error>> {
    info!("Parsed {} frames", frames.len());
    if let Some(window) = config.median_window {
        info!("Applying median filter (window={})", window);
    }

    let notes = segment_notes(frames, config)?;
    let records = to_records(&notes);

    match summarize(&records) {
        Some(summary) => info!("Grouped into {}", summary),
        None => warn!("No notes found"),
    }

    write_note_list(output, &records)?;
    info!("Written to {}", output.display());

    if let Some(path) = &export.midi {
        write_midi(&records, path, export.bpm)?;
    }
    if let Some(path) = &export.preview {
        write_preview(path, &records, RENDER_SAMPLE_RATE)?;
        info!("Preview written to {}", path.display());
    }

    Ok(records)
}

fn write_midi(records: &[NoteRecord], path: &Path, bpm: u32) -> Result<(), Box<dyn Error>> {
    let midi_buffer = generate_midi_file_data(records, bpm)?;
    fs::write(path, midi_buffer)?;
    info!("MIDI written to {}", path.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { input, output, tracker, segmenter, export } => {
            let audio = probe_audio(&input)?;
            info!(
                "Input {}: {} Hz, {} channel(s), {}-bit, {:.2}s",
                input.display(),
                audio.sample_rate,
                audio.channels,
                audio.bits_per_sample,
                audio.duration_seconds
            );

            let frames = track_pitch(&input, &tracker.into())?;
            let records = segment_and_write(&frames, &segmenter.into(), &output, &export)?;

            if let Some(summary) = summarize(&records) {
                if summary.end_time > audio.duration_seconds + 0.1 {
                    warn!(
                        "Notes end at {:.3}s, past the end of the audio ({:.3}s)",
                        summary.end_time, audio.duration_seconds
                    );
                }
            }
        }
        Commands::Segment { frames, output, segmenter, export } => {
            let frames = read_pitch_frames(&frames)?;
            segment_and_write(&frames, &segmenter.into(), &output, &export)?;
        }
        Commands::Midi { notes, output, bpm } => {
            let records = read_note_list(&notes)?;
            write_midi(&records, &output, bpm)?;
        }
        Commands::Render { notes, output, sample_rate } => {
            let records = read_note_list(&notes)?;
            write_preview(&output, &records, sample_rate)?;
            info!("Preview written to {}", output.display());
        }
    }

    Ok(())
}
