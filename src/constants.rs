// Pitch tracking (aubio)
pub const AUBIO_HOP_SIZE: usize = 512;
pub const AUBIO_BUFFER_SIZE: usize = 2048;
pub const AUBIO_METHOD: &str = "yinfft";
pub const FALLBACK_HOP_SECONDS: f64 = 0.012;

// Segmentation
pub const MIN_FREQUENCY_HZ: f64 = 50.0;
pub const MAX_FREQUENCY_HZ: f64 = 800.0;
pub const SEMITONE_THRESHOLD: f64 = 3.0;
pub const MEDIAN_WINDOW: usize = 7;
pub const MIN_NOTE_DURATION_SECONDS: f64 = 0.06;

// Tuning
pub const A4_HZ: f64 = 440.0;
pub const A4_MIDI: f64 = 69.0;

// MIDI Conversion
pub const TICKS_PER_BEAT: u16 = 480;
pub const DEFAULT_BPM: u32 = 120;
pub const MIDI_VELOCITY: u8 = 100;

// Preview rendering
pub const RENDER_SAMPLE_RATE: u32 = 44100;
pub const MAX_RENDER_SECONDS: f64 = 3600.0;
pub const FLUTE_ATTACK: f64 = 0.05;
pub const FLUTE_RELEASE: f64 = 0.15;
pub const FLUTE_MIN_DURATION: f64 = 0.05;
pub const FLUTE_MIN_SUSTAIN: f64 = 0.01;
pub const FLUTE_AMP: f64 = 0.3;
pub const FLUTE_DETUNE_RATIO: f64 = 1.003;
pub const FLUTE_DETUNE_AMP: f64 = 0.15;

pub const DEFAULT_OUTPUT_PATH: &str = "speech-flute-pitch.json";
