use std::{error::Error, fs, path::Path};

use serde::{Deserialize, Serialize};

use super::note_events::NoteEvent;

/// A note as persisted for the replay scripts: onset and duration in
/// milliseconds precision, frequency in centihertz precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub time: f64,
    pub freq: f64,
    pub duration: f64,
}

fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

impl From<&NoteEvent> for NoteRecord {
    fn from(note: &NoteEvent) -> Self {
        NoteRecord {
            time: round_to(note.onset, 1000.0),
            freq: round_to(note.frequency, 100.0),
            duration: round_to(note.duration, 1000.0),
        }
    }
}

pub fn to_records(notes: &[NoteEvent]) -> Vec<NoteRecord> {
    notes.iter().map(NoteRecord::from).collect()
}

pub fn write_note_list<P: AsRef<Path>>(path: P, records: &[NoteRecord]) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn read_note_list<P: AsRef<Path>>(path: P) -> Result<Vec<NoteRecord>, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let records: Vec<NoteRecord> = serde_json::from_str(&text)?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(onset: f64, frequency: f64, duration: f64) -> NoteEvent {
        NoteEvent {
            onset,
            frequency,
            duration,
            mean_frequency: frequency,
        }
    }

    #[test]
    fn rounds_to_output_precision() {
        let record = NoteRecord::from(&note(1.23456, 138.591315, 0.0696));
        assert_eq!(record, NoteRecord { time: 1.235, freq: 138.59, duration: 0.07 });
    }

    #[test]
    fn serializes_with_replay_field_names() {
        let records = to_records(&[note(0.5, 220.0, 0.25)]);
        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json, serde_json::json!([{ "time": 0.5, "freq": 220.0, "duration": 0.25 }]));
    }

    #[test]
    fn note_list_survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let records = to_records(&[note(0.0, 440.0, 0.12), note(0.3, 466.16, 0.096)]);

        write_note_list(&path, &records).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {\n    \"time\""));
        assert_eq!(read_note_list(&path).unwrap(), records);
    }

    #[test]
    fn rejects_malformed_note_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, r#"[{"time": 0.0, "freq": "high"}]"#).unwrap();
        assert!(read_note_list(&path).is_err());
    }
}
