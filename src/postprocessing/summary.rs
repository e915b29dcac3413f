use std::fmt;

use super::note_list::NoteRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct NoteSummary {
    pub note_count: usize,
    /// End of the last note, in seconds.
    pub end_time: f64,
    pub min_freq: f64,
    pub max_freq: f64,
}

/// Summarize a note list, or `None` when it is empty.
pub fn summarize(records: &[NoteRecord]) -> Option<NoteSummary> {
    let last = records.last()?;

    let (min_freq, max_freq) = records
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| (lo.min(r.freq), hi.max(r.freq)));

    Some(NoteSummary {
        note_count: records.len(),
        end_time: last.time + last.duration,
        min_freq,
        max_freq,
    })
}

impl fmt::Display for NoteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} notes, time range 0 - {:.3}s, frequency range {} - {} Hz",
            self.note_count, self.end_time, self.min_freq, self.max_freq
        )
    }
}
