//! Per-instrument, per-note presence timelines

use std::collections::BTreeMap;

use crate::error::NbsError;
use crate::song::NbsSong;
use crate::{InstrumentId, KEY_OFFSET, MAX_NOTE_VALUE, NOTE_VALUE_COUNT, NoteValue};

/// Map a raw note key to a note value, if a note block can play it
pub fn note_value_from_key(key: u8) -> Option<NoteValue> {
    key.checked_sub(KEY_OFFSET).filter(|&v| v <= MAX_NOTE_VALUE)
}

/// Boolean timelines keyed by instrument, then note value
///
/// `true` at index `t` means the (instrument, note value) pair sounds at tick
/// `t`. All timelines have the same length. All-false timelines are never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceTimelines {
    tick_length: usize,
    tracks: BTreeMap<InstrumentId, BTreeMap<NoteValue, Vec<bool>>>,
}

impl PresenceTimelines {
    /// Derive timelines from a decoded song
    ///
    /// Fails with [`NbsError::NoteOutOfRange`] on the first note a note block
    /// cannot play.
    pub fn from_song(song: &NbsSong) -> Result<Self, NbsError> {
        let tick_length = song.tick_count();

        let mut scratch: BTreeMap<InstrumentId, Vec<Vec<bool>>> = BTreeMap::new();
        for (_, _, event) in song.notes.events() {
            scratch
                .entry(event.instrument)
                .or_insert_with(|| vec![vec![false; tick_length]; NOTE_VALUE_COUNT]);
        }

        for (_, tick, event) in song.notes.events() {
            let value = note_value_from_key(event.key).ok_or(NbsError::NoteOutOfRange {
                key: event.key,
                instrument: event.instrument,
                tick,
            })?;
            if let Some(timelines) = scratch.get_mut(&event.instrument) {
                timelines[value as usize][tick] = true;
            }
        }

        let tracks = scratch
            .into_iter()
            .map(|(instrument, timelines)| {
                let kept = timelines
                    .into_iter()
                    .enumerate()
                    .filter(|(_, timeline)| timeline.iter().any(|&b| b))
                    .map(|(value, timeline)| (value as NoteValue, timeline))
                    .collect::<BTreeMap<_, _>>();
                (instrument, kept)
            })
            .filter(|(_, kept)| !kept.is_empty())
            .collect();

        Ok(Self {
            tick_length,
            tracks,
        })
    }

    /// Length of every timeline in ticks
    pub fn tick_length(&self) -> usize {
        self.tick_length
    }

    /// Instrument ids that have at least one timeline, ascending
    pub fn instruments(&self) -> impl Iterator<Item = InstrumentId> + '_ {
        self.tracks.keys().copied()
    }

    /// Timeline of one (instrument, note value) pair
    pub fn get(&self, instrument: InstrumentId, value: NoteValue) -> Option<&[bool]> {
        self.tracks
            .get(&instrument)?
            .get(&value)
            .map(Vec::as_slice)
    }

    /// Iterate as `(instrument, value, timeline)`, ordered by instrument then value
    pub fn iter(&self) -> impl Iterator<Item = (InstrumentId, NoteValue, &[bool])> + '_ {
        self.tracks.iter().flat_map(|(&instrument, values)| {
            values
                .iter()
                .map(move |(&value, timeline)| (instrument, value, timeline.as_slice()))
        })
    }

    /// Number of stored timelines
    pub fn len(&self) -> usize {
        self.tracks.values().map(BTreeMap::len).sum()
    }

    /// True if the song had no playable notes
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Render a timeline as `X` (event) and `.` (silence)
pub fn render_timeline(timeline: &[bool]) -> String {
    timeline.iter().map(|&b| if b { 'X' } else { '.' }).collect()
}
