//! NBS song data structures

use std::collections::{BTreeMap, BTreeSet};

use crate::error::NbsError;

/// Song header (everything before the note section)
///
/// Only `tick_length` and `layer_count` influence decoding; the rest is
/// carried as metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NbsHeader {
    /// NBS format version
    pub version: u8,
    /// Number of vanilla instruments the song was saved with
    pub vanilla_instrument_count: u8,
    /// Song length in ticks
    pub tick_length: i16,
    /// Number of layers (tracks)
    pub layer_count: i16,
    /// Song name
    pub name: String,
    /// Song author
    pub author: String,
    /// Original song author
    pub original_author: String,
    /// Song description
    pub description: String,
    /// Tempo in ticks per second × 100
    pub tempo: i16,
    /// Auto-saving enabled
    pub auto_save: bool,
    /// Auto-save interval in minutes
    pub auto_save_duration: u8,
    /// Time signature numerator (x/4)
    pub time_signature: u8,
    /// Minutes spent editing
    pub minutes_spent: i32,
    /// Left clicks while editing
    pub left_clicks: i32,
    /// Right clicks while editing
    pub right_clicks: i32,
    /// Note blocks added while editing
    pub blocks_added: i32,
    /// Note blocks removed while editing
    pub blocks_removed: i32,
    /// File name of an imported MIDI or schematic
    pub import_name: String,
    /// Looping enabled
    pub looping: bool,
    /// Max loop count (0 = infinite)
    pub max_loops: u8,
    /// Tick the loop restarts from
    pub loop_start_tick: i16,
}

impl Default for NbsHeader {
    fn default() -> Self {
        Self {
            version: 5,
            vanilla_instrument_count: crate::VANILLA_INSTRUMENT_COUNT as u8,
            tick_length: 0,
            layer_count: 0,
            name: String::new(),
            author: String::new(),
            original_author: String::new(),
            description: String::new(),
            tempo: 1000,
            auto_save: false,
            auto_save_duration: 10,
            time_signature: 4,
            minutes_spent: 0,
            left_clicks: 0,
            right_clicks: 0,
            blocks_added: 0,
            blocks_removed: 0,
            import_name: String::new(),
            looping: false,
            max_loops: 0,
            loop_start_tick: 0,
        }
    }
}

impl NbsHeader {
    /// Tempo in ticks per second
    pub fn ticks_per_second(&self) -> f32 {
        self.tempo as f32 / 100.0
    }
}

/// A single decoded note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteEvent {
    /// Instrument id (0-15 vanilla; custom instruments never reach the grid)
    pub instrument: u8,
    /// Raw key (33 = F#3, 57 = F#5)
    pub key: u8,
    /// Velocity in percent (unused downstream)
    pub velocity: u8,
    /// Panning, 100 = center (unused downstream)
    pub panning: u8,
    /// Fine pitch in cents (unused downstream)
    pub pitch: i16,
}

impl NoteEvent {
    /// Create an event with default velocity, panning and pitch
    pub fn new(instrument: u8, key: u8) -> Self {
        Self {
            instrument,
            key,
            velocity: 100,
            panning: 100,
            pitch: 0,
        }
    }
}

/// Fixed-size layer × tick grid of optional note events
///
/// The dimensions come from the header and never change; writes outside the
/// grid fail instead of growing it. Only occupied cells are stored, so a
/// header declaring the maximum size costs nothing until notes arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGrid {
    ticks: usize,
    layers: usize,
    rows: Vec<BTreeMap<usize, NoteEvent>>,
}

impl NoteGrid {
    /// Create an empty grid
    pub fn new(ticks: usize, layers: usize) -> Self {
        Self {
            ticks,
            layers,
            rows: vec![BTreeMap::new(); layers],
        }
    }

    /// Number of ticks per layer
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Number of layers
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Store an event, replacing whatever was at that cell
    ///
    /// Cursor values are signed because the decoder's running cursors start
    /// at -1 and jumps may be negative.
    pub fn insert(&mut self, layer: i64, tick: i64, event: NoteEvent) -> Result<(), NbsError> {
        let tick = usize::try_from(tick)
            .ok()
            .filter(|&t| t < self.ticks)
            .ok_or(NbsError::TickOutOfRange {
                tick,
                length: self.ticks,
            })?;
        let row = usize::try_from(layer)
            .ok()
            .and_then(|l| self.rows.get_mut(l))
            .ok_or(NbsError::LayerOutOfRange {
                layer,
                tick,
                count: self.layers,
            })?;

        row.insert(tick, event);
        Ok(())
    }

    /// Get the event at a layer and tick
    pub fn get(&self, layer: usize, tick: usize) -> Option<&NoteEvent> {
        self.rows.get(layer)?.get(&tick)
    }

    /// Iterate over all events as `(layer, tick, event)`, layer by layer
    pub fn events(&self) -> impl Iterator<Item = (usize, usize, &NoteEvent)> + '_ {
        self.rows.iter().enumerate().flat_map(|(layer, row)| {
            row.iter().map(move |(&tick, event)| (layer, tick, event))
        })
    }

    /// Number of stored events
    pub fn event_count(&self) -> usize {
        self.rows.iter().map(BTreeMap::len).sum()
    }
}

/// Decoded NBS song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NbsSong {
    /// Header metadata
    pub header: NbsHeader,
    /// Layer × tick note grid
    pub notes: NoteGrid,
    /// Notes skipped because they use a custom instrument
    pub skipped_custom: usize,
}

impl NbsSong {
    /// Create a song with an empty grid sized from the header
    pub fn new(header: NbsHeader) -> Self {
        let ticks = header.tick_length.max(0) as usize;
        let layers = header.layer_count.max(0) as usize;
        Self {
            header,
            notes: NoteGrid::new(ticks, layers),
            skipped_custom: 0,
        }
    }

    /// Number of ticks in every timeline derived from this song
    pub fn tick_count(&self) -> usize {
        self.notes.ticks()
    }

    /// Summary statistics over all decoded notes
    pub fn stats(&self) -> SongStats {
        let mut stats = SongStats::default();
        let mut unique = BTreeSet::new();

        for (_, _, event) in self.notes.events() {
            stats.events += 1;
            stats.lowest_key = Some(stats.lowest_key.map_or(event.key, |k| k.min(event.key)));
            stats.highest_key = Some(stats.highest_key.map_or(event.key, |k| k.max(event.key)));
            unique.insert((event.key, event.instrument));
        }

        stats.unique_notes = unique.len();
        stats
    }
}

/// Summary statistics of a decoded song
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SongStats {
    /// Number of decoded (non-custom) events
    pub events: usize,
    /// Lowest raw key
    pub lowest_key: Option<u8>,
    /// Highest raw key
    pub highest_key: Option<u8>,
    /// Number of distinct (key, instrument) combinations
    pub unique_notes: usize,
}

impl SongStats {
    /// Number of distinct keys between lowest and highest, inclusive
    pub fn key_range(&self) -> usize {
        match (self.lowest_key, self.highest_key) {
            (Some(lo), Some(hi)) => (hi - lo) as usize + 1,
            _ => 0,
        }
    }

    /// Lowest key relative to [`KEY_OFFSET`](crate::KEY_OFFSET)
    pub fn lowest_value(&self) -> Option<i16> {
        self.lowest_key.map(key_value)
    }

    /// Highest key relative to [`KEY_OFFSET`](crate::KEY_OFFSET)
    pub fn highest_value(&self) -> Option<i16> {
        self.highest_key.map(key_value)
    }
}

// Signed: keys below the offset are reported, not rejected, here
fn key_value(key: u8) -> i16 {
    i16::from(key) - i16::from(crate::KEY_OFFSET)
}

/// Pitch-class name of a note value (0 = F#)
pub fn note_name(value: u8) -> &'static str {
    const NAMES: [&str; 12] = [
        "F#", "G", "G#", "A", "A#", "B", "C", "C#", "D", "D#", "E", "F",
    ];
    NAMES[value as usize % 12]
}
