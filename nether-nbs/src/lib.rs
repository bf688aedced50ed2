//! Nether-NBS: Note Block Studio song parser for Nethercore
//!
//! This crate decodes the Note Block Studio `.nbs` format into a fixed
//! layer × tick grid of note events, then derives one boolean presence
//! timeline per (instrument, note value) pair. Those timelines are the input
//! of the schematic packer in `nether-schem`.
//!
//! # NBS Format Overview
//!
//! NBS files contain:
//! - A two byte zero marker (old-format files put the song length here)
//! - Header with song metadata (name, author, tempo, statistics, loop info)
//! - Note section: sparse delta jumps over ticks, then over layers
//! - Layer and custom instrument sections (ignored)
//!
//! # Usage
//!
//! ```ignore
//! use nether_nbs::{parse_nbs, PresenceTimelines};
//!
//! let data = std::fs::read("song.nbs").unwrap();
//! let song = parse_nbs(&data).unwrap();
//! let timelines = PresenceTimelines::from_song(&song).unwrap();
//!
//! println!("Song: {}", song.header.name);
//! for (instrument, value, timeline) in timelines.iter() {
//!     println!("  {instrument}/{value}: {}", nether_nbs::render_timeline(timeline));
//! }
//! ```
//!
//! # Format Reference
//!
//! - <https://opennbs.org/nbs>

mod error;
mod parser;
mod song;
mod timeline;
mod writer;

pub use error::NbsError;
pub use parser::{DecodeOptions, parse_nbs, parse_nbs_with};
pub use song::{NbsHeader, NbsSong, NoteEvent, NoteGrid, SongStats, note_name};
pub use timeline::{PresenceTimelines, note_value_from_key, render_timeline};
pub use writer::NbsWriter;

// =============================================================================
// Constants
// =============================================================================

/// Value of the first two bytes of a new-format NBS file
pub const NBS_MARKER: i16 = 0;

/// Highest vanilla instrument id; anything above is a custom instrument
pub const MAX_VANILLA_INSTRUMENT: u8 = 15;

/// Number of vanilla instruments
pub const VANILLA_INSTRUMENT_COUNT: usize = MAX_VANILLA_INSTRUMENT as usize + 1;

// =============================================================================
// Note Constants
// =============================================================================

/// Raw key of the lowest note-block pitch (F#3)
pub const KEY_OFFSET: u8 = 33;

/// Number of note values a note block can play (two octaves, inclusive)
pub const NOTE_VALUE_COUNT: usize = 25;

/// Highest note value after subtracting [`KEY_OFFSET`]
pub const MAX_NOTE_VALUE: u8 = NOTE_VALUE_COUNT as u8 - 1;

// =============================================================================
// Type aliases
// =============================================================================

/// Vanilla instrument id (0-15)
pub type InstrumentId = u8;

/// Discretized pitch within the note-block range (0-24)
pub type NoteValue = u8;

// =============================================================================
// Tests
// =============================================================================
