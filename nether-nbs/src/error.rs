//! Error types for NBS parsing

use thiserror::Error;

/// Errors that can occur when decoding an NBS song
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NbsError {
    /// The first two bytes are not the new-format zero marker
    #[error("Not a compatible NBS file: format marker is {0}, expected 0")]
    FormatMismatch(i16),

    /// A fixed-width read or length-prefixed string ran past the end of the data
    #[error("Unexpected end of data at offset {offset} while reading {what}")]
    BufferUnderrun { what: &'static str, offset: u64 },

    /// Tick length or layer count in the header is negative
    #[error("Invalid {field} in header: {value}")]
    NegativeDimension { field: &'static str, value: i16 },

    /// A note landed on a tick outside the declared song length
    #[error("Note at tick {tick} is outside the song length of {length} ticks")]
    TickOutOfRange { tick: i64, length: usize },

    /// A note landed on a layer outside the declared layer count
    #[error("Note on layer {layer} (tick {tick}) is outside the {count} declared layers")]
    LayerOutOfRange { layer: i64, tick: usize, count: usize },

    /// A note key cannot be played by a note block
    #[error(
        "Note key {key} (instrument {instrument}, tick {tick}) is outside the note block range {}..={}",
        crate::KEY_OFFSET,
        crate::KEY_OFFSET + crate::MAX_NOTE_VALUE
    )]
    NoteOutOfRange { key: u8, instrument: u8, tick: usize },
}
