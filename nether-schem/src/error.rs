//! Error types for packing and schematic writing

use std::io;

use thiserror::Error;

use crate::packer::StreamId;

/// Errors that can occur while packing timelines or writing a schematic
#[derive(Debug, Error)]
pub enum SchemError {
    /// An internal lookup received a value outside its domain
    #[error("Internal invariant violated: {0}")]
    FatalInvariant(String),

    /// A symbol stream needs more slots than a double chest holds
    #[error(
        "Too many notes for {stream}: {slots} item slots needed, but a double chest holds {}",
        crate::MAX_OUTER_PER_STREAM * crate::SLOTS_PER_OUTER
    )]
    TooManyContainers { stream: StreamId, slots: usize },

    /// A layout position is outside the schematic
    #[error("Position ({x}, {y}, {z}) is outside the {width}×{height}×{length} schematic")]
    OutOfBounds {
        x: usize,
        y: usize,
        z: usize,
        width: usize,
        height: usize,
        length: usize,
    },

    /// A list tag mixes element types
    #[error("NBT list of {expected} cannot hold a {found}")]
    MixedList {
        expected: &'static str,
        found: &'static str,
    },

    /// A palette override is unusable
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A decoded NBT document is malformed
    #[error("Malformed NBT: {0}")]
    MalformedNbt(String),

    /// Timeline decoding failed
    #[error(transparent)]
    Nbs(#[from] nether_nbs::NbsError),

    /// IO error while writing
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
