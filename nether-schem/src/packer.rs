//! Symbol stream → container packing
//!
//! A stream is scanned left to right. Non-zero symbols become one slot each;
//! runs of the absent symbol are run-length compressed into filler slots of
//! at most [`MAX_FILLER_RUN`]. Slots fill inner containers of
//! [`SLOTS_PER_INNER`], inner containers fill outer containers of
//! [`INNERS_PER_OUTER`], and a stream may use at most
//! [`MAX_OUTER_PER_STREAM`] outer containers.

use std::fmt;
use std::mem;

use nether_nbs::{InstrumentId, NoteValue, note_name};

use crate::error::SchemError;
use crate::symbol::{ABSENT, Symbol};
use crate::{
    FILLER_PALETTE_SIZE, INNERS_PER_OUTER, MAX_FILLER_RUN, MAX_OUTER_PER_STREAM, SLOTS_PER_INNER,
};

/// Which sub-channel a stream came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// Even ticks
    Left,
    /// Odd ticks
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Identifies one symbol stream in error messages and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId {
    pub instrument: InstrumentId,
    pub value: NoteValue,
    pub side: Side,
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "instrument {}, note {} ({}), {} side",
            self.instrument,
            self.value,
            note_name(self.value),
            self.side
        )
    }
}

/// One item slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A non-zero symbol, stored as a single disc
    Symbol(Symbol),
    /// A run of `count` absent windows; `identity` indexes the filler palette
    Filler { identity: u8, count: u8 },
}

/// Up to [`SLOTS_PER_INNER`] slots (a shulker box)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InnerContainer {
    slots: Vec<Slot>,
}

impl InnerContainer {
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn is_full(&self) -> bool {
        self.slots.len() >= SLOTS_PER_INNER
    }
}

/// Up to [`INNERS_PER_OUTER`] inner containers (a chest)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OuterContainer {
    inners: Vec<InnerContainer>,
}

impl OuterContainer {
    pub fn inners(&self) -> &[InnerContainer] {
        &self.inners
    }

    pub fn len(&self) -> usize {
        self.inners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inners.is_empty()
    }

    /// Total slots across all inner containers
    pub fn slot_count(&self) -> usize {
        self.inners.iter().map(InnerContainer::len).sum()
    }

    fn is_full(&self) -> bool {
        self.inners.len() >= INNERS_PER_OUTER
    }
}

/// Packing result for one side of a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidePacking {
    /// The stream held no notes
    Missing,
    /// One or two outer containers
    Present(Vec<OuterContainer>),
}

impl SidePacking {
    pub fn is_present(&self) -> bool {
        matches!(self, SidePacking::Present(_))
    }

    /// Outer containers of this side; empty when missing
    pub fn outers(&self) -> &[OuterContainer] {
        match self {
            SidePacking::Missing => &[],
            SidePacking::Present(outers) => outers,
        }
    }
}

/// Scan state for a single stream
struct Packer {
    id: StreamId,
    outers: Vec<OuterContainer>,
    outer: OuterContainer,
    inner: InnerContainer,
    gap: u8,
    filler_index: usize,
}

impl Packer {
    fn new(id: StreamId) -> Self {
        Self {
            id,
            outers: Vec::with_capacity(MAX_OUTER_PER_STREAM),
            outer: OuterContainer::default(),
            inner: InnerContainer::default(),
            gap: 0,
            filler_index: 0,
        }
    }

    /// Write one slot, closing containers as they fill
    fn push(&mut self, slot: Slot, stream: &[Symbol]) -> Result<(), SchemError> {
        if self.outers.len() == MAX_OUTER_PER_STREAM {
            return Err(SchemError::TooManyContainers {
                stream: self.id,
                slots: slots_needed(stream),
            });
        }

        self.inner.slots.push(slot);
        if self.inner.is_full() {
            self.close_inner();
        }
        Ok(())
    }

    fn close_inner(&mut self) {
        if self.inner.is_empty() {
            return;
        }
        self.outer.inners.push(mem::take(&mut self.inner));
        self.filler_index = 0;

        if self.outer.is_full() {
            self.close_outer();
        }
    }

    fn close_outer(&mut self) {
        if !self.outer.is_empty() {
            self.outers.push(mem::take(&mut self.outer));
        }
    }

    /// Emit the pending gap as one filler slot
    fn flush_gap(&mut self, stream: &[Symbol]) -> Result<(), SchemError> {
        if self.gap == 0 {
            return Ok(());
        }

        let identity = (self.filler_index % FILLER_PALETTE_SIZE) as u8;
        if self.filler_index > 0 && identity == 0 {
            tracing::debug!(
                stream = %self.id,
                runs = self.filler_index,
                "Filler palette wrapped within one inner container"
            );
        }

        let count = mem::take(&mut self.gap);
        self.filler_index += 1;
        self.push(Slot::Filler { identity, count }, stream)
    }

    fn finish(mut self, stream: &[Symbol]) -> Result<Vec<OuterContainer>, SchemError> {
        self.flush_gap(stream)?;
        self.close_inner();
        self.close_outer();
        Ok(self.outers)
    }
}

/// Count the slots a stream packs into, without capacity limits
fn slots_needed(stream: &[Symbol]) -> usize {
    let mut slots = 0;
    let mut gap = 0u8;
    for &symbol in stream {
        if symbol == ABSENT {
            gap += 1;
            if gap == MAX_FILLER_RUN {
                slots += 1;
                gap = 0;
            }
        } else {
            if gap > 0 {
                slots += 1;
                gap = 0;
            }
            slots += 1;
        }
    }
    slots + usize::from(gap > 0)
}

/// Pack one symbol stream into outer containers
///
/// An all-absent (or empty) stream packs to [`SidePacking::Missing`].
/// Fails with [`SchemError::TooManyContainers`] when the stream needs more
/// than [`MAX_OUTER_PER_STREAM`] outer containers.
pub fn pack_stream(stream: &[Symbol], id: StreamId) -> Result<SidePacking, SchemError> {
    if stream.iter().all(|&symbol| symbol == ABSENT) {
        return Ok(SidePacking::Missing);
    }

    let mut packer = Packer::new(id);
    for &symbol in stream {
        if symbol == ABSENT {
            packer.gap += 1;
            if packer.gap == MAX_FILLER_RUN {
                packer.flush_gap(stream)?;
            }
        } else {
            packer.flush_gap(stream)?;
            packer.push(Slot::Symbol(symbol), stream)?;
        }
    }

    let outers = packer.finish(stream)?;
    tracing::trace!(
        stream = %id,
        outers = outers.len(),
        slots = outers.iter().map(OuterContainer::slot_count).sum::<usize>(),
        "Packed stream"
    );
    Ok(SidePacking::Present(outers))
}
