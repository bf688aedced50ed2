//! Both sides of one note, and the whole song

use std::collections::BTreeMap;

use nether_nbs::{InstrumentId, NoteValue, PresenceTimelines};
use rayon::prelude::*;

use crate::channel::split_channels;
use crate::error::SchemError;
use crate::packer::{Side, SidePacking, StreamId, pack_stream};
use crate::symbol::encode_symbols;

/// Left and right packings of one (instrument, note value) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPairing {
    pub left: SidePacking,
    pub right: SidePacking,
}

impl ContainerPairing {
    /// Number of sides holding containers (0, 1 or 2)
    pub fn present_sides(&self) -> usize {
        usize::from(self.left.is_present()) + usize::from(self.right.is_present())
    }

    pub fn side(&self, side: Side) -> &SidePacking {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Split, encode and pack one timeline
pub fn pack_timeline(
    instrument: InstrumentId,
    value: NoteValue,
    timeline: &[bool],
) -> Result<ContainerPairing, SchemError> {
    let channels = split_channels(timeline);
    let stream_id = |side| StreamId {
        instrument,
        value,
        side,
    };

    let left = pack_stream(&encode_symbols(&channels.left)?, stream_id(Side::Left))?;
    let right = pack_stream(&encode_symbols(&channels.right)?, stream_id(Side::Right))?;

    Ok(ContainerPairing { left, right })
}

/// Every packed pair of a song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSong {
    instruments: Vec<InstrumentId>,
    pairings: BTreeMap<(InstrumentId, NoteValue), ContainerPairing>,
}

impl PackedSong {
    /// Instruments in ascending order, one schematic row each
    pub fn instruments(&self) -> &[InstrumentId] {
        &self.instruments
    }

    pub fn get(&self, instrument: InstrumentId, value: NoteValue) -> Option<&ContainerPairing> {
        self.pairings.get(&(instrument, value))
    }

    /// Iterate as `((instrument, value), pairing)` in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (&(InstrumentId, NoteValue), &ContainerPairing)> {
        self.pairings.iter()
    }

    pub fn len(&self) -> usize {
        self.pairings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }
}

/// Pack every timeline of a song
///
/// Pairs are packed in parallel. The first failing pair aborts the whole
/// song, so there is never partial output.
pub fn pack_song(timelines: &PresenceTimelines) -> Result<PackedSong, SchemError> {
    let entries: Vec<_> = timelines.iter().collect();

    let packed: Result<Vec<_>, SchemError> = entries
        .par_iter()
        .map(|&(instrument, value, timeline)| {
            pack_timeline(instrument, value, timeline).map(|pairing| ((instrument, value), pairing))
        })
        .collect();
    let pairings: BTreeMap<_, _> = packed?.into_iter().collect();

    for ((instrument, value), pairing) in &pairings {
        tracing::debug!(
            instrument,
            value,
            sides = pairing.present_sides(),
            left_outers = pairing.left.outers().len(),
            right_outers = pairing.right.outers().len(),
            "Packed note"
        );
    }

    Ok(PackedSong {
        instruments: timelines.instruments().collect(),
        pairings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::Slot;
    use nether_nbs::{NbsHeader, NbsSong, NoteEvent};

    const T: bool = true;
    const F: bool = false;

    fn first_slots(packing: &SidePacking) -> &[Slot] {
        packing.outers()[0].inners()[0].slots()
    }

    #[test]
    fn test_end_to_end_two_notes() {
        let header = NbsHeader {
            tick_length: 8,
            layer_count: 1,
            ..NbsHeader::default()
        };
        let mut song = NbsSong::new(header);
        song.notes.insert(0, 0, NoteEvent::new(0, 33)).unwrap();
        song.notes.insert(0, 5, NoteEvent::new(0, 33)).unwrap();

        let timelines = PresenceTimelines::from_song(&song).unwrap();
        assert_eq!(timelines.get(0, 0), Some(&[T, F, F, F, F, T, F, F][..]));

        let packed = pack_song(&timelines).unwrap();
        assert_eq!(packed.instruments(), &[0]);
        assert_eq!(packed.len(), 1);

        let pairing = packed.get(0, 0).unwrap();
        assert_eq!(pairing.present_sides(), 2);
        assert_eq!(pairing.left.outers().len(), 1);
        assert_eq!(pairing.left.outers()[0].len(), 1);
        assert_eq!(first_slots(&pairing.left), &[Slot::Symbol(15)]);
        assert_eq!(first_slots(&pairing.right), &[Slot::Symbol(3)]);
    }

    #[test]
    fn test_even_ticks_only_leaves_right_missing() {
        let pairing = pack_timeline(1, 4, &[T, F, F, F, T, F, F, F]).unwrap();
        assert_eq!(pairing.present_sides(), 1);
        assert!(pairing.left.is_present());
        assert_eq!(pairing.right, SidePacking::Missing);
        assert_eq!(pairing.side(Side::Right), &SidePacking::Missing);
    }

    #[test]
    fn test_silent_timeline_has_no_sides() {
        let pairing = pack_timeline(0, 0, &[F; 12]).unwrap();
        assert_eq!(pairing.present_sides(), 0);
    }

    #[test]
    fn test_overflow_names_the_stream() {
        // A note every other tick on the right side: each window encodes to
        // a non-zero symbol, 1459 windows need 1459 slots
        let timeline: Vec<bool> = (0..1459 * 8).map(|t| t % 2 == 1).collect();
        match pack_timeline(5, 12, &timeline) {
            Err(SchemError::TooManyContainers { stream, slots }) => {
                assert_eq!(stream.instrument, 5);
                assert_eq!(stream.value, 12);
                assert_eq!(stream.side, Side::Right);
                assert_eq!(slots, 1459);
            }
            other => panic!("expected TooManyContainers, got {other:?}"),
        }
    }

    #[test]
    fn test_pack_song_is_ordered() {
        let header = NbsHeader {
            tick_length: 4,
            layer_count: 3,
            ..NbsHeader::default()
        };
        let mut song = NbsSong::new(header);
        song.notes.insert(0, 0, NoteEvent::new(7, 40)).unwrap();
        song.notes.insert(1, 1, NoteEvent::new(2, 57)).unwrap();
        song.notes.insert(2, 2, NoteEvent::new(2, 33)).unwrap();

        let packed = pack_song(&PresenceTimelines::from_song(&song).unwrap()).unwrap();
        assert_eq!(packed.instruments(), &[2, 7]);
        let keys: Vec<_> = packed.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![(2, 0), (2, 24), (7, 7)]);
    }
}
