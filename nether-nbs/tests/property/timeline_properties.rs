use std::collections::{BTreeMap, BTreeSet};

use nether_nbs::{NbsHeader, NbsSong, NoteEvent, PresenceTimelines, parse_nbs};
use proptest::prelude::*;

/// (layer, tick, instrument, key) with keys inside the note block range
fn events() -> impl Strategy<Value = Vec<(usize, usize, u8, u8)>> {
    prop::collection::vec((0usize..6, 0usize..200, 0u8..16, 33u8..=57), 0..120)
}

fn build_song(events: &[(usize, usize, u8, u8)]) -> NbsSong {
    let mut song = NbsSong::new(NbsHeader {
        tick_length: 200,
        layer_count: 6,
        ..Default::default()
    });
    for &(layer, tick, instrument, key) in events {
        song.notes
            .insert(layer as i64, tick as i64, NoteEvent::new(instrument, key))
            .unwrap();
    }
    song
}

proptest! {
    #[test]
    fn timelines_mark_exactly_the_event_ticks(events in events()) {
        let song = build_song(&events);
        let decoded = parse_nbs(&song.to_bytes().unwrap()).unwrap();
        let timelines = PresenceTimelines::from_song(&decoded).unwrap();

        // Later inserts on the same cell replace earlier ones
        let mut cells = BTreeMap::new();
        for &(layer, tick, instrument, key) in &events {
            cells.insert((layer, tick), (instrument, key));
        }
        let expected: BTreeSet<(u8, u8, usize)> = cells
            .iter()
            .map(|(&(_, tick), &(instrument, key))| (instrument, key - 33, tick))
            .collect();

        let mut actual = BTreeSet::new();
        for (instrument, value, timeline) in timelines.iter() {
            prop_assert_eq!(timeline.len(), 200);
            prop_assert!(timeline.iter().any(|&b| b), "all-false timeline was kept");
            for (tick, _) in timeline.iter().enumerate().filter(|(_, b)| **b) {
                actual.insert((instrument, value, tick));
            }
        }
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn decoded_grid_matches_written_grid(events in events()) {
        let song = build_song(&events);
        let decoded = parse_nbs(&song.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(decoded.notes, song.notes);
    }
}
