use nether_schem::{
    INNERS_PER_OUTER, MAX_FILLER_RUN, MAX_OUTER_PER_STREAM, SLOTS_PER_INNER, SLOTS_PER_OUTER,
    SchemError, Side, SidePacking, Slot, StreamId, Symbol, encode_symbols, interleave,
    pack_stream, split_channels, symbol_for_window, window_for_symbol,
};
use proptest::prelude::*;

const ID: StreamId = StreamId {
    instrument: 1,
    value: 2,
    side: Side::Left,
};

/// Streams that are mostly silence, like real songs
fn streams() -> impl Strategy<Value = Vec<Symbol>> {
    let symbol = prop_oneof![6 => Just(0u8), 1 => 1u8..16];
    prop::collection::vec(symbol, 0..4000)
}

/// Expand packed slots back into the symbol stream
fn unpack(packing: &SidePacking) -> Vec<Symbol> {
    let mut stream = Vec::new();
    for outer in packing.outers() {
        for inner in outer.inners() {
            for slot in inner.slots() {
                match *slot {
                    Slot::Symbol(symbol) => stream.push(symbol),
                    Slot::Filler { count, .. } => {
                        stream.extend(std::iter::repeat_n(0, count as usize))
                    }
                }
            }
        }
    }
    stream
}

proptest! {
    #[test]
    fn symbol_table_is_a_bijection(window in 0u8..16) {
        let symbol = symbol_for_window(window).unwrap();
        prop_assert!(symbol < 16);
        prop_assert_eq!(window_for_symbol(symbol), Some(window));
    }

    #[test]
    fn split_channels_is_reversible(timeline in prop::collection::vec(any::<bool>(), 0..300)) {
        let split = split_channels(&timeline);
        prop_assert_eq!(split.left.len(), split.right.len());
        prop_assert_eq!(split.left.len() % 4, 0);
        prop_assert_eq!(interleave(&split.left, &split.right, timeline.len()), timeline);
    }

    #[test]
    fn encoded_windows_decode_to_ticks(timeline in prop::collection::vec(any::<bool>(), 0..300)) {
        let split = split_channels(&timeline);
        let symbols = encode_symbols(&split.left).unwrap();
        let mut ticks = Vec::new();
        for symbol in symbols {
            let window = window_for_symbol(symbol).unwrap();
            ticks.extend((0..4).rev().map(|bit| (window >> bit) & 1 == 1));
        }
        prop_assert_eq!(ticks, split.left);
    }

    #[test]
    fn packing_respects_capacity(stream in streams()) {
        match pack_stream(&stream, ID) {
            Ok(SidePacking::Missing) => {
                prop_assert!(stream.iter().all(|&s| s == 0));
            }
            Ok(packing @ SidePacking::Present(_)) => {
                prop_assert!(stream.iter().any(|&s| s != 0));

                let outers = packing.outers();
                prop_assert!(!outers.is_empty());
                prop_assert!(outers.len() <= MAX_OUTER_PER_STREAM);
                for outer in outers {
                    prop_assert!(!outer.is_empty());
                    prop_assert!(outer.len() <= INNERS_PER_OUTER);
                    for inner in outer.inners() {
                        prop_assert!(!inner.is_empty());
                        prop_assert!(inner.len() <= SLOTS_PER_INNER);
                        for slot in inner.slots() {
                            match *slot {
                                Slot::Symbol(symbol) => prop_assert!((1..16).contains(&symbol)),
                                Slot::Filler { identity, count } => {
                                    prop_assert!(identity < 16);
                                    prop_assert!(count >= 1 && count <= MAX_FILLER_RUN);
                                }
                            }
                        }
                    }
                }

                prop_assert_eq!(unpack(&packing), stream);
            }
            Err(SchemError::TooManyContainers { stream: id, slots }) => {
                prop_assert_eq!(id, ID);
                prop_assert!(slots > MAX_OUTER_PER_STREAM * SLOTS_PER_OUTER);
                prop_assert!(stream.len() >= slots);
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }
}
