//! Tests for the NBS parser

use super::*;
use crate::song::NbsHeader;

/// Build header bytes (marker included) with empty strings
fn header_bytes(tick_length: i16, layer_count: i16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0i16.to_le_bytes()); // marker
    data.push(5); // version
    data.push(16); // vanilla instrument count
    data.extend_from_slice(&tick_length.to_le_bytes());
    data.extend_from_slice(&layer_count.to_le_bytes());
    for _ in 0..4 {
        data.extend_from_slice(&0u32.to_le_bytes()); // name, author, original author, description
    }
    data.extend_from_slice(&1000i16.to_le_bytes()); // tempo
    data.extend_from_slice(&[0, 10, 4]); // auto-save, duration, time signature
    for _ in 0..5 {
        data.extend_from_slice(&0i32.to_le_bytes()); // statistics
    }
    data.extend_from_slice(&0u32.to_le_bytes()); // import name
    data.extend_from_slice(&[0, 0]); // loop, max loops
    data.extend_from_slice(&0i16.to_le_bytes()); // loop start
    data
}

fn push_jump(data: &mut Vec<u8>, jump: i16) {
    data.extend_from_slice(&jump.to_le_bytes());
}

fn push_note(data: &mut Vec<u8>, instrument: u8, key: u8) {
    data.extend_from_slice(&[instrument, key, 100, 100]);
    data.extend_from_slice(&0i16.to_le_bytes());
}

#[test]
fn test_parse_invalid_marker() {
    let mut data = header_bytes(8, 1);
    data[0] = 0x20;
    assert_eq!(parse_nbs(&data), Err(NbsError::FormatMismatch(0x20)));
}

#[test]
fn test_parse_too_small() {
    assert_eq!(
        parse_nbs(&[0]),
        Err(NbsError::BufferUnderrun {
            what: "format marker",
            offset: 0
        })
    );
}

#[test]
fn test_parse_truncated_header() {
    let data = header_bytes(8, 1);
    let result = parse_nbs(&data[..20]);
    assert!(matches!(result, Err(NbsError::BufferUnderrun { .. })));
}

#[test]
fn test_parse_string_overrun() {
    let mut data = header_bytes(8, 1);
    // Song name claims 200 bytes
    data[8..12].copy_from_slice(&200u32.to_le_bytes());
    assert_eq!(
        parse_nbs(&data),
        Err(NbsError::BufferUnderrun {
            what: "song name",
            offset: 12
        })
    );
}

#[test]
fn test_parse_missing_note_section() {
    let data = header_bytes(8, 1);
    assert_eq!(
        parse_nbs(&data),
        Err(NbsError::BufferUnderrun {
            what: "tick jump",
            offset: data.len() as u64
        })
    );
}

#[test]
fn test_parse_negative_dimensions() {
    let mut data = header_bytes(-3, 1);
    push_jump(&mut data, 0);
    assert_eq!(
        parse_nbs(&data),
        Err(NbsError::NegativeDimension {
            field: "song tick length",
            value: -3
        })
    );

    let mut data = header_bytes(4, -1);
    push_jump(&mut data, 0);
    assert!(matches!(
        parse_nbs(&data),
        Err(NbsError::NegativeDimension { value: -1, .. })
    ));
}

#[test]
fn test_parse_empty_song() {
    let mut data = header_bytes(8, 2);
    push_jump(&mut data, 0);

    let song = parse_nbs(&data).unwrap();
    assert_eq!(song.tick_count(), 8);
    assert_eq!(song.notes.layers(), 2);
    assert_eq!(song.notes.event_count(), 0);
}

#[test]
fn test_parse_maximal_dimensions_without_notes() {
    let mut data = header_bytes(i16::MAX, i16::MAX);
    push_jump(&mut data, 0);

    let song = parse_nbs(&data).unwrap();
    assert_eq!(song.tick_count(), i16::MAX as usize);
    assert_eq!(song.notes.layers(), i16::MAX as usize);
    assert_eq!(song.notes.event_count(), 0);
}

#[test]
fn test_parse_maximal_dimensions_last_cell() {
    let mut data = header_bytes(i16::MAX, i16::MAX);
    push_jump(&mut data, i16::MAX); // tick 32766
    push_jump(&mut data, i16::MAX); // layer 32766
    push_note(&mut data, 2, 45);
    push_jump(&mut data, 0);
    push_jump(&mut data, 0);

    let song = parse_nbs(&data).unwrap();
    let last = i16::MAX as usize - 1;
    assert_eq!(song.notes.get(last, last).map(|e| e.key), Some(45));
    assert_eq!(song.notes.event_count(), 1);
}

#[test]
fn test_parse_two_notes() {
    // Tick cursor starts at -1: a jump of 1 lands on tick 0, then +5 on tick 5
    let mut data = header_bytes(8, 1);
    push_jump(&mut data, 1);
    push_jump(&mut data, 1);
    push_note(&mut data, 0, 33);
    push_jump(&mut data, 0);
    push_jump(&mut data, 5);
    push_jump(&mut data, 1);
    push_note(&mut data, 0, 33);
    push_jump(&mut data, 0);
    push_jump(&mut data, 0);

    let song = parse_nbs(&data).unwrap();
    let events: Vec<_> = song.notes.events().map(|(l, t, e)| (l, t, e.key)).collect();
    assert_eq!(events, vec![(0, 0, 33), (0, 5, 33)]);
}

#[test]
fn test_parse_layer_cursor_resets_per_tick() {
    let mut data = header_bytes(4, 3);
    push_jump(&mut data, 2); // tick 1
    push_jump(&mut data, 1); // layer 0
    push_note(&mut data, 1, 40);
    push_jump(&mut data, 2); // layer 2
    push_note(&mut data, 2, 41);
    push_jump(&mut data, 0);
    push_jump(&mut data, 1); // tick 2
    push_jump(&mut data, 2); // layer 1
    push_note(&mut data, 3, 42);
    push_jump(&mut data, 0);
    push_jump(&mut data, 0);

    let song = parse_nbs(&data).unwrap();
    assert_eq!(song.notes.get(0, 1).map(|e| e.instrument), Some(1));
    assert_eq!(song.notes.get(2, 1).map(|e| e.instrument), Some(2));
    assert_eq!(song.notes.get(1, 2).map(|e| e.instrument), Some(3));
    assert_eq!(song.notes.event_count(), 3);
}

#[test]
fn test_parse_skips_custom_instruments() {
    let mut data = header_bytes(4, 2);
    push_jump(&mut data, 1);
    push_jump(&mut data, 1);
    push_note(&mut data, 16, 45);
    push_jump(&mut data, 1);
    push_note(&mut data, 15, 45);
    push_jump(&mut data, 0);
    push_jump(&mut data, 0);

    let song = parse_nbs(&data).unwrap();
    assert_eq!(song.skipped_custom, 1);
    assert_eq!(song.notes.event_count(), 1);
    assert_eq!(song.notes.get(1, 0).map(|e| e.instrument), Some(15));
}

#[test]
fn test_parse_tick_out_of_range() {
    // Tick 4 in a 4-tick song
    let mut data = header_bytes(4, 1);
    push_jump(&mut data, 5);
    push_jump(&mut data, 1);
    push_note(&mut data, 0, 33);
    push_jump(&mut data, 0);
    push_jump(&mut data, 0);

    assert_eq!(
        parse_nbs(&data),
        Err(NbsError::TickOutOfRange { tick: 4, length: 4 })
    );

    // One extra tick makes room for it
    let song = parse_nbs_with(&data, DecodeOptions { extra_ticks: 1 }).unwrap();
    assert_eq!(song.tick_count(), 5);
    assert!(song.notes.get(0, 4).is_some());
}

#[test]
fn test_parse_layer_out_of_range() {
    let mut data = header_bytes(4, 1);
    push_jump(&mut data, 1);
    push_jump(&mut data, 2);
    push_note(&mut data, 0, 33);
    push_jump(&mut data, 0);
    push_jump(&mut data, 0);

    assert_eq!(
        parse_nbs(&data),
        Err(NbsError::LayerOutOfRange {
            layer: 1,
            tick: 0,
            count: 1
        })
    );
}

#[test]
fn test_parse_truncated_note() {
    let mut data = header_bytes(4, 1);
    push_jump(&mut data, 1);
    push_jump(&mut data, 1);
    data.extend_from_slice(&[0, 33, 100]);

    assert!(matches!(
        parse_nbs(&data),
        Err(NbsError::BufferUnderrun {
            what: "note panning",
            ..
        })
    ));
}

#[test]
fn test_header_metadata() {
    let header = NbsHeader {
        tick_length: 32,
        layer_count: 2,
        name: "Wet Hands".to_string(),
        author: "someone".to_string(),
        description: "two lines\nof text".to_string(),
        tempo: 500,
        minutes_spent: 12,
        looping: true,
        loop_start_tick: 8,
        ..Default::default()
    };
    let bytes = NbsSong::new(header.clone()).to_bytes().unwrap();

    let song = parse_nbs(&bytes).unwrap();
    assert_eq!(song.header, header);
    assert_eq!(song.header.ticks_per_second(), 5.0);
}

#[test]
fn test_writer_output_parses() {
    let mut song = NbsSong::new(NbsHeader {
        tick_length: 20,
        layer_count: 3,
        ..Default::default()
    });
    song.notes.insert(2, 0, NoteEvent::new(1, 33)).unwrap();
    song.notes.insert(0, 7, NoteEvent::new(4, 57)).unwrap();
    song.notes.insert(1, 7, NoteEvent::new(4, 50)).unwrap();
    song.notes.insert(0, 19, NoteEvent::new(15, 40)).unwrap();

    let parsed = parse_nbs(&song.to_bytes().unwrap()).unwrap();
    assert_eq!(parsed.notes, song.notes);
}
