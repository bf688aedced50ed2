//! NBS file parser

use std::io::Cursor;

use crate::error::NbsError;
use crate::song::{NbsHeader, NbsSong, NoteEvent, NoteGrid};
use crate::{MAX_VANILLA_INSTRUMENT, NBS_MARKER};

mod helpers;
#[cfg(test)]
mod tests;

use helpers::{read_flag, read_i16, read_i32, read_string, read_u8};

/// Options that affect how the note grid is sized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Ticks added after the declared song length
    ///
    /// Some writers store the index of the last tick instead of the length;
    /// such songs need one extra tick or their final notes are out of range.
    pub extra_ticks: u16,
}

/// Parse an NBS file with default options
///
/// # Arguments
/// * `data` - Raw NBS file bytes
///
/// # Returns
/// * `Ok(NbsSong)` - Header and note grid
/// * `Err(NbsError)` - Parse error
pub fn parse_nbs(data: &[u8]) -> Result<NbsSong, NbsError> {
    parse_nbs_with(data, DecodeOptions::default())
}

/// Parse an NBS file
///
/// Reads the header, then the sparse note section. Layer and custom
/// instrument sections after the notes are ignored.
pub fn parse_nbs_with(data: &[u8], options: DecodeOptions) -> Result<NbsSong, NbsError> {
    let mut cursor = Cursor::new(data);

    let marker = read_i16(&mut cursor, "format marker")?;
    if marker != NBS_MARKER {
        return Err(NbsError::FormatMismatch(marker));
    }

    let header = parse_header(&mut cursor)?;

    if header.tick_length < 0 {
        return Err(NbsError::NegativeDimension {
            field: "song tick length",
            value: header.tick_length,
        });
    }
    if header.layer_count < 0 {
        return Err(NbsError::NegativeDimension {
            field: "layer count",
            value: header.layer_count,
        });
    }

    tracing::debug!(
        version = header.version,
        vanilla_instruments = header.vanilla_instrument_count,
        tick_length = header.tick_length,
        layers = header.layer_count,
        "NBS header"
    );
    tracing::debug!(
        name = %header.name,
        author = %header.author,
        original_author = %header.original_author,
        description = %header.description,
        "Song info"
    );
    tracing::debug!(
        tempo = header.ticks_per_second(),
        auto_save = header.auto_save,
        auto_save_duration = header.auto_save_duration,
        time_signature = %format_args!("{}/4", header.time_signature),
        minutes_spent = header.minutes_spent,
        left_clicks = header.left_clicks,
        right_clicks = header.right_clicks,
        blocks_added = header.blocks_added,
        blocks_removed = header.blocks_removed,
        import = %header.import_name,
        looping = header.looping,
        max_loops = header.max_loops,
        loop_start = header.loop_start_tick,
        "Song settings"
    );

    let ticks = header.tick_length as usize + options.extra_ticks as usize;
    let layers = header.layer_count as usize;
    let mut notes = NoteGrid::new(ticks, layers);
    let skipped_custom = parse_notes(&mut cursor, &mut notes)?;

    if skipped_custom > 0 {
        tracing::debug!(count = skipped_custom, "Skipped custom instrument notes");
    }

    Ok(NbsSong {
        header,
        notes,
        skipped_custom,
    })
}

/// Parse the header fields after the format marker
fn parse_header(cursor: &mut Cursor<&[u8]>) -> Result<NbsHeader, NbsError> {
    let version = read_u8(cursor, "version")?;
    let vanilla_instrument_count = read_u8(cursor, "vanilla instrument count")?;
    let tick_length = read_i16(cursor, "song tick length")?;
    let layer_count = read_i16(cursor, "layer count")?;

    let name = read_string(cursor, "song name")?;
    let author = read_string(cursor, "song author")?;
    let original_author = read_string(cursor, "original author")?;
    let description = read_string(cursor, "song description")?;

    let tempo = read_i16(cursor, "tempo")?;
    let auto_save = read_flag(cursor, "auto-save flag")?;
    let auto_save_duration = read_u8(cursor, "auto-save duration")?;
    let time_signature = read_u8(cursor, "time signature")?;

    let minutes_spent = read_i32(cursor, "minutes spent")?;
    let left_clicks = read_i32(cursor, "left clicks")?;
    let right_clicks = read_i32(cursor, "right clicks")?;
    let blocks_added = read_i32(cursor, "blocks added")?;
    let blocks_removed = read_i32(cursor, "blocks removed")?;

    let import_name = read_string(cursor, "import file name")?;

    let looping = read_flag(cursor, "loop flag")?;
    let max_loops = read_u8(cursor, "max loop count")?;
    let loop_start_tick = read_i16(cursor, "loop start tick")?;

    Ok(NbsHeader {
        version,
        vanilla_instrument_count,
        tick_length,
        layer_count,
        name,
        author,
        original_author,
        description,
        tempo,
        auto_save,
        auto_save_duration,
        time_signature,
        minutes_spent,
        left_clicks,
        right_clicks,
        blocks_added,
        blocks_removed,
        import_name,
        looping,
        max_loops,
        loop_start_tick,
    })
}

/// Parse the sparse note section into the grid
///
/// Returns the number of notes skipped for using a custom instrument.
fn parse_notes(cursor: &mut Cursor<&[u8]>, notes: &mut NoteGrid) -> Result<usize, NbsError> {
    let mut tick: i64 = -1;
    let mut skipped = 0;

    loop {
        let tick_jump = read_i16(cursor, "tick jump")?;
        if tick_jump == 0 {
            break;
        }
        tick += tick_jump as i64;

        let mut layer: i64 = -1;
        loop {
            let layer_jump = read_i16(cursor, "layer jump")?;
            if layer_jump == 0 {
                break;
            }
            layer += layer_jump as i64;

            let event = parse_note(cursor)?;
            if event.instrument > MAX_VANILLA_INSTRUMENT {
                skipped += 1;
                continue;
            }

            notes.insert(layer, tick, event)?;
        }
    }

    Ok(skipped)
}

/// Parse one note record (instrument, key, velocity, panning, pitch)
pub(crate) fn parse_note(cursor: &mut Cursor<&[u8]>) -> Result<NoteEvent, NbsError> {
    let instrument = read_u8(cursor, "note instrument")?;
    let key = read_u8(cursor, "note key")?;
    let velocity = read_u8(cursor, "note velocity")?;
    let panning = read_u8(cursor, "note panning")?;
    let pitch = read_i16(cursor, "note pitch")?;

    Ok(NoteEvent {
        instrument,
        key,
        velocity,
        panning,
        pitch,
    })
}
