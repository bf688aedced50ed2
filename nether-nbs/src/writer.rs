//! NBS writer
//!
//! Encodes a song back into the format `parse_nbs` reads: header, sparse
//! note section, and empty layer / custom instrument sections. Used to build
//! test songs and to normalize files.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::NBS_MARKER;
use crate::song::{NbsHeader, NbsSong, NoteEvent};

/// Writer for the NBS format
pub struct NbsWriter<W: Write> {
    writer: W,
}

impl<W: Write> NbsWriter<W> {
    /// Create a new NBS writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the writer and return the underlying output
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write a complete song
    pub fn write_song(&mut self, song: &NbsSong) -> io::Result<()> {
        self.writer.write_i16::<LittleEndian>(NBS_MARKER)?;
        self.write_header(&song.header)?;
        self.write_notes(song)?;

        // Layer section: one entry per layer (name, lock, volume, stereo)
        for _ in 0..song.notes.layers() {
            self.write_string("")?;
            self.writer.write_u8(0)?;
            self.writer.write_u8(100)?;
            self.writer.write_u8(100)?;
        }

        // No custom instruments
        self.writer.write_u8(0)?;
        Ok(())
    }

    fn write_header(&mut self, header: &NbsHeader) -> io::Result<()> {
        self.writer.write_u8(header.version)?;
        self.writer.write_u8(header.vanilla_instrument_count)?;
        self.writer.write_i16::<LittleEndian>(header.tick_length)?;
        self.writer.write_i16::<LittleEndian>(header.layer_count)?;

        self.write_string(&header.name)?;
        self.write_string(&header.author)?;
        self.write_string(&header.original_author)?;
        self.write_string(&header.description)?;

        self.writer.write_i16::<LittleEndian>(header.tempo)?;
        self.writer.write_u8(header.auto_save as u8)?;
        self.writer.write_u8(header.auto_save_duration)?;
        self.writer.write_u8(header.time_signature)?;

        self.writer.write_i32::<LittleEndian>(header.minutes_spent)?;
        self.writer.write_i32::<LittleEndian>(header.left_clicks)?;
        self.writer.write_i32::<LittleEndian>(header.right_clicks)?;
        self.writer.write_i32::<LittleEndian>(header.blocks_added)?;
        self.writer.write_i32::<LittleEndian>(header.blocks_removed)?;

        self.write_string(&header.import_name)?;

        self.writer.write_u8(header.looping as u8)?;
        self.writer.write_u8(header.max_loops)?;
        self.writer.write_i16::<LittleEndian>(header.loop_start_tick)?;
        Ok(())
    }

    /// Write notes tick by tick as delta jumps
    fn write_notes(&mut self, song: &NbsSong) -> io::Result<()> {
        let grid = &song.notes;
        let mut last_tick: i64 = -1;

        for tick in 0..grid.ticks() {
            let mut last_layer: i64 = -1;

            for layer in 0..grid.layers() {
                let Some(event) = grid.get(layer, tick) else {
                    continue;
                };

                if last_layer == -1 {
                    self.write_jump(tick as i64 - last_tick)?;
                    last_tick = tick as i64;
                }
                self.write_jump(layer as i64 - last_layer)?;
                last_layer = layer as i64;
                self.write_note(event)?;
            }

            if last_layer != -1 {
                self.writer.write_i16::<LittleEndian>(0)?;
            }
        }

        self.writer.write_i16::<LittleEndian>(0)?;
        Ok(())
    }

    fn write_jump(&mut self, jump: i64) -> io::Result<()> {
        let jump = i16::try_from(jump)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "jump exceeds i16"))?;
        self.writer.write_i16::<LittleEndian>(jump)
    }

    fn write_note(&mut self, event: &NoteEvent) -> io::Result<()> {
        self.writer.write_u8(event.instrument)?;
        self.writer.write_u8(event.key)?;
        self.writer.write_u8(event.velocity)?;
        self.writer.write_u8(event.panning)?;
        self.writer.write_i16::<LittleEndian>(event.pitch)
    }

    fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.writer.write_u32::<LittleEndian>(value.len() as u32)?;
        self.writer.write_all(value.as_bytes())
    }
}

impl NbsSong {
    /// Encode the song into NBS bytes
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut writer = NbsWriter::new(Vec::new());
        writer.write_song(self)?;
        Ok(writer.into_inner())
    }
}
