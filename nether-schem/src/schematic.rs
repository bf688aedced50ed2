//! Sponge schematic (version 3) document
//!
//! ```text
//! "" {
//!   Schematic {
//!     Version, DataVersion, Metadata { Date },
//!     Width, Height, Length, Offset,
//!     Blocks { Palette, Data, BlockEntities }
//!   }
//! }
//! ```
//!
//! Reference: <https://github.com/SpongePowered/Schematic-Specification>

use std::io::Write;

use chrono::{DateTime, Utc};

use crate::config::SchemConfig;
use crate::error::SchemError;
use crate::layout::{Cell, ChestEntity, Layout};
use crate::nbt::{self, Compound, List, Tag};
use crate::packer::InnerContainer;

/// Sponge schematic format version
pub const SCHEMATIC_VERSION: i32 = 3;

/// Paste offset relative to the player
const OFFSET: [i32; 3] = [1, 0, 0];

/// Build the schematic document for a layout
///
/// `date` stamps `Metadata.Date`; `None` uses the current time.
pub fn build_schematic(
    layout: &Layout,
    config: &SchemConfig,
    date: Option<DateTime<Utc>>,
) -> Result<Tag, SchemError> {
    config.validate()?;
    let date = date.unwrap_or_else(Utc::now);

    let mut entities = List::new();
    for chest in layout.chests() {
        entities.push(chest_entity(chest, config)?)?;
    }

    let blocks = Compound::new()
        .with("Palette", palette(config))
        .with("Data", Tag::ByteArray(block_data(layout)?))
        .with("BlockEntities", entities);

    let schematic = Compound::new()
        .with("Version", Tag::Int(SCHEMATIC_VERSION))
        .with("DataVersion", Tag::Int(config.data_version))
        .with(
            "Metadata",
            Compound::new().with("Date", Tag::Long(date.timestamp_millis())),
        )
        .with("Width", Tag::Short(dimension("width", layout.width())?))
        .with("Height", Tag::Short(dimension("height", layout.height())?))
        .with("Length", Tag::Short(dimension("length", layout.length())?))
        .with("Offset", Tag::IntArray(OFFSET.to_vec()))
        .with("Blocks", blocks);

    Ok(Tag::Compound(Compound::new().with("Schematic", schematic)))
}

/// Write a gzip-compressed schematic, returning the writer
pub fn write_schematic<W: Write>(
    writer: W,
    layout: &Layout,
    config: &SchemConfig,
    date: Option<DateTime<Utc>>,
) -> Result<W, SchemError> {
    let root = build_schematic(layout, config, date)?;
    nbt::write_gzip(writer, "", &root)
}

/// Gzip-compressed schematic bytes
pub fn schematic_bytes(
    layout: &Layout,
    config: &SchemConfig,
    date: Option<DateTime<Utc>>,
) -> Result<Vec<u8>, SchemError> {
    write_schematic(Vec::new(), layout, config, date)
}

fn dimension(name: &str, value: usize) -> Result<i16, SchemError> {
    i16::try_from(value)
        .map_err(|_| SchemError::FatalInvariant(format!("schematic {name} {value} exceeds i16")))
}

/// Block state → palette index
fn palette(config: &SchemConfig) -> Compound {
    let blocks = &config.blocks;
    let mut palette = Compound::new();
    for (id, state) in blocks.instruments.iter().enumerate() {
        palette.insert(state.as_str(), Tag::Int(id as i32));
    }
    palette.insert(blocks.chest_left.as_str(), Tag::Int(Cell::LeftChest.palette_id()));
    palette.insert(blocks.chest_right.as_str(), Tag::Int(Cell::RightChest.palette_id()));
    palette.insert(blocks.note_unused.as_str(), Tag::Int(Cell::NoteUnused.palette_id()));
    palette.insert(blocks.side_missing.as_str(), Tag::Int(Cell::SideMissing.palette_id()));
    palette
}

/// Palette indices of every cell, varint-encoded in index order
fn block_data(layout: &Layout) -> Result<Vec<u8>, SchemError> {
    let mut data = Vec::with_capacity(layout.cells().len());
    for cell in layout.cells() {
        write_varint(&mut data, cell.palette_id())?;
    }
    Ok(data)
}

/// Unsigned LEB128, 7 bits per byte
fn write_varint(out: &mut Vec<u8>, value: i32) -> Result<(), SchemError> {
    let mut value = u32::try_from(value)
        .map_err(|_| SchemError::FatalInvariant(format!("negative palette index {value}")))?;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return Ok(());
        }
        out.push(byte | 0x80);
    }
}

fn chest_entity(chest: &ChestEntity, config: &SchemConfig) -> Result<Compound, SchemError> {
    let mut items = List::new();
    for (slot, inner) in chest.contents.inners().iter().enumerate() {
        items.push(inner_item(slot, inner, config)?)?;
    }

    let id = config.blocks.chest_entity.as_str();
    let pos = [chest.x, chest.y, chest.z]
        .iter()
        .map(|&v| {
            i32::try_from(v)
                .map_err(|_| SchemError::FatalInvariant(format!("position {v} exceeds i32")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Compound::new()
        .with("Id", id)
        .with("Pos", Tag::IntArray(pos))
        .with("Data", Compound::new().with("id", id).with("Items", items)))
}

/// One inner container as a chest item with its contents component
fn inner_item(
    slot: usize,
    inner: &InnerContainer,
    config: &SchemConfig,
) -> Result<Compound, SchemError> {
    let mut contents = List::new();
    for (index, item) in inner.slots().iter().enumerate() {
        let (id, count) = config.items.item_for(item)?;
        contents.push(
            Compound::new()
                .with("slot", Tag::Int(index as i32))
                .with(
                    "item",
                    Compound::new().with("id", id).with("count", Tag::Int(count)),
                ),
        )?;
    }

    let slot = i8::try_from(slot)
        .map_err(|_| SchemError::FatalInvariant(format!("chest slot {slot} exceeds i8")))?;

    Ok(Compound::new()
        .with("Slot", Tag::Byte(slot))
        .with("id", config.items.container.as_str())
        .with("count", Tag::Int(1))
        .with(
            "components",
            Compound::new().with("minecraft:container", contents),
        ))
}
