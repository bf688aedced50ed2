//! Named binary tags
//!
//! The tagged tree format used by Minecraft save files. Everything is
//! big-endian; a document is one named root tag, usually a compound, and is
//! normally gzip-compressed on disk.
//!
//! Strings use Java's modified UTF-8 with a u16 byte-length prefix: NUL is
//! two bytes and characters outside the BMP are written as surrogate pairs.

use std::io::{self, Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::SchemError;

// =============================================================================
// Tag ids
// =============================================================================

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_FLOAT: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_BYTE_ARRAY: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_LONG_ARRAY: u8 = 12;

/// Nesting limit when reading, well above anything a schematic uses
const MAX_DEPTH: usize = 512;

/// A single tag value
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    /// Binary type id
    pub fn id(&self) -> u8 {
        match self {
            Tag::End => TAG_END,
            Tag::Byte(_) => TAG_BYTE,
            Tag::Short(_) => TAG_SHORT,
            Tag::Int(_) => TAG_INT,
            Tag::Long(_) => TAG_LONG,
            Tag::Float(_) => TAG_FLOAT,
            Tag::Double(_) => TAG_DOUBLE,
            Tag::ByteArray(_) => TAG_BYTE_ARRAY,
            Tag::String(_) => TAG_STRING,
            Tag::List(_) => TAG_LIST,
            Tag::Compound(_) => TAG_COMPOUND,
            Tag::IntArray(_) => TAG_INT_ARRAY,
            Tag::LongArray(_) => TAG_LONG_ARRAY,
        }
    }

    /// Type name, for error messages
    pub fn type_name(&self) -> &'static str {
        type_name(self.id())
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Tag::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(value) => Some(value),
            _ => None,
        }
    }
}

fn type_name(id: u8) -> &'static str {
    match id {
        TAG_END => "End",
        TAG_BYTE => "Byte",
        TAG_SHORT => "Short",
        TAG_INT => "Int",
        TAG_LONG => "Long",
        TAG_FLOAT => "Float",
        TAG_DOUBLE => "Double",
        TAG_BYTE_ARRAY => "ByteArray",
        TAG_STRING => "String",
        TAG_LIST => "List",
        TAG_COMPOUND => "Compound",
        TAG_INT_ARRAY => "IntArray",
        TAG_LONG_ARRAY => "LongArray",
        _ => "Unknown",
    }
}

impl From<Compound> for Tag {
    fn from(compound: Compound) -> Self {
        Tag::Compound(compound)
    }
}

impl From<List> for Tag {
    fn from(list: List) -> Self {
        Tag::List(list)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_string())
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::String(value)
    }
}

// =============================================================================
// Containers
// =============================================================================

/// Named tags, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    entries: Vec<(String, Tag)>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tag; a replaced tag keeps its position
    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) {
        let name = name.into();
        let tag = tag.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = tag,
            None => self.entries.push((name, tag)),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Self {
        self.insert(name, tag);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, tag)| tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(name, tag)| (name.as_str(), tag))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Unnamed tags that all share one type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    element: u8,
    items: Vec<Tag>,
}

impl List {
    /// An empty list; its element type is fixed by the first push
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag, rejecting one of a different type
    pub fn push(&mut self, tag: impl Into<Tag>) -> Result<(), SchemError> {
        let tag = tag.into();
        if self.items.is_empty() {
            self.element = tag.id();
        } else if tag.id() != self.element {
            return Err(SchemError::MixedList {
                expected: type_name(self.element),
                found: tag.type_name(),
            });
        }
        self.items.push(tag);
        Ok(())
    }

    /// Element type id; `End` for an empty list
    pub fn element_id(&self) -> u8 {
        self.element
    }

    pub fn items(&self) -> &[Tag] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TryFrom<Vec<Tag>> for List {
    type Error = SchemError;

    fn try_from(tags: Vec<Tag>) -> Result<Self, SchemError> {
        let mut list = List::new();
        for tag in tags {
            list.push(tag)?;
        }
        Ok(list)
    }
}

// =============================================================================
// Modified UTF-8
// =============================================================================

/// Encode a string the way Java's `DataOutput.writeUTF` does
pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\0' => bytes.extend_from_slice(&[0xC0, 0x80]),
            '\u{1}'..='\u{FFFF}' => {
                let mut buf = [0u8; 3];
                bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            _ => {
                let mut units = [0u16; 2];
                for &unit in ch.encode_utf16(&mut units).iter() {
                    bytes.extend_from_slice(&[
                        0xE0 | (unit >> 12) as u8,
                        0x80 | ((unit >> 6) & 0x3F) as u8,
                        0x80 | (unit & 0x3F) as u8,
                    ]);
                }
            }
        }
    }
    bytes
}

/// Decode modified UTF-8; plain 4-byte UTF-8 sequences are accepted too
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String, SchemError> {
    let malformed = |at: usize| SchemError::MalformedNbt(format!("invalid string byte at {at}"));
    let continuation = |at: usize| -> Result<u32, SchemError> {
        match bytes.get(at) {
            Some(&b) if b & 0xC0 == 0x80 => Ok(u32::from(b & 0x3F)),
            _ => Err(malformed(at)),
        }
    };

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        let (code, width) = match lead {
            0x00..=0x7F => (u32::from(lead), 1),
            0xC0..=0xDF => ((u32::from(lead & 0x1F) << 6) | continuation(i + 1)?, 2),
            0xE0..=0xEF => (
                (u32::from(lead & 0x0F) << 12) | (continuation(i + 1)? << 6) | continuation(i + 2)?,
                3,
            ),
            0xF0..=0xF7 => (
                (u32::from(lead & 0x07) << 18)
                    | (continuation(i + 1)? << 12)
                    | (continuation(i + 2)? << 6)
                    | continuation(i + 3)?,
                4,
            ),
            _ => return Err(malformed(i)),
        };

        match u16::try_from(code) {
            Ok(unit) => units.push(unit),
            Err(_) => {
                let ch = char::from_u32(code).ok_or_else(|| malformed(i))?;
                let mut pair = [0u16; 2];
                units.extend_from_slice(ch.encode_utf16(&mut pair));
            }
        }
        i += width;
    }

    String::from_utf16(&units).map_err(|e| SchemError::MalformedNbt(e.to_string()))
}

// =============================================================================
// Writer
// =============================================================================

/// Writer for uncompressed NBT
pub struct NbtWriter<W: Write> {
    writer: W,
}

impl<W: Write> NbtWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write a named root tag
    pub fn write_root(&mut self, name: &str, tag: &Tag) -> Result<(), SchemError> {
        self.writer.write_u8(tag.id())?;
        self.write_string(name)?;
        self.write_payload(tag)
    }

    fn write_string(&mut self, value: &str) -> Result<(), SchemError> {
        let bytes = encode_modified_utf8(value);
        let len = u16::try_from(bytes.len()).map_err(|_| {
            SchemError::MalformedNbt(format!("string of {} bytes is too long", bytes.len()))
        })?;
        self.writer.write_u16::<BigEndian>(len)?;
        self.writer.write_all(&bytes)?;
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<(), SchemError> {
        let len = i32::try_from(len)
            .map_err(|_| SchemError::MalformedNbt(format!("{len} elements is too many")))?;
        self.writer.write_i32::<BigEndian>(len)?;
        Ok(())
    }

    fn write_payload(&mut self, tag: &Tag) -> Result<(), SchemError> {
        match tag {
            Tag::End => {}
            Tag::Byte(v) => self.writer.write_i8(*v)?,
            Tag::Short(v) => self.writer.write_i16::<BigEndian>(*v)?,
            Tag::Int(v) => self.writer.write_i32::<BigEndian>(*v)?,
            Tag::Long(v) => self.writer.write_i64::<BigEndian>(*v)?,
            Tag::Float(v) => self.writer.write_f32::<BigEndian>(*v)?,
            Tag::Double(v) => self.writer.write_f64::<BigEndian>(*v)?,
            Tag::ByteArray(bytes) => {
                self.write_len(bytes.len())?;
                self.writer.write_all(bytes)?;
            }
            Tag::String(v) => self.write_string(v)?,
            Tag::List(list) => {
                self.writer.write_u8(list.element)?;
                self.write_len(list.items.len())?;
                for item in &list.items {
                    self.write_payload(item)?;
                }
            }
            Tag::Compound(compound) => {
                for (name, item) in &compound.entries {
                    self.writer.write_u8(item.id())?;
                    self.write_string(name)?;
                    self.write_payload(item)?;
                }
                self.writer.write_u8(TAG_END)?;
            }
            Tag::IntArray(values) => {
                self.write_len(values.len())?;
                for v in values {
                    self.writer.write_i32::<BigEndian>(*v)?;
                }
            }
            Tag::LongArray(values) => {
                self.write_len(values.len())?;
                for v in values {
                    self.writer.write_i64::<BigEndian>(*v)?;
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Reader for uncompressed NBT held in memory
pub struct NbtReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> NbtReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Read the named root tag
    pub fn read_root(&mut self) -> Result<(String, Tag), SchemError> {
        let id = self.cursor.read_u8()?;
        if id == TAG_END {
            return Err(SchemError::MalformedNbt("document starts with End".into()));
        }
        let name = self.read_string()?;
        let tag = self.read_payload(id, 0)?;
        Ok((name, tag))
    }

    fn read_string(&mut self) -> Result<String, SchemError> {
        let len = self.cursor.read_u16::<BigEndian>()? as usize;
        let mut bytes = vec![0u8; len];
        self.cursor.read_exact(&mut bytes)?;
        decode_modified_utf8(&bytes)
    }

    fn read_len(&mut self) -> Result<usize, SchemError> {
        let len = self.cursor.read_i32::<BigEndian>()?;
        let len = usize::try_from(len)
            .map_err(|_| SchemError::MalformedNbt(format!("negative length {len}")))?;
        let remaining = self.cursor.get_ref().len() as u64 - self.cursor.position();
        if len as u64 > remaining {
            return Err(SchemError::MalformedNbt(format!(
                "length {len} exceeds the {remaining} remaining bytes"
            )));
        }
        Ok(len)
    }

    fn read_payload(&mut self, id: u8, depth: usize) -> Result<Tag, SchemError> {
        if depth > MAX_DEPTH {
            return Err(SchemError::MalformedNbt("nesting too deep".into()));
        }

        let tag = match id {
            TAG_END => Tag::End,
            TAG_BYTE => Tag::Byte(self.cursor.read_i8()?),
            TAG_SHORT => Tag::Short(self.cursor.read_i16::<BigEndian>()?),
            TAG_INT => Tag::Int(self.cursor.read_i32::<BigEndian>()?),
            TAG_LONG => Tag::Long(self.cursor.read_i64::<BigEndian>()?),
            TAG_FLOAT => Tag::Float(self.cursor.read_f32::<BigEndian>()?),
            TAG_DOUBLE => Tag::Double(self.cursor.read_f64::<BigEndian>()?),
            TAG_BYTE_ARRAY => {
                let len = self.read_len()?;
                let mut bytes = vec![0u8; len];
                self.cursor.read_exact(&mut bytes)?;
                Tag::ByteArray(bytes)
            }
            TAG_STRING => Tag::String(self.read_string()?),
            TAG_LIST => {
                let element = self.cursor.read_u8()?;
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_payload(element, depth + 1)?);
                }
                Tag::List(List {
                    element: if items.is_empty() { TAG_END } else { element },
                    items,
                })
            }
            TAG_COMPOUND => {
                let mut compound = Compound::new();
                loop {
                    let item_id = self.cursor.read_u8()?;
                    if item_id == TAG_END {
                        break;
                    }
                    let name = self.read_string()?;
                    let item = self.read_payload(item_id, depth + 1)?;
                    compound.insert(name, item);
                }
                Tag::Compound(compound)
            }
            TAG_INT_ARRAY => {
                let len = self.read_len()?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.cursor.read_i32::<BigEndian>()?);
                }
                Tag::IntArray(values)
            }
            TAG_LONG_ARRAY => {
                let len = self.read_len()?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.cursor.read_i64::<BigEndian>()?);
                }
                Tag::LongArray(values)
            }
            other => {
                return Err(SchemError::MalformedNbt(format!("unknown tag id {other}")));
            }
        };
        Ok(tag)
    }
}

// =============================================================================
// Gzip framing
// =============================================================================

/// Write a gzip-compressed document
pub fn write_gzip<W: Write>(writer: W, name: &str, root: &Tag) -> Result<W, SchemError> {
    let mut nbt = NbtWriter::new(GzEncoder::new(writer, Compression::default()));
    nbt.write_root(name, root)?;
    Ok(nbt.into_inner().finish()?)
}

/// Read a gzip-compressed document
pub fn read_gzip(data: &[u8]) -> Result<(String, Tag), SchemError> {
    let mut raw = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut raw)
        .map_err(|e| match e.kind() {
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
                SchemError::MalformedNbt(format!("bad gzip stream: {e}"))
            }
            _ => SchemError::Io(e),
        })?;
    NbtReader::new(&raw).read_root()
}
