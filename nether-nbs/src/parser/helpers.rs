//! Helper functions for reading little-endian NBS fields

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::NbsError;

fn underrun(cursor: &Cursor<&[u8]>, what: &'static str) -> NbsError {
    NbsError::BufferUnderrun {
        what,
        offset: cursor.position(),
    }
}

/// Read an unsigned byte
pub(crate) fn read_u8(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<u8, NbsError> {
    let pos = cursor.position();
    cursor.read_u8().map_err(|_| NbsError::BufferUnderrun { what, offset: pos })
}

/// Read a byte used as a boolean flag (1 = true)
pub(crate) fn read_flag(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<bool, NbsError> {
    Ok(read_u8(cursor, what)? == 1)
}

/// Read a 16-bit signed little-endian integer
pub(crate) fn read_i16(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<i16, NbsError> {
    let pos = cursor.position();
    cursor
        .read_i16::<LittleEndian>()
        .map_err(|_| NbsError::BufferUnderrun { what, offset: pos })
}

/// Read a 32-bit signed little-endian integer
pub(crate) fn read_i32(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<i32, NbsError> {
    let pos = cursor.position();
    cursor
        .read_i32::<LittleEndian>()
        .map_err(|_| NbsError::BufferUnderrun { what, offset: pos })
}

/// Read a length-prefixed string (u32 byte length, no terminator)
///
/// The length counts bytes, not characters. Invalid UTF-8 is replaced
/// rather than rejected.
pub(crate) fn read_string(
    cursor: &mut Cursor<&[u8]>,
    what: &'static str,
) -> Result<String, NbsError> {
    let pos = cursor.position();
    let length = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| NbsError::BufferUnderrun { what, offset: pos })? as usize;

    let remaining = (cursor.get_ref().len() as u64).saturating_sub(cursor.position());
    if length as u64 > remaining {
        return Err(underrun(cursor, what));
    }

    let mut bytes = vec![0u8; length];
    cursor
        .read_exact(&mut bytes)
        .map_err(|_| underrun(cursor, what))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
