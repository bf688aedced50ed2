//! 4-tick window → symbol encoding
//!
//! Each window of four ticks is read as a 4-bit value, first tick in the
//! most significant bit, and mapped through a fixed reflected-binary table.
//! The symbol is the comparator signal strength that reads the window back
//! out of the container, so the table must match bit for bit.

use crate::TICKS_PER_SYMBOL;
use crate::error::SchemError;

/// Symbol value in 0..=15; 0 means a window with no notes
pub type Symbol = u8;

/// Symbol of a silent window
pub const ABSENT: Symbol = 0;

/// Window bits → symbol, indexed by the 4-bit window value
const WINDOW_TO_SYMBOL: [Symbol; 16] = [
    0,  // 0000
    1,  // 0001
    3,  // 0010
    2,  // 0011
    7,  // 0100
    6,  // 0101
    4,  // 0110
    5,  // 0111
    15, // 1000
    14, // 1001
    12, // 1010
    13, // 1011
    8,  // 1100
    9,  // 1101
    11, // 1110
    10, // 1111
];

/// Symbol → window bits
const SYMBOL_TO_WINDOW: [u8; 16] = [
    0b0000, 0b0001, 0b0011, 0b0010, 0b0110, 0b0111, 0b0101, 0b0100, 0b1100, 0b1101, 0b1111,
    0b1110, 0b1010, 0b1011, 0b1001, 0b1000,
];

/// Look up the symbol of a 4-bit window value
pub fn symbol_for_window(window: u8) -> Option<Symbol> {
    WINDOW_TO_SYMBOL.get(window as usize).copied()
}

/// Look up the window bits of a symbol
pub fn window_for_symbol(symbol: Symbol) -> Option<u8> {
    SYMBOL_TO_WINDOW.get(symbol as usize).copied()
}

/// Pack four ticks into a window value, first tick as the high bit
fn window_bits(window: &[bool]) -> u8 {
    window
        .iter()
        .fold(0u8, |bits, &tick| (bits << 1) | tick as u8)
}

/// Encode a padded sub-channel into one symbol per 4-tick window
///
/// # Panics
/// If the sub-channel length is not a multiple of 4. `split_channels`
/// always pads, so this is a caller bug.
pub fn encode_symbols(sub_channel: &[bool]) -> Result<Vec<Symbol>, SchemError> {
    assert!(
        sub_channel.len() % TICKS_PER_SYMBOL == 0,
        "sub-channel length {} is not a multiple of {}",
        sub_channel.len(),
        TICKS_PER_SYMBOL
    );

    sub_channel
        .chunks_exact(TICKS_PER_SYMBOL)
        .map(|window| {
            let bits = window_bits(window);
            symbol_for_window(bits).ok_or_else(|| {
                SchemError::FatalInvariant(format!("no symbol for window bits {bits:#06b}"))
            })
        })
        .collect()
}
