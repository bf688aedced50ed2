//! Even/odd tick deinterleaving
//!
//! A presence timeline is split into two sub-channels: even ticks go to the
//! left side, odd ticks to the right. Both sides get the same length
//! (`ceil(len / 2)`) and are then padded with silence to whole 4-tick
//! windows.

use crate::TICKS_PER_SYMBOL;

/// The two halves of one timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubChannels {
    /// Even ticks (0, 2, 4, ...)
    pub left: Vec<bool>,
    /// Odd ticks (1, 3, 5, ...)
    pub right: Vec<bool>,
}

/// Split a timeline into padded even/odd sub-channels
pub fn split_channels(timeline: &[bool]) -> SubChannels {
    let half = timeline.len().div_ceil(2);
    let padded = half.div_ceil(TICKS_PER_SYMBOL) * TICKS_PER_SYMBOL;

    let mut left = Vec::with_capacity(padded);
    let mut right = Vec::with_capacity(padded);
    for pair in timeline.chunks(2) {
        left.push(pair[0]);
        right.push(pair.get(1).copied().unwrap_or(false));
    }

    left.resize(padded, false);
    right.resize(padded, false);

    SubChannels { left, right }
}

/// Rebuild a timeline of `len` ticks from its sub-channels
///
/// Padding beyond `len` is dropped. Missing entries read as `false`.
pub fn interleave(left: &[bool], right: &[bool], len: usize) -> Vec<bool> {
    (0..len)
        .map(|tick| {
            let side = if tick % 2 == 0 { left } else { right };
            side.get(tick / 2).copied().unwrap_or(false)
        })
        .collect()
}
