//! Nether-Schem: note timelines to chest/shulker box schematics
//!
//! Turns the presence timelines decoded by `nether-nbs` into a WorldEdit
//! schematic where every (instrument, note value) pair is stored as items in
//! containers: music discs for 4-tick windows with notes, wool stacks for
//! runs of silence.
//!
//! # Pipeline
//!
//! ```text
//! timeline ──split──▶ 2 sub-channels ──encode──▶ symbol streams
//!          ──pack──▶ chests of shulker boxes ──layout──▶ NBT schematic
//! ```
//!
//! - [`channel`]: even/odd tick deinterleaving, padded to 4-tick windows
//! - [`symbol`]: 4-bit window → symbol table
//! - [`packer`]: symbol stream → outer containers (chests) of inner
//!   containers (shulker boxes) of slots
//! - [`pairing`]: both sides of one note, and the whole song in parallel
//! - [`layout`]: block grid and chest positions
//! - [`schematic`]: Sponge v3 schematic document
//! - [`nbt`]: tagged tree and its binary encoding
//!
//! # Usage
//!
//! ```ignore
//! use nether_nbs::{parse_nbs, PresenceTimelines};
//! use nether_schem::{pack_song, Layout, SchemConfig, write_schematic};
//!
//! let song = parse_nbs(&std::fs::read("song.nbs")?)?;
//! let timelines = PresenceTimelines::from_song(&song)?;
//! let packed = pack_song(&timelines)?;
//! let layout = Layout::build(&packed)?;
//! write_schematic(std::fs::File::create("song.schem")?, &layout, &SchemConfig::default(), None)?;
//! ```

pub mod channel;
mod config;
mod error;
pub mod layout;
pub mod nbt;
pub mod packer;
pub mod pairing;
pub mod schematic;
pub mod symbol;

pub use channel::{SubChannels, interleave, split_channels};
pub use config::{BlockPalette, DEFAULT_DATA_VERSION, ItemPalette, SchemConfig};
pub use error::SchemError;
pub use layout::{Cell, ChestEntity, LAYOUT_WIDTH, Layout};
pub use packer::{InnerContainer, OuterContainer, Side, SidePacking, Slot, StreamId, pack_stream};
pub use pairing::{ContainerPairing, PackedSong, pack_song, pack_timeline};
pub use schematic::{build_schematic, schematic_bytes, write_schematic};
pub use symbol::{Symbol, encode_symbols, symbol_for_window, window_for_symbol};

// =============================================================================
// Capacity Constants
// =============================================================================

/// Slots in one inner container (shulker box)
pub const SLOTS_PER_INNER: usize = 27;

/// Inner containers in one outer container (chest)
pub const INNERS_PER_OUTER: usize = 27;

/// Slots in one outer container
pub const SLOTS_PER_OUTER: usize = SLOTS_PER_INNER * INNERS_PER_OUTER;

/// Outer containers one symbol stream may fill (a double chest)
pub const MAX_OUTER_PER_STREAM: usize = 2;

/// Longest silence run one filler slot can hold (a full item stack)
pub const MAX_FILLER_RUN: u8 = 64;

/// Number of distinct filler identities
pub const FILLER_PALETTE_SIZE: usize = 16;

/// Ticks encoded by one symbol
pub const TICKS_PER_SYMBOL: usize = 4;

// =============================================================================
// Tests
// =============================================================================
