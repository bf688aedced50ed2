//! Item and block identities used in the schematic
//!
//! Every id has a default matching vanilla 1.21. A TOML file can override
//! any of them, e.g. for a resource pack that retextures the discs.

use hashbrown::HashSet;
use serde::Deserialize;

use crate::FILLER_PALETTE_SIZE;
use crate::error::SchemError;
use crate::packer::Slot;
use crate::symbol::Symbol;

/// Data version of the target game release (1.21.4)
pub const DEFAULT_DATA_VERSION: i32 = 4189;

/// Number of distinct non-zero symbols
const DISC_COUNT: usize = 15;

/// Number of instrument display blocks
const INSTRUMENT_BLOCK_COUNT: usize = nether_nbs::VANILLA_INSTRUMENT_COUNT;

/// Schematic generation settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemConfig {
    /// `DataVersion` written to the schematic.
    /// Default: 4189
    #[serde(default = "default_data_version")]
    pub data_version: i32,

    #[serde(default)]
    pub items: ItemPalette,

    #[serde(default)]
    pub blocks: BlockPalette,
}

fn default_data_version() -> i32 {
    DEFAULT_DATA_VERSION
}

impl Default for SchemConfig {
    fn default() -> Self {
        Self {
            data_version: DEFAULT_DATA_VERSION,
            items: ItemPalette::default(),
            blocks: BlockPalette::default(),
        }
    }
}

impl SchemConfig {
    /// Parse a TOML config and validate it
    pub fn from_toml(text: &str) -> Result<Self, SchemError> {
        let config: SchemConfig =
            toml::from_str(text).map_err(|e| SchemError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check palette sizes and that block states are distinct
    pub fn validate(&self) -> Result<(), SchemError> {
        self.items.validate()?;
        self.blocks.validate()
    }
}

/// Items stored in container slots
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemPalette {
    /// Item for symbols 1..=15, in symbol order
    pub discs: Vec<String>,
    /// Items for silence runs, indexed by filler identity
    pub fillers: Vec<String>,
    /// Inner container item
    pub container: String,
}

impl Default for ItemPalette {
    fn default() -> Self {
        let discs = [
            "13",
            "cat",
            "blocks",
            "chirp",
            "far",
            "mall",
            "mellohi",
            "stal",
            "strad",
            "ward",
            "11",
            "wait",
            "precipice",
            "otherside",
            "5",
        ];
        let fillers = [
            "white",
            "orange",
            "magenta",
            "light_blue",
            "yellow",
            "lime",
            "pink",
            "gray",
            "light_gray",
            "cyan",
            "purple",
            "blue",
            "brown",
            "green",
            "red",
            "black",
        ];

        Self {
            discs: discs
                .iter()
                .map(|name| format!("minecraft:music_disc_{name}"))
                .collect(),
            fillers: fillers
                .iter()
                .map(|color| format!("minecraft:{color}_wool"))
                .collect(),
            container: "minecraft:shulker_box".to_string(),
        }
    }
}

impl ItemPalette {
    fn validate(&self) -> Result<(), SchemError> {
        check_len("items.discs", &self.discs, DISC_COUNT)?;
        check_len("items.fillers", &self.fillers, FILLER_PALETTE_SIZE)
    }

    /// Item id and stack count for one slot
    pub fn item_for(&self, slot: &Slot) -> Result<(&str, i32), SchemError> {
        match *slot {
            Slot::Symbol(symbol) => self
                .disc(symbol)
                .map(|id| (id, 1))
                .ok_or_else(|| SchemError::FatalInvariant(format!("no item for symbol {symbol}"))),
            Slot::Filler { identity, count } => self
                .fillers
                .get(identity as usize % FILLER_PALETTE_SIZE)
                .map(|id| (id.as_str(), i32::from(count)))
                .ok_or_else(|| {
                    SchemError::FatalInvariant(format!("no item for filler identity {identity}"))
                }),
        }
    }

    fn disc(&self, symbol: Symbol) -> Option<&str> {
        let index = (symbol as usize).checked_sub(1)?;
        self.discs.get(index).map(String::as_str)
    }
}

/// Block states placed in the schematic grid
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlockPalette {
    /// Display block per instrument id, placed at x = 0
    pub instruments: Vec<String>,
    /// First cell of a present side
    pub chest_left: String,
    /// Second cell of a present side
    pub chest_right: String,
    /// Cells of a note that is never played
    pub note_unused: String,
    /// Cells of a side with no notes when the other side has some
    pub side_missing: String,
    /// Block entity id of the chests
    pub chest_entity: String,
}

impl Default for BlockPalette {
    fn default() -> Self {
        let instruments = [
            "dirt",
            "oak_planks",
            "stone",
            "sand",
            "glass",
            "white_wool",
            "clay",
            "gold_block",
            "packed_ice",
            "bone_block",
            "iron_block",
            "soul_sand",
            "pumpkin",
            "emerald_block",
            "hay_block",
            "glowstone",
        ];

        Self {
            instruments: instruments
                .iter()
                .map(|name| format!("minecraft:{name}"))
                .collect(),
            // The halves join into one double chest facing south
            chest_left: "minecraft:chest[facing=south,type=right,waterlogged=false]".to_string(),
            chest_right: "minecraft:chest[facing=south,type=left,waterlogged=false]".to_string(),
            note_unused: "minecraft:coal_block".to_string(),
            side_missing: "minecraft:quartz_block".to_string(),
            chest_entity: "minecraft:chest".to_string(),
        }
    }
}

impl BlockPalette {
    fn validate(&self) -> Result<(), SchemError> {
        check_len("blocks.instruments", &self.instruments, INSTRUMENT_BLOCK_COUNT)?;

        // Palette entries map a state to one index, so states must be unique
        let mut seen = HashSet::new();
        let markers = [
            &self.chest_left,
            &self.chest_right,
            &self.note_unused,
            &self.side_missing,
        ];
        for state in self.instruments.iter().chain(markers) {
            if !seen.insert(state.as_str()) {
                return Err(SchemError::InvalidConfig(format!(
                    "block state {state} is used twice"
                )));
            }
        }
        Ok(())
    }
}

fn check_len(field: &str, values: &[String], expected: usize) -> Result<(), SchemError> {
    if values.len() != expected {
        return Err(SchemError::InvalidConfig(format!(
            "{field} needs {expected} entries, found {}",
            values.len()
        )));
    }
    Ok(())
}
