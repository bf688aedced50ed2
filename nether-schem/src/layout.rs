//! Block grid and chest placement
//!
//! One row (y) per instrument, in ascending instrument order. Column 0
//! shows the instrument block; each note value then takes four columns:
//! two for the left side's double chest and two for the right side's.
//!
//! ```text
//! x:  0     1    2    3    4    5    6    7    8   ...
//!     inst  [n0 left] [n0 right] [n1 left] [n1 right] ...
//! ```

use nether_nbs::{InstrumentId, NOTE_VALUE_COUNT, NoteValue};

use crate::error::SchemError;
use crate::packer::{OuterContainer, Side, SidePacking};
use crate::pairing::PackedSong;

/// Columns per side of one note value
const COLUMNS_PER_SIDE: usize = 2;

/// Grid width: instrument column plus two sides per note value
pub const LAYOUT_WIDTH: usize = NOTE_VALUE_COUNT * 2 * COLUMNS_PER_SIDE + 1;

/// Grid depth
pub const LAYOUT_LENGTH: usize = 1;

/// Contents of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Display block of an instrument
    Instrument(InstrumentId),
    /// First half of a double chest
    LeftChest,
    /// Second half of a double chest
    RightChest,
    /// A note value that is never played
    NoteUnused,
    /// The empty side of a note played on one side only
    SideMissing,
}

impl Cell {
    /// Index of this cell's block state in the schematic palette
    pub fn palette_id(self) -> i32 {
        match self {
            Cell::Instrument(id) => i32::from(id),
            Cell::LeftChest => 100,
            Cell::RightChest => 101,
            Cell::NoteUnused => 102,
            Cell::SideMissing => 103,
        }
    }
}

/// A chest block entity and the outer container it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChestEntity {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub contents: OuterContainer,
}

/// Placed blocks and chests of a packed song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    width: usize,
    height: usize,
    length: usize,
    cells: Vec<Cell>,
    chests: Vec<ChestEntity>,
}

impl Layout {
    /// Place every pairing of a packed song
    pub fn build(packed: &PackedSong) -> Result<Self, SchemError> {
        let height = packed.instruments().len();
        let mut layout = Layout {
            width: LAYOUT_WIDTH,
            height,
            length: LAYOUT_LENGTH,
            cells: vec![Cell::NoteUnused; LAYOUT_WIDTH * height * LAYOUT_LENGTH],
            chests: Vec::new(),
        };

        for (y, &instrument) in packed.instruments().iter().enumerate() {
            layout.set(0, y, 0, Cell::Instrument(instrument))?;
        }

        for (&(instrument, value), pairing) in packed.iter() {
            let y = packed
                .instruments()
                .binary_search(&instrument)
                .map_err(|_| {
                    SchemError::FatalInvariant(format!("instrument {instrument} has no row"))
                })?;

            // Both sides silent: leave the note unused
            if pairing.present_sides() == 0 {
                continue;
            }

            for side in [Side::Left, Side::Right] {
                layout.place_side(y, value, side, pairing.side(side))?;
            }
        }

        tracing::debug!(
            width = layout.width,
            height = layout.height,
            chests = layout.chests.len(),
            "Built layout"
        );
        Ok(layout)
    }

    fn place_side(
        &mut self,
        y: usize,
        value: NoteValue,
        side: Side,
        packing: &SidePacking,
    ) -> Result<(), SchemError> {
        let x = side_column(value, side);
        match packing {
            SidePacking::Missing => {
                self.set(x, y, 0, Cell::SideMissing)?;
                self.set(x + 1, y, 0, Cell::SideMissing)?;
            }
            SidePacking::Present(outers) => {
                self.set(x, y, 0, Cell::LeftChest)?;
                self.set(x + 1, y, 0, Cell::RightChest)?;
                for (offset, outer) in outers.iter().enumerate() {
                    self.check_bounds(x + offset, y, 0)?;
                    self.chests.push(ChestEntity {
                        x: x + offset,
                        y,
                        z: 0,
                        contents: outer.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Fail with `OutOfBounds` unless the position lies inside the grid
    pub fn check_bounds(&self, x: usize, y: usize, z: usize) -> Result<(), SchemError> {
        if x >= self.width || y >= self.height || z >= self.length {
            return Err(SchemError::OutOfBounds {
                x,
                y,
                z,
                width: self.width,
                height: self.height,
                length: self.length,
            });
        }
        Ok(())
    }

    /// Flat index of a position, x fastest then z then y
    pub fn index(&self, x: usize, y: usize, z: usize) -> Result<usize, SchemError> {
        self.check_bounds(x, y, z)?;
        Ok(x + self.width * z + y * self.width * self.length)
    }

    fn set(&mut self, x: usize, y: usize, z: usize, cell: Cell) -> Result<(), SchemError> {
        let index = self.index(x, y, z)?;
        self.cells[index] = cell;
        Ok(())
    }

    pub fn cell(&self, x: usize, y: usize, z: usize) -> Option<Cell> {
        let index = self.index(x, y, z).ok()?;
        self.cells.get(index).copied()
    }

    /// All cells in index order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Chest block entities in placement order
    pub fn chests(&self) -> &[ChestEntity] {
        &self.chests
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

/// First column of one side of a note value
fn side_column(value: NoteValue, side: Side) -> usize {
    let start = 1 + value as usize * 2 * COLUMNS_PER_SIDE;
    match side {
        Side::Left => start,
        Side::Right => start + COLUMNS_PER_SIDE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::pack_song;
    use nether_nbs::{NbsHeader, NbsSong, NoteEvent, PresenceTimelines};

    fn packed(tick_length: i16, notes: &[(i64, u8, u8)]) -> PackedSong {
        let header = NbsHeader {
            tick_length,
            layer_count: notes.len() as i16,
            ..NbsHeader::default()
        };
        let mut song = NbsSong::new(header);
        for (layer, &(tick, instrument, key)) in notes.iter().enumerate() {
            song.notes
                .insert(layer as i64, tick, NoteEvent::new(instrument, key))
                .unwrap();
        }
        pack_song(&PresenceTimelines::from_song(&song).unwrap()).unwrap()
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(LAYOUT_WIDTH, 101);
        let layout = Layout::build(&packed(8, &[(0, 4, 33), (1, 9, 40)])).unwrap();
        assert_eq!(layout.width(), 101);
        assert_eq!(layout.height(), 2);
        assert_eq!(layout.length(), 1);
        assert_eq!(layout.cells().len(), 202);
    }

    #[test]
    fn test_instrument_column() {
        let layout = Layout::build(&packed(8, &[(0, 9, 33), (1, 4, 33)])).unwrap();
        assert_eq!(layout.cell(0, 0, 0), Some(Cell::Instrument(4)));
        assert_eq!(layout.cell(0, 1, 0), Some(Cell::Instrument(9)));
    }

    #[test]
    fn test_both_sides_present() {
        // Ticks 0 and 5: both sides hold notes
        let layout = Layout::build(&packed(8, &[(0, 0, 33), (5, 0, 33)])).unwrap();
        assert_eq!(layout.cell(1, 0, 0), Some(Cell::LeftChest));
        assert_eq!(layout.cell(2, 0, 0), Some(Cell::RightChest));
        assert_eq!(layout.cell(3, 0, 0), Some(Cell::LeftChest));
        assert_eq!(layout.cell(4, 0, 0), Some(Cell::RightChest));
        assert_eq!(layout.cell(5, 0, 0), Some(Cell::NoteUnused));

        let positions: Vec<_> = layout.chests().iter().map(|c| (c.x, c.y, c.z)).collect();
        assert_eq!(positions, vec![(1, 0, 0), (3, 0, 0)]);
    }

    #[test]
    fn test_missing_side_marker() {
        // Note value 2 at tick 0 only: right side is empty
        let layout = Layout::build(&packed(8, &[(0, 0, 35)])).unwrap();
        assert_eq!(layout.cell(9, 0, 0), Some(Cell::LeftChest));
        assert_eq!(layout.cell(10, 0, 0), Some(Cell::RightChest));
        assert_eq!(layout.cell(11, 0, 0), Some(Cell::SideMissing));
        assert_eq!(layout.cell(12, 0, 0), Some(Cell::SideMissing));
        assert_eq!(layout.chests().len(), 1);
    }

    #[test]
    fn test_highest_note_fits() {
        let layout = Layout::build(&packed(8, &[(1, 0, 57)])).unwrap();
        assert_eq!(layout.cell(97, 0, 0), Some(Cell::SideMissing));
        assert_eq!(layout.cell(99, 0, 0), Some(Cell::LeftChest));
        assert_eq!(layout.cell(100, 0, 0), Some(Cell::RightChest));
    }

    #[test]
    fn test_second_outer_goes_in_second_half() {
        // Every odd tick sounds: 800 right-side windows of symbol 10
        let tick_length = 800 * 8;
        let notes: Vec<_> = (0..tick_length as i64)
            .filter(|t| t % 2 == 1)
            .map(|t| (t, 0u8, 33u8))
            .collect();
        let header = NbsHeader {
            tick_length,
            layer_count: 1,
            ..NbsHeader::default()
        };
        let mut song = NbsSong::new(header);
        for &(tick, instrument, key) in &notes {
            song.notes
                .insert(0, tick, NoteEvent::new(instrument, key))
                .unwrap();
        }
        let packed = pack_song(&PresenceTimelines::from_song(&song).unwrap()).unwrap();
        let layout = Layout::build(&packed).unwrap();

        let chests = layout.chests();
        assert_eq!(chests.len(), 2);
        assert_eq!((chests[0].x, chests[1].x), (3, 4));
        assert_eq!(chests[0].contents.slot_count(), 729);
        assert_eq!(chests[1].contents.slot_count(), 71);
    }

    #[test]
    fn test_index_bounds() {
        let layout = Layout::build(&packed(4, &[(0, 0, 33)])).unwrap();
        assert_eq!(layout.index(100, 0, 0).unwrap(), 100);
        assert!(matches!(
            layout.index(101, 0, 0),
            Err(SchemError::OutOfBounds { x: 101, .. })
        ));
        assert!(layout.index(0, 1, 0).is_err());
        assert!(layout.index(0, 0, 1).is_err());
        assert_eq!(layout.cell(0, 5, 0), None);
    }

    #[test]
    fn test_check_bounds() {
        let layout = Layout::build(&packed(4, &[(0, 0, 33)])).unwrap();
        assert!(layout.check_bounds(100, 0, 0).is_ok());
        assert!(matches!(
            layout.check_bounds(101, 0, 0),
            Err(SchemError::OutOfBounds { x: 101, width: 101, .. })
        ));
        assert!(matches!(
            layout.check_bounds(0, 1, 0),
            Err(SchemError::OutOfBounds { y: 1, height: 1, .. })
        ));

        // Every chest entity sits on a chest cell inside the grid
        for chest in layout.chests() {
            assert!(layout.check_bounds(chest.x, chest.y, chest.z).is_ok());
            assert!(matches!(
                layout.cell(chest.x, chest.y, chest.z),
                Some(Cell::LeftChest | Cell::RightChest)
            ));
        }
    }

    #[test]
    fn test_palette_ids() {
        assert_eq!(Cell::Instrument(15).palette_id(), 15);
        assert_eq!(Cell::LeftChest.palette_id(), 100);
        assert_eq!(Cell::RightChest.palette_id(), 101);
        assert_eq!(Cell::NoteUnused.palette_id(), 102);
        assert_eq!(Cell::SideMissing.palette_id(), 103);
    }
}
