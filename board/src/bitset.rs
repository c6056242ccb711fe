use std::fmt::{self, Debug, Formatter};
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Sub};

use common::bits::{bit_indices, single_bit_index};

use super::Cell;

/// A fixed-width set of board points backed by a single 128-bit word.
///
/// Carriers, occupancy masks and mustplay sets are all values of this type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitset(u128);

impl Bitset {
    pub const EMPTY: Bitset = Bitset(0);

    pub fn single(cell: Cell) -> Self {
        Bitset(1u128 << cell.index())
    }

    pub fn from_cells(cells: &[Cell]) -> Self {
        let mut set = Bitset::EMPTY;
        for cell in cells {
            set.set(*cell);
        }
        set
    }

    pub fn bits(self) -> u128 {
        self.0
    }

    pub fn set(&mut self, cell: Cell) {
        self.0 |= 1u128 << cell.index();
    }

    pub fn clear(&mut self, cell: Cell) {
        self.0 &= !(1u128 << cell.index());
    }

    pub fn test(self, cell: Cell) -> bool {
        self.0 & (1u128 << cell.index()) != 0
    }

    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn intersects(self, other: Bitset) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_subset_of(self, other: Bitset) -> bool {
        self.0 & !other.0 == 0
    }

    /// The set cell with the lowest index, if any.
    pub fn first(self) -> Option<Cell> {
        if self.0 == 0 {
            None
        } else {
            Some(Cell::from_index(single_bit_index(self.0)))
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Cell> {
        bit_indices(self.0).map(Cell::from_index)
    }
}

impl BitAnd for Bitset {
    type Output = Bitset;

    fn bitand(self, rhs: Bitset) -> Bitset {
        Bitset(self.0 & rhs.0)
    }
}

impl BitAndAssign for Bitset {
    fn bitand_assign(&mut self, rhs: Bitset) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Bitset {
    type Output = Bitset;

    fn bitor(self, rhs: Bitset) -> Bitset {
        Bitset(self.0 | rhs.0)
    }
}

impl BitOrAssign for Bitset {
    fn bitor_assign(&mut self, rhs: Bitset) {
        self.0 |= rhs.0;
    }
}

impl Sub for Bitset {
    type Output = Bitset;

    fn sub(self, rhs: Bitset) -> Bitset {
        Bitset(self.0 & !rhs.0)
    }
}

impl Debug for Bitset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Cell> for Bitset {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        let mut set = Bitset::EMPTY;
        for cell in iter {
            set.set(cell);
        }
        set
    }
}
