use std::fmt::{self, Display, Formatter};
use std::ops::Not;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// A point on the board: one of the four virtual edges, or an interior cell.
///
/// Points 0..4 are the edges. Interior cells follow in row-major order, so
/// the index of a cell depends on the board width; `ConstBoard` owns the
/// coordinate mapping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell(u8);

impl Cell {
    pub const NORTH: Cell = Cell(0);
    pub const EAST: Cell = Cell(1);
    pub const SOUTH: Cell = Cell(2);
    pub const WEST: Cell = Cell(3);
    pub const INVALID: Cell = Cell(u8::MAX);

    /// Index of the first interior cell.
    pub const FIRST_INTERIOR: usize = 4;

    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < 128);
        Cell(index as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_valid(self) -> bool {
        self != Cell::INVALID
    }

    pub fn is_edge(self) -> bool {
        self.0 < Cell::FIRST_INTERIOR as u8
    }

    pub fn is_interior(self) -> bool {
        self.is_valid() && !self.is_edge()
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Cell::NORTH => write!(f, "north"),
            Cell::EAST => write!(f, "east"),
            Cell::SOUTH => write!(f, "south"),
            Cell::WEST => write!(f, "west"),
            Cell::INVALID => write!(f, "invalid"),
            Cell(idx) => write!(f, "c{}", idx),
        }
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Cell {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "north" => Ok(Cell::NORTH),
            "east" => Ok(Cell::EAST),
            "south" => Ok(Cell::SOUTH),
            "west" => Ok(Cell::WEST),
            _ => {
                let idx: usize = s
                    .strip_prefix('c')
                    .ok_or_else(|| anyhow!("Invalid cell: {}", s))?
                    .parse()?;
                if idx < Cell::FIRST_INTERIOR || idx >= 128 {
                    return Err(anyhow!("Cell index out of range: {}", s));
                }
                Ok(Cell::from_index(idx))
            }
        }
    }
}

/// Stone color. Black connects NORTH to SOUTH, White connects EAST to WEST.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// The two board edges this color must connect.
    pub fn edges(self) -> (Cell, Cell) {
        match self {
            Color::Black => (Cell::NORTH, Cell::SOUTH),
            Color::White => (Cell::WEST, Cell::EAST),
        }
    }

    /// The color owning a given edge point.
    pub fn owner_of_edge(edge: Cell) -> Color {
        debug_assert!(edge.is_edge());
        match edge {
            Cell::NORTH | Cell::SOUTH => Color::Black,
            _ => Color::White,
        }
    }
}

impl Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        self.opponent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_edges() {
        for edge in [Cell::NORTH, Cell::EAST, Cell::SOUTH, Cell::WEST] {
            assert!(edge.is_edge());
            assert!(edge.is_valid());
            assert!(!edge.is_interior());
        }
    }

    #[test]
    fn test_interior_cell() {
        let cell = Cell::from_index(4);
        assert!(cell.is_interior());
        assert!(!cell.is_edge());
    }

    #[test]
    fn test_invalid_cell() {
        assert!(!Cell::INVALID.is_valid());
        assert!(!Cell::INVALID.is_interior());
    }

    #[test]
    fn test_cell_round_trips_through_str() {
        for cell in [Cell::NORTH, Cell::WEST, Cell::from_index(17)] {
            let parsed: Cell = cell.to_string().parse().unwrap();
            assert_eq!(parsed, cell);
        }
    }

    #[test]
    fn test_cell_from_bad_str() {
        assert!("c3".parse::<Cell>().is_err());
        assert!("x9".parse::<Cell>().is_err());
    }

    #[test]
    fn test_color_opponent() {
        assert_eq!(!Color::Black, Color::White);
        assert_eq!(!Color::White, Color::Black);
    }

    #[test]
    fn test_edge_ownership() {
        let (n, s) = Color::Black.edges();
        assert_eq!(Color::owner_of_edge(n), Color::Black);
        assert_eq!(Color::owner_of_edge(s), Color::Black);
        let (w, e) = Color::White.edges();
        assert_eq!(Color::owner_of_edge(w), Color::White);
        assert_eq!(Color::owner_of_edge(e), Color::White);
    }
}
