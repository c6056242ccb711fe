use std::fmt::Write as _;

use super::{Bitset, Cell};

/// Largest supported board dimension. An 11x11 board plus the four edge
/// points needs 125 bits, which still fits the 128-bit carrier word.
pub const MAX_DIMENSION: usize = 11;

/// Immutable board geometry: dimensions and the point adjacency tables.
///
/// Interior cells use the standard hex adjacency (six neighbors on the
/// rhombus). Each edge point is adjacent to every cell of its boundary row
/// or column.
#[derive(Clone, Debug)]
pub struct ConstBoard {
    width: usize,
    height: usize,
    nbs: Vec<Bitset>,
    all_cells: Bitset,
}

impl ConstBoard {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            (1..=MAX_DIMENSION).contains(&width) && (1..=MAX_DIMENSION).contains(&height),
            "Board dimensions must be between 1 and {}",
            MAX_DIMENSION
        );

        let num_points = Cell::FIRST_INTERIOR + width * height;
        let mut nbs = vec![Bitset::EMPTY; num_points];
        let mut all_cells = Bitset::EMPTY;

        let cell_at = |row: usize, col: usize| {
            Cell::from_index(Cell::FIRST_INTERIOR + row * width + col)
        };

        for row in 0..height {
            for col in 0..width {
                let cell = cell_at(row, col);
                all_cells.set(cell);

                // Hex neighborhood of (row, col) on the rhombus.
                let deltas: [(isize, isize); 6] =
                    [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0)];
                for (dr, dc) in deltas {
                    let (nr, nc) = (row as isize + dr, col as isize + dc);
                    if nr >= 0 && nr < height as isize && nc >= 0 && nc < width as isize {
                        nbs[cell.index()].set(cell_at(nr as usize, nc as usize));
                    }
                }

                if row == 0 {
                    nbs[cell.index()].set(Cell::NORTH);
                    nbs[Cell::NORTH.index()].set(cell);
                }
                if row == height - 1 {
                    nbs[cell.index()].set(Cell::SOUTH);
                    nbs[Cell::SOUTH.index()].set(cell);
                }
                if col == 0 {
                    nbs[cell.index()].set(Cell::WEST);
                    nbs[Cell::WEST.index()].set(cell);
                }
                if col == width - 1 {
                    nbs[cell.index()].set(Cell::EAST);
                    nbs[Cell::EAST.index()].set(cell);
                }
            }
        }

        ConstBoard {
            width,
            height,
            nbs,
            all_cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_points(&self) -> usize {
        self.nbs.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        debug_assert!(row < self.height && col < self.width);
        Cell::from_index(Cell::FIRST_INTERIOR + row * self.width + col)
    }

    pub fn coords(&self, cell: Cell) -> (usize, usize) {
        debug_assert!(cell.is_interior());
        let idx = cell.index() - Cell::FIRST_INTERIOR;
        (idx / self.width, idx % self.width)
    }

    /// Neighbor set of a point.
    pub fn nbs(&self, cell: Cell) -> Bitset {
        self.nbs[cell.index()]
    }

    pub fn adjacent(&self, a: Cell, b: Cell) -> bool {
        self.nbs(a).test(b)
    }

    /// Mask of all interior cells.
    pub fn all_cells(&self) -> Bitset {
        self.all_cells
    }

    /// The 180-degree rotation of a point. An involution: edges swap with
    /// their opposites, interior cells reflect through the board center.
    pub fn rotate(&self, cell: Cell) -> Cell {
        match cell {
            Cell::NORTH => Cell::SOUTH,
            Cell::SOUTH => Cell::NORTH,
            Cell::EAST => Cell::WEST,
            Cell::WEST => Cell::EAST,
            Cell::INVALID => Cell::INVALID,
            _ => {
                let (row, col) = self.coords(cell);
                self.cell(self.height - 1 - row, self.width - 1 - col)
            }
        }
    }

    pub fn rotate_set(&self, set: Bitset) -> Bitset {
        set.iter().map(|cell| self.rotate(cell)).collect()
    }

    /// Hex notation for a point: column letter then 1-based row, e.g. "a1".
    pub fn cell_name(&self, cell: Cell) -> String {
        if !cell.is_interior() {
            return cell.to_string();
        }
        let (row, col) = self.coords(cell);
        let mut name = String::new();
        let _ = write!(name, "{}{}", (b'a' + col as u8) as char, row + 1);
        name
    }

    /// Parses hex notation produced by `cell_name`.
    pub fn cell_from_name(&self, name: &str) -> Option<Cell> {
        if let Ok(cell) = name.parse::<Cell>() {
            if cell.is_edge() {
                return Some(cell);
            }
        }
        let mut chars = name.chars();
        let col = (chars.next()? as u32).checked_sub('a' as u32)? as usize;
        let row: usize = chars.as_str().parse::<usize>().ok()?.checked_sub(1)?;
        if row < self.height && col < self.width {
            Some(self.cell(row, col))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coords_round_trip() {
        let brd = ConstBoard::new(5, 4);
        for row in 0..4 {
            for col in 0..5 {
                assert_eq!(brd.coords(brd.cell(row, col)), (row, col));
            }
        }
    }

    #[test]
    fn test_interior_adjacency() {
        let brd = ConstBoard::new(5, 5);
        let center = brd.cell(2, 2);
        let nbs = brd.nbs(center);

        assert_eq!(nbs.count(), 6);
        assert!(nbs.test(brd.cell(1, 2)));
        assert!(nbs.test(brd.cell(1, 3)));
        assert!(nbs.test(brd.cell(2, 1)));
        assert!(nbs.test(brd.cell(2, 3)));
        assert!(nbs.test(brd.cell(3, 1)));
        assert!(nbs.test(brd.cell(3, 2)));
    }

    #[test]
    fn test_edge_adjacency() {
        let brd = ConstBoard::new(4, 3);

        for col in 0..4 {
            assert!(brd.adjacent(Cell::NORTH, brd.cell(0, col)));
            assert!(brd.adjacent(Cell::SOUTH, brd.cell(2, col)));
        }
        for row in 0..3 {
            assert!(brd.adjacent(Cell::WEST, brd.cell(row, 0)));
            assert!(brd.adjacent(Cell::EAST, brd.cell(row, 3)));
        }
        assert!(!brd.adjacent(Cell::NORTH, brd.cell(1, 0)));
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let brd = ConstBoard::new(4, 4);
        for a in 0..brd.num_points() {
            for b in 0..brd.num_points() {
                let (a, b) = (Cell::from_index(a), Cell::from_index(b));
                assert_eq!(brd.adjacent(a, b), brd.adjacent(b, a));
            }
        }
    }

    #[test]
    fn test_adjacent_cells_share_two_common_neighbors() {
        // The invariant the edge-bridge matcher relies on.
        let brd = ConstBoard::new(4, 4);
        for a in brd.all_cells().iter() {
            for b in brd.all_cells().iter() {
                if a < b && brd.adjacent(a, b) {
                    let common = brd.nbs(a) & brd.nbs(b);
                    assert_eq!(common.count(), 2, "cells {} and {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_rotation_is_involution() {
        let brd = ConstBoard::new(5, 3);
        for idx in 0..brd.num_points() {
            let cell = Cell::from_index(idx);
            assert_eq!(brd.rotate(brd.rotate(cell)), cell);
        }
    }

    #[test]
    fn test_rotation_of_corner_and_edges() {
        let brd = ConstBoard::new(3, 3);
        assert_eq!(brd.rotate(brd.cell(0, 0)), brd.cell(2, 2));
        assert_eq!(brd.rotate(Cell::NORTH), Cell::SOUTH);
        assert_eq!(brd.rotate(Cell::WEST), Cell::EAST);
    }

    #[test]
    fn test_cell_names() {
        let brd = ConstBoard::new(4, 4);
        assert_eq!(brd.cell_name(brd.cell(0, 0)), "a1");
        assert_eq!(brd.cell_name(brd.cell(2, 3)), "d3");
        assert_eq!(brd.cell_from_name("d3"), Some(brd.cell(2, 3)));
        assert_eq!(brd.cell_from_name("north"), Some(Cell::NORTH));
        assert_eq!(brd.cell_from_name("e1"), None);
    }
}
