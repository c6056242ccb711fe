use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::{Bitset, Cell, Color, ConstBoard};

/// Canonical identity of a position: the stone masks and the side to move,
/// reduced modulo the board's 180-degree rotation symmetry by
/// `Board::canonicalize`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PositionKey {
    pub black: u128,
    pub white: u128,
    pub black_to_move: bool,
}

/// A mutable stone board. The four edge points are pre-colored: NORTH and
/// SOUTH belong to Black, EAST and WEST to White, and count as occupied.
///
/// `play_move` and `undo_move` form an exact pair; the search layer drives
/// them in strict LIFO order.
#[derive(Clone, Debug)]
pub struct Board {
    cons: ConstBoard,
    stones: [Bitset; 2],
    to_move: Color,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_const(ConstBoard::new(width, height))
    }

    pub fn with_const(cons: ConstBoard) -> Self {
        let black = Bitset::from_cells(&[Cell::NORTH, Cell::SOUTH]);
        let white = Bitset::from_cells(&[Cell::WEST, Cell::EAST]);
        Board {
            cons,
            stones: [black, white],
            to_move: Color::Black,
        }
    }

    pub fn cons(&self) -> &ConstBoard {
        &self.cons
    }

    pub fn whose_turn(&self) -> Color {
        self.to_move
    }

    /// Stones of a color, edge points included.
    pub fn stones(&self, color: Color) -> Bitset {
        self.stones[color.index()]
    }

    pub fn occupied(&self) -> Bitset {
        self.stones[0] | self.stones[1]
    }

    pub fn empty(&self) -> Bitset {
        self.cons.all_cells() - self.occupied()
    }

    pub fn is_empty_cell(&self, cell: Cell) -> bool {
        cell.is_interior() && !self.occupied().test(cell)
    }

    pub fn color_at(&self, cell: Cell) -> Option<Color> {
        if self.stones[0].test(cell) {
            Some(Color::Black)
        } else if self.stones[1].test(cell) {
            Some(Color::White)
        } else {
            None
        }
    }

    /// Number of stones played so far.
    pub fn move_number(&self) -> usize {
        (self.occupied() & self.cons.all_cells()).count()
    }

    pub fn play_move(&mut self, color: Color, cell: Cell) {
        assert!(self.is_empty_cell(cell), "play on occupied point {}", cell);
        self.stones[color.index()].set(cell);
        self.to_move = !color;
    }

    /// Removes the stone at `cell`, restoring the turn to the color that
    /// played it.
    pub fn undo_move(&mut self, cell: Cell) {
        let color = self
            .color_at(cell)
            .expect("undo of an empty point");
        assert!(cell.is_interior());
        self.stones[color.index()].clear(cell);
        self.to_move = color;
    }

    /// The canonical key of this position and whether the 180-degree
    /// rotation of the board (rather than the board itself) is canonical.
    pub fn canonicalize(&self) -> (PositionKey, bool) {
        let plain = PositionKey {
            black: self.stones[0].bits(),
            white: self.stones[1].bits(),
            black_to_move: self.to_move == Color::Black,
        };
        let rotated = PositionKey {
            black: self.cons.rotate_set(self.stones[0]).bits(),
            white: self.cons.rotate_set(self.stones[1]).bits(),
            black_to_move: plain.black_to_move,
        };

        if rotated < plain {
            (rotated, true)
        } else {
            (plain, false)
        }
    }
}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonicalize().0.hash(state);
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.canonicalize().0 == other.canonicalize().0
    }
}

impl Eq for Board {}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for row in 0..self.cons.height() {
            write!(f, "{:indent$}", "", indent = row)?;
            for col in 0..self.cons.width() {
                let cell = self.cons.cell(row, col);
                let stone = match self.color_at(cell) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, " {}", stone)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Plays a move on construction and undoes it on drop, so the board is
/// restored on every exit path of the enclosing scope.
pub struct MoveGuard<'a> {
    board: &'a mut Board,
    cell: Cell,
}

impl<'a> MoveGuard<'a> {
    pub fn play(board: &'a mut Board, color: Color, cell: Cell) -> Self {
        board.play_move(color, cell);
        MoveGuard { board, cell }
    }

    pub fn board(&self) -> &Board {
        self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.board.undo_move(self.cell);
    }
}
