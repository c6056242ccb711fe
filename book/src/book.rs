use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use board::{Board, PositionKey};

/// Sentinel value for a proven win for the player to move.
pub const BOOK_WIN: f32 = 10_000.0;

/// Sentinel value for a proven loss for the player to move.
pub const BOOK_LOSS: f32 = -10_000.0;

/// Flips an evaluation to the other player's perspective.
pub fn inverse_eval(value: f32) -> f32 {
    if value >= BOOK_WIN {
        BOOK_LOSS
    } else if value <= BOOK_LOSS {
        BOOK_WIN
    } else {
        1.0 - value
    }
}

/// An opening book entry: the position's value for the player to move
/// (either in [0,1] or one of the win/loss sentinels) and its visit count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookNode {
    pub value: f32,
    pub count: u32,
}

impl BookNode {
    pub fn new(value: f32) -> Self {
        BookNode { value, count: 0 }
    }

    pub fn with_count(value: f32, count: u32) -> Self {
        BookNode { value, count }
    }

    pub fn is_win(&self) -> bool {
        self.value >= BOOK_WIN
    }

    pub fn is_loss(&self) -> bool {
        self.value <= BOOK_LOSS
    }

    pub fn is_terminal(&self) -> bool {
        self.is_win() || self.is_loss()
    }

    pub fn visit(&mut self) {
        self.count += 1;
    }

    /// Ranking score: proven results dominate unconditionally, interior
    /// values are weighted by how often the node was visited.
    pub fn score(&self, count_weight: f32) -> f32 {
        if self.is_win() {
            BOOK_WIN
        } else if self.is_loss() {
            BOOK_LOSS
        } else {
            self.value + count_weight * (1.0 + self.count as f32).ln()
        }
    }
}

const ENTRY_SIZE: usize = 41;

/// A persistent opening book keyed by canonical position.
///
/// Opening an existing file loads it whole; `put` replaces in memory and
/// `flush` is the durability barrier, rewriting the file atomically. A
/// failed `open` returns an error and leaves any previously opened book
/// untouched in the caller's hands.
#[derive(Debug)]
pub struct Book {
    path: PathBuf,
    entries: HashMap<PositionKey, BookNode>,
}

impl Book {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut entries = HashMap::new();

        if path.exists() {
            let bytes = fs::read(&path)
                .with_context(|| format!("Failed to read book file at: {:?}", path))?;
            if bytes.len() % ENTRY_SIZE != 0 {
                bail!("Corrupt book file at {:?}: {} trailing bytes", path, bytes.len() % ENTRY_SIZE);
            }
            for chunk in bytes.chunks_exact(ENTRY_SIZE) {
                let (key, node) = Self::unpack_entry(chunk);
                entries.insert(key, node);
            }
        }

        info!("opened book at {:?} with {} positions", path, entries.len());
        Ok(Book { path, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, board: &Board) -> Option<BookNode> {
        let (key, _) = board.canonicalize();
        self.entries.get(&key).copied()
    }

    /// Inserts or replaces the node for the board's canonical position.
    pub fn put(&mut self, board: &Board, node: BookNode) {
        let (key, _) = board.canonicalize();
        self.entries.insert(key, node);
    }

    /// Durability barrier: every prior `put` reaches the file, written to a
    /// temporary and renamed into place.
    pub fn flush(&mut self) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        let mut bytes = Vec::with_capacity(self.entries.len() * ENTRY_SIZE);
        for (key, node) in &self.entries {
            Self::pack_entry(&mut bytes, key, node);
        }

        fs::write(&tmp, &bytes)
            .with_context(|| format!("Failed to write book file at: {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace book file at: {:?}", self.path))?;

        info!("flushed {} positions to {:?}", self.entries.len(), self.path);
        Ok(())
    }

    fn pack_entry(bytes: &mut Vec<u8>, key: &PositionKey, node: &BookNode) {
        bytes.extend_from_slice(&key.black.to_le_bytes());
        bytes.extend_from_slice(&key.white.to_le_bytes());
        bytes.push(key.black_to_move as u8);
        bytes.extend_from_slice(&node.value.to_le_bytes());
        bytes.extend_from_slice(&node.count.to_le_bytes());
    }

    fn unpack_entry(chunk: &[u8]) -> (PositionKey, BookNode) {
        let key = PositionKey {
            black: u128::from_le_bytes(chunk[0..16].try_into().unwrap()),
            white: u128::from_le_bytes(chunk[16..32].try_into().unwrap()),
            black_to_move: chunk[32] != 0,
        };
        let node = BookNode {
            value: f32::from_le_bytes(chunk[33..37].try_into().unwrap()),
            count: u32::from_le_bytes(chunk[37..41].try_into().unwrap()),
        };
        (key, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::{Color, ConstBoard};

    #[test]
    fn test_win_outranks_any_interior_value_and_loss() {
        let win = BookNode::with_count(BOOK_WIN, 5);
        let loss = BookNode::with_count(BOOK_LOSS, 50);
        let interior = BookNode::with_count(0.9, 1000);

        for count_weight in [0.0, 0.25, 1.0, 100.0] {
            assert!(win.score(count_weight) > loss.score(count_weight));
            assert!(win.score(count_weight) > interior.score(count_weight));
            assert!(interior.score(count_weight) > loss.score(count_weight));
        }
    }

    #[test]
    fn test_inverse_eval() {
        assert_eq!(inverse_eval(BOOK_WIN), BOOK_LOSS);
        assert_eq!(inverse_eval(BOOK_LOSS), BOOK_WIN);
        assert_eq!(inverse_eval(0.25), 0.75);
    }

    #[test]
    fn test_get_put_uses_canonical_position() {
        let cons = ConstBoard::new(3, 3);
        let dir = tempfile::tempdir().unwrap();
        let mut book = Book::open(dir.path().join("book.db")).unwrap();

        let mut plain = Board::with_const(cons.clone());
        plain.play_move(Color::Black, cons.cell(0, 0));
        book.put(&plain, BookNode::with_count(0.7, 3));

        // The rotated position must resolve to the same entry.
        let mut rotated = Board::with_const(cons.clone());
        rotated.play_move(Color::Black, cons.cell(2, 2));
        assert_eq!(book.get(&rotated), Some(BookNode::with_count(0.7, 3)));
    }

    #[test]
    fn test_flush_and_reopen_round_trip() {
        let cons = ConstBoard::new(3, 3);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.db");

        let mut board = Board::with_const(cons.clone());
        board.play_move(Color::Black, cons.cell(1, 1));

        {
            let mut book = Book::open(&path).unwrap();
            book.put(&board, BookNode::with_count(BOOK_WIN, 12));
            book.flush().unwrap();
        }

        let book = Book::open(&path).unwrap();
        assert_eq!(book.len(), 1);
        let node = book.get(&board).unwrap();
        assert!(node.is_win());
        assert_eq!(node.count, 12);
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.db");
        std::fs::write(&path, [0u8; ENTRY_SIZE + 3]).unwrap();

        assert!(Book::open(&path).is_err());
    }

    #[test]
    fn test_put_always_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = Book::open(dir.path().join("book.db")).unwrap();
        let board = Board::new(3, 3);

        book.put(&board, BookNode::with_count(0.4, 1));
        book.put(&board, BookNode::with_count(0.6, 2));
        assert_eq!(book.get(&board), Some(BookNode::with_count(0.6, 2)));
        assert_eq!(book.len(), 1);
    }
}
