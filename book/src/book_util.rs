use std::collections::HashSet;

use anyhow::Result;
use itertools::Itertools;
use log::warn;
use serde::Serialize;

use board::{Board, Cell, MoveGuard, PositionKey};
use solver::ProofRecord;

use crate::book::{inverse_eval, Book, BookNode, BOOK_LOSS, BOOK_WIN};
use crate::options::BookOptions;

/// Visit counts of every book child of the current position.
pub fn counts(book: &Book, board: &mut Board) -> Vec<(Cell, u32)> {
    let color = board.whose_turn();
    let mut out = Vec::new();
    for cell in board.empty().iter() {
        let guard = MoveGuard::play(board, color, cell);
        if let Some(node) = book.get(guard.board()) {
            out.push((cell, node.count));
        }
    }
    out
}

/// Scores of every book child from the mover's perspective, best first.
/// The sort is stable, so equally scored moves stay in cell order.
pub fn scores(book: &Book, board: &mut Board, count_weight: f32) -> Vec<(Cell, f32)> {
    let color = board.whose_turn();
    let mut scored = Vec::new();
    for cell in board.empty().iter() {
        let guard = MoveGuard::play(board, color, cell);
        if let Some(node) = book.get(guard.board()) {
            let for_mover = BookNode::with_count(inverse_eval(node.value), node.count);
            scored.push((cell, for_mover.score(count_weight)));
        }
    }
    scored
        .into_iter()
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
        .collect()
}

/// The best trusted book move: proven nodes are always trusted, unproven
/// ones only once they have at least `min_count` visits.
pub fn best_move(book: &Book, board: &mut Board, options: &BookOptions) -> Option<Cell> {
    let color = board.whose_turn();
    let mut best: Option<(Cell, f32)> = None;
    for cell in board.empty().iter() {
        let guard = MoveGuard::play(board, color, cell);
        let node = match book.get(guard.board()) {
            Some(node) => node,
            None => continue,
        };
        if !node.is_terminal() && node.count < options.min_count {
            continue;
        }
        let score = BookNode::with_count(inverse_eval(node.value), node.count)
            .score(options.count_weight);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((cell, score));
        }
    }
    best.map(|(cell, _)| cell)
}

/// Length of the trusted main line from this position through the book.
pub fn main_line_depth(book: &Book, board: &mut Board, options: &BookOptions) -> usize {
    match best_move(book, board, options) {
        Some(cell) => {
            let color = board.whose_turn();
            let mut guard = MoveGuard::play(board, color, cell);
            1 + main_line_depth(book, guard.board_mut(), options)
        }
        None => 0,
    }
}

/// Stores a solved proof for the board's position. Returns false for an
/// uninitialized record.
pub fn import_proof(book: &mut Book, board: &Board, record: &ProofRecord) -> bool {
    if !record.initialized() {
        return false;
    }
    let value = if record.win { BOOK_WIN } else { BOOK_LOSS };
    let node = match book.get(board) {
        Some(mut node) => {
            node.value = value;
            node
        }
        None => BookNode::new(value),
    };
    book.put(board, node);
    true
}

/// Imports externally solved lines. Each line is a move sequence from the
/// current position (colors alternating from the side to move) and the
/// proven outcome for the player to move at its end. Returns the number of
/// lines imported.
pub fn import_solved<I>(book: &mut Book, board: &mut Board, lines: I) -> usize
where
    I: IntoIterator<Item = (Vec<Cell>, bool)>,
{
    let mut imported = 0;
    for (moves, win) in lines {
        if import_line(book, board, &moves, win) {
            imported += 1;
        }
    }
    imported
}

fn import_line(book: &mut Book, board: &mut Board, moves: &[Cell], win: bool) -> bool {
    match moves.split_first() {
        None => {
            let value = if win { BOOK_WIN } else { BOOK_LOSS };
            let node = match book.get(board) {
                Some(mut node) => {
                    node.value = value;
                    node
                }
                None => BookNode::new(value),
            };
            book.put(board, node);
            true
        }
        Some((&cell, rest)) => {
            if !board.is_empty_cell(cell) {
                warn!("skipping solved line through occupied point {}", cell);
                return false;
            }
            let color = board.whose_turn();
            let mut guard = MoveGuard::play(board, color, cell);
            import_line(book, guard.board_mut(), rest, win)
        }
    }
}

/// Sets the value of the current position directly and flushes, preserving
/// any existing visit count.
pub fn set_value(book: &mut Book, board: &Board, value: f32) -> Result<()> {
    let node = match book.get(board) {
        Some(mut node) => {
            node.value = value;
            node
        }
        None => BookNode::new(value),
    };
    book.put(board, node);
    book.flush()
}

/// A non-terminal book leaf whose value is polarized, with the variation
/// reaching it.
#[derive(Debug, Clone, Serialize)]
pub struct LeafRecord {
    pub variation: Vec<String>,
    pub value: f32,
    pub count: u32,
}

/// Collects variations leading to non-terminal leaves whose value deviates
/// from 0.5 by at least `polarization`, skipping positions in `ignore`.
pub fn dump_polarized_leafs(
    book: &Book,
    board: &mut Board,
    polarization: f32,
    ignore: &HashSet<PositionKey>,
) -> Vec<LeafRecord> {
    let mut out = Vec::new();
    let mut variation = Vec::new();
    let mut visited = HashSet::new();
    polarized_walk(book, board, polarization, ignore, &mut variation, &mut visited, &mut out);
    out
}

fn polarized_walk(
    book: &Book,
    board: &mut Board,
    polarization: f32,
    ignore: &HashSet<PositionKey>,
    variation: &mut Vec<Cell>,
    visited: &mut HashSet<PositionKey>,
    out: &mut Vec<LeafRecord>,
) {
    let (key, _) = board.canonicalize();
    if !visited.insert(key) {
        return;
    }
    let node = match book.get(board) {
        Some(node) => node,
        None => return,
    };

    let color = board.whose_turn();
    let mut has_child = false;
    for cell in board.empty().iter() {
        let mut guard = MoveGuard::play(board, color, cell);
        if book.get(guard.board()).is_some() {
            has_child = true;
            variation.push(cell);
            polarized_walk(book, guard.board_mut(), polarization, ignore, variation, visited, out);
            variation.pop();
        }
    }

    if !has_child
        && !node.is_terminal()
        && (node.value - 0.5).abs() >= polarization
        && !ignore.contains(&key)
    {
        out.push(LeafRecord {
            variation: variation.iter().map(|c| board.cons().cell_name(*c)).collect(),
            value: node.value,
            count: node.count,
        });
    }
}

/// The polarized-leaf dump as pretty JSON, for external tooling.
pub fn dump_polarized_leafs_json(
    book: &Book,
    board: &mut Board,
    polarization: f32,
    ignore: &HashSet<PositionKey>,
) -> Result<String> {
    let leafs = dump_polarized_leafs(book, board, polarization, ignore);
    Ok(serde_json::to_string_pretty(&leafs)?)
}

/// (depth, value) of every book position reachable from this one, for
/// visualization.
pub fn visualization_data(book: &Book, board: &mut Board) -> Vec<(usize, f32)> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    viz_walk(book, board, 0, &mut visited, &mut out);
    out
}

fn viz_walk(
    book: &Book,
    board: &mut Board,
    depth: usize,
    visited: &mut HashSet<PositionKey>,
    out: &mut Vec<(usize, f32)>,
) {
    let (key, _) = board.canonicalize();
    if !visited.insert(key) {
        return;
    }
    let node = match book.get(board) {
        Some(node) => node,
        None => return,
    };
    out.push((depth, node.value));

    let color = board.whose_turn();
    for cell in board.empty().iter() {
        let mut guard = MoveGuard::play(board, color, cell);
        viz_walk(book, guard.board_mut(), depth + 1, visited, out);
    }
}
