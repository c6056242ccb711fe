use board::{Bitset, Board, Cell, Color};

use crate::vc::Connections;

/// A recognized two-cell bridge touching a board edge: either carrier cell
/// completes the connection between `endpoint` and `edge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeBridge {
    pub endpoint: Cell,
    pub edge: Cell,
}

/// The minimal set of moves the player to move must consider.
///
/// `other_conns` are the opponent's connections. If the opponent already
/// holds a full edge-to-edge connection the game is decided and no move is
/// relevant; otherwise a defending move outside every opponent edge-to-edge
/// semi carrier cannot block anything, so only the carrier intersection
/// restricted to empty cells remains.
pub fn mustplay(board: &Board, other_conns: &Connections) -> Bitset {
    if other_conns.full_exists() {
        Bitset::EMPTY
    } else {
        board.empty() & other_conns.semi_intersection()
    }
}

/// Recognizes the canonical two-cell bridge from a cell to a board edge.
///
/// The carrier must hold exactly two empty, mutually adjacent cells. Two
/// adjacent cells always share exactly two common neighbors; a violation
/// means the adjacency tables are corrupt and is fatal. The bridge is valid
/// iff one of the common neighbors is an edge; the other becomes the
/// endpoint.
pub fn valid_edge_bridge(board: &Board, carrier: Bitset) -> Option<EdgeBridge> {
    if carrier.count() != 2 {
        return None;
    }
    if board.occupied().intersects(carrier) {
        return None;
    }

    let mut cells = carrier.iter();
    let (a, b) = (cells.next().unwrap(), cells.next().unwrap());
    if !board.cons().adjacent(a, b) {
        return None;
    }

    let common = board.cons().nbs(a) & board.cons().nbs(b);
    assert!(
        common.count() == 2,
        "adjacent cells {} and {} share {} common neighbors",
        a,
        b,
        common.count()
    );

    let mut nbs = common.iter();
    let (first, second) = (nbs.next().unwrap(), nbs.next().unwrap());
    if first.is_edge() {
        Some(EdgeBridge {
            endpoint: second,
            edge: first,
        })
    } else if second.is_edge() {
        Some(EdgeBridge {
            endpoint: first,
            edge: second,
        })
    } else {
        None
    }
}
