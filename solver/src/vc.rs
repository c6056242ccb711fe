use std::collections::HashMap;

use itertools::Itertools;
use log::debug;

use board::{Bitset, Board, Cell, Color};

use crate::vc_util::valid_edge_bridge;

/// Soft cap on full connections kept per endpoint pair.
const MAX_FULLS_PER_PAIR: usize = 16;

/// Soft cap on semi connections kept per endpoint pair.
const MAX_SEMIS_PER_PAIR: usize = 32;

/// Guard against a runaway closure loop. The closure reaches a fixpoint well
/// before this on any supported board.
const MAX_CLOSURE_PASSES: usize = 64;

type PairKey = (Cell, Cell);

/// Connections proven between one endpoint pair. Fulls are realizable
/// independent of other connections; semis may conflict on shared carrier
/// cells. Every full is trivially also a semi, so queries over semis
/// consider both lists.
#[derive(Clone, Default, Debug)]
struct VcList {
    fulls: Vec<Bitset>,
    semis: Vec<Bitset>,
}

impl VcList {
    fn is_empty(&self) -> bool {
        self.fulls.is_empty() && self.semis.is_empty()
    }
}

/// The set of virtual connections proven for one color.
///
/// Endpoints are the color's stones (edges included) and empty cells.
/// The set is updated incrementally as the board mutates: `play` snapshots
/// the current connections, invalidates those whose carrier contains the
/// played cell, and re-closes; `undo` restores the snapshot.
#[derive(Clone, Debug)]
pub struct Connections {
    color: Color,
    edge_pair: PairKey,
    cells_mask: Bitset,
    lists: HashMap<PairKey, VcList>,
    snapshots: Vec<HashMap<PairKey, VcList>>,
}

impl Connections {
    pub fn new(color: Color) -> Self {
        let (a, b) = color.edges();
        Connections {
            color,
            edge_pair: Self::pair(a, b),
            cells_mask: Bitset::EMPTY,
            lists: HashMap::new(),
            snapshots: Vec::new(),
        }
    }

    pub fn build(board: &Board, color: Color) -> Self {
        let mut conns = Self::new(color);
        conns.rebuild(board);
        conns
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// True iff a full connection exists between the color's two edges,
    /// i.e. this color has already won.
    pub fn full_exists(&self) -> bool {
        self.lists
            .get(&self.edge_pair)
            .is_some_and(|list| !list.fulls.is_empty())
    }

    pub fn full_exists_between(&self, x: Cell, y: Cell) -> bool {
        self.lists
            .get(&Self::pair(x, y))
            .is_some_and(|list| !list.fulls.is_empty())
    }

    pub fn semi_exists_between(&self, x: Cell, y: Cell) -> bool {
        self.lists
            .get(&Self::pair(x, y))
            .is_some_and(|list| !list.is_empty())
    }

    /// Intersection of the carriers of every semi connection between the
    /// color's two edges. With no such connection nothing is constrained
    /// and the full cell mask is returned.
    pub fn semi_intersection(&self) -> Bitset {
        match self.lists.get(&self.edge_pair) {
            Some(list) if !list.is_empty() => {
                let mut inter = self.cells_mask;
                for carrier in list.fulls.iter().chain(list.semis.iter()) {
                    inter &= *carrier;
                }
                inter
            }
            _ => self.cells_mask,
        }
    }

    /// Full rebuild from scratch: base adjacency connections, edge bridges,
    /// then the closure.
    pub fn rebuild(&mut self, board: &Board) {
        self.cells_mask = board.cons().all_cells();
        self.lists.clear();

        let active = self.active_points(board);
        for x in active.iter() {
            for y in (board.cons().nbs(x) & active).iter() {
                if x < y {
                    self.add_full(x, y, Bitset::EMPTY);
                }
            }
        }

        self.seed_edge_bridges(board, active);
        self.close(board);
    }

    /// Incremental update after a stone lands on `cell`. The board has
    /// already been mutated. Pairs with `undo`.
    pub fn play(&mut self, board: &Board, cell: Cell) {
        self.snapshots.push(self.lists.clone());

        let friendly = board.color_at(cell) == Some(self.color);
        self.lists.retain(|&(x, y), list| {
            if !friendly && (x == cell || y == cell) {
                return false;
            }
            list.fulls.retain(|carrier| !carrier.test(cell));
            list.semis.retain(|carrier| !carrier.test(cell));
            !list.is_empty()
        });

        // An enemy stone only invalidates; a friendly stone also connects
        // to its neighborhood and may complete AND/OR combinations.
        if friendly {
            let active = self.active_points(board);
            for n in (board.cons().nbs(cell) & active).iter() {
                self.add_full(cell, n, Bitset::EMPTY);
            }
            self.close(board);
        }
    }

    /// Restores the connections as they were before the matching `play`.
    pub fn undo(&mut self) {
        self.lists = self
            .snapshots
            .pop()
            .expect("connection undo without matching play");
    }

    fn pair(x: Cell, y: Cell) -> PairKey {
        if x < y { (x, y) } else { (y, x) }
    }

    /// Points that can serve as connection endpoints for this color:
    /// friendly stones (edges included) and empty cells.
    fn active_points(&self, board: &Board) -> Bitset {
        board.stones(self.color) | board.empty()
    }

    fn seed_edge_bridges(&mut self, board: &Board, active: Bitset) {
        for a in board.empty().iter() {
            for b in (board.cons().nbs(a) & board.empty()).iter() {
                if a >= b {
                    continue;
                }
                let carrier = Bitset::from_cells(&[a, b]);
                if let Some(bridge) = valid_edge_bridge(board, carrier) {
                    if Color::owner_of_edge(bridge.edge) == self.color
                        && active.test(bridge.endpoint)
                    {
                        self.add_full(bridge.endpoint, bridge.edge, carrier);
                    }
                }
            }
        }
    }

    /// Runs the AND/OR closure to a fixpoint.
    ///
    /// AND: full(x,m) + full(m,y) with disjoint carriers combine through a
    /// friendly midpoint into full(x,y), or through an empty midpoint into
    /// semi(x,y) carrying the midpoint. OR: a greedy subset of semis whose
    /// carriers intersect to nothing yields a full carried by their union.
    fn close(&mut self, board: &Board) {
        let active = self.active_points(board);
        let points: Vec<Cell> = active.iter().collect();

        for pass in 0.. {
            if pass == MAX_CLOSURE_PASSES {
                debug!(
                    "{:?} connection closure stopped after {} passes",
                    self.color, pass
                );
                break;
            }

            let mut changed = false;

            for &m in &points {
                let m_empty = board.is_empty_cell(m);
                let partners: Vec<Cell> = points
                    .iter()
                    .copied()
                    .filter(|&x| x != m && self.has_full(x, m))
                    .collect();

                for (x, y) in partners.iter().copied().tuple_combinations() {
                    changed |= self.and_rule(x, m, y, m_empty);
                }
            }

            let keys: Vec<PairKey> = self.lists.keys().copied().collect();
            for key in keys {
                changed |= self.or_rule(key);
            }

            if !changed {
                break;
            }
        }
    }

    fn has_full(&self, x: Cell, m: Cell) -> bool {
        self.lists
            .get(&Self::pair(x, m))
            .is_some_and(|list| !list.fulls.is_empty())
    }

    fn and_rule(&mut self, x: Cell, m: Cell, y: Cell, m_empty: bool) -> bool {
        let left = self.lists[&Self::pair(x, m)].fulls.clone();
        let right = self.lists[&Self::pair(m, y)].fulls.clone();
        let mut changed = false;

        for &c1 in &left {
            for &c2 in &right {
                if c1.intersects(c2) {
                    continue;
                }
                let combined = c1 | c2;
                if combined.test(x) || combined.test(y) {
                    continue;
                }
                if m_empty {
                    changed |= self.add_semi(x, y, combined | Bitset::single(m));
                } else {
                    changed |= self.add_full(x, y, combined);
                }
            }
        }

        changed
    }

    /// Greedily picks semis whose carriers narrow the running intersection;
    /// when the intersection hits empty the picked union is a full.
    fn or_rule(&mut self, key: PairKey) -> bool {
        let semis = match self.lists.get(&key) {
            Some(list) if list.semis.len() >= 2 => list.semis.clone(),
            _ => return false,
        };

        let mut inter = self.cells_mask;
        let mut union = Bitset::EMPTY;
        let mut used = vec![false; semis.len()];

        loop {
            // Take the unused semi that narrows the intersection the most.
            let pick = (0..semis.len())
                .filter(|&i| !used[i] && (inter & semis[i]) != inter)
                .min_by_key(|&i| (inter & semis[i]).count());
            let pick = match pick {
                Some(pick) => pick,
                None => return false,
            };

            used[pick] = true;
            union |= semis[pick];
            inter &= semis[pick];
            if inter.is_empty() {
                return self.add_full(key.0, key.1, union);
            }
        }
    }

    fn add_full(&mut self, x: Cell, y: Cell, carrier: Bitset) -> bool {
        debug_assert!(!carrier.test(x) && !carrier.test(y));
        let list = self.lists.entry(Self::pair(x, y)).or_default();

        if list.fulls.iter().any(|c| c.is_subset_of(carrier)) {
            return false;
        }
        list.fulls.retain(|c| !carrier.is_subset_of(*c));

        if list.fulls.len() >= MAX_FULLS_PER_PAIR {
            return Self::replace_largest(&mut list.fulls, carrier);
        }
        list.fulls.push(carrier);
        true
    }

    fn add_semi(&mut self, x: Cell, y: Cell, carrier: Bitset) -> bool {
        debug_assert!(!carrier.test(x) && !carrier.test(y));
        let list = self.lists.entry(Self::pair(x, y)).or_default();

        // A full subsumes any semi with a larger carrier.
        if list.fulls.iter().any(|c| c.is_subset_of(carrier)) {
            return false;
        }
        if list.semis.iter().any(|c| c.is_subset_of(carrier)) {
            return false;
        }
        list.semis.retain(|c| !carrier.is_subset_of(*c));

        if list.semis.len() >= MAX_SEMIS_PER_PAIR {
            return Self::replace_largest(&mut list.semis, carrier);
        }
        list.semis.push(carrier);
        true
    }

    fn replace_largest(carriers: &mut [Bitset], carrier: Bitset) -> bool {
        let (idx, largest) = carriers
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| c.count())
            .expect("non-empty carrier list");
        if largest.count() > carrier.count() {
            carriers[idx] = carrier;
            true
        } else {
            debug!("carrier list full, dropping {:?}", carrier);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::ConstBoard;

    #[test]
    fn test_no_full_connection_on_empty_board() {
        let board = Board::new(3, 3);
        let conns = Connections::build(&board, Color::Black);
        assert!(!conns.full_exists());
    }

    #[test]
    fn test_semi_intersection_on_empty_board_pins_the_center() {
        // On the empty 3x3 every black edge-to-edge semi runs through the
        // center cell, so the intersection must contain it; and no full
        // may exist, or black would win without moving.
        let board = Board::new(3, 3);
        let conns = Connections::build(&board, Color::Black);

        let (n, s) = Color::Black.edges();
        assert!(conns.semi_exists_between(n, s));
        let inter = conns.semi_intersection();
        assert!(inter.test(board.cons().cell(1, 1)));
        assert!(inter.is_subset_of(board.cons().all_cells()));
    }

    #[test]
    fn test_solid_chain_is_a_full_connection() {
        let cons = ConstBoard::new(3, 3);
        let mut board = Board::with_const(cons.clone());
        board.play_move(Color::Black, cons.cell(0, 1));
        board.play_move(Color::White, cons.cell(2, 2));
        board.play_move(Color::Black, cons.cell(1, 1));
        board.play_move(Color::White, cons.cell(2, 0));
        board.play_move(Color::Black, cons.cell(2, 1));

        let conns = Connections::build(&board, Color::Black);
        assert!(conns.full_exists());
    }

    #[test]
    fn test_bridge_to_both_edges_wins() {
        // A lone center stone on 2x2 bridges to both black edges at once.
        let cons = ConstBoard::new(2, 2);
        let mut board = Board::with_const(cons.clone());
        board.play_move(Color::Black, cons.cell(0, 1));

        let conns = Connections::build(&board, Color::Black);
        assert!(conns.full_exists());
    }

    #[test]
    fn test_enemy_stone_invalidates_carriers() {
        let cons = ConstBoard::new(2, 2);
        let mut board = Board::with_const(cons.clone());
        board.play_move(Color::Black, cons.cell(0, 1));

        let mut conns = Connections::build(&board, Color::Black);
        assert!(conns.full_exists());

        // White takes one of the two completing cells: the full becomes a
        // semi through the remaining cell.
        board.play_move(Color::White, cons.cell(1, 0));
        conns.play(&board, cons.cell(1, 0));
        assert!(!conns.full_exists());
        assert!(conns.semi_intersection().test(cons.cell(1, 1)));

        conns.undo();
        board.undo_move(cons.cell(1, 0));
        assert!(conns.full_exists());
    }

    #[test]
    fn test_play_undo_matches_rebuild() {
        let cons = ConstBoard::new(3, 3);
        let mut board = Board::with_const(cons.clone());
        let mut conns = Connections::build(&board, Color::White);
        let baseline = conns.semi_intersection();

        let moves = [
            (Color::Black, cons.cell(1, 1)),
            (Color::White, cons.cell(1, 0)),
            (Color::Black, cons.cell(0, 2)),
        ];
        for (color, cell) in moves {
            board.play_move(color, cell);
            conns.play(&board, cell);
        }

        let fresh = Connections::build(&board, Color::White);
        assert_eq!(conns.full_exists(), fresh.full_exists());

        for (_, cell) in moves.iter().rev() {
            conns.undo();
            board.undo_move(*cell);
        }
        assert_eq!(conns.semi_intersection(), baseline);
    }
}
