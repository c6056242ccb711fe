use log::info;

use board::{Board, Cell, Color, PositionKey};

use crate::proof::{ProofFlags, ProofRecord};
use crate::tt::ProofStore;
use crate::vc::Connections;
use crate::vc_util::mustplay;

#[derive(Debug, Default, Clone, Copy)]
pub struct SolverStats {
    pub nodes: u64,
    pub transpositions: u64,
    pub mirror_transpositions: u64,
}

/// Depth-first proof solver. Proves a forced win or loss for the player to
/// move, consulting and filling the injected proof store so transposed and
/// rotated states are never solved twice.
pub struct DfsSolver<'a, S: ProofStore> {
    store: &'a mut S,
    stats: SolverStats,
}

impl<'a, S: ProofStore> DfsSolver<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        DfsSolver {
            store,
            stats: SolverStats::default(),
        }
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    /// Proves the position for `color` to move. The board is mutated during
    /// the search and restored exactly before returning.
    pub fn solve(&mut self, board: &mut Board, color: Color) -> ProofRecord {
        let mut conns = [
            Connections::build(board, Color::Black),
            Connections::build(board, Color::White),
        ];
        let record = self.solve_state(board, &mut conns, color);

        info!(
            "solved {}x{} position for {:?}: win={} numstates={} nummoves={} nodes={}",
            board.cons().width(),
            board.cons().height(),
            color,
            record.win,
            record.numstates,
            record.nummoves,
            self.stats.nodes
        );
        record
    }

    fn solve_state(
        &mut self,
        board: &mut Board,
        conns: &mut [Connections; 2],
        color: Color,
    ) -> ProofRecord {
        self.stats.nodes += 1;

        let (key, rotated) = board.canonicalize();
        if let Some(mut record) = self.store.get(&key) {
            if record.initialized() {
                if rotated {
                    record.rotate(board.cons());
                    record.flags = ProofFlags::MirrorTransposition;
                    self.stats.mirror_transpositions += 1;
                } else {
                    record.flags = ProofFlags::Transposition;
                    self.stats.transpositions += 1;
                }
                return record;
            }
        }

        let other = !color;
        let fallback_move = board.empty().first().unwrap_or(Cell::INVALID);

        // A full edge-to-edge connection decides the game outright.
        if conns[other.index()].full_exists() {
            let record = ProofRecord::new(false, 1, 0, fallback_move);
            self.store_canonical(board, key, rotated, record);
            return record;
        }
        if conns[color.index()].full_exists() {
            let record = ProofRecord::new(true, 1, 0, fallback_move);
            self.store_canonical(board, key, rotated, record);
            return record;
        }

        let mut candidates = mustplay(board, &conns[other.index()]);
        if candidates.is_empty() {
            // The connection closure is bounded and may under-approximate
            // the opponent's threats; an empty mustplay without a full
            // connection must not be misread as a decided position.
            candidates = board.empty();
        }

        let mut sum_states: u32 = 0;
        let mut min_delay = u32::MAX;
        let mut most_delaying: Option<(Cell, u32)> = None;

        for cell in candidates.iter() {
            let mut scope = MoveScope::play(board, conns, color, cell);
            let (child_board, child_conns) = scope.parts();

            // A move completing our own connection wins without recursing.
            if child_conns[color.index()].full_exists() {
                drop(scope);
                let record = ProofRecord::new(true, 1, 0, cell);
                self.store_canonical(board, key, rotated, record);
                return record;
            }

            let child = self.solve_state(child_board, child_conns, other);
            drop(scope);

            sum_states = sum_states.saturating_add(child.numstates);
            if !child.win {
                let record = ProofRecord::new(
                    true,
                    child.numstates.saturating_add(1),
                    child.nummoves,
                    cell,
                );
                self.store_canonical(board, key, rotated, record);
                return record;
            }

            // All wins for the opponent so far; remember the most delaying
            // reply (ties break to the lowest cell index).
            min_delay = min_delay.min(child.nummoves);
            match most_delaying {
                Some((_, delay)) if delay >= child.nummoves => {}
                _ => most_delaying = Some((cell, child.nummoves)),
            }
        }

        let (bestmove, _) = most_delaying.expect("undecided position with no candidate moves");
        let record = ProofRecord::new(
            false,
            sum_states.saturating_add(1),
            min_delay.saturating_add(1),
            bestmove,
        );
        self.store_canonical(board, key, rotated, record);
        record
    }

    /// Stores a record under the canonical key, re-expressing its move in
    /// canonical coordinates when the query board is the rotated form.
    fn store_canonical(
        &mut self,
        board: &Board,
        key: PositionKey,
        rotated: bool,
        record: ProofRecord,
    ) {
        let mut stored = record;
        if rotated {
            stored.rotate(board.cons());
        }
        self.store.put(key, stored);
    }
}

/// Applies a move to the board and both connection sets, undoing all three
/// on drop so every exit path of the search loop restores the position.
struct MoveScope<'a> {
    board: &'a mut Board,
    conns: &'a mut [Connections; 2],
    cell: Cell,
}

impl<'a> MoveScope<'a> {
    fn play(
        board: &'a mut Board,
        conns: &'a mut [Connections; 2],
        color: Color,
        cell: Cell,
    ) -> Self {
        board.play_move(color, cell);
        for side in conns.iter_mut() {
            side.play(board, cell);
        }
        MoveScope { board, conns, cell }
    }

    fn parts(&mut self) -> (&mut Board, &mut [Connections; 2]) {
        (&mut *self.board, &mut *self.conns)
    }
}

impl Drop for MoveScope<'_> {
    fn drop(&mut self) {
        for side in self.conns.iter_mut() {
            side.undo();
        }
        self.board.undo_move(self.cell);
    }
}
