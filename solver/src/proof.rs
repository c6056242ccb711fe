use board::{Cell, ConstBoard};

/// How a returned proof relates to the state it was queried for.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ProofFlags {
    #[default]
    None,
    /// The proof was found stored for the queried state itself.
    Transposition,
    /// The proof was found stored for the 180-degree rotation of the
    /// queried state.
    MirrorTransposition,
}

impl ProofFlags {
    fn to_bits(self) -> u8 {
        match self {
            ProofFlags::None => 0,
            ProofFlags::Transposition => 1,
            ProofFlags::MirrorTransposition => 2,
        }
    }

    fn from_bits(bits: u8) -> ProofFlags {
        match bits {
            1 => ProofFlags::Transposition,
            2 => ProofFlags::MirrorTransposition,
            _ => ProofFlags::None,
        }
    }
}

/// A solved state: the outcome for the player to move plus a compact proof
/// summary. Stored in the transposition table and persisted stores.
///
/// `bestmove` must be a winning move in winning states; in losing states it
/// is the most delaying move. A record is initialized iff `bestmove` is a
/// valid cell; the default record is never a valid proof.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProofRecord {
    /// True if the player to move wins.
    pub win: bool,
    pub flags: ProofFlags,
    /// Number of states in the proof tree of this result.
    pub numstates: u32,
    /// Moves the losing player can delay until the winning player's
    /// connection is forced.
    pub nummoves: u32,
    pub bestmove: Cell,
}

impl Default for ProofRecord {
    fn default() -> Self {
        ProofRecord {
            win: false,
            flags: ProofFlags::None,
            numstates: 0,
            nummoves: 0,
            bestmove: Cell::INVALID,
        }
    }
}

impl ProofRecord {
    /// Packed wire size in bytes: win/flags byte, numstates, nummoves,
    /// bestmove. The layout is an exact round-trip contract.
    pub const PACKED_SIZE: usize = 10;

    pub fn new(win: bool, numstates: u32, nummoves: u32, bestmove: Cell) -> Self {
        ProofRecord {
            win,
            flags: ProofFlags::None,
            numstates,
            nummoves,
            bestmove,
        }
    }

    /// True if this record differs from the default-constructed one, i.e.
    /// holds an actual proof.
    pub fn initialized(&self) -> bool {
        self.bestmove.is_valid()
    }

    pub fn pack(&self) -> [u8; Self::PACKED_SIZE] {
        let mut bytes = [0u8; Self::PACKED_SIZE];
        bytes[0] = (self.win as u8) | (self.flags.to_bits() << 1);
        bytes[1..5].copy_from_slice(&self.numstates.to_le_bytes());
        bytes[5..9].copy_from_slice(&self.nummoves.to_le_bytes());
        bytes[9] = self.bestmove.index() as u8;
        bytes
    }

    pub fn unpack(bytes: &[u8; Self::PACKED_SIZE]) -> Self {
        let numstates = u32::from_le_bytes(bytes[1..5].try_into().unwrap());
        let nummoves = u32::from_le_bytes(bytes[5..9].try_into().unwrap());
        let bestmove = if bytes[9] == u8::MAX {
            Cell::INVALID
        } else {
            Cell::from_index(bytes[9] as usize)
        };
        ProofRecord {
            win: bytes[0] & 1 != 0,
            flags: ProofFlags::from_bits(bytes[0] >> 1),
            numstates,
            nummoves,
            bestmove,
        }
    }

    /// Re-expresses `bestmove` in 180-degree rotated coordinates. Applying
    /// twice is the identity.
    pub fn rotate(&mut self, cons: &ConstBoard) {
        if self.bestmove.is_valid() {
            self.bestmove = cons.rotate(self.bestmove);
        }
    }
}
