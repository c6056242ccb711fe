pub mod bitset;
pub mod cell;
pub mod const_board;
pub mod stone_board;

pub use bitset::*;
pub use cell::*;
pub use const_board::*;
pub use stone_board::*;
