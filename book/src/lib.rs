pub mod book;
pub mod book_util;
pub mod options;

pub use book::*;
pub use book_util::*;
pub use options::*;
