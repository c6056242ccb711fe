pub mod dfs;
pub mod proof;
pub mod tt;
pub mod vc;
pub mod vc_util;

pub use dfs::*;
pub use proof::*;
pub use tt::*;
pub use vc::*;
pub use vc_util::*;
