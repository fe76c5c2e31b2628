//! Board-level data structures.
//!
//! Cells are indexed row-major from the top-left corner:
//!
//! ```text
//! 0 | 1 | 2
//! --+---+--
//! 3 | 4 | 5
//! --+---+--
//! 6 | 7 | 8
//! ```

pub use self::{board::*, player::*};

mod board;
mod player;
