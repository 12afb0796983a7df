//! Piece and grid geometry.
//!
//! - [`Point`] - lattice and fractional coordinates with quarter-turn rotation
//! - [`Tetromino`] - a piece's outline vertices and the cells they cover
//! - [`Board`] - the grid of settled blocks, collision testing and row clearing

pub use self::{board::*, piece::*, point::*};

pub(crate) mod board;
pub(crate) mod piece;
pub(crate) mod point;
