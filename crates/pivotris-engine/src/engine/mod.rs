//! Game driver built on top of the core geometry.
//!
//! - [`GameField`] - Board plus the falling piece, with checked moves
//! - [`PieceBuffer`] - 7-bag piece generation system
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Create a [`GameField`], optionally from a seed
//! 2. Move and rotate the falling piece; blocked moves are rejected
//! 3. Drop the piece and lock it with [`GameField::complete_piece_drop`]
//! 4. Full rows are cleared and the next piece spawns
//! 5. Repeat until a new piece collides at its spawn position
//!
//! # Example
//!
//! ```
//! use pivotris_engine::{GameField, PieceSeed};
//!
//! let mut field = GameField::with_seed(10, 20, PieceSeed::from_bytes([1; 16]));
//!
//! field.try_move_left().ok();
//! field.try_rotate().ok();
//! field.hard_drop();
//!
//! let (cleared_rows, result) = field.complete_piece_drop();
//! assert_eq!(cleared_rows, 0);
//! assert!(result.is_ok());
//! assert_eq!(field.board().occupied_count(), 4);
//! ```

pub use self::{game_field::*, piece_buffer::*};

mod game_field;
mod piece_buffer;
