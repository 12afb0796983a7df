use crate::{
    CompletePieceDropError, PieceCollisionError,
    core::{
        board::Board,
        piece::{PieceKind, Tetromino},
        point::Point,
    },
};

use super::piece_buffer::{PieceBuffer, PieceSeed};

/// A board plus the piece currently falling on it.
///
/// Every move is tried on a copy of the falling piece first and only committed
/// when [`Board::check_collision`] accepts it, so the falling piece is always
/// in a legal position (except right after a top-out, see
/// [`Self::is_game_over`]). Rotations have no wall kicks: a blocked rotation is
/// simply rejected.
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    falling_piece: Tetromino,
    piece_buffer: PieceBuffer,
    game_over: bool,
}

impl Default for GameField {
    fn default() -> Self {
        Self::new(Board::DEFAULT_WIDTH, Board::DEFAULT_HEIGHT)
    }
}

impl GameField {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_buffer(Board::new(width, height), PieceBuffer::new())
    }

    #[must_use]
    pub fn with_seed(width: usize, height: usize, seed: PieceSeed) -> Self {
        Self::with_buffer(Board::new(width, height), PieceBuffer::with_seed(seed))
    }

    fn with_buffer(board: Board, mut piece_buffer: PieceBuffer) -> Self {
        let falling_piece = spawn(&board, piece_buffer.pop_next());
        let game_over = board.check_collision(&falling_piece);
        Self {
            board,
            falling_piece,
            piece_buffer,
            game_over,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> &Tetromino {
        &self.falling_piece
    }

    /// Returns `true` once a newly spawned piece collided with the stack.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Replaces the falling piece if the candidate does not collide.
    pub fn set_falling_piece(&mut self, piece: Tetromino) -> Result<(), PieceCollisionError> {
        if self.board.check_collision(&piece) {
            log::trace!("rejected {piece}");
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.translated(-1, 0))
    }

    pub fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.translated(1, 0))
    }

    pub fn try_soft_drop(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.translated(0, 1))
    }

    pub fn try_rotate(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.rotated())
    }

    /// Drops the falling piece as far as it goes and returns the rows it fell.
    pub fn hard_drop(&mut self) -> usize {
        let mut rows = 0;
        while self.try_soft_drop().is_ok() {
            rows += 1;
        }
        rows
    }

    /// Locks the falling piece, clears full rows and spawns the next piece.
    ///
    /// Returns the number of cleared rows together with the outcome. When the
    /// new piece collides at its spawn position the game is over; the piece is
    /// still installed so it can be shown overlapping the stack.
    pub fn complete_piece_drop(&mut self) -> (usize, Result<(), CompletePieceDropError>) {
        if let Err(e) = self.board.place_tetromino(&self.falling_piece) {
            log::debug!("failed to lock {}: {e}", self.falling_piece);
            self.game_over = true;
            return (0, Err(CompletePieceDropError::Placement(e)));
        }
        log::debug!("locked {}", self.falling_piece);

        let cleared_rows = self.board.clear_rows();
        if cleared_rows > 0 {
            log::debug!("cleared {cleared_rows} rows");
        }

        self.falling_piece = spawn(&self.board, self.piece_buffer.pop_next());
        if self.board.check_collision(&self.falling_piece) {
            log::debug!("top out: {} collides at spawn", self.falling_piece);
            self.game_over = true;
            return (
                cleared_rows,
                Err(CompletePieceDropError::NewPieceCollision),
            );
        }

        (cleared_rows, Ok(()))
    }
}

/// Creates a piece horizontally centered at the top of the board.
fn spawn(board: &Board, kind: PieceKind) -> Tetromino {
    let width = i32::try_from(board.width()).unwrap_or(i32::MAX);
    let x = (width - kind.width()) / 2;
    Tetromino::from_kind(kind, Point::new(x, 0))
}
