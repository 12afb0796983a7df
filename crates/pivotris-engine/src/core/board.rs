use std::fmt;

use serde::Serialize;

use super::{
    piece::{Color, Tetromino},
    point::Point,
};

/// A settled cell on the board.
///
/// Blocks are created from the squares of a placed [`Tetromino`] and are owned
/// by the board cell they occupy. The stored position always matches that cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Block {
    #[serde(flatten)]
    position: Point,
    color: Color,
}

impl Block {
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    #[must_use]
    pub fn x(&self) -> i32 {
        self.position.x
    }

    #[must_use]
    pub fn y(&self) -> i32 {
        self.position.y
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }
}

/// A grid cell outside the board was addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cell ({x}, {y}) is outside the {width}x{height} board")]
pub struct OutOfBoundsError {
    pub x: i32,
    pub y: i32,
    pub width: usize,
    pub height: usize,
}

/// Why [`Board::place_tetromino`] refused a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum PlacementError {
    #[display("piece does not fit on the board: {_0}")]
    OutOfBounds(OutOfBoundsError),
    #[display("cell ({x}, {y}) is already occupied")]
    Occupied { x: i32, y: i32 },
}

type Row = Vec<Option<Block>>;

/// The playfield: a fixed `width` x `height` grid of optional blocks.
///
/// Row 0 is the top of the board. Pieces may hang above it (negative `y`)
/// while spawning; those cells are never stored.
///
/// # Example
///
/// ```
/// use pivotris_engine::{Board, PieceKind, Point, Tetromino};
///
/// let mut board = Board::new(10, 20);
/// let piece = Tetromino::from_kind(PieceKind::O, Point::new(4, 18));
/// assert!(!board.check_collision(&piece));
///
/// board.place_tetromino(&piece)?;
/// assert!(board.check_collision(&piece));
/// assert_eq!(board.clear_rows(), 0);
/// # Ok::<(), pivotris_engine::PlacementError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    width: usize,
    height: usize,
    grid: Vec<Row>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

impl Board {
    pub const DEFAULT_WIDTH: usize = 10;
    pub const DEFAULT_HEIGHT: usize = 20;

    /// Creates an empty board.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or too large for `i32` coordinates.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board must not be empty");
        assert!(
            i32::try_from(width).is_ok() && i32::try_from(height).is_ok(),
            "board dimensions must fit in i32 coordinates"
        );
        Self {
            width,
            height,
            grid: vec![vec![None; width]; height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Block>]> + '_ {
        self.grid.iter().map(Vec::as_slice)
    }

    /// All settled blocks, row by row from the top.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.grid.iter().flatten().flatten()
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.blocks().count()
    }

    /// Returns the block at `(x, y)`, or `None` if the cell is empty.
    pub fn cell(&self, x: i32, y: i32) -> Result<Option<&Block>, OutOfBoundsError> {
        let (col, row) = self.index(Point::new(x, y))?;
        Ok(self.grid[row][col].as_ref())
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> Result<bool, OutOfBoundsError> {
        self.cell(x, y).map(|block| block.is_some())
    }

    /// Returns `true` if row `y` exists and has no empty cell.
    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.grid
            .get(y)
            .is_some_and(|row| row.iter().all(Option::is_some))
    }

    /// Puts a single block at `(x, y)`, replacing whatever was there.
    ///
    /// Meant for setting up positions; pieces go through
    /// [`Self::place_tetromino`].
    pub fn set_block(&mut self, x: i32, y: i32, color: Color) -> Result<(), OutOfBoundsError> {
        let position = Point::new(x, y);
        let (col, row) = self.index(position)?;
        self.grid[row][col] = Some(Block { position, color });
        Ok(())
    }

    /// Checks whether `piece` hits a wall, the floor, or a settled block.
    ///
    /// Vertices are corner coordinates, so a vertex at `x == width` or
    /// `y == height` is still on the board edge; only `x < 0`, `x > width` and
    /// `y > height` are out of bounds. There is no ceiling.
    ///
    /// Squares above the board (`y < 0`) are not tested against the grid.
    #[must_use]
    pub fn check_collision(&self, piece: &Tetromino) -> bool {
        let (width, height) = self.signed_size();
        if piece
            .verts()
            .iter()
            .any(|v| v.x > width || v.x < 0 || v.y > height)
        {
            return true;
        }

        piece
            .squares()
            .iter()
            .filter(|s| s.y >= 0)
            .any(|s| self.is_occupied(s.x, s.y).unwrap_or(true))
    }

    /// Settles `piece` on the board as individual blocks of its color.
    ///
    /// Every square is validated before anything is written, so a failed
    /// placement leaves the board untouched.
    pub fn place_tetromino(&mut self, piece: &Tetromino) -> Result<(), PlacementError> {
        for s in piece.squares() {
            if self.is_occupied(s.x, s.y).map_err(PlacementError::OutOfBounds)? {
                return Err(PlacementError::Occupied { x: s.x, y: s.y });
            }
        }
        for &position in piece.squares() {
            let (col, row) = self.index(position).map_err(PlacementError::OutOfBounds)?;
            self.grid[row][col] = Some(Block {
                position,
                color: piece.color(),
            });
        }
        Ok(())
    }

    /// Clears filled rows and returns the number of rows cleared.
    ///
    /// Cleared rows are removed, everything above them shifts down by the number
    /// of cleared rows beneath it, and empty rows fill the top. Adjacent and
    /// separated full rows are all handled in the same pass.
    pub fn clear_rows(&mut self) -> usize {
        let mut count = 0;
        for y in (0..self.height).rev() {
            if self.is_row_full(y) {
                count += 1;
                continue;
            }
            if count > 0 {
                let row = std::mem::take(&mut self.grid[y]);
                self.grid[y + count] = row;
                let new_y = to_coord(y + count);
                for block in self.grid[y + count].iter_mut().flatten() {
                    block.position.y = new_y;
                }
            }
        }
        for row in &mut self.grid[..count] {
            *row = vec![None; self.width];
        }
        if count > 0 {
            log::trace!("cleared {count} rows");
        }
        count
    }

    fn signed_size(&self) -> (i32, i32) {
        (to_coord(self.width), to_coord(self.height))
    }

    fn index(&self, p: Point) -> Result<(usize, usize), OutOfBoundsError> {
        let col = usize::try_from(p.x).ok().filter(|&x| x < self.width);
        let row = usize::try_from(p.y).ok().filter(|&y| y < self.height);
        col.zip(row).ok_or(OutOfBoundsError {
            x: p.x,
            y: p.y,
            width: self.width,
            height: self.height,
        })
    }
}

/// Converts a grid index to a coordinate. Board dimensions are checked to fit
/// in `i32` on construction.
fn to_coord(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.grid {
            for cell in row {
                f.write_str(if cell.is_some() { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::PieceKind;

    const GRAY: Color = Color::rgb(128, 128, 128);

    fn fill_row(board: &mut Board, y: i32) {
        for x in 0..to_coord(board.width()) {
            board.set_block(x, y, GRAY).unwrap();
        }
    }

    fn assert_positions_consistent(board: &Board) {
        for (y, row) in board.rows().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if let Some(block) = cell {
                    assert_eq!(
                        block.position(),
                        Point::new(to_coord(x), to_coord(y)),
                        "block stored at ({x}, {y}) has stale coordinates"
                    );
                }
            }
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(10, 20);
        assert_eq!(board.width(), 10);
        assert_eq!(board.height(), 20);
        assert_eq!(board.rows().count(), 20);
        assert!(board.rows().all(|row| row.len() == 10));
        assert_eq!(board.occupied_count(), 0);
        assert_eq!(Board::default(), board);
    }

    #[test]
    #[should_panic(expected = "board must not be empty")]
    fn test_zero_sized_board_panics() {
        let _ = Board::new(0, 20);
    }

    #[test]
    fn test_cell_bounds() {
        let board = Board::new(10, 20);
        assert_eq!(board.cell(0, 0), Ok(None));
        assert_eq!(board.cell(9, 19), Ok(None));
        for (x, y) in [(-1, 0), (0, -1), (10, 0), (0, 20)] {
            assert_eq!(
                board.cell(x, y),
                Err(OutOfBoundsError {
                    x,
                    y,
                    width: 10,
                    height: 20
                })
            );
        }
        assert_eq!(
            board.cell(10, 3).unwrap_err().to_string(),
            "cell (10, 3) is outside the 10x20 board"
        );
    }

    #[test]
    fn test_piece_inside_empty_board_does_not_collide() {
        let board = Board::new(10, 20);
        for kind in PieceKind::ALL {
            let piece = Tetromino::from_kind(kind, Point::new(0, 0));
            assert!(!board.check_collision(&piece), "{kind} at top-left");
            let height = kind.base_verts().map(|v| v.y).into_iter().max().unwrap();
            let offset = Point::new(10 - kind.width(), 20 - height);
            let piece = Tetromino::from_kind(kind, offset);
            assert!(!board.check_collision(&piece), "{kind} at bottom-right");
            assert!(piece.squares().iter().any(|s| s.y == 19), "{kind}");
            assert!(board.check_collision(&piece.translated(0, 1)), "{kind}");
            assert!(board.check_collision(&piece.translated(1, 0)), "{kind}");
        }
    }

    #[test]
    fn test_wall_and_floor_collision() {
        let board = Board::new(10, 20);
        let piece = Tetromino::from_kind(PieceKind::T, Point::new(0, 0));
        assert!(board.check_collision(&piece.translated(-1, 0)));
        assert!(board.check_collision(&piece.translated(8, 0)));
        assert!(!board.check_collision(&piece.translated(7, 0)));
        // Vertices may touch the far edges: the T spans two rows
        assert!(board.check_collision(&piece.translated(0, 19)));
        assert!(!board.check_collision(&piece.translated(0, 18)));
    }

    #[test]
    fn test_no_ceiling_above_board() {
        let board = Board::new(10, 20);
        let piece = Tetromino::from_kind(PieceKind::I, Point::new(3, -3));
        assert!(piece.squares().iter().all(|s| s.y < 0));
        assert!(!board.check_collision(&piece));
    }

    #[test]
    fn test_squares_above_board_skip_occupancy_check() {
        let mut board = Board::new(10, 20);
        board.set_block(4, 0, GRAY).unwrap();
        // O-piece covering (4..6, -1..1): (4, 0) is occupied
        let piece = Tetromino::from_kind(PieceKind::O, Point::new(4, -1));
        assert!(board.check_collision(&piece));
        // One row higher every square is above the board
        let piece = piece.translated(0, -1);
        assert!(!board.check_collision(&piece));
    }

    #[test]
    fn test_collision_with_settled_block() {
        let mut board = Board::new(10, 20);
        board.set_block(5, 19, GRAY).unwrap();
        let piece = Tetromino::from_kind(PieceKind::O, Point::new(4, 17));
        assert!(!board.check_collision(&piece));
        assert!(board.check_collision(&piece.translated(0, 1)));
        assert!(!board.check_collision(&piece.translated(2, 1)));
    }

    #[test]
    fn test_place_then_collide_with_itself() {
        for kind in PieceKind::ALL {
            let mut board = Board::new(10, 20);
            let piece = Tetromino::from_kind(kind, Point::new(3, 10)).rotated();
            assert!(!board.check_collision(&piece));
            board.place_tetromino(&piece).unwrap();
            assert!(board.check_collision(&piece), "{kind}");
            assert_eq!(board.occupied_count(), 4);
            for s in piece.squares() {
                let block = board.cell(s.x, s.y).unwrap().unwrap();
                assert_eq!(block.color(), kind.color());
                assert_eq!(block.position(), *s);
            }
            assert_positions_consistent(&board);
        }
    }

    #[test]
    fn test_place_on_occupied_cell_is_rejected() {
        let mut board = Board::new(10, 20);
        board.set_block(5, 19, GRAY).unwrap();
        let before = board.clone();
        let piece = Tetromino::from_kind(PieceKind::O, Point::new(4, 18));
        assert_eq!(
            board.place_tetromino(&piece),
            Err(PlacementError::Occupied { x: 5, y: 19 })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_square_off_grid_collides_even_with_vertices_inside() {
        let board = Board::new(10, 20);
        // A unit-square outline anchoring a full I-piece: vertices stay in
        // x 8..=9 while the cells run through x 8..=11
        let verts = [
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(1, 1),
            Point::new(0, 1),
        ];
        let piece = Tetromino::new(PieceKind::I, verts, GRAY, Point::new(8, 3));
        assert!(piece.verts().iter().all(|v| (0..=10).contains(&v.x)));
        assert!(piece.squares().contains(&Point::new(10, 3)));
        assert!(piece.squares().contains(&Point::new(11, 3)));

        assert!(board.check_collision(&piece));
        let mut board = board;
        assert!(board.place_tetromino(&piece).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn test_place_out_of_bounds_is_rejected() {
        let mut board = Board::new(10, 20);
        let piece = Tetromino::from_kind(PieceKind::O, Point::new(4, -1));
        let err = board.place_tetromino(&piece).unwrap_err();
        assert!(err.is_out_of_bounds());
        assert_eq!(board.occupied_count(), 0);

        let piece = Tetromino::from_kind(PieceKind::O, Point::new(9, 5));
        assert!(board.place_tetromino(&piece).unwrap_err().is_out_of_bounds());
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_clear_rows_none_full() {
        let mut board = Board::new(10, 20);
        for x in 0..9 {
            board.set_block(x, 19, GRAY).unwrap();
        }
        let before = board.clone();
        assert_eq!(board.clear_rows(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_bottom_row_with_holed_row_above() {
        let mut board = Board::new(10, 20);
        fill_row(&mut board, 19);
        for x in 1..10 {
            board.set_block(x, 18, GRAY).unwrap();
        }
        board.set_block(3, 5, GRAY).unwrap();

        assert_eq!(board.clear_rows(), 1);

        assert_eq!(board.rows().count(), 20);
        assert!(board.rows().next().unwrap().iter().all(Option::is_none));
        // Former row 18 is now the bottom row and still has its hole
        assert!(!board.is_row_full(19));
        assert_eq!(board.is_occupied(0, 19), Ok(false));
        assert!((1..10).all(|x| board.is_occupied(x, 19) == Ok(true)));
        assert_eq!(board.is_occupied(3, 6), Ok(true));
        assert_eq!(board.is_occupied(3, 5), Ok(false));
        assert_eq!(board.occupied_count(), 10);
        assert_positions_consistent(&board);
    }

    #[test]
    fn test_clear_two_adjacent_full_rows() {
        let mut board = Board::new(10, 20);
        fill_row(&mut board, 18);
        fill_row(&mut board, 19);
        board.set_block(7, 17, GRAY).unwrap();

        assert_eq!(board.clear_rows(), 2);

        assert!(board.rows().take(2).all(|row| row.iter().all(Option::is_none)));
        assert_eq!(board.occupied_count(), 1);
        assert_eq!(board.is_occupied(7, 19), Ok(true));
        assert_positions_consistent(&board);
    }

    #[test]
    fn test_clear_separated_full_rows() {
        let mut board = Board::new(4, 6);
        // 0 ....
        // 1 #...
        // 2 ####
        // 3 .#..
        // 4 ####
        // 5 ..#.
        board.set_block(0, 1, GRAY).unwrap();
        fill_row(&mut board, 2);
        board.set_block(1, 3, GRAY).unwrap();
        fill_row(&mut board, 4);
        board.set_block(2, 5, GRAY).unwrap();

        assert_eq!(board.clear_rows(), 2);
        assert_eq!(board.to_string(), "....\n....\n....\n#...\n.#..\n..#.\n");
        assert_positions_consistent(&board);
    }

    #[test]
    fn test_clear_every_row() {
        let mut board = Board::new(3, 4);
        for y in 0..4 {
            fill_row(&mut board, y);
        }
        assert_eq!(board.clear_rows(), 4);
        assert_eq!(board, Board::new(3, 4));
    }

    #[test]
    fn test_lock_and_clear_with_pieces() {
        let mut board = Board::new(4, 4);
        let piece = Tetromino::from_kind(PieceKind::I, Point::new(0, 2));
        assert!(piece.squares().iter().all(|s| s.y == 2));
        board.place_tetromino(&piece).unwrap();
        let piece = Tetromino::from_kind(PieceKind::I, Point::new(0, 1));
        board.place_tetromino(&piece).unwrap();
        board.set_block(2, 3, GRAY).unwrap();

        assert_eq!(board.clear_rows(), 2);
        assert_eq!(board.to_string(), "....\n....\n....\n..#.\n");
    }

    #[test]
    fn test_serialization() {
        let mut board = Board::new(2, 2);
        board.set_block(1, 1, Color::rgb(255, 0, 0)).unwrap();
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "width": 2,
                "height": 2,
                "grid": [
                    [null, null],
                    [null, {"x": 1, "y": 1, "color": "#ff0000"}],
                ],
            })
        );
    }
}
