use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::point::Point;

/// A falling piece: four outline vertices plus the grid cells they cover.
///
/// The vertices are points on the piece outline in corner coordinates: the
/// cell `(x, y)` spans the corners `(x, y)` to `(x + 1, y + 1)`, and the
/// vertices span exactly the same box as the occupied cells (see
/// [`PieceKind::base_verts`]). The occupied cells (`squares`) are derived from `(kind, verts, orientation)`
/// with [`squares_for`] and are recomputed by every operation that touches
/// the vertices or the orientation.
///
/// Movement and rotation mutate the piece in place and never check bounds;
/// ask [`Board::check_collision`](super::board::Board::check_collision) whether
/// the result is legal. [`Tetromino::translated`] and [`Tetromino::rotated`]
/// return modified clones for trial moves.
///
/// # Example
///
/// ```
/// use pivotris_engine::{PieceKind, Point, Tetromino};
///
/// let mut piece = Tetromino::from_kind(PieceKind::T, Point::new(3, 0));
/// piece.translate(0, 1);
/// piece.rotate();
/// assert_eq!(piece.orientation().value(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tetromino {
    kind: PieceKind,
    verts: [Point; 4],
    color: Color,
    orientation: Orientation,
    squares: [Point; 4],
}

impl Tetromino {
    /// Creates a piece from explicit vertices, translated by `offset`.
    ///
    /// The orientation starts at 0.
    #[must_use]
    pub fn new(kind: PieceKind, verts: [Point; 4], color: Color, offset: Point) -> Self {
        let verts = verts.map(|v| v + offset);
        let orientation = Orientation::default();
        Self {
            kind,
            verts,
            color,
            orientation,
            squares: squares_for(kind, &verts, orientation),
        }
    }

    /// Creates a piece with the kind's base outline and default color.
    #[must_use]
    pub fn from_kind(kind: PieceKind, offset: Point) -> Self {
        Self::new(kind, kind.base_verts(), kind.color(), offset)
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn verts(&self) -> &[Point; 4] {
        &self.verts
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Grid cells covered by the piece.
    #[must_use]
    pub fn squares(&self) -> &[Point; 4] {
        &self.squares
    }

    /// Moves every vertex by `(dx, dy)`.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        let delta = Point::new(dx, dy);
        for v in &mut self.verts {
            *v = *v + delta;
        }
        self.update_squares();
    }

    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        let mut piece = self.clone();
        piece.translate(dx, dy);
        piece
    }

    /// Returns the centroid of the vertices, the center of rotation.
    ///
    /// This is generally not a grid point and need not lie on an occupied cell.
    #[must_use]
    pub fn pivot(&self) -> Point<f64> {
        let sum = self
            .verts
            .iter()
            .fold(Point::new(0.0, 0.0), |acc, v| acc + v.to_f64());
        let n = 4.0;
        Point::new(sum.x / n, sum.y / n)
    }

    /// Rotates the piece a quarter turn around its [pivot](Self::pivot).
    ///
    /// Each rotated vertex is floored back onto the lattice and the orientation
    /// advances by one (modulo 4).
    pub fn rotate(&mut self) {
        let pivot = self.pivot();
        for v in &mut self.verts {
            *v = v.to_f64().rotated_around(pivot).floor();
        }
        self.orientation = self.orientation.rotated_right();
        self.update_squares();
    }

    #[must_use]
    pub fn rotated(&self) -> Self {
        let mut piece = self.clone();
        piece.rotate();
        piece
    }

    fn update_squares(&mut self) {
        self.squares = squares_for(self.kind, &self.verts, self.orientation);
    }
}

impl fmt::Display for Tetromino {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} verts [", self.kind)?;
        for (i, v) in self.verts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(
            f,
            "] color {} orientation {}",
            self.color, self.orientation
        )
    }
}

/// Derives the grid cells covered by a piece.
///
/// The cells are the kind's offsets for `orientation`, anchored at the top-left
/// corner (minimum x and minimum y) of `verts`.
///
/// ```
/// use pivotris_engine::{Orientation, PieceKind, Point, squares_for};
///
/// let verts = PieceKind::O.base_verts().map(|v| v + Point::new(4, 7));
/// let squares = squares_for(PieceKind::O, &verts, Orientation::default());
/// assert_eq!(
///     squares,
///     [Point::new(4, 7), Point::new(5, 7), Point::new(4, 8), Point::new(5, 8)],
/// );
/// ```
#[must_use]
pub fn squares_for(kind: PieceKind, verts: &[Point; 4], orientation: Orientation) -> [Point; 4] {
    let anchor = verts
        .iter()
        .copied()
        .reduce(|a, b| Point::new(a.x.min(b.x), a.y.min(b.y)))
        .unwrap_or_default();
    kind.square_offsets(orientation).map(|offset| anchor + offset)
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: one quarter turn
/// - `2`: half turn
/// - `3`: three quarter turns
///
/// Rotation wraps around modulo 4.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Orientation(u8);

impl Orientation {
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value < 4 { Some(Self(value)) } else { None }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Orientation {
    type Error = InvalidOrientationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidOrientationError(value))
    }
}

impl From<Orientation> for u8 {
    fn from(orientation: Orientation) -> Self {
        orientation.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("orientation must be 0-3, got {_0}")]
pub struct InvalidOrientationError(#[error(not(source))] u8);

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    #[display("I")]
    I = 0,
    /// O-piece.
    #[display("O")]
    O = 1,
    /// T-piece.
    #[display("T")]
    T = 2,
    /// S-piece.
    #[display("S")]
    S = 3,
    /// Z-piece.
    #[display("Z")]
    Z = 4,
    /// J-piece.
    #[display("J")]
    J = 5,
    /// L-piece.
    #[display("L")]
    L = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Width of the piece at orientation 0.
    #[must_use]
    pub const fn width(self) -> i32 {
        match self {
            PieceKind::I => 4,
            PieceKind::O => 2,
            PieceKind::T | PieceKind::S | PieceKind::Z | PieceKind::J | PieceKind::L => 3,
        }
    }

    /// Outline vertices at the origin, in orientation 0.
    ///
    /// Four points on the piece outline whose bounding box is the bounding box
    /// of the occupied cells. Their centroid is the center of rotation: the
    /// middle of the hub cell for T, S, Z, J and L, the middle of the third
    /// cell for I and the middle of the O. Both centroid coordinates are whole
    /// or both are halves, so a quarter turn lands every vertex on the lattice.
    ///
    /// ```
    /// use pivotris_engine::{PieceKind, Point, Tetromino};
    ///
    /// let piece = Tetromino::from_kind(PieceKind::T, Point::default());
    /// assert_eq!(piece.pivot(), Point::new(1.5, 1.5));
    /// ```
    #[must_use]
    pub const fn base_verts(self) -> [Point; 4] {
        const fn p(x: i32, y: i32) -> Point {
            Point::new(x, y)
        }
        match self {
            PieceKind::I => [p(0, 0), p(4, 0), p(4, 1), p(2, 1)],
            PieceKind::O => [p(0, 0), p(2, 0), p(2, 2), p(0, 2)],
            PieceKind::T => [p(1, 0), p(3, 2), p(2, 2), p(0, 2)],
            PieceKind::S | PieceKind::L => [p(3, 0), p(2, 2), p(1, 2), p(0, 2)],
            PieceKind::Z | PieceKind::J => [p(0, 0), p(3, 2), p(2, 2), p(1, 2)],
        }
    }

    /// Default display color.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            PieceKind::I => Color::rgb(0, 255, 255),
            PieceKind::O => Color::rgb(255, 255, 0),
            PieceKind::T => Color::rgb(128, 0, 128),
            PieceKind::S => Color::rgb(0, 255, 0),
            PieceKind::Z => Color::rgb(255, 0, 0),
            PieceKind::J => Color::rgb(0, 0, 255),
            PieceKind::L => Color::rgb(255, 165, 0),
        }
    }

    /// Occupied cells relative to the top-left corner of their bounding box.
    #[must_use]
    pub const fn square_offsets(self, orientation: Orientation) -> [Point; 4] {
        SQUARE_OFFSETS[self as usize][orientation.as_usize()]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// ```
    /// use pivotris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character, ignoring case.
    ///
    /// ```
    /// use pivotris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('t'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('L'), Some(PieceKind::L));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}

/// An RGB color.
///
/// Serialized as a `"#rrggbb"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("#{r:02x}{g:02x}{b:02x}")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid color: expected '#rrggbb', got '{_0}'")]
pub struct ParseColorError(#[error(not(source))] String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Piece shape at orientation 0, indexed `[row][col]`.
type ShapeGrid = [[bool; 4]; 2];

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn shape_squares(shape: &ShapeGrid) -> [Point; 4] {
    let mut squares = [Point::new(0, 0); 4];
    let mut n = 0;
    let mut y = 0;
    while y < shape.len() {
        let mut x = 0;
        while x < 4 {
            if shape[y][x] {
                assert!(n < 4, "shape has more than four cells");
                squares[n] = Point::new(x as i32, y as i32);
                n += 1;
            }
            x += 1;
        }
        y += 1;
    }
    assert!(n == 4, "shape has fewer than four cells");
    squares
}

/// Shifts the cells so that their minimum x and minimum y are 0.
const fn normalized(mut cells: [Point; 4]) -> [Point; 4] {
    let mut min_x = cells[0].x;
    let mut min_y = cells[0].y;
    let mut i = 1;
    while i < 4 {
        if cells[i].x < min_x {
            min_x = cells[i].x;
        }
        if cells[i].y < min_y {
            min_y = cells[i].y;
        }
        i += 1;
    }
    i = 0;
    while i < 4 {
        cells[i] = Point::new(cells[i].x - min_x, cells[i].y - min_y);
        i += 1;
    }
    cells
}

/// Turns the cells the same quarter turn as [`Point::rotated`].
///
/// The cell `(x, y)` spans the corners `(x, y)` to `(x + 1, y + 1)`, which the
/// vertex map `(x, y) -> (y, -x)` sends onto the cell `(y, -x - 1)`.
const fn rotated_cells(cells: [Point; 4]) -> [Point; 4] {
    let mut rotated = cells;
    let mut i = 0;
    while i < 4 {
        rotated[i] = Point::new(cells[i].y, -cells[i].x - 1);
        i += 1;
    }
    normalized(rotated)
}

const fn shape_offsets(shape: ShapeGrid) -> [[Point; 4]; 4] {
    let r0 = shape_squares(&shape);
    let r1 = rotated_cells(r0);
    let r2 = rotated_cells(r1);
    let r3 = rotated_cells(r2);
    [r0, r1, r2, r3]
}

const SQUARE_OFFSETS: [[[Point; 4]; 4]; PieceKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    [
        // I-piece
        shape_offsets([[C, C, C, C], [E, E, E, E]]),
        // O-piece
        shape_offsets([[C, C, E, E], [C, C, E, E]]),
        // T-piece
        shape_offsets([[E, C, E, E], [C, C, C, E]]),
        // S-piece
        shape_offsets([[E, C, C, E], [C, C, E, E]]),
        // Z-piece
        shape_offsets([[C, C, E, E], [E, C, C, E]]),
        // J-piece
        shape_offsets([[C, E, E, E], [C, C, C, E]]),
        // L-piece
        shape_offsets([[E, E, C, E], [C, C, C, E]]),
    ]
};
