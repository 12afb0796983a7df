use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A 2D coordinate.
///
/// `Point<i32>` (the default) is a lattice point: a vertex of a piece outline or
/// the index of a grid cell. `Point<f64>` holds the fractional values that appear
/// while rotating around a centroid, and is brought back to the lattice with
/// [`Point::floor`].
///
/// # Coordinate System
///
/// - (0, 0) is the top-left corner of the board
/// - X increases rightward (columns)
/// - Y increases downward (rows)
///
/// Points are plain values: arithmetic and rotation return new points.
///
/// # Example
///
/// ```
/// use pivotris_engine::Point;
///
/// let p = Point::new(2, 3) + Point::new(1, -1);
/// assert_eq!(p, Point::new(3, 2));
/// assert_eq!(p - Point::new(3, 2), Point::default());
/// ```
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
    derive_more::Add,
    derive_more::Sub,
    derive_more::Display,
)]
#[display("({x}, {y})")]
pub struct Point<T = i32> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    #[must_use]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T> Point<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Neg<Output = T>,
{
    /// Rotates the point by a quarter turn around `pivot`.
    ///
    /// `new_x = (y - pivot.y) + pivot.x`, `new_y = -(x - pivot.x) + pivot.y`.
    ///
    /// With a fractional pivot the result may be fractional too; floor it
    /// before using it as a grid index.
    ///
    /// ```
    /// use pivotris_engine::Point;
    ///
    /// let p = Point::new(5, 0).rotated_around(Point::new(5, 5));
    /// assert_eq!(p, Point::new(0, 5));
    /// ```
    #[must_use]
    pub fn rotated_around(self, pivot: Self) -> Self {
        Self {
            x: (self.y - pivot.y) + pivot.x,
            y: -(self.x - pivot.x) + pivot.y,
        }
    }
}

impl<T> Point<T>
where
    T: Copy + Default + Add<Output = T> + Sub<Output = T> + Neg<Output = T>,
{
    /// Rotates the point by a quarter turn around the origin.
    #[must_use]
    pub fn rotated(self) -> Self {
        self.rotated_around(Self::default())
    }
}

impl Point<i32> {
    #[must_use]
    pub fn to_f64(self) -> Point<f64> {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

impl Point<f64> {
    /// Aligns the point to the integer lattice by flooring both coordinates.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn floor(self) -> Point<i32> {
        Point::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}
