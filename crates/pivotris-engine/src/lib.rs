pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting falling piece")]
pub struct PieceCollisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum CompletePieceDropError {
    #[display("falling piece could not be placed: {_0}")]
    Placement(PlacementError),
    #[display("new piece collides at spawn position")]
    NewPieceCollision,
}
