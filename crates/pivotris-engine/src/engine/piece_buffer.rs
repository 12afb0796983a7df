use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies piece kinds using the 7-bag randomization algorithm.
///
/// # 7-Bag System
///
/// 1. Create a "bag" containing all 7 piece kinds
/// 2. Shuffle the bag
/// 3. Draw pieces in order from the bag
/// 4. Start a new shuffled bag once the current one is used up
///
/// Any window of 7 draws aligned to a bag boundary contains every kind
/// exactly once, so no kind goes missing for long.
///
/// # Example
///
/// ```
/// use pivotris_engine::engine::{PieceBuffer, PieceSeed};
///
/// let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse()?;
/// let mut a = PieceBuffer::with_seed(seed);
/// let mut b = PieceBuffer::with_seed(seed);
/// assert_eq!(a.pop_next(), b.pop_next());
/// # Ok::<(), pivotris_engine::engine::ParsePieceSeedError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit (16-byte) seed. Its text form, used by `Display`, `FromStr` and
/// serde, is 32 hex digits, most significant byte first.
///
/// # Example
///
/// ```
/// use pivotris_engine::PieceSeed;
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let text = seed.to_string();
/// assert_eq!(text.parse::<PieceSeed>()?, seed);
/// # Ok::<(), pivotris_engine::ParsePieceSeedError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: expected 32 hex digits, got '{_0}'")]
pub struct ParsePieceSeedError(#[error(not(source))] String);

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // from_str_radix would also accept a leading '+'
        if s.len() != 32 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParsePieceSeedError(s.to_owned()));
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| ParsePieceSeedError(s.to_owned()))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBuffer {
    /// Creates a new piece buffer with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let bag = VecDeque::with_capacity(PieceKind::LEN);
        Self { rng, bag }
    }

    /// Draws the next piece kind, starting a new shuffled bag when needed.
    pub fn pop_next(&mut self) -> PieceKind {
        loop {
            if let Some(kind) = self.bag.pop_front() {
                return kind;
            }
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }
}
