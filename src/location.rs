use serde::*;

const MAX_AXIS: usize = u16::MAX as usize;

/// A `(row, col)` cell coordinate on the city grid.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Location {
    packed: u32,
}

impl Location {
    /// Each axis must fit in 16 bits; see [`Location::try_new`].
    pub fn new(row: usize, col: usize) -> Self {
        debug_assert!(
            row <= MAX_AXIS && col <= MAX_AXIS,
            "location ({}, {}) does not fit in 16 bits per axis",
            row,
            col
        );
        Location {
            packed: ((row as u32) << 16) | (col as u32 & 0xFFFF),
        }
    }

    /// `None` if either axis exceeds 16 bits.
    pub fn try_new(row: usize, col: usize) -> Option<Self> {
        if row <= MAX_AXIS && col <= MAX_AXIS {
            Some(Location::new(row, col))
        } else {
            None
        }
    }

    #[inline]
    pub fn row(self) -> usize {
        ((self.packed >> 16) & 0xFFFF) as usize
    }

    #[inline]
    pub fn col(self) -> usize {
        (self.packed & 0xFFFF) as usize
    }

    #[inline]
    pub fn packed_repr(self) -> u32 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u32) -> Self {
        Location { packed }
    }

    /// Chebyshev distance: `max(|drow|, |dcol|)`.
    pub fn distance_to(self, other: Self) -> usize {
        self.row()
            .abs_diff(other.row())
            .max(self.col().abs_diff(other.col()))
    }
}

impl From<(usize, usize)> for Location {
    fn from((row, col): (usize, usize)) -> Self {
        Location::new(row, col)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Location::from_packed)
    }
}
