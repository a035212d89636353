//! Cardinal directions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// One of the four travel directions, in clockwise order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Dir {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Dir {
    /// Direction from its clockwise index, taken modulo 4
    pub const fn from_index(index: i32) -> Dir {
        match index.rem_euclid(4) {
            0 => Dir::North,
            1 => Dir::East,
            2 => Dir::South,
            _ => Dir::West,
        }
    }

    /// Clockwise index (north = 0)
    pub const fn index(self) -> i32 {
        self as i32
    }

    /// Rotate clockwise by `n` quarter turns; negative turns counter-clockwise
    pub const fn rotate(self, n: i32) -> Dir {
        Dir::from_index(self.index() + n)
    }

    /// The opposite direction
    pub const fn flip(self) -> Dir {
        self.rotate(2)
    }

    /// North or south
    pub const fn is_vertical(self) -> bool {
        matches!(self, Dir::North | Dir::South)
    }

    /// Unit step (dx, dy) with y growing southward
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Dir::North => (0, -1),
            Dir::East => (1, 0),
            Dir::South => (0, 1),
            Dir::West => (-1, 0),
        }
    }

    /// Every direction except `excluded`, in clockwise order starting after it
    pub fn others(excluded: Dir) -> Vec<Dir> {
        (1..4).map(|n| excluded.rotate(n)).collect()
    }

    /// All four directions in clockwise order
    pub fn all() -> impl Iterator<Item = Dir> {
        Dir::iter()
    }
}
