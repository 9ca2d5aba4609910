use serde::{Deserialize, Serialize};
use std::fmt;

use super::Vec2;

/// One of the four connection slots of an intersection.
///
/// Ground-plane convention: `Right` is +x, `Up` is +z (stored as the y
/// component of a [`Vec2`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Unit vector from the intersection center towards this side.
    pub fn offset(self) -> Vec2 {
        match self {
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Up => Vec2::new(0.0, 1.0),
            Direction::Down => Vec2::new(0.0, -1.0),
        }
    }

    /// Heading of a vehicle entering the intersection from this side.
    pub fn inbound_heading(self) -> Vec2 {
        -self.offset()
    }

    /// Heading of a vehicle leaving the intersection towards this side.
    pub fn outbound_heading(self) -> Vec2 {
        self.offset()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(name)
    }
}

/// Compact set of directions, one bit per direction ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const EMPTY: DirectionSet = DirectionSet(0);

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= 1 << direction.index();
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !(1 << direction.index());
    }

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::EMPTY;
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}
