use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the four approaches into an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The possible states for a traffic signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

/// A value for each of the four directions. The key set is fixed by the
/// type, so a per-direction map can never miss or gain a direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerDirection<T> {
    pub north: T,
    pub south: T,
    pub east: T,
    pub west: T,
}

impl<T> PerDirection<T> {
    /// Builds a map by evaluating `f` once per direction, in `Direction::ALL` order.
    pub fn from_fn(mut f: impl FnMut(Direction) -> T) -> Self {
        Self {
            north: f(Direction::North),
            south: f(Direction::South),
            east: f(Direction::East),
            west: f(Direction::West),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerDirection<U> {
        PerDirection::from_fn(|d| f(&self[d]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &T)> {
        Direction::ALL.into_iter().map(move |d| (d, &self[d]))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|(_, v)| v)
    }
}

impl PerDirection<LightState> {
    /// North/south held at red, east/west running green.
    pub fn default_phase() -> Self {
        Self {
            north: LightState::Red,
            south: LightState::Red,
            east: LightState::Green,
            west: LightState::Green,
        }
    }
}

impl<T> Index<Direction> for PerDirection<T> {
    type Output = T;

    fn index(&self, direction: Direction) -> &T {
        match direction {
            Direction::North => &self.north,
            Direction::South => &self.south,
            Direction::East => &self.east,
            Direction::West => &self.west,
        }
    }
}

impl<T> IndexMut<Direction> for PerDirection<T> {
    fn index_mut(&mut self, direction: Direction) -> &mut T {
        match direction {
            Direction::North => &mut self.north,
            Direction::South => &mut self.south,
            Direction::East => &mut self.east,
            Direction::West => &mut self.west,
        }
    }
}
