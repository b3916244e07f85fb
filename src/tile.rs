use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a tile within one game
pub type TileId = u32;

/// A single lettered game piece with a stable identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub letter: char,
}

impl Tile {
    pub fn new(id: TileId, letter: char) -> Self {
        Self { id, letter }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.letter, self.id)
    }
}

/// A tile placed on a board, x counts columns and y counts rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub tile: Tile,
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(tile: Tile, x: usize, y: usize) -> Self {
        Self { tile, x, y }
    }
}

/// Builds one tile per letter, numbering ids from 1 in distribution order.
pub fn tiles_from_letters(letters: &str) -> Vec<Tile> {
    letters
        .chars()
        .zip(1..)
        .map(|(letter, id)| Tile::new(id, letter))
        .collect()
}

/// Returns true for the letters a tile may carry.
pub fn is_tile_letter(letter: char) -> bool {
    letter.is_ascii_uppercase()
}

/// Sorts positions top-to-bottom, then left-to-right.
pub fn sort_positions(positions: &mut [Position]) {
    positions.sort_by_key(|p| (p.y, p.x));
}
