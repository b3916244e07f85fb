// src/game/config.rs
use rand::seq::SliceRandom;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::types::PlayerName;
use crate::errors::ConfigError;
use crate::tile::{is_tile_letter, Tile};

/// Reorders the shared pool in place
pub type ShuffleTilesFn = Arc<dyn Fn(&mut [Tile]) + Send + Sync>;

/// Reorders player names in place
pub type ShufflePlayersFn = Arc<dyn Fn(&mut [PlayerName]) + Send + Sync>;

/// Tiles drawn in a swap, fewer if the pool runs low
pub const TILES_PER_SWAP: usize = 3;

const LETTER_COUNTS: [(char, usize); 26] = [
    ('A', 13), ('B', 3), ('C', 3), ('D', 6), ('E', 18), ('F', 3), ('G', 4),
    ('H', 3), ('I', 12), ('J', 2), ('K', 2), ('L', 5), ('M', 3), ('N', 8),
    ('O', 11), ('P', 3), ('Q', 2), ('R', 9), ('S', 6), ('T', 9), ('U', 6),
    ('V', 3), ('W', 3), ('X', 2), ('Y', 3), ('Z', 2),
];

/// The standard 144 tile distribution
pub fn default_tile_letters() -> String {
    LETTER_COUNTS
        .iter()
        .flat_map(|&(letter, count)| std::iter::repeat(letter).take(count))
        .collect()
}

pub fn random_tile_shuffle() -> ShuffleTilesFn {
    Arc::new(|tiles: &mut [Tile]| tiles.shuffle(&mut rand::thread_rng()))
}

pub fn random_player_shuffle() -> ShufflePlayersFn {
    Arc::new(|names: &mut [PlayerName]| names.shuffle(&mut rand::thread_rng()))
}

/// Settings for one game
#[derive(Clone)]
pub struct Config {
    pub max_players: usize,
    /// Tiles dealt to each player on joining
    pub num_new_tiles: usize,
    pub tile_letters: String,
    /// A game with no activity for this long deletes itself
    pub idle_period: Duration,
    pub shuffle_unused_tiles: Option<ShuffleTilesFn>,
    pub shuffle_players: Option<ShufflePlayersFn>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_players == 0 {
            return Err(ConfigError::NoMaxPlayers);
        }
        if self.num_new_tiles == 0 {
            return Err(ConfigError::NoStartingTiles);
        }
        if self.idle_period.is_zero() {
            return Err(ConfigError::NoIdlePeriod);
        }
        if self.tile_letters.is_empty() {
            return Err(ConfigError::NoTileLetters);
        }
        if let Some(letter) = self.tile_letters.chars().find(|c| !is_tile_letter(*c)) {
            return Err(ConfigError::InvalidTileLetter { letter });
        }
        let available = self.tile_letters.chars().count();
        if available < self.num_new_tiles {
            return Err(ConfigError::NotEnoughTileLetters {
                available,
                needed: self.num_new_tiles,
            });
        }
        if self.shuffle_unused_tiles.is_none() {
            return Err(ConfigError::MissingTileShuffle);
        }
        if self.shuffle_players.is_none() {
            return Err(ConfigError::MissingPlayerShuffle);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_players: 8,
            num_new_tiles: 21,
            tile_letters: default_tile_letters(),
            idle_period: Duration::from_secs(60 * 60),
            shuffle_unused_tiles: Some(random_tile_shuffle()),
            shuffle_players: Some(random_player_shuffle()),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("max_players", &self.max_players)
            .field("num_new_tiles", &self.num_new_tiles)
            .field("tile_letters", &self.tile_letters)
            .field("idle_period", &self.idle_period)
            .field("shuffle_unused_tiles", &self.shuffle_unused_tiles.as_ref().map(|_| "<fn>"))
            .field("shuffle_players", &self.shuffle_players.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
