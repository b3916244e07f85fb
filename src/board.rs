use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::errors::{BoardError, BoardResult};
use crate::ordered_tiles::OrderedTiles;
use crate::tile::{sort_positions, Position, Tile, TileId};

/// Smallest number of rows and columns a board may have
pub const MIN_BOARD_SIZE: usize = 10;

/// Dimensions of a player's board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(rename = "r")]
    pub num_rows: usize,
    #[serde(rename = "c")]
    pub num_cols: usize,
}

impl BoardConfig {
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self { num_rows, num_cols }
    }

    pub fn is_zero(&self) -> bool {
        self.num_rows == 0 && self.num_cols == 0
    }

    pub fn validate(&self) -> BoardResult<()> {
        if self.num_rows < MIN_BOARD_SIZE || self.num_cols < MIN_BOARD_SIZE {
            return Err(BoardError::TooSmall {
                num_rows: self.num_rows,
                num_cols: self.num_cols,
                min: MIN_BOARD_SIZE,
            });
        }
        Ok(())
    }

    /// True if (x, y) lies on a board of this size.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.num_cols && y < self.num_rows
    }
}

/// What a player sees after their board changes size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeResult {
    pub tiles: Vec<Tile>,
    pub tile_positions: Vec<Position>,
    pub info: Option<String>,
}

/// One player's tiles: those still in hand and those placed on the grid.
#[derive(Debug, Clone)]
pub struct Board {
    unused_tiles: OrderedTiles,
    used_tiles: HashMap<TileId, Position>,
    used_tile_locs: HashMap<usize, HashMap<usize, Tile>>,
    config: BoardConfig,
}

impl Board {
    pub fn new(config: BoardConfig) -> BoardResult<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: BoardConfig) -> Self {
        Self {
            unused_tiles: OrderedTiles::new(),
            used_tiles: HashMap::new(),
            used_tile_locs: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    /// Unused tiles in the order they were drawn
    pub fn unused_tiles(&self) -> Vec<Tile> {
        self.unused_tiles.iter().copied().collect()
    }

    /// Placed tiles, top-to-bottom then left-to-right
    pub fn used_tile_positions(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.used_tiles.values().copied().collect();
        sort_positions(&mut positions);
        positions
    }

    pub fn unused_count(&self) -> usize {
        self.unused_tiles.len()
    }

    pub fn used_count(&self) -> usize {
        self.used_tiles.len()
    }

    pub fn has_tile(&self, id: TileId) -> bool {
        self.unused_tiles.contains(id) || self.used_tiles.contains_key(&id)
    }

    pub fn tile_at(&self, x: usize, y: usize) -> Option<&Tile> {
        self.used_tile_locs.get(&x).and_then(|column| column.get(&y))
    }

    /// Gives the player a new unused tile.
    pub fn add_tile(&mut self, tile: Tile) -> BoardResult<()> {
        if self.has_tile(tile.id) {
            return Err(BoardError::DuplicateTile { tile });
        }
        self.unused_tiles.push(tile);
        Ok(())
    }

    /// Takes a tile away from the player, wherever it is, returning the
    /// board's copy of it.
    pub fn remove_tile(&mut self, tile: Tile) -> BoardResult<Tile> {
        self.take_tile(tile.id)
            .ok_or(BoardError::MissingTile { tile })
    }

    /// Checks a batch move without applying it.
    ///
    /// Targets may be occupied only by tiles that are themselves part of the
    /// batch, so tiles can be shifted along a row or swapped in one move.
    pub fn can_move_tiles(&self, positions: &[Position]) -> bool {
        let mut moving = HashSet::with_capacity(positions.len());
        let mut targets = HashSet::with_capacity(positions.len());
        for p in positions {
            if !self.config.contains(p.x, p.y)
                || !self.has_tile(p.tile.id)
                || !moving.insert(p.tile.id)
                || !targets.insert((p.x, p.y))
            {
                return false;
            }
        }
        positions.iter().all(|p| match self.tile_at(p.x, p.y) {
            Some(occupant) => moving.contains(&occupant.id),
            None => true,
        })
    }

    /// Places every tile of the batch at its new position, or none of them.
    pub fn move_tiles(&mut self, positions: &[Position]) -> BoardResult<()> {
        if !self.can_move_tiles(positions) {
            return Err(BoardError::InvalidMove);
        }
        // Lift the whole batch before placing so in-batch swaps do not collide.
        let lifted: Vec<(Tile, usize, usize)> = positions
            .iter()
            .filter_map(|p| self.take_tile(p.tile.id).map(|tile| (tile, p.x, p.y)))
            .collect();
        for (tile, x, y) in lifted {
            self.place(tile, x, y);
        }
        Ok(())
    }

    /// True if every placed tile can reach every other through
    /// horizontal or vertical neighbours.
    pub fn has_single_used_group(&self) -> bool {
        let Some(start) = self.used_tiles.values().min_by_key(|p| p.tile.id) else {
            return false;
        };
        let mut seen = HashSet::with_capacity(self.used_tiles.len());
        let mut stack = vec![(start.x, start.y)];
        while let Some((x, y)) = stack.pop() {
            if !seen.insert((x, y)) {
                continue;
            }
            let neighbours = [
                x.checked_sub(1).map(|nx| (nx, y)),
                Some((x + 1, y)),
                y.checked_sub(1).map(|ny| (x, ny)),
                Some((x, y + 1)),
            ];
            for (nx, ny) in neighbours.into_iter().flatten() {
                if self.tile_at(nx, ny).is_some() && !seen.contains(&(nx, ny)) {
                    stack.push((nx, ny));
                }
            }
        }
        seen.len() == self.used_tiles.len()
    }

    /// Words formed by placed tiles: every horizontal run of two or more
    /// tiles (rows top to bottom), then every vertical run (columns left to
    /// right).
    pub fn used_tile_words(&self) -> Vec<String> {
        let horizontal = self
            .used_tiles
            .values()
            .map(|p| (p.y, p.x, p.tile.letter))
            .sorted();
        let vertical = self
            .used_tiles
            .values()
            .map(|p| (p.x, p.y, p.tile.letter))
            .sorted();
        let mut words = collect_runs(horizontal);
        words.extend(collect_runs(vertical));
        words
    }

    /// Changes the board size, returning tiles that no longer fit to the
    /// unused area.
    pub fn resize(&mut self, config: BoardConfig) -> BoardResult<ResizeResult> {
        config.validate()?;
        self.config = config;
        let mut displaced: Vec<Position> = self
            .used_tiles
            .values()
            .filter(|p| !config.contains(p.x, p.y))
            .copied()
            .collect();
        sort_positions(&mut displaced);
        for p in &displaced {
            self.remove_tile(p.tile)?;
            self.add_tile(p.tile)?;
        }
        let info = match displaced.len() {
            0 => None,
            1 => Some("1 tile was moved back to the unused area to fit the resized board".to_string()),
            n => Some(format!(
                "{n} tiles were moved back to the unused area to fit the resized board"
            )),
        };
        Ok(ResizeResult {
            tiles: self.unused_tiles(),
            tile_positions: self.used_tile_positions(),
            info,
        })
    }

    fn take_tile(&mut self, id: TileId) -> Option<Tile> {
        if let Some(tile) = self.unused_tiles.take(id) {
            return Some(tile);
        }
        let position = self.used_tiles.remove(&id)?;
        if let Some(column) = self.used_tile_locs.get_mut(&position.x) {
            column.remove(&position.y);
            if column.is_empty() {
                self.used_tile_locs.remove(&position.x);
            }
        }
        Some(position.tile)
    }

    fn place(&mut self, tile: Tile, x: usize, y: usize) {
        self.used_tiles.insert(tile.id, Position::new(tile, x, y));
        self.used_tile_locs.entry(x).or_default().insert(y, tile);
    }
}

// Splits (line, offset, letter) triples, sorted by line then offset, into
// gap-free runs and keeps those long enough to be words.
fn collect_runs(cells: impl Iterator<Item = (usize, usize, char)>) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut last: Option<(usize, usize)> = None;
    for (line, offset, letter) in cells {
        let continues = matches!(last, Some((l, o)) if l == line && o + 1 == offset);
        if !continues {
            if current.len() >= 2 {
                words.push(std::mem::take(&mut current));
            }
            current.clear();
        }
        current.push(letter);
        last = Some((line, offset));
    }
    if current.len() >= 2 {
        words.push(current);
    }
    words
}

/// Wire form of a board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardSnapshot {
    #[serde(default)]
    tiles: Vec<Tile>,
    #[serde(default)]
    tile_positions: Vec<Position>,
    #[serde(default, skip_serializing_if = "BoardConfig::is_zero")]
    config: BoardConfig,
}

impl Serialize for Board {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BoardSnapshot {
            tiles: self.unused_tiles(),
            tile_positions: self.used_tile_positions(),
            config: self.config,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = BoardSnapshot::deserialize(deserializer)?;
        Board::from_snapshot(snapshot).map_err(serde::de::Error::custom)
    }
}

impl Board {
    fn from_snapshot(snapshot: BoardSnapshot) -> BoardResult<Self> {
        if !snapshot.config.is_zero() {
            snapshot.config.validate()?;
        }
        let mut board = Board::with_config(snapshot.config);
        for tile in snapshot.tiles {
            board.add_tile(tile)?;
        }
        for p in &snapshot.tile_positions {
            board.add_tile(p.tile)?;
        }
        if !snapshot.tile_positions.is_empty() {
            board.move_tiles(&snapshot.tile_positions)?;
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(letters: &str) -> (Board, Vec<Tile>) {
        let mut board = Board::new(BoardConfig::new(10, 10)).unwrap();
        let tiles: Vec<Tile> = crate::tile::tiles_from_letters(letters);
        for tile in &tiles {
            board.add_tile(*tile).unwrap();
        }
        (board, tiles)
    }

    fn occupied_cells(board: &Board) -> Vec<(usize, usize)> {
        board.used_tile_positions().iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn test_new_rejects_small_boards() {
        assert!(Board::new(BoardConfig::new(9, 10)).is_err());
        assert!(Board::new(BoardConfig::new(10, 9)).is_err());
        assert!(Board::new(BoardConfig::new(10, 10)).is_ok());
        assert!(Board::new(BoardConfig::new(25, 40)).is_ok());
    }

    #[test]
    fn test_add_tile_rejects_duplicates() {
        let (mut board, tiles) = board_with("AB");
        assert_eq!(
            board.add_tile(tiles[0]),
            Err(BoardError::DuplicateTile { tile: tiles[0] })
        );

        board.move_tiles(&[Position::new(tiles[1], 3, 3)]).unwrap();
        assert!(board.add_tile(tiles[1]).is_err());
    }

    #[test]
    fn test_remove_tile_from_unused_and_used() {
        let (mut board, tiles) = board_with("ABC");
        board.move_tiles(&[Position::new(tiles[1], 4, 4)]).unwrap();

        assert_eq!(board.remove_tile(tiles[0]), Ok(tiles[0]));
        assert_eq!(board.remove_tile(tiles[1]), Ok(tiles[1]));

        assert_eq!(board.unused_tiles(), vec![tiles[2]]);
        assert!(board.used_tile_positions().is_empty());
        assert!(board.tile_at(4, 4).is_none());
        assert_eq!(
            board.remove_tile(tiles[0]),
            Err(BoardError::MissingTile { tile: tiles[0] })
        );
    }

    #[test]
    fn test_can_move_tiles_rejections() {
        let (mut board, tiles) = board_with("ABC");
        board.move_tiles(&[Position::new(tiles[2], 5, 5)]).unwrap();
        let stranger = Tile::new(99, 'Z');

        // out of bounds
        assert!(!board.can_move_tiles(&[Position::new(tiles[0], 10, 0)]));
        assert!(!board.can_move_tiles(&[Position::new(tiles[0], 0, 10)]));
        // not owned
        assert!(!board.can_move_tiles(&[Position::new(stranger, 0, 0)]));
        // repeated id
        assert!(!board.can_move_tiles(&[
            Position::new(tiles[0], 0, 0),
            Position::new(tiles[0], 1, 0),
        ]));
        // shared target
        assert!(!board.can_move_tiles(&[
            Position::new(tiles[0], 0, 0),
            Position::new(tiles[1], 0, 0),
        ]));
        // occupied by a tile outside the batch
        assert!(!board.can_move_tiles(&[Position::new(tiles[0], 5, 5)]));

        assert!(board.can_move_tiles(&[Position::new(tiles[0], 0, 0)]));
    }

    #[test]
    fn test_can_move_tiles_is_idempotent_and_pure() {
        let (mut board, tiles) = board_with("ABC");
        board.move_tiles(&[Position::new(tiles[0], 1, 1)]).unwrap();
        let batch = [Position::new(tiles[1], 2, 1), Position::new(tiles[2], 1, 1)];

        let unused_before = board.unused_tiles();
        let used_before = board.used_tile_positions();
        let first = board.can_move_tiles(&batch);
        let second = board.can_move_tiles(&batch);

        assert_eq!(first, second);
        assert!(!first);
        assert_eq!(board.unused_tiles(), unused_before);
        assert_eq!(board.used_tile_positions(), used_before);
    }

    #[test]
    fn test_move_tiles_swap_within_batch() {
        let (mut board, tiles) = board_with("AB");
        board
            .move_tiles(&[Position::new(tiles[0], 0, 0), Position::new(tiles[1], 1, 0)])
            .unwrap();

        board
            .move_tiles(&[Position::new(tiles[0], 1, 0), Position::new(tiles[1], 0, 0)])
            .unwrap();

        assert_eq!(board.tile_at(0, 0), Some(&tiles[1]));
        assert_eq!(board.tile_at(1, 0), Some(&tiles[0]));
        assert_eq!(board.used_count(), 2);
    }

    #[test]
    fn test_move_tiles_shift_along_row() {
        let (mut board, tiles) = board_with("ABC");
        let start: Vec<Position> = tiles
            .iter()
            .enumerate()
            .map(|(i, t)| Position::new(*t, i, 2))
            .collect();
        board.move_tiles(&start).unwrap();

        let shifted: Vec<Position> = tiles
            .iter()
            .enumerate()
            .map(|(i, t)| Position::new(*t, i + 1, 2))
            .collect();
        board.move_tiles(&shifted).unwrap();

        assert_eq!(occupied_cells(&board), vec![(1, 2), (2, 2), (3, 2)]);
        assert!(board.tile_at(0, 2).is_none());
    }

    #[test]
    fn test_move_tiles_round_trip() {
        let (mut board, tiles) = board_with("WORD");
        let positions = vec![
            Position::new(tiles[0], 7, 2),
            Position::new(tiles[1], 0, 9),
            Position::new(tiles[2], 3, 3),
            Position::new(tiles[3], 9, 0),
        ];
        board.move_tiles(&positions).unwrap();

        let expected: HashSet<Position> = positions.into_iter().collect();
        let actual: HashSet<Position> = board.used_tile_positions().into_iter().collect();
        assert_eq!(actual, expected);
        assert_eq!(board.unused_count(), 0);
    }

    #[test]
    fn test_move_tiles_invalid_batch_changes_nothing() {
        let (mut board, tiles) = board_with("AB");
        let result = board.move_tiles(&[
            Position::new(tiles[0], 0, 0),
            Position::new(tiles[1], 11, 0),
        ]);
        assert_eq!(result, Err(BoardError::InvalidMove));
        assert_eq!(board.unused_count(), 2);
        assert_eq!(board.used_count(), 0);
    }

    #[test]
    fn test_move_uses_board_letter_not_request_letter() {
        let (mut board, tiles) = board_with("A");
        board
            .move_tiles(&[Position::new(Tile::new(tiles[0].id, 'Z'), 0, 0)])
            .unwrap();
        assert_eq!(board.tile_at(0, 0).map(|t| t.letter), Some('A'));
    }

    #[test]
    fn test_no_two_used_tiles_share_a_cell() {
        let (mut board, tiles) = board_with("ABCDE");
        board
            .move_tiles(&[Position::new(tiles[0], 0, 0), Position::new(tiles[1], 1, 0)])
            .unwrap();
        let _ = board.move_tiles(&[Position::new(tiles[2], 0, 0)]);
        board
            .move_tiles(&[Position::new(tiles[0], 2, 0), Position::new(tiles[3], 0, 0)])
            .unwrap();

        let cells = occupied_cells(&board);
        let unique: HashSet<_> = cells.iter().collect();
        assert_eq!(cells.len(), unique.len());
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn test_single_used_group() {
        let (mut board, tiles) = board_with("ABCD");
        assert!(!board.has_single_used_group());

        board
            .move_tiles(&[
                Position::new(tiles[0], 0, 0),
                Position::new(tiles[1], 1, 0),
                Position::new(tiles[2], 1, 1),
                Position::new(tiles[3], 1, 2),
            ])
            .unwrap();
        assert!(board.has_single_used_group());

        // diagonal neighbours do not connect
        board.move_tiles(&[Position::new(tiles[3], 2, 2)]).unwrap();
        assert!(!board.has_single_used_group());
    }

    #[test]
    fn test_single_used_group_single_tile() {
        let (mut board, tiles) = board_with("A");
        board.move_tiles(&[Position::new(tiles[0], 9, 9)]).unwrap();
        assert!(board.has_single_used_group());
    }

    #[test]
    fn test_used_tile_words_contiguous() {
        let (mut board, tiles) = board_with("ATE");
        board
            .move_tiles(&[
                Position::new(tiles[0], 0, 0),
                Position::new(tiles[1], 1, 0),
                Position::new(tiles[2], 2, 0),
            ])
            .unwrap();
        assert_eq!(board.used_tile_words(), vec!["ATE".to_string()]);
    }

    #[test]
    fn test_used_tile_words_with_gaps() {
        let (mut board, tiles) = board_with("ATE");
        board
            .move_tiles(&[
                Position::new(tiles[0], 0, 0),
                Position::new(tiles[1], 2, 0),
                Position::new(tiles[2], 4, 0),
            ])
            .unwrap();
        assert!(board.used_tile_words().is_empty());
    }

    #[test]
    fn test_used_tile_words_order() {
        // C A T
        // . . O
        // D O G
        let (mut board, tiles) = board_with("CATODOG");
        board
            .move_tiles(&[
                Position::new(tiles[0], 0, 0),
                Position::new(tiles[1], 1, 0),
                Position::new(tiles[2], 2, 0),
                Position::new(tiles[3], 2, 1),
                Position::new(tiles[4], 0, 2),
                Position::new(tiles[5], 1, 2),
                Position::new(tiles[6], 2, 2),
            ])
            .unwrap();
        assert_eq!(board.used_tile_words(), vec!["CAT", "DOG", "TOG"]);
    }

    #[test]
    fn test_resize_moves_out_of_bounds_tiles_to_unused() {
        let mut board = Board::new(BoardConfig::new(20, 20)).unwrap();
        let tiles = crate::tile::tiles_from_letters("ABCD");
        for tile in &tiles {
            board.add_tile(*tile).unwrap();
        }
        board
            .move_tiles(&[
                Position::new(tiles[0], 15, 1),
                Position::new(tiles[1], 2, 2),
                Position::new(tiles[2], 1, 12),
            ])
            .unwrap();

        let result = board.resize(BoardConfig::new(10, 10)).unwrap();

        // D stayed in hand, then displaced tiles follow in row order
        assert_eq!(result.tiles, vec![tiles[3], tiles[0], tiles[2]]);
        assert_eq!(result.tile_positions, vec![Position::new(tiles[1], 2, 2)]);
        assert!(result.info.unwrap().starts_with("2 tiles"));
        assert_eq!(board.config(), BoardConfig::new(10, 10));
    }

    #[test]
    fn test_resize_without_displacement() {
        let (mut board, tiles) = board_with("AB");
        board.move_tiles(&[Position::new(tiles[0], 1, 1)]).unwrap();
        let result = board.resize(BoardConfig::new(30, 30)).unwrap();
        assert_eq!(result.info, None);
        assert_eq!(result.tiles, vec![tiles[1]]);
        assert!(board.resize(BoardConfig::new(3, 30)).is_err());
    }

    #[test]
    fn test_board_json_shape() {
        let (mut board, tiles) = board_with("AB");
        board.move_tiles(&[Position::new(tiles[1], 2, 3)]).unwrap();
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tiles": [{"id": 1, "letter": "A"}],
                "tilePositions": [{"tile": {"id": 2, "letter": "B"}, "x": 2, "y": 3}],
                "config": {"r": 10, "c": 10}
            })
        );

        let restored: Board = serde_json::from_value(json).unwrap();
        assert_eq!(restored.unused_tiles(), board.unused_tiles());
        assert_eq!(restored.used_tile_positions(), board.used_tile_positions());
    }

    #[test]
    fn test_board_json_omits_zero_config() {
        let board = Board::with_config(BoardConfig::default());
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"{"tiles":[],"tilePositions":[]}"#);

        let restored: Board = serde_json::from_str(&json).unwrap();
        assert!(restored.config().is_zero());
    }

    #[test]
    fn test_board_json_rejects_small_config() {
        let result: Result<Board, _> =
            serde_json::from_str(r#"{"tiles":[],"config":{"r":5,"c":5}}"#);
        assert!(result.is_err());
    }
}
