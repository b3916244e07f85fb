use std::collections::{BTreeMap, HashMap};

use crate::tile::{Tile, TileId};

/// Tiles keyed by id that iterate in the order they were drawn.
///
/// Each tile gets a draw number when added; taking a tile and adding it back
/// puts it last.
#[derive(Debug, Clone, Default)]
pub struct OrderedTiles {
    by_draw: BTreeMap<u64, Tile>,
    draws: HashMap<TileId, u64>,
    next_draw: u64,
}

impl OrderedTiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tile after all others. Returns false if its id is already held.
    pub fn push(&mut self, tile: Tile) -> bool {
        if self.draws.contains_key(&tile.id) {
            return false;
        }
        self.draws.insert(tile.id, self.next_draw);
        self.by_draw.insert(self.next_draw, tile);
        self.next_draw += 1;
        true
    }

    pub fn take(&mut self, id: TileId) -> Option<Tile> {
        let draw = self.draws.remove(&id)?;
        self.by_draw.remove(&draw)
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.draws.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.by_draw.values()
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(tiles: &OrderedTiles) -> String {
        tiles.iter().map(|t| t.letter).collect()
    }

    #[test]
    fn test_iterates_in_draw_order() {
        let mut tiles = OrderedTiles::new();
        for tile in [Tile::new(9, 'C'), Tile::new(1, 'A'), Tile::new(5, 'B')] {
            assert!(tiles.push(tile));
        }
        assert_eq!(letters(&tiles), "CAB");
        assert_eq!(tiles.len(), 3);
    }

    #[test]
    fn test_taken_tile_returns_last() {
        let mut tiles = OrderedTiles::new();
        tiles.push(Tile::new(1, 'A'));
        tiles.push(Tile::new(2, 'B'));
        tiles.push(Tile::new(3, 'C'));

        assert_eq!(tiles.take(1), Some(Tile::new(1, 'A')));
        assert!(!tiles.contains(1));
        tiles.push(Tile::new(1, 'A'));
        assert_eq!(letters(&tiles), "BCA");
    }

    #[test]
    fn test_duplicate_and_missing_ids() {
        let mut tiles = OrderedTiles::new();
        assert!(tiles.push(Tile::new(4, 'D')));
        assert!(!tiles.push(Tile::new(4, 'Q')));
        assert_eq!(letters(&tiles), "D");
        assert_eq!(tiles.take(8), None);
        assert_eq!(tiles.take(4), Some(Tile::new(4, 'D')));
        assert!(tiles.is_empty());
    }
}
