//! Grid of tiles drawn as one renderable.
//!
//! The layout matches the JSON exported by Tilesetter: a tile size in
//! pixels, the map size in tiles and one or more layers of tile positions.
//! [`TileMap::from_json`] flattens the layers, later layers winning.

use serde::{Deserialize, Serialize};

use crate::components::component::{Component, Renderable};
use crate::components::kind::ComponentKind;
use crate::error::{EngineError, EngineResult};
use crate::resources::renderer::DrawCommand;

/// Single tile placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TilePosition {
    /// X coordinate in tiles.
    pub x: u32,
    /// Y coordinate in tiles.
    pub y: u32,
    /// Tile identifier (tileset-local).
    pub id: u32,
}

#[derive(Debug, Deserialize)]
struct TileLayer {
    positions: Vec<TilePosition>,
}

#[derive(Debug, Deserialize)]
struct TileMapFile {
    tile_size: u32,
    map_width: u32,
    map_height: u32,
    layers: Vec<TileLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileMap {
    pub tex_key: String,
    /// Size of a tile in world units.
    pub tile_size: f64,
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    pub z_index: i32,
    tiles: Vec<Option<u32>>,
}

impl TileMap {
    pub fn new(tex_key: impl Into<String>, tile_size: f64, width: u32, height: u32) -> Self {
        Self {
            tex_key: tex_key.into(),
            tile_size,
            width,
            height,
            z_index: 0,
            tiles: vec![None; (width as usize) * (height as usize)],
        }
    }

    /// Parse a Tilesetter map.
    pub fn from_json(tex_key: impl Into<String>, json: &str) -> EngineResult<Self> {
        let file: TileMapFile =
            serde_json::from_str(json).map_err(|e| EngineError::Config(format!("tilemap: {e}")))?;
        let mut map = TileMap::new(tex_key, f64::from(file.tile_size), file.map_width, file.map_height);
        for layer in file.layers {
            for tile in layer.positions {
                map.set_tile(tile.x, tile.y, Some(tile.id));
            }
        }
        Ok(map)
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y as usize) * (self.width as usize) + x as usize)
    }

    /// Place or clear a tile. Returns false outside the map.
    pub fn set_tile(&mut self, x: u32, y: u32, id: Option<u32>) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.tiles[i] = id;
                true
            }
            None => false,
        }
    }

    pub fn get_tile(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).and_then(|i| self.tiles[i])
    }

    pub fn clear(&mut self) {
        self.tiles.iter_mut().for_each(|t| *t = None);
    }

    /// Placed tiles in row-major order.
    pub fn tiles(&self) -> Vec<TilePosition> {
        let width = self.width.max(1);
        self.tiles
            .iter()
            .enumerate()
            .filter_map(|(i, tile)| {
                tile.map(|id| TilePosition {
                    x: i as u32 % width,
                    y: i as u32 / width,
                    id,
                })
            })
            .collect()
    }
}

impl Component for TileMap {
    const KIND: ComponentKind = ComponentKind::TileMap;

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }
}

impl Renderable for TileMap {
    fn z_index(&self) -> i32 {
        self.z_index
    }

    fn draw_command(&self) -> DrawCommand {
        DrawCommand::TileMap {
            tile_size: self.tile_size,
            tiles: self.tiles(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_outside_the_map_are_rejected() {
        let mut map = TileMap::new("tiles", 16.0, 4, 2);
        assert!(map.set_tile(3, 1, Some(7)));
        assert!(!map.set_tile(4, 0, Some(1)));
        assert_eq!(map.get_tile(3, 1), Some(7));
        assert_eq!(map.get_tile(9, 9), None);
        assert_eq!(map.tiles(), vec![TilePosition { x: 3, y: 1, id: 7 }]);
        map.clear();
        assert!(map.tiles().is_empty());
    }

    #[test]
    fn load_flattens_layers() {
        let json = r#"{
            "tile_size": 8, "map_width": 2, "map_height": 2,
            "layers": [
                {"name": "ground", "positions": [{"x": 0, "y": 0, "id": 1}, {"x": 1, "y": 1, "id": 2}]},
                {"name": "top", "positions": [{"x": 0, "y": 0, "id": 5}]}
            ]
        }"#;
        let map = TileMap::from_json("tiles", json).unwrap();
        assert_eq!(map.tile_size, 8.0);
        assert_eq!(map.get_tile(0, 0), Some(5));
        assert_eq!(map.get_tile(1, 1), Some(2));
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(TileMap::from_json("t", "{"), Err(EngineError::Config(_))));
    }
}
