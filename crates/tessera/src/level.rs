//! # Level Loading
//!
//! Levels are written as ASCII layers; a [`Legend`] maps each character to
//! a tile or to a marker. Markers record spawn points and leave the cell
//! empty in that layer.

use std::collections::HashMap;

use tessera_sim::components::{Animation, Clip};
use tessera_sim::systems::{TileId, TileProperties, Tilemap, Tileset};

use crate::error::{GameError, GameResult};

/// Tile ids of the built-in sprite sheet.
pub mod tiles {
    use tessera_sim::systems::TileId;

    /// Solid wall.
    pub const WALL: TileId = 1;
    /// Bare soil.
    pub const SOIL: TileId = 2;
    /// Short grass.
    pub const GRASS: TileId = 3;
    /// Tall grass, slows walking.
    pub const SHRUB: TileId = 4;
    /// Tree.
    pub const TREE: TileId = 5;
    /// Bush, halves walking speed.
    pub const BUSH: TileId = 6;
    /// Rock.
    pub const ROCK: TileId = 7;
    /// Barrel.
    pub const BARREL: TileId = 8;
    /// Explosion.
    pub const EXPLOSION: TileId = 9;
    /// Bullet sprite.
    pub const BULLET: TileId = 10;
    /// Player walk cycle, first frame.
    pub const PLAYER_00: TileId = 11;
    /// Player walk cycle, last frame.
    pub const PLAYER_01: TileId = 12;
    /// Monster walk cycle, first frame.
    pub const MONSTER_00: TileId = 13;
    /// Monster walk cycle, last frame.
    pub const MONSTER_01: TileId = 14;

    /// Edge of one sheet tile in pixels.
    pub const SHEET_TILE: u16 = 8;
}

/// Seconds per walk-cycle frame.
pub const WALK_FRAME_TIME: f32 = 1.0 / 30.0;

/// What a level character stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    /// No tile.
    Empty,
    /// A terrain tile.
    Tile(TileId),
    /// Where the player starts.
    PlayerStart,
    /// A monster placed at load time.
    Monster,
}

/// Character to [`Glyph`] table.
#[derive(Clone, Debug)]
pub struct Legend {
    glyphs: HashMap<char, Glyph>,
}

impl Default for Legend {
    fn default() -> Self {
        let glyphs = [
            (' ', Glyph::Empty),
            ('P', Glyph::PlayerStart),
            ('M', Glyph::Monster),
        ]
        .into_iter()
        .collect();
        Self { glyphs }
    }
}

impl Legend {
    /// Legend with only the blank and the `P`/`M` markers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a character, builder style.
    #[must_use]
    pub fn with(mut self, ch: char, glyph: Glyph) -> Self {
        self.glyphs.insert(ch, glyph);
        self
    }

    /// Glyph of a character.
    #[must_use]
    pub fn glyph(&self, ch: char) -> Option<Glyph> {
        self.glyphs.get(&ch).copied()
    }

    /// Legend of the built-in sheet.
    #[must_use]
    pub fn demo() -> Self {
        Self::new()
            .with('#', Glyph::Tile(tiles::WALL))
            .with('.', Glyph::Tile(tiles::SOIL))
            .with('w', Glyph::Tile(tiles::GRASS))
            .with('W', Glyph::Tile(tiles::SHRUB))
            .with('T', Glyph::Tile(tiles::TREE))
            .with('b', Glyph::Tile(tiles::BUSH))
            .with('r', Glyph::Tile(tiles::ROCK))
            .with('B', Glyph::Tile(tiles::BARREL))
    }
}

/// A loaded level.
#[derive(Clone, Debug)]
pub struct Level {
    /// Terrain layers with the collision buffer already built.
    pub tilemap: Tilemap,
    /// Walking speed per tile id.
    pub tile_properties: TileProperties,
    /// Frame id to sheet rectangle.
    pub tileset: Tileset,
    /// Player start, in tile coordinates.
    pub player_start: (i32, i32),
    /// Monsters placed at load time, in tile coordinates.
    pub monster_spawns: Vec<(i32, i32)>,
    /// Player walk cycle.
    pub player_animation: Animation,
    /// Monster walk cycle.
    pub monster_animation: Animation,
    /// Bullet sprite.
    pub bullet_animation: Animation,
}

impl Level {
    /// Parses ASCII layers into a level.
    ///
    /// Every layer must have the same number of lines and every line the
    /// same length. Exactly one `PlayerStart` must appear across all layers.
    /// Animations and tileset default to the built-in sheet.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidLevel`] on ragged or empty layers, unknown
    /// characters, or a missing or repeated player start.
    pub fn from_ascii(
        layers: &[&str],
        legend: &Legend,
        tile_properties: TileProperties,
    ) -> GameResult<Self> {
        let first = layers
            .first()
            .ok_or_else(|| GameError::InvalidLevel("no layers".to_owned()))?;
        let height = first.lines().count();
        let width = first.lines().next().map_or(0, |line| line.chars().count());
        if width == 0 || height == 0 {
            return Err(GameError::InvalidLevel("empty layer".to_owned()));
        }

        let mut cells = Vec::with_capacity(layers.len());
        let mut player_start = None;
        let mut monster_spawns = Vec::new();

        for (l, layer) in layers.iter().enumerate() {
            let mut tiles = Vec::with_capacity(width * height);
            let mut lines = 0;
            for (y, line) in layer.lines().enumerate() {
                lines += 1;
                let mut row_width = 0;
                for (x, ch) in line.chars().enumerate() {
                    row_width += 1;
                    let glyph = legend.glyph(ch).ok_or_else(|| {
                        GameError::InvalidLevel(format!(
                            "unknown character {ch:?} at layer {l}, ({x}, {y})"
                        ))
                    })?;
                    let at = (x as i32, y as i32);
                    let tile = match glyph {
                        Glyph::Empty => None,
                        Glyph::Tile(id) => Some(id),
                        Glyph::PlayerStart => {
                            if player_start.replace(at).is_some() {
                                return Err(GameError::InvalidLevel(format!(
                                    "second player start at layer {l}, ({x}, {y})"
                                )));
                            }
                            None
                        }
                        Glyph::Monster => {
                            monster_spawns.push(at);
                            None
                        }
                    };
                    tiles.push(tile);
                }
                if row_width != width {
                    return Err(GameError::InvalidLevel(format!(
                        "layer {l} line {y} is {row_width} wide, expected {width}"
                    )));
                }
            }
            if lines != height {
                return Err(GameError::InvalidLevel(format!(
                    "layer {l} has {lines} lines, expected {height}"
                )));
            }
            cells.push(tiles);
        }

        let player_start =
            player_start.ok_or_else(|| GameError::InvalidLevel("no player start".to_owned()))?;

        let mut tilemap = Tilemap::from_layers(width as u32, height as u32, cells)
            .ok_or_else(|| GameError::InvalidLevel("layer size mismatch".to_owned()))?;
        tilemap.rebuild_collision_buffer(&tile_properties);

        tracing::debug!(
            "Loaded level {}x{} ({} layers, {} monsters)",
            width,
            height,
            layers.len(),
            monster_spawns.len()
        );

        Ok(Self {
            tilemap,
            tile_properties,
            tileset: sheet_tileset(),
            player_start,
            monster_spawns,
            player_animation: Animation::new(tiles::PLAYER_00, tiles::PLAYER_01, WALK_FRAME_TIME),
            monster_animation: Animation::new(
                tiles::MONSTER_00,
                tiles::MONSTER_01,
                WALK_FRAME_TIME,
            ),
            bullet_animation: Animation::still(tiles::BULLET),
        })
    }

    /// Small walled arena with mixed terrain and a few monsters.
    ///
    /// # Errors
    ///
    /// Never in practice; the layout is fixed.
    pub fn demo() -> GameResult<Self> {
        Self::from_ascii(&[DEMO_GROUND, DEMO_DETAIL], &Legend::demo(), demo_tile_properties())
    }
}

/// Walking speeds of the built-in sheet.
#[must_use]
pub fn demo_tile_properties() -> TileProperties {
    TileProperties::new()
        .with(tiles::WALL, 0.0)
        .with(tiles::SOIL, 1.0)
        .with(tiles::GRASS, 1.0)
        .with(tiles::SHRUB, 0.75)
        .with(tiles::TREE, 0.0)
        .with(tiles::BUSH, 0.5)
        .with(tiles::ROCK, 0.0)
}

/// Sheet frames laid out in one row, id 1 at the left edge.
fn sheet_tileset() -> Tileset {
    let mut tileset = Tileset::new();
    for id in tiles::WALL..=tiles::MONSTER_01 {
        let x = u16::from(id - 1) * tiles::SHEET_TILE;
        tileset.insert(id, Clip::new(x, 0, tiles::SHEET_TILE, tiles::SHEET_TILE));
    }
    tileset
}

const DEMO_GROUND: &str = "\
################
#..............#
#.wwwwww..wwww.#
#.wwwwww..wwww.#
#..............#
#.wwww.....www.#
#.wwww.....www.#
#..............#
#.wwwwwwww.www.#
#..............#
################";

// Leading blanks are significant.
const DEMO_DETAIL: &str = concat!(
    "                \n",
    "   P     W      \n",
    "  bb     WW  T  \n",
    "       r     M  \n",
    "                \n",
    "   M      bb    \n",
    "          bbM   \n",
    "   T    M       \n",
    "         WWW  M \n",
    "                \n",
    "                ",
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_loads() {
        let level = Level::demo().unwrap();
        assert_eq!(level.tilemap.width(), 16);
        assert_eq!(level.tilemap.height(), 11);
        assert_eq!(level.tilemap.layer_count(), 2);
        assert_eq!(level.player_start, (3, 1));
        assert_eq!(level.monster_spawns.len(), 5);
        assert_eq!(
            level.monster_spawns,
            vec![(13, 3), (3, 5), (12, 6), (8, 7), (14, 8)]
        );
    }

    #[test]
    fn test_collision_buffer_built() {
        let level = Level::demo().unwrap();
        // Border wall.
        assert_eq!(level.tilemap.walking_speed_at(0, 0), 0.0);
        // Soil under the player start.
        assert_eq!(level.tilemap.walking_speed_at(3, 1), 1.0);
        // Bush over grass.
        assert_eq!(level.tilemap.walking_speed_at(3, 2), 0.5);
    }

    #[test]
    fn test_markers_leave_cell_empty() {
        let level = Level::demo().unwrap();
        assert_eq!(level.tilemap.tile(1, 3, 1), None);
        assert_eq!(level.tilemap.tile(0, 3, 1), Some(tiles::SOIL));
    }

    #[test]
    fn test_tileset_covers_sheet() {
        let level = Level::demo().unwrap();
        assert_eq!(level.tileset.clip(tiles::WALL), Some(Clip::new(0, 0, 8, 8)));
        assert_eq!(level.tileset.clip(tiles::MONSTER_01), Some(Clip::new(104, 0, 8, 8)));
        assert_eq!(level.tileset.clip(0), None);
    }

    #[test]
    fn test_rejects_bad_layouts() {
        let legend = Legend::demo();
        let props = demo_tile_properties();
        let cases: [&[&str]; 5] = [
            &[],
            &["###\n#P\n###"],
            &["###\n#.#\n###"],
            &["###\n#?#\n#P#"],
            &["P..\n...", "P..\n..."],
        ];
        for layers in cases {
            let err = Level::from_ascii(layers, &legend, props.clone()).unwrap_err();
            assert!(matches!(err, GameError::InvalidLevel(_)), "{layers:?}");
        }
    }

    #[test]
    fn test_layer_height_checked() {
        let err = Level::from_ascii(&["P.\n..", ".."], &Legend::demo(), TileProperties::new())
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidLevel(_)));
    }
}
