use serde::{Deserialize, Serialize};

use crate::entity::{Pellet, PlayerId};
use crate::error::ConfigError;

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Tile codes of the static maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Empty,
    Wall,
    Pellet,
    PowerPellet,
}

/// The built-in maze. `1`/`2` mark player spawns, `G` the pursuer house.
pub const DEFAULT_MAZE: [&str; 21] = [
    "###################",
    "#........#........#",
    "#o##.###.#.###.##o#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.### # ###.####",
    "####.#       #.####",
    "####.# ## ## #.####",
    "    .  #   #  .    ",
    "####.# # G # #.####",
    "####.# ##### #.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#....1.2....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#........#........#",
    "#.................#",
    "###################",
];

/// Immutable maze: tile grid plus the spawn markers found while parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maze {
    width: i32,
    height: i32,
    tiles: Vec<TileKind>,
    player_spawns: [Tile; 2],
    house: Tile,
}

impl Maze {
    /// Parse maze text rows.
    ///
    /// Characters: `#` wall, `.` pellet, `o` power pellet, space empty,
    /// `1`/`2` player spawn, `G` pursuer house. Every row must have the same
    /// width, each marker must appear exactly once, and the border may only
    /// be open on tunnel rows (both side columns open).
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, ConfigError> {
        let Some(first) = rows.first() else {
            return Err(ConfigError::EmptyMaze);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(ConfigError::EmptyMaze);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        let mut spawn_one = None;
        let mut spawn_two = None;
        let mut house = None;

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(ConfigError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let tile = Tile::new(x as i32, y as i32);
                let kind = match ch {
                    '#' => TileKind::Wall,
                    '.' => TileKind::Pellet,
                    'o' => TileKind::PowerPellet,
                    ' ' => TileKind::Empty,
                    '1' => {
                        place_marker(&mut spawn_one, tile, ch)?;
                        TileKind::Empty
                    },
                    '2' => {
                        place_marker(&mut spawn_two, tile, ch)?;
                        TileKind::Empty
                    },
                    'G' => {
                        place_marker(&mut house, tile, ch)?;
                        TileKind::Empty
                    },
                    _ => return Err(ConfigError::UnknownTile { ch, x, y }),
                };
                tiles.push(kind);
            }
        }

        let maze = Self {
            width: width as i32,
            height: rows.len() as i32,
            tiles,
            player_spawns: [
                spawn_one.ok_or(ConfigError::MissingMarker('1'))?,
                spawn_two.ok_or(ConfigError::MissingMarker('2'))?,
            ],
            house: house.ok_or(ConfigError::MissingMarker('G'))?,
        };
        maze.check_border()?;
        if !maze
            .tiles
            .iter()
            .any(|t| matches!(t, TileKind::Pellet | TileKind::PowerPellet))
        {
            return Err(ConfigError::NoPellets);
        }
        Ok(maze)
    }

    fn check_border(&self) -> Result<(), ConfigError> {
        for y in 0..self.height {
            for x in 0..self.width {
                let on_border =
                    x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1;
                if !on_border || self.kind(x, y) == TileKind::Wall {
                    continue;
                }
                let side_only = y != 0 && y != self.height - 1;
                if !(side_only && self.is_tunnel_row(y)) {
                    return Err(ConfigError::OpenBorder {
                        x: x as usize,
                        y: y as usize,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn kind(&self, x: i32, y: i32) -> TileKind {
        self.tiles[(y * self.width + x) as usize]
    }

    /// Tile code, or `None` outside the grid.
    pub fn tile(&self, x: i32, y: i32) -> Option<TileKind> {
        if (0..self.width).contains(&x) && (0..self.height).contains(&y) {
            Some(self.kind(x, y))
        } else {
            None
        }
    }

    /// A row whose two edge columns are both open wraps horizontally.
    pub fn is_tunnel_row(&self, y: i32) -> bool {
        (0..self.height).contains(&y)
            && self.kind(0, y) != TileKind::Wall
            && self.kind(self.width - 1, y) != TileKind::Wall
    }

    /// Wall test for a grid cell. Cells outside the grid are walls, except
    /// columns beyond the left/right edge of a tunnel row.
    pub fn is_wall_cell(&self, x: i32, y: i32) -> bool {
        if !(0..self.height).contains(&y) {
            return true;
        }
        if !(0..self.width).contains(&x) {
            return !self.is_tunnel_row(y);
        }
        self.kind(x, y) == TileKind::Wall
    }

    /// Wall test for a continuous point (the cell it floors into).
    pub fn is_wall(&self, x: f32, y: f32) -> bool {
        self.is_wall_cell(x.floor() as i32, y.floor() as i32)
    }

    pub fn player_spawn(&self, id: PlayerId) -> Tile {
        if id == 2 {
            self.player_spawns[1]
        } else {
            self.player_spawns[0]
        }
    }

    /// Pursuer house; captured pursuers respawn here.
    pub fn house(&self) -> Tile {
        self.house
    }

    /// Full pellet set, row-major.
    pub fn pellets(&self) -> Vec<Pellet> {
        let mut pellets = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                match self.kind(x, y) {
                    TileKind::Pellet => pellets.push(Pellet {
                        tile: Tile::new(x, y),
                        power: false,
                    }),
                    TileKind::PowerPellet => pellets.push(Pellet {
                        tile: Tile::new(x, y),
                        power: true,
                    }),
                    TileKind::Empty | TileKind::Wall => {},
                }
            }
        }
        pellets
    }
}

fn place_marker(slot: &mut Option<Tile>, tile: Tile, ch: char) -> Result<(), ConfigError> {
    if slot.is_some() {
        return Err(ConfigError::DuplicateMarker(ch));
    }
    *slot = Some(tile);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_maze() -> Maze {
        Maze::parse(&DEFAULT_MAZE).unwrap()
    }

    #[test]
    fn default_maze_parses() {
        let maze = default_maze();
        assert_eq!(maze.width(), 19);
        assert_eq!(maze.height(), 21);
        assert_eq!(maze.player_spawn(1), Tile::new(8, 14));
        assert_eq!(maze.player_spawn(2), Tile::new(10, 14));
        assert_eq!(maze.house(), Tile::new(9, 10));
    }

    #[test]
    fn pellets_match_tile_codes() {
        let maze = default_maze();
        let pellets = maze.pellets();
        let power = pellets.iter().filter(|p| p.power).count();
        assert_eq!(power, 4);
        for p in &pellets {
            let kind = maze.tile(p.tile.x, p.tile.y).unwrap();
            if p.power {
                assert_eq!(kind, TileKind::PowerPellet);
            } else {
                assert_eq!(kind, TileKind::Pellet);
            }
        }
    }

    #[test]
    fn outside_grid_is_wall_except_tunnel_columns() {
        let maze = default_maze();
        assert!(maze.is_wall_cell(5, -1));
        assert!(maze.is_wall_cell(5, 21));
        assert!(maze.is_wall_cell(-1, 1), "row 1 is not a tunnel row");
        assert!(maze.is_tunnel_row(9));
        assert!(!maze.is_wall_cell(-1, 9));
        assert!(!maze.is_wall_cell(19, 9));
    }

    #[test]
    fn continuous_wall_test_floors() {
        let maze = default_maze();
        assert!(maze.is_wall(0.9, 1.5));
        assert!(!maze.is_wall(1.0, 1.0));
        assert!(!maze.is_wall(1.99, 1.99));
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = Maze::parse(&["#####", "#1.2#", "#G#"]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::RaggedRow {
                row: 2,
                expected: 5,
                found: 3
            }
        );
    }

    #[test]
    fn unknown_character_rejected() {
        let err = Maze::parse(&["#####", "#1x2#", "#G..#", "#####"]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownTile { ch: 'x', x: 2, y: 1 });
    }

    #[test]
    fn markers_must_be_unique_and_present() {
        assert_eq!(
            Maze::parse(&["#####", "#1.1#", "#G..#", "#####"]).unwrap_err(),
            ConfigError::DuplicateMarker('1')
        );
        assert_eq!(
            Maze::parse(&["#####", "#1..#", "#G..#", "#####"]).unwrap_err(),
            ConfigError::MissingMarker('2')
        );
    }

    #[test]
    fn open_border_rejected_unless_tunnel() {
        assert_eq!(
            Maze::parse(&["##.##", "#1.2#", "#G..#", "#####"]).unwrap_err(),
            ConfigError::OpenBorder { x: 2, y: 0 }
        );
        assert_eq!(
            Maze::parse(&["#####", " 1.2#", "#G..#", "#####"]).unwrap_err(),
            ConfigError::OpenBorder { x: 0, y: 1 }
        );
        assert!(Maze::parse(&["#####", " 1.2 ", "#G..#", "#####"]).is_ok());
    }

    #[test]
    fn maze_without_pellets_rejected() {
        assert_eq!(
            Maze::parse(&["#####", "#1 2#", "#G  #", "#####"]).unwrap_err(),
            ConfigError::NoPellets
        );
    }

    #[test]
    fn empty_maze_rejected() {
        let rows: [&str; 0] = [];
        assert_eq!(Maze::parse(&rows).unwrap_err(), ConfigError::EmptyMaze);
    }
}
