use serde::{Deserialize, Serialize};

use crate::maze::Tile;

/// Player identity. Only 1 and 2 exist.
pub type PlayerId = u8;

/// Pursuer identity, equal to its slot index (0..4).
pub type PursuerId = u8;

/// Heading vocabulary shared by players, pursuers and projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    Stop,
}

impl Direction {
    /// Cardinal headings in tie-break order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Stop => Direction::Stop,
        }
    }

    /// Unit step in tile units. Y grows downward.
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Stop => (0.0, 0.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

/// Round half up, so that `x.5` always lands on `x + 1` regardless of sign.
#[inline]
pub fn round_half_up(v: f32) -> f32 {
    (v + 0.5).floor()
}

/// Continuous position in tile units. Integral values are grid intersections.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_tile(tile: Tile) -> Self {
        Self::new(tile.x as f32, tile.y as f32)
    }

    /// The grid cell this position rounds to.
    pub fn tile(self) -> Tile {
        Tile::new(round_half_up(self.x) as i32, round_half_up(self.y) as i32)
    }

    pub fn offset(self, heading: Direction, distance: f32) -> Self {
        let (dx, dy) = heading.delta();
        Self::new(self.x + dx * distance, self.y + dy * distance)
    }

    pub fn distance_to(self, other: Position) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Axis-aligned proximity test used for every contact check.
    pub fn within(self, other: Position, reach: f32) -> bool {
        (self.x - other.x).abs() < reach && (self.y - other.y).abs() < reach
    }
}

/// Single- or two-player session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    SinglePlayer,
    TwoPlayer,
}

/// Session status. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    ModeSelection,
    Playing,
    Paused,
    GameOver,
}

/// Maximum display name length.
pub const MAX_NAME_LEN: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub heading: Direction,
    pub next_heading: Direction,
    pub score: u32,
    pub lives: u32,
    /// Remaining stun, in milliseconds.
    pub stun_ms: f32,
    pub ammo: u32,
    pub ammo_recharge_ms: f32,
}

impl Player {
    pub fn new(id: PlayerId, spawn: Tile, lives: u32, ammo: u32) -> Self {
        Self {
            id,
            name: default_name(id),
            position: Position::from_tile(spawn),
            heading: Direction::Stop,
            next_heading: Direction::Stop,
            score: 0,
            lives,
            stun_ms: 0.0,
            ammo,
            ammo_recharge_ms: 0.0,
        }
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_ms > 0.0
    }
}

pub fn default_name(id: PlayerId) -> String {
    format!("PLAYER {id}")
}

/// The four fixed pursuer personalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Heads straight for the tracked player.
    Direct,
    /// Aims a few tiles ahead of the tracked player.
    Ambush,
    /// Mirrors the tracked player through the direct pursuer.
    Flank,
    /// Chases from afar, retreats to a corner when close.
    Opportunist,
}

impl Archetype {
    /// Slot order; a pursuer's id is its index here.
    pub const ALL: [Archetype; 4] = [
        Archetype::Direct,
        Archetype::Ambush,
        Archetype::Flank,
        Archetype::Opportunist,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pursuer {
    pub id: PursuerId,
    pub archetype: Archetype,
    pub position: Position,
    pub heading: Direction,
    /// Remaining vulnerability window, in milliseconds.
    pub vulnerable_ms: f32,
    pub captured: bool,
    /// Bumped on every capture; stale respawns carry an older value.
    pub capture_generation: u32,
}

impl Pursuer {
    pub fn new(id: PursuerId, archetype: Archetype, spawn: Tile) -> Self {
        Self {
            id,
            archetype,
            position: Position::from_tile(spawn),
            heading: Direction::Stop,
            vulnerable_ms: 0.0,
            captured: false,
            capture_generation: 0,
        }
    }

    pub fn is_vulnerable(&self) -> bool {
        self.vulnerable_ms > 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub position: Position,
    pub heading: Direction,
    pub owner: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pellet {
    pub tile: Tile,
    pub power: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for dir in Direction::CARDINALS {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
        assert_eq!(Direction::Stop.opposite(), Direction::Stop);
    }

    #[test]
    fn round_half_up_matches_grid_convention() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-0.51), -1.0);
        assert_eq!(round_half_up(-0.4), 0.0);
    }

    #[test]
    fn position_tile_rounds_both_axes() {
        let p = Position::new(3.6, 7.4);
        assert_eq!(p.tile(), Tile::new(4, 7));
    }

    #[test]
    fn within_is_strict() {
        let a = Position::new(1.0, 1.0);
        assert!(a.within(Position::new(1.49, 0.51), 0.5));
        assert!(!a.within(Position::new(1.5, 1.0), 0.5));
    }

    #[test]
    fn new_player_is_idle_at_spawn() {
        let p = Player::new(2, Tile::new(4, 5), 3, 3);
        assert_eq!(p.name, "PLAYER 2");
        assert_eq!(p.position, Position::new(4.0, 5.0));
        assert_eq!(p.heading, Direction::Stop);
        assert_eq!(p.next_heading, Direction::Stop);
        assert!(!p.is_stunned());
    }
}
