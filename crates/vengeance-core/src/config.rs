use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::maze::{DEFAULT_MAZE, Maze};

/// Data-driven configuration: maze layout plus every gameplay tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maze text rows (see [`Maze::parse`] for the character set).
    pub maze: Vec<String>,
    /// Player travel speed (tiles/s).
    pub player_speed: f32,
    /// Pursuer base travel speed (tiles/s).
    pub pursuer_speed: f32,
    /// Pursuer speed multiplier while vulnerable.
    pub fled_speed_multiplier: f32,
    /// Projectile travel speed (tiles/s).
    pub projectile_speed: f32,
    /// Stun applied to a player hit by a projectile (ms).
    pub stun_duration_ms: f32,
    /// Vulnerability window granted by a power pellet (ms).
    pub vulnerable_duration_ms: f32,
    pub max_ammo: u32,
    /// Time to regain one round of ammo (ms).
    pub ammo_recharge_ms: f32,
    pub starting_lives: u32,
    /// Delay between a capture and the pursuer reappearing in the house (ms).
    pub respawn_delay_ms: f32,
    /// How far ahead of the tracked player the ambush pursuer aims (tiles).
    pub ambush_lead_tiles: f32,
    /// Inside this distance the opportunist retreats to its corner (tiles).
    pub opportunist_retreat_distance: f32,
    /// Fleeing pursuers wander toward a uniform point in `[0, range)²`.
    pub flee_target_range: f32,
    /// Seed for the fleeing wander RNG.
    pub rng_seed: u64,
    /// Initial pursuer tiles, in archetype order.
    pub pursuer_spawns: [[i32; 2]; 4],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            maze: DEFAULT_MAZE.iter().map(|row| row.to_string()).collect(),
            player_speed: 5.0,
            pursuer_speed: 4.0,
            fled_speed_multiplier: 0.75,
            projectile_speed: 15.0,
            stun_duration_ms: 2000.0,
            vulnerable_duration_ms: 7000.0,
            max_ammo: 3,
            ammo_recharge_ms: 3000.0,
            starting_lives: 3,
            respawn_delay_ms: 500.0,
            ambush_lead_tiles: 4.0,
            opportunist_retreat_distance: 8.0,
            flee_target_range: 20.0,
            rng_seed: 0x5eed_cafe,
            pursuer_spawns: [[9, 7], [9, 9], [8, 10], [10, 10]],
        }
    }
}

impl EngineConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("VENGEANCE_CONFIG")
            && let Some(config) = Self::load_from_file(&path)
        {
            return config;
        }
        Self::load_from_file("config/vengeance.toml").unwrap_or_default()
    }

    /// Load and validate a TOML file, returning `None` if it is missing or invalid.
    pub fn load_from_file(path: &str) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match Self::from_toml_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Failed to load {path}: {e}, using defaults");
                None
            },
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every tunable and parse the maze.
    pub fn validate(&self) -> Result<Maze, ConfigError> {
        let positive = [
            ("player_speed", self.player_speed),
            ("pursuer_speed", self.pursuer_speed),
            ("fled_speed_multiplier", self.fled_speed_multiplier),
            ("projectile_speed", self.projectile_speed),
            ("ammo_recharge_ms", self.ammo_recharge_ms),
            ("flee_target_range", self.flee_target_range),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidTunable {
                    name,
                    value: f64::from(value),
                });
            }
        }
        let non_negative = [
            ("stun_duration_ms", self.stun_duration_ms),
            ("vulnerable_duration_ms", self.vulnerable_duration_ms),
            ("respawn_delay_ms", self.respawn_delay_ms),
            ("ambush_lead_tiles", self.ambush_lead_tiles),
            (
                "opportunist_retreat_distance",
                self.opportunist_retreat_distance,
            ),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTunable {
                    name,
                    value: f64::from(value),
                });
            }
        }
        if self.max_ammo == 0 {
            return Err(ConfigError::InvalidTunable {
                name: "max_ammo",
                value: 0.0,
            });
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::InvalidTunable {
                name: "starting_lives",
                value: 0.0,
            });
        }

        let maze = Maze::parse(&self.maze)?;
        for [x, y] in self.pursuer_spawns {
            if maze.is_wall_cell(x, y) {
                return Err(ConfigError::SpawnInWall {
                    what: "pursuer",
                    x,
                    y,
                });
            }
        }
        Ok(maze)
    }

    /// Fastest thing that moves, used to bound per-step travel.
    pub fn max_speed(&self) -> f32 {
        self.player_speed
            .max(self.pursuer_speed)
            .max(self.pursuer_speed * self.fled_speed_multiplier)
            .max(self.projectile_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        let maze = config.validate().unwrap();
        assert_eq!(maze.width(), 19);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("player_speed = 6.5\nmax_ammo = 5\n").unwrap();
        assert!((config.player_speed - 6.5).abs() < f32::EPSILON);
        assert_eq!(config.max_ammo, 5);
        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.maze.len(), DEFAULT_MAZE.len());
    }

    #[test]
    fn custom_maze_from_toml() {
        let toml = r########"
maze = [
    "#######",
    "#1.G.2#",
    "#.....#",
    "#######",
]
pursuer_spawns = [[3, 1], [3, 2], [2, 2], [4, 2]]
"########;
        let config = EngineConfig::from_toml_str(toml).unwrap();
        let maze = config.validate().unwrap();
        assert_eq!(maze.width(), 7);
        assert_eq!(maze.height(), 4);
    }

    #[test]
    fn negative_speed_rejected() {
        let config = EngineConfig {
            pursuer_speed: -1.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTunable {
                name: "pursuer_speed",
                ..
            })
        ));
    }

    #[test]
    fn nan_duration_rejected() {
        let config = EngineConfig {
            stun_duration_ms: f32::NAN,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_ammo_rejected() {
        let config = EngineConfig {
            max_ammo: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::InvalidTunable {
                name: "max_ammo",
                value: 0.0
            }
        );
    }

    #[test]
    fn pursuer_spawn_in_wall_rejected() {
        let config = EngineConfig {
            pursuer_spawns: [[0, 0], [9, 9], [8, 10], [10, 10]],
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::SpawnInWall {
                what: "pursuer",
                x: 0,
                y: 0
            }
        );
    }

    #[test]
    fn garbage_toml_is_an_error() {
        assert!(matches!(
            EngineConfig::from_toml_str("player_speed = \"fast\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_from_missing_file_returns_none() {
        assert!(EngineConfig::load_from_file("/nonexistent/vengeance.toml").is_none());
    }

    #[test]
    fn max_speed_is_projectile_by_default() {
        let config = EngineConfig::default();
        assert!((config.max_speed() - 15.0).abs() < f32::EPSILON);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config =
            EngineConfig::from_toml_str(include_str!("../../../config/vengeance.toml")).unwrap();
        let defaults = EngineConfig::default();
        assert_eq!(config.maze, defaults.maze);
        assert_eq!(config.rng_seed, defaults.rng_seed);
        assert_eq!(config.pursuer_spawns, defaults.pursuer_spawns);
        assert_eq!(config.max_ammo, defaults.max_ammo);
    }
}
