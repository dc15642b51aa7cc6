/// Configuration problems detected while loading a maze or tunables.
///
/// These surface at load time only. Once a session exists the tick has no
/// failure path.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyMaze,
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    UnknownTile {
        ch: char,
        x: usize,
        y: usize,
    },
    MissingMarker(char),
    DuplicateMarker(char),
    OpenBorder {
        x: usize,
        y: usize,
    },
    NoPellets,
    SpawnInWall {
        what: &'static str,
        x: i32,
        y: i32,
    },
    InvalidTunable {
        name: &'static str,
        value: f64,
    },
    Toml(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMaze => write!(f, "maze has no rows"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "maze row {row} has {found} columns, expected {expected}"
            ),
            Self::UnknownTile { ch, x, y } => {
                write!(f, "unknown maze character {ch:?} at ({x}, {y})")
            },
            Self::MissingMarker(ch) => write!(f, "maze is missing the {ch:?} marker"),
            Self::DuplicateMarker(ch) => write!(f, "maze has more than one {ch:?} marker"),
            Self::OpenBorder { x, y } => write!(
                f,
                "open border tile at ({x}, {y}) is not part of a tunnel row"
            ),
            Self::NoPellets => write!(f, "maze contains no pellets"),
            Self::SpawnInWall { what, x, y } => {
                write!(f, "{what} spawn at ({x}, {y}) is inside a wall")
            },
            Self::InvalidTunable { name, value } => {
                write!(f, "tunable `{name}` has invalid value {value}")
            },
            Self::Toml(m) => write!(f, "failed to parse config: {m}"),
        }
    }
}

impl std::error::Error for ConfigError {}
