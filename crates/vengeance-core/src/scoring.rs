use crate::entity::{GameMode, PlayerId};

/// Points for a normal pellet.
pub const PELLET_POINTS: u32 = 10;
/// Points for a power pellet.
pub const POWER_PELLET_POINTS: u32 = 50;
/// Points for capturing a pursuer, by contact or by projectile.
pub const CAPTURE_POINTS: u32 = 200;

pub fn pellet_points(power: bool) -> u32 {
    if power {
        POWER_PELLET_POINTS
    } else {
        PELLET_POINTS
    }
}

/// Winner at game over: player 1 in single-player, otherwise the higher
/// score. A two-player tie has no winner.
pub fn decide_winner(mode: GameMode, score_one: u32, score_two: u32) -> Option<PlayerId> {
    match mode {
        GameMode::SinglePlayer => Some(1),
        GameMode::TwoPlayer => match score_one.cmp(&score_two) {
            std::cmp::Ordering::Greater => Some(1),
            std::cmp::Ordering::Less => Some(2),
            std::cmp::Ordering::Equal => None,
        },
    }
}

/// High score never decreases.
pub fn updated_high_score(previous: u32, scores: &[u32]) -> u32 {
    scores.iter().copied().fold(previous, u32::max)
}
