use serde::{Deserialize, Serialize};

use crate::entity::{GameMode, PlayerId, PursuerId};

/// Notable things that happened during a tick, in resolution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted {
        mode: GameMode,
    },
    ShotFired {
        player_id: PlayerId,
        projectile_id: u32,
    },
    PlayerStunned {
        player_id: PlayerId,
        by: PlayerId,
    },
    /// `score` is the eater's running total.
    PelletEaten {
        player_id: PlayerId,
        score: u32,
    },
    PowerPelletEaten {
        player_id: PlayerId,
        score: u32,
    },
    PursuerCaptured {
        pursuer_id: PursuerId,
        player_id: PlayerId,
    },
    PursuerRespawned {
        pursuer_id: PursuerId,
    },
    PlayerDied {
        player_id: PlayerId,
        lives_remaining: u32,
    },
    /// `winner` is `None` on a two-player draw.
    GameOver {
        winner: Option<PlayerId>,
        high_score: u32,
    },
}
