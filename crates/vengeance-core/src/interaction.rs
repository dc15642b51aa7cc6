//! Per-tick contact resolution: projectiles, pellets and player/pursuer
//! contact, applied in that order against the post-movement state.

use crate::SessionState;
use crate::config::EngineConfig;
use crate::entity::{Direction, PlayerId, Position, Projectile};
use crate::events::GameEvent;
use crate::maze::Maze;
use crate::movement::travel_distance;
use crate::projectile::{Flight, HIT_REACH, fly, out_of_bounds};
use crate::scoring::{CAPTURE_POINTS, pellet_points};

/// Half-width of the player/pursuer contact box.
pub const CONTACT_REACH: f32 = 0.7;

/// Attempt a shot for `player_id`. Returns the new projectile id on success.
pub(crate) fn fire(state: &mut SessionState, player_id: PlayerId) -> Option<u32> {
    if !state.is_participating(player_id) {
        return None;
    }
    let player = &mut state.players[slot(player_id)];
    if player.ammo == 0 || player.heading == Direction::Stop || player.is_stunned() {
        tracing::debug!(
            player_id,
            ammo = player.ammo,
            heading = ?player.heading,
            stunned = player.is_stunned(),
            "Shot refused"
        );
        return None;
    }
    player.ammo -= 1;
    let id = state.next_projectile_id;
    let projectile = Projectile {
        id,
        position: player.position,
        heading: player.heading,
        owner: player_id,
    };
    state.next_projectile_id = id.wrapping_add(1);
    state.projectiles.push(projectile);
    Some(id)
}

/// Defeat a pursuer on behalf of `player_id`. Capturing an already captured
/// pursuer does nothing.
pub(crate) fn capture(
    state: &mut SessionState,
    config: &EngineConfig,
    pursuer_idx: usize,
    player_id: PlayerId,
    events: &mut Vec<GameEvent>,
) {
    let pursuer = &mut state.pursuers[pursuer_idx];
    if pursuer.captured {
        return;
    }
    pursuer.captured = true;
    pursuer.vulnerable_ms = 0.0;
    pursuer.capture_generation = pursuer.capture_generation.wrapping_add(1);
    let generation = pursuer.capture_generation;
    let pursuer_id = pursuer.id;

    state.players[slot(player_id)].score += CAPTURE_POINTS;
    state.respawns.schedule(
        pursuer_id,
        generation,
        state.elapsed_ms + f64::from(config.respawn_delay_ms),
    );
    tracing::debug!(pursuer = pursuer_id, player_id, "Pursuer captured");
    events.push(GameEvent::PursuerCaptured {
        pursuer_id,
        player_id,
    });
}

/// Fire every respawn whose time has come. Timers left over from an earlier
/// capture are ignored.
pub(crate) fn respawn_due(state: &mut SessionState, maze: &Maze, events: &mut Vec<GameEvent>) {
    for due in state.respawns.drain_due(state.elapsed_ms) {
        let Some(pursuer) = state.pursuers.get_mut(usize::from(due.pursuer)) else {
            continue;
        };
        if pursuer.capture_generation != due.generation {
            tracing::debug!(pursuer = due.pursuer, "Stale respawn ignored");
            continue;
        }
        pursuer.position = Position::from_tile(maze.house());
        pursuer.captured = false;
        pursuer.heading = Direction::Stop;
        events.push(GameEvent::PursuerRespawned {
            pursuer_id: pursuer.id,
        });
    }
}

/// Move every projectile, then resolve player hits, pursuer hits and bounds.
/// A projectile is consumed by the first contact it makes.
pub(crate) fn resolve_projectiles(
    state: &mut SessionState,
    maze: &Maze,
    config: &EngineConfig,
    delta_ms: f32,
    events: &mut Vec<GameEvent>,
) {
    let distance = travel_distance(config.projectile_speed, delta_ms);
    let projectiles = std::mem::take(&mut state.projectiles);
    let mut survivors = Vec::with_capacity(projectiles.len());

    'flight: for mut projectile in projectiles {
        if fly(maze, &mut projectile.position, &mut projectile.heading, distance)
            == Flight::Ricocheted
        {
            tracing::trace!(projectile = projectile.id, heading = ?projectile.heading, "Ricochet");
        }

        for idx in 0..state.players.len() {
            let target = &state.players[idx];
            if target.id == projectile.owner || !state.is_participating(target.id) {
                continue;
            }
            if target.position.within(projectile.position, HIT_REACH) {
                let victim = target.id;
                state.players[idx].stun_ms = config.stun_duration_ms;
                tracing::debug!(player_id = victim, by = projectile.owner, "Player stunned");
                events.push(GameEvent::PlayerStunned {
                    player_id: victim,
                    by: projectile.owner,
                });
                continue 'flight;
            }
        }

        let struck = state
            .pursuers
            .iter()
            .position(|p| p.position.within(projectile.position, HIT_REACH));
        if let Some(idx) = struck {
            let pursuer = &state.pursuers[idx];
            if pursuer.is_vulnerable() && !pursuer.captured {
                capture(state, config, idx, projectile.owner, events);
            }
            continue;
        }

        if out_of_bounds(maze, projectile.position) {
            continue;
        }
        survivors.push(projectile);
    }
    state.projectiles = survivors;
}

/// Exact rounded-tile pellet pickup for each participating player.
pub(crate) fn resolve_pellets(
    state: &mut SessionState,
    config: &EngineConfig,
    events: &mut Vec<GameEvent>,
) {
    for idx in 0..state.players.len() {
        let player_id = state.players[idx].id;
        if !state.is_participating(player_id) {
            continue;
        }
        let tile = state.players[idx].position.tile();
        let Some(found) = state.pellets.iter().position(|p| p.tile == tile) else {
            continue;
        };
        let pellet = state.pellets.remove(found);
        let player = &mut state.players[idx];
        player.score += pellet_points(pellet.power);
        let score = player.score;

        if pellet.power {
            for pursuer in &mut state.pursuers {
                pursuer.vulnerable_ms = config.vulnerable_duration_ms;
                pursuer.captured = false;
            }
            tracing::debug!(player_id, "Power pellet eaten");
            events.push(GameEvent::PowerPelletEaten { player_id, score });
        } else {
            events.push(GameEvent::PelletEaten { player_id, score });
        }
    }
}

/// Player/pursuer contact: capture a vulnerable pursuer, otherwise lose a
/// life and go back to spawn. Stunned players and captured pursuers are
/// skipped.
pub(crate) fn resolve_contacts(
    state: &mut SessionState,
    maze: &Maze,
    config: &EngineConfig,
    events: &mut Vec<GameEvent>,
) {
    for idx in 0..state.players.len() {
        let player_id = state.players[idx].id;
        if !state.is_participating(player_id) || state.players[idx].is_stunned() {
            continue;
        }
        for pursuer_idx in 0..state.pursuers.len() {
            let pursuer = &state.pursuers[pursuer_idx];
            if pursuer.captured
                || !pursuer
                    .position
                    .within(state.players[idx].position, CONTACT_REACH)
            {
                continue;
            }
            if pursuer.is_vulnerable() {
                capture(state, config, pursuer_idx, player_id, events);
                continue;
            }

            let player = &mut state.players[idx];
            player.lives = player.lives.saturating_sub(1);
            player.position = Position::from_tile(maze.player_spawn(player_id));
            player.heading = Direction::Stop;
            player.next_heading = Direction::Stop;
            tracing::debug!(player_id, lives = player.lives, "Player caught");
            events.push(GameEvent::PlayerDied {
                player_id,
                lives_remaining: player.lives,
            });
            // One death per player per tick.
            break;
        }
    }
}

/// Array slot for a player id.
pub(crate) fn slot(player_id: PlayerId) -> usize {
    if player_id == 2 { 1 } else { 0 }
}
