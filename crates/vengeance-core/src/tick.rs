//! Timers and actor movement for one simulation step.

use rand::rngs::StdRng;

use crate::SessionState;
use crate::config::EngineConfig;
use crate::entity::{Archetype, Direction, Position};
use crate::maze::Maze;
use crate::movement::{Advance, advance, resolve_turn, snap_to_intersection, travel_distance};
use crate::pursuer::{TargetContext, chase_target, choose_heading, flee_target};

/// Longest distance anything may travel in one step. Frame deltas that would
/// exceed it are split into equal sub-steps.
pub const MAX_STEP_TILES: f32 = 0.45;

/// Upper bound on sub-steps per frame.
pub const MAX_SUBSTEPS: u32 = 256;

/// Longest frame that still fits in [`MAX_SUBSTEPS`] steps of at most
/// [`MAX_STEP_TILES`]. Longer deltas are cut down to it.
pub fn clamp_frame(config: &EngineConfig, delta_ms: f32) -> f32 {
    let limit_ms = MAX_SUBSTEPS as f32 * MAX_STEP_TILES * 1000.0 / config.max_speed();
    delta_ms.min(limit_ms)
}

/// Number of equal sub-steps needed for `delta_ms`, never more than
/// [`MAX_SUBSTEPS`].
pub fn substeps(config: &EngineConfig, delta_ms: f32) -> u32 {
    let travel = travel_distance(config.max_speed(), delta_ms);
    if travel <= MAX_STEP_TILES {
        return 1;
    }
    ((travel / MAX_STEP_TILES).ceil() as u32).min(MAX_SUBSTEPS)
}

/// Stun countdown, ammo recharge and pursuer vulnerability.
pub(crate) fn tick_timers(state: &mut SessionState, config: &EngineConfig, delta_ms: f32) {
    let mode = state.mode;
    for player in &mut state.players {
        if !SessionState::participates(mode, player.id) {
            continue;
        }
        if player.is_stunned() {
            player.stun_ms = (player.stun_ms - delta_ms).max(0.0);
        }
        if player.ammo < config.max_ammo {
            player.ammo_recharge_ms += delta_ms;
            if player.ammo_recharge_ms >= config.ammo_recharge_ms {
                player.ammo += 1;
                player.ammo_recharge_ms = 0.0;
            }
        } else {
            player.ammo_recharge_ms = 0.0;
        }
    }
    for pursuer in &mut state.pursuers {
        if pursuer.is_vulnerable() {
            pursuer.vulnerable_ms = (pursuer.vulnerable_ms - delta_ms).max(0.0);
        }
    }
}

/// Players turn only at intersections and stop when blocked.
pub(crate) fn move_players(
    state: &mut SessionState,
    maze: &Maze,
    config: &EngineConfig,
    delta_ms: f32,
) {
    let distance = travel_distance(config.player_speed, delta_ms);
    let mode = state.mode;
    for player in &mut state.players {
        if !SessionState::participates(mode, player.id) || player.is_stunned() {
            continue;
        }
        if snap_to_intersection(&mut player.position, distance) {
            player.heading = resolve_turn(maze, player.position, player.heading, player.next_heading);
        }
        if advance(maze, &mut player.position, player.heading, distance) == Advance::Blocked {
            player.heading = Direction::Stop;
        }
    }
}

/// Pursuers pick a heading at each intersection and keep it until the next.
pub(crate) fn move_pursuers(
    state: &mut SessionState,
    maze: &Maze,
    config: &EngineConfig,
    delta_ms: f32,
    rng: &mut StdRng,
) {
    let tracked = &state.players[0];
    let mut ctx = TargetContext {
        player: tracked.position,
        player_heading: tracked.heading,
        direct: None,
        retreat_corner: Position::new(0.0, (maze.height() - 1) as f32),
        ambush_lead: config.ambush_lead_tiles,
        retreat_distance: config.opportunist_retreat_distance,
    };

    for pursuer in &mut state.pursuers {
        let fleeing = pursuer.is_vulnerable();
        let speed = if fleeing {
            config.pursuer_speed * config.fled_speed_multiplier
        } else {
            config.pursuer_speed
        };
        let distance = travel_distance(speed, delta_ms);

        if snap_to_intersection(&mut pursuer.position, distance) {
            let target = if fleeing {
                flee_target(rng, config.flee_target_range)
            } else {
                chase_target(pursuer.archetype, pursuer.position, &ctx)
            };
            pursuer.heading = choose_heading(maze, pursuer.position, pursuer.heading, target);
            tracing::trace!(
                pursuer = pursuer.id,
                heading = ?pursuer.heading,
                target = ?target,
                "Pursuer decision"
            );
        }
        // A blocked pursuer keeps its heading and re-decides at the next intersection.
        advance(maze, &mut pursuer.position, pursuer.heading, distance);

        if pursuer.archetype == Archetype::Direct {
            ctx.direct = Some(pursuer.position);
        }
    }
}
