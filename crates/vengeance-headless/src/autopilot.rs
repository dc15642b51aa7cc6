//! Simple computer control for headless runs: walk toward the nearest pellet,
//! shoot fleeing pursuers that line up ahead.

use std::collections::VecDeque;

use vengeance_core::SessionState;
use vengeance_core::entity::{Direction, PlayerId};
use vengeance_core::maze::{Maze, Tile};

/// How far ahead a lined-up fleeing pursuer is worth a shot (tiles).
pub const SHOT_RANGE: f32 = 6.0;

/// Intents for one player this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Steering {
    pub heading: Option<Direction>,
    pub shoot: bool,
}

/// Decide what `player_id` should do next.
pub fn steer(state: &SessionState, maze: &Maze, player_id: PlayerId) -> Steering {
    let Some(player) = state.players.iter().find(|p| p.id == player_id) else {
        return Steering::default();
    };
    if player.is_stunned() {
        return Steering::default();
    }

    let heading = first_step_to_pellet(state, maze, player.position.tile());
    let shoot = player.ammo > 0
        && player.heading != Direction::Stop
        && state.pursuers.iter().any(|pursuer| {
            if !pursuer.is_vulnerable() || pursuer.captured {
                return false;
            }
            let dx = pursuer.position.x - player.position.x;
            let dy = pursuer.position.y - player.position.y;
            match player.heading {
                Direction::Left => dy.abs() < 0.5 && (-SHOT_RANGE..0.0).contains(&dx),
                Direction::Right => dy.abs() < 0.5 && dx > 0.0 && dx <= SHOT_RANGE,
                Direction::Up => dx.abs() < 0.5 && (-SHOT_RANGE..0.0).contains(&dy),
                Direction::Down => dx.abs() < 0.5 && dy > 0.0 && dy <= SHOT_RANGE,
                Direction::Stop => false,
            }
        });

    Steering { heading, shoot }
}

/// Breadth-first search over open tiles; returns the first heading of a
/// shortest path to any remaining pellet.
fn first_step_to_pellet(state: &SessionState, maze: &Maze, from: Tile) -> Option<Direction> {
    let width = maze.width();
    let height = maze.height();
    let index = |t: Tile| (t.y * width + t.x) as usize;
    let in_grid = |t: Tile| (0..width).contains(&t.x) && (0..height).contains(&t.y);
    if !in_grid(from) {
        return None;
    }

    let mut pellet_at = vec![false; (width * height) as usize];
    for pellet in &state.pellets {
        pellet_at[index(pellet.tile)] = true;
    }

    let mut visited = vec![false; pellet_at.len()];
    let mut queue = VecDeque::new();
    visited[index(from)] = true;
    for dir in Direction::CARDINALS {
        let next = step(from, dir);
        if in_grid(next) && !maze.is_wall_cell(next.x, next.y) {
            visited[index(next)] = true;
            queue.push_back((next, dir));
        }
    }

    while let Some((tile, first)) = queue.pop_front() {
        if pellet_at[index(tile)] {
            return Some(first);
        }
        for dir in Direction::CARDINALS {
            let next = step(tile, dir);
            if in_grid(next) && !maze.is_wall_cell(next.x, next.y) && !visited[index(next)] {
                visited[index(next)] = true;
                queue.push_back((next, first));
            }
        }
    }
    None
}

fn step(tile: Tile, dir: Direction) -> Tile {
    let (dx, dy) = dir.delta();
    Tile::new(tile.x + dx as i32, tile.y + dy as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vengeance_core::PixelVengeance;
    use vengeance_core::config::EngineConfig;
    use vengeance_core::entity::{GameMode, Position};
    use vengeance_core::test_helpers::started;

    fn game() -> PixelVengeance {
        started(EngineConfig::default(), GameMode::SinglePlayer)
    }

    #[test]
    fn heads_for_adjacent_pellet() {
        let mut game = game();
        // Only the pellet right of spawn remains.
        game.state_mut()
            .pellets
            .retain(|p| p.tile == Tile::new(9, 14));
        let steering = steer(game.state(), game.maze(), 1);
        assert_eq!(steering.heading, Some(Direction::Right));
        assert!(!steering.shoot);
    }

    #[test]
    fn follows_shortest_path() {
        let mut game = game();
        // (1, 16) is nine steps away via the gap at (4, 15); everything
        // starting up or right is longer.
        game.state_mut()
            .pellets
            .retain(|p| p.tile == Tile::new(1, 16));
        let steering = steer(game.state(), game.maze(), 1);
        assert_eq!(steering.heading, Some(Direction::Left));
    }

    #[test]
    fn no_pellets_means_no_heading() {
        let mut game = game();
        game.state_mut().pellets.clear();
        assert_eq!(steer(game.state(), game.maze(), 1).heading, None);
    }

    #[test]
    fn shoots_lined_up_fleeing_pursuer() {
        let mut game = game();
        {
            let state = game.state_mut();
            state.players[0].heading = Direction::Left;
            state.pursuers[2].position = Position::new(5.0, 14.0);
            state.pursuers[2].vulnerable_ms = 4000.0;
        }
        assert!(steer(game.state(), game.maze(), 1).shoot);

        game.state_mut().players[0].heading = Direction::Right;
        assert!(!steer(game.state(), game.maze(), 1).shoot);
    }

    #[test]
    fn holds_fire_at_hunting_pursuer() {
        let mut game = game();
        {
            let state = game.state_mut();
            state.players[0].heading = Direction::Left;
            state.pursuers[2].position = Position::new(5.0, 14.0);
        }
        assert!(!steer(game.state(), game.maze(), 1).shoot);
    }

    #[test]
    fn stunned_player_idles() {
        let mut game = game();
        game.state_mut().players[0].stun_ms = 100.0;
        assert_eq!(steer(game.state(), game.maze(), 1), Steering::default());
    }
}
