//! Grid-constrained travel shared by players and pursuers.
//!
//! An actor only changes heading while snapped to a grid intersection. Between
//! intersections it slides along its heading; the cell it is about to enter is
//! tested before the move is committed.

use crate::entity::{Direction, Position, round_half_up};
use crate::maze::Maze;

/// Intersection tolerance as a fraction of this tick's travel distance.
///
/// Slightly above one half, so that some position in every stride lands
/// inside the window regardless of frame delta.
pub const INTERSECTION_TOLERANCE_FACTOR: f32 = 0.51;

/// Tolerance used when nothing moves this tick (zero delta or zero speed).
pub const STATIONARY_TOLERANCE: f32 = 0.05;

/// Tunnel exits land just inside the opposite edge.
pub const TUNNEL_LEFT_EXIT: f32 = -0.49;
pub const TUNNEL_RIGHT_INSET: f32 = 0.51;

/// Tiles covered at `speed` (tiles/s) over `delta_ms`.
#[inline]
pub fn travel_distance(speed: f32, delta_ms: f32) -> f32 {
    speed * delta_ms / 1000.0
}

/// Intersection tolerance for a tick that travels `distance` tiles.
#[inline]
pub fn intersection_tolerance(distance: f32) -> f32 {
    if distance > 0.0 {
        distance * INTERSECTION_TOLERANCE_FACTOR
    } else {
        STATIONARY_TOLERANCE
    }
}

pub fn at_intersection(position: Position, distance: f32) -> bool {
    let tolerance = intersection_tolerance(distance);
    (position.x - round_half_up(position.x)).abs() < tolerance
        && (position.y - round_half_up(position.y)).abs() < tolerance
}

/// Snap onto the nearest intersection if within tolerance. Returns whether it snapped.
pub fn snap_to_intersection(position: &mut Position, distance: f32) -> bool {
    if !at_intersection(*position, distance) {
        return false;
    }
    position.x = round_half_up(position.x);
    position.y = round_half_up(position.y);
    true
}

/// Whether the neighbour of a snapped position in `heading` is open.
pub fn can_move(maze: &Maze, position: Position, heading: Direction) -> bool {
    if heading == Direction::Stop {
        return false;
    }
    let (dx, dy) = heading.delta();
    let x = position.x as i32 + dx as i32;
    let y = position.y as i32 + dy as i32;
    !maze.is_wall_cell(x, y)
}

/// Heading adopted at an intersection: the pending heading wins when it is
/// new, not a reversal, and leads into an open tile.
pub fn resolve_turn(
    maze: &Maze,
    position: Position,
    heading: Direction,
    next_heading: Direction,
) -> Direction {
    if next_heading != heading
        && next_heading != heading.opposite()
        && can_move(maze, position, next_heading)
    {
        next_heading
    } else {
        heading
    }
}

/// Result of one tentative advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved,
    /// The boundary cell ahead is a wall; the actor was clamped to its tile.
    Blocked,
    Idle,
}

/// Slide `distance` tiles along `heading`, clamping at walls and wrapping
/// through tunnels.
pub fn advance(maze: &Maze, position: &mut Position, heading: Direction, distance: f32) -> Advance {
    if heading == Direction::Stop {
        wrap_tunnel(maze, position);
        return Advance::Idle;
    }

    let next = position.offset(heading, distance);
    let outcome = if crosses_wall(maze, *position, heading, next) {
        if heading.is_vertical() {
            position.y = round_half_up(position.y);
        } else {
            position.x = round_half_up(position.x);
        }
        Advance::Blocked
    } else {
        *position = next;
        Advance::Moved
    };
    wrap_tunnel(maze, position);
    outcome
}

/// Whether moving from `from` to `next` along `heading` crosses into a wall.
///
/// Only the boundary cell past the current tile is tested: floor of the
/// moving axis for negative travel, ceil for positive travel.
pub fn crosses_wall(maze: &Maze, from: Position, heading: Direction, next: Position) -> bool {
    let tile_x = round_half_up(from.x);
    let tile_y = round_half_up(from.y);
    let (cx, cy) = (tile_x as i32, tile_y as i32);
    match heading {
        Direction::Up => next.y < tile_y && maze.is_wall_cell(cx, next.y.floor() as i32),
        Direction::Down => next.y > tile_y && maze.is_wall_cell(cx, next.y.ceil() as i32),
        Direction::Left => next.x < tile_x && maze.is_wall_cell(next.x.floor() as i32, cy),
        Direction::Right => next.x > tile_x && maze.is_wall_cell(next.x.ceil() as i32, cy),
        Direction::Stop => false,
    }
}

/// Teleport across the horizontal tunnel once past half a tile beyond an edge.
pub fn wrap_tunnel(maze: &Maze, position: &mut Position) {
    let width = maze.width() as f32;
    if position.x < -0.5 {
        position.x = width - TUNNEL_RIGHT_INSET;
    } else if position.x > width - 0.5 {
        position.x = TUNNEL_LEFT_EXIT;
    }
}
