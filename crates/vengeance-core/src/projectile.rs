use crate::entity::{Direction, Position};
use crate::maze::Maze;
use crate::movement::crosses_wall;

/// Half-width of the rectangular hit box used for projectile contacts.
pub const HIT_REACH: f32 = 0.5;

/// How one flight step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    Flew,
    /// Hit a wall: heading reversed, position left where it was.
    Ricocheted,
}

/// Advance a projectile `distance` tiles, ricocheting off walls.
///
/// Flight is axis-aligned, so only the moving axis can meet a wall: a flat
/// wall and a concave corner both send the projectile straight back.
pub fn fly(maze: &Maze, position: &mut Position, heading: &mut Direction, distance: f32) -> Flight {
    let next = position.offset(*heading, distance);
    if crosses_wall(maze, *position, *heading, next) {
        *heading = heading.opposite();
        return Flight::Ricocheted;
    }
    *position = next;
    Flight::Flew
}

/// A projectile more than one tile past any edge is gone.
pub fn out_of_bounds(maze: &Maze, position: Position) -> bool {
    let tile = position.tile();
    tile.x < -1 || tile.x > maze.width() || tile.y < -1 || tile.y > maze.height()
}
