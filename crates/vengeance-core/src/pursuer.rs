use rand::Rng;
use smallvec::SmallVec;

use crate::entity::{Archetype, Direction, Position};
use crate::maze::Maze;
use crate::movement::can_move;

/// What a pursuer knows about the world when it picks a target.
#[derive(Debug, Clone, Copy)]
pub struct TargetContext {
    /// Tracked player position.
    pub player: Position,
    /// Tracked player heading.
    pub player_heading: Direction,
    /// Live position of the direct pursuer, if one exists.
    pub direct: Option<Position>,
    /// Corner the opportunist falls back to.
    pub retreat_corner: Position,
    pub ambush_lead: f32,
    pub retreat_distance: f32,
}

/// Chase target for a pursuer that is not fleeing.
pub fn chase_target(archetype: Archetype, own: Position, ctx: &TargetContext) -> Position {
    match archetype {
        Archetype::Direct => ctx.player,
        Archetype::Ambush => ctx.player.offset(ctx.player_heading, ctx.ambush_lead),
        Archetype::Flank => match ctx.direct {
            Some(anchor) => Position::new(
                anchor.x + (ctx.player.x - anchor.x) * 2.0,
                anchor.y + (ctx.player.y - anchor.y) * 2.0,
            ),
            None => ctx.player,
        },
        Archetype::Opportunist => {
            if own.distance_to(ctx.player) < ctx.retreat_distance {
                ctx.retreat_corner
            } else {
                ctx.player
            }
        },
    }
}

/// Undirected wander target for a fleeing pursuer.
pub fn flee_target<R: Rng + ?Sized>(rng: &mut R, range: f32) -> Position {
    Position::new(rng.random_range(0.0..range), rng.random_range(0.0..range))
}

/// Open cardinal headings from a snapped position, in tie-break order.
pub fn legal_headings(maze: &Maze, position: Position) -> SmallVec<[Direction; 4]> {
    Direction::CARDINALS
        .into_iter()
        .filter(|&dir| can_move(maze, position, dir))
        .collect()
}

/// Pick the heading whose one-tile step lands closest to `target`.
///
/// Reversing is only allowed at a dead end. Ties keep the earliest heading in
/// `UP, DOWN, LEFT, RIGHT` order. With no legal heading the current one is kept.
pub fn choose_heading(
    maze: &Maze,
    position: Position,
    current: Direction,
    target: Position,
) -> Direction {
    let legal = legal_headings(maze, position);
    let reverse = current.opposite();
    let forward: SmallVec<[Direction; 4]> =
        legal.iter().copied().filter(|&d| d != reverse).collect();
    let candidates = if forward.is_empty() { &legal } else { &forward };

    let mut best = current;
    let mut best_distance = f32::INFINITY;
    for &dir in candidates {
        let distance = position.offset(dir, 1.0).distance_to(target);
        if distance < best_distance {
            best_distance = distance;
            best = dir;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::DEFAULT_MAZE;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ctx(player: Position, heading: Direction) -> TargetContext {
        TargetContext {
            player,
            player_heading: heading,
            direct: Some(Position::new(9.0, 7.0)),
            retreat_corner: Position::new(0.0, 20.0),
            ambush_lead: 4.0,
            retreat_distance: 8.0,
        }
    }

    #[test]
    fn direct_targets_player() {
        let c = ctx(Position::new(3.0, 5.0), Direction::Left);
        assert_eq!(
            chase_target(Archetype::Direct, Position::new(9.0, 9.0), &c),
            Position::new(3.0, 5.0)
        );
    }

    #[test]
    fn ambush_leads_along_heading() {
        let c = ctx(Position::new(8.0, 14.0), Direction::Up);
        assert_eq!(
            chase_target(Archetype::Ambush, Position::new(9.0, 9.0), &c),
            Position::new(8.0, 10.0)
        );
        let idle = ctx(Position::new(8.0, 14.0), Direction::Stop);
        assert_eq!(
            chase_target(Archetype::Ambush, Position::new(9.0, 9.0), &idle),
            Position::new(8.0, 14.0)
        );
    }

    #[test]
    fn flank_mirrors_through_direct() {
        let c = ctx(Position::new(11.0, 9.0), Direction::Right);
        // direct at (9, 7): 9 + 2*(11-9) = 13, 7 + 2*(9-7) = 11
        assert_eq!(
            chase_target(Archetype::Flank, Position::new(8.0, 10.0), &c),
            Position::new(13.0, 11.0)
        );
    }

    #[test]
    fn flank_without_direct_falls_back_to_player() {
        let mut c = ctx(Position::new(11.0, 9.0), Direction::Right);
        c.direct = None;
        assert_eq!(
            chase_target(Archetype::Flank, Position::new(8.0, 10.0), &c),
            Position::new(11.0, 9.0)
        );
    }

    #[test]
    fn opportunist_retreats_when_close() {
        let c = ctx(Position::new(10.0, 10.0), Direction::Right);
        assert_eq!(
            chase_target(Archetype::Opportunist, Position::new(10.0, 12.0), &c),
            Position::new(0.0, 20.0)
        );
        // Exactly at the threshold counts as far.
        assert_eq!(
            chase_target(Archetype::Opportunist, Position::new(10.0, 2.0), &c),
            Position::new(10.0, 10.0)
        );
    }

    #[test]
    fn flee_target_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let t = flee_target(&mut rng, 20.0);
            assert!((0.0..20.0).contains(&t.x));
            assert!((0.0..20.0).contains(&t.y));
        }
    }

    #[test]
    fn flee_target_is_reproducible_per_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(flee_target(&mut a, 20.0), flee_target(&mut b, 20.0));
    }

    #[test]
    fn legal_headings_skip_walls() {
        let maze = Maze::parse(&DEFAULT_MAZE).unwrap();
        // (1, 1): up and left are walls.
        let legal = legal_headings(&maze, Position::new(1.0, 1.0));
        assert_eq!(legal.as_slice(), &[Direction::Down, Direction::Right]);
    }

    #[test]
    fn picks_closest_step_to_target() {
        let maze = Maze::parse(&DEFAULT_MAZE).unwrap();
        // From (4, 3) every cardinal is open.
        let from = Position::new(4.0, 3.0);
        assert_eq!(
            choose_heading(&maze, from, Direction::Stop, Position::new(4.0, 18.0)),
            Direction::Down
        );
        assert_eq!(
            choose_heading(&maze, from, Direction::Stop, Position::new(17.0, 3.0)),
            Direction::Right
        );
    }

    #[test]
    fn never_reverses_unless_dead_end() {
        let maze = Maze::parse(&DEFAULT_MAZE).unwrap();
        // Heading right along row 3, target directly behind.
        let from = Position::new(4.0, 3.0);
        let chosen = choose_heading(&maze, from, Direction::Right, Position::new(1.0, 3.0));
        assert_ne!(chosen, Direction::Left);

        // (8, 6) is a vertical corridor: the only forward option is down.
        let corridor = Position::new(8.0, 6.0);
        assert_eq!(
            choose_heading(&maze, corridor, Direction::Down, Position::new(8.0, 2.0)),
            Direction::Down
        );
    }

    #[test]
    fn forced_reverse_in_dead_end() {
        let rows = [
            "#####", //
            "#1.2#", //
            "###G#", //
            "#####",
        ];
        let maze = Maze::parse(&rows).unwrap();
        // (3, 2) only opens upward; arriving heading down must reverse.
        let chosen = choose_heading(
            &maze,
            Position::new(3.0, 2.0),
            Direction::Down,
            Position::new(3.0, 3.0),
        );
        assert_eq!(chosen, Direction::Up);
    }

    #[test]
    fn ties_break_in_cardinal_order() {
        let maze = Maze::parse(&DEFAULT_MAZE).unwrap();
        // Target at the position itself: every step is distance 1.
        let from = Position::new(4.0, 3.0);
        assert_eq!(
            choose_heading(&maze, from, Direction::Stop, from),
            Direction::Up
        );
    }
}
