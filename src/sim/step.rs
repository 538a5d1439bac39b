/// The step functions: advance the world by one frame.
///
/// Processing order per frame:
///   1. Movement resolution (at most one directional press)
///   2. Frame counter
///   3. Physics sweep, on every `physics_interval`-th frame
///
/// Movement rules live in `domain::rules` and physics decisions in
/// `domain::physics`. This module applies them to the working grid and
/// reports what happened as `GameEvent`s.

use tracing::{debug, info};

use crate::domain::entity::Direction;
use crate::domain::physics::{self, CellAction};
use crate::domain::rules::{self, MoveKind};
use crate::domain::tile::Tile;
use super::event::GameEvent;
use super::level;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════

/// One host frame: optional move, then physics on the cadence.
pub fn frame(world: &mut WorldState, input: Option<Direction>) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if let Some(dir) = input {
        resolve_move(world, dir, &mut events);
    }

    world.frame += 1;
    if world.frame % world.physics_interval() as u64 == 0 {
        resolve_physics(world, &mut events);
    }

    events
}

/// Apply one directional press.
pub fn apply_move(world: &mut WorldState, dir: Direction) -> Vec<GameEvent> {
    let mut events = Vec::new();
    resolve_move(world, dir, &mut events);
    events
}

/// Run one physics sweep.
pub fn physics_tick(world: &mut WorldState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    resolve_physics(world, &mut events);
    events
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_move(world: &mut WorldState, dir: Direction, events: &mut Vec<GameEvent>) {
    // Facing tracks the latest press even when the move is refused
    world.player.facing = dir;

    // Explosion playing: wait for the reset
    if !world.player.alive { return; }

    let (px, py) = (world.player.x, world.player.y);
    let (tx, ty) = match dir.step(px, py) {
        Some(p) => p,
        None => return,
    };

    let kind = rules::classify_move(&world.grid, px, py, dir);
    match kind {
        MoveKind::Blocked => return,
        MoveKind::Exit => {
            level::advance_level(world, events);
            return;
        }
        MoveKind::Push { to } => {
            world.grid.set(to.0, to.1, Tile::Rock);
            world.grid.set(tx, ty, Tile::Empty);
            events.push(GameEvent::RockPushed { from: (tx, ty), to, dir });
        }
        MoveKind::Collect => collect_gem(world, tx, ty, events),
        MoveKind::Dig | MoveKind::Walk => {}
    }

    world.player.holds_falling_object = false;
    if kind.checks_support() && rules::under_falling_object(&world.grid, tx, ty) {
        world.player.holds_falling_object = true;
    }

    world.grid.set(px, py, Tile::Empty);
    world.grid.set(tx, ty, Tile::Player);
    world.player.x = tx;
    world.player.y = ty;
}

fn collect_gem(world: &mut WorldState, x: usize, y: usize, events: &mut Vec<GameEvent>) {
    world.gems_collected += 1;
    events.push(GameEvent::GemCollected { x, y, total: world.gems_collected });

    if rules::exit_unlocked(world.gems_collected, world.gem_target()) {
        let exits = world.grid.replace_all(Tile::ClosedExit, Tile::OpenExit);
        if exits > 0 {
            debug!(exits, gems = world.gems_collected, "exit opened");
            events.push(GameEvent::ExitOpened { exits });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Physics
// ══════════════════════════════════════════════════════════════

fn resolve_physics(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    world.tick += 1;

    for (x, y) in physics::sweep_order(world.grid.width(), world.grid.height()) {
        match physics::decide(&world.grid, x, y, world.player.holds_falling_object) {
            CellAction::Idle | CellAction::Held => {}
            CellAction::Advance(next) => {
                world.grid.set(x, y, next);
                let stage = next.explosion_stage().unwrap_or(0);
                events.push(GameEvent::ExplosionAdvanced { x, y, stage });
            }
            CellAction::ResetLevel => {
                info!(level = world.current_level, "explosion finished, resetting level");
                level::reset_level(world, events);
                return;
            }
            CellAction::Fall { to } => {
                move_object(world, (x, y), to);
                events.push(GameEvent::ObjectFell { from: (x, y), to });
            }
            CellAction::Roll { to } => {
                move_object(world, (x, y), to);
                events.push(GameEvent::ObjectRolled { from: (x, y), to });
            }
            CellAction::Crush { player } => {
                world.grid.set(player.0, player.1, Tile::Explosion0);
                world.grid.set(x, y, Tile::Empty);
                world.player.alive = false;
                debug!(x = player.0, y = player.1, "player crushed");
                events.push(GameEvent::PlayerCrushed { x: player.0, y: player.1 });
            }
        }
    }
}

fn move_object(world: &mut WorldState, from: (usize, usize), to: (usize, usize)) {
    let tile = world.grid.get(from.0, from.1);
    world.grid.set(to.0, to.1, tile);
    world.grid.set(from.0, from.1, Tile::Empty);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Grid;
    use crate::sim::level::Level;

    fn world_from(rows: &[&str], gem_target: u32) -> WorldState {
        let level = Level::from_grid("test", Grid::from_rows(rows), gem_target);
        WorldState::new(vec![level], 1)
    }

    fn two_levels(first: &[&str], second: &[&str]) -> WorldState {
        let a = Level::from_grid("first", Grid::from_rows(first), 1);
        let b = Level::from_grid("second", Grid::from_rows(second), 1);
        WorldState::new(vec![a, b], 1)
    }

    // ── Movement ──

    #[test]
    fn dig_through_dirt() {
        let mut w = world_from(&[
            "#####",
            "#P..#",
            "#####",
        ], 1);
        let events = apply_move(&mut w, Direction::Right);
        assert!(events.is_empty());
        assert_eq!((w.player.x, w.player.y), (2, 1));
        assert_eq!(w.grid.get(1, 1), Tile::Empty);
        assert_eq!(w.grid.get(2, 1), Tile::Player);
        assert_eq!(w.player.facing, Direction::Right);
    }

    #[test]
    fn wall_refuses_move_but_turns_player() {
        let mut w = world_from(&[
            "####",
            "#P.#",
            "####",
        ], 1);
        let before = w.grid.clone();
        apply_move(&mut w, Direction::Up);
        assert_eq!(w.grid, before);
        assert_eq!((w.player.x, w.player.y), (1, 1));
        assert_eq!(w.player.facing, Direction::Up);
    }

    #[test]
    fn closed_exit_is_not_enterable() {
        let mut w = world_from(&[
            "####",
            "#PE#",
            "####",
        ], 1);
        apply_move(&mut w, Direction::Right);
        assert_eq!((w.player.x, w.player.y), (1, 1));
        assert_eq!(w.grid.get(2, 1), Tile::ClosedExit);
    }

    #[test]
    fn push_rock_into_empty() {
        let mut w = world_from(&[
            "######",
            "#Po  #",
            "######",
        ], 1);
        let events = apply_move(&mut w, Direction::Right);
        assert_eq!(w.grid.get(1, 1), Tile::Empty);
        assert_eq!(w.grid.get(2, 1), Tile::Player);
        assert_eq!(w.grid.get(3, 1), Tile::Rock);
        assert_eq!(events, vec![GameEvent::RockPushed { from: (2, 1), to: (3, 1), dir: Direction::Right }]);
    }

    #[test]
    fn push_into_occupied_cell_moves_nothing() {
        let mut w = world_from(&[
            "######",
            "#Po* #",
            "######",
        ], 1);
        w.player.facing = Direction::Up;
        let before = w.grid.clone();
        let events = apply_move(&mut w, Direction::Right);
        assert!(events.is_empty());
        assert_eq!(w.grid, before);
        assert_eq!((w.player.x, w.player.y), (1, 1));
        assert_eq!(w.player.facing, Direction::Right);
    }

    #[test]
    fn push_left() {
        let mut w = world_from(&[
            "######",
            "# oP #",
            "######",
        ], 1);
        apply_move(&mut w, Direction::Left);
        assert_eq!(w.grid.get(1, 1), Tile::Rock);
        assert_eq!(w.grid.get(2, 1), Tile::Player);
        assert_eq!(w.grid.get(3, 1), Tile::Empty);
    }

    #[test]
    fn vertical_push_is_refused() {
        let mut w = world_from(&[
            "###",
            "# #",
            "#o#",
            "#P#",
            "###",
        ], 1);
        let before = w.grid.clone();
        apply_move(&mut w, Direction::Up);
        assert_eq!(w.grid, before);
        assert_eq!(w.player.facing, Direction::Up);
    }

    #[test]
    fn exit_opens_on_last_gem_only() {
        let mut w = world_from(&[
            "#######",
            "#P**.E#",
            "#E....#",
            "#######",
        ], 2);

        let events = apply_move(&mut w, Direction::Right);
        assert_eq!(w.gems_collected, 1);
        assert_eq!(events, vec![GameEvent::GemCollected { x: 2, y: 1, total: 1 }]);
        assert_eq!(w.grid.count(Tile::ClosedExit), 2);

        let events = apply_move(&mut w, Direction::Right);
        assert_eq!(w.gems_collected, 2);
        assert_eq!(w.grid.count(Tile::ClosedExit), 0);
        assert_eq!(w.grid.count(Tile::OpenExit), 2);
        assert_eq!(events, vec![
            GameEvent::GemCollected { x: 3, y: 1, total: 2 },
            GameEvent::ExitOpened { exits: 2 },
        ]);
    }

    #[test]
    fn open_exit_advances_and_wraps() {
        let mut w = two_levels(
            &["####", "#PX#", "####"],
            &["#####", "#.PX#", "#####"],
        );
        let events = apply_move(&mut w, Direction::Right);
        assert_eq!(events, vec![GameEvent::LevelAdvanced { from: 0, to: 1 }]);
        assert_eq!(w.current_level, 1);
        assert_eq!((w.player.x, w.player.y), (2, 1));
        assert_eq!(w.player.facing, Direction::Down);

        let events = apply_move(&mut w, Direction::Right);
        assert_eq!(events, vec![GameEvent::LevelAdvanced { from: 1, to: 0 }]);
        assert_eq!(w.current_level, 0);
        assert_eq!(w.grid, w.levels[0].grid);
    }

    #[test]
    fn digging_under_rock_sets_hold_flag() {
        let mut w = world_from(&[
            "#####",
            "#.o.#",
            "#P..#",
            "#####",
        ], 1);
        apply_move(&mut w, Direction::Right);
        assert!(w.player.holds_falling_object);

        // next move clears it
        apply_move(&mut w, Direction::Right);
        assert!(!w.player.holds_falling_object);
    }

    #[test]
    fn walking_into_empty_never_sets_hold_flag() {
        let mut w = world_from(&[
            "#####",
            "#.o.#",
            "#P  #",
            "#####",
        ], 1);
        apply_move(&mut w, Direction::Right);
        assert!(!w.player.holds_falling_object);
    }

    #[test]
    fn moves_ignored_while_exploding() {
        let mut w = world_from(&[
            "#####",
            "#.o.#",
            "#.P.#",
            "#####",
        ], 1);
        physics_tick(&mut w);
        assert!(!w.player.alive);
        let before = w.grid.clone();
        apply_move(&mut w, Direction::Left);
        assert_eq!(w.grid, before);
        assert_eq!((w.player.x, w.player.y), (2, 2));
        assert_eq!(w.player.facing, Direction::Left);
    }

    // ── Physics ──

    #[test]
    fn settled_grid_is_unchanged_by_tick() {
        let mut w = world_from(&[
            "######",
            "#P.o.#",
            "#.*o.#",
            "#..*E#",
            "######",
        ], 2);
        let before = w.grid.clone();
        let events = physics_tick(&mut w);
        assert!(events.is_empty());
        assert_eq!(w.grid, before);
    }

    #[test]
    fn object_falls_one_row_per_tick() {
        let mut w = world_from(&[
            "#####",
            "#Po #",
            "#.  #",
            "#.  #",
            "#####",
        ], 1);
        let events = physics_tick(&mut w);
        assert_eq!(events, vec![GameEvent::ObjectFell { from: (2, 1), to: (2, 2) }]);
        assert_eq!(w.grid.get(2, 2), Tile::Rock);
        assert_eq!(w.grid.get(2, 1), Tile::Empty);

        physics_tick(&mut w);
        assert_eq!(w.grid.get(2, 3), Tile::Rock);

        let events = physics_tick(&mut w);
        assert!(events.is_empty());
    }

    #[test]
    fn stacked_objects_fall_together() {
        let mut w = world_from(&[
            "####",
            "#o #",
            "#* #",
            "#  #",
            "#P.#",
            "####",
        ], 1);
        physics_tick(&mut w);
        assert_eq!(w.grid.get(1, 1), Tile::Empty);
        assert_eq!(w.grid.get(1, 2), Tile::Rock);
        assert_eq!(w.grid.get(1, 3), Tile::Gem);
    }

    #[test]
    fn tie_break_rolls_right() {
        let mut w = world_from(&[
            "#######",
            "#P o .#",
            "#. o .#",
            "#.....#",
            "#######",
        ], 1);
        // both sides open
        let events = physics_tick(&mut w);
        assert_eq!(events, vec![GameEvent::ObjectRolled { from: (3, 1), to: (4, 2) }]);
        assert_eq!(w.grid.get(4, 2), Tile::Rock);
        assert_eq!(w.grid.get(2, 2), Tile::Empty);
    }

    #[test]
    fn rolls_left_when_right_is_blocked() {
        let mut w = world_from(&[
            "######",
            "#P o.#",
            "#. * #",
            "#....#",
            "######",
        ], 1);
        physics_tick(&mut w);
        assert_eq!(w.grid.get(2, 2), Tile::Rock);
        assert_eq!(w.grid.get(3, 1), Tile::Empty);
    }

    #[test]
    fn rock_crushes_unprotected_player() {
        let mut w = world_from(&[
            "#####",
            "#.o.#",
            "#.P.#",
            "#####",
        ], 1);
        let events = physics_tick(&mut w);
        assert_eq!(events, vec![GameEvent::PlayerCrushed { x: 2, y: 2 }]);
        assert_eq!(w.grid.get(2, 2), Tile::Explosion0);
        assert_eq!(w.grid.get(2, 1), Tile::Empty);
        assert!(!w.player.alive);
    }

    #[test]
    fn holding_player_is_spared_until_next_move() {
        let mut w = world_from(&[
            "#####",
            "#.o.#",
            "#P..#",
            "#####",
        ], 1);
        apply_move(&mut w, Direction::Right);
        assert!(w.player.holds_falling_object);

        let before = w.grid.clone();
        physics_tick(&mut w);
        physics_tick(&mut w);
        assert_eq!(w.grid, before);
        assert!(w.player.alive);

        // stepping out from under drops the rock into the vacated cell
        apply_move(&mut w, Direction::Right);
        physics_tick(&mut w);
        assert_eq!(w.grid.get(2, 2), Tile::Rock);
        assert!(w.player.alive);
    }

    #[test]
    fn stale_hold_flag_still_protects() {
        // flag set under a rock, then a gem takes the rock's place
        let mut w = world_from(&[
            "######",
            "#.o. #",
            "#P...#",
            "######",
        ], 1);
        apply_move(&mut w, Direction::Right);
        assert!(w.player.holds_falling_object);
        w.grid.set(2, 1, Tile::Gem);
        physics_tick(&mut w);
        assert!(w.player.alive);
        assert_eq!(w.grid.get(2, 1), Tile::Gem);
    }

    #[test]
    fn explosion_runs_six_frames_then_resets() {
        let mut w = world_from(&[
            "#####",
            "#.P.#",
            "#...#",
            "#####",
        ], 1);
        w.grid = Grid::from_rows(&[
            "#####",
            "#.o.#",
            "#.P.#",
            "#####",
        ]);
        w.player.x = 2;
        w.player.y = 2;
        w.gems_collected = 1;

        physics_tick(&mut w);
        assert_eq!(w.grid.get(2, 2), Tile::Explosion0);

        for stage in 1..=5u8 {
            let events = physics_tick(&mut w);
            assert_eq!(events, vec![GameEvent::ExplosionAdvanced { x: 2, y: 2, stage }]);
        }
        assert_eq!(w.grid.get(2, 2), Tile::Explosion5);

        let events = physics_tick(&mut w);
        assert_eq!(events, vec![GameEvent::LevelReset { level: 0 }]);
        assert_eq!(w.grid, w.levels[0].grid);
        assert_eq!((w.player.x, w.player.y), (2, 1));
        assert!(w.player.alive);
        assert_eq!(w.gems_collected, 0);
        assert_eq!(w.tick, 0);
    }

    #[test]
    fn reset_aborts_rest_of_sweep() {
        let mut w = world_from(&[
            "#####",
            "#P..#",
            "#...#",
            "#####",
        ], 1);
        // explosion on the bottom row is visited before the loose rock above
        w.grid = Grid::from_rows(&[
            "#####",
            "#P o#",
            "#f  #",
            "#####",
        ]);
        let events = physics_tick(&mut w);
        assert_eq!(events, vec![GameEvent::LevelReset { level: 0 }]);
        assert_eq!(w.grid, w.levels[0].grid);
    }

    // ── Frame cadence ──

    #[test]
    fn physics_runs_every_nth_frame() {
        let level = Level::from_grid("cadence", Grid::from_rows(&[
            "####",
            "#Po#",
            "#. #",
            "#. #",
            "####",
        ]), 1);
        let mut w = WorldState::new(vec![level], 3);

        assert!(frame(&mut w, None).is_empty());
        assert!(frame(&mut w, None).is_empty());
        let events = frame(&mut w, None);
        assert_eq!(events, vec![GameEvent::ObjectFell { from: (2, 1), to: (2, 2) }]);
        assert_eq!(w.tick, 1);
    }

    #[test]
    fn zero_interval_set_mid_session_runs_physics_every_frame() {
        let level = Level::from_grid("cadence", Grid::from_rows(&[
            "####",
            "#Po#",
            "#. #",
            "#. #",
            "####",
        ]), 1);
        let mut w = WorldState::new(vec![level], 3);
        w.set_physics_interval(0);

        let events = frame(&mut w, None);
        assert_eq!(events, vec![GameEvent::ObjectFell { from: (2, 1), to: (2, 2) }]);
        let events = frame(&mut w, None);
        assert_eq!(events, vec![GameEvent::ObjectFell { from: (2, 2), to: (2, 3) }]);
        assert_eq!(w.tick, 2);
    }

    #[test]
    fn frame_moves_before_physics() {
        let mut w = world_from(&[
            "#####",
            "#Po #",
            "#.. #",
            "#####",
        ], 1);
        // push the rock off the dirt shelf, then it falls in the same frame
        let events = frame(&mut w, Some(Direction::Right));
        assert_eq!(events, vec![
            GameEvent::RockPushed { from: (2, 1), to: (3, 1), dir: Direction::Right },
            GameEvent::ObjectFell { from: (3, 1), to: (3, 2) },
        ]);
        assert_eq!(w.grid.get(2, 1), Tile::Player);
    }
}
