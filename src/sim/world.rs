/// WorldState: the complete state of a running session.
///
/// ## Tile Architecture
///
/// Two tile layers:
///   - `levels[i].grid`: the level templates. **Never mutated.**
///   - `grid`          : the working grid for the current level.
///
/// Resolvers only ever touch `grid`. A reset clones the template back in,
/// so in-progress mutations can never leak into the next attempt.
///
/// Nothing here is global: every resolver takes `&mut WorldState`, which
/// keeps sessions independent and tests deterministic.

use crate::domain::entity::{Direction, Player};
use crate::domain::grid::Grid;
use crate::domain::tile::Tile;
use super::level::{self, default_specs, Level};

pub const DEFAULT_PHYSICS_INTERVAL: u32 = 10;

pub struct WorldState {
    // ── Level sequence ──
    pub levels: Vec<Level>,
    pub current_level: usize,

    // ── Working state ──
    pub grid: Grid,
    pub player: Player,
    pub gems_collected: u32,

    // ── Timing ──
    /// Frames since the level was loaded.
    pub frame: u64,
    /// Physics ticks since the level was loaded.
    pub tick: u64,
    /// Physics runs on every Nth frame. Never zero.
    physics_interval: u32,
}

impl WorldState {
    /// Start a session on the first of `levels`. An empty list falls back
    /// to the built-in sequence.
    pub fn new(levels: Vec<Level>, physics_interval: u32) -> Self {
        let levels = if levels.is_empty() {
            default_specs().iter().map(|s| s.build()).collect()
        } else {
            levels
        };
        let mut world = WorldState {
            levels,
            current_level: 0,
            grid: Grid::new(0, 0, Tile::Empty),
            player: Player::new(0, 0),
            gems_collected: 0,
            frame: 0,
            tick: 0,
            physics_interval: physics_interval.max(1),
        };
        level::load_level(&mut world, 0);
        world
    }

    /// Session over the built-in levels at the default cadence.
    pub fn with_default_levels() -> Self {
        WorldState::new(Vec::new(), DEFAULT_PHYSICS_INTERVAL)
    }

    pub fn physics_interval(&self) -> u32 {
        self.physics_interval
    }

    /// Change the cadence mid-session. Zero is treated as 1.
    pub fn set_physics_interval(&mut self, interval: u32) {
        self.physics_interval = interval.max(1);
    }

    pub fn level(&self) -> &Level {
        &self.levels[self.current_level]
    }

    pub fn gem_target(&self) -> u32 {
        self.level().gem_target
    }

    pub fn facing(&self) -> Direction {
        self.player.facing
    }

    /// Text for the HUD overlay.
    pub fn hud_text(&self) -> String {
        format!(
            "{} - Gems: {} / {}",
            self.level().name, self.gems_collected, self.gem_target(),
        )
    }
}
