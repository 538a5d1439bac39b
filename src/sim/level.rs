/// Level generation and level transitions.
///
/// ## Generation
///
///   1. Border ring → BrickWall, interior → Dirt.
///   2. Player at `PLAYER_START`, ClosedExit at `(width - 2, height - 2)`.
///   3. Seeded rejection sampling: draw an interior cell, keep it only if it
///      is still Dirt. All rocks are placed before the first gem.
///
/// The same seed always produces the same grid. The sampling loop is not
/// bounded; `LevelSpec::validate` is the guard for configured levels.
///
/// ## Transitions
///
///   - `load_level`   : copy a template into the working grid
///   - `reset_level`  : reload the current template
///   - `advance_level`: next template, wrapping to the first

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::entity::Player;
use crate::domain::grid::{Grid, GRID_HEIGHT, GRID_WIDTH, PLAYER_START};
use crate::domain::tile::Tile;
use super::event::GameEvent;
use super::world::WorldState;

/// A generated (or hand-built) level. Never mutated once built: the
/// session works on a clone of `grid`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub name: String,
    pub grid: Grid,
    pub gem_target: u32,
    pub rock_count: u32,
    pub gem_count: u32,
    pub seed: u64,
    pub player_start: (usize, usize),
}

impl Level {
    /// Wrap a hand-built grid. The player starts on the grid's `Player`
    /// tile, or at `PLAYER_START` if there is none.
    pub fn from_grid(name: &str, grid: Grid, gem_target: u32) -> Self {
        let player_start = grid.find(Tile::Player).unwrap_or(PLAYER_START);
        Level {
            name: name.to_string(),
            rock_count: grid.count(Tile::Rock) as u32,
            gem_count: grid.count(Tile::Gem) as u32,
            grid,
            gem_target,
            seed: 0,
            player_start,
        }
    }
}

/// What a configured level asks the generator for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelSpec {
    pub name: String,
    pub seed: u64,
    pub rocks: u32,
    pub gems: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelSpecError {
    #[error("level \"{name}\": {requested} objects do not fit in {available} interior cells")]
    TooCrowded { name: String, requested: u32, available: u32 },
    #[error("level \"{name}\" has no gems, its exit could never open")]
    NoGems { name: String },
}

impl LevelSpec {
    pub fn new(name: &str, seed: u64, rocks: u32, gems: u32) -> Self {
        LevelSpec { name: name.to_string(), seed, rocks, gems }
    }

    /// Reject specs the generator could never finish or a player could
    /// never clear.
    pub fn validate(&self) -> Result<(), LevelSpecError> {
        if self.gems == 0 {
            return Err(LevelSpecError::NoGems { name: self.name.clone() });
        }
        let available = ((GRID_WIDTH - 2) * (GRID_HEIGHT - 2)) as u32;
        // player + exit also take interior cells
        let requested = self.rocks.saturating_add(self.gems).saturating_add(2);
        if requested > available {
            return Err(LevelSpecError::TooCrowded {
                name: self.name.clone(),
                requested,
                available,
            });
        }
        Ok(())
    }

    pub fn build(&self) -> Level {
        generate(&self.name, self.seed, self.rocks, self.gems)
    }
}

/// The built-in level sequence.
pub fn default_specs() -> Vec<LevelSpec> {
    vec![
        LevelSpec::new("Level 1", 42, 40, 20),
        LevelSpec::new("Level 2", 32, 45, 25),
        LevelSpec::new("Level 3", 12, 50, 30),
        LevelSpec::new("Level 4", 22, 55, 35),
        LevelSpec::new("Level 5", 52, 60, 40),
        LevelSpec::new("Level 6", 62, 65, 45),
    ]
}

// ══════════════════════════════════════════════════════════════
// Generation
// ══════════════════════════════════════════════════════════════

/// Generate a `GRID_WIDTH` x `GRID_HEIGHT` level.
pub fn generate(name: &str, seed: u64, rock_count: u32, gem_count: u32) -> Level {
    generate_sized(name, GRID_WIDTH, GRID_HEIGHT, seed, rock_count, gem_count)
}

/// Generate a level of arbitrary size (at least 4 x 4 so that player and
/// exit both land on interior cells).
pub fn generate_sized(
    name: &str,
    width: usize,
    height: usize,
    seed: u64,
    rock_count: u32,
    gem_count: u32,
) -> Level {
    let mut grid = Grid::new(width, height, Tile::Dirt);
    for y in 0..height {
        for x in 0..width {
            if grid.is_border(x, y) {
                grid.set(x, y, Tile::BrickWall);
            }
        }
    }

    grid.set(PLAYER_START.0, PLAYER_START.1, Tile::Player);
    grid.set(width - 2, height - 2, Tile::ClosedExit);

    let mut rng = StdRng::seed_from_u64(seed);
    place_random(&mut grid, &mut rng, Tile::Rock, rock_count);
    place_random(&mut grid, &mut rng, Tile::Gem, gem_count);

    debug!(name, seed, rock_count, gem_count, "generated level");

    Level {
        name: name.to_string(),
        grid,
        gem_target: gem_count,
        rock_count,
        gem_count,
        seed,
        player_start: PLAYER_START,
    }
}

fn place_random(grid: &mut Grid, rng: &mut StdRng, tile: Tile, count: u32) {
    let (w, h) = (grid.width(), grid.height());
    let mut placed = 0;
    while placed < count {
        let x = rng.gen_range(1..w - 1);
        let y = rng.gen_range(1..h - 1);
        if grid.get(x, y) == Tile::Dirt {
            grid.set(x, y, tile);
            placed += 1;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Transitions
// ══════════════════════════════════════════════════════════════

/// Load level `idx` into the working grid and reset all per-level state.
/// Out-of-range indices wrap.
pub fn load_level(world: &mut WorldState, idx: usize) {
    if world.levels.is_empty() {
        return;
    }
    let idx = idx % world.levels.len();
    let level = &world.levels[idx];

    world.current_level = idx;
    world.grid = level.grid.clone();
    world.player = Player::new(level.player_start.0, level.player_start.1);
    world.gems_collected = 0;
    world.frame = 0;
    world.tick = 0;

    info!(level = idx, name = %level.name, seed = level.seed, "level loaded");
}

/// Reload the current level's template.
pub fn reset_level(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let idx = world.current_level;
    load_level(world, idx);
    events.push(GameEvent::LevelReset { level: idx });
}

/// Move on to the next level, wrapping after the last.
pub fn advance_level(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let from = world.current_level;
    let to = if world.levels.is_empty() { 0 } else { (from + 1) % world.levels.len() };
    load_level(world, to);
    events.push(GameEvent::LevelAdvanced { from, to });
}
