/// Falling-object physics: per-cell rule decisions.
///
/// ## Architecture
///
/// This module only DECIDES. `sim::step::physics_tick` owns the sweep
/// and applies each decision before moving to the next cell, so every
/// decision sees the effects of the cells already visited this tick.
///
/// ## Sweep order
///
/// Rows from `height - 2` up to 1, columns 1 to `width - 2` left to right.
/// Border cells are never visited. Bottom-up guarantees an object moved
/// into a lower row is not visited again in the same tick.
///
/// ## Rule priority (first match wins)
///
///   1. Explosion 0..4  → advance one frame
///      Explosion 5     → reset the level, abort the sweep
///   2. not Rock/Gem    → nothing
///   3. below Empty                                   → fall
///   4. below Rock/Gem, right Empty, below-right Empty → roll right
///   5. below Rock/Gem, left Empty, below-left Empty   → roll left
///   6. below Player, player not holding               → crush
///      below Player, player holding                   → stays put
///
/// Right before left is a fixed tie-break. Changing the order changes
/// gameplay.

use super::grid::Grid;
use super::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellAction {
    /// Nothing happens at this cell.
    Idle,
    /// Explosion frame advances to the given tile.
    Advance(Tile),
    /// The final explosion frame has played out.
    ResetLevel,
    /// Object drops straight down to `to`.
    Fall { to: (usize, usize) },
    /// Object rolls diagonally down to `to`.
    Roll { to: (usize, usize) },
    /// Object lands on an unprotected player at `player`.
    Crush { player: (usize, usize) },
    /// Object rests on a player who is holding it up.
    Held,
}

/// Decide what happens at (x, y) this tick.
///
/// `player_holds` is the player's "holds falling object" flag as it stands
/// when the cell is visited; it is not re-derived from the object above.
pub fn decide(grid: &Grid, x: usize, y: usize, player_holds: bool) -> CellAction {
    let tile = grid.get(x, y);

    if tile.explosion_stage().is_some() {
        return match tile.next_explosion() {
            Some(next) => CellAction::Advance(next),
            None => CellAction::ResetLevel,
        };
    }

    if !tile.is_falling_object() {
        return CellAction::Idle;
    }

    let below = grid.get(x, y + 1);

    if below == Tile::Empty {
        return CellAction::Fall { to: (x, y + 1) };
    }

    if below.is_falling_object() {
        if grid.get(x + 1, y) == Tile::Empty && grid.get(x + 1, y + 1) == Tile::Empty {
            return CellAction::Roll { to: (x + 1, y + 1) };
        }
        if x > 0 && grid.get(x - 1, y) == Tile::Empty && grid.get(x - 1, y + 1) == Tile::Empty {
            return CellAction::Roll { to: (x - 1, y + 1) };
        }
    }

    if below == Tile::Player {
        if player_holds {
            return CellAction::Held;
        }
        return CellAction::Crush { player: (x, y + 1) };
    }

    CellAction::Idle
}

/// Interior cells in sweep order.
pub fn sweep_order(width: usize, height: usize) -> impl Iterator<Item = (usize, usize)> {
    let rows = if height >= 2 { 1..height - 1 } else { 1..1 };
    let cols = if width >= 2 { 1..width - 1 } else { 1..1 };
    rows.rev().flat_map(move |y| cols.clone().map(move |x| (x, y)))
}

/// True when a tick would change nothing: no explosion anywhere in the
/// interior and no rock/gem that can fall or roll.
pub fn is_settled(grid: &Grid, player_holds: bool) -> bool {
    sweep_order(grid.width(), grid.height()).all(|(x, y)| {
        matches!(decide(grid, x, y, player_holds), CellAction::Idle | CellAction::Held)
    })
}
