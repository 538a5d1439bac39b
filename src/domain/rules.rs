/// Movement rules: truth-table driven.
///
/// Pure functions over the grid, no side effects. These decide "what
/// kind of move is this" without performing it; `sim::step` applies it.
///
/// ## Movement Truth Table
///
/// Evaluated against the target cell (player + direction), first match wins.
/// ┌──────────────────────────┬──────────────┬──────────────────────────┐
/// │ Target                   │ Result       │ Notes                    │
/// ├──────────────────────────┼──────────────┼──────────────────────────┤
/// │ BrickWall / StoneWall    │ Blocked      │                          │
/// │ ClosedExit               │ Blocked      │ gems still missing       │
/// │ OpenExit                 │ Exit         │ next level, no move      │
/// │ Rock, vertical move      │ Blocked      │ rocks push sideways only │
/// │ Rock, beyond not Empty   │ Blocked      │ player stays put         │
/// │ Rock, beyond Empty       │ Push         │ rock slides one cell     │
/// │ Gem                      │ Collect      │                          │
/// │ Dirt                     │ Dig          │                          │
/// │ anything else            │ Walk         │                          │
/// └──────────────────────────┴──────────────┴──────────────────────────┘
///
/// ## Support Check
///
/// After Dig, Collect or Push the player may end up directly under a rock
/// or gem. That sets the "holds falling object" flag. Walk into an Empty
/// cell never sets it.

use super::entity::Direction;
use super::grid::Grid;
use super::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveKind {
    Blocked,
    Exit,
    /// Rock at the target slides to `to`.
    Push { to: (usize, usize) },
    Collect,
    Dig,
    Walk,
}

impl MoveKind {
    /// Does this move run the support check on arrival?
    pub fn checks_support(self) -> bool {
        matches!(self, MoveKind::Push { .. } | MoveKind::Collect | MoveKind::Dig)
    }

    /// Does the player leave its cell?
    pub fn moves_player(self) -> bool {
        !matches!(self, MoveKind::Blocked | MoveKind::Exit)
    }
}

/// Classify a move of the player at (x, y) in `dir`.
pub fn classify_move(grid: &Grid, x: usize, y: usize, dir: Direction) -> MoveKind {
    let (tx, ty) = match dir.step(x, y) {
        Some(p) => p,
        None => return MoveKind::Blocked,
    };

    match grid.get(tx, ty) {
        t if t.is_wall() => MoveKind::Blocked,
        Tile::ClosedExit => MoveKind::Blocked,
        Tile::OpenExit => MoveKind::Exit,
        Tile::Rock => {
            if !dir.is_horizontal() {
                return MoveKind::Blocked;
            }
            match dir.step(tx, ty) {
                Some((px, py)) if grid.get(px, py) == Tile::Empty => MoveKind::Push { to: (px, py) },
                _ => MoveKind::Blocked,
            }
        }
        Tile::Gem => MoveKind::Collect,
        Tile::Dirt => MoveKind::Dig,
        _ => MoveKind::Walk,
    }
}

/// Is there a rock or gem directly above (x, y)?
pub fn under_falling_object(grid: &Grid, x: usize, y: usize) -> bool {
    y > 0 && grid.get(x, y - 1).is_falling_object()
}

/// Exits open once the collected count reaches the target.
pub fn exit_unlocked(gems_collected: u32, gem_target: u32) -> bool {
    gems_collected >= gem_target
}

#[cfg(test)]
mod tests {
    use super::*;

    // Player always at (1, 1) in these layouts.

    #[test]
    fn walls_block() {
        let g = Grid::from_rows(&[
            "#####",
            "#P=.#",
            "#####",
        ]);
        assert_eq!(classify_move(&g, 1, 1, Direction::Right), MoveKind::Blocked);
        assert_eq!(classify_move(&g, 1, 1, Direction::Up), MoveKind::Blocked);
        assert_eq!(classify_move(&g, 1, 1, Direction::Left), MoveKind::Blocked);
    }

    #[test]
    fn closed_exit_blocks_open_exit_leaves() {
        let g = Grid::from_rows(&[
            "####",
            "#PE#",
            "#X.#",
            "####",
        ]);
        assert_eq!(classify_move(&g, 1, 1, Direction::Right), MoveKind::Blocked);
        assert_eq!(classify_move(&g, 1, 1, Direction::Down), MoveKind::Exit);
    }

    #[test]
    fn rock_push_needs_empty_beyond() {
        let g = Grid::from_rows(&[
            "######",
            "#Po  #",
            "#Po. #",
            "######",
        ]);
        assert_eq!(classify_move(&g, 1, 1, Direction::Right), MoveKind::Push { to: (3, 1) });
        assert_eq!(classify_move(&g, 1, 2, Direction::Right), MoveKind::Blocked);
    }

    #[test]
    fn rock_cannot_be_pushed_vertically() {
        let g = Grid::from_rows(&[
            "###",
            "#P#",
            "#o#",
            "# #",
            "###",
        ]);
        assert_eq!(classify_move(&g, 1, 1, Direction::Down), MoveKind::Blocked);
    }

    #[test]
    fn gem_dirt_empty() {
        let g = Grid::from_rows(&[
            "#####",
            "#P*##",
            "#. ##",
            "#####",
        ]);
        assert_eq!(classify_move(&g, 1, 1, Direction::Right), MoveKind::Collect);
        assert_eq!(classify_move(&g, 1, 1, Direction::Down), MoveKind::Dig);
        assert_eq!(classify_move(&g, 1, 2, Direction::Right), MoveKind::Walk);
    }

    #[test]
    fn support_check_skips_plain_walk() {
        assert!(MoveKind::Dig.checks_support());
        assert!(MoveKind::Collect.checks_support());
        assert!(MoveKind::Push { to: (0, 0) }.checks_support());
        assert!(!MoveKind::Walk.checks_support());
        assert!(!MoveKind::Blocked.moves_player());
        assert!(!MoveKind::Exit.moves_player());
    }

    #[test]
    fn under_rock_or_gem() {
        let g = Grid::from_rows(&[
            "o* .",
            "....",
        ]);
        assert!(under_falling_object(&g, 0, 1));
        assert!(under_falling_object(&g, 1, 1));
        assert!(!under_falling_object(&g, 2, 1));
        assert!(!under_falling_object(&g, 0, 0));
    }

    #[test]
    fn exit_unlocks_at_target() {
        assert!(!exit_unlocked(19, 20));
        assert!(exit_unlocked(20, 20));
        assert!(exit_unlocked(21, 20));
    }
}
