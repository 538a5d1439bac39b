/// Sprite sheet lookup.
///
/// The sheet is a grid of `SPRITE_COLS` x `SPRITE_ROWS` equally sized cells.
/// `sprite_index` is an exhaustive match so a new tile variant fails to
/// compile until it is given a sprite.

use super::entity::Direction;
use super::tile::Tile;

pub const SPRITE_COLS: usize = 6;
pub const SPRITE_ROWS: usize = 7;

const fn at(col: usize, row: usize) -> usize {
    col + row * SPRITE_COLS
}

/// Sheet index for a tile. `facing` only matters for `Tile::Player`.
pub fn sprite_index(tile: Tile, facing: Direction) -> usize {
    match tile {
        Tile::Empty => at(3, 6),
        Tile::Dirt => at(4, 2),
        Tile::BrickWall => at(4, 0),
        Tile::StoneWall => at(4, 1),
        Tile::Rock => at(5, 0),
        Tile::Gem => at(5, 3),
        Tile::ClosedExit => at(5, 1),
        Tile::OpenExit => at(5, 2),
        Tile::Player => match facing {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        },
        Tile::Enemy1 => at(0, 1),
        Tile::Enemy2 => at(0, 2),
        Tile::Enemy3 => at(0, 3),
        Tile::Explosion0 => at(0, 4),
        Tile::Explosion1 => at(1, 4),
        Tile::Explosion2 => at(2, 4),
        Tile::Explosion3 => at(3, 4),
        Tile::Explosion4 => at(4, 4),
        Tile::Explosion5 => at(5, 4),
    }
}

/// Top-left corner of sprite `index` on a sheet whose cells are
/// `cell_w` x `cell_h` units.
pub fn sprite_origin(index: usize, cell_w: usize, cell_h: usize) -> (usize, usize) {
    ((index % SPRITE_COLS) * cell_w, (index / SPRITE_COLS) * cell_h)
}
