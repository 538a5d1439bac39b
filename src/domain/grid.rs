/// The tile grid: a rectangular array of `Tile`.
///
/// Coordinates are `(x, y)` with `x` the column and `y` the row, origin at
/// the top-left. Storage is row-major (`rows[y][x]`).
///
/// Reads outside the grid return `Tile::BrickWall` and writes outside the
/// grid are ignored, so neighbor queries at the border behave like a wall.

use super::tile::Tile;

/// Width of generated levels.
pub const GRID_WIDTH: usize = 25;
/// Height of generated levels.
pub const GRID_HEIGHT: usize = 20;
/// Where the player spawns on generated levels.
pub const PLAYER_START: (usize, usize) = (1, 1);

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: Vec<Vec<Tile>>,
}

impl Grid {
    /// A `width` x `height` grid filled with `fill`.
    pub fn new(width: usize, height: usize, fill: Tile) -> Self {
        Grid {
            width,
            height,
            rows: vec![vec![fill; width]; height],
        }
    }

    /// Build a grid from text rows. Rows shorter than the widest row are
    /// padded with `Empty`.
    ///
    /// Legend:
    ///   '#' = BrickWall     '=' = StoneWall    '.' = Dirt
    ///   'o' = Rock          '*' = Gem          'P' = Player
    ///   'E' = ClosedExit    'X' = OpenExit     '1'..'3' = Enemy1..3
    ///   'a'..'f' = Explosion0..5               anything else = Empty
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Grid::new(width, height, Tile::Empty);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                grid.rows[y][x] = tile_from_char(ch);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Is (x, y) on the outer ring?
    #[inline]
    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Tile {
        if self.in_bounds(x, y) {
            self.rows[y][x]
        } else {
            Tile::BrickWall
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if self.in_bounds(x, y) {
            self.rows[y][x] = tile;
        }
    }

    /// Number of cells holding `tile`.
    pub fn count(&self, tile: Tile) -> usize {
        self.rows.iter().flatten().filter(|&&t| t == tile).count()
    }

    /// First cell (row-major) holding `tile`.
    pub fn find(&self, tile: Tile) -> Option<(usize, usize)> {
        self.cells().find(|&(_, _, t)| t == tile).map(|(x, y, _)| (x, y))
    }

    /// Overwrite every `from` cell with `to`. Returns how many changed.
    pub fn replace_all(&mut self, from: Tile, to: Tile) -> usize {
        let mut changed = 0;
        for t in self.rows.iter_mut().flatten() {
            if *t == from {
                *t = to;
                changed += 1;
            }
        }
        changed
    }

    /// All cells as `(x, y, tile)`, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, &t)| (x, y, t))
        })
    }
}

fn tile_from_char(ch: char) -> Tile {
    match ch {
        '#' => Tile::BrickWall,
        '=' => Tile::StoneWall,
        '.' => Tile::Dirt,
        'o' => Tile::Rock,
        '*' => Tile::Gem,
        'P' => Tile::Player,
        'E' => Tile::ClosedExit,
        'X' => Tile::OpenExit,
        '1' => Tile::Enemy1,
        '2' => Tile::Enemy2,
        '3' => Tile::Enemy3,
        'a' => Tile::Explosion0,
        'b' => Tile::Explosion1,
        'c' => Tile::Explosion2,
        'd' => Tile::Explosion3,
        'e' => Tile::Explosion4,
        'f' => Tile::Explosion5,
        _ => Tile::Empty,
    }
}
