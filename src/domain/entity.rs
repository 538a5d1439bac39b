/// The player and the directions it can face.
/// The grid holds the `Player` tile; this struct holds everything about the
/// player that a tile value cannot express.

/// Facing / movement direction. Declaration order matches the sprite sheet
/// columns for the player (Right=0, Down=1, Left=2, Up=3).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];

    /// Unit vector `(dx, dy)`; y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Neighbor of (x, y) in this direction, or `None` when it would leave
    /// the non-negative quadrant.
    pub fn step(self, x: usize, y: usize) -> Option<(usize, usize)> {
        let (dx, dy) = self.delta();
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if nx < 0 || ny < 0 {
            return None;
        }
        Some((nx as usize, ny as usize))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub facing: Direction,
    /// Set by a move that ends under a rock or gem. Suppresses the crush
    /// rule until the next move clears it.
    pub holds_falling_object: bool,
    /// False from the crush until the level reloads.
    pub alive: bool,
}

impl Player {
    pub fn new(x: usize, y: usize) -> Self {
        Player {
            x, y,
            facing: Direction::Down,
            holds_falling_object: false,
            alive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_left_right_are_horizontal() {
        let horizontal: Vec<Direction> = Direction::ALL.iter().copied().filter(|d| d.is_horizontal()).collect();
        assert_eq!(horizontal, vec![Direction::Right, Direction::Left]);
    }

    #[test]
    fn step_stops_at_origin() {
        assert_eq!(Direction::Left.step(0, 3), None);
        assert_eq!(Direction::Up.step(3, 0), None);
        assert_eq!(Direction::Right.step(0, 0), Some((1, 0)));
        assert_eq!(Direction::Down.step(2, 2), Some((2, 3)));
    }

    #[test]
    fn new_player_faces_down() {
        let p = Player::new(1, 1);
        assert_eq!(p.facing, Direction::Down);
        assert!(p.alive);
        assert!(!p.holds_falling_object);
    }
}
