/// Input boundary: the core only asks "was this direction just pressed?".
/// Held keys do not repeat; each press is one move.

use crate::domain::entity::Direction;

pub trait DirectionalInput {
    /// Edge-triggered: true only on the frame the direction was pressed.
    fn was_pressed(&self, dir: Direction) -> bool;
}

/// Order in which simultaneous presses are resolved.
const PRIORITY: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

/// The single direction this frame acts on, if any.
pub fn read_direction(input: &impl DirectionalInput) -> Option<Direction> {
    PRIORITY.into_iter().find(|&d| input.was_pressed(d))
}

/// Several sources read as one: a direction counts if any source saw it.
impl<A: DirectionalInput, B: DirectionalInput> DirectionalInput for (A, B) {
    fn was_pressed(&self, dir: Direction) -> bool {
        self.0.was_pressed(dir) || self.1.was_pressed(dir)
    }
}

impl<T: DirectionalInput + ?Sized> DirectionalInput for &T {
    fn was_pressed(&self, dir: Direction) -> bool {
        (**self).was_pressed(dir)
    }
}

impl DirectionalInput for Option<Direction> {
    fn was_pressed(&self, dir: Direction) -> bool {
        *self == Some(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pressed(Vec<Direction>);

    impl DirectionalInput for Pressed {
        fn was_pressed(&self, dir: Direction) -> bool {
            self.0.contains(&dir)
        }
    }

    #[test]
    fn nothing_pressed() {
        assert_eq!(read_direction(&Pressed(vec![])), None);
    }

    #[test]
    fn left_wins_over_everything() {
        let all = Pressed(vec![Direction::Down, Direction::Up, Direction::Right, Direction::Left]);
        assert_eq!(read_direction(&all), Some(Direction::Left));
    }

    #[test]
    fn up_beats_down() {
        assert_eq!(read_direction(&Pressed(vec![Direction::Down, Direction::Up])), Some(Direction::Up));
    }

    #[test]
    fn pair_merges_sources() {
        let pair = (Pressed(vec![]), Some(Direction::Down));
        assert_eq!(read_direction(&pair), Some(Direction::Down));
    }
}
