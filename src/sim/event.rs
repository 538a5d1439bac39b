/// Events emitted during a move or a physics tick.
/// The presentation layer consumes these for sound; tests assert on them.

use crate::domain::entity::Direction;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    GemCollected { x: usize, y: usize, total: u32 },
    ExitOpened { exits: usize },
    RockPushed { from: (usize, usize), to: (usize, usize), dir: Direction },
    ObjectFell { from: (usize, usize), to: (usize, usize) },
    ObjectRolled { from: (usize, usize), to: (usize, usize) },
    PlayerCrushed { x: usize, y: usize },
    ExplosionAdvanced { x: usize, y: usize, stage: u8 },
    LevelReset { level: usize },
    LevelAdvanced { from: usize, to: usize },
}
