/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here. Behavior (falling, pushing,
/// collecting) lives in the resolvers.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Dirt,
    BrickWall,
    StoneWall,
    Rock,
    Gem,
    ClosedExit,
    OpenExit,
    Player,
    Enemy1,
    Enemy2,
    Enemy3,
    Explosion0,
    Explosion1,
    Explosion2,
    Explosion3,
    Explosion4,
    Explosion5, // terminal frame, triggers a level reset
}

impl Tile {
    /// Every variant, in declaration order.
    pub const ALL: [Tile; 18] = [
        Tile::Empty,
        Tile::Dirt,
        Tile::BrickWall,
        Tile::StoneWall,
        Tile::Rock,
        Tile::Gem,
        Tile::ClosedExit,
        Tile::OpenExit,
        Tile::Player,
        Tile::Enemy1,
        Tile::Enemy2,
        Tile::Enemy3,
        Tile::Explosion0,
        Tile::Explosion1,
        Tile::Explosion2,
        Tile::Explosion3,
        Tile::Explosion4,
        Tile::Explosion5,
    ];

    /// Brick or stone: never entered, never moved.
    pub fn is_wall(self) -> bool {
        matches!(self, Tile::BrickWall | Tile::StoneWall)
    }

    /// Subject to gravity and rolling.
    pub fn is_falling_object(self) -> bool {
        matches!(self, Tile::Rock | Tile::Gem)
    }

    /// Animation frame 0..=5 if this is an explosion tile.
    pub fn explosion_stage(self) -> Option<u8> {
        match self {
            Tile::Explosion0 => Some(0),
            Tile::Explosion1 => Some(1),
            Tile::Explosion2 => Some(2),
            Tile::Explosion3 => Some(3),
            Tile::Explosion4 => Some(4),
            Tile::Explosion5 => Some(5),
            _ => None,
        }
    }

    /// The following animation frame. `None` for Explosion5 and non-explosions.
    pub fn next_explosion(self) -> Option<Tile> {
        match self {
            Tile::Explosion0 => Some(Tile::Explosion1),
            Tile::Explosion1 => Some(Tile::Explosion2),
            Tile::Explosion2 => Some(Tile::Explosion3),
            Tile::Explosion3 => Some(Tile::Explosion4),
            Tile::Explosion4 => Some(Tile::Explosion5),
            _ => None,
        }
    }
}
