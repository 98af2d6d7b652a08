use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

/// Sheet row to sample and whether to flip it horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRow {
    pub row: u32,
    pub mirror: bool,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::Front, Facing::Back, Facing::Left, Facing::Right];

    /// Horizontal movement wins over vertical. Zero input keeps the current facing.
    pub fn from_direction(direction: Vec2) -> Option<Facing> {
        if direction.x < 0.0 {
            Some(Facing::Left)
        } else if direction.x > 0.0 {
            Some(Facing::Right)
        } else if direction.y < 0.0 {
            Some(Facing::Back)
        } else if direction.y > 0.0 {
            Some(Facing::Front)
        } else {
            None
        }
    }

    /// The sheets only have a front row and a side row; right reuses the side row flipped
    /// and back reuses it unflipped.
    pub const fn sprite_row(self) -> SpriteRow {
        match self {
            Facing::Front => SpriteRow {
                row: 0,
                mirror: false,
            },
            Facing::Left | Facing::Back => SpriteRow {
                row: 1,
                mirror: false,
            },
            Facing::Right => SpriteRow {
                row: 1,
                mirror: true,
            },
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Facing::Front => 0,
            Facing::Back => 1,
            Facing::Left => 2,
            Facing::Right => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_axis_wins() {
        assert_eq!(Facing::from_direction(Vec2::new(-1.0, 1.0)), Some(Facing::Left));
        assert_eq!(Facing::from_direction(Vec2::new(1.0, -1.0)), Some(Facing::Right));
        assert_eq!(Facing::from_direction(Vec2::new(0.0, -1.0)), Some(Facing::Back));
        assert_eq!(Facing::from_direction(Vec2::new(0.0, 1.0)), Some(Facing::Front));
        assert_eq!(Facing::from_direction(Vec2::ZERO), None);
    }

    #[test]
    fn only_right_is_mirrored() {
        for facing in Facing::ALL {
            assert_eq!(facing.sprite_row().mirror, facing == Facing::Right);
        }
        assert_eq!(Facing::Back.sprite_row().row, Facing::Left.sprite_row().row);
    }
}
