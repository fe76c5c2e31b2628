use serde::{Deserialize, Serialize};

/// One of the two sides of a game.
///
/// `X` always moves first and is encoded as `+1`, `O` is encoded as `-1`.
/// During search `X` is the maximizing side and `O` the minimizing side.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub enum Player {
    #[default]
    #[display("X")]
    X,
    #[display("O")]
    O,
}

impl Player {
    /// Returns the numeric encoding of this player (`+1` or `-1`).
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Player::X => 1,
            Player::O => -1,
        }
    }

    #[must_use]
    pub const fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            1 => Some(Player::X),
            -1 => Some(Player::O),
            _ => None,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}
