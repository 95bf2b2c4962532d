//! Team identifiers and cell occupancy markers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two opposing affiliations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The red team.
    Red,
    /// The blue team.
    Blue,
}

impl Team {
    /// Both teams, red first.
    pub const ALL: [Team; 2] = [Team::Red, Team::Blue];

    /// The opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Get the display name for this team.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Blue => "Blue",
        }
    }

    /// Map glyph used by [`Arena::render`](crate::arena::Arena::render).
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Blue => 'B',
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What the grid reports for a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    /// Nothing here; a soldier may step in.
    #[default]
    Empty,
    /// A soldier of the given team stands here.
    Occupied(Team),
    /// Impassable terrain.
    Obstacle,
    /// The coordinate is past the edge of the grid.
    OutOfBounds,
}

impl CellState {
    /// True only for [`CellState::Empty`].
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The occupying team, if any.
    #[must_use]
    pub const fn team(self) -> Option<Team> {
        match self {
            Self::Occupied(team) => Some(team),
            _ => None,
        }
    }

    /// True when a soldier of `team` stands here.
    #[must_use]
    pub fn is_team(self, team: Team) -> bool {
        self == Self::Occupied(team)
    }

    /// Map glyph: `.` empty, `#` obstacle, team glyph otherwise.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Occupied(team) => team.glyph(),
            Self::Obstacle | Self::OutOfBounds => '#',
        }
    }
}
