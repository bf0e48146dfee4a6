use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::*;

/// Grid extent and permitted mine/treasure ranges of a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub x_size: Coord,
    pub y_size: Coord,
    pub min_mines: CellCount,
    pub max_mines: CellCount,
    pub min_treasures: CellCount,
    pub max_treasures: CellCount,
}

impl DifficultyProfile {
    pub const BEGINNER: Self = Self::new_unchecked((8, 8), (6, 10), (2, 5));
    pub const INTERMEDIATE: Self = Self::new_unchecked((16, 16), (11, 40), (2, 4));
    pub const EXPERT: Self = Self::new_unchecked((30, 16), (41, 99), (2, 3));

    pub const PRESETS: [Self; 3] = [Self::BEGINNER, Self::INTERMEDIATE, Self::EXPERT];

    pub const fn new_unchecked(
        (x_size, y_size): Coord2,
        (min_mines, max_mines): (CellCount, CellCount),
        (min_treasures, max_treasures): (CellCount, CellCount),
    ) -> Self {
        Self {
            x_size,
            y_size,
            min_mines,
            max_mines,
            min_treasures,
            max_treasures,
        }
    }

    pub fn new(
        size: Coord2,
        mines: (CellCount, CellCount),
        treasures: (CellCount, CellCount),
    ) -> Result<Self> {
        let profile = Self::new_unchecked(size, mines, treasures);
        profile.validate()?;
        Ok(profile)
    }

    /// Checks the profile invariants.
    ///
    /// Besides positive dimensions, ordered ranges and mines outnumbering treasures, both maxima
    /// must fit on the board together. That last bound is stricter than the per-range checks
    /// alone: mines are only drawn on cells no treasure took.
    pub fn validate(&self) -> Result<()> {
        if self.x_size == 0 || self.y_size == 0 {
            return Err(GameError::InvalidArgument("board dimensions must be positive"));
        }
        if self.min_mines > self.max_mines {
            return Err(GameError::InvalidArgument("min_mines exceeds max_mines"));
        }
        if self.min_treasures > self.max_treasures {
            return Err(GameError::InvalidArgument("min_treasures exceeds max_treasures"));
        }
        if self.min_treasures >= self.min_mines || self.max_treasures >= self.max_mines {
            return Err(GameError::InvalidArgument("treasures must be outnumbered by mines"));
        }
        if u32::from(self.max_mines) + u32::from(self.max_treasures)
            > u32::from(self.total_cells())
        {
            return Err(GameError::InvalidArgument("mines and treasures do not fit on the board"));
        }
        Ok(())
    }

    pub const fn size(&self) -> Coord2 {
        (self.x_size, self.y_size)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.x_size, self.y_size)
    }

    pub const fn mines_in_range(&self, mines: CellCount) -> bool {
        self.min_mines <= mines && mines <= self.max_mines
    }

    pub const fn treasures_in_range(&self, treasures: CellCount) -> bool {
        self.min_treasures <= treasures && treasures <= self.max_treasures
    }

    /// Number of mines that must form the structural pattern checked by the placement validator.
    pub const fn structural_subset_size(&self) -> CellCount {
        self.min_mines
    }

    /// First preset with exactly this size whose ranges admit the given counts.
    pub fn matching_preset(size: Coord2, mines: CellCount, treasures: CellCount) -> Option<Self> {
        Self::PRESETS.into_iter().find(|preset| {
            preset.size() == size
                && preset.mines_in_range(mines)
                && preset.treasures_in_range(treasures)
        })
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::BEGINNER
    }
}

/// Named presets, as selected by a player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Beginner => DifficultyProfile::BEGINNER,
            Self::Intermediate => DifficultyProfile::INTERMEDIATE,
            Self::Expert => DifficultyProfile::EXPERT,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
        }
    }
}

impl From<Difficulty> for DifficultyProfile {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.profile()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::InvalidArgument("unknown difficulty name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for preset in DifficultyProfile::PRESETS {
            assert_eq!(preset.validate(), Ok(()));
        }
    }

    #[test]
    fn rejects_treasures_not_outnumbered() {
        let err = DifficultyProfile::new((8, 8), (3, 10), (3, 5)).unwrap_err();

        assert!(matches!(err, GameError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_empty_board() {
        let err = DifficultyProfile::new((0, 8), (3, 10), (1, 2)).unwrap_err();

        assert!(matches!(err, GameError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_inverted_ranges() {
        assert!(DifficultyProfile::new((8, 8), (10, 6), (2, 5)).is_err());
        assert!(DifficultyProfile::new((8, 8), (6, 10), (5, 2)).is_err());
    }

    #[test]
    fn rejects_overfull_board() {
        assert!(DifficultyProfile::new((3, 3), (2, 8), (1, 2)).is_err());
        assert!(DifficultyProfile::new((3, 3), (2, 7), (1, 2)).is_ok());
    }

    #[test]
    fn matching_preset_requires_exact_size_and_ranges() {
        assert_eq!(
            DifficultyProfile::matching_preset((8, 8), 10, 2),
            Some(DifficultyProfile::BEGINNER)
        );
        assert_eq!(
            DifficultyProfile::matching_preset((16, 30), 50, 2),
            None
        );
        assert_eq!(DifficultyProfile::matching_preset((8, 8), 11, 2), None);
        assert_eq!(DifficultyProfile::matching_preset((30, 16), 60, 4), None);
    }

    #[test]
    fn difficulty_names_parse() {
        assert_eq!("Expert".parse::<Difficulty>(), Ok(Difficulty::Expert));
        assert_eq!(" beginner ".parse::<Difficulty>(), Ok(Difficulty::Beginner));
        assert!("nightmare".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Intermediate.to_string(), "intermediate");
    }
}
