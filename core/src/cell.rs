use serde::{Deserialize, Serialize};

use crate::*;

/// What a cell holds, fixed at placement time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellContent {
    Empty,
    Mine,
    /// Revealing a treasure wins the game on the spot.
    Treasure,
}

impl CellContent {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    pub const fn is_treasure(self) -> bool {
        matches!(self, Self::Treasure)
    }
}

impl Default for CellContent {
    fn default() -> Self {
        Self::Empty
    }
}

/// One grid position together with its player-visible state.
///
/// Neighbor counts are only meaningful after the owning board has run its neighbor pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    coords: Coord2,
    content: CellContent,
    checked: bool,
    flagged: bool,
    nearby_mines: u8,
    nearby_treasures: u8,
}

impl Cell {
    pub const fn new(coords: Coord2, content: CellContent) -> Self {
        Self {
            coords,
            content,
            checked: false,
            flagged: false,
            nearby_mines: 0,
            nearby_treasures: 0,
        }
    }

    pub const fn coords(&self) -> Coord2 {
        self.coords
    }

    pub const fn x(&self) -> Coord {
        self.coords.0
    }

    pub const fn y(&self) -> Coord {
        self.coords.1
    }

    pub const fn content(&self) -> CellContent {
        self.content
    }

    pub const fn is_checked(&self) -> bool {
        self.checked
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub const fn nearby_mines(&self) -> u8 {
        self.nearby_mines
    }

    pub const fn nearby_treasures(&self) -> u8 {
        self.nearby_treasures
    }

    /// A revealed cell with no mine or treasure around it, the seed of a flood fill.
    pub const fn is_blank(&self) -> bool {
        self.nearby_mines == 0 && self.nearby_treasures == 0
    }

    pub fn set_checked(&mut self, checked: bool) -> Result<()> {
        if checked && self.flagged {
            return Err(GameError::InvalidStateTransition("check a flagged cell"));
        }
        self.checked = checked;
        Ok(())
    }

    pub fn set_flagged(&mut self, flagged: bool) -> Result<()> {
        if flagged && self.checked {
            return Err(GameError::InvalidStateTransition("flag a checked cell"));
        }
        self.flagged = flagged;
        Ok(())
    }

    pub fn set_nearby_counts(&mut self, mines: u8, treasures: u8) {
        self.nearby_mines = mines;
        self.nearby_treasures = treasures;
    }

    /// Used by mine relocation, counts must be recomputed afterwards.
    pub(crate) fn set_content(&mut self, content: CellContent) {
        self.content = content;
    }

    /// Game-over reveal, drops any flag so the cell can be shown.
    pub(crate) fn force_reveal(&mut self) {
        self.flagged = false;
        self.checked = true;
    }
}
