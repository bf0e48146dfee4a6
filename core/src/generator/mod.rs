use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

/// Source of the random decisions a board makes.
pub trait LayoutGenerator {
    fn generate(&mut self, profile: &DifficultyProfile) -> Result<ItemLayout>;

    /// Where a mine goes when the first click lands on it, `None` when `candidates` is empty.
    fn pick(&mut self, candidates: &[Coord2]) -> Option<Coord2>;
}

/// How many marks a distribution places beyond its minimum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillPolicy {
    /// Any count in `[min, max]`, chosen uniformly.
    Uniform,
    /// Always fill up to `max`.
    Max,
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self::Uniform
    }
}

/// Independent treasure and mine masks for one board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemLayout {
    pub treasures: Array2<bool>,
    pub mines: Array2<bool>,
}

impl ItemLayout {
    /// Content grid, a cell marked in both masks holds the treasure.
    pub fn resolve(&self) -> Array2<CellContent> {
        let mut overlaps: CellCount = 0;
        let contents = Array2::from_shape_fn(self.treasures.raw_dim(), |index| {
            match (self.treasures[index], self.mines[index]) {
                (true, mine) => {
                    if mine {
                        overlaps += 1;
                    }
                    CellContent::Treasure
                }
                (false, true) => CellContent::Mine,
                (false, false) => CellContent::Empty,
            }
        });
        if overlaps > 0 {
            log::warn!("{} mines overlapped a treasure and were dropped", overlaps);
        }
        contents
    }
}

/// Marks between `min_count` and `max_count` distinct positions of a `size` grid.
pub fn distribute<R: Rng + ?Sized>(
    rng: &mut R,
    size: Coord2,
    min_count: CellCount,
    max_count: CellCount,
    fill: FillPolicy,
) -> Result<Array2<bool>> {
    let blocked = Array2::from_elem(size.to_nd_index(), false);
    distribute_within(rng, &blocked, min_count, max_count, fill)
}

/// Like [`distribute`], but never marks a position already set in `blocked`.
pub fn distribute_within<R: Rng + ?Sized>(
    rng: &mut R,
    blocked: &Array2<bool>,
    min_count: CellCount,
    max_count: CellCount,
    fill: FillPolicy,
) -> Result<Array2<bool>> {
    if min_count > max_count {
        return Err(GameError::InvalidArgument("min_count exceeds max_count"));
    }

    let free: Vec<Coord2> = iter_coords(shape_of(blocked))
        .filter(|&coords| !blocked[coords.to_nd_index()])
        .collect();
    if usize::from(max_count) > free.len() {
        return Err(GameError::InvalidArgument("max_count exceeds the available cells"));
    }

    let target = match fill {
        FillPolicy::Uniform => rng.random_range(min_count..=max_count),
        FillPolicy::Max => max_count,
    };

    // the first `min_count` picks are the unconditional ones, the rest top up to `target`
    let mut mask = Array2::from_elem(blocked.raw_dim(), false);
    for pick in rand::seq::index::sample(rng, free.len(), target.into()) {
        mask[free[pick].to_nd_index()] = true;
    }
    Ok(mask)
}

pub fn count_marks(mask: &Array2<bool>) -> CellCount {
    mask.iter()
        .filter(|&&marked| marked)
        .count()
        .try_into()
        .unwrap_or(CellCount::MAX)
}
