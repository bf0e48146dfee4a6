use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Why a board fails the structural placement puzzle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementViolation {
    DimensionMismatch {
        expected: Coord2,
        found: (usize, usize),
    },
    MineCountOutOfRange {
        found: CellCount,
        min: CellCount,
        max: CellCount,
    },
    TreasureCountOutOfRange {
        found: CellCount,
        min: CellCount,
        max: CellCount,
    },
    NoStructuralSubset {
        subset_size: CellCount,
    },
}

/// Whether the mines of `board` satisfy the placement puzzle of its difficulty.
pub fn validate<G: LayoutGenerator>(board: &Board<G>) -> bool {
    match check_placement(board) {
        Ok(()) => true,
        Err(violation) => {
            log::debug!("Board rejected: {:?}", violation);
            false
        }
    }
}

/// Checks the board from its cells alone, ignoring cached counters.
///
/// Some `k`-subset of the mines (`k` being the profile's structural subset size) has to:
/// - occupy distinct rows and distinct columns,
/// - contain no two orthogonally adjacent mines,
/// - have a member on the main diagonal,
/// - have the first remaining mine, in row-major order, orthogonally adjacent to a member,
/// - and when exactly two mines remain, keep the second one away from the first and from every member.
pub fn check_placement<G: LayoutGenerator>(
    board: &Board<G>,
) -> core::result::Result<(), PlacementViolation> {
    let profile = board.profile();
    let tiles = board.tiles();
    let expected = profile.size();
    if tiles.dim() != (usize::from(expected.0), usize::from(expected.1)) {
        return Err(PlacementViolation::DimensionMismatch {
            expected,
            found: tiles.dim(),
        });
    }

    let mines: Vec<Coord2> = tiles
        .indexed_iter()
        .filter(|(_, cell)| cell.content().is_mine())
        .map(|((x, y), _)| (x as Coord, y as Coord))
        .collect();
    let mine_count = mines.len().try_into().unwrap_or(CellCount::MAX);
    let treasure_count = tiles
        .iter()
        .filter(|cell| cell.content().is_treasure())
        .count()
        .try_into()
        .unwrap_or(CellCount::MAX);

    if !profile.mines_in_range(mine_count) {
        return Err(PlacementViolation::MineCountOutOfRange {
            found: mine_count,
            min: profile.min_mines,
            max: profile.max_mines,
        });
    }
    if !profile.treasures_in_range(treasure_count) {
        return Err(PlacementViolation::TreasureCountOutOfRange {
            found: treasure_count,
            min: profile.min_treasures,
            max: profile.max_treasures,
        });
    }

    let subset_size = profile.structural_subset_size();
    if PlacementSearch::new(&mines, expected, subset_size.into()).run() {
        Ok(())
    } else {
        Err(PlacementViolation::NoStructuralSubset { subset_size })
    }
}

/// Depth-first search over subsets of `mines`, taken in row-major order.
///
/// Since members need distinct rows and candidates are sorted by row, a subset picks at most one
/// mine per row, in increasing row order.
struct PlacementSearch<'a> {
    mines: &'a [Coord2],
    subset_size: usize,
    chosen: SmallVec<[usize; 16]>,
    cols_used: Vec<bool>,
    diagonal_members: usize,
    /// Distinct mine rows strictly below each row.
    rows_after: Vec<usize>,
    /// Whether any mine from this index on lies on the diagonal.
    diagonal_from: Vec<bool>,
}

impl<'a> PlacementSearch<'a> {
    fn new(mines: &'a [Coord2], (size_x, size_y): Coord2, subset_size: usize) -> Self {
        let mut rows_after = vec![0; usize::from(size_x)];
        let mut seen_rows = 0;
        let mut last_row = None;
        for &(row, _) in mines.iter().rev() {
            if last_row != Some(row) {
                // everything after `row` was counted before this row showed up
                let end = last_row.map_or(usize::from(size_x), usize::from);
                for slot in &mut rows_after[usize::from(row)..end] {
                    *slot = seen_rows;
                }
                seen_rows += 1;
                last_row = Some(row);
            }
        }
        if let Some(row) = last_row {
            for slot in &mut rows_after[..usize::from(row)] {
                *slot = seen_rows;
            }
        }

        let mut diagonal_from = vec![false; mines.len() + 1];
        for index in (0..mines.len()).rev() {
            let (row, col) = mines[index];
            diagonal_from[index] = row == col || diagonal_from[index + 1];
        }

        Self {
            mines,
            subset_size,
            chosen: SmallVec::new(),
            cols_used: vec![false; usize::from(size_y)],
            diagonal_members: 0,
            rows_after,
            diagonal_from,
        }
    }

    fn run(&mut self) -> bool {
        if self.subset_size == 0
            || self.subset_size > self.mines.len()
            || self.subset_size > self.cols_used.len()
            || self.subset_size > self.rows_after.len()
        {
            return false;
        }
        self.search(0, None)
    }

    fn search(&mut self, next: usize, last_row: Option<Coord>) -> bool {
        if self.chosen.len() == self.subset_size {
            return self.diagonal_members > 0 && self.extras_attach();
        }
        if self.diagonal_members == 0 && !self.diagonal_from[next] {
            return false;
        }

        let needed = self.subset_size - self.chosen.len();
        for index in next..self.mines.len() {
            let (row, col) = self.mines[index];
            if last_row == Some(row) {
                continue;
            }
            if self.rows_after[usize::from(row)] + 1 < needed {
                break;
            }
            if self.cols_used[usize::from(col)] {
                continue;
            }
            if self
                .chosen
                .iter()
                .any(|&member| is_orthogonally_adjacent(self.mines[member], (row, col)))
            {
                continue;
            }

            self.push(index);
            if self.search(index + 1, Some(row)) {
                return true;
            }
            self.pop();
        }
        false
    }

    fn push(&mut self, index: usize) {
        let (row, col) = self.mines[index];
        self.chosen.push(index);
        self.cols_used[usize::from(col)] = true;
        if row == col {
            self.diagonal_members += 1;
        }
    }

    fn pop(&mut self) {
        if let Some(index) = self.chosen.pop() {
            let (row, col) = self.mines[index];
            self.cols_used[usize::from(col)] = false;
            if row == col {
                self.diagonal_members -= 1;
            }
        }
    }

    fn extras_attach(&self) -> bool {
        // `chosen` is ascending, so extras are the gaps in it
        let mut extras = (0..self.mines.len())
            .filter(|index| self.chosen.binary_search(index).is_err())
            .map(|index| self.mines[index]);
        let Some(first) = extras.next() else {
            return true;
        };

        let mut members = self.chosen.iter().map(|&index| self.mines[index]);
        if !members.any(|member| is_orthogonally_adjacent(member, first)) {
            return false;
        }

        if self.mines.len() - self.subset_size == 2 {
            if let Some(second) = extras.next() {
                let touches_member = self
                    .chosen
                    .iter()
                    .any(|&index| is_orthogonally_adjacent(self.mines[index], second));
                if touches_member || is_orthogonally_adjacent(first, second) {
                    return false;
                }
            }
        }
        true
    }
}
