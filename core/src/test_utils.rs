//! Boards drawn as text for tests: `.` empty, `M` mine, `T` treasure, one string per row.

use ndarray::Array2;

use crate::*;

pub(crate) fn contents(rows: &[&str]) -> Array2<CellContent> {
    let size_y = rows.first().map_or(0, |row| row.len());
    Array2::from_shape_fn((rows.len(), size_y), |(x, y)| {
        match rows[x].as_bytes()[y] {
            b'M' => CellContent::Mine,
            b'T' => CellContent::Treasure,
            b'.' => CellContent::Empty,
            other => panic!("unexpected cell {:?}", other as char),
        }
    })
}

pub(crate) fn cells(rows: &[&str]) -> Array2<Cell> {
    let contents = contents(rows);
    Array2::from_shape_fn(contents.raw_dim(), |(x, y)| {
        Cell::new((x as Coord, y as Coord), contents[(x, y)])
    })
}

/// 4x4 board with one to three mines and at most one treasure.
pub(crate) fn small_profile() -> DifficultyProfile {
    DifficultyProfile::new((4, 4), (1, 3), (0, 1)).unwrap()
}

pub(crate) fn small_board(rows: &[&str]) -> Board {
    Board::from_layout(small_profile(), &contents(rows)).unwrap()
}

pub(crate) fn beginner_board(rows: &[&str]) -> Board {
    Board::from_layout(DifficultyProfile::BEGINNER, &contents(rows)).unwrap()
}

pub(crate) fn checked_count(board: &Board) -> usize {
    board.tiles().iter().filter(|cell| cell.is_checked()).count()
}

pub(crate) fn mine_count(board: &Board) -> usize {
    board
        .tiles()
        .iter()
        .filter(|cell| cell.content().is_mine())
        .count()
}
