//! Text record of a board: an optional `Game Time: HH:MM:SS` header, then one line per grid row
//! with a comma-separated cell code per column.

use core::time::Duration;
use std::path::Path;

use ndarray::Array2;

use crate::*;

const TIME_HEADER: &str = "Game Time:";

/// Persisted cell states, indexed by their code. Any other combination cannot be stored.
const CELL_CODES: [PersistedCell; 7] = [
    PersistedCell::new(CellContent::Empty, false, false),
    PersistedCell::new(CellContent::Mine, false, false),
    PersistedCell::new(CellContent::Treasure, false, false),
    PersistedCell::new(CellContent::Mine, true, false),
    PersistedCell::new(CellContent::Empty, true, false),
    PersistedCell::new(CellContent::Empty, false, true),
    PersistedCell::new(CellContent::Treasure, true, false),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PersistedCell {
    content: CellContent,
    flagged: bool,
    checked: bool,
}

impl PersistedCell {
    const fn new(content: CellContent, flagged: bool, checked: bool) -> Self {
        Self {
            content,
            flagged,
            checked,
        }
    }

    fn of(cell: &Cell) -> Self {
        Self::new(cell.content(), cell.is_flagged(), cell.is_checked())
    }

    fn code(self) -> Option<usize> {
        CELL_CODES.iter().position(|&entry| entry == self)
    }

    fn from_code(code: usize) -> Option<Self> {
        CELL_CODES.get(code).copied()
    }

    fn into_cell(self, coords: Coord2) -> Result<Cell> {
        let mut cell = Cell::new(coords, self.content);
        cell.set_flagged(self.flagged)?;
        cell.set_checked(self.checked)?;
        Ok(cell)
    }
}

/// Serializes `board`.
///
/// The `Game Time:` header is only written once the clock has started, so an unstarted board
/// starts directly with its first grid row. [`load_board`] accepts both forms.
pub fn save_board<G: LayoutGenerator>(board: &Board<G>) -> Result<String> {
    let mut lines = Vec::with_capacity(board.tiles().nrows() + 1);
    if board.start_time().is_some() {
        lines.push(format!("{} {}", TIME_HEADER, format_clock(board.elapsed())));
    }

    for row in board.tiles().rows() {
        let codes = row
            .iter()
            .map(|cell| {
                PersistedCell::of(cell)
                    .code()
                    .map(|code| code.to_string())
                    .ok_or(GameError::UnrepresentableState(cell.coords()))
            })
            .collect::<Result<Vec<_>>>()?;
        lines.push(codes.join(","));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}

/// Parses a record into a fresh board, inferring its difficulty from the presets.
pub fn load_board(text: &str) -> Result<Board> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .peekable();

    let elapsed = match lines.peek() {
        Some(&(line_no, line)) if line.starts_with(TIME_HEADER) => {
            lines.next();
            Some(parse_clock(&line[TIME_HEADER.len()..], line_no)?)
        }
        _ => None,
    };

    let mut rows: Vec<Vec<PersistedCell>> = Vec::new();
    for (line_no, line) in lines {
        let row = line
            .split(',')
            .map(|field| {
                field
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(PersistedCell::from_code)
                    .ok_or(GameError::MalformedRecord {
                        line: line_no,
                        reason: "unknown cell code",
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(GameError::MalformedRecord {
                    line: line_no,
                    reason: "row length differs from the first row",
                });
            }
        }
        rows.push(row);
    }

    let size_x = Coord::try_from(rows.len()).map_err(|_| GameError::MalformedRecord {
        line: 0,
        reason: "too many rows",
    })?;
    let size_y = Coord::try_from(rows.first().map_or(0, Vec::len)).map_err(|_| {
        GameError::MalformedRecord {
            line: 0,
            reason: "too many columns",
        }
    })?;
    if size_x == 0 || size_y == 0 {
        return Err(GameError::MalformedRecord {
            line: 0,
            reason: "record has no grid",
        });
    }

    let mut tiles = Vec::with_capacity(usize::from(size_x) * usize::from(size_y));
    for (x, row) in rows.into_iter().enumerate() {
        for (y, persisted) in row.into_iter().enumerate() {
            tiles.push(persisted.into_cell((x as Coord, y as Coord))?);
        }
    }
    let tiles = Array2::from_shape_vec((size_x, size_y).to_nd_index(), tiles).map_err(|_| {
        GameError::MalformedRecord {
            line: 0,
            reason: "grid is not rectangular",
        }
    })?;

    let mines = tiles.iter().filter(|cell| cell.content().is_mine()).count();
    let treasures = tiles.iter().filter(|cell| cell.content().is_treasure()).count();
    let profile = DifficultyProfile::matching_preset(
        (size_x, size_y),
        mines.try_into().unwrap_or(CellCount::MAX),
        treasures.try_into().unwrap_or(CellCount::MAX),
    )
    .ok_or(GameError::NoMatchingDifficulty)?;

    let mut board = Board::from_cells_unchecked(profile, tiles);
    if let Some(elapsed) = elapsed {
        board.resume_clock(elapsed);
    }
    log::debug!(
        "Loaded {}x{} board with {} mines and {} treasures, elapsed {:?}",
        size_x,
        size_y,
        mines,
        treasures,
        elapsed
    );
    Ok(board)
}

pub fn save_board_to_path<G: LayoutGenerator>(
    board: &Board<G>,
    path: impl AsRef<Path>,
) -> core::result::Result<(), PersistError> {
    let text = save_board(board)?;
    std::fs::write(path.as_ref(), text)?;
    log::debug!("Saved board to {}", path.as_ref().display());
    Ok(())
}

/// Reads a board file. A failure leaves no partial board behind.
pub fn load_board_from_path(path: impl AsRef<Path>) -> core::result::Result<Board, PersistError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    Ok(load_board(&text)?)
}

fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

fn parse_clock(text: &str, line: usize) -> Result<Duration> {
    let malformed = GameError::MalformedRecord {
        line,
        reason: "game time is not HH:MM:SS",
    };

    let fields = text
        .trim()
        .split(':')
        .map(|field| field.parse::<u64>().map_err(|_| malformed))
        .collect::<Result<Vec<_>>>()?;
    let &[hours, minutes, seconds] = fields.as_slice() else {
        return Err(malformed);
    };
    if minutes >= 60 || seconds >= 60 {
        return Err(malformed);
    }

    let secs = hours
        .checked_mul(3600)
        .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
        .ok_or(malformed)?;
    Ok(Duration::from_secs(secs))
}
