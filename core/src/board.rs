use core::num::Saturating;
use core::ops::Index;
use core::time::Duration;

use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Valid transitions:
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Active,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub const fn outcome(self) -> Outcome {
        match self {
            Self::Active => Outcome::Continue,
            Self::Won => Outcome::Won,
            Self::Lost => Outcome::Lost,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Active
    }
}

/// Result of a player action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Continue,
    Won,
    Lost,
}

impl Outcome {
    pub const fn from_won(won: bool) -> Self {
        if won { Self::Won } else { Self::Lost }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// A game from setup to game over.
///
/// `G` supplies the layout on every setup and the target of a first-click mine relocation.
#[derive(Clone, Debug)]
pub struct Board<G = RandomLayoutGenerator> {
    profile: DifficultyProfile,
    tiles: Array2<Cell>,
    actual_mines: CellCount,
    flag_count: Saturating<CellCount>,
    correct_flag_count: Saturating<CellCount>,
    clicked_count: u32,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    state: GameState,
    generator: G,
}

impl Board {
    /// Fresh random board, seeded from the clock.
    pub fn new(profile: DifficultyProfile) -> Result<Self> {
        Self::with_generator(profile, RandomLayoutGenerator::from_clock(FillPolicy::default()))
    }

    pub fn with_seed(profile: DifficultyProfile, seed: u64) -> Result<Self> {
        Self::with_generator(profile, RandomLayoutGenerator::new(seed, FillPolicy::default()))
    }

    /// Board with hand-placed contents, all cells hidden.
    pub fn from_layout(profile: DifficultyProfile, contents: &Array2<CellContent>) -> Result<Self> {
        profile.validate()?;
        let (size_x, size_y) = profile.size();
        if contents.dim() != (usize::from(size_x), usize::from(size_y)) {
            return Err(GameError::InvalidArgument("layout does not match the profile size"));
        }

        let mines = count_content(contents.iter().copied(), CellContent::Mine);
        let treasures = count_content(contents.iter().copied(), CellContent::Treasure);
        if !profile.mines_in_range(mines) {
            return Err(GameError::InvalidArgument("mine count outside the profile range"));
        }
        if !profile.treasures_in_range(treasures) || treasures >= mines {
            return Err(GameError::InvalidArgument("treasure count outside the profile range"));
        }

        Ok(Self::from_cells_unchecked(profile, cells_from_contents(contents)))
    }

    /// Wraps already built cells, deriving every counter from them.
    pub(crate) fn from_cells_unchecked(profile: DifficultyProfile, tiles: Array2<Cell>) -> Self {
        let generator = RandomLayoutGenerator::from_clock(FillPolicy::default());
        let mut board = Self::empty(profile, generator);
        board.tiles = tiles;
        board.recount();
        board.count_neighbors();
        board
    }
}

impl<G: LayoutGenerator> Board<G> {
    pub fn with_generator(profile: DifficultyProfile, generator: G) -> Result<Self> {
        profile.validate()?;
        let mut board = Self::empty(profile, generator);
        board.setup()?;
        Ok(board)
    }

    fn empty(profile: DifficultyProfile, generator: G) -> Self {
        Self {
            profile,
            tiles: Array2::from_shape_fn(profile.size().to_nd_index(), |(x, y)| {
                Cell::new((x as Coord, y as Coord), CellContent::Empty)
            }),
            actual_mines: 0,
            flag_count: Saturating(0),
            correct_flag_count: Saturating(0),
            clicked_count: 0,
            start_time: None,
            end_time: None,
            state: GameState::Active,
            generator,
        }
    }

    /// Resets counters and the clock, then lays out a new grid.
    pub fn setup(&mut self) -> Result<()> {
        self.flag_count = Saturating(0);
        self.correct_flag_count = Saturating(0);
        self.clicked_count = 0;
        self.start_time = None;
        self.end_time = None;
        self.state = GameState::Active;

        self.place_items()?;
        self.count_neighbors();
        Ok(())
    }

    pub fn restart(&mut self) -> Result<()> {
        log::debug!("Restarting game");
        self.setup()
    }

    pub fn place_items(&mut self) -> Result<()> {
        let layout = self.generator.generate(&self.profile)?;
        let contents = layout.resolve();
        if contents.raw_dim() != self.tiles.raw_dim() {
            return Err(GameError::InvalidArgument(
                "generated layout does not match the profile size",
            ));
        }
        let mines = count_content(contents.iter().copied(), CellContent::Mine);
        let treasures = count_content(contents.iter().copied(), CellContent::Treasure);
        if !self.profile.mines_in_range(mines)
            || !self.profile.treasures_in_range(treasures)
            || treasures >= mines
        {
            return Err(GameError::InvalidArgument("generated layout outside the profile ranges"));
        }

        self.tiles = cells_from_contents(&contents);
        self.actual_mines = mines;
        Ok(())
    }

    pub fn count_neighbors(&mut self) {
        let counts = Array2::from_shape_fn(self.tiles.raw_dim(), |(x, y)| {
            self.tiles
                .iter_neighbor_cells((x as Coord, y as Coord))
                .fold((0u8, 0u8), |(mines, treasures), cell| match cell.content() {
                    CellContent::Mine => (mines + 1, treasures),
                    CellContent::Treasure => (mines, treasures + 1),
                    CellContent::Empty => (mines, treasures),
                })
        });
        for (cell, &(mines, treasures)) in self.tiles.iter_mut().zip(counts.iter()) {
            cell.set_nearby_counts(mines, treasures);
        }
    }

    fn recount(&mut self) {
        self.actual_mines = count_content(self.tiles.iter().map(Cell::content), CellContent::Mine);
        self.flag_count = Saturating(count_where(self.tiles.iter(), |cell| cell.is_flagged()));
        self.correct_flag_count = Saturating(count_where(self.tiles.iter(), |cell| {
            cell.is_flagged() && cell.content().is_mine()
        }));
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn size(&self) -> Coord2 {
        shape_of(&self.tiles)
    }

    pub fn tiles(&self) -> &Array2<Cell> {
        &self.tiles
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<&Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(&self.tiles[coords.to_nd_index()])
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds(coords))
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !self.state.is_finished()
    }

    pub fn actual_mines(&self) -> CellCount {
        self.actual_mines
    }

    pub fn treasure_count(&self) -> CellCount {
        count_content(self.tiles.iter().map(Cell::content), CellContent::Treasure)
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count.0
    }

    pub fn correct_flag_count(&self) -> CellCount {
        self.correct_flag_count.0
    }

    pub fn clicked_count(&self) -> u32 {
        self.clicked_count
    }

    /// How many mines have not been flagged yet, negative with excess flags
    pub fn mines_left(&self) -> isize {
        (self.actual_mines as isize) - (self.flag_count.0 as isize)
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    /// Time since the clock started, frozen at game over, zero before the first reveal
    pub fn elapsed(&self) -> Duration {
        match self.start_time {
            Some(start) => self
                .end_time
                .unwrap_or_else(Instant::now)
                .saturating_duration_since(start),
            None => Duration::ZERO,
        }
    }

    /// Starts the clock if it is not running yet.
    pub fn update_timer(&mut self) -> Duration {
        if self.start_time.is_none() {
            log::debug!("Clock started");
            self.start_time = Some(Instant::now());
        }
        self.elapsed()
    }

    /// Restores a clock that has already run for `elapsed`, as when resuming a saved game.
    pub(crate) fn resume_clock(&mut self, elapsed: Duration) {
        let now = Instant::now();
        let start = now.checked_sub(elapsed).unwrap_or_else(|| {
            log::warn!("Cannot back-date clock by {:?}, starting from now", elapsed);
            now
        });
        self.start_time = Some(start);
        self.clicked_count = self.clicked_count.max(1);
    }

    pub fn reveal_cell(&mut self, coords: Coord2) -> Result<Outcome> {
        let coords = self.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(self.state.outcome());
        }

        if self.clicked_count == 0 && self[coords].content().is_mine() {
            self.relocate_first_mine(coords)?;
        }
        self.update_timer();
        self.clicked_count += 1;

        let cell = &mut self.tiles[coords.to_nd_index()];
        if cell.is_checked() || cell.is_flagged() {
            return Ok(Outcome::Continue);
        }
        cell.set_checked(true)?;
        let (content, blank) = (cell.content(), cell.is_blank());
        log::debug!("Revealed cell at {:?}: {:?}", coords, content);

        match content {
            CellContent::Mine => return Ok(Outcome::from_won(self.game_over(false))),
            CellContent::Treasure => return Ok(Outcome::from_won(self.game_over(true))),
            CellContent::Empty if blank => self.flood_fill(coords)?,
            CellContent::Empty => {}
        }

        if self.all_safe_cells_checked() {
            Ok(Outcome::from_won(self.game_over(true)))
        } else {
            Ok(Outcome::Continue)
        }
    }

    /// Opens the connected blank region around `start`, plus its numbered border.
    fn flood_fill(&mut self, start: Coord2) -> Result<()> {
        let mut visited: HashSet<Coord2> = [start].into_iter().collect();
        let mut to_visit: Vec<_> = self
            .tiles
            .iter_neighbors(start)
            .filter(|&pos| self.is_hidden(pos))
            .collect();
        log::trace!(
            "Starting flood-fill from {:?}, initial neighbors: {:?}",
            start,
            to_visit
        );

        while let Some(visit_coords) = to_visit.pop() {
            if !visited.insert(visit_coords) {
                continue;
            }

            let cell = &mut self.tiles[visit_coords.to_nd_index()];
            if cell.is_checked() || cell.is_flagged() {
                log::trace!("Skipping cell at {:?}", visit_coords);
                continue;
            }
            cell.set_checked(true)?;
            log::trace!("Flood opened cell at {:?}", visit_coords);

            if cell.is_blank() {
                let neighbors: Vec<_> = self
                    .tiles
                    .iter_neighbors(visit_coords)
                    .filter(|&pos| self.is_hidden(pos))
                    .filter(|pos| !visited.contains(pos))
                    .collect();
                to_visit.extend(neighbors);
            }
        }
        Ok(())
    }

    fn is_hidden(&self, coords: Coord2) -> bool {
        let cell = &self.tiles[coords.to_nd_index()];
        !cell.is_checked() && !cell.is_flagged()
    }

    fn all_safe_cells_checked(&self) -> bool {
        self.tiles
            .iter()
            .all(|cell| cell.content() != CellContent::Empty || cell.is_checked())
    }

    fn relocate_first_mine(&mut self, coords: Coord2) -> Result<()> {
        let candidates: Vec<Coord2> = self
            .tiles
            .iter()
            .filter(|cell| cell.content() == CellContent::Empty && !cell.is_checked())
            .map(Cell::coords)
            .collect();
        let target = self
            .generator
            .pick(&candidates)
            .ok_or(GameError::NoAvailableTarget)?;
        log::debug!("First click on a mine, moving it from {:?} to {:?}", coords, target);
        self.move_mine(coords, target)
    }

    /// Moves the mine at `from` onto the hidden empty cell `to` and refreshes neighbor counts.
    pub fn move_mine(&mut self, from: Coord2, to: Coord2) -> Result<()> {
        let from = self.validate_coords(from)?;
        let to = self.validate_coords(to)?;
        if !self[from].content().is_mine() {
            return Err(GameError::InvalidArgument("no mine to move"));
        }
        if self[to].content() != CellContent::Empty || self[to].is_checked() {
            return Err(GameError::InvalidArgument("mine target must be a hidden empty cell"));
        }

        if self[from].is_flagged() {
            self.correct_flag_count -= 1;
        }
        if self[to].is_flagged() {
            self.correct_flag_count += 1;
        }
        self.tiles[from.to_nd_index()].set_content(CellContent::Empty);
        self.tiles[to.to_nd_index()].set_content(CellContent::Mine);
        self.count_neighbors();
        Ok(())
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<Outcome> {
        let coords = self.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(self.state.outcome());
        }

        let cell = &mut self.tiles[coords.to_nd_index()];
        if cell.is_checked() {
            return Ok(Outcome::Continue);
        }
        let flagged = !cell.is_flagged();
        cell.set_flagged(flagged)?;
        let is_mine = cell.content().is_mine();

        if flagged {
            self.flag_count += 1;
            if is_mine {
                self.correct_flag_count += 1;
            }
        } else {
            self.flag_count -= 1;
            if is_mine {
                self.correct_flag_count -= 1;
            }
        }
        log::debug!(
            "Flag at {:?} set to {}, {} flags placed",
            coords,
            flagged,
            self.flag_count
        );

        if self.correct_flag_count.0 == self.actual_mines && self.flag_count.0 == self.actual_mines {
            Ok(Outcome::from_won(self.game_over(true)))
        } else {
            Ok(Outcome::Continue)
        }
    }

    /// Ends the game and reveals every cell, the flag counters keep their final tally.
    pub fn game_over(&mut self, won: bool) -> bool {
        if !self.state.is_finished() {
            self.state = if won { GameState::Won } else { GameState::Lost };
            let now = Instant::now();
            self.end_time = Some(now);
            log::debug!("Game over, won: {}, after {:?}", won, self.elapsed());
        }

        for cell in self.tiles.iter_mut() {
            cell.force_reveal();
        }
        won
    }
}

impl<G> Index<Coord2> for Board<G> {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.tiles[coords.to_nd_index()]
    }
}

fn cells_from_contents(contents: &Array2<CellContent>) -> Array2<Cell> {
    Array2::from_shape_fn(contents.raw_dim(), |(x, y)| {
        Cell::new((x as Coord, y as Coord), contents[(x, y)])
    })
}

fn count_content(contents: impl Iterator<Item = CellContent>, wanted: CellContent) -> CellCount {
    contents
        .filter(|&content| content == wanted)
        .count()
        .try_into()
        .unwrap_or(CellCount::MAX)
}

fn count_where<'a>(cells: impl Iterator<Item = &'a Cell>, pred: impl Fn(&Cell) -> bool) -> CellCount {
    cells
        .filter(|cell| pred(cell))
        .count()
        .try_into()
        .unwrap_or(CellCount::MAX)
}
