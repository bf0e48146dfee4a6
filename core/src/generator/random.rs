use super::*;

/// Seeded source of every random decision a board makes: the initial layout and first-click relocation.
#[derive(Clone, Debug)]
pub struct RandomLayoutGenerator {
    rng: SmallRng,
    fill: FillPolicy,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64, fill: FillPolicy) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            fill,
        }
    }

    /// Seeded from the wall clock, for callers that do not care about reproducibility.
    pub fn from_clock(fill: FillPolicy) -> Self {
        Self::new(clock_seed(), fill)
    }

    pub fn fill_policy(&self) -> FillPolicy {
        self.fill
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(&mut self, profile: &DifficultyProfile) -> Result<ItemLayout> {
        profile.validate()?;

        let treasures = distribute(
            &mut self.rng,
            profile.size(),
            profile.min_treasures,
            profile.max_treasures,
            self.fill,
        )?;
        let treasure_count = count_marks(&treasures);

        // treasures keep their cells, and mines must still outnumber them
        let min_mines = profile.min_mines.max(treasure_count + 1);
        let mines = distribute_within(
            &mut self.rng,
            &treasures,
            min_mines,
            profile.max_mines,
            self.fill,
        )?;

        log::debug!(
            "Generated layout with {} mines and {} treasures",
            count_marks(&mines),
            treasure_count
        );
        Ok(ItemLayout { treasures, mines })
    }

    /// Uniform over `candidates`.
    fn pick(&mut self, candidates: &[Coord2]) -> Option<Coord2> {
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.random_range(0..candidates.len())])
    }
}

fn clock_seed() -> u64 {
    use web_time::{SystemTime, UNIX_EPOCH};

    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => since_epoch.as_nanos() as u64,
        Err(_) => {
            log::warn!("System clock is before the epoch, using a fixed seed");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_layouts_respect_every_preset() {
        for preset in DifficultyProfile::PRESETS {
            for seed in 0..20 {
                let mut generator = RandomLayoutGenerator::new(seed, FillPolicy::Uniform);
                let layout = generator.generate(&preset).unwrap();
                let contents = layout.resolve();

                let mines = contents.iter().filter(|c| c.is_mine()).count() as CellCount;
                let treasures = contents.iter().filter(|c| c.is_treasure()).count() as CellCount;

                assert!(preset.mines_in_range(mines), "{preset:?} seed {seed}: {mines} mines");
                assert!(preset.treasures_in_range(treasures));
                assert!(mines > treasures);
            }
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let profile = DifficultyProfile::INTERMEDIATE;

        let a = RandomLayoutGenerator::new(42, FillPolicy::Uniform).generate(&profile).unwrap();
        let b = RandomLayoutGenerator::new(42, FillPolicy::Uniform).generate(&profile).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn max_fill_uses_upper_bounds() {
        let profile = DifficultyProfile::EXPERT;
        let mut generator = RandomLayoutGenerator::new(5, FillPolicy::Max);

        let layout = generator.generate(&profile).unwrap();

        assert_eq!(count_marks(&layout.mines), 99);
        assert_eq!(count_marks(&layout.treasures), 3);
    }

    #[test]
    fn pick_from_nothing_is_none() {
        let mut generator = RandomLayoutGenerator::new(0, FillPolicy::Uniform);

        assert_eq!(generator.pick(&[]), None);
        assert_eq!(generator.pick(&[(1, 2)]), Some((1, 2)));
    }
}
