use super::branch::mpki;
use serde::{Deserialize, Serialize};

#[derive(strum::IntoStaticStr, strum::EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    L1D,
    L2,
    L3,
}

/// Demand/prefetch access counters of one cache level.
///
/// Demand counters include accesses issued on behalf of prefetchers; the
/// `data_*` accessors subtract them, following how the gem5 dumps break the
/// totals down per requestor.
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cache {
    pub accesses: u64,
    pub misses: u64,
    pub prefetch_accesses: u64,
    pub prefetch_misses: u64,
}

impl Cache {
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.accesses.saturating_sub(self.misses)
    }

    #[must_use]
    pub fn data_accesses(&self) -> u64 {
        self.accesses.saturating_sub(self.prefetch_accesses)
    }

    #[must_use]
    pub fn data_misses(&self) -> u64 {
        self.misses.saturating_sub(self.prefetch_misses)
    }

    #[must_use]
    pub fn overall_mpki(&self, instructions: u64) -> f64 {
        mpki(self.misses, instructions)
    }

    #[must_use]
    pub fn data_mpki(&self, instructions: u64) -> f64 {
        mpki(self.data_misses(), instructions)
    }
}

impl std::ops::AddAssign for Cache {
    fn add_assign(&mut self, other: Self) {
        self.accesses += other.accesses;
        self.misses += other.misses;
        self.prefetch_accesses += other.prefetch_accesses;
        self.prefetch_misses += other.prefetch_misses;
    }
}

#[cfg(test)]
mod tests {
    use super::{Cache, Level};

    #[test]
    fn level_names_are_lowercase() {
        let name: &'static str = Level::L1D.into();
        assert_eq!(name, "l1d");
    }

    #[test]
    fn data_counters_exclude_prefetch() {
        let cache = Cache {
            accesses: 1000,
            misses: 100,
            prefetch_accesses: 200,
            prefetch_misses: 40,
        };
        assert_eq!(cache.hits(), 900);
        assert_eq!(cache.data_accesses(), 800);
        assert_eq!(cache.data_misses(), 60);
        assert_eq!(cache.data_mpki(120_000), 0.5);
    }
}
