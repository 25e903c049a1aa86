use serde::{Deserialize, Serialize};

/// Committed branch counters of one run.
///
/// Indirect mispredictions are a subset of `mispredicts`.
#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub branches: u64,
    pub mispredicts: u64,
    pub indirect_mispredicts: u64,
}

impl Branch {
    #[must_use]
    pub fn mispredict_rate(&self) -> f64 {
        if self.branches == 0 {
            return 0.0;
        }
        self.mispredicts as f64 / self.branches as f64
    }

    /// Mispredictions per kilo committed instructions.
    #[must_use]
    pub fn total_mpki(&self, instructions: u64) -> f64 {
        mpki(self.mispredicts, instructions)
    }

    #[must_use]
    pub fn indirect_mpki(&self, instructions: u64) -> f64 {
        mpki(self.indirect_mispredicts, instructions)
    }

    #[must_use]
    pub fn direct_mpki(&self, instructions: u64) -> f64 {
        self.total_mpki(instructions) - self.indirect_mpki(instructions)
    }
}

impl std::ops::AddAssign for Branch {
    fn add_assign(&mut self, other: Self) {
        self.branches += other.branches;
        self.mispredicts += other.mispredicts;
        self.indirect_mispredicts += other.indirect_mispredicts;
    }
}

#[must_use]
pub fn mpki(events: u64, instructions: u64) -> f64 {
    if instructions == 0 {
        return 0.0;
    }
    events as f64 / instructions as f64 * 1000.0
}

#[cfg(test)]
mod tests {
    use super::Branch;

    #[test]
    fn mpki_splits_add_up() {
        let branch = Branch {
            branches: 1_000_000,
            mispredicts: 12_000,
            indirect_mispredicts: 2_000,
        };
        let insts = 10_000_000;
        assert_eq!(branch.total_mpki(insts), 1.2);
        assert_eq!(branch.indirect_mpki(insts), 0.2);
        assert_eq!(
            branch.total_mpki(insts),
            branch.direct_mpki(insts) + branch.indirect_mpki(insts)
        );
        assert_eq!(branch.mispredict_rate(), 0.012);
    }
}
