pub mod branch;
pub mod cache;
pub mod sim;
pub mod topdown;

pub use branch::Branch;
pub use cache::{Cache, Level};
pub use sim::Sim;
pub use topdown::{Category, StallReason};

use serde::{Deserialize, Serialize};

/// Scraped counters of one simulated benchmark slice.
#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub sim: Sim,
    pub branch: Branch,
    pub l1d: Cache,
    pub l2: Cache,
    pub l3: Cache,
}

impl std::ops::AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.sim += other.sim;
        self.branch += other.branch;
        self.l1d += other.l1d;
        self.l2 += other.l2;
        self.l3 += other.l3;
    }
}
