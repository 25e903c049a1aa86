use serde::{Deserialize, Serialize};

/// Dispatch stall attribution reported by the gem5 out-of-order CPU model
/// (`iew.dispatchStallReason::*`).
#[derive(
    Debug,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub enum StallReason {
    NoStall,
    IcacheStall,
    ITlbStall,
    DTlbStall,
    BpStall,
    IntStall,
    TrapStall,
    FetchFragStall,
    OtherFragStall,
    FTQBubble,
    SquashStall,
    FetchBufferInvalid,
    InstMisPred,
    InstSquashed,
    SerializeStall,
    ScalarLongExecute,
    VectorLongExecute,
    InstNotReady,

    LoadL1Bound,
    LoadL2Bound,
    LoadL3Bound,
    LoadMemBound,
    StoreL1Bound,
    StoreL2Bound,
    StoreL3Bound,
    StoreMemBound,
    MemSquashed,
    MemNotReady,
    MemCommitRateLimit,
    Atomic,
    OtherMemStall,

    MemDQBandwidth,
    IntDQBandwidth,
    FVDQBandwidth,
    VectorReadyButNotIssued,
    ScalarReadyButNotIssued,
    ResumeUnblock,
    CommitSquash,
    OtherStall,
    OtherFetchStall,
}

/// Coarse topdown buckets the fine-grained stall reasons collapse into.
#[derive(
    Debug,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub enum Category {
    Base,
    Frontend,
    BadSpec,
    Core,
    Load,
    Store,
    Mem,
    Misc,
}

impl StallReason {
    /// Coarse bucket of this stall reason.
    ///
    /// Reasons outside the coarse report (dispatch-queue bandwidth
    /// limits and squashed slots counted elsewhere) map to `None` and are
    /// dropped when merging.
    #[must_use]
    pub fn category(self) -> Option<Category> {
        use StallReason::*;
        let category = match self {
            NoStall => Category::Base,

            ScalarLongExecute | VectorLongExecute | InstNotReady => Category::Core,

            LoadL1Bound | LoadL2Bound | LoadL3Bound | LoadMemBound | DTlbStall => Category::Load,
            StoreL1Bound | StoreL2Bound | StoreL3Bound | StoreMemBound => Category::Store,
            MemSquashed | MemNotReady | MemCommitRateLimit | OtherMemStall => Category::Mem,

            IcacheStall | ITlbStall | FetchFragStall | OtherFragStall | FTQBubble
            | FetchBufferInvalid | OtherFetchStall => Category::Frontend,

            BpStall | SquashStall | InstMisPred | InstSquashed | CommitSquash => Category::BadSpec,

            SerializeStall | TrapStall | IntStall | Atomic | ResumeUnblock | OtherStall => {
                Category::Misc
            }

            MemDQBandwidth | IntDQBandwidth | FVDQBandwidth | VectorReadyButNotIssued
            | ScalarReadyButNotIssued => return None,
        };
        Some(category)
    }
}
