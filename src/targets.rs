use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use strum::IntoEnumIterator;

/// A named metric scraped from a simulator output file.
///
/// `accumulate` marks banked counters that are dumped repeatedly: the
/// scraper collects every match and sums the last N occurrences.
#[derive(Debug, Clone)]
pub struct Target {
    pub regex: Regex,
    pub accumulate: Option<usize>,
}

pub type Targets = IndexMap<String, Target>;

/// gem5 stat lines are `<dotted.path> <value> # comment`; the tables
/// below only name the path and the value suffix is appended here.
const GEM5_VALUE: &str = r"\s+(\d+\.?\d*)\s+";

macro_rules! gem5_stat {
    ($name:expr, $regex:expr) => {
        (
            $name.to_string(),
            Target {
                regex: Regex::new(&format!("{}{}", $regex, GEM5_VALUE)).unwrap(),
                accumulate: None,
            },
        )
    };
}

macro_rules! xs_stat {
    ($name:expr, $regex:expr) => {
        (
            $name.to_string(),
            Target {
                regex: Regex::new(&format!("^{}", $regex)).unwrap(),
                accumulate: None,
            },
        )
    };
    ($name:expr, $regex:expr, $n:expr) => {
        (
            $name.to_string(),
            Target {
                regex: Regex::new(&format!("^{}", $regex)).unwrap(),
                accumulate: Some($n),
            },
        )
    };
}

pub static BRIEF: Lazy<Targets> = Lazy::new(|| {
    IndexMap::from_iter([
        gem5_stat!("ipc", r"(?:cpus?|switch_cpus_1)\.ipc"),
        gem5_stat!("Insts", r"(?:cpus?|switch_cpus_1)\.committedInsts"),
        gem5_stat!("Cycles", r"cpus?\.numCycles"),
    ])
});

pub static BRANCH: Lazy<Targets> = Lazy::new(|| {
    IndexMap::from_iter([
        gem5_stat!(
            "branchMispredicts",
            r"(?:cpus?|switch_cpus_1)\.commit\.branchMispredicts"
        ),
        gem5_stat!("branches", r"(?:cpus?|switch_cpus_1)\.commit\.branches"),
        gem5_stat!(
            "indirectMispred",
            r"(?:cpus?|switch_cpus_1)\.branchPred\.ftb\.indirectPredCorrect"
        ),
    ])
});

pub static CACHE: Lazy<Targets> = Lazy::new(|| {
    IndexMap::from_iter([
        gem5_stat!("l3_acc_l2_pref", r"l3\.demandAccesses::l2\.prefetcher"),
        gem5_stat!(
            "l3_acc_l1_pref",
            r"l3\.demandAccesses::cpu\.dcache\.prefetcher"
        ),
        gem5_stat!("l3_acc", r"l3\.demandAccesses::total"),
        gem5_stat!(
            "l3_miss_l1d_pref",
            r"l3\.demandMisses::cpu\.dcache\.prefetcher"
        ),
        gem5_stat!("l3_miss_l2_pref", r"l3\.demandMisses::l2\.prefetcher"),
        gem5_stat!("l3_miss", r"l3\.demandMisses::total"),
        gem5_stat!("l2_acc", r"l2_caches\.demandAccesses::total"),
        gem5_stat!("l2_miss", r"l2_caches\.demandMisses::total"),
        gem5_stat!(
            "l2_miss_l1d_pref",
            r"l2_caches\.demandMisses::cpu\.dcache\.prefetcher"
        ),
        gem5_stat!("dcache_miss", r"cpu\.dcache\.demandMisses::total"),
    ])
});

pub static ICACHE: Lazy<Targets> = Lazy::new(|| {
    IndexMap::from_iter([
        gem5_stat!("icache_miss", r"icache\.demandMisses::total"),
        gem5_stat!("icache_acc", r"icache\.overallAccesses::total"),
    ])
});

pub static MEM: Lazy<Targets> = Lazy::new(|| {
    IndexMap::from_iter([
        gem5_stat!("Sec", r"simSeconds"),
        gem5_stat!("WritebackDirty", r"system.membus\.transDist::WritebackDirty"),
        gem5_stat!("ReadResp", r"system.membus\.transDist::ReadResp"),
        gem5_stat!("ReadExResp", r"system.membus\.transDist::ReadExResp"),
    ])
});

/// One target per dispatch stall reason the out-of-order CPU reports.
pub static TOPDOWN: Lazy<Targets> = Lazy::new(|| {
    stats::StallReason::iter()
        .map(|reason| {
            let name: &'static str = reason.into();
            gem5_stat!(
                name,
                format!(r"system\.cpu\.iew\.dispatchStallReason::{name}")
            )
        })
        .collect()
});

// Xiangshan performance counter log prefixes. Some emitters prepend
// the TOP. testbench wrapper to the hierarchy, some do not.
const XS_PERF: &str = r"\[PERF \]\[time=\s+\d+\] (?:TOP\.)?";
const XS_CORE: &str = r"SimTop\.l_soc\.core_with_l2\.core";
const XS_CTRL_BLOCK: &str =
    r"SimTop\.l_soc\.core_with_l2\.core\.(?:backend\.)?inner.ctrlBlock";
const XS_L2: &str = r"SimTop\.l_soc\.core_with_l2\.l2top\.inner.l2cache";
const XS_L3: &str = r"SimTop\.l_soc\.l3cacheOpt";

pub static XS_IPC: Lazy<Targets> = Lazy::new(|| {
    IndexMap::from_iter([
        xs_stat!(
            "commitInstr",
            format!(r"{XS_PERF}{XS_CTRL_BLOCK}.rob: commitInstr,\s+(\d+)")
        ),
        xs_stat!(
            "total_cycles",
            format!(r"{XS_PERF}{XS_CTRL_BLOCK}.rob: clock_cycle,\s+(\d+)")
        ),
    ])
});

pub static XS_BRANCH: Lazy<Targets> = Lazy::new(|| {
    ["BpInstr", "BpBWrong", "BpJWrong", "BpIWrong"]
        .into_iter()
        .map(|counter| {
            xs_stat!(
                counter,
                format!(r"{XS_PERF}{XS_CORE}\.frontend\.ftq: {counter},\s+(\d+)")
            )
        })
        .collect()
});

/// Dispatch-stage bubble attribution of the Xiangshan topdown counters.
pub const XS_STALLS: &[&str] = &[
    "NoStall",
    "OverrideBubble",
    "FtqUpdateBubble",
    "TAGEMissBubble",
    "SCMissBubble",
    "ITTAGEMissBubble",
    "RASMissBubble",
    "MemVioRedirectBubble",
    "OtherRedirectBubble",
    "FtqFullStall",
    "ICacheMissBubble",
    "ITLBMissBubble",
    "BTBMissBubble",
    "FetchFragBubble",
    "DivStall",
    "IntNotReadyStall",
    "FPNotReadyStall",
    "MemNotReadyStall",
    "LoadTLBStall",
    "LoadL1Stall",
    "LoadL2Stall",
    "LoadL3Stall",
    "LoadMemStall",
    "StoreStall",
    "AtomicStall",
    "LoadVioReplayStall",
    "LoadMSHRReplayStall",
    "ControlRecoveryStall",
    "MemVioRecoveryStall",
    "OtherRecoveryStall",
    "FlushedInsts",
    "OtherCoreStall",
];

pub static XS_TOPDOWN: Lazy<Targets> = Lazy::new(|| {
    XS_STALLS
        .iter()
        .map(|stall| {
            xs_stat!(
                *stall,
                format!(r"{XS_PERF}{XS_CTRL_BLOCK}\.dispatch: {stall},\s+(\d+)")
            )
        })
        .collect()
});

/// Cache counters. The directory counters are dumped per slice, hence
/// the accumulate count of 4 banks.
pub static XS_CACHE: Lazy<Targets> = Lazy::new(|| {
    let mut targets = IndexMap::from_iter([
        xs_stat!(
            "l3_acc",
            format!(r"{XS_PERF}{XS_L3}\.slices_\d+\.directory: selfdir_A_req,\s+(\d+)"),
            4
        ),
        xs_stat!(
            "l3_hit",
            format!(r"{XS_PERF}{XS_L3}\.slices_\d+\.directory: selfdir_A_hit,\s+(\d+)"),
            4
        ),
        xs_stat!(
            "l2_acc",
            format!(r"{XS_PERF}{XS_L2}\.slices_\d+\.directory: selfdir_A_req,\s+(\d+)"),
            4
        ),
        xs_stat!(
            "l2_hit",
            format!(r"{XS_PERF}{XS_L2}\.slices_\d+\.directory: selfdir_A_hit,\s+(\d+)"),
            4
        ),
    ]);
    for load_pipeline in 0..2 {
        targets.extend([
            xs_stat!(
                format!("l1d_{load_pipeline}_miss"),
                format!(
                    r"{XS_PERF}{XS_CORE}\.memBlock\.inner.LoadUnit_{load_pipeline}: s2_dcache_miss_first_issue,\s+(\d+)"
                )
            ),
            xs_stat!(
                format!("l1d_{load_pipeline}_acc"),
                format!(
                    r"{XS_PERF}{XS_CORE}\.memBlock\.inner.LoadUnit_{load_pipeline}: s2_in_fire_first_issue,\s+(\d+)"
                )
            ),
        ]);
    }
    targets
});

pub static XS_MEM: Lazy<Targets> = Lazy::new(|| {
    IndexMap::from_iter([
        xs_stat!(
            "l3_bus_acq",
            format!(
                r"{XS_PERF}SimTop\.l_soc\.socMisc.busPMU: L3_Mem_L3_bank_0_D_channel_GrantData_fire,\s+(\d+)"
            )
        ),
        xs_stat!(
            "l3_bus_rel",
            format!(
                r"{XS_PERF}SimTop\.l_soc\.socMisc.busPMU: L3_Mem_L3_bank_0_C_channel_ReleaseData_fire,\s+(\d+)"
            )
        ),
    ])
});

/// Combines tables into one, first definition wins.
#[must_use]
pub fn merged(tables: &[&Targets]) -> Targets {
    let mut all = Targets::new();
    for table in tables {
        for (name, target) in table.iter() {
            all.entry(name.clone()).or_insert_with(|| target.clone());
        }
    }
    all
}
