//! Metrics computed from scraped counters, added to the value map
//! under their report names.

use super::Values;

fn get(values: &Values, key: &str) -> f64 {
    values.get(key).copied().unwrap_or(0.0)
}

pub fn add_ipc(values: &mut Values) {
    let sim = stats::Sim {
        instructions: get(values, "Insts") as u64,
        cycles: get(values, "Cycles") as u64,
    };
    if sim.cycles > 0 {
        values.insert("ipc".to_string(), sim.ipc());
    }
    if sim.instructions > 0 {
        values.insert("cpi".to_string(), sim.cpi());
    }
}

pub fn xs_add_ipc(values: &mut Values) {
    let sim = stats::Sim {
        instructions: get(values, "commitInstr") as u64,
        cycles: get(values, "total_cycles") as u64,
    };
    values.insert("ipc".to_string(), sim.ipc());
    values.insert("cpi".to_string(), sim.cpi());
}

pub fn add_branch_mispred(values: &mut Values) {
    let branch = stats::Branch {
        branches: get(values, "branches") as u64,
        mispredicts: get(values, "branchMispredicts") as u64,
        indirect_mispredicts: get(values, "indirectMispred") as u64,
    };
    let insts = get(values, "Insts") as u64;
    if branch.branches > 0 {
        values.insert("mispredict rate".to_string(), branch.mispredict_rate());
    }
    if insts > 0 {
        values.insert("total branch MPKI".to_string(), branch.total_mpki(insts));
        values.insert(
            "indirect branch MPKI".to_string(),
            branch.indirect_mpki(insts),
        );
        values.insert("direct branch MPKI".to_string(), branch.direct_mpki(insts));
    }
}

pub fn xs_add_branch_mispred(values: &mut Values) {
    let mispred = get(values, "BpBWrong") + get(values, "BpJWrong") + get(values, "BpIWrong");
    let branches = get(values, "BpInstr");
    let insts = get(values, "commitInstr");
    if branches > 0.0 {
        values.insert("mispredict rate".to_string(), mispred / branches);
    }
    if insts > 0.0 {
        values.insert(
            "total branch MPKI".to_string(),
            stats::branch::mpki(mispred as u64, insts as u64),
        );
    }
}

/// Demand MPKI per cache level. Prefetcher-induced traffic is carved
/// out so the data MPKI reflects program misses only.
pub fn add_cache_mpki(values: &mut Values) {
    let insts = get(values, "Insts") as u64;
    if insts == 0 {
        return;
    }

    let l1d = stats::Cache {
        misses: get(values, "dcache_miss") as u64,
        prefetch_misses: get(values, "dcache_miss_pref") as u64,
        ..stats::Cache::default()
    };
    values.insert("l1d.data.MPKI".to_string(), l1d.data_mpki(insts));

    let l2 = stats::Cache {
        misses: get(values, "l2_miss") as u64,
        prefetch_misses: get(values, "l2_miss_l1d_pref") as u64,
        ..stats::Cache::default()
    };
    values.insert("l2.overall.MPKI".to_string(), l2.overall_mpki(insts));
    values.insert("l2.data.MPKI".to_string(), l2.data_mpki(insts));

    let l3 = stats::Cache {
        misses: get(values, "l3_miss") as u64,
        prefetch_misses: (get(values, "l3_miss_l2_pref") + get(values, "l3_miss_l1d_pref"))
            as u64,
        ..stats::Cache::default()
    };
    values.insert("l3.data.MPKI".to_string(), l3.data_mpki(insts));
}

pub fn xs_add_cache_mpki(values: &mut Values) {
    let insts = get(values, "commitInstr") as u64;
    if insts == 0 {
        return;
    }

    let l1d_miss = (get(values, "l1d_0_miss") + get(values, "l1d_1_miss")) as u64;
    values.insert("l1d.MPKI".to_string(), stats::branch::mpki(l1d_miss, insts));

    // the directory counters only report accesses and hits
    for level in [stats::Level::L2, stats::Level::L3] {
        let name: &'static str = level.into();
        let accesses = get(values, &format!("{name}_acc"));
        let hits = get(values, &format!("{name}_hit"));
        let cache = stats::Cache {
            accesses: accesses as u64,
            misses: (accesses - hits) as u64,
            ..stats::Cache::default()
        };
        values.insert(format!("{name}.overall.MPKI"), cache.overall_mpki(insts));
    }
}

const BYTES_PER_BEAT: f64 = 32.0;
const XS_CLOCK_HZ: f64 = 3e9;

/// DRAM bandwidth from the L3 bus PMU grant/release beat counters.
pub fn xs_add_mem_bw(values: &mut Values) {
    let cycles = get(values, "total_cycles");
    if cycles <= 0.0 {
        return;
    }
    let read_bytes = get(values, "l3_bus_acq") * BYTES_PER_BEAT;
    let write_bytes = get(values, "l3_bus_rel") * BYTES_PER_BEAT;
    values.insert("DRAM read Bytes".to_string(), read_bytes);
    values.insert("DRAM write Bytes".to_string(), write_bytes);
    values.insert(
        "DRAM read MBytes/s".to_string(),
        read_bytes / cycles / 1024.0 / 1024.0 * XS_CLOCK_HZ,
    );
    values.insert(
        "DRAM total MBytes/s".to_string(),
        (read_bytes + write_bytes) / cycles / 1024.0 / 1024.0 * XS_CLOCK_HZ,
    );
}

/// Memory bus traffic of a gem5 run, derived from the membus
/// transaction distribution (64 byte lines).
pub fn add_mem_bw(values: &mut Values) {
    let to_mc_total =
        get(values, "WritebackDirty") + get(values, "ReadResp") + get(values, "ReadExResp");
    let mb = to_mc_total * 64.0 / 1024.0 / 1024.0;
    values.insert("Mem_MB".to_string(), mb);
    let seconds = get(values, "Sec");
    if seconds > 0.0 {
        values.insert("BW_MB/s".to_string(), mb / seconds);
    }
}

#[cfg(test)]
mod tests {
    use crate::Values;
    use pretty_assertions_sorted::assert_eq;

    #[test]
    fn branch_mpki_splits_add_up() {
        let mut values = Values::from_iter([
            ("branches".to_string(), 1000.0),
            ("branchMispredicts".to_string(), 30.0),
            ("indirectMispred".to_string(), 10.0),
            ("Insts".to_string(), 10_000.0),
        ]);
        super::add_branch_mispred(&mut values);
        assert_eq!(values["mispredict rate"], 0.03);
        assert_eq!(values["total branch MPKI"], 3.0);
        assert_eq!(
            values["total branch MPKI"],
            values["direct branch MPKI"] + values["indirect branch MPKI"]
        );
    }

    #[test]
    fn cache_mpki_excludes_prefetch_misses() {
        let mut values = Values::from_iter([
            ("Insts".to_string(), 1_000_000.0),
            ("l2_miss".to_string(), 3000.0),
            ("l2_miss_l1d_pref".to_string(), 1000.0),
            ("l3_miss".to_string(), 500.0),
            ("l3_miss_l2_pref".to_string(), 100.0),
            ("l3_miss_l1d_pref".to_string(), 100.0),
            ("dcache_miss".to_string(), 10_000.0),
        ]);
        super::add_cache_mpki(&mut values);
        assert_eq!(values["l2.overall.MPKI"], 3.0);
        assert_eq!(values["l2.data.MPKI"], 2.0);
        assert_eq!(values["l3.data.MPKI"], 0.3);
        assert_eq!(values["l1d.data.MPKI"], 10.0);
    }

    #[test]
    fn xs_dram_bandwidth_scales_with_beat_size() {
        let mut values = Values::from_iter([
            ("total_cycles".to_string(), 3e9),
            ("l3_bus_acq".to_string(), 1024.0 * 1024.0),
            ("l3_bus_rel".to_string(), 0.0),
        ]);
        super::xs_add_mem_bw(&mut values);
        assert_eq!(values["DRAM read Bytes"], 32.0 * 1024.0 * 1024.0);
        // one second of simulated time at 3 GHz
        assert_eq!(values["DRAM read MBytes/s"], 32.0);
        assert_eq!(values["DRAM total MBytes/s"], 32.0);
    }

    #[test]
    fn xs_ipc_tolerates_missing_cycles() {
        let mut values = Values::from_iter([("commitInstr".to_string(), 100.0)]);
        super::xs_add_ipc(&mut values);
        assert_eq!(values["ipc"], 0.0);
    }
}
