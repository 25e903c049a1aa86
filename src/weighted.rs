//! Simpoint-weighted aggregation over per-slice checkpoint runs.

use super::report::Row;
use super::targets::Targets;
use super::{parse, Error, Values};
use indexmap::IndexMap;
use std::io::BufRead;
use std::path::Path;

/// SPEC CPU2017 reporting order.
pub const BENCHMARK_ORDER: &[&str] = &[
    "perlbench",
    "gcc",
    "mcf",
    "omnetpp",
    "xalancbmk",
    "x264",
    "deepsjeng",
    "leela",
    "exchange2",
    "xz",
    "bwaves",
    "cactuBSSN",
    "namd",
    "parest",
    "povray",
    "lbm",
    "wrf",
    "blender",
    "cam4",
    "imagick",
    "nab",
    "fotonik3d",
    "roms",
];

/// Parses a `simpoints0` file: `<slice> <index>` per line, returning
/// index to slice id.
pub fn parse_simpoints(reader: impl BufRead) -> Result<IndexMap<u64, String>, Error> {
    let mut mapping = IndexMap::new();
    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let (Some(slice), Some(index)) = (parts.next(), parts.next()) {
            let index: u64 = index.parse().map_err(|_| Error::ParseValue {
                value: index.to_string(),
            })?;
            mapping.insert(index, slice.to_string());
        }
    }
    Ok(mapping)
}

/// Parses a `weights0` file: `<weight> <index>` per line, returning
/// index to weight.
pub fn parse_weights(reader: impl BufRead) -> Result<IndexMap<u64, f64>, Error> {
    let mut weights = IndexMap::new();
    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let (Some(weight), Some(index)) = (parts.next(), parts.next()) {
            let weight: f64 = weight.parse().map_err(|_| Error::ParseValue {
                value: weight.to_string(),
            })?;
            let index: u64 = index.parse().map_err(|_| Error::ParseValue {
                value: index.to_string(),
            })?;
            weights.insert(index, weight);
        }
    }
    Ok(weights)
}

/// Weighted sum of each target metric over the slices of one benchmark.
///
/// Slice runs live under `<input_dir>/<bmk>/<bmk>_<slice>/m5out/stats.txt`,
/// the clustering output under `<weight_dir>/<bmk>/cluster/bbl/`.
/// Returns `None` when the clustering files are absent; slices without a
/// stats file are skipped with a warning, their weight is lost.
pub fn weighted_stats(
    input_dir: &Path,
    weight_dir: &Path,
    bmk: &str,
    targets: &Targets,
) -> Result<Option<Values>, Error> {
    let cluster_dir = weight_dir.join(bmk).join("cluster").join("bbl");
    let simpoint_file = cluster_dir.join("simpoints0");
    let weight_file = cluster_dir.join("weights0");
    if !simpoint_file.is_file() || !weight_file.is_file() {
        return Ok(None);
    }

    let mapping = parse_simpoints(utils::fs::open_readable(&simpoint_file)?)?;
    let weights = parse_weights(utils::fs::open_readable(&weight_file)?)?;

    let mut sums = Values::new();
    for (index, slice) in &mapping {
        let weight = weights.get(index).copied().unwrap_or(0.0);
        let stat_file = input_dir
            .join(bmk)
            .join(format!("{bmk}_{slice}"))
            .join("m5out")
            .join("stats.txt");
        if !stat_file.is_file() {
            log::warn!("{bmk}: slice {slice} has no stats file, skipping");
            continue;
        }
        let values = parse::scrape_gem5(&stat_file, targets)?;
        for (name, value) in values {
            *sums.entry(name).or_insert(0.0) += value * weight;
        }
    }
    Ok(Some(sums))
}

/// One row per benchmark in the fixed SPEC2017 order.
pub fn collect(input_dir: &Path, weight_dir: &Path, targets: &Targets) -> Result<Vec<Row>, Error> {
    let mut rows = Vec::new();
    for bmk in BENCHMARK_ORDER {
        let mut row = Row::default();
        row.labels
            .insert("Benchmark".to_string(), (*bmk).to_string());
        match weighted_stats(input_dir, weight_dir, bmk, targets)? {
            Some(sums) => {
                for (name, value) in sums {
                    row.values.insert(format!("Weighted {name}"), value);
                }
            }
            None => log::warn!("{bmk}: no clustering output, row left empty"),
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use crate::targets;
    use color_eyre::eyre;
    use pretty_assertions_sorted::assert_eq;
    use std::path::Path;

    fn write_slice(root: &Path, bmk: &str, slice: &str, ipc: f64) -> eyre::Result<()> {
        let dir = root.join(bmk).join(format!("{bmk}_{slice}")).join("m5out");
        std::fs::create_dir_all(&dir)?;
        std::fs::write(
            dir.join("stats.txt"),
            format!(
                "---------- Begin Simulation Statistics ----------\n\
                 system.cpu.ipc                               {ipc}  # IPC\n\
                 system.cpu.committedInsts                    100  # insts\n\
                 system.cpu.numCycles                         200  # cycles\n\
                 ---------- End Simulation Statistics   ----------\n"
            ),
        )?;
        Ok(())
    }

    #[test]
    fn weighted_sum_matches_hand_computation() -> eyre::Result<()> {
        let root = std::env::temp_dir().join("weighted-sum-test");
        let _ = std::fs::remove_dir_all(&root);
        let input_dir = root.join("runs");
        let weight_dir = root.join("checkpoints");

        let cluster = weight_dir.join("mcf/cluster/bbl");
        std::fs::create_dir_all(&cluster)?;
        std::fs::write(cluster.join("simpoints0"), "17 0\n42 1\n")?;
        std::fs::write(cluster.join("weights0"), "0.6 0\n0.4 1\n")?;
        write_slice(&input_dir, "mcf", "17", 2.0)?;
        write_slice(&input_dir, "mcf", "42", 1.0)?;

        let sums =
            super::weighted_stats(&input_dir, &weight_dir, "mcf", &targets::BRIEF)?.unwrap();
        assert_eq!(sums["ipc"], 2.0 * 0.6 + 1.0 * 0.4);
        assert_eq!(sums["Insts"], 100.0);

        std::fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn missing_slice_loses_its_weight() -> eyre::Result<()> {
        let root = std::env::temp_dir().join("weighted-missing-test");
        let _ = std::fs::remove_dir_all(&root);
        let input_dir = root.join("runs");
        let weight_dir = root.join("checkpoints");

        let cluster = weight_dir.join("mcf/cluster/bbl");
        std::fs::create_dir_all(&cluster)?;
        std::fs::write(cluster.join("simpoints0"), "17 0\n42 1\n")?;
        std::fs::write(cluster.join("weights0"), "0.6 0\n0.4 1\n")?;
        write_slice(&input_dir, "mcf", "17", 2.0)?;

        let sums =
            super::weighted_stats(&input_dir, &weight_dir, "mcf", &targets::BRIEF)?.unwrap();
        assert_eq!(sums["ipc"], 2.0 * 0.6);

        std::fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn collect_keeps_the_reporting_order() -> eyre::Result<()> {
        let root = std::env::temp_dir().join("weighted-order-test");
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root)?;

        let rows = super::collect(&root.join("runs"), &root.join("ckpt"), &targets::BRIEF)?;
        let names: Vec<&str> = rows
            .iter()
            .map(|row| row.labels["Benchmark"].as_str())
            .collect();
        assert_eq!(names, super::BENCHMARK_ORDER.to_vec());

        std::fs::remove_dir_all(&root)?;
        Ok(())
    }
}
