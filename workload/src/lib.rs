pub mod inputs;
pub mod makefile;
pub mod ramfs;
pub mod runscript;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Built-in SPEC CPU2006 descriptor table.
pub const SPEC2006: &str = include_str!("../benchmarks.yml");

pub const DEFAULT_ELF_SUFFIX: &str = "_base.riscv64-linux-gnu-gcc-9.3.0";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Fs(#[from] utils::fs::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown benchmark {0:?}")]
    UnknownBenchmark(String),

    #[error("benchmark {name:?} has no executable")]
    MissingExecutable { name: String },

    #[error("{path:?} is not a directory")]
    NotADirectory { path: PathBuf },
}

/// A file or directory a workload needs staged into the ramfs image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Resource {
    /// Staged under `/spec/<basename>`.
    File(PathBuf),
    /// Staged recursively under `/spec/<dir>/...`.
    Dir { dir: String, path: PathBuf },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Benchmark {
    pub executable: PathBuf,
    #[serde(default)]
    pub inputs: Vec<Resource>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Benchmark {
    /// Source path of the workload binary, ELF suffix appended.
    #[must_use]
    pub fn executable(&self, elf_suffix: &str) -> PathBuf {
        let mut path = self.executable.clone().into_os_string();
        path.push(elf_suffix);
        PathBuf::from(path)
    }

    /// Name the binary is staged under inside `/spec`.
    pub fn binary_name(&self, name: &str, elf_suffix: &str) -> Result<String, Error> {
        let executable = self.executable(elf_suffix);
        let binary = executable
            .file_name()
            .ok_or_else(|| Error::MissingExecutable {
                name: name.to_string(),
            })?;
        Ok(binary.to_string_lossy().to_string())
    }

    #[must_use]
    pub fn has_tags(&self, query: &HashSet<&str>) -> bool {
        let tags: HashSet<&str> = self.tags.iter().map(String::as_str).collect();
        query.is_subset(&tags)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Benchmarks {
    #[serde(default = "default_elf_suffix")]
    pub elf_suffix: String,
    pub benchmarks: IndexMap<String, Benchmark>,
}

fn default_elf_suffix() -> String {
    DEFAULT_ELF_SUFFIX.to_string()
}

impl Benchmarks {
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, Error> {
        let benches: Self = serde_yaml::from_reader(reader)?;
        Ok(benches)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_reader(utils::fs::open_readable(path)?)
    }

    /// The built-in SPEC CPU2006 table.
    pub fn spec2006() -> Result<Self, Error> {
        Self::from_reader(SPEC2006.as_bytes())
    }

    /// Resolves selectors to a sorted, deduplicated benchmark list.
    ///
    /// A selector is either an exact benchmark name or a comma-separated
    /// tag set matching every benchmark whose tags are a superset
    /// (`int,ref` selects all integer reference workloads). No selectors
    /// selects everything.
    pub fn select(&self, selectors: &[String]) -> Result<Vec<&str>, Error> {
        let mut selected: Vec<&str> = Vec::new();
        if selectors.is_empty() {
            selected.extend(self.benchmarks.keys().map(String::as_str));
        }
        for selector in selectors {
            if let Some((name, _)) = self.benchmarks.get_key_value(selector) {
                selected.push(name.as_str());
                continue;
            }
            let query: HashSet<&str> = selector.split(',').collect();
            let matches: Vec<&str> = self
                .benchmarks
                .iter()
                .filter(|(_, bench)| bench.has_tags(&query))
                .map(|(name, _)| name.as_str())
                .collect();
            if matches.is_empty() {
                return Err(Error::UnknownBenchmark(selector.clone()));
            }
            selected.extend(matches);
        }
        selected.sort_unstable();
        selected.dedup();
        Ok(selected)
    }

    pub fn get(&self, name: &str) -> Result<&Benchmark, Error> {
        self.benchmarks
            .get(name)
            .ok_or_else(|| Error::UnknownBenchmark(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Benchmarks, Resource};
    use color_eyre::eyre;
    use pretty_assertions_sorted::assert_eq;

    #[test]
    fn builtin_table_parses() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        assert_eq!(benches.benchmarks.len(), 56);
        assert_eq!(benches.elf_suffix, super::DEFAULT_ELF_SUFFIX);

        let astar = benches.get("astar_biglakes")?;
        assert_eq!(astar.args, vec!["BigLakes2048.cfg"]);
        assert_eq!(astar.inputs.len(), 2);
        Ok(())
    }

    #[test]
    fn executable_carries_elf_suffix() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        let mcf = benches.get("mcf")?;
        assert_eq!(
            mcf.binary_name("mcf", &benches.elf_suffix)?,
            "mcf_base.riscv64-linux-gnu-gcc-9.3.0"
        );
        Ok(())
    }

    #[test]
    fn directory_resources_deserialize() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        let gobmk = benches.get("gobmk_13x13")?;
        let dirs: Vec<&str> = gobmk
            .inputs
            .iter()
            .filter_map(|input| match input {
                Resource::Dir { dir, .. } => Some(dir.as_str()),
                Resource::File(_) => None,
            })
            .collect();
        assert_eq!(dirs, vec!["games", "golois"]);
        Ok(())
    }

    #[test]
    fn tag_query_selects_superset_matches() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;

        let ints = benches.select(&["int,ref".to_string()])?;
        assert!(ints.contains(&"mcf"));
        assert!(!ints.contains(&"bwaves"));

        let test_only = benches.select(&["test".to_string()])?;
        assert_eq!(test_only, vec!["gamess_exam29"]);
        Ok(())
    }

    #[test]
    fn selection_is_sorted_and_deduplicated() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        let selected = benches.select(&["mcf".to_string(), "int,ref".to_string()])?;
        let mut sorted = selected.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(selected, sorted);
        Ok(())
    }

    #[test]
    fn selection_borrows_the_table_not_the_selectors() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        let selected = {
            let selectors = vec!["mcf".to_string(), "soplex_pds-50".to_string()];
            benches.select(&selectors)?
        };
        // selectors are gone, the selection must still be usable
        assert_eq!(selected, vec!["mcf", "soplex_pds-50"]);
        Ok(())
    }

    #[test]
    fn unknown_selector_is_an_error() {
        let benches = Benchmarks::spec2006().unwrap();
        assert!(benches.select(&["no_such_bench".to_string()]).is_err());
    }
}
