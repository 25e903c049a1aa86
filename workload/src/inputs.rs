use super::Error;
use std::path::{Path, PathBuf};

pub const COMPLETION_MARKER: &str = ".copy_complete";

/// Outcome of staging one benchmark's inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged {
    /// Short name, e.g. `mcf` for `505.mcf_r`.
    pub name: String,
    pub copied: usize,
    pub skipped: bool,
}

/// Stages run inputs for every rate benchmark under `source_root`
/// (a `benchspec/CPU` tree) into `<target_root>/<name>/`.
///
/// The `data/all/input` and `data/refrate/input` trees are copied with
/// their directory structure preserved. A completion marker is dropped
/// after a successful copy so re-runs skip finished benchmarks.
pub fn stage_all(source_root: &Path, target_root: &Path) -> Result<Vec<Staged>, Error> {
    if !source_root.is_dir() {
        return Err(Error::NotADirectory {
            path: source_root.to_path_buf(),
        });
    }
    let mut entries: Vec<PathBuf> = std::fs::read_dir(source_root)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<_, std::io::Error>>()?;
    entries.sort();

    let mut staged = Vec::new();
    for benchmark_dir in entries {
        if !benchmark_dir.is_dir() {
            continue;
        }
        if let Some(outcome) = stage_benchmark(&benchmark_dir, target_root)? {
            staged.push(outcome);
        }
    }
    Ok(staged)
}

/// Stages a single `<nnn>.<name>_r` benchmark directory.
/// Returns `None` for directories that are not rate benchmarks or
/// carry no `data/` tree.
pub fn stage_benchmark(benchmark_dir: &Path, target_root: &Path) -> Result<Option<Staged>, Error> {
    let dir_name = benchmark_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    if !dir_name.ends_with("_r") {
        return Ok(None);
    }
    let Some((_, suffixed)) = dir_name.split_once('.') else {
        return Ok(None);
    };
    let name = suffixed.replace("_r", "");

    let target_dir = target_root.join(&name);
    if target_dir.join(COMPLETION_MARKER).exists() {
        log::info!("{dir_name}: inputs already staged, skipping");
        return Ok(Some(Staged {
            name,
            copied: 0,
            skipped: true,
        }));
    }

    let data_dir = benchmark_dir.join("data");
    if !data_dir.is_dir() {
        log::warn!("{dir_name}: no data directory, nothing to stage");
        return Ok(None);
    }

    let mut copied = 0;
    for subdir in ["all", "refrate"] {
        let input_dir = data_dir.join(subdir).join("input");
        if input_dir.is_dir() {
            copied += copy_tree(&input_dir, &target_dir)?;
        }
    }

    if copied == 0 {
        log::warn!("{dir_name}: no input files found");
        return Ok(None);
    }
    std::fs::write(target_dir.join(COMPLETION_MARKER), "Copy completed.\n")?;
    log::info!("{dir_name}: staged {copied} input files");
    Ok(Some(Staged {
        name,
        copied,
        skipped: false,
    }))
}

/// Recursively copies `src` into `dst`, creating directories as needed.
/// Returns the number of files copied.
fn copy_tree(src: &Path, dst: &Path) -> Result<usize, Error> {
    utils::fs::create_dirs(dst)?;
    let mut copied = 0;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use color_eyre::eyre;
    use std::path::Path;

    fn fake_benchspec(root: &Path) -> eyre::Result<()> {
        let mcf = root.join("505.mcf_r/data/refrate/input");
        std::fs::create_dir_all(&mcf)?;
        std::fs::write(mcf.join("inp.in"), "x")?;

        let gcc_all = root.join("502.gcc_r/data/all/input/nested");
        std::fs::create_dir_all(&gcc_all)?;
        std::fs::write(gcc_all.join("ref32.c"), "x")?;
        let gcc_ref = root.join("502.gcc_r/data/refrate/input");
        std::fs::create_dir_all(&gcc_ref)?;
        std::fs::write(gcc_ref.join("gcc-pp.c"), "x")?;

        // speed-only benchmark and a stray dir, both ignored
        std::fs::create_dir_all(root.join("605.mcf_s/data/refspeed/input"))?;
        std::fs::create_dir_all(root.join("Docs"))?;
        Ok(())
    }

    #[test]
    fn stages_all_and_refrate_inputs() -> eyre::Result<()> {
        let root = std::env::temp_dir().join("inputs-stage-test");
        let _ = std::fs::remove_dir_all(&root);
        let source = root.join("benchspec/CPU");
        let target = root.join("spec2017_run_dir");
        fake_benchspec(&source)?;

        let staged = super::stage_all(&source, &target)?;
        let names: Vec<&str> = staged.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["gcc", "mcf"]);

        assert!(target.join("mcf/inp.in").is_file());
        assert!(target.join("gcc/nested/ref32.c").is_file());
        assert!(target.join("gcc/gcc-pp.c").is_file());
        assert!(target.join("mcf").join(super::COMPLETION_MARKER).is_file());
        assert!(!target.join("mcf_s").exists());

        std::fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn second_run_skips_completed_benchmarks() -> eyre::Result<()> {
        let root = std::env::temp_dir().join("inputs-marker-test");
        let _ = std::fs::remove_dir_all(&root);
        let source = root.join("benchspec/CPU");
        let target = root.join("spec2017_run_dir");
        fake_benchspec(&source)?;

        super::stage_all(&source, &target)?;
        let again = super::stage_all(&source, &target)?;
        assert!(again.iter().all(|s| s.skipped && s.copied == 0));

        std::fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn missing_data_dir_is_not_an_error() -> eyre::Result<()> {
        let root = std::env::temp_dir().join("inputs-nodata-test");
        let _ = std::fs::remove_dir_all(&root);
        let source = root.join("benchspec/CPU");
        std::fs::create_dir_all(source.join("500.perlbench_r"))?;

        let staged = super::stage_all(&source, &root.join("out"))?;
        assert!(staged.is_empty());

        std::fs::remove_dir_all(&root)?;
        Ok(())
    }
}
