use super::Error;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `nnn.name` SPEC testcase directories, e.g. `505.mcf_r`.
pub static TESTCASE_DIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}\.[A-Za-z0-9_]+").unwrap());

/// Builds the `<size>-cmp` Makefile targets for one testcase directory.
///
/// Every `data/<size>` subtree except `all` and the speed sizes gets a
/// target diffing each reference output file against `$(RUN_DIR)`. The
/// first line is empty so the fragment can be appended to an existing
/// Makefile.
pub fn compare_fragment(testcase_dir: &Path) -> Result<Vec<String>, Error> {
    let data_dir = testcase_dir.join("data");
    if !data_dir.is_dir() {
        return Err(Error::NotADirectory { path: data_dir });
    }

    let mut lines = vec![String::new()];
    for size in sorted_entries(&data_dir)? {
        let size_name = size.file_name().map(|n| n.to_string_lossy().to_string());
        let Some(size_name) = size_name else { continue };
        if size_name == "all" || size_name.ends_with("speed") {
            continue;
        }
        let output_dir = size.join("output");
        if !output_dir.is_dir() {
            log::warn!("{}: no reference outputs", output_dir.display());
            continue;
        }
        let outputs: Vec<String> = sorted_entries(&output_dir)?
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect();

        lines.push(format!("{size_name}-cmp:"));
        lines.push(format!("\t@for f in {}; do \\", outputs.join(" ")));
        lines.push(format!(
            "\t\t$(DIFF) $(RUN_DIR)/$$f data/{size_name}/output/$$f; \\"
        ));
        lines.push("\tdone".to_string());
    }
    Ok(lines)
}

/// Appends compare targets to the Makefile of every testcase directory
/// under `root`. Returns the Makefiles written.
pub fn append_compare_targets(root: &Path) -> Result<Vec<PathBuf>, Error> {
    if !root.is_dir() {
        return Err(Error::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    let mut written = Vec::new();
    for entry in sorted_entries(root)? {
        let name = entry.file_name().map(|n| n.to_string_lossy().to_string());
        let Some(name) = name else { continue };
        if !entry.is_dir() || !TESTCASE_DIR.is_match(&name) {
            continue;
        }
        let fragment = compare_fragment(&entry)?;
        let makefile = entry.join("Makefile");
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&makefile)?;
        write!(file, "{}", fragment.join("\n"))?;
        written.push(makefile);
    }
    Ok(written)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<_, std::io::Error>>()?;
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use color_eyre::eyre;
    use pretty_assertions_sorted::assert_eq;
    use std::path::Path;

    fn fake_testcase(dir: &Path) -> eyre::Result<()> {
        for (size, outputs) in [
            ("refrate", vec!["inp.out", "mcf.out"]),
            ("test", vec!["inp.out"]),
            ("all", vec!["shared.out"]),
            ("refspeed", vec!["inp.out"]),
        ] {
            let output_dir = dir.join("data").join(size).join("output");
            std::fs::create_dir_all(&output_dir)?;
            for output in outputs {
                std::fs::write(output_dir.join(output), "x")?;
            }
        }
        Ok(())
    }

    #[test]
    fn testcase_dir_pattern() {
        assert!(super::TESTCASE_DIR.is_match("505.mcf_r"));
        assert!(super::TESTCASE_DIR.is_match("619.lbm_s"));
        assert!(!super::TESTCASE_DIR.is_match("Docs"));
        assert!(!super::TESTCASE_DIR.is_match("5.mcf"));
    }

    #[test]
    fn fragment_skips_all_and_speed_sizes() -> eyre::Result<()> {
        let root = std::env::temp_dir().join("makefile-fragment-test");
        let _ = std::fs::remove_dir_all(&root);
        fake_testcase(&root)?;

        let lines = super::compare_fragment(&root)?;
        assert_eq!(
            lines,
            vec![
                "".to_string(),
                "refrate-cmp:".to_string(),
                "\t@for f in inp.out mcf.out; do \\".to_string(),
                "\t\t$(DIFF) $(RUN_DIR)/$$f data/refrate/output/$$f; \\".to_string(),
                "\tdone".to_string(),
                "test-cmp:".to_string(),
                "\t@for f in inp.out; do \\".to_string(),
                "\t\t$(DIFF) $(RUN_DIR)/$$f data/test/output/$$f; \\".to_string(),
                "\tdone".to_string(),
            ]
        );
        std::fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn appends_to_existing_makefiles() -> eyre::Result<()> {
        let root = std::env::temp_dir().join("makefile-append-test");
        let _ = std::fs::remove_dir_all(&root);
        let testcase = root.join("505.mcf_r");
        fake_testcase(&testcase)?;
        std::fs::create_dir_all(root.join("Docs"))?;
        std::fs::write(testcase.join("Makefile"), "include ../Makefile.common\n")?;

        let written = super::append_compare_targets(&root)?;
        assert_eq!(written, vec![testcase.join("Makefile")]);

        let contents = std::fs::read_to_string(testcase.join("Makefile"))?;
        assert!(contents.starts_with("include ../Makefile.common\n"));
        assert!(contents.contains("refrate-cmp:"));
        assert!(!contents.contains("all-cmp:"));
        assert!(!contents.contains("refspeed-cmp:"));

        std::fs::remove_dir_all(&root)?;
        Ok(())
    }
}
