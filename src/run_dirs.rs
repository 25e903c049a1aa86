use super::Error;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Locates the stats file of one run directory.
///
/// Accepts any `*stats.txt` name since configs prefix the dump file.
/// More than one candidate is ambiguous and rejected.
pub fn find_stats_file(dir: &Path) -> Result<Option<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .map(|name| name.to_string_lossy().ends_with("stats.txt"))
                    .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Ok(None),
        1 => Ok(Some(candidates.remove(0))),
        found => Err(Error::AmbiguousStatsFile {
            dir: dir.to_path_buf(),
            found,
        }),
    }
}

/// Walks a parent directory of `<bmk>_<point>` run dirs and maps each
/// to its stats file. Subdirectories without one are skipped,
/// `benchmarks` optionally filters on the part before the underscore.
pub fn scan(parent: &Path, benchmarks: Option<&[String]>) -> Result<IndexMap<String, PathBuf>, Error> {
    if !parent.is_dir() {
        return Err(Error::NotADirectory {
            path: parent.to_path_buf(),
        });
    }
    let mut entries: Vec<PathBuf> = std::fs::read_dir(parent)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    entries.sort();

    let mut found = IndexMap::new();
    for dir in entries {
        let Some(name) = dir.file_name().map(|name| name.to_string_lossy().to_string()) else {
            continue;
        };
        let bmk = name.split('_').next().unwrap_or(&name);
        if let Some(filter) = benchmarks {
            if !filter.iter().any(|b| b == bmk) {
                continue;
            }
        }
        match find_stats_file(&dir)? {
            Some(stat_file) => {
                found.insert(name, stat_file);
            }
            None => log::debug!("{}: no stats file", dir.display()),
        }
    }
    Ok(found)
}
