use super::read::BufReadLine;
use super::targets::Targets;
use super::{Error, Values};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

pub const BEGIN_MARKER: &str = "---------- Begin Simulation Statistics ----------";
pub const END_MARKER: &str = "---------- End Simulation Statistics   ----------";

fn to_num(text: &str) -> Result<f64, Error> {
    text.parse().map_err(|_| Error::ParseValue {
        value: text.to_string(),
    })
}

/// Collects the lines of the last stat dump by reading the file in
/// reverse until the begin marker.
///
/// gem5 appends one dump per stat interval; for a finished simpoint run
/// only the final dump matters. Returns the lines in reverse order,
/// which is irrelevant for regex scraping.
pub fn last_chunk(reader: impl std::io::Read + std::io::Seek) -> Result<Vec<String>, Error> {
    let mut reverse_reader = rev_buf_reader::RevBufReader::new(reader);
    let mut buffer = String::new();
    let mut lines = Vec::new();
    while let Some(line) = reverse_reader.read_line(&mut buffer) {
        let line = line?;
        if line.starts_with(BEGIN_MARKER) {
            return Ok(lines);
        }
        lines.push(line.trim_end().to_string());
    }
    // no marker at all: treat the whole file as one dump
    Ok(lines)
}

static COMMITTED_INSTS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"cpus?\.committedInsts\s+(\d+)\s+#").unwrap());

/// Splits a stat file into its dump chunks, keyed by the cumulative
/// committed instruction count (rounded to hundreds) at the end of each
/// chunk. `initial_insts` is the instruction count the checkpoint was
/// taken at.
pub fn chunks(
    reader: impl std::io::BufRead,
    initial_insts: u64,
) -> Result<indexmap::IndexMap<u64, Vec<String>>, Error> {
    let mut chunks = indexmap::IndexMap::new();
    let mut buff = Vec::new();
    let mut insts = initial_insts;
    for line in reader.lines() {
        let line = line?;
        if line.starts_with(END_MARKER) {
            buff.push(line);
            chunks.insert(insts, std::mem::take(&mut buff));
            continue;
        }
        if let Some(m) = COMMITTED_INSTS_REGEX.captures(&line) {
            let committed: u64 = m[1].parse().map_err(|_| Error::ParseValue {
                value: m[1].to_string(),
            })?;
            insts += committed;
            // round to hundreds, checkpoint intervals are not exact
            insts = (insts + 50) / 100 * 100;
        }
        buff.push(line);
    }
    Ok(chunks)
}

static DIR_INSTS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d+)/.*\.txt").unwrap());

/// Instruction count a checkpoint was taken at, encoded in the run
/// directory layout (`.../<insts>/m5out/stats.txt`).
#[must_use]
pub fn insts_from_path(path: &Path) -> Option<u64> {
    let text = path.to_string_lossy();
    DIR_INSTS_REGEX
        .captures(&text)
        .and_then(|m| m[1].parse().ok())
}

/// Applies the gem5 target table to a set of stat lines. Each regex
/// already carries the value capture group; the last match wins.
#[must_use]
pub fn scrape_gem5_lines<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    targets: &Targets,
) -> Values {
    let mut values = Values::new();
    for line in lines {
        for (name, target) in targets {
            if let Some(m) = target.regex.captures(line) {
                if let Ok(value) = to_num(&m[1]) {
                    values.insert(name.clone(), value);
                }
            }
        }
    }
    values
}

/// Scrapes the last dump chunk of a gem5 stats file.
pub fn scrape_gem5(path: &Path, targets: &Targets) -> Result<Values, Error> {
    let file = std::fs::OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|source| Error::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
    let lines = last_chunk(file)?;
    let values = scrape_gem5_lines(lines.iter().map(String::as_str), targets);
    for name in targets.keys() {
        if !values.contains_key(name) {
            log::warn!("{}: stat {name} not found", path.display());
        }
    }
    Ok(values)
}

/// Scrapes every dump chunk of a gem5 stats file, keyed by cumulative
/// committed instructions. The starting count is taken from the
/// checkpoint directory layout when present.
pub fn scrape_gem5_chunks(
    path: &Path,
    targets: &Targets,
) -> Result<indexmap::IndexMap<u64, Values>, Error> {
    let initial_insts = insts_from_path(path).unwrap_or(0);
    let file = std::fs::OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|source| Error::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
    let chunks = chunks(std::io::BufReader::new(file), initial_insts)?;
    Ok(chunks
        .into_iter()
        .map(|(insts, lines)| {
            let values = scrape_gem5_lines(lines.iter().map(String::as_str), targets);
            (insts, values)
        })
        .collect())
}

/// Scrapes a Xiangshan performance counter log.
///
/// Plain targets keep the last match. Accumulate targets collect every
/// match and sum the last N, which folds the per-bank dumps of a
/// counter into one value. Unlike the gem5 path, a log missing any
/// target is rejected wholesale since the counters are only meaningful
/// as a complete set.
pub fn scrape_xs(path: &Path, targets: &Targets) -> Result<Values, Error> {
    let file = utils::fs::open_readable(path)?;
    let mut values = Values::new();
    let mut accumulated: indexmap::IndexMap<&str, Vec<f64>> = targets
        .iter()
        .filter(|(_, target)| target.accumulate.is_some())
        .map(|(name, _)| (name.as_str(), Vec::new()))
        .collect();

    let mut buffer = String::new();
    let mut reader = file;
    while let Some(line) = reader.read_line(&mut buffer) {
        let line: &str = line?;
        for (name, target) in targets {
            let Some(m) = target.regex.captures(line) else {
                continue;
            };
            let value = to_num(&m[1])?;
            match accumulated.get_mut(name.as_str()) {
                Some(matches) => matches.push(value),
                None => {
                    values.insert(name.clone(), value);
                }
            }
            break;
        }
    }

    for (name, matches) in accumulated {
        let count = targets[name].accumulate.unwrap_or(1);
        let tail = matches.len().saturating_sub(count);
        values.insert(name.to_string(), matches[tail..].iter().sum());
    }

    let missing: Vec<String> = targets
        .keys()
        .filter(|name| !values.contains_key(*name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingStats {
            path: path.to_path_buf(),
            missing,
        });
    }
    Ok(values)
}
