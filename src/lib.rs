pub mod derive;
pub mod parse;
pub mod read;
pub mod report;
pub mod run_dirs;
pub mod targets;
pub mod topdown;
pub mod weighted;

use std::path::PathBuf;

/// Scraped metric values, keyed by target name in table order.
pub type Values = indexmap::IndexMap<String, f64>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Fs(#[from] utils::fs::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("could not open {path:?}")]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse numeric value {value:?}")]
    ParseValue { value: String },

    #[error("{path:?} is missing stats {missing:?}")]
    MissingStats {
        path: PathBuf,
        missing: Vec<String>,
    },

    #[error("{dir:?} contains {found} stats files, expected exactly one")]
    AmbiguousStatsFile { dir: PathBuf, found: usize },

    #[error("{path:?} is not a directory")]
    NotADirectory { path: PathBuf },
}
