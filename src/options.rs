use clap::Parser;
use std::path::PathBuf;

/// Which simulator produced the file being scraped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    #[default]
    Gem5,
    Xs,
}

/// Named target table groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Table {
    Brief,
    Branch,
    Cache,
    Icache,
    Mem,
    Topdown,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct Scrape {
    #[clap(help = "stats file (gem5 stats.txt or Xiangshan simulator log)")]
    pub stat_file: PathBuf,

    #[clap(long = "format", value_enum, default_value = "gem5", help = "input format")]
    pub format: Format,

    #[clap(
        short = 't',
        long = "table",
        value_enum,
        help = "target tables to scrape (default: brief)"
    )]
    pub tables: Vec<Table>,

    #[clap(
        long = "all-chunks",
        help = "scrape every dump chunk instead of the last one (gem5 only)"
    )]
    pub all_chunks: bool,

    #[clap(short = 'o', long = "output", help = "write a one-row CSV instead of stdout")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct Collect {
    #[clap(help = "parent directory of <bmk>_<point> run directories")]
    pub parent: PathBuf,

    #[clap(long = "format", value_enum, default_value = "gem5", help = "input format")]
    pub format: Format,

    #[clap(
        short = 't',
        long = "table",
        value_enum,
        help = "target tables to scrape (default: brief)"
    )]
    pub tables: Vec<Table>,

    #[clap(short = 'b', long = "bench", help = "only these benchmarks")]
    pub benchmarks: Vec<String>,

    #[clap(short = 'o', long = "output", help = "output CSV path")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct Weighted {
    #[clap(help = "directory of per-benchmark run directories")]
    pub input_dir: PathBuf,

    #[clap(help = "directory of per-benchmark clustering output (simpoints0/weights0)")]
    pub weight_dir: PathBuf,

    #[clap(
        short = 't',
        long = "table",
        value_enum,
        help = "target tables to aggregate (default: brief)"
    )]
    pub tables: Vec<Table>,

    #[clap(short = 'o', long = "output", help = "output CSV path")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct Topdown {
    #[clap(help = "CSV of fine-grained stall columns, one row per workload")]
    pub input: PathBuf,

    #[clap(long = "format", value_enum, default_value = "gem5", help = "stall naming scheme")]
    pub format: Format,

    #[clap(long = "percent", help = "report buckets as percentages of total slots")]
    pub percent: bool,

    #[clap(
        long = "instructions",
        help = "slice instruction count; caps the Base bucket and attributes the excess to BadSpec"
    )]
    pub instructions: Option<u64>,

    #[clap(short = 'o', long = "output", help = "output CSV path")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub enum Command {
    /// Scrape one stats file.
    Scrape(Scrape),
    /// Scrape every run directory under a parent into one table.
    Collect(Collect),
    /// Simpoint-weighted aggregation across checkpoint slices.
    Weighted(Weighted),
    /// Merge fine-grained stall columns into coarse topdown buckets.
    Topdown(Topdown),
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Scrape(_) => "scrape",
                Self::Collect(_) => "collect",
                Self::Weighted(_) => "weighted",
                Self::Topdown(_) => "topdown",
            }
        )
    }
}

#[derive(Parser, Debug, Clone)]
pub struct Options {
    #[clap(subcommand)]
    pub command: Command,
}
