use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default, Clone)]
pub struct Generate {
    #[clap(help = "benchmark names or tag sets (e.g. int,ref)")]
    pub benchmarks: Vec<String>,

    #[clap(
        short = 'o',
        long = "output",
        help = "directory the manifest and run.sh are written to",
        default_value = "."
    )]
    pub output: PathBuf,

    #[clap(long = "checkpoints", help = "bracket workloads with checkpoint hooks")]
    pub checkpoints: bool,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct Ramfs {
    #[clap(help = "benchmark names or tag sets (e.g. int,ref)")]
    pub benchmarks: Vec<String>,

    #[clap(short = 'o', long = "output", help = "manifest output path")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct RunScript {
    #[clap(help = "benchmark names or tag sets (e.g. int,ref)")]
    pub benchmarks: Vec<String>,

    #[clap(short = 'o', long = "output", help = "script output path")]
    pub output: Option<PathBuf>,

    #[clap(long = "checkpoints", help = "bracket workloads with checkpoint hooks")]
    pub checkpoints: bool,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct BuildScript {
    #[clap(help = "benchmark names or tag sets (e.g. int,ref)")]
    pub benchmarks: Vec<String>,

    #[clap(short = 'o', long = "output", help = "script output path")]
    pub output: Option<PathBuf>,

    #[clap(long = "checkpoints", help = "bracket workloads with checkpoint hooks")]
    pub checkpoints: bool,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct StageInputs {
    #[clap(help = "benchspec/CPU directory of the suite installation")]
    pub source: PathBuf,

    #[clap(help = "run directory the inputs are staged into")]
    pub target: PathBuf,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct GenMakefiles {
    #[clap(help = "directory containing the nnn.name testcase directories")]
    pub root: PathBuf,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct List {}

#[derive(Parser, Debug, Clone)]
pub enum Command {
    /// Write the ramfs manifest and run.sh for the selected benchmarks.
    Generate(Generate),
    Ramfs(Ramfs),
    RunScript(RunScript),
    BuildScript(BuildScript),
    StageInputs(StageInputs),
    GenMakefiles(GenMakefiles),
    List(List),
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Generate(_) => "generate",
                Self::Ramfs(_) => "ramfs",
                Self::RunScript(_) => "run-script",
                Self::BuildScript(_) => "build-script",
                Self::StageInputs(_) => "stage-inputs",
                Self::GenMakefiles(_) => "gen-makefiles",
                Self::List(_) => "list",
            }
        )
    }
}

#[derive(Parser, Debug, Clone)]
pub struct Options {
    #[clap(
        short = 'b',
        long = "benchmarks",
        help = "benchmark table overriding the built-in SPEC2006 one"
    )]
    pub benchmarks: Option<PathBuf>,

    #[clap(long = "elf-suffix", help = "suffix appended to workload binaries")]
    pub elf_suffix: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}
