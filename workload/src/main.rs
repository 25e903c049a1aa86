mod options;

use clap::Parser;
use color_eyre::eyre;
use options::{Command, Options};
use std::path::Path;
use workload::{inputs, makefile, ramfs, runscript, Benchmarks};

fn load_benchmarks(options: &Options) -> eyre::Result<Benchmarks> {
    let mut benches = match &options.benchmarks {
        Some(path) => Benchmarks::from_file(path)?,
        None => Benchmarks::spec2006()?,
    };
    if let Some(elf_suffix) = &options.elf_suffix {
        benches.elf_suffix = elf_suffix.clone();
    }
    Ok(benches)
}

fn write_or_print(lines: &[String], output: Option<&Path>) -> eyre::Result<()> {
    match output {
        Some(path) => {
            runscript::write_lines(lines, utils::fs::open_writable(path)?)?;
            log::info!("wrote {}", path.display());
        }
        None => {
            for line in lines {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn main() -> eyre::Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let options = Options::parse();
    let start = std::time::Instant::now();

    match &options.command {
        Command::Generate(opts) => {
            let benches = load_benchmarks(&options)?;
            let selected = benches.select(&opts.benchmarks)?;
            utils::fs::create_dirs(&opts.output)?;

            let manifest = ramfs::manifest(&benches, &selected)?;
            let manifest_path = opts.output.join("initramfs-spec.txt");
            write_or_print(&manifest, Some(manifest_path.as_path()))?;

            let script = runscript::run_script(&benches, &selected, opts.checkpoints)?;
            let script_path = opts.output.join("run.sh");
            write_or_print(&script, Some(script_path.as_path()))?;
        }
        Command::Ramfs(opts) => {
            let benches = load_benchmarks(&options)?;
            let selected = benches.select(&opts.benchmarks)?;
            let manifest = ramfs::manifest(&benches, &selected)?;
            write_or_print(&manifest, opts.output.as_deref())?;
        }
        Command::RunScript(opts) => {
            let benches = load_benchmarks(&options)?;
            let selected = benches.select(&opts.benchmarks)?;
            let script = runscript::run_script(&benches, &selected, opts.checkpoints)?;
            write_or_print(&script, opts.output.as_deref())?;
        }
        Command::BuildScript(opts) => {
            let benches = load_benchmarks(&options)?;
            let selected = benches.select(&opts.benchmarks)?;
            let script = runscript::build_script(&benches, &selected, opts.checkpoints)?;
            write_or_print(&script, opts.output.as_deref())?;
        }
        Command::StageInputs(opts) => {
            let staged = inputs::stage_all(&opts.source, &opts.target)?;
            let copied: usize = staged.iter().map(|s| s.copied).sum();
            log::info!("staged {copied} files for {} benchmarks", staged.len());
        }
        Command::GenMakefiles(opts) => {
            let written = makefile::append_compare_targets(&opts.root)?;
            log::info!("appended compare targets to {} Makefiles", written.len());
        }
        Command::List(_) => {
            let benches = load_benchmarks(&options)?;
            for (name, bench) in &benches.benchmarks {
                println!("{name:<20} [{}]", bench.tags.join(", "));
            }
        }
    }

    log::debug!("{} done in {:?}", options.command, start.elapsed());
    Ok(())
}
