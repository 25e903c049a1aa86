mod options;

use clap::Parser;
use color_eyre::eyre;
use gem5proc::report::Row;
use gem5proc::{derive, parse, report, run_dirs, targets, topdown, weighted, Values};
use options::{Command, Format, Options, Table};
use std::path::{Path, PathBuf};

fn tables_for(format: Format, tables: &[Table]) -> targets::Targets {
    let selected: &[Table] = if tables.is_empty() {
        &[Table::Brief]
    } else {
        tables
    };
    let mut picked: Vec<&targets::Targets> = Vec::new();
    for table in selected {
        let resolved = match (format, table) {
            (Format::Gem5, Table::Brief) => &*targets::BRIEF,
            (Format::Gem5, Table::Branch) => &*targets::BRANCH,
            (Format::Gem5, Table::Cache) => &*targets::CACHE,
            (Format::Gem5, Table::Icache) => &*targets::ICACHE,
            (Format::Gem5, Table::Mem) => &*targets::MEM,
            (Format::Gem5, Table::Topdown) => &*targets::TOPDOWN,
            (Format::Xs, Table::Brief) => &*targets::XS_IPC,
            (Format::Xs, Table::Branch) => &*targets::XS_BRANCH,
            (Format::Xs, Table::Cache) => &*targets::XS_CACHE,
            (Format::Xs, Table::Mem) => &*targets::XS_MEM,
            (Format::Xs, Table::Topdown) => &*targets::XS_TOPDOWN,
            (Format::Xs, Table::Icache) => {
                log::warn!("no icache table for the xs format, skipping");
                continue;
            }
        };
        picked.push(resolved);
    }
    targets::merged(&picked)
}

fn add_derived(format: Format, tables: &[Table], values: &mut Values) {
    let selected: &[Table] = if tables.is_empty() {
        &[Table::Brief]
    } else {
        tables
    };
    for table in selected {
        match (format, table) {
            (Format::Gem5, Table::Brief) => derive::add_ipc(values),
            (Format::Gem5, Table::Branch) => derive::add_branch_mispred(values),
            (Format::Gem5, Table::Cache) => derive::add_cache_mpki(values),
            (Format::Gem5, Table::Mem) => derive::add_mem_bw(values),
            (Format::Xs, Table::Brief) => derive::xs_add_ipc(values),
            (Format::Xs, Table::Branch) => derive::xs_add_branch_mispred(values),
            (Format::Xs, Table::Cache) => derive::xs_add_cache_mpki(values),
            (Format::Xs, Table::Mem) => derive::xs_add_mem_bw(values),
            _ => {}
        }
    }
}

fn scrape_one(path: &Path, format: Format, targets: &targets::Targets) -> eyre::Result<Values> {
    let values = match format {
        Format::Gem5 => parse::scrape_gem5(path, targets)?,
        Format::Xs => parse::scrape_xs(path, targets)?,
    };
    Ok(values)
}

fn write_rows(rows: &[Row], output: Option<&PathBuf>) -> eyre::Result<()> {
    match output {
        Some(path) => {
            report::write_csv(rows, utils::fs::open_writable(path)?)?;
            log::info!("wrote {}", path.display());
        }
        None => report::write_csv(rows, std::io::stdout().lock())?,
    }
    Ok(())
}

fn main() -> eyre::Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let options = Options::parse();
    let start = std::time::Instant::now();

    match &options.command {
        Command::Scrape(opts) => {
            let targets = tables_for(opts.format, &opts.tables);
            if opts.all_chunks {
                let chunks = parse::scrape_gem5_chunks(&opts.stat_file, &targets)?;
                let rows: Vec<Row> = chunks
                    .into_iter()
                    .map(|(insts, mut values)| {
                        add_derived(opts.format, &opts.tables, &mut values);
                        let mut row = Row::default();
                        row.labels.insert("point".to_string(), insts.to_string());
                        row.values = values;
                        row
                    })
                    .collect();
                write_rows(&rows, opts.output.as_ref())?;
                return Ok(());
            }
            let mut values = scrape_one(&opts.stat_file, opts.format, &targets)?;
            add_derived(opts.format, &opts.tables, &mut values);
            match &opts.output {
                Some(_) => {
                    let row = Row {
                        labels: indexmap::IndexMap::new(),
                        values,
                    };
                    write_rows(&[row], opts.output.as_ref())?;
                }
                None => {
                    for (name, value) in &values {
                        println!("{name:<30} {value}");
                    }
                }
            }
        }
        Command::Collect(opts) => {
            let targets = tables_for(opts.format, &opts.tables);
            let filter = (!opts.benchmarks.is_empty()).then_some(opts.benchmarks.as_slice());
            let run_dirs = run_dirs::scan(&opts.parent, filter)?;

            let mut rows = Vec::new();
            for (workload, stat_file) in run_dirs {
                let mut values = match scrape_one(&stat_file, opts.format, &targets) {
                    Ok(values) => values,
                    Err(err) => {
                        log::warn!("{workload}: {err}");
                        continue;
                    }
                };
                add_derived(opts.format, &opts.tables, &mut values);

                let mut row = Row::default();
                let (bmk, point) = workload.split_once('_').unwrap_or((workload.as_str(), ""));
                row.labels.insert("workload".to_string(), workload.clone());
                row.labels.insert("bmk".to_string(), bmk.to_string());
                row.labels.insert("point".to_string(), point.to_string());
                row.values = values;
                rows.push(row);
            }
            write_rows(&rows, opts.output.as_ref())?;
        }
        Command::Weighted(opts) => {
            let targets = tables_for(Format::Gem5, &opts.tables);
            let rows = weighted::collect(&opts.input_dir, &opts.weight_dir, &targets)?;
            write_rows(&rows, opts.output.as_ref())?;
        }
        Command::Topdown(opts) => {
            let rows = report::read_csv(utils::fs::open_readable(&opts.input)?)?;
            let mut merged = match opts.format {
                Format::Gem5 => topdown::merge(&rows, topdown::gem5_disposition),
                Format::Xs => topdown::merge(&rows, topdown::xs_disposition),
            };
            if let Some(instructions) = opts.instructions {
                merged = merged
                    .iter()
                    .map(|row| topdown::attribute_base_excess(row, instructions as f64))
                    .collect();
            }
            if opts.percent {
                merged = merged.iter().map(topdown::percentages).collect();
            }
            write_rows(&merged, opts.output.as_ref())?;
        }
    }

    log::debug!("{} done in {:?}", options.command, start.elapsed());
    Ok(())
}
