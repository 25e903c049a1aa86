use super::{Benchmarks, Error};
use std::io::Write;
use std::path::Path;

/// Emits the `/spec/run.sh` driving the workloads inside the simulated
/// Linux boot: one block per benchmark, in selection order.
///
/// `with_trap` brackets every invocation with the checkpoint helper
/// binaries staged under `/spec_common`.
pub fn run_script(
    benches: &Benchmarks,
    selected: &[&str],
    with_trap: bool,
) -> Result<Vec<String>, Error> {
    let mut lines = vec![
        "#!/bin/sh".to_string(),
        "echo '===== Start running SPEC2006 ====='".to_string(),
    ];
    for name in selected {
        let bench = benches.get(name)?;
        let binary = bench.binary_name(name, &benches.elf_suffix)?;
        let args = bench.args.join(" ");

        lines.push(format!("echo '======== BEGIN {name} ========'"));
        lines.push("set -x".to_string());
        lines.push(format!("md5sum /spec/{binary}"));
        lines.push("date -R".to_string());
        if with_trap {
            lines.push("/spec_common/before_workload".to_string());
        }
        if args.is_empty() {
            lines.push(format!("cd /spec && ./{binary}"));
        } else {
            lines.push(format!("cd /spec && ./{binary} {args}"));
        }
        if with_trap {
            lines.push("/spec_common/trap".to_string());
        }
        lines.push("date -R".to_string());
        lines.push("set +x".to_string());
        lines.push(format!("echo '======== END   {name} ========'"));
    }
    lines.push("echo '===== Finish running SPEC2006 ====='".to_string());
    Ok(lines)
}

/// Emits `build.sh`: regenerates the per-benchmark image manifest, rebuilds
/// the boot loader, and collects disassembly plus artifacts under
/// `spec_images/<name>/`.
pub fn build_script(
    benches: &Benchmarks,
    selected: &[&str],
    with_trap: bool,
) -> Result<Vec<String>, Error> {
    const PK_DIR: &str = "../../riscv-pk";
    const LINUX_DIR: &str = "../../riscv-linux";

    let mut lines = vec![
        "#!/bin/sh".to_string(),
        "set -x".to_string(),
        "set -e".to_string(),
        "mkdir -p spec_images".to_string(),
    ];
    for name in selected {
        let bench = benches.get(name)?;
        let target_dir = format!("spec_images/{name}");
        lines.push(format!("mkdir -p {target_dir}"));

        let mut generate = format!("workload generate {name}");
        if with_trap {
            generate.push_str(" --checkpoints");
        }
        generate.push_str(&format!(" --elf-suffix {}", benches.elf_suffix));
        lines.push(generate);
        lines.push(format!(
            "make -s -C {PK_DIR} clean && make -s -C {PK_DIR} -j100"
        ));

        let bbl_elf = format!("{PK_DIR}/build/bbl");
        let linux_elf = format!("{LINUX_DIR}/vmlinux");
        let spec_elf = bench.executable(&benches.elf_suffix).display().to_string();
        let bbl_bin = format!("{PK_DIR}/build/bbl.bin");

        for elf in [&bbl_elf, &linux_elf, &spec_elf] {
            let basename = Path::new(elf)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            lines.push(format!(
                "riscv64-unknown-linux-gnu-objdump -d {elf} > {target_dir}/{basename}.txt"
            ));
        }
        for artifact in [&bbl_elf, &linux_elf, &spec_elf, &bbl_bin] {
            lines.push(format!("cp {artifact} {target_dir}"));
        }
    }
    Ok(lines)
}

pub fn write_lines(lines: &[String], mut writer: impl Write) -> Result<(), Error> {
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::Benchmarks;
    use color_eyre::eyre;
    use pretty_assertions_sorted::assert_eq;

    #[test]
    fn invocations_preserve_selection_order_and_args() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        let selected = ["hmmer_retro", "bzip2_chicken", "mcf"];
        let lines = super::run_script(&benches, &selected, false)?;

        let invocations: Vec<&str> = lines
            .iter()
            .filter(|line| line.starts_with("cd /spec && "))
            .map(String::as_str)
            .collect();
        assert_eq!(
            invocations,
            vec![
                "cd /spec && ./hmmer_base.riscv64-linux-gnu-gcc-9.3.0 --fixed 0 --mean 500 \
                 --num 500000 --sd 350 --seed 0 retro.hmm",
                "cd /spec && ./bzip2_base.riscv64-linux-gnu-gcc-9.3.0 chicken.jpg 30",
                "cd /spec && ./mcf_base.riscv64-linux-gnu-gcc-9.3.0 inp.in",
            ]
        );
        Ok(())
    }

    #[test]
    fn stdin_redirections_stay_verbatim() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        let lines = super::run_script(&benches, &["milc"], false)?;
        assert!(lines
            .iter()
            .any(|line| line == "cd /spec && ./milc_base.riscv64-linux-gnu-gcc-9.3.0 < su3imp.in"));
        Ok(())
    }

    #[test]
    fn trap_hooks_bracket_every_invocation() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        let lines = super::run_script(&benches, &["mcf", "lbm"], true)?;

        let before = lines
            .iter()
            .filter(|line| *line == "/spec_common/before_workload")
            .count();
        let after = lines.iter().filter(|line| *line == "/spec_common/trap").count();
        assert_eq!(before, 2);
        assert_eq!(after, 2);

        // hook ordering within one block
        let begin = lines.iter().position(|l| l.contains("BEGIN mcf")).unwrap();
        let invoke = lines.iter().position(|l| l.starts_with("cd /spec && ./mcf")).unwrap();
        let trap = lines.iter().position(|l| l == "/spec_common/trap").unwrap();
        assert!(begin < invoke && invoke < trap);
        Ok(())
    }

    #[test]
    fn build_script_collects_artifacts_per_benchmark() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        let lines = super::build_script(&benches, &["mcf"], true)?;
        assert!(lines.contains(&"mkdir -p spec_images/mcf".to_string()));
        assert!(lines
            .iter()
            .any(|line| line.contains("workload generate mcf --checkpoints")));
        assert!(lines
            .iter()
            .any(|line| line.contains("objdump -d ../../riscv-linux/vmlinux")));
        Ok(())
    }
}
