use super::{Benchmarks, Error, Resource};
use std::io::Write;
use std::path::Path;

/// Fixed image skeleton staged before any workload files.
///
/// Format is the kernel's gen_init_cpio manifest: `dir`, `file`, `nod` and
/// `slink` entries with mode/uid/gid columns. `${RISCV}`-style variables are
/// left to the image build environment.
pub const SKELETON: &[&str] = &[
    "dir /bin 755 0 0",
    "dir /etc 755 0 0",
    "dir /dev 755 0 0",
    "dir /lib 755 0 0",
    "dir /proc 755 0 0",
    "dir /sbin 755 0 0",
    "dir /sys 755 0 0",
    "dir /tmp 755 0 0",
    "dir /usr 755 0 0",
    "dir /mnt 755 0 0",
    "dir /usr/bin 755 0 0",
    "dir /usr/lib 755 0 0",
    "dir /usr/sbin 755 0 0",
    "dir /var 755 0 0",
    "dir /var/tmp 755 0 0",
    "dir /root 755 0 0",
    "dir /var/log 755 0 0",
    "",
    "nod /dev/console 644 0 0 c 5 1",
    "nod /dev/null 644 0 0 c 1 3",
    "",
    "# libraries",
    "file /lib/ld-linux-riscv64-lp64d.so.1 ${RISCV}/sysroot/lib/ld-linux-riscv64-lp64d.so.1 755 0 0",
    "file /lib/libc.so.6 ${RISCV}/sysroot/lib/libc.so.6 755 0 0",
    "file /lib/libresolv.so.2 ${RISCV}/sysroot/lib/libresolv.so.2 755 0 0",
    "file /lib/libm.so.6 ${RISCV}/sysroot/lib/libm.so.6 755 0 0",
    "file /lib/libdl.so.2 ${RISCV}/sysroot/lib/libdl.so.2 755 0 0",
    "file /lib/libpthread.so.0 ${RISCV}/sysroot/lib/libpthread.so.0 755 0 0",
    "",
    "# busybox",
    "file /bin/busybox ${RISCV_ROOTFS_HOME}/rootfsimg/build/busybox 755 0 0",
    "file /etc/inittab ${RISCV_ROOTFS_HOME}/rootfsimg/inittab-spec 755 0 0",
    "slink /init /bin/busybox 755 0 0",
    "",
    "# SPEC common",
    "dir /spec_common 755 0 0",
    "file /spec_common/before_workload ${SPEC}/before_workload 755 0 0",
    "file /spec_common/trap ${SPEC}/trap_new 755 0 0",
    "",
    "# SPEC",
    "dir /spec 755 0 0",
    "file /spec/run.sh ${RISCV_ROOTFS_HOME}/rootfsimg/run.sh 755 0 0",
];

/// Collects manifest lines for the selected benchmarks, skeleton included.
pub fn manifest(benches: &Benchmarks, selected: &[&str]) -> Result<Vec<String>, Error> {
    let mut lines: Vec<String> = SKELETON.iter().map(ToString::to_string).collect();
    for name in selected {
        let bench = benches.get(name)?;
        let executable = bench.executable(&benches.elf_suffix);
        let binary = bench.binary_name(name, &benches.elf_suffix)?;
        lines.push(file_line(&format!("/spec/{binary}"), &executable.display().to_string()));

        for input in &bench.inputs {
            match input {
                Resource::File(src) => {
                    let basename = src
                        .file_name()
                        .ok_or_else(|| Error::NotADirectory { path: src.clone() })?
                        .to_string_lossy();
                    lines.push(file_line(&format!("/spec/{basename}"), &src.display().to_string()));
                }
                Resource::Dir { dir, path } => {
                    lines.extend(staged_dir_lines(dir, path)?);
                }
            }
        }
    }
    Ok(lines)
}

pub fn write_manifest(
    benches: &Benchmarks,
    selected: &[&str],
    mut writer: impl Write,
) -> Result<(), Error> {
    for line in manifest(benches, selected)? {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

fn file_line(dst: &str, src: &str) -> String {
    let dst = utils::fs::normalize_path(dst);
    format!("file {} {} 755 0 0", dst.display(), src)
}

fn dir_line(dst: &str) -> String {
    let dst = utils::fs::normalize_path(dst);
    format!("dir {} 755 0 0", dst.display())
}

/// Emits a `dir` entry for the staged root and every subdirectory, then a
/// `file` entry per contained file, discovered by a recursive walk of the
/// source tree.
fn staged_dir_lines(name: &str, path: &Path) -> Result<Vec<String>, Error> {
    if !path.is_dir() {
        return Err(Error::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    let (dirs, files) = traverse(path)?;
    let mut lines = vec![dir_line(&format!("/spec/{name}"))];
    for sub_dir in dirs {
        lines.push(dir_line(&format!("/spec/{name}/{}", sub_dir.display())));
    }
    for file in files {
        lines.push(file_line(
            &format!("/spec/{name}/{}", file.display()),
            &path.join(&file).display().to_string(),
        ));
    }
    Ok(lines)
}

/// Depth-first walk, paths relative to `root`. Entries are sorted so the
/// manifest is stable across runs.
fn traverse(root: &Path) -> Result<(Vec<std::path::PathBuf>, Vec<std::path::PathBuf>), Error> {
    fn walk(
        root: &Path,
        rel: &Path,
        dirs: &mut Vec<std::path::PathBuf>,
        files: &mut Vec<std::path::PathBuf>,
    ) -> Result<(), Error> {
        let mut entries: Vec<_> =
            std::fs::read_dir(root.join(rel))?.collect::<Result<_, std::io::Error>>()?;
        entries.sort_by_key(std::fs::DirEntry::file_name);
        for entry in entries {
            let item = rel.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                dirs.push(item.clone());
                walk(root, &item, dirs, files)?;
            } else {
                files.push(item);
            }
        }
        Ok(())
    }

    let (mut dirs, mut files) = (Vec::new(), Vec::new());
    walk(root, Path::new(""), &mut dirs, &mut files)?;
    Ok((dirs, files))
}

#[cfg(test)]
mod tests {
    use crate::{Benchmarks, Resource};
    use color_eyre::eyre;
    use pretty_assertions_sorted::assert_eq;

    fn is_well_formed(line: &str) -> bool {
        if line.is_empty() || line.starts_with('#') {
            return true;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields[0] {
            "dir" => fields.len() == 5 && fields[1].starts_with('/'),
            "file" => fields.len() == 6 && fields[1].starts_with('/'),
            "slink" => fields.len() == 6 && fields[1].starts_with('/'),
            "nod" => fields.len() == 8 && fields[1].starts_with('/'),
            _ => false,
        }
    }

    #[test]
    fn skeleton_is_well_formed() {
        for line in super::SKELETON {
            assert!(is_well_formed(line), "malformed skeleton line: {line}");
        }
    }

    #[test]
    fn one_file_line_per_declared_input() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        let selected = ["bzip2_chicken", "calculix", "libquantum"];
        let lines = super::manifest(&benches, &selected)?;

        let generated = &lines[super::SKELETON.len()..];
        let num_file_inputs: usize = selected
            .iter()
            .map(|name| {
                let bench = benches.get(name).unwrap();
                // one line for the executable plus one per file input
                1 + bench
                    .inputs
                    .iter()
                    .filter(|input| matches!(input, Resource::File(_)))
                    .count()
            })
            .sum();
        assert_eq!(generated.len(), num_file_inputs);
        assert!(generated.iter().all(|line| line.starts_with("file /spec/")));
        for line in generated {
            assert!(is_well_formed(line), "malformed line: {line}");
        }
        Ok(())
    }

    #[test]
    fn staged_binary_name_carries_suffix() -> eyre::Result<()> {
        let benches = Benchmarks::spec2006()?;
        let lines = super::manifest(&benches, &["mcf"])?;
        let generated: Vec<&str> = lines[super::SKELETON.len()..]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(
            generated,
            vec![
                "file /spec/mcf_base.riscv64-linux-gnu-gcc-9.3.0 ${SPEC}/spec06_exe/mcf_base.riscv64-linux-gnu-gcc-9.3.0 755 0 0",
                "file /spec/inp.in ${SPEC}/cpu2006_run_dir/mcf/inp.in 755 0 0",
            ]
        );
        Ok(())
    }

    #[test]
    fn directory_resources_are_walked_recursively() -> eyre::Result<()> {
        let root = std::env::temp_dir().join("ramfs-traverse-test");
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("sub/inner"))?;
        std::fs::write(root.join("top.txt"), "x")?;
        std::fs::write(root.join("sub/a.txt"), "x")?;
        std::fs::write(root.join("sub/inner/b.txt"), "x")?;

        let lines = super::staged_dir_lines("games", &root)?;
        assert_eq!(
            lines,
            vec![
                "dir /spec/games 755 0 0".to_string(),
                "dir /spec/games/sub 755 0 0".to_string(),
                "dir /spec/games/sub/inner 755 0 0".to_string(),
                format!("file /spec/games/sub/a.txt {} 755 0 0", root.join("sub/a.txt").display()),
                format!(
                    "file /spec/games/sub/inner/b.txt {} 755 0 0",
                    root.join("sub/inner/b.txt").display()
                ),
                format!("file /spec/games/top.txt {} 755 0 0", root.join("top.txt").display()),
            ]
        );
        std::fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn dot_staging_dir_is_normalized() -> eyre::Result<()> {
        let root = std::env::temp_dir().join("ramfs-dot-test");
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root)?;
        std::fs::write(root.join("args.an4"), "x")?;

        let lines = super::staged_dir_lines(".", &root)?;
        assert_eq!(lines[0], "dir /spec 755 0 0");
        assert!(lines[1].starts_with("file /spec/args.an4 "));
        std::fs::remove_dir_all(&root)?;
        Ok(())
    }
}
