use super::EXIT_SUCCESS;
use clap::{Command, CommandFactory};
use std::path::Path;

fn write_page(cmd: Command, path: &Path) -> Result<(), String> {
    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd)
        .render(&mut buf)
        .map_err(|e| format!("man page render failed: {e}"))?;
    std::fs::write(path, &buf).map_err(|e| format!("failed to write {}: {e}", path.display()))
}

pub fn run<C: CommandFactory>(dir: &Path) -> Result<u8, String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("failed to create dir: {e}"))?;
    let cmd = C::command();
    let bin_name = cmd.get_name().to_owned();

    write_page(cmd.clone(), &dir.join(format!("{bin_name}.1")))?;
    let mut pages = 1;
    for sub in cmd.get_subcommands() {
        let page = dir.join(format!("{bin_name}-{}.1", sub.get_name()));
        write_page(sub.clone(), &page)?;
        pages += 1;
    }

    println!("{pages} man pages written to {}", dir.display());
    Ok(EXIT_SUCCESS)
}
