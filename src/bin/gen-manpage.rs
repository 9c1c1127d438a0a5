//! Man page generator for w5x00
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]
//!
//! Writes `w5x00.1` plus one page per subcommand (`w5x00-attach.1`, ...).

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

fn render(man: clap_mangen::Man, path: &Path) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    fs::write(path, buffer)?;
    println!("  {}", path.display());
    Ok(())
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    println!("Man pages generated:");
    for sub in cmd.get_subcommands() {
        let name = format!("w5x00-{}", sub.get_name());
        let page = clap_mangen::Man::new(sub.clone()).title(name.to_uppercase());
        render(page, &output_dir.join(format!("{}.1", name)))?;
    }
    render(clap_mangen::Man::new(cmd), &output_dir.join("w5x00.1"))?;

    println!("\nTo view: man -l {}", output_dir.join("w5x00.1").display());
    Ok(())
}
