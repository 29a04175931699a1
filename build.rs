//! Renders the `pipelining(1)` manual page from the demo CLI definition.

use std::{env, fs, path::PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = env::var_os("OUT_DIR").map_or_else(
        || PathBuf::from("target/generated-man"),
        |dir| PathBuf::from(dir).join("man"),
    );
    fs::create_dir_all(&out_dir)?;

    let mut page = Vec::new();
    Man::new(cli::Cli::command()).render(&mut page)?;
    fs::write(out_dir.join("pipelining.1"), page)?;

    Ok(())
}
