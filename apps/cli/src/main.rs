//! skilldocs CLI: the pre-build content sync for the documentation site.
//!
//! Reads skills, workflow docs and the configured doc tables, writes the
//! normalized content tree, and regenerates the markdown mirrors and
//! `llms.txt` files.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
