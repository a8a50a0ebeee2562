use anyhow::Result;
use clap::Parser;

mod aggregate;
mod cli;
mod config;
mod error;
mod ext;
mod model;
mod portal;
mod report;
mod util;
mod xlsx;

use crate::cli::{normalize, Cli};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  util::init_tracing();

  // Phase 1: resolve settings from properties + overrides
  let settings = normalize(cli)?;

  // Phase 2: fetch, fill and save
  let mut summary = report::run(&settings)?;
  summary.file = util::canonicalize_lossy(&summary.file);

  println!("{}", serde_json::to_string_pretty(&summary)?);
  Ok(())
}
