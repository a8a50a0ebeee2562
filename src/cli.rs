use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::{self, Properties, Settings, DEFAULT_PROPERTIES_FILE, KEY_REPORT_FILE};

#[derive(Parser, Debug)]
#[command(
    name = "rp-xlsx-report",
    version,
    about = "Export a Report Portal launch to an XLSX summary (Non-CR / CR sheets)",
    long_about = None
)]
pub struct Cli {
  /// Properties file with connection, credentials and output settings
  /// (default: ./default.properties, optional)
  #[arg(long, env = "RP_PROPERTIES")]
  pub properties: Option<PathBuf>,

  /// Override one property, e.g. -D launch.id=875 (repeatable; wins over the file)
  #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = config::parse_define)]
  pub define: Vec<(String, String)>,

  /// Output workbook; shorthand for -D report.file=<PATH>
  #[arg(long)]
  pub out: Option<PathBuf>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

/// Merge the properties file, `-D` overrides and `--out` into resolved settings.
pub fn normalize(cli: Cli) -> Result<Settings> {
  let cwd = std::env::current_dir().context("reading current directory")?;

  // An explicitly named file must exist; the default one is optional.
  let (path, required) = match cli.properties {
    Some(p) => (p, true),
    None => (cwd.join(DEFAULT_PROPERTIES_FILE), false),
  };

  let mut props = Properties::load(&path, required)?.with_overrides(cli.define);

  if let Some(out) = cli.out {
    props = props.with_overrides([(KEY_REPORT_FILE.to_string(), out.to_string_lossy().to_string())]);
  }

  Ok(Settings::resolve(&props, &cwd)?)
}
