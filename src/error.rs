// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed error taxonomy for the portal client, workbook builder, configuration and the pipeline
// role: errors/types
// outputs: PortalError, WorkbookError, ConfigError and the aggregating ReportError
// invariants:
// - Every fatal condition maps to exactly one variant; tolerated data-shape issues never become errors
// - Messages never include credentials or tokens
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the reporting service. All variants are fatal; nothing retries.
#[derive(Error, Debug)]
pub enum PortalError {
  #[error("authentication failed: token endpoint answered {status}: {body}")]
  Authentication { status: u16, body: String },

  #[error("request to {url} failed with status {status}")]
  Status { status: u16, url: String },

  #[error("request to {url} failed: {message}")]
  Transport { url: String, message: String },

  #[error("unexpected response from {url}: {message}")]
  Decode { url: String, message: String },
}

#[derive(Error, Debug)]
pub enum WorkbookError {
  #[error("File not found: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("{}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read workbook {}: {message}", path.display())]
  Read { path: PathBuf, message: String },

  #[error("failed to serialize workbook: {0}")]
  Write(#[from] rust_xlsxwriter::XlsxError),

  #[error("failed to update workbook {}: {message}", path.display())]
  Update { path: PathBuf, message: String },

  #[error("workbook {} was opened read-only", path.display())]
  ReadOnly { path: PathBuf },

  #[error("no sheet named {name:?}")]
  UnknownSheet { name: String },

  #[error("invalid cell range {range:?}")]
  InvalidRange { range: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("missing required configuration key {key:?}")]
  Missing { key: String },

  #[error("invalid value {value:?} for configuration key {key:?}")]
  Invalid { key: String, value: String },

  #[error("cannot read properties file {}: {message}", path.display())]
  Properties { path: PathBuf, message: String },
}

/// Anything that aborts a report run.
#[derive(Error, Debug)]
pub enum ReportError {
  #[error(transparent)]
  Portal(#[from] PortalError),

  #[error(transparent)]
  Workbook(#[from] WorkbookError),

  #[error(transparent)]
  Config(#[from] ConfigError),
}
