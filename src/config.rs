// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve the run configuration once (properties file + -D overrides) into an explicit Settings value
// role: configuration
// inputs: properties file path, key=value overrides, working directory
// outputs: Settings { launch_id, portal, output } handed to the client and the workbook builder
// side_effects: Reads the properties file
// invariants:
// - precedence: override > properties file > built-in default
// - required keys missing => ConfigError::Missing naming the key
// - output target = report.file, else report.template.file (filled in place)
// errors: ConfigError for missing/invalid keys and unreadable files
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ConfigError;

pub const DEFAULT_PROPERTIES_FILE: &str = "default.properties";

pub const KEY_LAUNCH_ID: &str = "launch.id";
pub const KEY_PROJECT_PATH: &str = "project.path";
pub const KEY_PORTAL_URL: &str = "report.portal.url";
pub const KEY_OAUTH_PATH: &str = "oauth.path";
pub const KEY_USERNAME: &str = "credentials.username";
pub const KEY_PASSWORD: &str = "credentials.password";
pub const KEY_BASIC_AUTH: &str = "basic.auth";
pub const KEY_TEMPLATE_FILE: &str = "report.template.file";
pub const KEY_REPORT_FILE: &str = "report.file";
pub const KEY_PAGE_SIZE: &str = "page.size";
pub const KEY_HTTP_TIMEOUT: &str = "http.timeout.seconds";

pub const DEFAULT_PAGE_SIZE: u32 = 70;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Flat key/value view over the properties file and its overrides.
#[derive(Debug, Default, Clone)]
pub struct Properties {
  file: HashMap<String, String>,
  overrides: HashMap<String, String>,
}

impl Properties {
  /// Load `path`. When `required` is false a missing file is treated as empty.
  pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
    if !path.exists() {
      if required {
        return Err(ConfigError::Properties {
          path: path.to_path_buf(),
          message: "file not found".into(),
        });
      }
      warn!("{} not found, continuing with overrides and defaults", path.display());
      return Ok(Self::default());
    }

    let reader = File::open(path).map_err(|e| ConfigError::Properties {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;

    let file = java_properties::read(BufReader::new(reader)).map_err(|e| ConfigError::Properties {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;
    debug!("loaded {} properties from {}", file.len(), path.display());

    Ok(Self { file, overrides: HashMap::new() })
  }

  pub fn with_overrides<I, K, V>(mut self, pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    for (k, v) in pairs {
      self.overrides.insert(k.into(), v.into());
    }
    self
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .overrides
      .get(key)
      .or_else(|| self.file.get(key))
      .map(|s| s.as_str())
      .filter(|s| !s.trim().is_empty())
  }

  pub fn require(&self, key: &str) -> Result<String, ConfigError> {
    self
      .get(key)
      .map(str::to_string)
      .ok_or_else(|| ConfigError::Missing { key: key.to_string() })
  }

  fn positive<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
  where
    T: std::str::FromStr + PartialOrd + Default,
  {
    let Some(raw) = self.get(key) else {
      return Ok(default);
    };

    match raw.trim().parse::<T>() {
      Ok(v) if v > T::default() => Ok(v),
      _ => Err(ConfigError::Invalid { key: key.to_string(), value: raw.to_string() }),
    }
  }
}

/// Parse a `key=value` override as given to `-D`.
pub fn parse_define(s: &str) -> Result<(String, String), String> {
  match s.split_once('=') {
    Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
    _ => Err(format!("expected key=value, got {s:?}")),
  }
}

#[derive(Debug, Clone)]
pub struct PortalSettings {
  pub base_url: String,
  pub project_path: String,
  pub oauth_path: String,
  pub username: String,
  pub password: String,
  pub basic_auth: String,
  pub page_size: u32,
  pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
  /// Workbook whose sheets seed the report; never written to unless it is also the target.
  pub template_file: Option<PathBuf>,
  pub report_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Settings {
  pub launch_id: String,
  pub portal: PortalSettings,
  pub output: OutputSettings,
}

impl Settings {
  pub fn resolve(props: &Properties, cwd: &Path) -> Result<Self, ConfigError> {
    let portal = PortalSettings {
      base_url: props.require(KEY_PORTAL_URL)?,
      project_path: props.require(KEY_PROJECT_PATH)?,
      oauth_path: props.require(KEY_OAUTH_PATH)?,
      username: props.require(KEY_USERNAME)?,
      password: props.require(KEY_PASSWORD)?,
      basic_auth: props.require(KEY_BASIC_AUTH)?,
      page_size: props.positive(KEY_PAGE_SIZE, DEFAULT_PAGE_SIZE)?,
      timeout: Duration::from_secs(props.positive(KEY_HTTP_TIMEOUT, DEFAULT_HTTP_TIMEOUT_SECS)?),
    };

    let template_file = props.get(KEY_TEMPLATE_FILE).map(|p| cwd.join(p));
    let report_file = match (props.get(KEY_REPORT_FILE), &template_file) {
      (Some(p), _) => cwd.join(p),
      (None, Some(t)) => t.clone(),
      (None, None) => return Err(ConfigError::Missing { key: KEY_REPORT_FILE.to_string() }),
    };

    Ok(Settings {
      launch_id: props.require(KEY_LAUNCH_ID)?,
      portal,
      output: OutputSettings { template_file, report_file },
    })
  }
}
