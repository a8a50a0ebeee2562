// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Item-query parameters and the blocking transport seam to the reporting service
// role: portal/api
// inputs: base URL, project path, bearer token, ItemQuery
// outputs: Raw JSON pages (serde_json::Value) as returned by the items endpoint
// side_effects: Network calls to the configured reporting service
// invariants:
// - query parameters are sent in a fixed order; page is always 1
// - the bearer token is attached to every request and never logged
// errors: PortalError::Status for non-2xx, Transport for I/O and timeouts, Decode for non-JSON bodies
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use tracing::debug;

use crate::config::PortalSettings;
use crate::error::PortalError;
use crate::portal::auth::AccessToken;
use crate::portal::{build_agent, join_url, transport_error};

pub const TEST_STATUS_FILTER: &str = "FAILED,INTERRUPTED,SKIPPED";
pub const SORT_BY_START_TIME: &str = "startTime,ASC";

/// Ordered query parameters for one items request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
  params: Vec<(&'static str, String)>,
}

impl ItemQuery {
  /// Top-level suites of a launch.
  pub fn suites(launch_id: &str, page_size: u32) -> Self {
    Self {
      params: vec![
        ("filter.eq.launchId", launch_id.to_string()),
        ("filter.level.path", "1".to_string()),
        ("page.page", "1".to_string()),
        ("page.size", page_size.to_string()),
        ("page.sort", SORT_BY_START_TIME.to_string()),
      ],
    }
  }

  /// Non-passing tests under one suite.
  pub fn tests(launch_id: &str, parent_path: &str, page_size: u32) -> Self {
    Self {
      params: vec![
        ("filter.eq.launchId", launch_id.to_string()),
        ("filter.eq.parentId", parent_path.to_string()),
        ("filter.in.status", TEST_STATUS_FILTER.to_string()),
        ("page.page", "1".to_string()),
        ("page.size", page_size.to_string()),
        ("page.sort", SORT_BY_START_TIME.to_string()),
      ],
    }
  }

  pub fn params(&self) -> &[(&'static str, String)] {
    &self.params
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
  }
}

// --- Trait seam for the reporting service ---
pub trait ReportPortalApi {
  fn list_suites_json(&self, query: &ItemQuery) -> Result<serde_json::Value, PortalError>;
  fn list_tests_json(&self, query: &ItemQuery) -> Result<serde_json::Value, PortalError>;
}

impl<T: ReportPortalApi + ?Sized> ReportPortalApi for &T {
  fn list_suites_json(&self, query: &ItemQuery) -> Result<serde_json::Value, PortalError> {
    (**self).list_suites_json(query)
  }

  fn list_tests_json(&self, query: &ItemQuery) -> Result<serde_json::Value, PortalError> {
    (**self).list_tests_json(query)
  }
}

/// Items endpoint over HTTP, authenticated with a bearer token.
pub struct HttpPortalApi {
  agent: ureq::Agent,
  items_url: String,
  token: AccessToken,
}

impl HttpPortalApi {
  pub fn new(settings: &PortalSettings, token: AccessToken) -> Self {
    Self {
      agent: build_agent(settings.timeout),
      items_url: join_url(&settings.base_url, &settings.project_path),
      token,
    }
  }

  fn get_json(&self, query: &ItemQuery) -> Result<serde_json::Value, PortalError> {
    debug!(url = %self.items_url, params = ?query.params(), "GET items");

    let mut req = self
      .agent
      .get(&self.items_url)
      .header("Accept", "application/json")
      .header("Authorization", &self.token.bearer());

    for (k, v) in query.params() {
      req = req.query(*k, v);
    }

    let mut resp = req.call().map_err(|e| transport_error(&self.items_url, e))?;
    let status = resp.status().as_u16();

    if status != 200 {
      return Err(PortalError::Status { status, url: self.items_url.clone() });
    }

    resp
      .body_mut()
      .read_json::<serde_json::Value>()
      .map_err(|e| PortalError::Decode { url: self.items_url.clone(), message: e.to_string() })
  }
}

impl ReportPortalApi for HttpPortalApi {
  fn list_suites_json(&self, query: &ItemQuery) -> Result<serde_json::Value, PortalError> {
    self.get_json(query)
  }

  fn list_tests_json(&self, query: &ItemQuery) -> Result<serde_json::Value, PortalError> {
    self.get_json(query)
  }
}
