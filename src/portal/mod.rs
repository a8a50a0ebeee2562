// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Namespace for the reporting-service integration (token, item queries, typed client)
// role: portal/namespace
// outputs: Public submodules isolating all HTTP traffic behind trait seams
// invariants: Single attempt per call; every non-success answer is an error, never an empty result
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod auth;
pub mod client;

pub use api::{HttpPortalApi, ItemQuery, ReportPortalApi};
pub use auth::{AccessToken, OAuthTokenSource, TokenSource};
pub use client::ReportQueryClient;

/// Join a base URL and a path without doubling or dropping the separator.
pub fn join_url(base: &str, path: &str) -> String {
  let base = base.trim_end_matches('/');
  let path = path.trim_start_matches('/');

  if path.is_empty() {
    base.to_string()
  } else {
    format!("{}/{}", base, path)
  }
}

/// Build a blocking agent with a global timeout; non-2xx answers come back as errors.
pub(crate) fn build_agent(timeout: std::time::Duration) -> ureq::Agent {
  ureq::Agent::config_builder().timeout_global(Some(timeout)).build().into()
}

pub(crate) fn transport_error(url: &str, err: ureq::Error) -> crate::error::PortalError {
  match err {
    ureq::Error::StatusCode(status) => crate::error::PortalError::Status { status, url: url.to_string() },
    other => crate::error::PortalError::Transport { url: url.to_string(), message: other.to_string() },
  }
}
