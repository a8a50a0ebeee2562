// Wiremock stand-in for the reporting service: token endpoint plus items endpoint.
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "tok-123";
pub const TOKEN_PATH: &str = "/uat/sso/oauth/token";
pub const ITEMS_PATH: &str = "/api/v1/qa/item";

pub fn launch() -> Value {
  test_support::read_fixture_json("launch_875.json")
}

/// Token endpoint answering `status`; must be hit `times` times.
pub async fn mount_token(server: &MockServer, status: u16, times: u64) {
  let body = if status == 200 {
    json!({ "access_token": TOKEN, "token_type": "bearer", "expires_in": 43199, "scope": "ui" })
  } else {
    json!({ "error": "invalid_grant", "error_description": "Bad credentials" })
  };

  Mock::given(method("POST"))
    .and(path(TOKEN_PATH))
    .and(header("Authorization", "Basic dWk6dWltYW4="))
    .and(body_string_contains("grant_type=password"))
    .and(body_string_contains("username=qa-bot"))
    .respond_with(ResponseTemplate::new(status).set_body_json(body))
    .expect(times)
    .mount(server)
    .await;
}

/// Suites page for launch 875; must be hit `times` times with the bearer token.
pub async fn mount_suites(server: &MockServer, launch: &Value, times: u64) {
  let bearer = format!("Bearer {TOKEN}");

  Mock::given(method("GET"))
    .and(path(ITEMS_PATH))
    .and(header("Authorization", bearer.as_str()))
    .and(query_param("filter.eq.launchId", "875"))
    .and(query_param("filter.level.path", "1"))
    .and(query_param("page.page", "1"))
    .and(query_param("page.size", "70"))
    .and(query_param("page.sort", "startTime,ASC"))
    .respond_with(ResponseTemplate::new(200).set_body_json(launch["suites"].clone()))
    .expect(times)
    .mount(server)
    .await;
}

/// One tests page per suite path in the fixture; each must be hit `times` times.
pub async fn mount_tests(server: &MockServer, launch: &Value, times: u64) {
  let pages = launch["tests"].as_object().expect("fixture has tests pages");

  for (parent, page) in pages {
    Mock::given(method("GET"))
      .and(path(ITEMS_PATH))
      .and(query_param("filter.eq.launchId", "875"))
      .and(query_param("filter.eq.parentId", parent.as_str()))
      .and(query_param("filter.in.status", "FAILED,INTERRUPTED,SKIPPED"))
      .respond_with(ResponseTemplate::new(200).set_body_json(page.clone()))
      .expect(times)
      .mount(server)
      .await;
  }
}

/// Render calamine rows as `row: [cells]` lines for inline snapshots.
pub fn render(rows: &[(u32, Vec<String>)]) -> String {
  rows.iter().map(|(r, cells)| format!("{r}: {cells:?}")).collect::<Vec<_>>().join("\n")
}
