// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the launch result models (suites, tests) read from the portal and the flattened report row
// role: model/types
// outputs: Wire records (serde) and immutable Suite/Test snapshots with derived fields computed once
// invariants:
// - category and display_name are derived from the raw name at construction and never recomputed
// - unknown JSON fields are ignored; absent optional fields degrade to neutral values
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

use crate::aggregate::derive_status;

pub const FEATURE_PREFIX: &str = "Feature: ";
pub const NON_CR_MARKER: &str = "NON-CR";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executions {
  #[serde(default)]
  pub total: u32,
  #[serde(default)]
  pub passed: u32,
  #[serde(default)]
  pub failed: u32,
  #[serde(default)]
  pub skipped: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Statistics {
  #[serde(default)]
  pub executions: Executions,
}

/// Suite item as returned in `content[]` by the items endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SuiteRecord {
  #[serde(default)]
  pub id: i64,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub path: String,
  #[serde(default)]
  pub statistics: Statistics,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IssueRecord {
  #[serde(default)]
  pub comment: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TestRecord {
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub issue: Option<IssueRecord>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
  NonCr,
  Cr,
}

impl Category {
  pub fn of(name: &str) -> Self {
    if name.contains(NON_CR_MARKER) {
      Category::NonCr
    } else {
      Category::Cr
    }
  }
}

/// A feature-level suite for one launch. Read once, never mutated.
#[derive(Clone, Debug)]
pub struct Suite {
  id: i64,
  name: String,
  raw_status: String,
  path: String,
  executions: Executions,
  display_name: String,
  category: Category,
  display_status: String,
}

impl Suite {
  pub fn id(&self) -> i64 {
    self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn raw_status(&self) -> &str {
    &self.raw_status
  }

  /// Join key used as `parentId` when querying the suite's tests.
  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn executions(&self) -> Executions {
    self.executions
  }

  pub fn display_name(&self) -> &str {
    &self.display_name
  }

  pub fn category(&self) -> Category {
    self.category
  }

  pub fn display_status(&self) -> &str {
    &self.display_status
  }
}

impl From<SuiteRecord> for Suite {
  fn from(rec: SuiteRecord) -> Self {
    let executions = rec.statistics.executions;
    let display_name = display_name(&rec.name).to_string();
    let category = Category::of(&rec.name);
    let display_status = derive_status(&rec.status, &executions).to_string();

    Suite {
      id: rec.id,
      name: rec.name,
      raw_status: rec.status,
      path: rec.path,
      executions,
      display_name,
      category,
      display_status,
    }
  }
}

/// Strip a single leading "Feature: " label, if present.
pub fn display_name(name: &str) -> &str {
  name.strip_prefix(FEATURE_PREFIX).unwrap_or(name)
}

/// A leaf test execution, optionally carrying a recorded issue comment.
#[derive(Clone, Debug)]
pub struct Test {
  status: String,
  comment: Option<String>,
}

impl Test {
  pub fn new(status: impl Into<String>, comment: Option<String>) -> Self {
    Self { status: status.into(), comment }
  }

  pub fn status(&self) -> &str {
    &self.status
  }

  pub fn comment(&self) -> Option<&str> {
    self.comment.as_deref()
  }

  /// `"<status>: <comment>"`, or empty when no issue comment was recorded.
  pub fn comment_line(&self) -> String {
    match self.comment() {
      Some(c) => format!("{}: {}", self.status(), c),
      None => String::new(),
    }
  }
}

impl From<TestRecord> for Test {
  fn from(rec: TestRecord) -> Self {
    let comment = rec.issue.and_then(|i| i.comment);
    Test::new(rec.status, comment)
  }
}

/// One data row of a category sheet, in header order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportRow {
  pub feature: String,
  pub status: String,
  pub total: u32,
  pub passed: u32,
  pub failed: u32,
  pub skipped: u32,
  pub note: String,
}

impl ReportRow {
  pub fn from_suite(suite: &Suite, note: String) -> Self {
    let ex = suite.executions();
    ReportRow {
      feature: suite.display_name().to_string(),
      status: suite.display_status().to_string(),
      total: ex.total,
      passed: ex.passed,
      failed: ex.failed,
      skipped: ex.skipped,
      note,
    }
  }

  /// Cell texts in header order; counters are rendered as plain digits.
  pub fn cells(&self) -> Vec<String> {
    vec![
      self.feature.clone(),
      self.status.clone(),
      self.total.to_string(),
      self.passed.to_string(),
      self.failed.to_string(),
      self.skipped.to_string(),
      self.note.clone(),
    ]
  }
}
