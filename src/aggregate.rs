// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Pure derivations over fetched launch data: display status, ordering, category partition, note text
// role: aggregation/pure
// inputs: Executions counters, raw statuses, Suite and Test snapshots
// outputs: Display status strings, ordered/partitioned suite lists, newline-joined notes
// invariants:
// - derive_status checks total==0, then failed==0&&passed==0, then failed==0&&passed>0, else raw
// - sorting is lexicographic on the lowercased display status and stable
// - partition buckets are disjoint, cover the input, and keep input order
// - notes keep first-seen order and drop empty and duplicate lines
// side_effects: none
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use crate::model::{Category, Executions, Suite, Test};

pub const STATUS_PASSED: &str = "PASSED";
pub const STATUS_FAILED: &str = "FAILED";
pub const STATUS_SKIPPED: &str = "SKIPPED";

/// Display status of a suite from its counters; falls back to the service status.
pub fn derive_status<'a>(raw: &'a str, ex: &Executions) -> &'a str {
  if ex.total == 0 {
    return STATUS_SKIPPED;
  }

  if ex.failed == 0 && ex.passed == 0 {
    return STATUS_SKIPPED;
  }

  if ex.failed == 0 && ex.passed > 0 {
    return STATUS_PASSED;
  }

  raw
}

/// Order suites by display status text, case-insensitively.
///
/// This is plain lexicographic order (FAILED < PASSED < SKIPPED), not a
/// severity ranking. Suites with equal status keep their fetched order.
pub fn sort_by_display_status(suites: &mut [Suite]) {
  suites.sort_by_cached_key(|s| s.display_status().to_lowercase());
}

/// Split suites into (NON_CR, CR) buckets, each in input order.
///
/// Both passes only read the shared slice, so they run side by side.
pub fn partition(suites: &[Suite]) -> (Vec<Suite>, Vec<Suite>) {
  rayon::join(
    || select_category(suites, Category::NonCr),
    || select_category(suites, Category::Cr),
  )
}

pub fn select_category(suites: &[Suite], category: Category) -> Vec<Suite> {
  suites.iter().filter(|s| s.category() == category).cloned().collect()
}

/// Newline-joined, de-duplicated, non-empty comment lines of a suite's tests.
pub fn build_note(tests: &[Test]) -> String {
  let mut seen: HashSet<String> = HashSet::new();
  let mut lines: Vec<String> = Vec::new();

  for line in tests.iter().map(Test::comment_line) {
    if line.is_empty() {
      continue;
    }

    if seen.insert(line.clone()) {
      lines.push(line);
    }
  }

  lines.join("\n")
}
