use crate::xlsx::cell::{CellRange, CellValue, ColNum, RowNum};
use crate::xlsx::style::FillColor;

/// Fill a cell when its text equals `value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EqualsTextRule {
  pub value: String,
  pub fill: FillColor,
}

impl EqualsTextRule {
  pub fn new(value: impl Into<String>, fill: FillColor) -> Self {
    Self { value: value.into(), fill }
  }

  /// Spreadsheet text comparison: case-insensitive, text cells only.
  pub fn matches(&self, value: &CellValue) -> bool {
    value.as_text().is_some_and(|t| t.eq_ignore_ascii_case(&self.value))
  }

  /// Criterion as a quoted string literal, e.g. `"FAILED"`.
  pub fn criterion(&self) -> String {
    format!("\"{}\"", self.value.replace('"', "\"\""))
  }
}

/// Rules bound to a fixed range; evaluated on display, not stored in cells.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalFormat {
  pub range: CellRange,
  pub rules: Vec<EqualsTextRule>,
}

impl ConditionalFormat {
  /// First matching rule wins.
  pub fn fill_for(&self, row: RowNum, col: ColNum, value: &CellValue) -> Option<FillColor> {
    if !self.range.contains(row, col) {
      return None;
    }
    self.rules.iter().find(|r| r.matches(value)).map(|r| r.fill)
  }
}
