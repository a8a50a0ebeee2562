use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::WorkbookError;

pub type RowNum = u32;
pub type ColNum = u16;

/// Typed content of one cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
  Text(String),
  Number(f64),
  Bool(bool),
  /// Styled cell without content.
  Blank,
}

impl CellValue {
  /// Store digit-only strings as numbers, everything else as text.
  pub fn coerce(raw: &str) -> Self {
    if is_numeric(raw) {
      if let Ok(n) = raw.parse::<f64>() {
        return CellValue::Number(n);
      }
    }
    CellValue::Text(raw.to_string())
  }

  /// Text as a spreadsheet would display it with the General format.
  pub fn display(&self) -> String {
    match self {
      CellValue::Text(s) => s.clone(),
      CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
      CellValue::Number(n) => n.to_string(),
      CellValue::Bool(true) => "TRUE".to_string(),
      CellValue::Bool(false) => "FALSE".to_string(),
      CellValue::Blank => String::new(),
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      CellValue::Text(s) => Some(s),
      _ => None,
    }
  }
}

/// Non-empty and ASCII digits only: no sign, no decimal point, no exponent.
pub fn is_numeric(s: &str) -> bool {
  !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Zero-based column index to letters (0 = A, 25 = Z, 26 = AA).
pub fn column_letters(col: ColNum) -> String {
  let mut out = String::new();
  let mut n = u32::from(col);

  loop {
    out.insert(0, (b'A' + (n % 26) as u8) as char);
    if n < 26 {
      break;
    }
    n = n / 26 - 1;
  }

  out
}

fn column_index(letters: &str) -> Option<ColNum> {
  let mut n: u32 = 0;

  for b in letters.bytes() {
    n = n.checked_mul(26)?.checked_add(u32::from(b - b'A') + 1)?;
  }

  ColNum::try_from(n.checked_sub(1)?).ok()
}

fn cell_ref(letters: &str, row: &str) -> Option<(RowNum, ColNum)> {
  let col = column_index(letters)?;
  let row: RowNum = row.parse().ok()?;
  Some((row.checked_sub(1)?, col))
}

/// Rectangular, zero-based, inclusive cell range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellRange {
  pub first_row: RowNum,
  pub first_col: ColNum,
  pub last_row: RowNum,
  pub last_col: ColNum,
}

impl CellRange {
  pub fn contains(&self, row: RowNum, col: ColNum) -> bool {
    (self.first_row..=self.last_row).contains(&row) && (self.first_col..=self.last_col).contains(&col)
  }
}

impl FromStr for CellRange {
  type Err = WorkbookError;

  /// Parse A1-style references such as `C2:C120` or `B5`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    static RE_RANGE: Lazy<Regex> =
      Lazy::new(|| Regex::new(r"^\$?([A-Z]{1,3})\$?([0-9]+)(?::\$?([A-Z]{1,3})\$?([0-9]+))?$").unwrap());

    let invalid = || WorkbookError::InvalidRange { range: s.to_string() };
    let upper = s.trim().to_ascii_uppercase();
    let caps = RE_RANGE.captures(&upper).ok_or_else(invalid)?;

    let (r1, c1) = cell_ref(&caps[1], &caps[2]).ok_or_else(invalid)?;
    let (r2, c2) = match (caps.get(3), caps.get(4)) {
      (Some(l), Some(r)) => cell_ref(l.as_str(), r.as_str()).ok_or_else(invalid)?,
      _ => (r1, c1),
    };

    Ok(CellRange {
      first_row: r1.min(r2),
      first_col: c1.min(c2),
      last_row: r1.max(r2),
      last_col: c1.max(c2),
    })
  }
}

impl fmt::Display for CellRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}{}:{}{}",
      column_letters(self.first_col),
      self.first_row + 1,
      column_letters(self.last_col),
      self.last_row + 1
    )
  }
}
