// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Spreadsheet builder: ordered sheets, typed cells, interned style sets, conditional fills
// role: xlsx/namespace
// inputs: Target path and open mode, or a template path plus a target path
// outputs: A workbook persisted to exactly one target path on save
// side_effects: Filesystem reads on open; one atomic write on save
// invariants:
// - sheet names are unique; create_sheet is create-if-absent and never clears content
// - write_row replaces the whole row; format_row/apply_style only add options
// - identical style sets share one interned format
// - saving over an existing file or template rewrites only the sheets touched in this session
// - save consumes the workbook; read-only workbooks refuse to save
// errors: WorkbookError (NotFound, Io, Read, Write, Update, ReadOnly, UnknownSheet, InvalidRange)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod cell;
pub mod conditional;
mod io;
pub mod style;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::WorkbookError;

pub use cell::{CellRange, CellValue, ColNum, RowNum};
pub use conditional::{ConditionalFormat, EqualsTextRule};
pub use style::{FillColor, StyleId, StyleOption, StyleSet, StyleTable};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenMode {
  ReadWrite,
  ReadOnly,
}

/// Where the initial content of a workbook came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
  New,
  Existing,
  Template(PathBuf),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Cell {
  pub(crate) value: CellValue,
  pub(crate) style: Option<StyleId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
  pub(crate) name: String,
  pub(crate) cells: BTreeMap<(RowNum, ColNum), Cell>,
  pub(crate) column_widths: BTreeMap<ColNum, f64>,
  pub(crate) conditional_formats: Vec<ConditionalFormat>,
  /// Set by any write; unmodified sheets are saved exactly as they were read.
  pub(crate) modified: bool,
}

impl Sheet {
  pub(crate) fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      cells: BTreeMap::new(),
      column_widths: BTreeMap::new(),
      conditional_formats: Vec::new(),
      modified: false,
    }
  }

  pub fn value(&self, row: RowNum, col: ColNum) -> Option<&CellValue> {
    self.cells.get(&(row, col)).map(|c| &c.value)
  }

  /// Rows that hold at least one cell, ascending.
  pub fn used_rows(&self) -> Vec<RowNum> {
    let mut rows: Vec<RowNum> = self.cells.keys().map(|(r, _)| *r).collect();
    rows.dedup();
    rows
  }
}

// Inspection helpers for callers that check a filled workbook before saving.
#[cfg_attr(not(test), allow(dead_code))]
impl Sheet {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn column_width(&self, col: ColNum) -> Option<f64> {
    self.column_widths.get(&col).copied()
  }

  pub fn conditional_formats(&self) -> &[ConditionalFormat] {
    &self.conditional_formats
  }

  /// Fill a viewer would paint on the cell from the sheet's conditional formats.
  pub fn conditional_fill(&self, row: RowNum, col: ColNum) -> Option<FillColor> {
    let value = self.value(row, col)?;
    self.conditional_formats.iter().find_map(|cf| cf.fill_for(row, col, value))
  }

  /// Displayed text of every cell in `row`, left to right.
  pub fn row_text(&self, row: RowNum) -> Vec<String> {
    self
      .cells
      .range((row, 0)..=(row, ColNum::MAX))
      .map(|(_, c)| c.value.display())
      .collect()
  }
}

pub struct Workbook {
  path: PathBuf,
  mode: OpenMode,
  origin: Origin,
  pub(crate) sheets: Vec<Sheet>,
  pub(crate) styles: StyleTable,
  populated: bool,
}

impl Workbook {
  /// Open `path` if it exists, otherwise start an empty workbook bound to it.
  /// Read-only mode requires the file to exist.
  pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self, WorkbookError> {
    let path = path.as_ref().to_path_buf();

    if path.is_file() {
      let sheets = io::load_sheets(&path)?;
      info!("opened workbook {} ({} sheets)", path.display(), sheets.len());
      return Ok(Self::with_sheets(path, mode, Origin::Existing, sheets));
    }

    match mode {
      OpenMode::ReadOnly => Err(WorkbookError::NotFound { path }),
      OpenMode::ReadWrite => {
        debug!("starting new workbook for {}", path.display());
        Ok(Self::with_sheets(path, mode, Origin::New, Vec::new()))
      }
    }
  }

  /// Seed a workbook from `template`, to be saved to `target`. The template is only read.
  pub fn from_template(template: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<Self, WorkbookError> {
    let template = template.as_ref().to_path_buf();
    if !template.is_file() {
      return Err(WorkbookError::NotFound { path: template });
    }

    let sheets = io::load_sheets(&template)?;
    info!("loaded template {} ({} sheets)", template.display(), sheets.len());
    Ok(Self::with_sheets(target.as_ref().to_path_buf(), OpenMode::ReadWrite, Origin::Template(template), sheets))
  }

  fn with_sheets(path: PathBuf, mode: OpenMode, origin: Origin, sheets: Vec<Sheet>) -> Self {
    Self { path, mode, origin, sheets, styles: StyleTable::default(), populated: false }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn origin(&self) -> &Origin {
    &self.origin
  }

  /// True once any cell, style or sheet has been touched.
  pub fn is_populated(&self) -> bool {
    self.populated
  }

  fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet, WorkbookError> {
    self.populated = true;
    let sheet = self
      .sheets
      .iter_mut()
      .find(|s| s.name == name)
      .ok_or_else(|| WorkbookError::UnknownSheet { name: name.to_string() })?;
    sheet.modified = true;
    Ok(sheet)
  }

  fn intern(&mut self, styles: &StyleSet) -> Option<StyleId> {
    (!styles.is_empty()).then(|| self.styles.intern(styles.clone()))
  }

  /// Ensure a sheet named `name` exists and return its index.
  /// New sheets are moved to `position`, clamped to the last slot.
  /// Existing sheets keep both their position and their content.
  pub fn create_sheet(&mut self, name: &str, position: usize) -> usize {
    if let Some(idx) = self.sheets.iter().position(|s| s.name == name) {
      debug!("sheet {:?} already exists at {}", name, idx);
      return idx;
    }

    self.populated = true;
    let last = self.sheets.len();
    let idx = if position > last {
      warn!("sheet position {} for {:?} is past the end; placing it at {}", position, name, last);
      last
    } else {
      position
    };

    let mut sheet = Sheet::new(name);
    sheet.modified = true;
    self.sheets.insert(idx, sheet);
    idx
  }

  /// Drop every cell from `from_row` down. Returns how many rows held content.
  pub fn clear_rows(&mut self, sheet: &str, from_row: RowNum) -> Result<usize, WorkbookError> {
    let target = self.sheet_mut(sheet)?;
    let cleared = target.used_rows().into_iter().filter(|r| *r >= from_row).count();
    target.cells.retain(|(r, _), _| *r < from_row);
    Ok(cleared)
  }

  /// Replace `row` with `values` starting at `start_col`, each cell carrying `styles`.
  /// Digit-only strings are stored as numbers.
  pub fn write_row<S: AsRef<str>>(
    &mut self,
    sheet: &str,
    row: RowNum,
    start_col: ColNum,
    values: &[S],
    styles: &StyleSet,
  ) -> Result<(), WorkbookError> {
    let style = self.intern(styles);
    let target = self.sheet_mut(sheet)?;

    target.cells.retain(|(r, _), _| *r != row);
    for (offset, raw) in values.iter().enumerate() {
      let col = start_col.saturating_add(offset as ColNum);
      target.cells.insert((row, col), Cell { value: CellValue::coerce(raw.as_ref()), style });
    }

    Ok(())
  }

  /// Add `styles` to every existing cell of `row`.
  pub fn format_row(&mut self, sheet: &str, row: RowNum, styles: &StyleSet) -> Result<(), WorkbookError> {
    let cols: Vec<ColNum> = self
      .sheet_mut(sheet)?
      .cells
      .range((row, 0)..=(row, ColNum::MAX))
      .map(|((_, c), _)| *c)
      .collect();

    for col in cols {
      self.apply_style(sheet, row, col, styles)?;
    }
    Ok(())
  }

  /// Add `styles` to one cell, creating a blank cell if needed.
  pub fn apply_style(&mut self, sheet: &str, row: RowNum, col: ColNum, styles: &StyleSet) -> Result<(), WorkbookError> {
    let current_id = self.sheet_mut(sheet)?.cells.get(&(row, col)).and_then(|c| c.style);
    let current = current_id.and_then(|id| self.styles.get(id)).cloned().unwrap_or_default();

    let style = self.intern(&current.union(styles));
    let target = self.sheet_mut(sheet)?;
    target.cells.entry((row, col)).or_insert(Cell { value: CellValue::Blank, style: None }).style = style;

    Ok(())
  }

  /// Set widths (in characters) of consecutive columns starting at `start_col`.
  pub fn set_column_widths(&mut self, sheet: &str, start_col: ColNum, widths: &[f64]) -> Result<(), WorkbookError> {
    let target = self.sheet_mut(sheet)?;
    for (offset, width) in widths.iter().enumerate() {
      target.column_widths.insert(start_col.saturating_add(offset as ColNum), *width);
    }
    Ok(())
  }

  /// Attach equals-text fill rules to `range` (e.g. `C2:C120`).
  pub fn add_conditional_format(
    &mut self,
    sheet: &str,
    range: &str,
    rules: Vec<EqualsTextRule>,
  ) -> Result<(), WorkbookError> {
    let range: CellRange = range.parse()?;
    debug!("{} conditional rule(s) on {}!{}", rules.len(), sheet, range);
    let target = self.sheet_mut(sheet)?;
    let cf = ConditionalFormat { range, rules };

    // Re-running against a saved report must not stack duplicate rules.
    if !target.conditional_formats.contains(&cf) {
      target.conditional_formats.push(cf);
    }
    Ok(())
  }

  /// Persist to the bound path and hand back that path.
  pub fn save(self) -> Result<PathBuf, WorkbookError> {
    if self.mode == OpenMode::ReadOnly {
      return Err(WorkbookError::ReadOnly { path: self.path });
    }

    if !self.is_populated() {
      debug!("saving {} without changes", self.path.display());
    }

    let bytes = match &self.origin {
      Origin::New => io::to_bytes(&self)?,
      Origin::Existing => io::merge_into(&self.path, &self)?,
      Origin::Template(template) => io::merge_into(template, &self)?,
    };
    io::persist_atomically(&self.path, &bytes)?;
    info!("saved workbook {} ({} sheets, {} bytes)", self.path.display(), self.sheets.len(), bytes.len());

    Ok(self.path)
  }
}

#[cfg_attr(not(test), allow(dead_code))]
impl Workbook {
  pub fn sheet_names(&self) -> Vec<&str> {
    self.sheets.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn sheet(&self, name: &str) -> Option<&Sheet> {
    self.sheets.iter().find(|s| s.name == name)
  }

  pub fn style_count(&self) -> usize {
    self.styles.len()
  }

  /// Style set applied to a cell, if any.
  pub fn cell_style(&self, sheet: &str, row: RowNum, col: ColNum) -> Option<&StyleSet> {
    let id = self.sheet(sheet)?.cells.get(&(row, col))?.style?;
    self.styles.get(id)
  }
}
