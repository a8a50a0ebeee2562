// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Translate the in-memory workbook model to and from .xlsx files
// role: xlsx/io
// inputs: Path to an existing .xlsx (load, merge base) or a populated Workbook (store)
// outputs: Loaded sheets with cell values; serialized bytes persisted atomically
// side_effects: Reads the source file; writes a temp file next to the target and renames it into place
// invariants:
// - load reads values only; the source package itself is the base of every save over it
// - merge replaces modified sheets and leaves every other part of the base as read
// - store never leaves a partially written target: bytes are produced in memory first
// - a replaced target keeps its permissions; a new one gets the umask default
// errors: WorkbookError::Read for unparseable input, Write/Update for serializer failures, Io for filesystem failures
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs;
use std::io::{Cursor, Write as _};
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{ConditionalFormatCell, ConditionalFormatCellRule, Format};
use tracing::debug;

use crate::error::WorkbookError;
use crate::xlsx::cell::{CellValue, ColNum, RowNum};
use crate::xlsx::{Cell, Sheet, Workbook};

fn read_error(path: &Path, message: impl ToString) -> WorkbookError {
  WorkbookError::Read { path: path.to_path_buf(), message: message.to_string() }
}

fn update_error(path: &Path, message: impl ToString) -> WorkbookError {
  WorkbookError::Update { path: path.to_path_buf(), message: message.to_string() }
}

fn io_error(path: &Path, source: std::io::Error) -> WorkbookError {
  WorkbookError::Io { path: path.to_path_buf(), source }
}

fn value_of(data: &Data) -> Option<CellValue> {
  match data {
    Data::String(s) => Some(CellValue::Text(s.clone())),
    Data::Float(f) => Some(CellValue::Number(*f)),
    Data::Int(i) => Some(CellValue::Number(*i as f64)),
    Data::Bool(b) => Some(CellValue::Bool(*b)),
    Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
    Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
    Data::Error(_) | Data::Empty => None,
  }
}

/// Load every sheet of an existing workbook, in workbook order.
pub(crate) fn load_sheets(path: &Path) -> Result<Vec<Sheet>, WorkbookError> {
  let mut book: Xlsx<_> = open_workbook(path).map_err(|e: calamine::XlsxError| read_error(path, e))?;
  let mut sheets = Vec::new();

  for name in book.sheet_names().to_vec() {
    let range = book.worksheet_range(&name).map_err(|e| read_error(path, e))?;
    let mut sheet = Sheet::new(name);
    let (row0, col0) = range.start().unwrap_or((0, 0));

    for (r, c, data) in range.used_cells() {
      let Some(value) = value_of(data) else { continue };
      let row = row0 + r as RowNum;
      let col = ColNum::try_from(col0 as usize + c).map_err(|e| read_error(path, e))?;
      sheet.cells.insert((row, col), Cell { value, style: None });
    }

    debug!("loaded sheet {:?} with {} cells", sheet.name, sheet.cells.len());
    sheets.push(sheet);
  }

  Ok(sheets)
}

/// Serialize the workbook into .xlsx bytes.
pub(crate) fn to_bytes(book: &Workbook) -> Result<Vec<u8>, WorkbookError> {
  let mut out = rust_xlsxwriter::Workbook::new();
  let formats: Vec<Format> = book.styles.iter().map(|s| s.to_format()).collect();

  for sheet in &book.sheets {
    let ws = out.add_worksheet();
    ws.set_name(&sheet.name)?;

    for (&col, &width) in &sheet.column_widths {
      ws.set_column_width(col, width)?;
    }

    for (&(row, col), cell) in &sheet.cells {
      let format = cell.style.and_then(|id| formats.get(id.index()));
      match (&cell.value, format) {
        (CellValue::Text(s), Some(f)) => ws.write_string_with_format(row, col, s, f)?,
        (CellValue::Text(s), None) => ws.write_string(row, col, s)?,
        (CellValue::Number(n), Some(f)) => ws.write_number_with_format(row, col, *n, f)?,
        (CellValue::Number(n), None) => ws.write_number(row, col, *n)?,
        (CellValue::Bool(b), Some(f)) => ws.write_boolean_with_format(row, col, *b, f)?,
        (CellValue::Bool(b), None) => ws.write_boolean(row, col, *b)?,
        (CellValue::Blank, Some(f)) => ws.write_blank(row, col, f)?,
        (CellValue::Blank, None) => continue,
      };
    }

    for cf in &sheet.conditional_formats {
      let r = cf.range;
      for rule in &cf.rules {
        let criterion = rule.criterion();
        let fill = Format::new().set_background_color(rule.fill.color());
        let conditional = ConditionalFormatCell::new()
          .set_rule(ConditionalFormatCellRule::EqualTo(criterion.as_str()))
          .set_format(fill);
        ws.add_conditional_format(r.first_row, r.first_col, r.last_row, r.last_col, &conditional)?;
      }
    }
  }

  Ok(out.save_to_buffer()?)
}

/// Serialize the workbook over the package at `base`.
///
/// Modified sheets are rendered and swapped in (new ones at their model
/// position); all other sheets, styles, formulas, merged cells and defined
/// names come from `base` untouched.
pub(crate) fn merge_into(base: &Path, book: &Workbook) -> Result<Vec<u8>, WorkbookError> {
  let mut target = umya_spreadsheet::reader::xlsx::read(base).map_err(|e| read_error(base, e))?;
  let rendered = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(to_bytes(book)?), true)
    .map_err(|e| update_error(base, e))?;

  for (position, sheet) in book.sheets.iter().enumerate() {
    if !sheet.modified {
      continue;
    }
    let Some(replacement) = rendered.get_sheet_by_name(&sheet.name) else {
      return Err(update_error(base, format!("sheet {:?} was not rendered", sheet.name)));
    };

    let existing = target.get_sheet_collection().iter().position(|ws| ws.get_name() == sheet.name);
    match existing {
      Some(idx) => target.get_sheet_collection_mut()[idx] = replacement.clone(),
      None => {
        *target.new_sheet(sheet.name.as_str()).map_err(|e| update_error(base, e))? = replacement.clone();
        let sheets = target.get_sheet_collection_mut();
        let last = sheets.len() - 1;
        sheets[position.min(last)..].rotate_right(1);
      }
    }
    debug!("sheet {:?} replaced in {}", sheet.name, base.display());
  }

  let mut out = Cursor::new(Vec::new());
  umya_spreadsheet::writer::xlsx::write_writer(&target, &mut out).map_err(|e| update_error(base, e))?;
  Ok(out.into_inner())
}

#[cfg(unix)]
fn fresh_file_permissions() -> fs::Permissions {
  use std::os::unix::fs::PermissionsExt;
  // Masked by the process umask at creation, like File::create.
  fs::Permissions::from_mode(0o666)
}

/// Write `bytes` to `path` through a sibling temp file and a rename.
pub(crate) fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<(), WorkbookError> {
  let parent = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
    _ => std::path::PathBuf::from("."),
  };
  fs::create_dir_all(&parent).map_err(|e| io_error(&parent, e))?;

  let previous = fs::metadata(path).ok().map(|m| m.permissions());
  let mut builder = tempfile::Builder::new();
  #[cfg(unix)]
  builder.permissions(fresh_file_permissions());

  let mut tmp = builder.tempfile_in(&parent).map_err(|e| io_error(&parent, e))?;
  if let Some(perms) = previous {
    tmp.as_file().set_permissions(perms).map_err(|e| io_error(path, e))?;
  }
  tmp.write_all(bytes).map_err(|e| io_error(path, e))?;
  tmp.as_file().sync_all().map_err(|e| io_error(path, e))?;
  tmp.persist(path).map_err(|e| io_error(path, e.error))?;

  Ok(())
}
