// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Pipeline orchestration: fetch suites, partition, fill the Non-CR and CR sheets, save once
// role: report/orchestration
// inputs: Settings (portal + output), a ReportQueryClient, a Workbook bound to the target path
// outputs: RunSummary (target path, rows written per sheet) printed as JSON by main
// side_effects: Network calls through the client; one workbook save at the very end
// invariants:
// - sheets are filled in SHEET_PLANS order; each suite's tests are fetched exactly once
// - a sheet left by a previous run keeps its header row only; its data rows are replaced
// - any error aborts before save, so a failed run never writes the target
// - conditional fills cover the status column rows 2..=120 only
// errors: ReportError (portal, workbook, config) propagated unchanged
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{build_note, partition, STATUS_FAILED, STATUS_PASSED, STATUS_SKIPPED};
use crate::config::Settings;
use crate::error::ReportError;
use crate::model::{Category, ReportRow, Suite};
use crate::portal::{HttpPortalApi, OAuthTokenSource, ReportPortalApi, ReportQueryClient, TokenSource};
use crate::xlsx::{ColNum, EqualsTextRule, FillColor, OpenMode, RowNum, StyleOption, StyleSet, Workbook};

pub const HEADER_ROW: RowNum = 0;
pub const FIRST_DATA_ROW: RowNum = 1;
pub const FIRST_COLUMN: ColNum = 1;
/// Status column, spreadsheet rows 2 through 120.
pub const STATUS_RANGE: &str = "C2:C120";
/// Last zero-based row index covered by STATUS_RANGE.
pub const LAST_HIGHLIGHTED_ROW: RowNum = 119;

/// Report columns in sheet order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Header {
  Feature,
  Status,
  Total,
  Passed,
  Failed,
  Skipped,
  Note,
}

impl Header {
  pub const ALL: [Header; 7] = [
    Header::Feature,
    Header::Status,
    Header::Total,
    Header::Passed,
    Header::Failed,
    Header::Skipped,
    Header::Note,
  ];

  pub fn title(self) -> &'static str {
    match self {
      Header::Feature => "Feature",
      Header::Status => "Status",
      Header::Total => "Total",
      Header::Passed => "Passed",
      Header::Failed => "Failed",
      Header::Skipped => "Skipped",
      Header::Note => "Note",
    }
  }

  /// Column width in characters.
  pub fn width(self) -> f64 {
    match self {
      Header::Feature => 60.0,
      Header::Status => 15.0,
      Header::Note => 30.0,
      _ => 10.0,
    }
  }
}

/// Where a category's rows go.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SheetPlan {
  pub name: &'static str,
  pub position: usize,
  pub category: Category,
}

pub const SHEET_PLANS: [SheetPlan; 2] = [
  SheetPlan { name: "Non-CR", position: 1, category: Category::NonCr },
  SheetPlan { name: "CR", position: 2, category: Category::Cr },
];

pub fn header_style() -> StyleSet {
  StyleSet::from([
    StyleOption::Fill(FillColor::LightGreen),
    StyleOption::CenterAlign,
    StyleOption::WrapText,
    StyleOption::BorderAll,
  ])
}

pub fn data_style() -> StyleSet {
  StyleSet::from([StyleOption::WrapText, StyleOption::TopAlign, StyleOption::BorderAll])
}

pub fn status_rules() -> Vec<EqualsTextRule> {
  vec![
    EqualsTextRule::new(STATUS_FAILED, FillColor::Red),
    EqualsTextRule::new(STATUS_PASSED, FillColor::Green),
    EqualsTextRule::new(STATUS_SKIPPED, FillColor::BlueGrey),
  ]
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
  pub name: String,
  pub rows: usize,
}

/// What a run produced; printed as JSON on stdout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
  pub launch_id: String,
  pub file: PathBuf,
  pub sheets: Vec<SheetSummary>,
}

pub struct ReportGenerator<A> {
  client: ReportQueryClient<A>,
  plans: Vec<SheetPlan>,
}

impl<A: ReportPortalApi> ReportGenerator<A> {
  pub fn new(client: ReportQueryClient<A>) -> Self {
    Self { client, plans: SHEET_PLANS.to_vec() }
  }

  /// Fill every planned sheet of `workbook`. Nothing is saved here.
  pub fn generate(&self, workbook: &mut Workbook) -> Result<Vec<SheetSummary>, ReportError> {
    let launch_id = self.client.launch_id();
    let suites = self.client.fetch_suites(launch_id)?;
    info!("launch {}: {} suites", launch_id, suites.len());

    let (non_cr, cr) = partition(&suites);
    let mut sheets = Vec::with_capacity(self.plans.len());

    for plan in &self.plans {
      let bucket = match plan.category {
        Category::NonCr => &non_cr,
        Category::Cr => &cr,
      };
      let rows = self.fill_sheet(workbook, plan, bucket)?;
      sheets.push(SheetSummary { name: plan.name.to_string(), rows });
    }

    Ok(sheets)
  }

  fn fill_sheet(&self, workbook: &mut Workbook, plan: &SheetPlan, suites: &[Suite]) -> Result<usize, ReportError> {
    workbook.create_sheet(plan.name, plan.position);
    let stale = workbook.clear_rows(plan.name, FIRST_DATA_ROW)?;
    if stale > 0 {
      debug!("sheet {:?}: dropped {} rows from a previous run", plan.name, stale);
    }

    let titles: Vec<&str> = Header::ALL.iter().map(|h| h.title()).collect();
    let widths: Vec<f64> = Header::ALL.iter().map(|h| h.width()).collect();
    workbook.write_row(plan.name, HEADER_ROW, FIRST_COLUMN, &titles, &StyleSet::new())?;
    workbook.format_row(plan.name, HEADER_ROW, &header_style())?;
    workbook.set_column_widths(plan.name, FIRST_COLUMN, &widths)?;

    let style = data_style();
    for (offset, suite) in suites.iter().enumerate() {
      debug!(
        suite = suite.id(),
        name = suite.name(),
        status = suite.raw_status(),
        path = suite.path(),
        "fetching tests"
      );
      let tests = self.client.fetch_tests(suite.path())?;
      let row = ReportRow::from_suite(suite, build_note(&tests));
      workbook.write_row(plan.name, FIRST_DATA_ROW + offset as RowNum, FIRST_COLUMN, &row.cells(), &style)?;
    }

    let last_row = FIRST_DATA_ROW as usize + suites.len();
    if last_row > LAST_HIGHLIGHTED_ROW as usize + 1 {
      warn!(
        "sheet {:?} has {} rows; status highlighting stops at row {}",
        plan.name,
        suites.len(),
        LAST_HIGHLIGHTED_ROW + 1
      );
    }

    workbook.add_conditional_format(plan.name, STATUS_RANGE, status_rules())?;
    info!("sheet {:?}: {} rows", plan.name, suites.len());

    Ok(suites.len())
  }
}

/// Open the target workbook, authenticate, fill both sheets and save.
pub fn run(settings: &Settings) -> Result<RunSummary, ReportError> {
  let output = &settings.output;
  let mut workbook = match &output.template_file {
    Some(template) if *template != output.report_file => Workbook::from_template(template, &output.report_file)?,
    _ => Workbook::open(&output.report_file, OpenMode::ReadWrite)?,
  };

  debug!("filling {} (origin: {:?})", workbook.path().display(), workbook.origin());

  let token = OAuthTokenSource::new(&settings.portal).fetch_token()?;
  let api = HttpPortalApi::new(&settings.portal, token);
  let client = ReportQueryClient::new(api, settings.launch_id.as_str(), settings.portal.page_size);

  let sheets = ReportGenerator::new(client).generate(&mut workbook)?;
  let file = workbook.save()?;

  let summary = RunSummary { launch_id: settings.launch_id.clone(), file, sheets };
  info!(
    "report for launch {} written to {}",
    summary.launch_id,
    summary.file.display()
  );
  Ok(summary)
}
