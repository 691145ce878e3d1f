use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_analytics::store::TabularStore;
use survey_analytics::*;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::args::Args;
use crate::survey::config_reader::*;
use crate::survey::io_csv::FileSheet;

pub mod config_reader;
pub mod io_csv;
pub mod io_xlsx;
pub mod menu;
pub mod prompt;
pub mod report;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("Error opening configuration file {path}"))]
    OpeningConfig { source: io::Error, path: String },
    #[snafu(display("Error parsing configuration file {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error opening summary file {path}"))]
    OpeningSummary { source: io::Error, path: String },
    #[snafu(display("Error parsing summary file {path}"))]
    ParsingSummary {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary { source: io::Error, path: String },
    #[snafu(display("Error opening sheet {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line of sheet {path}"))]
    CsvLineParse { source: csv::Error, path: String },
    #[snafu(display("Error reading notes {path}"))]
    OpeningNotes { source: io::Error, path: String },
    #[snafu(display("Error parsing notes {path}"))]
    ParsingNotes {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {worksheet:?} not found in {path}"))]
    MissingWorksheet { worksheet: String, path: String },
    #[snafu(display("The Excel file {path} has no header"))]
    EmptyExcel { path: String },
    #[snafu(display("Wrong cell type at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error reading or writing the console"))]
    Console { source: io::Error },
    #[snafu(display("{source}"))]
    Survey { source: SurveyError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl From<SurveyError> for CliError {
    fn from(source: SurveyError) -> Self {
        CliError::Survey { source }
    }
}

pub type CliResult<T> = Result<T, CliError>;

fn open_sheet(settings: &Settings) -> CliResult<SurveySheet<FileSheet>> {
    info!(
        "Attempting to open sheet {:?} ({})",
        settings.sheet_path, settings.worksheet_name
    );
    let store = FileSheet::open(&settings.sheet_path, &settings.worksheet_name)?;
    let sheet = SurveySheet::open(store, &settings.questions, &settings.rules)?;
    Ok(sheet)
}

/// Writes the summary and checks it against the reference, without any interaction.
fn run_batch<S: TabularStore>(
    sheet: &SurveySheet<S>,
    settings: &Settings,
    out: &Option<String>,
    reference: &Option<String>,
) -> CliResult<()> {
    let dataset = sheet.dataset()?;
    let summary = summarize(&dataset, sheet.rules())?;
    let summary_js = report::summary_to_json(settings, &summary);
    let pretty_js = serde_json::to_string_pretty(&summary_js).context(ParsingSummarySnafu {
        path: "<computed>",
    })?;

    match out.as_deref() {
        Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, &pretty_js).context(WritingSummarySnafu { path })?;
        }
        None => {}
    }

    if let Some(reference_p) = reference {
        report::check_reference(&pretty_js, reference_p)?;
    }
    Ok(())
}

pub fn run_survey(args: &Args) -> CliResult<()> {
    let settings = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path).parent();
            resolve_settings(Some(&config), root, args)?
        }
        None => resolve_settings(None, None, args)?,
    };
    debug!("settings: {:?}", settings);

    let mut sheet = open_sheet(&settings)?;

    if let Some(import_p) = &args.import {
        let added = io_xlsx::import_xlsx(&mut sheet, import_p, args.excel_worksheet_name.as_deref())?;
        info!("Imported {} respondents from {:?}", added, import_p);
    }

    if args.out.is_some() || args.reference.is_some() {
        return run_batch(&sheet, &settings, &args.out, &args.reference);
    }

    let password = match &settings.admin_password_file {
        Some(p) => read_admin_password(p),
        None => {
            warn!("No administrator password file configured, administrator access is disabled");
            None
        }
    };

    let stdin = io::stdin();
    let mut console = prompt::Console::new(stdin.lock(), io::stdout());
    menu::run_session(&mut sheet, &mut console, password.as_deref())
}
