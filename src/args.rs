use clap::Parser;

/// Collects, stores and analyses the answers to a staff survey.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the survey: questions, sheet location,
    /// administrator password and analysis thresholds. Built-in defaults are used if not provided.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) The CSV file holding the survey results. Setting this option overrides
    /// the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub sheet: Option<String>,

    /// (file path, optional) An Excel export of survey results to merge into the sheet before
    /// anything else. Respondents already in the sheet are skipped.
    #[clap(short, long, value_parser)]
    pub import: Option<String>,

    /// (default: the only worksheet) When importing an Excel file, indicates the name of the
    /// worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the survey is written in JSON
    /// format to the given location and the program exits without starting the interactive menu.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a survey summary in JSON format. If provided, the
    /// computed summary is checked against it and the program exits.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
