// ********* Input data structures ***********

use snafu::prelude::*;

/// The lowest score a respondent may give.
pub const MIN_SCORE: u8 = 1;
/// The highest score a respondent may give.
pub const MAX_SCORE: u8 = 5;

/// A survey question, as currently active in the sheet.
///
/// The ordinal is the 1-based position of the question. It is always
/// contiguous: the questions of a sheet are numbered `1..=N`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    pub ordinal: usize,
    /// Short text, displayed in the header of the sheet.
    pub label: String,
    /// The full wording of the question.
    pub prompt: String,
}

impl Question {
    /// The content of the header cell for this question.
    pub fn heading(&self) -> String {
        format!("Q{} - {}", self.ordinal, self.label)
    }
}

/// A question that has not been added to a sheet yet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NewQuestion {
    pub label: String,
    pub prompt: String,
}

/// Which text of the questions to list.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum QuestionForm {
    Prompt,
    Label,
}

/// The answers of one respondent.
///
/// Invariant: there is exactly one score per active question, in the order of
/// the questions.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RespondentRecord {
    pub name: String,
    pub scores: Vec<u8>,
}

/// A snapshot of the whole survey: the current questions and all the records.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Dataset {
    pub questions: Vec<Question>,
    pub records: Vec<RespondentRecord>,
}

impl Dataset {
    pub fn find(&self, name: &str) -> Option<&RespondentRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

// ******** Output data structures *********

/// How spread out the answers of a respondent are.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum VarianceBand {
    Low,
    Moderate,
    High,
}

impl VarianceBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarianceBand::Low => "low",
            VarianceBand::Moderate => "moderate",
            VarianceBand::High => "high",
        }
    }
}

/// Position of a score relative to the organization average for the same question.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Comparison {
    Higher,
    Similar,
    Lower,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Higher => "higher",
            Comparison::Similar => "similar",
            Comparison::Lower => "lower",
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct QuestionComparison {
    pub ordinal: usize,
    pub score: u8,
    pub average: f64,
    pub comparison: Comparison,
}

/// The questions on which a respondent gave their lowest and highest score.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Extremes {
    pub min: u8,
    pub max: u8,
    pub lowest: Vec<usize>,
    pub highest: Vec<usize>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RespondentSummary {
    pub name: String,
    pub mean: f64,
    pub variance: f64,
    pub band: VarianceBand,
    pub comparisons: Vec<QuestionComparison>,
    pub extremes: Extremes,
}

/// Ordinals of the questions with a low or a high average.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct QuestionClassification {
    pub low: Vec<usize>,
    pub high: Vec<usize>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct QuestionAverage {
    pub ordinal: usize,
    pub label: String,
    pub average: f64,
}

/// Statistics over the complete survey.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveySummary {
    pub respondents: usize,
    pub question_averages: Vec<QuestionAverage>,
    pub overall_average: f64,
    pub classification: QuestionClassification,
}

/// Errors raised by the stores, the validators and the analysis.
///
/// The validation errors are expected to be recovered by asking again. The
/// other ones usually mean that the sheet cannot be used.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SurveyError {
    #[snafu(display("{input:?} is not a valid command"))]
    InvalidCommand { input: String },

    #[snafu(display("{input:?} is not a score between {MIN_SCORE} and {MAX_SCORE}"))]
    InvalidScore { input: String },

    #[snafu(display("{input:?} is not a question number between 1 and {max}"))]
    InvalidOrdinal { input: String, max: usize },

    #[snafu(display("please answer 'y' or 'n', not {input:?}"))]
    InvalidConfirmation { input: String },

    #[snafu(display("the name may not be empty"))]
    EmptyName,

    #[snafu(display("a respondent named {name:?} already exists"))]
    DuplicateName { name: String },

    #[snafu(display("no respondent named {name:?}"))]
    NotFound { name: String },

    #[snafu(display("question {ordinal} does not exist, there are {count} questions"))]
    OutOfRange { ordinal: usize, count: usize },

    #[snafu(display("score {value} is outside of {MIN_SCORE}..={MAX_SCORE}"))]
    OutOfDomain { value: u8 },

    #[snafu(display("expected {expected} scores, got {actual}"))]
    ScoreCount { expected: usize, actual: usize },

    #[snafu(display("the survey has no responses"))]
    EmptyDataset,

    #[snafu(display("at least 2 scores are needed, found {count}"))]
    InsufficientData { count: usize },

    #[snafu(display("row {row}, column {col} of the sheet: {message}"))]
    MalformedSheet {
        row: usize,
        col: usize,
        message: String,
    },

    #[snafu(display("cell ({row}, {col}) is outside of the sheet"))]
    CellOutOfBounds { row: usize, col: usize },

    #[snafu(display("backing store failure"))]
    Backend {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SurveyError {
    /// Errors caused by the input of the user, as opposed to the state of the sheet.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SurveyError::InvalidCommand { .. }
                | SurveyError::InvalidScore { .. }
                | SurveyError::InvalidOrdinal { .. }
                | SurveyError::InvalidConfirmation { .. }
                | SurveyError::EmptyName
                | SurveyError::DuplicateName { .. }
                | SurveyError::NotFound { .. }
                | SurveyError::OutOfRange { .. }
                | SurveyError::OutOfDomain { .. }
                | SurveyError::ScoreCount { .. }
        )
    }
}

pub type SurveyResult<T> = Result<T, SurveyError>;

// ********* Configuration **********

/// The policy thresholds of the analysis.
///
/// None of these values are derived from the data. They can be changed
/// through the configuration file.
#[derive(PartialEq, Debug, Clone)]
pub struct AnalysisRules {
    /// A variance strictly above this value is high.
    pub high_variance_threshold: f64,
    /// A variance strictly above this value (and not high) is moderate.
    pub moderate_variance_threshold: f64,
    /// Distance to the question average beyond which a score is higher or lower.
    pub comparison_margin: f64,
    /// A question average at or below this value is low.
    pub low_score_threshold: f64,
    /// A question average at or above this value is high.
    pub high_score_threshold: f64,
    /// The score given to every existing respondent when a question is added.
    pub default_score: u8,
}

impl AnalysisRules {
    pub const DEFAULT_RULES: AnalysisRules = AnalysisRules {
        high_variance_threshold: 2.0,
        moderate_variance_threshold: 1.3,
        comparison_margin: 0.4,
        low_score_threshold: 2.5,
        high_score_threshold: 3.5,
        default_score: 3,
    };
}

impl Default for AnalysisRules {
    fn default() -> Self {
        AnalysisRules::DEFAULT_RULES
    }
}
