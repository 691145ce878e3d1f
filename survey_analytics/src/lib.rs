mod config;
pub mod manual;
mod questions;
mod records;
mod sheet;
pub mod store;
pub mod validate;

use log::{debug, info};
use snafu::prelude::*;

pub use crate::config::*;
pub use crate::sheet::{SurveySheet, NAME_HEADING};

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn mean(scores: &[u8]) -> f64 {
    scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64
}

/// The average score of each question over all the respondents, rounded to
/// one decimal.
pub fn per_question_averages(dataset: &Dataset) -> SurveyResult<Vec<f64>> {
    ensure!(!dataset.records.is_empty(), EmptyDatasetSnafu);
    let num_records = dataset.records.len() as f64;
    let mut res: Vec<f64> = Vec::with_capacity(dataset.questions.len());
    for (idx, q) in dataset.questions.iter().enumerate() {
        let mut total: f64 = 0.0;
        for r in dataset.records.iter() {
            let score = r.scores.get(idx).context(ScoreCountSnafu {
                expected: dataset.questions.len(),
                actual: r.scores.len(),
            })?;
            total += *score as f64;
        }
        let avg = round1(total / num_records);
        debug!("per_question_averages: Q{}: {}", q.ordinal, avg);
        res.push(avg);
    }
    Ok(res)
}

/// The mean of all the scores of all the respondents.
pub fn overall_average(dataset: &Dataset) -> SurveyResult<f64> {
    let all_scores: Vec<u8> = dataset
        .records
        .iter()
        .flat_map(|r| r.scores.iter().cloned())
        .collect();
    ensure!(!all_scores.is_empty(), EmptyDatasetSnafu);
    Ok(mean(&all_scores))
}

/// The sample variance of a list of scores.
pub fn sample_variance(scores: &[u8]) -> SurveyResult<f64> {
    ensure!(
        scores.len() >= 2,
        InsufficientDataSnafu {
            count: scores.len()
        }
    );
    // Integer sums, so that a single division is the only rounding.
    let n = scores.len() as u64;
    let sum: u64 = scores.iter().map(|s| *s as u64).sum();
    let sum_sq: u64 = scores.iter().map(|s| (*s as u64) * (*s as u64)).sum();
    Ok((n * sum_sq - sum * sum) as f64 / (n * (n - 1)) as f64)
}

/// Both thresholds are strict: a variance equal to a threshold stays in the
/// band below it.
pub fn variance_band(variance: f64, rules: &AnalysisRules) -> VarianceBand {
    if variance > rules.high_variance_threshold {
        VarianceBand::High
    } else if variance > rules.moderate_variance_threshold {
        VarianceBand::Moderate
    } else {
        VarianceBand::Low
    }
}

pub fn compare_to_average(score: u8, average: f64, rules: &AnalysisRules) -> Comparison {
    let s = score as f64;
    if s > average + rules.comparison_margin {
        Comparison::Higher
    } else if s < average - rules.comparison_margin {
        Comparison::Lower
    } else {
        Comparison::Similar
    }
}

/// Statistics of one respondent, compared to the rest of the organization.
pub fn respondent_summary(
    record: &RespondentRecord,
    dataset: &Dataset,
    rules: &AnalysisRules,
) -> SurveyResult<RespondentSummary> {
    let variance = sample_variance(&record.scores)?;
    let averages = per_question_averages(dataset)?;
    ensure!(
        record.scores.len() == averages.len(),
        ScoreCountSnafu {
            expected: averages.len(),
            actual: record.scores.len(),
        }
    );

    let comparisons: Vec<QuestionComparison> = record
        .scores
        .iter()
        .zip(averages.iter())
        .enumerate()
        .map(|(idx, (score, average))| QuestionComparison {
            ordinal: idx + 1,
            score: *score,
            average: *average,
            comparison: compare_to_average(*score, *average, rules),
        })
        .collect();

    // Not empty: checked by the variance.
    let min = record.scores.iter().cloned().min().unwrap_or(MIN_SCORE);
    let max = record.scores.iter().cloned().max().unwrap_or(MAX_SCORE);
    let ordinals_with = |value: u8| -> Vec<usize> {
        record
            .scores
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == value)
            .map(|(idx, _)| idx + 1)
            .collect()
    };
    let extremes = Extremes {
        min,
        max,
        lowest: ordinals_with(min),
        highest: ordinals_with(max),
    };

    let summary = RespondentSummary {
        name: record.name.clone(),
        mean: mean(&record.scores),
        variance,
        band: variance_band(variance, rules),
        comparisons,
        extremes,
    };
    debug!("respondent_summary: {:?}", summary);
    Ok(summary)
}

/// Finds the questions with a low and a high average.
///
/// `averages` is indexed by question, as returned by [`per_question_averages`].
pub fn classify_questions(averages: &[f64], rules: &AnalysisRules) -> QuestionClassification {
    let mut res = QuestionClassification::default();
    for (idx, avg) in averages.iter().enumerate() {
        if *avg <= rules.low_score_threshold {
            res.low.push(idx + 1);
        } else if *avg >= rules.high_score_threshold {
            res.high.push(idx + 1);
        }
    }
    res
}

/// Runs the whole analysis over a dataset.
pub fn summarize(dataset: &Dataset, rules: &AnalysisRules) -> SurveyResult<SurveySummary> {
    info!(
        "summarize: {} respondents, {} questions",
        dataset.records.len(),
        dataset.questions.len()
    );
    let averages = per_question_averages(dataset)?;
    let overall = overall_average(dataset)?;
    let classification = classify_questions(&averages, rules);
    let question_averages = dataset
        .questions
        .iter()
        .zip(averages.iter())
        .map(|(q, avg)| QuestionAverage {
            ordinal: q.ordinal,
            label: q.label.clone(),
            average: *avg,
        })
        .collect();
    Ok(SurveySummary {
        respondents: dataset.records.len(),
        question_averages,
        overall_average: overall,
        classification,
    })
}
