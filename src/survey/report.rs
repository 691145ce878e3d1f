use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::survey::*;

fn label_of(questions: &[Question], ordinal: usize) -> String {
    questions
        .iter()
        .find(|q| q.ordinal == ordinal)
        .map(|q| q.heading())
        .unwrap_or_else(|| format!("Q{}", ordinal))
}

fn list_of(questions: &[Question], ordinals: &[usize]) -> String {
    ordinals
        .iter()
        .map(|o| label_of(questions, *o))
        .collect::<Vec<String>>()
        .join(", ")
}

/// The analysis of the whole survey, as displayed by the `analyse` command.
pub fn summary_lines(summary: &SurveySummary, questions: &[Question]) -> Vec<String> {
    let mut l: Vec<String> = vec![format!(
        "Survey analysis over {} respondents:",
        summary.respondents
    )];
    for qa in summary.question_averages.iter() {
        l.push(format!(
            "  {:>4.1}  {}",
            qa.average,
            label_of(questions, qa.ordinal)
        ));
    }
    l.push(format!(
        "Overall average score: {:.1}",
        summary.overall_average
    ));
    let c = &summary.classification;
    if !c.high.is_empty() {
        l.push(format!("Highest scoring areas: {}", list_of(questions, &c.high)));
    }
    if c.low.is_empty() {
        l.push("No question has a low average score.".to_string());
    } else {
        l.push(format!("Lowest scoring areas: {}", list_of(questions, &c.low)));
        l.push("Recommendations:".to_string());
        for o in c.low.iter() {
            l.push(format!(
                "  - Review {}: staff rate this area poorly.",
                label_of(questions, *o)
            ));
        }
    }
    l
}

/// The answers of one respondent, compared to the organization.
pub fn respondent_lines(
    record: &RespondentRecord,
    dataset: &Dataset,
    rules: &AnalysisRules,
) -> SurveyResult<Vec<String>> {
    let mut l: Vec<String> = vec![format!("Survey results for {}:", record.name)];
    match respondent_summary(record, dataset, rules) {
        Ok(s) => {
            for c in s.comparisons.iter() {
                l.push(format!(
                    "  {}  {} (organization average {:.1}, {})",
                    c.score,
                    label_of(&dataset.questions, c.ordinal),
                    c.average,
                    c.comparison.as_str()
                ));
            }
            l.push(format!(
                "Average score: {:.1}, variance: {:.2} ({} variation between answers)",
                s.mean,
                s.variance,
                s.band.as_str()
            ));
            l.push(format!(
                "Lowest score ({}): {}",
                s.extremes.min,
                list_of(&dataset.questions, &s.extremes.lowest)
            ));
            l.push(format!(
                "Highest score ({}): {}",
                s.extremes.max,
                list_of(&dataset.questions, &s.extremes.highest)
            ));
        }
        Err(SurveyError::InsufficientData { count }) => {
            for (q, score) in dataset.questions.iter().zip(record.scores.iter()) {
                l.push(format!("  {}  {}", score, q.heading()));
            }
            l.push(format!(
                "Not enough answers ({}) to compare with the organization.",
                count
            ));
        }
        Err(e) => return Err(e),
    }
    Ok(l)
}

pub fn summary_to_json(settings: &Settings, summary: &SurveySummary) -> JSValue {
    let questions: Vec<JSValue> = summary
        .question_averages
        .iter()
        .map(|qa| {
            json!({
                "question": qa.ordinal,
                "label": qa.label,
                "average": qa.average,
            })
        })
        .collect();
    json!({
        "config": {
            "survey": settings.survey_name,
            "worksheet": settings.worksheet_name,
        },
        "results": {
            "respondents": summary.respondents,
            "questions": questions,
            "overallAverage": summary.overall_average,
            "lowScoring": summary.classification.low,
            "highScoring": summary.classification.high,
        }
    })
}

pub fn read_summary(path: &str) -> CliResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningSummarySnafu { path })?;
    let js: JSValue = serde_json::from_str(&contents).context(ParsingSummarySnafu { path })?;
    Ok(js)
}

/// Compares a computed summary (pretty-printed) with a reference summary file.
pub fn check_reference(pretty_js_stats: &str, reference_path: &str) -> CliResult<()> {
    let summary_ref = read_summary(reference_path)?;
    info!("reference summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingSummarySnafu {
            path: reference_path,
        })?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn dataset() -> Dataset {
        let questions = ["Job role", "Pay", "Holidays"]
            .iter()
            .enumerate()
            .map(|(idx, l)| Question {
                ordinal: idx + 1,
                label: l.to_string(),
                prompt: format!("How satisfied are you with your {}?", l),
            })
            .collect();
        Dataset {
            questions,
            records: vec![
                RespondentRecord {
                    name: "Alice".to_string(),
                    scores: vec![5, 2, 4],
                },
                RespondentRecord {
                    name: "Bob".to_string(),
                    scores: vec![4, 1, 4],
                },
            ],
        }
    }

    fn settings() -> Settings {
        let args = Args::parse_from(["survey"]);
        resolve_settings(None, None, &args).unwrap()
    }

    #[test]
    fn analysis_lists_recommendations() {
        let ds = dataset();
        let summary = summarize(&ds, &AnalysisRules::DEFAULT_RULES).unwrap();
        let lines = summary_lines(&summary, &ds.questions);
        assert_eq!(lines[0], "Survey analysis over 2 respondents:");
        assert_eq!(lines[1], "   4.5  Q1 - Job role");
        assert!(lines.contains(&"Overall average score: 3.3".to_string()));
        assert!(lines.contains(&"Highest scoring areas: Q1 - Job role, Q3 - Holidays".to_string()));
        assert!(lines.contains(&"Lowest scoring areas: Q2 - Pay".to_string()));
        assert!(lines.iter().any(|l| l.contains("Review Q2 - Pay")));
    }

    #[test]
    fn respondent_report() {
        let ds = dataset();
        let lines = respondent_lines(&ds.records[1], &ds, &AnalysisRules::DEFAULT_RULES).unwrap();
        assert_eq!(lines[0], "Survey results for Bob:");
        assert_eq!(
            lines[2],
            "  1  Q2 - Pay (organization average 1.5, lower)"
        );
        assert!(lines.contains(&"Lowest score (1): Q2 - Pay".to_string()));
        assert!(lines.contains(&"Highest score (4): Q1 - Job role, Q3 - Holidays".to_string()));
    }

    #[test]
    fn json_summary_matches_itself_as_reference() {
        let ds = dataset();
        let summary = summarize(&ds, &AnalysisRules::DEFAULT_RULES).unwrap();
        let js = summary_to_json(&settings(), &summary);
        assert_eq!(js["results"]["lowScoring"], json!([2]));
        assert_eq!(js["results"]["questions"][0]["average"], json!(4.5));
        let pretty = serde_json::to_string_pretty(&js).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("expected_summary.json");
        fs::write(&p, &pretty).unwrap();
        let p_s = p.display().to_string();
        assert!(check_reference(&pretty, &p_s).is_ok());

        let other = pretty.replace("\"respondents\": 2", "\"respondents\": 3");
        assert!(check_reference(&other, &p_s).is_err());
    }
}
