use log::{debug, info, warn};
use snafu::prelude::*;

use crate::config::*;
use crate::store::TabularStore;

/// The row holding the question headings.
pub(crate) const HEADER_ROW: usize = 1;
/// The first row holding a respondent.
pub(crate) const FIRST_DATA_ROW: usize = 2;
/// The column holding the names of the respondents.
pub(crate) const NAME_COLUMN: usize = 1;
pub const NAME_HEADING: &str = "Name";

/// The column of the sheet holding the scores for a question.
pub(crate) fn score_column(ordinal: usize) -> usize {
    NAME_COLUMN + ordinal
}

/// A survey stored in a tabular store.
///
/// The sheet owns the store. The questions are kept in memory, the records
/// are always read from the store.
#[derive(Debug)]
pub struct SurveySheet<S: TabularStore> {
    pub(crate) store: S,
    pub(crate) questions: Vec<Question>,
    pub(crate) rules: AnalysisRules,
}

impl<S: TabularStore> SurveySheet<S> {
    /// Opens the survey held in a store.
    ///
    /// If the store is empty, a header is written and the seed questions are
    /// added to it.
    pub fn open(
        store: S,
        seed: &[NewQuestion],
        rules: &AnalysisRules,
    ) -> SurveyResult<SurveySheet<S>> {
        let mut sheet = SurveySheet {
            store,
            questions: Vec::new(),
            rules: rules.clone(),
        };
        let rows = sheet.store.all_rows()?;
        match rows.first() {
            None => {
                info!(
                    "open: {}: empty sheet, adding {} questions",
                    sheet.store.name(),
                    seed.len()
                );
                sheet.store.append_row(&[NAME_HEADING.to_string()])?;
                for q in seed {
                    sheet.push_question(&q.prompt, &q.label)?;
                }
                sheet.store.commit()?;
            }
            Some(header) => {
                sheet.load_questions(header)?;
            }
        }
        info!(
            "open: {}: {} questions, {} respondents",
            sheet.store.name(),
            sheet.questions.len(),
            rows.len().saturating_sub(1)
        );
        Ok(sheet)
    }

    fn load_questions(&mut self, header: &[String]) -> SurveyResult<()> {
        for (idx, heading) in header.iter().enumerate().skip(NAME_COLUMN) {
            let col = idx + 1;
            let label = parse_heading(heading);
            let prompt = match self.store.note(HEADER_ROW, col)? {
                Some(p) => p,
                None => {
                    warn!(
                        "load_questions: column {} ({:?}) has no prompt, using the heading",
                        col, heading
                    );
                    label.clone()
                }
            };
            debug!("load_questions: column {}: {:?}", col, label);
            self.questions.push(Question {
                ordinal: 0,
                label,
                prompt,
            });
        }
        if self.reindex()? {
            self.store.commit()?;
        }
        Ok(())
    }

    /// Rebuilds the ordinals from the positions of the questions and rewrites
    /// the headings that do not match them.
    ///
    /// Returns true if the store was modified.
    pub(crate) fn reindex(&mut self) -> SurveyResult<bool> {
        let header = self.store.all_rows()?.into_iter().next().unwrap_or_default();
        let mut modified = false;
        for (idx, q) in self.questions.iter_mut().enumerate() {
            q.ordinal = idx + 1;
            let col = score_column(q.ordinal);
            let heading = q.heading();
            if header.get(col - 1) != Some(&heading) {
                debug!("reindex: column {}: {:?}", col, heading);
                self.store.update_cell(HEADER_ROW, col, &heading)?;
                modified = true;
            }
        }
        Ok(modified)
    }

    /// Appends a question to the sheet, without committing.
    pub(crate) fn push_question(&mut self, prompt: &str, label: &str) -> SurveyResult<usize> {
        let q = Question {
            ordinal: self.questions.len() + 1,
            label: label.to_string(),
            prompt: prompt.to_string(),
        };
        let col = score_column(q.ordinal);
        let num_rows = self.store.all_rows()?.len();
        let mut values = vec![q.heading()];
        values.extend(
            std::iter::repeat(self.rules.default_score.to_string()).take(num_rows - HEADER_ROW),
        );
        self.store.insert_column(col, &values)?;
        self.store.set_note(HEADER_ROW, col, prompt)?;
        let ordinal = q.ordinal;
        self.questions.push(q);
        Ok(ordinal)
    }

    pub fn rules(&self) -> &AnalysisRules {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// The snapshot of the survey used by the analysis.
    pub fn dataset(&self) -> SurveyResult<Dataset> {
        let rows = self.store.all_rows()?;
        let mut records = Vec::new();
        for (idx, row) in rows.iter().enumerate().skip(HEADER_ROW) {
            records.push(self.parse_record(idx + 1, row)?);
        }
        debug!("dataset: {} records", records.len());
        Ok(Dataset {
            questions: self.questions.clone(),
            records,
        })
    }

    pub(crate) fn parse_record(&self, row_idx: usize, row: &[String]) -> SurveyResult<RespondentRecord> {
        let name = row.first().cloned().unwrap_or_default();
        let mut scores = Vec::with_capacity(self.questions.len());
        for q in self.questions.iter() {
            let col = score_column(q.ordinal);
            let cell = row.get(col - 1).context(MalformedSheetSnafu {
                row: row_idx,
                col,
                message: "missing score",
            })?;
            let score = match cell.trim().parse::<u8>() {
                Ok(s) if (MIN_SCORE..=MAX_SCORE).contains(&s) => s,
                _ => {
                    return MalformedSheetSnafu {
                        row: row_idx,
                        col,
                        message: format!("{:?} is not a score", cell),
                    }
                    .fail();
                }
            };
            scores.push(score);
        }
        Ok(RespondentRecord { name, scores })
    }
}

/// Extracts the label from a heading of the form `Q<n> - <label>`.
///
/// Headings written by hand may not follow this form, in which case the
/// whole heading is the label.
fn parse_heading(heading: &str) -> String {
    if let Some((prefix, label)) = heading.split_once(" - ") {
        let digits = prefix.strip_prefix('Q').unwrap_or("");
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return label.to_string();
        }
    }
    heading.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySheet;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_heading_strips_numbering() {
        assert_eq!(parse_heading("Q12 - Pay - bonus"), "Pay - bonus");
        assert_eq!(parse_heading("Pay"), "Pay");
        assert_eq!(parse_heading("Qx - Pay"), "Qx - Pay");
    }

    #[test]
    fn open_empty_store_writes_seed_questions() {
        let seed = vec![
            NewQuestion {
                label: "Job role".to_string(),
                prompt: "How satisfied are you with your job role?".to_string(),
            },
            NewQuestion {
                label: "Pay".to_string(),
                prompt: "How satisfied are you with your pay?".to_string(),
            },
        ];
        let sheet = SurveySheet::open(
            MemorySheet::new("survey_results"),
            &seed,
            &AnalysisRules::DEFAULT_RULES,
        )
        .unwrap();
        let rows = sheet.store().all_rows().unwrap();
        assert_eq!(rows, vec![strings(&["Name", "Q1 - Job role", "Q2 - Pay"])]);
        assert_eq!(
            sheet.store().note(1, 3).unwrap().as_deref(),
            Some("How satisfied are you with your pay?")
        );
    }

    #[test]
    fn open_repairs_out_of_sequence_headings() {
        let store = MemorySheet::with_rows(
            "survey_results",
            vec![
                strings(&["Name", "Q1 - Pay", "Q3 - Holidays", "Benefits"]),
                strings(&["Alice", "5", "4", "2"]),
            ],
        );
        let sheet = SurveySheet::open(store, &[], &AnalysisRules::DEFAULT_RULES).unwrap();
        let ordinals: Vec<usize> = sheet.questions.iter().map(|q| q.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert_eq!(
            sheet.store().column(3).unwrap(),
            strings(&["Q2 - Holidays", "4"])
        );
        assert_eq!(
            sheet.store().column(4).unwrap(),
            strings(&["Q3 - Benefits", "2"])
        );
        // Without a note, the prompt falls back to the label.
        assert_eq!(sheet.questions[2].prompt, "Benefits");
    }

    #[test]
    fn dataset_rejects_bad_cells() {
        let store = MemorySheet::with_rows(
            "survey_results",
            vec![
                strings(&["Name", "Q1 - Pay", "Q2 - Holidays"]),
                strings(&["Alice", "5", "4"]),
                strings(&["Bob", "7", "4"]),
            ],
        );
        let sheet = SurveySheet::open(store, &[], &AnalysisRules::DEFAULT_RULES).unwrap();
        assert!(matches!(
            sheet.dataset(),
            Err(SurveyError::MalformedSheet { row: 3, col: 2, .. })
        ));
    }

    #[test]
    fn dataset_rejects_short_rows() {
        let store = MemorySheet::with_rows(
            "survey_results",
            vec![
                strings(&["Name", "Q1 - Pay", "Q2 - Holidays"]),
                strings(&["Alice", "5"]),
            ],
        );
        let sheet = SurveySheet::open(store, &[], &AnalysisRules::DEFAULT_RULES).unwrap();
        assert!(matches!(
            sheet.dataset(),
            Err(SurveyError::MalformedSheet { row: 2, col: 3, .. })
        ));
    }
}
