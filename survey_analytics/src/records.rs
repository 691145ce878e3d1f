use log::{debug, info};
use snafu::prelude::*;

use crate::config::*;
use crate::sheet::{score_column, SurveySheet, FIRST_DATA_ROW, NAME_COLUMN};
use crate::store::TabularStore;

impl<S: TabularStore> SurveySheet<S> {
    /// Adds the answers of a new respondent at the end of the sheet.
    pub fn create(&mut self, name: &str, scores: &[u8]) -> SurveyResult<()> {
        ensure!(
            self.row_of(name)?.is_none(),
            DuplicateNameSnafu { name }
        );
        self.check_scores(scores)?;
        let mut row = vec![name.to_string()];
        row.extend(scores.iter().map(|s| s.to_string()));
        self.store.append_row(&row)?;
        self.store.commit()?;
        info!("create: {:?}", name);
        Ok(())
    }

    /// The record of a respondent. Names are case-sensitive.
    pub fn find(&self, name: &str) -> SurveyResult<RespondentRecord> {
        let row_idx = self.row_of(name)?.context(NotFoundSnafu { name })?;
        let rows = self.store.all_rows()?;
        let row = rows.get(row_idx - 1).context(NotFoundSnafu { name })?;
        self.parse_record(row_idx, row)
    }

    /// Replaces all the scores of a respondent.
    ///
    /// Nothing is written unless the change was confirmed. Returns whether the
    /// sheet was updated.
    pub fn update(&mut self, name: &str, scores: &[u8], confirmed: bool) -> SurveyResult<bool> {
        let row_idx = self.row_of(name)?.context(NotFoundSnafu { name })?;
        self.check_scores(scores)?;
        if !confirmed {
            debug!("update: {:?}: not confirmed", name);
            return Ok(false);
        }
        for (idx, score) in scores.iter().enumerate() {
            self.store
                .update_cell(row_idx, score_column(idx + 1), &score.to_string())?;
        }
        self.store.commit()?;
        info!("update: {:?}: {:?}", name, scores);
        Ok(true)
    }

    /// Replaces the score of a respondent for one question.
    ///
    /// Nothing is written unless the change was confirmed. Returns whether the
    /// sheet was updated.
    pub fn update_one(
        &mut self,
        name: &str,
        ordinal: usize,
        value: u8,
        confirmed: bool,
    ) -> SurveyResult<bool> {
        let row_idx = self.row_of(name)?.context(NotFoundSnafu { name })?;
        let count = self.questions.len();
        ensure!(
            ordinal >= 1 && ordinal <= count,
            OutOfRangeSnafu { ordinal, count }
        );
        ensure!(
            (MIN_SCORE..=MAX_SCORE).contains(&value),
            OutOfDomainSnafu { value }
        );
        if !confirmed {
            debug!("update_one: {:?}: not confirmed", name);
            return Ok(false);
        }
        self.store
            .update_cell(row_idx, score_column(ordinal), &value.to_string())?;
        self.store.commit()?;
        info!("update_one: {:?}: Q{} = {}", name, ordinal, value);
        Ok(true)
    }

    /// Removes a respondent from the sheet.
    pub fn delete(&mut self, name: &str) -> SurveyResult<()> {
        let row_idx = self.row_of(name)?.context(NotFoundSnafu { name })?;
        self.store.delete_row(row_idx)?;
        self.store.commit()?;
        info!("delete: {:?}", name);
        Ok(())
    }

    /// The names of all the respondents, in the order they were added.
    pub fn list_names(&self) -> SurveyResult<Vec<String>> {
        Ok(self
            .store
            .column(NAME_COLUMN)?
            .into_iter()
            .skip(FIRST_DATA_ROW - 1)
            .collect())
    }

    fn row_of(&self, name: &str) -> SurveyResult<Option<usize>> {
        self.store.find_row(name, FIRST_DATA_ROW)
    }

    fn check_scores(&self, scores: &[u8]) -> SurveyResult<()> {
        ensure!(
            scores.len() == self.questions.len(),
            ScoreCountSnafu {
                expected: self.questions.len(),
                actual: scores.len(),
            }
        );
        if let Some(value) = scores
            .iter()
            .find(|s| !(MIN_SCORE..=MAX_SCORE).contains(*s))
        {
            return OutOfDomainSnafu { value: *value }.fail();
        }
        Ok(())
    }
}
