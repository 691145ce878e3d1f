use log::info;
use snafu::prelude::*;

use crate::config::*;
use crate::sheet::{score_column, SurveySheet};
use crate::store::TabularStore;

impl<S: TabularStore> SurveySheet<S> {
    /// Adds a question after all the current ones.
    ///
    /// Every existing respondent receives the default score for it.
    /// Returns the ordinal of the new question.
    pub fn add_question(&mut self, prompt: &str, label: &str) -> SurveyResult<usize> {
        let ordinal = self.push_question(prompt, label)?;
        self.store.commit()?;
        info!("add_question: Q{} {:?}", ordinal, label);
        Ok(ordinal)
    }

    /// Removes a question and the corresponding score of every respondent.
    ///
    /// The questions after it move down by one.
    pub fn remove_question(&mut self, ordinal: usize) -> SurveyResult<Question> {
        let count = self.questions.len();
        ensure!(
            ordinal >= 1 && ordinal <= count,
            OutOfRangeSnafu { ordinal, count }
        );
        self.store.delete_column(score_column(ordinal))?;
        let removed = self.questions.remove(ordinal - 1);
        self.reindex()?;
        self.store.commit()?;
        info!("remove_question: Q{} {:?}", ordinal, removed.label);
        Ok(removed)
    }

    /// The text of all the questions, in order.
    pub fn list_questions(&self, form: QuestionForm) -> Vec<String> {
        self.questions
            .iter()
            .map(|q| match form {
                QuestionForm::Prompt => q.prompt.clone(),
                QuestionForm::Label => q.label.clone(),
            })
            .collect()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, ordinal: usize) -> Option<&Question> {
        ordinal
            .checked_sub(1)
            .and_then(|idx| self.questions.get(idx))
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}
