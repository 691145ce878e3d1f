// A survey sheet stored as a CSV file.

use serde::{Deserialize, Serialize};
use survey_analytics::store::MemorySheet;

use crate::survey::*;

/// An annotation of the sheet, as stored in the notes file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct NoteEntry {
    row: usize,
    col: usize,
    text: String,
}

/// A worksheet held in a CSV file, with its notes in a JSON file next to it.
///
/// The content is kept in memory and written back on every commit.
#[derive(Debug)]
pub struct FileSheet {
    path: PathBuf,
    inner: MemorySheet,
}

pub fn notes_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".notes.json");
    PathBuf::from(s)
}

fn backend<E: std::error::Error + Send + Sync + 'static>(e: E) -> SurveyError {
    SurveyError::Backend {
        source: Box::new(e),
    }
}

impl FileSheet {
    /// Reads the sheet. A missing file is an empty sheet, created at the first commit.
    pub fn open(path: &Path, worksheet: &str) -> CliResult<FileSheet> {
        let path_s = path.display().to_string();
        if !path.exists() {
            info!("FileSheet::open: {:?} does not exist, starting an empty sheet", path_s);
            return Ok(FileSheet {
                path: path.to_path_buf(),
                inner: MemorySheet::new(worksheet),
            });
        }

        let rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .context(CsvOpenSnafu { path: &path_s })?;
        let mut rows: Vec<Vec<String>> = Vec::new();
        for (idx, line_r) in rdr.into_records().enumerate() {
            let line = line_r.context(CsvLineParseSnafu { path: &path_s })?;
            debug!("FileSheet::open: lineno: {:?} row: {:?}", idx + 1, &line);
            rows.push(line.iter().map(|s| s.to_string()).collect());
        }
        let mut inner = MemorySheet::with_rows(worksheet, rows);

        let np = notes_path(path);
        if np.exists() {
            let np_s = np.display().to_string();
            let contents = fs::read_to_string(&np).context(OpeningNotesSnafu { path: &np_s })?;
            let notes: Vec<NoteEntry> =
                serde_json::from_str(&contents).context(ParsingNotesSnafu { path: &np_s })?;
            for n in notes {
                inner.set_note(n.row, n.col, &n.text)?;
            }
        } else {
            warn!("FileSheet::open: no notes file {:?}", np);
        }
        info!(
            "FileSheet::open: {:?}: {} rows",
            path_s,
            inner.row_count()
        );
        Ok(FileSheet {
            path: path.to_path_buf(),
            inner,
        })
    }

    fn write_out(&self) -> SurveyResult<()> {
        // Both files are written next to their targets first and renamed at
        // the end, notes before rows, so that a failed write leaves the
        // previous sheet in place.
        let csv_tmp = tmp_path(&self.path);
        {
            let mut wtr = csv::WriterBuilder::new()
                .flexible(true)
                .from_path(&csv_tmp)
                .map_err(backend)?;
            for row in self.inner.all_rows()? {
                wtr.write_record(&row).map_err(backend)?;
            }
            wtr.flush().map_err(backend)?;
        }

        let notes: Vec<NoteEntry> = self
            .inner
            .notes()
            .map(|(row, col, text)| NoteEntry {
                row,
                col,
                text: text.to_string(),
            })
            .collect();
        let js = serde_json::to_string_pretty(&notes).map_err(backend)?;
        let np = notes_path(&self.path);
        let notes_tmp = tmp_path(&np);
        fs::write(&notes_tmp, js).map_err(backend)?;

        fs::rename(&notes_tmp, &np).map_err(backend)?;
        fs::rename(&csv_tmp, &self.path).map_err(backend)?;
        debug!("FileSheet::write_out: {:?}", self.path);
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".tmp");
    PathBuf::from(s)
}

impl TabularStore for FileSheet {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn all_rows(&self) -> SurveyResult<Vec<Vec<String>>> {
        self.inner.all_rows()
    }

    fn column(&self, col: usize) -> SurveyResult<Vec<String>> {
        self.inner.column(col)
    }

    fn find_row(&self, value: &str, from_row: usize) -> SurveyResult<Option<usize>> {
        self.inner.find_row(value, from_row)
    }

    fn append_row(&mut self, row: &[String]) -> SurveyResult<()> {
        self.inner.append_row(row)
    }

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> SurveyResult<()> {
        self.inner.update_cell(row, col, value)
    }

    fn insert_column(&mut self, col: usize, values: &[String]) -> SurveyResult<()> {
        self.inner.insert_column(col, values)
    }

    fn delete_column(&mut self, col: usize) -> SurveyResult<()> {
        self.inner.delete_column(col)
    }

    fn delete_row(&mut self, row: usize) -> SurveyResult<()> {
        self.inner.delete_row(row)
    }

    fn note(&self, row: usize, col: usize) -> SurveyResult<Option<String>> {
        self.inner.note(row, col)
    }

    fn set_note(&mut self, row: usize, col: usize, text: &str) -> SurveyResult<()> {
        self.inner.set_note(row, col, text)
    }

    fn commit(&mut self) -> SurveyResult<()> {
        self.write_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Vec<NewQuestion> {
        ["Job role", "Pay", "Holidays"]
            .iter()
            .map(|l| NewQuestion {
                label: l.to_string(),
                prompt: format!("How satisfied are you with your {}?", l.to_lowercase()),
            })
            .collect()
    }

    #[test]
    fn missing_file_is_created_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("survey_results.csv");
        let store = FileSheet::open(&p, "survey_results").unwrap();
        let _sheet = SurveySheet::open(store, &seed(), &AnalysisRules::DEFAULT_RULES).unwrap();
        let contents = fs::read_to_string(&p).unwrap();
        assert_eq!(contents, "Name,Q1 - Job role,Q2 - Pay,Q3 - Holidays\n");
        assert!(notes_path(&p).exists());
    }

    #[test]
    fn changes_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("survey_results.csv");
        {
            let store = FileSheet::open(&p, "survey_results").unwrap();
            let mut sheet =
                SurveySheet::open(store, &seed(), &AnalysisRules::DEFAULT_RULES).unwrap();
            sheet.create("Alice", &[5, 4, 3]).unwrap();
            sheet.create("Bob, Jr.", &[1, 2, 2]).unwrap();
            sheet.remove_question(1).unwrap();
            sheet
                .add_question("How would you rate the staff benefits?", "Benefits")
                .unwrap();
        }
        let store = FileSheet::open(&p, "survey_results").unwrap();
        let sheet = SurveySheet::open(store, &[], &AnalysisRules::DEFAULT_RULES).unwrap();
        assert_eq!(
            sheet.list_questions(QuestionForm::Label),
            vec!["Pay", "Holidays", "Benefits"]
        );
        assert_eq!(
            sheet.list_questions(QuestionForm::Prompt),
            vec![
                "How satisfied are you with your pay?",
                "How satisfied are you with your holidays?",
                "How would you rate the staff benefits?"
            ]
        );
        assert_eq!(sheet.find("Alice").unwrap().scores, vec![4, 3, 3]);
        assert_eq!(sheet.find("Bob, Jr.").unwrap().scores, vec![2, 2, 3]);
        let contents = fs::read_to_string(&p).unwrap();
        assert!(contents.starts_with("Name,Q1 - Pay,Q2 - Holidays,Q3 - Benefits\n"));
    }

    #[test]
    fn failed_write_keeps_previous_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("survey_results.csv");
        let store = FileSheet::open(&p, "survey_results").unwrap();
        let mut sheet = SurveySheet::open(store, &seed(), &AnalysisRules::DEFAULT_RULES).unwrap();
        let before = fs::read_to_string(&p).unwrap();
        let notes_before = fs::read_to_string(notes_path(&p)).unwrap();

        // The notes cannot be written over a directory.
        fs::create_dir(tmp_path(&notes_path(&p))).unwrap();
        assert!(matches!(
            sheet.remove_question(1),
            Err(SurveyError::Backend { .. })
        ));
        assert_eq!(fs::read_to_string(&p).unwrap(), before);
        assert_eq!(fs::read_to_string(notes_path(&p)).unwrap(), notes_before);
    }

    #[test]
    fn malformed_notes_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("survey_results.csv");
        fs::write(&p, "Name,Q1 - Pay\nAlice,4\n").unwrap();
        fs::write(notes_path(&p), "not json").unwrap();
        assert!(matches!(
            FileSheet::open(&p, "survey_results"),
            Err(CliError::ParsingNotes { .. })
        ));
    }
}
