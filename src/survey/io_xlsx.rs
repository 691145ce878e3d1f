// Import of survey results exported in Excel format.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use survey_analytics::validate::validate_score;

use crate::survey::*;

/// Reads the respondents of an exported worksheet.
///
/// The worksheet has the same layout as the survey sheet: a header, then one
/// row per respondent with the name first. `num_questions` is the number of
/// question columns expected.
pub fn read_xlsx_responses(
    path: &str,
    worksheet: Option<&str>,
    num_questions: usize,
) -> CliResult<Vec<RespondentRecord>> {
    let wrange = get_range(path, worksheet)?;
    parse_responses(&wrange, path, num_questions)
}

/// Reads the respondents of a worksheet already loaded. `path` is only used
/// in the errors.
fn parse_responses(
    wrange: &calamine::Range<DataType>,
    path: &str,
    num_questions: usize,
) -> CliResult<Vec<RespondentRecord>> {
    let header = wrange.rows().next().context(EmptyExcelSnafu { path })?;
    debug!("read_xlsx_responses: header: {:?}", header);
    let header_questions = header
        .iter()
        .skip(1)
        .filter(|c| !matches!(c, DataType::Empty))
        .count();
    if header_questions != num_questions {
        whatever!(
            "{} has {} questions, the survey has {}",
            path,
            header_questions,
            num_questions
        )
    }

    let mut res: Vec<RespondentRecord> = Vec::new();
    // The header is line 1.
    for (idx, row) in wrange.rows().enumerate().skip(1) {
        let lineno = idx + 1;
        debug!("read_xlsx_responses: lineno: {:?} row: {:?}", lineno, row);
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            continue;
        }
        let name = match row.first() {
            Some(DataType::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => {
                return ExcelWrongCellTypeSnafu {
                    lineno,
                    content: format!("missing name in {:?}", row),
                }
                .fail();
            }
        };
        let mut scores: Vec<u8> = Vec::with_capacity(num_questions);
        for col in 1..=num_questions {
            let cell = row.get(col).cloned().unwrap_or(DataType::Empty);
            let text = match &cell {
                DataType::Int(i) => i.to_string(),
                DataType::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
                DataType::String(s) => s.clone(),
                _ => {
                    return ExcelWrongCellTypeSnafu {
                        lineno,
                        content: format!("{:?} IN {:?}", cell, row),
                    }
                    .fail();
                }
            };
            let score = validate_score(&text).map_err(|e| CliError::ExcelWrongCellType {
                lineno,
                content: e.to_string(),
            })?;
            scores.push(score);
        }
        res.push(RespondentRecord { name, scores });
    }
    Ok(res)
}

/// Adds the respondents of an Excel export that are not in the sheet yet.
///
/// Returns the number of respondents added.
pub fn import_xlsx<S: TabularStore>(
    sheet: &mut SurveySheet<S>,
    path: &str,
    worksheet: Option<&str>,
) -> CliResult<usize> {
    info!("Attempting to import {:?}", path);
    let records = read_xlsx_responses(path, worksheet, sheet.question_count())?;
    add_new_records(sheet, records, path)
}

fn add_new_records<S: TabularStore>(
    sheet: &mut SurveySheet<S>,
    records: Vec<RespondentRecord>,
    path: &str,
) -> CliResult<usize> {
    let existing = sheet.list_names()?;
    let mut added = 0;
    for r in records {
        if existing.contains(&r.name) {
            warn!("import_xlsx: skipping {:?}, already in the sheet", r.name);
            continue;
        }
        match sheet.create(&r.name, &r.scores) {
            Ok(()) => added += 1,
            Err(SurveyError::DuplicateName { name }) => {
                warn!("import_xlsx: skipping {:?}, listed twice in {}", name, path);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(added)
}

fn get_range(path: &str, worksheet: Option<&str>) -> CliResult<calamine::Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                worksheet: worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
                Ok(wrange.clone())
            }
            _ => {
                whatever!(
                    "{} has {} worksheets, the worksheet name must be provided",
                    path,
                    all_worksheets.len()
                )
            }
        }
    }
}
