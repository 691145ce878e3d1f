/*!

This is the long-form manual for `survey_analytics` and the `survey` command.

## Layout of the sheet

A survey lives in a single worksheet. The first row is the header, every
following row is a respondent:

| Name  | Q1 - Job role | Q2 - Pay | Q3 - Holidays |
|-------|---------------|----------|---------------|
| Alice | 5             | 4        | 3             |
| Bob   | 2             | 1        | 4             |

- The first column holds the names of the respondents. Names are unique and
  case-sensitive.
- Each other column is a question. The header cell holds the short label,
  prefixed by the number of the question. The full wording of the question
  is kept as a note on the header cell.
- Scores are whole numbers from 1 (very poor) to 5 (excellent).

When a question is added, all the respondents already in the sheet get a
score of 3 for it (this can be changed with `defaultScore`). When a question
is removed, its column disappears and the questions after it are renumbered.

The numbering in the headings is maintained by the program. Headings edited
by hand that are out of sequence are renumbered the next time the sheet is
opened.

## Local sheets

The `survey` command stores the worksheet as a CSV file. The notes are kept
next to it, in a file with the same name followed by `.notes.json`. A missing
file is created on first use with the questions of the configuration.

An export of the survey in Excel format can be merged into the sheet with
`--import`. The export must use the same layout and the same number of
questions.

## Analysis

For each question, the average over all the respondents is rounded to one
decimal. Questions with an average of 2.5 or less are reported as areas to
work on, questions with an average of 3.5 or more as strengths.

For a respondent, the sample variance of their scores is reported as:
- *high* above 2.0
- *moderate* above 1.3
- *low* otherwise

Each score is compared to the average of its question: *higher* when more than
0.4 above, *lower* when more than 0.4 below, *similar* otherwise.

All these thresholds can be changed in the `rules` section of the
configuration file:

```json
{
  "surveySettings": { "surveyName": "DT_survey_analytics" },
  "rules": {
    "highVarianceThreshold": 2.0,
    "moderateVarianceThreshold": 1.3,
    "comparisonMargin": 0.4,
    "lowScoreThreshold": 2.5,
    "highScoreThreshold": 3.5,
    "defaultScore": 3
  }
}
```

*/
