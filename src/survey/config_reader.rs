use crate::survey::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_WORKSHEET: &str = "survey_results";
pub const DEFAULT_SHEET_PATH: &str = "survey_results.csv";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveySettings {
    #[serde(rename = "surveyName")]
    pub survey_name: String,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
    #[serde(rename = "sheetPath")]
    pub sheet_path: Option<String>,
    #[serde(rename = "adminPasswordFile")]
    pub admin_password_file: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ConfigQuestion {
    pub label: String,
    pub prompt: String,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "highVarianceThreshold")]
    pub high_variance_threshold: Option<f64>,
    #[serde(rename = "moderateVarianceThreshold")]
    pub moderate_variance_threshold: Option<f64>,
    #[serde(rename = "comparisonMargin")]
    pub comparison_margin: Option<f64>,
    #[serde(rename = "lowScoreThreshold")]
    pub low_score_threshold: Option<f64>,
    #[serde(rename = "highScoreThreshold")]
    pub high_score_threshold: Option<f64>,
    #[serde(rename = "defaultScore")]
    pub default_score: Option<u8>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "surveySettings")]
    pub survey_settings: SurveySettings,
    pub questions: Option<Vec<ConfigQuestion>>,
    pub rules: Option<RulesConfig>,
}

/// The configuration once all the defaults and overrides are applied.
#[derive(PartialEq, Debug, Clone)]
pub struct Settings {
    pub survey_name: String,
    pub worksheet_name: String,
    pub sheet_path: PathBuf,
    pub admin_password_file: Option<PathBuf>,
    pub questions: Vec<NewQuestion>,
    pub rules: AnalysisRules,
}

pub fn read_config(path: &str) -> CliResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(&contents).context(ParsingConfigSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Checks the thresholds of the configuration and fills in the missing ones.
pub fn validate_rules(rules: &Option<RulesConfig>) -> CliResult<AnalysisRules> {
    let d = AnalysisRules::DEFAULT_RULES;
    let r = rules.clone().unwrap_or_default();
    let res = AnalysisRules {
        high_variance_threshold: r.high_variance_threshold.unwrap_or(d.high_variance_threshold),
        moderate_variance_threshold: r
            .moderate_variance_threshold
            .unwrap_or(d.moderate_variance_threshold),
        comparison_margin: r.comparison_margin.unwrap_or(d.comparison_margin),
        low_score_threshold: r.low_score_threshold.unwrap_or(d.low_score_threshold),
        high_score_threshold: r.high_score_threshold.unwrap_or(d.high_score_threshold),
        default_score: r.default_score.unwrap_or(d.default_score),
    };
    if !(MIN_SCORE..=MAX_SCORE).contains(&res.default_score) {
        whatever!(
            "defaultScore must be between {} and {}, got {}",
            MIN_SCORE,
            MAX_SCORE,
            res.default_score
        )
    }
    if res.low_score_threshold >= res.high_score_threshold {
        whatever!(
            "lowScoreThreshold ({}) must be below highScoreThreshold ({})",
            res.low_score_threshold,
            res.high_score_threshold
        )
    }
    if res.moderate_variance_threshold >= res.high_variance_threshold {
        whatever!(
            "moderateVarianceThreshold ({}) must be below highVarianceThreshold ({})",
            res.moderate_variance_threshold,
            res.high_variance_threshold
        )
    }
    if res.comparison_margin < 0.0 {
        whatever!(
            "comparisonMargin may not be negative, got {}",
            res.comparison_margin
        )
    }
    Ok(res)
}

/// Merges the configuration file (if any) with the command line.
///
/// Relative paths in the configuration are taken from the directory of the
/// configuration file.
pub fn resolve_settings(
    config: Option<&SurveyConfig>,
    root: Option<&Path>,
    args: &Args,
) -> CliResult<Settings> {
    let root_p: PathBuf = root.map(|p| p.to_path_buf()).unwrap_or_default();
    let in_root = |p: &str| -> PathBuf { root_p.join(p) };

    let rules = validate_rules(&config.and_then(|c| c.rules.clone()))?;
    let questions: Vec<NewQuestion> = match config.and_then(|c| c.questions.clone()) {
        Some(qs) => qs
            .into_iter()
            .map(|q| NewQuestion {
                label: q.label,
                prompt: q.prompt,
            })
            .collect(),
        None => default_questions(),
    };
    let settings = config.map(|c| c.survey_settings.clone());

    let sheet_path = match (&args.sheet, settings.as_ref().and_then(|s| s.sheet_path.clone())) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => in_root(&p),
        (None, None) => in_root(DEFAULT_SHEET_PATH),
    };

    Ok(Settings {
        survey_name: settings
            .as_ref()
            .map(|s| s.survey_name.clone())
            .unwrap_or_else(|| "survey".to_string()),
        worksheet_name: settings
            .as_ref()
            .and_then(|s| s.worksheet_name.clone())
            .unwrap_or_else(|| DEFAULT_WORKSHEET.to_string()),
        sheet_path,
        admin_password_file: settings
            .as_ref()
            .and_then(|s| s.admin_password_file.clone())
            .map(|p| in_root(&p)),
        questions,
        rules,
    })
}

/// The shared administrator secret, read from a local file.
///
/// This is a plain text comparison, not an authentication mechanism.
pub fn read_admin_password(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Ok(_) => {
            warn!(
                "read_admin_password: {:?} is empty, administrator access is disabled",
                path
            );
            None
        }
        Err(e) => {
            warn!(
                "read_admin_password: cannot read {:?} ({}), administrator access is disabled",
                path, e
            );
            None
        }
    }
}

/// The questions of a new sheet when the configuration does not provide any.
pub fn default_questions() -> Vec<NewQuestion> {
    [
        ("Job role", "How satisfied are you with your job role?"),
        ("Pay", "How satisfied are you with your pay and remuneration?"),
        (
            "Staff initiatives",
            "How well do you feel supported by staff initiatives (e.g. Cycle to Work scheme, staff clubs, social events)?",
        ),
        ("Holidays", "How satisfied are you with the number of holidays you receive per year?"),
        (
            "Benefits",
            "How would you rate the staff benefits on offer (e.g. gym fee subsidy, staff development fund)?",
        ),
        (
            "Line manager",
            "How would you describe the quality of support provided to you by your line manager?",
        ),
        ("Career growth", "How would you rate the opportunities for career growth within the organisation?"),
        (
            "Work-life balance",
            "How do you feel regarding life-work balance and workload within your current role?",
        ),
        ("Valued", "How well valued do you feel within your current role?"),
    ]
    .iter()
    .map(|(label, prompt)| NewQuestion {
        label: label.to_string(),
        prompt: prompt.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_config(s: &str) -> SurveyConfig {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse_config(r#"{"surveySettings": {"surveyName": "DT_survey_analytics"}}"#);
        let args = Args::parse_from(["survey"]);
        let settings = resolve_settings(Some(&config), Some(Path::new("/data")), &args).unwrap();
        assert_eq!(settings.survey_name, "DT_survey_analytics");
        assert_eq!(settings.worksheet_name, DEFAULT_WORKSHEET);
        assert_eq!(settings.sheet_path, PathBuf::from("/data/survey_results.csv"));
        assert_eq!(settings.admin_password_file, None);
        assert_eq!(settings.questions.len(), 9);
        assert_eq!(settings.rules, AnalysisRules::DEFAULT_RULES);
    }

    #[test]
    fn config_paths_and_overrides() {
        let config = parse_config(
            r#"{
                "surveySettings": {
                    "surveyName": "staff",
                    "worksheetName": "answers",
                    "sheetPath": "results/answers.csv",
                    "adminPasswordFile": "password.txt"
                },
                "questions": [{"label": "Pay", "prompt": "How is the pay?"}],
                "rules": {"comparisonMargin": 0.5, "defaultScore": 4}
            }"#,
        );
        let args = Args::parse_from(["survey"]);
        let settings = resolve_settings(Some(&config), Some(Path::new("/data")), &args).unwrap();
        assert_eq!(settings.worksheet_name, "answers");
        assert_eq!(settings.sheet_path, PathBuf::from("/data/results/answers.csv"));
        assert_eq!(
            settings.admin_password_file,
            Some(PathBuf::from("/data/password.txt"))
        );
        assert_eq!(
            settings.questions,
            vec![NewQuestion {
                label: "Pay".to_string(),
                prompt: "How is the pay?".to_string()
            }]
        );
        assert_eq!(settings.rules.comparison_margin, 0.5);
        assert_eq!(settings.rules.default_score, 4);
        assert_eq!(settings.rules.low_score_threshold, 2.5);

        let args = Args::parse_from(["survey", "--sheet", "other.csv"]);
        let settings = resolve_settings(Some(&config), Some(Path::new("/data")), &args).unwrap();
        assert_eq!(settings.sheet_path, PathBuf::from("other.csv"));
    }

    #[test]
    fn inconsistent_rules_are_rejected() {
        let bad_score = RulesConfig {
            default_score: Some(0),
            ..Default::default()
        };
        assert!(validate_rules(&Some(bad_score)).is_err());
        let crossed = RulesConfig {
            low_score_threshold: Some(3.6),
            ..Default::default()
        };
        assert!(validate_rules(&Some(crossed)).is_err());
        let variance = RulesConfig {
            moderate_variance_threshold: Some(2.0),
            ..Default::default()
        };
        assert!(validate_rules(&Some(variance)).is_err());
        assert_eq!(validate_rules(&None).unwrap(), AnalysisRules::DEFAULT_RULES);
    }

    #[test]
    fn admin_password_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("password.txt");
        fs::write(&p, "s3cret\n").unwrap();
        assert_eq!(read_admin_password(&p).as_deref(), Some("s3cret"));
        fs::write(&p, "  \n").unwrap();
        assert_eq!(read_admin_password(&p), None);
        assert_eq!(read_admin_password(&dir.path().join("missing.txt")), None);
    }
}
