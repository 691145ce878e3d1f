//! Checks on the free-form input of the users.
//!
//! These functions never prompt: the caller asks again until the input is
//! accepted. Surrounding whitespace is ignored.

use snafu::prelude::*;

use crate::config::*;

/// The commands of the menus.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Command {
    Add,
    Update,
    Delete,
    List,
    Read,
    ReadQuestions,
    AddQuestion,
    DeleteQuestion,
    Analyse,
    Exit,
}

impl Command {
    /// The main keyword of the command.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Add => "add",
            Command::Update => "update",
            Command::Delete => "delete",
            Command::List => "list",
            Command::Read => "read",
            Command::ReadQuestions => "read q",
            Command::AddQuestion => "add q",
            Command::DeleteQuestion => "delete q",
            Command::Analyse => "analyse",
            Command::Exit => "exit",
        }
    }

    fn parse(raw: &str) -> Option<Command> {
        let words: Vec<&str> = raw.split_whitespace().collect();
        let c = match words.as_slice() {
            ["add"] => Command::Add,
            ["update"] | ["amend"] => Command::Update,
            ["delete"] => Command::Delete,
            ["list"] => Command::List,
            ["read"] => Command::Read,
            ["read", "q"] => Command::ReadQuestions,
            ["add", "q"] => Command::AddQuestion,
            ["delete", "q"] => Command::DeleteQuestion,
            ["analyse"] => Command::Analyse,
            ["exit"] => Command::Exit,
            _ => return None,
        };
        Some(c)
    }
}

pub fn validate_score(raw: &str) -> SurveyResult<u8> {
    match raw.trim().parse::<i64>() {
        Ok(x) if x >= MIN_SCORE as i64 && x <= MAX_SCORE as i64 => Ok(x as u8),
        _ => InvalidScoreSnafu { input: raw.trim() }.fail(),
    }
}

/// Accepts the commands of the `allowed` set only.
pub fn validate_menu_command(raw: &str, allowed: &[Command]) -> SurveyResult<Command> {
    match Command::parse(raw) {
        Some(c) if allowed.contains(&c) => Ok(c),
        _ => InvalidCommandSnafu { input: raw.trim() }.fail(),
    }
}

pub fn validate_ordinal(raw: &str, max: usize) -> SurveyResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(x) if x >= 1 && x <= max => Ok(x),
        _ => InvalidOrdinalSnafu {
            input: raw.trim(),
            max,
        }
        .fail(),
    }
}

/// A name for a new respondent.
pub fn validate_new_name(raw: &str, existing: &[String]) -> SurveyResult<String> {
    let name = raw.trim();
    ensure!(!name.is_empty(), EmptyNameSnafu);
    ensure!(
        !existing.iter().any(|n| n == name),
        DuplicateNameSnafu { name }
    );
    Ok(name.to_string())
}

/// The name of a respondent already in the sheet.
pub fn validate_existing_name(raw: &str, existing: &[String]) -> SurveyResult<String> {
    let name = raw.trim();
    ensure!(
        existing.iter().any(|n| n == name),
        NotFoundSnafu { name }
    );
    Ok(name.to_string())
}

pub fn validate_confirmation(raw: &str) -> SurveyResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => InvalidConfirmationSnafu { input: raw.trim() }.fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_accepts_one_to_five_only() {
        for (raw, expected) in [("1", 1), ("3", 3), ("5", 5), (" 4\n", 4)] {
            assert_eq!(validate_score(raw).unwrap(), expected);
        }
        for raw in ["0", "6", "-1", "2.5", "three", "", "99999999999999999999"] {
            assert!(
                matches!(validate_score(raw), Err(SurveyError::InvalidScore { .. })),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn menu_command_respects_allowed_set() {
        let respondent = [Command::Add, Command::Update, Command::Exit];
        assert_eq!(
            validate_menu_command("amend", &respondent).unwrap(),
            Command::Update
        );
        assert_eq!(
            validate_menu_command("  exit ", &respondent).unwrap(),
            Command::Exit
        );
        assert!(matches!(
            validate_menu_command("analyse", &respondent),
            Err(SurveyError::InvalidCommand { .. })
        ));
        assert!(validate_menu_command("Add", &respondent).is_err());

        let admin = [Command::Add, Command::AddQuestion, Command::ReadQuestions];
        assert_eq!(
            validate_menu_command("add q", &admin).unwrap(),
            Command::AddQuestion
        );
        assert_eq!(
            validate_menu_command("read  q", &admin).unwrap(),
            Command::ReadQuestions
        );
    }

    #[test]
    fn ordinal_in_range() {
        assert_eq!(validate_ordinal("1", 3).unwrap(), 1);
        assert_eq!(validate_ordinal("3", 3).unwrap(), 3);
        for raw in ["0", "4", "-2", "q1", ""] {
            assert!(matches!(
                validate_ordinal(raw, 3),
                Err(SurveyError::InvalidOrdinal { max: 3, .. })
            ));
        }
        assert!(validate_ordinal("1", 0).is_err());
    }

    #[test]
    fn names() {
        let existing = vec!["Alice".to_string(), "Bob".to_string()];
        assert_eq!(validate_new_name(" Carol ", &existing).unwrap(), "Carol");
        assert!(matches!(
            validate_new_name("Alice", &existing),
            Err(SurveyError::DuplicateName { .. })
        ));
        assert!(matches!(
            validate_new_name("  ", &existing),
            Err(SurveyError::EmptyName)
        ));
        assert_eq!(validate_existing_name("Bob", &existing).unwrap(), "Bob");
        assert!(matches!(
            validate_existing_name("bob", &existing),
            Err(SurveyError::NotFound { .. })
        ));
    }

    #[test]
    fn confirmation() {
        assert!(validate_confirmation("Y").unwrap());
        assert!(validate_confirmation("yes").unwrap());
        assert!(!validate_confirmation("n").unwrap());
        assert!(matches!(
            validate_confirmation("maybe"),
            Err(SurveyError::InvalidConfirmation { .. })
        ));
    }
}
