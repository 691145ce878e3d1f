use std::io::{BufRead, Write};

use survey_analytics::validate::*;

use crate::survey::prompt::{Console, Flow, Interrupt, HOME};
use crate::survey::*;

const ADMIN_COMMANDS: &[Command] = &[
    Command::Add,
    Command::Update,
    Command::Delete,
    Command::List,
    Command::Read,
    Command::ReadQuestions,
    Command::AddQuestion,
    Command::DeleteQuestion,
    Command::Analyse,
    Command::Exit,
];

const RESPONDENT_COMMANDS: &[Command] = &[Command::Add, Command::Update, Command::Exit];

const SCALE_HELP: &str = "Please enter a value between 1 and 5 for the following questions.
5 - Excellent
4 - Good
3 - Moderate
2 - Poor
1 - Very Poor";

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Role {
    Admin,
    Respondent,
}

impl Role {
    pub fn commands(&self) -> &'static [Command] {
        match self {
            Role::Admin => ADMIN_COMMANDS,
            Role::Respondent => RESPONDENT_COMMANDS,
        }
    }
}

fn describe(c: Command) -> &'static str {
    match c {
        Command::Add => "add new survey data",
        Command::Update => "update the answers of a respondent (or 'amend')",
        Command::Delete => "delete the answers of a respondent",
        Command::List => "list the names of the respondents",
        Command::Read => "read the answers of a respondent",
        Command::ReadQuestions => "read the survey questions",
        Command::AddQuestion => "add a question to the survey",
        Command::DeleteQuestion => "delete a question from the survey",
        Command::Analyse => "analyse all the survey data",
        Command::Exit => "exit the program",
    }
}

/// Runs the interactive program until the user exits or the input ends.
///
/// Only failures of the sheet or of the console are returned as errors.
pub fn run_session<S: TabularStore, R: BufRead, W: Write>(
    sheet: &mut SurveySheet<S>,
    console: &mut Console<R, W>,
    admin_password: Option<&str>,
) -> CliResult<()> {
    let role = match choose_role(console, admin_password) {
        Ok(r) => r,
        Err(Interrupt::Home) | Err(Interrupt::Exit) => return Ok(()),
        Err(Interrupt::Failed(e)) => return Err(e),
    };
    info!("run_session: role {:?}", role);
    loop {
        match run_command(sheet, console, role) {
            Ok(Command::Exit) | Err(Interrupt::Exit) => break,
            Ok(_) => {}
            Err(Interrupt::Home) => {
                debug!("run_session: back to the main menu");
                if let Err(Interrupt::Failed(e)) = console.say("Returning to the main menu.") {
                    return Err(e);
                }
            }
            Err(Interrupt::Failed(e)) => return Err(e),
        }
    }
    console.say("Goodbye.").ok();
    Ok(())
}

fn choose_role<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    admin_password: Option<&str>,
) -> Flow<Role> {
    console.say("Welcome to the survey analytics.")?;
    let password = match admin_password {
        Some(p) => p,
        None => return Ok(Role::Respondent),
    };
    loop {
        match console.ask(
            "Enter the administrator password, or press enter to continue as a respondent:",
        ) {
            Ok(answer) if answer.is_empty() => return Ok(Role::Respondent),
            Ok(answer) if answer == password => return Ok(Role::Admin),
            Ok(_) => {
                warn!("choose_role: wrong administrator password");
                console.say("Incorrect password.")?;
            }
            // Nothing to return to yet.
            Err(Interrupt::Home) => {}
            Err(e) => return Err(e),
        }
    }
}

/// Reads one command and runs it.
fn run_command<S: TabularStore, R: BufRead, W: Write>(
    sheet: &mut SurveySheet<S>,
    console: &mut Console<R, W>,
    role: Role,
) -> Flow<Command> {
    let allowed = role.commands();
    let mut menu = vec!["Please enter a command:".to_string()];
    for c in allowed {
        menu.push(format!("- '{}' to {}", c.keyword(), describe(*c)));
    }
    menu.push(format!(
        "You can enter '{}' at any time to return to this menu.",
        HOME
    ));
    console.say(&menu.join("\n"))?;
    let command = console.ask_until("Enter your command here:", |raw| {
        validate_menu_command(raw, allowed)
    })?;
    debug!("run_command: {:?}", command);
    match command {
        Command::Add => add_respondent(sheet, console)?,
        Command::Update => update_respondent(sheet, console)?,
        Command::Delete => delete_respondent(sheet, console)?,
        Command::List => list_respondents(sheet, console)?,
        Command::Read => read_respondent(sheet, console)?,
        Command::ReadQuestions => read_questions(sheet, console)?,
        Command::AddQuestion => add_question(sheet, console)?,
        Command::DeleteQuestion => delete_question(sheet, console)?,
        Command::Analyse => analyse(sheet, console)?,
        Command::Exit => {}
    }
    Ok(command)
}

fn ask_scores<S: TabularStore, R: BufRead, W: Write>(
    sheet: &SurveySheet<S>,
    console: &mut Console<R, W>,
) -> Flow<Vec<u8>> {
    console.say(SCALE_HELP)?;
    let mut scores = Vec::with_capacity(sheet.question_count());
    for q in sheet.questions() {
        let s = console.ask_until(&format!("Q{} - {}\nAnswer:", q.ordinal, q.prompt), validate_score)?;
        scores.push(s);
    }
    Ok(scores)
}

fn ask_existing_name<S: TabularStore, R: BufRead, W: Write>(
    sheet: &SurveySheet<S>,
    console: &mut Console<R, W>,
    question: &str,
) -> Flow<Option<String>> {
    let names = sheet.list_names()?;
    if names.is_empty() {
        console.say("There are no respondents yet.")?;
        return Ok(None);
    }
    let name = console.ask_until(question, |raw| validate_existing_name(raw, &names))?;
    Ok(Some(name))
}

fn add_respondent<S: TabularStore, R: BufRead, W: Write>(
    sheet: &mut SurveySheet<S>,
    console: &mut Console<R, W>,
) -> Flow<()> {
    console.say("Adding survey data...")?;
    let names = sheet.list_names()?;
    let name = console.ask_until("Enter the name of the respondent:", |raw| {
        validate_new_name(raw, &names)
    })?;
    let scores = ask_scores(sheet, console)?;
    sheet.create(&name, &scores)?;
    console.say(&format!("Survey data for {} added.", name))?;
    Ok(())
}

fn update_respondent<S: TabularStore, R: BufRead, W: Write>(
    sheet: &mut SurveySheet<S>,
    console: &mut Console<R, W>,
) -> Flow<()> {
    let name = match ask_existing_name(
        sheet,
        console,
        "Enter the exact name of the respondent to update:",
    )? {
        Some(n) => n,
        None => return Ok(()),
    };
    let record = sheet.find(&name)?;
    let mut current = vec![format!("Current answers of {}:", name)];
    for (q, score) in sheet.questions().iter().zip(record.scores.iter()) {
        current.push(format!("  {}  {}", score, q.heading()));
    }
    console.say(&current.join("\n"))?;

    let count = sheet.question_count();
    let choice = console.ask_until(
        "Enter the number of the question to update, or 'all' to answer every question again:",
        |raw| {
            if raw.trim() == "all" {
                Ok(None)
            } else {
                validate_ordinal(raw, count).map(Some)
            }
        },
    )?;

    let updated = match choice {
        Some(ordinal) => {
            let value = console.ask_until(
                &format!("Enter the new score for Q{}:", ordinal),
                validate_score,
            )?;
            let old = record.scores[ordinal - 1];
            let confirmed = console.confirm(&format!(
                "Change the answer of {} to Q{} from {} to {}?",
                name, ordinal, old, value
            ))?;
            sheet.update_one(&name, ordinal, value, confirmed)?
        }
        None => {
            let scores = ask_scores(sheet, console)?;
            let confirmed = console.confirm(&format!(
                "Replace all the answers of {} with {:?}?",
                name, scores
            ))?;
            sheet.update(&name, &scores, confirmed)?
        }
    };
    if updated {
        console.say(&format!("Survey data for {} updated.", name))?;
    } else {
        console.say("No changes made.")?;
    }
    Ok(())
}

fn delete_respondent<S: TabularStore, R: BufRead, W: Write>(
    sheet: &mut SurveySheet<S>,
    console: &mut Console<R, W>,
) -> Flow<()> {
    let name = match ask_existing_name(
        sheet,
        console,
        "Enter the exact name of the respondent to delete:",
    )? {
        Some(n) => n,
        None => return Ok(()),
    };
    if console.confirm(&format!(
        "Permanently delete all the survey data of {}?",
        name
    ))? {
        sheet.delete(&name)?;
        console.say(&format!("Survey data for {} deleted.", name))?;
    } else {
        console.say("No changes made.")?;
    }
    Ok(())
}

fn list_respondents<S: TabularStore, R: BufRead, W: Write>(
    sheet: &SurveySheet<S>,
    console: &mut Console<R, W>,
) -> Flow<()> {
    let names = sheet.list_names()?;
    if names.is_empty() {
        console.say("There are no respondents yet.")?;
    } else {
        console.say(&format!("Respondents ({}):\n{}", names.len(), names.join("\n")))?;
    }
    Ok(())
}

fn read_respondent<S: TabularStore, R: BufRead, W: Write>(
    sheet: &SurveySheet<S>,
    console: &mut Console<R, W>,
) -> Flow<()> {
    let name = match ask_existing_name(
        sheet,
        console,
        "Enter the exact name of the respondent you wish to see survey results for:",
    )? {
        Some(n) => n,
        None => return Ok(()),
    };
    let dataset = sheet.dataset()?;
    let record = dataset
        .find(&name)
        .cloned()
        .ok_or_else(|| SurveyError::NotFound { name: name.clone() })?;
    let lines = report::respondent_lines(&record, &dataset, sheet.rules())?;
    console.say(&lines.join("\n"))?;
    Ok(())
}

fn read_questions<S: TabularStore, R: BufRead, W: Write>(
    sheet: &SurveySheet<S>,
    console: &mut Console<R, W>,
) -> Flow<()> {
    if sheet.question_count() == 0 {
        console.say("The survey has no questions.")?;
        return Ok(());
    }
    let labels = sheet.list_questions(QuestionForm::Label);
    let prompts = sheet.list_questions(QuestionForm::Prompt);
    let mut l: Vec<String> = Vec::new();
    for (idx, (label, prompt)) in labels.iter().zip(prompts.iter()).enumerate() {
        l.push(format!("Q{} - {}\n    {}", idx + 1, label, prompt));
    }
    console.say(&l.join("\n"))?;
    Ok(())
}

fn add_question<S: TabularStore, R: BufRead, W: Write>(
    sheet: &mut SurveySheet<S>,
    console: &mut Console<R, W>,
) -> Flow<()> {
    let prompt = console.ask("Enter the full text of the new question:")?;
    let label = console.ask("Enter a short label for the question (shown in the sheet header):")?;
    let ordinal = sheet.add_question(&prompt, &label)?;
    console.say(&format!(
        "Question Q{} added. Existing respondents were given a score of {} for it.",
        ordinal,
        sheet.rules().default_score
    ))?;
    Ok(())
}

fn delete_question<S: TabularStore, R: BufRead, W: Write>(
    sheet: &mut SurveySheet<S>,
    console: &mut Console<R, W>,
) -> Flow<()> {
    read_questions(sheet, console)?;
    let count = sheet.question_count();
    if count == 0 {
        return Ok(());
    }
    let ordinal = console.ask_until("Enter the number of the question to delete:", |raw| {
        validate_ordinal(raw, count)
    })?;
    let heading = sheet
        .question(ordinal)
        .map(|q| q.heading())
        .unwrap_or_default();
    if console.confirm(&format!(
        "Delete {} and all the answers to it?",
        heading
    ))? {
        sheet.remove_question(ordinal)?;
        console.say(&format!(
            "{} deleted. The questions after it have been renumbered.",
            heading
        ))?;
    } else {
        console.say("No changes made.")?;
    }
    Ok(())
}

fn analyse<S: TabularStore, R: BufRead, W: Write>(
    sheet: &SurveySheet<S>,
    console: &mut Console<R, W>,
) -> Flow<()> {
    let dataset = sheet.dataset()?;
    match summarize(&dataset, sheet.rules()) {
        Ok(summary) => {
            let lines = report::summary_lines(&summary, &dataset.questions);
            console.say(&lines.join("\n"))?;
        }
        Err(SurveyError::EmptyDataset) => {
            console.say("There is no survey data to analyse yet.")?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use survey_analytics::store::MemorySheet;

    fn sheet() -> SurveySheet<MemorySheet> {
        let seed: Vec<NewQuestion> = ["Job role", "Pay", "Holidays"]
            .iter()
            .map(|l| NewQuestion {
                label: l.to_string(),
                prompt: format!("How satisfied are you with your {}?", l.to_lowercase()),
            })
            .collect();
        let mut sheet = SurveySheet::open(
            MemorySheet::new("survey_results"),
            &seed,
            &AnalysisRules::DEFAULT_RULES,
        )
        .unwrap();
        sheet.create("Alice", &[5, 5, 5]).unwrap();
        sheet.create("Bob", &[1, 1, 1]).unwrap();
        sheet
    }

    /// Runs a scripted session and returns everything printed.
    fn session(sheet: &mut SurveySheet<MemorySheet>, password: Option<&str>, lines: &[&str]) -> String {
        let mut input = lines.join("\n");
        input.push('\n');
        let mut console = Console::new(Cursor::new(input.into_bytes()), Vec::new());
        run_session(sheet, &mut console, password).unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn respondent_adds_answers_with_retries() {
        let mut s = sheet();
        let out = session(
            &mut s,
            Some("s3cret"),
            &["", "add", "Alice", "Carol", "4", "six", "2", "3", "exit"],
        );
        assert_eq!(s.find("Carol").unwrap().scores, vec![4, 2, 3]);
        assert!(out.contains("Survey data for Carol added."));
        assert_eq!(out.matches("Invalid input").count(), 2);
        assert!(out.ends_with("Goodbye.\n"));
    }

    #[test]
    fn respondent_cannot_reach_admin_commands() {
        let mut s = sheet();
        let out = session(&mut s, None, &["delete", "analyse", "exit"]);
        assert_eq!(out.matches("is not a valid command").count(), 2);
        assert!(!out.contains("'analyse'"));
        assert_eq!(s.list_names().unwrap(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn wrong_password_is_asked_again() {
        let mut s = sheet();
        let out = session(&mut s, Some("s3cret"), &["guess", "s3cret", "list", "exit"]);
        assert!(out.contains("Incorrect password."));
        assert!(out.contains("Respondents (2):\nAlice\nBob"));
    }

    #[test]
    fn home_abandons_the_current_operation() {
        let mut s = sheet();
        let out = session(
            &mut s,
            Some("s3cret"),
            &["s3cret", "add", "Carol", "4", "home", "list", "exit"],
        );
        assert!(out.contains("Returning to the main menu."));
        assert_eq!(s.list_names().unwrap(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn end_of_input_exits() {
        let mut s = sheet();
        let out = session(&mut s, Some("s3cret"), &["s3cret", "delete", "Bob"]);
        assert!(out.ends_with("Goodbye.\n"));
        assert_eq!(s.list_names().unwrap(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn admin_deletes_after_confirmation() {
        let mut s = sheet();
        session(
            &mut s,
            Some("s3cret"),
            &["s3cret", "delete", "Zoe", "Bob", "n", "delete", "Bob", "y", "exit"],
        );
        assert_eq!(s.list_names().unwrap(), vec!["Alice"]);
    }

    #[test]
    fn update_one_answer() {
        let mut s = sheet();
        let out = session(
            &mut s,
            None,
            &["amend", "Bob", "4", "2", "3", "y", "update", "Bob", "all", "2", "2", "2", "n", "exit"],
        );
        assert!(out.contains("Change the answer of Bob to Q2 from 1 to 3? (y/n)"));
        assert!(out.contains("No changes made."));
        assert_eq!(s.find("Bob").unwrap().scores, vec![1, 3, 1]);
    }

    #[test]
    fn admin_manages_questions() {
        let mut s = sheet();
        let out = session(
            &mut s,
            Some("s3cret"),
            &[
                "s3cret",
                "add q",
                "How would you rate the staff benefits?",
                "Benefits",
                "delete q",
                "5",
                "1",
                "y",
                "read q",
                "exit",
            ],
        );
        assert!(out.contains("Question Q4 added."));
        assert!(out.contains("Q1 - Job role deleted."));
        assert_eq!(
            s.list_questions(QuestionForm::Label),
            vec!["Pay", "Holidays", "Benefits"]
        );
        assert!(out.contains("Q3 - Benefits\n    How would you rate the staff benefits?"));
        assert_eq!(s.find("Alice").unwrap().scores, vec![5, 5, 3]);
    }

    #[test]
    fn admin_analyses_and_reads() {
        let mut s = sheet();
        let out = session(
            &mut s,
            Some("s3cret"),
            &["s3cret", "analyse", "read", "Alice", "exit"],
        );
        assert!(out.contains("Survey analysis over 2 respondents:"));
        assert!(out.contains("No question has a low average score."));
        assert!(out.contains("Survey results for Alice:"));
        assert!(out.contains("(organization average 3.0, higher)"));
        assert!(out.contains("(low variation between answers)"));
    }

    #[test]
    fn analyse_without_data() {
        let mut s = sheet();
        s.delete("Alice").unwrap();
        s.delete("Bob").unwrap();
        let out = session(&mut s, Some("s3cret"), &["s3cret", "analyse", "read", "exit"]);
        assert!(out.contains("There is no survey data to analyse yet."));
        assert!(out.contains("There are no respondents yet."));
    }
}
