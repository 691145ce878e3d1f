// Line-oriented prompting.
//
// Every answer is read through `Console::ask`, which turns the `home` keyword
// into `Interrupt::Home`. The interruption travels up with `?` to the menu
// loop, which is the only place that handles it.

use std::io::{BufRead, Write};

use crate::survey::*;

/// The keyword that abandons the current operation at any prompt.
pub const HOME: &str = "home";

/// Why an operation stopped before completing.
#[derive(Debug)]
pub enum Interrupt {
    /// The user asked to go back to the main menu.
    Home,
    /// The user asked to leave, or the input ended.
    Exit,
    Failed(CliError),
}

impl From<CliError> for Interrupt {
    fn from(e: CliError) -> Self {
        Interrupt::Failed(e)
    }
}

impl From<SurveyError> for Interrupt {
    fn from(e: SurveyError) -> Self {
        Interrupt::Failed(e.into())
    }
}

pub type Flow<T> = Result<T, Interrupt>;

pub struct Console<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Console<R, W> {
        Console { input, output }
    }

    pub fn say(&mut self, text: &str) -> Flow<()> {
        writeln!(self.output, "{}", text).context(ConsoleSnafu {})?;
        Ok(())
    }

    /// Asks a question and returns the trimmed answer.
    pub fn ask(&mut self, question: &str) -> Flow<String> {
        writeln!(self.output, "{}", question).context(ConsoleSnafu {})?;
        self.output.flush().context(ConsoleSnafu {})?;
        let mut line = String::new();
        let num_read = self.input.read_line(&mut line).context(ConsoleSnafu {})?;
        if num_read == 0 {
            debug!("ask: end of input");
            return Err(Interrupt::Exit);
        }
        let answer = line.trim().to_string();
        debug!("ask: {:?} -> {:?}", question, answer);
        if answer == HOME {
            return Err(Interrupt::Home);
        }
        Ok(answer)
    }

    /// Asks a question until the answer passes the check.
    ///
    /// A failed check prints the reason and asks again. Errors that are not
    /// about the input stop the operation.
    pub fn ask_until<T, F>(&mut self, question: &str, check: F) -> Flow<T>
    where
        F: Fn(&str) -> SurveyResult<T>,
    {
        loop {
            let answer = self.ask(question)?;
            match check(&answer) {
                Ok(x) => return Ok(x),
                Err(e) if e.is_validation() => {
                    self.say(&format!("Invalid input: {}. Please try again.", e))?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn confirm(&mut self, question: &str) -> Flow<bool> {
        self.ask_until(&format!("{} (y/n)", question), validate::validate_confirmation)
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn ask_until_retries_on_invalid_input() {
        let mut c = console("seven\n0\n 4 \n");
        let score = c.ask_until("Score:", validate::validate_score).unwrap();
        assert_eq!(score, 4);
        let out = String::from_utf8(c.into_output()).unwrap();
        assert_eq!(out.matches("Score:").count(), 3);
        assert_eq!(out.matches("Invalid input").count(), 2);
    }

    #[test]
    fn home_and_end_of_input_interrupt() {
        let mut c = console("home\n");
        assert!(matches!(c.ask("Name:"), Err(Interrupt::Home)));
        assert!(matches!(c.ask("Name:"), Err(Interrupt::Exit)));
    }

    #[test]
    fn confirm_accepts_yes_and_no() {
        let mut c = console("sure\nY\nno\n");
        assert!(c.confirm("Delete?").unwrap());
        assert!(!c.confirm("Delete?").unwrap());
    }
}
