//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts behind the [Prompter] trait, so the
//!   release workflow can run against scripted answers in tests

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::Result;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_changelog, display_command, display_error, display_file_preview, display_file_write,
    display_status, display_success, display_version_change, display_warning, marked,
};

/// Source of operator answers.
pub trait Prompter {
    /// Ask a yes/no question; only an explicit "y"/"yes" counts as yes.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Ask for a line of text; blank input yields `default`.
    fn input(&mut self, prompt: &str, default: &str) -> Result<String>;
}

/// Whether an answer counts as affirmative.
///
/// Accepts "y" or "yes" (case-insensitive, surrounding whitespace ignored).
pub fn is_affirmative(answer: &str) -> bool {
    let response = answer.trim().to_lowercase();
    response == "y" || response == "yes"
}

/// Prompts on the terminal and reads answers from stdin.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl ConsolePrompter {
    fn read_line(&self) -> Result<String> {
        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input)
    }
}

impl Prompter for ConsolePrompter {
    /// Default is "no" if the user presses Enter (or stdin is closed).
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        print!("\n{} (y/N): ", prompt);
        io::stdout().flush()?;

        let input = self.read_line()?;
        Ok(is_affirmative(&input))
    }

    fn input(&mut self, prompt: &str, default: &str) -> Result<String> {
        print!("\n{} [{}]: ", prompt, default);
        io::stdout().flush()?;

        let input = self.read_line()?;
        let answer = input.trim();
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer.to_string())
        }
    }
}

/// Replays a fixed list of answers, recording every prompt it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for prompt: {}", prompt),
            )
            .into()
        })
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.next_answer(prompt)?;
        Ok(is_affirmative(&answer))
    }

    fn input(&mut self, prompt: &str, default: &str) -> Result<String> {
        let answer = self.next_answer(prompt)?;
        let answer = answer.trim();
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES \n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }

    #[test]
    fn test_scripted_confirm() {
        let mut prompter = ScriptedPrompter::new(["y", "no"]);
        assert!(prompter.confirm("first?").unwrap());
        assert!(!prompter.confirm("second?").unwrap());
        assert_eq!(prompter.prompts(), &["first?".to_string(), "second?".to_string()]);
    }

    #[test]
    fn test_scripted_input_blank_uses_default() {
        let mut prompter = ScriptedPrompter::new(["", " 2.0 "]);
        assert_eq!(prompter.input("Version", "1.2.4").unwrap(), "1.2.4");
        assert_eq!(prompter.input("Version", "1.2.4").unwrap(), "2.0");
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_scripted_exhausted_is_error() {
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert!(prompter.confirm("anything?").is_err());
    }
}
