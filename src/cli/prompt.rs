//! Interactive input: line prompts and the external editor
//!
//! Commands talk to the user through the [`Prompter`] trait so that the
//! retry loops and confirmation steps can be driven by scripted answers in
//! tests.

use std::fs;
use std::io::{self, BufRead, Write};
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    /// Input ended or the user backed out; the caller exits quietly
    #[error("Input cancelled")]
    Interrupted,

    #[error("Failed to run editor '{editor}': {source}")]
    Editor {
        editor: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub trait Prompter {
    /// Asks a one-line question and returns the answer without its line ending
    fn ask(&mut self, question: &str) -> Result<String, PromptError>;

    /// Lets the user write a longer message
    fn compose(&mut self) -> Result<String, PromptError>;

    /// Tells the user something while prompting (e.g. why an answer was rejected)
    fn say(&mut self, message: &str);
}

/// True for "y" or "yes", in any case
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

const COMPOSE_TEMPLATE: &str = "\n\
# Write the message for your bottle above.\n\
# Lines starting with '#' are ignored. An empty message cancels.\n";

/// Prompts on stdin/stderr and composes messages in an external editor
///
/// Questions and notes go to stderr so stdout carries only command output,
/// which keeps `--format json` parseable.
pub struct TerminalPrompter {
    editor: String,
}

impl TerminalPrompter {
    pub fn new(editor: impl Into<String>) -> Self {
        Self {
            editor: editor.into(),
        }
    }

    fn run_editor(&self, path: &std::path::Path) -> Result<(), PromptError> {
        let mut parts = self.editor.split_whitespace();
        let program = parts.next().ok_or_else(|| PromptError::Editor {
            editor: self.editor.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty editor command"),
        })?;

        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .map_err(|source| PromptError::Editor {
                editor: self.editor.clone(),
                source,
            })?;

        // Quitting the editor with an error status (e.g. `:cq`) means "never mind"
        if !status.success() {
            return Err(PromptError::Interrupted);
        }
        Ok(())
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        let mut stderr = io::stderr();
        write!(stderr, "{}", question)?;
        stderr.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(PromptError::Interrupted);
        }

        Ok(strip_line_ending(&line).to_string())
    }

    fn compose(&mut self) -> Result<String, PromptError> {
        let file = tempfile::Builder::new()
            .prefix("bottle-")
            .suffix(".txt")
            .tempfile()?;
        fs::write(file.path(), COMPOSE_TEMPLATE)?;

        self.run_editor(file.path())?;

        let content = fs::read_to_string(file.path())?;
        Ok(strip_comments(&content))
    }

    fn say(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Drops `#` comment lines and trailing blank space
fn strip_comments(content: &str) -> String {
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .collect();
    kept.join("\n").trim_end().to_string()
}
