//! Operator prompts
//!
//! Interactive version choices go through the [`Prompter`] trait so the
//! orchestrator can be driven by a terminal, a script, or nothing at all.

use crate::error::PromptError;
use std::io::{self, BufRead, IsTerminal, Write};

/// One selectable entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// What is selected (a version string)
    pub label: String,
    /// Extra context shown next to the label (release date)
    pub detail: Option<String>,
}

impl Choice {
    /// Creates a choice without detail
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    /// Attaches a detail string
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Blocking choice capability
pub trait Prompter {
    /// Ask the operator to pick one of `choices`; returns its index.
    ///
    /// Implementations must not pick a default on behalf of the operator:
    /// when nobody can answer, return [`PromptError::Unavailable`].
    fn choose(&mut self, message: &str, choices: &[Choice]) -> Result<usize, PromptError>;
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn choose(&mut self, message: &str, choices: &[Choice]) -> Result<usize, PromptError> {
        (**self).choose(message, choices)
    }
}

/// Prompter for runs that must never ask
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn choose(&mut self, _message: &str, _choices: &[Choice]) -> Result<usize, PromptError> {
        Err(PromptError::Unavailable)
    }
}

/// Numbered-list prompt over a line reader
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
    interactive: bool,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    /// Creates a prompter reading answers from `input` and writing the menu
    /// to `output`
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            interactive: true,
        }
    }

    /// Marks whether an operator is attached
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    fn render(&mut self, message: &str, choices: &[Choice]) -> io::Result<()> {
        writeln!(self.output, "{}", message)?;
        for (i, choice) in choices.iter().enumerate() {
            match &choice.detail {
                Some(detail) => writeln!(
                    self.output,
                    "  {:>2}) {}  ({})",
                    i + 1,
                    choice.label,
                    detail
                )?,
                None => writeln!(self.output, "  {:>2}) {}", i + 1, choice.label)?,
            }
        }
        Ok(())
    }
}

impl LinePrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompter bound to the process terminal. Menus go to stderr so stdout
    /// stays reserved for the report.
    pub fn stdio() -> Self {
        let interactive = io::stdin().is_terminal();
        Self::new(io::stdin().lock(), io::stderr()).interactive(interactive)
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn choose(&mut self, message: &str, choices: &[Choice]) -> Result<usize, PromptError> {
        if choices.is_empty() {
            return Err(PromptError::NoChoices);
        }
        if !self.interactive {
            return Err(PromptError::Unavailable);
        }

        self.render(message, choices)?;
        loop {
            write!(self.output, "Select [1-{}]: ", choices.len())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(PromptError::Unavailable);
            }

            match line.trim().parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(
                    self.output,
                    "Please enter a number between 1 and {}",
                    choices.len()
                )?,
            }
        }
    }
}
