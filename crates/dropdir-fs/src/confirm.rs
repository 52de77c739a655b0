//! Yes/no confirmation as an injectable capability
//!
//! The transfer engine never reads stdin itself. It asks a [`Confirm`]
//! implementation, which is a terminal in the CLI and a scripted responder
//! in tests.

use std::collections::VecDeque;
use std::io::{self, BufRead, Stderr, StdinLock, Write};

/// Something that can answer a yes/no question.
pub trait Confirm {
    /// Ask `question`; `Ok(true)` means the user agreed.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

impl<C: Confirm + ?Sized> Confirm for &mut C {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        (**self).confirm(question)
    }
}

/// Interpret a typed answer: `y` or `yes` in any case.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Line-oriented prompt: writes the question, reads one line.
///
/// End of input counts as "no". There is no timeout; a prompt nobody
/// answers blocks forever.
#[derive(Debug)]
pub struct LineConfirm<R, W> {
    input: R,
    output: W,
}

/// A [`LineConfirm`] bound to the process stdin and stderr.
pub type TerminalConfirm = LineConfirm<StdinLock<'static>, Stderr>;

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalConfirm {
    pub fn terminal() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "{question} (y/n): ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        Ok(is_affirmative(&line))
    }
}

/// Replays canned answers and records every question asked.
///
/// Once the script runs out every further question is answered "no".
#[derive(Debug, Default, Clone)]
pub struct ScriptedConfirm {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedConfirm {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.asked.push(question.to_string());
        Ok(self
            .answers
            .pop_front()
            .is_some_and(|answer| is_affirmative(&answer)))
    }
}

/// Agrees to everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysYes;

impl Confirm for AlwaysYes {
    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// Declines everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysNo;

impl Confirm for AlwaysNo {
    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Ok(false)
    }
}
