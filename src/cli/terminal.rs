//! Interactive confirmation for mutating commands

use console::style;
use std::io::{self, BufRead, Write};

use crate::core::error::Result;

/// Answer the user must type to let a mutating command proceed
pub const CONFIRMATION_WORD: &str = "yes";

/// Line-oriented terminal used to ask for confirmation.
///
/// Generic over its streams so commands can be driven by scripted input.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl Terminal<io::StdinLock<'static>, io::Stderr> {
    /// Prompts go to stderr so stdout stays clean for command output
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask whether to proceed.
    ///
    /// With `autoconfirm` the prompt is never built or shown. An empty
    /// prompt means there is no one to ask, and also proceeds. Otherwise only
    /// an exact `yes` (surrounding whitespace ignored) proceeds; any other
    /// answer, including end of input, declines.
    pub fn confirm<F>(&mut self, autoconfirm: bool, build_prompt: F) -> Result<bool>
    where
        F: FnOnce() -> String,
    {
        if autoconfirm {
            return Ok(true);
        }

        let message = build_prompt();
        if message.is_empty() {
            return Ok(true);
        }

        write!(self.output, "{} ", style(message).yellow())?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer.trim() == CONFIRMATION_WORD)
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}
