//! Operator confirmation before a plan is executed.

use std::io::{BufRead, Write};
use tracing::debug;

use crate::error::Result;

/// Prompt shown while waiting for the operator's answer.
pub const CONFIRM_PROMPT: &str = "#> Type 'yes' to continue, 'no' to cancel: ";

/// The operator's answer to the confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Execute the plan.
    Proceed,
    /// Stop without touching state.
    Abort,
}

/// Asks the operator to approve the plan.
///
/// Only the literal answers `yes` and `no` are accepted; anything else
/// re-prompts, without limit. End of input counts as `no`.
///
/// # Errors
///
/// Returns an error if reading the answer or writing the prompt fails.
pub fn confirm<R: BufRead, W: Write>(
    auto_approve: bool,
    mut input: R,
    mut output: W,
) -> Result<Decision> {
    if auto_approve {
        debug!("Plan auto-approved");
        return Ok(Decision::Proceed);
    }

    let mut line = String::new();
    loop {
        write!(output, "\n\n{CONFIRM_PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("Input closed while waiting for confirmation");
            return Ok(Decision::Abort);
        }

        match line.trim() {
            "yes" => return Ok(Decision::Proceed),
            "no" => return Ok(Decision::Abort),
            other => debug!("Ignoring confirmation answer '{other}'"),
        }
    }
}
