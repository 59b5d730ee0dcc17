//! Interactive prompting strategies.
//!
//! Three strategies layered over the [`Terminal`] capability:
//!
//! - [`PlainPrompter`]: single-line, echoed text entry.
//! - [`PassphrasePrompter`]: single-line secret entry with echo
//!   suppressed for the duration of the read.
//! - [`NewPassphrasePrompter`]: confirmed double entry that retries
//!   until both entries match, with echo suppressed across the whole
//!   operation.
//!
//! Echo discipline is the one correctness property that matters under
//! failure here: whenever a prompter disables echo, it re-enables it on
//! every exit path before an error surfaces, so later output (including
//! the error message itself) is not silently hidden.

use zeroize::Zeroizing;

use crate::error::PromptError;
use crate::terminal::Terminal;

/// Writes `text` to the terminal output and flushes it, so a label
/// without a trailing newline becomes visible before the read blocks.
fn write_prompt(term: &mut dyn Terminal, text: &str) -> Result<(), PromptError> {
    let out = term.output();
    out.write_all(text.as_bytes())
        .map_err(PromptError::write_failure_from)?;
    out.flush().map_err(PromptError::write_failure_from)
}

/// Reads one line from the terminal input, stripping the trailing line
/// terminator. End of input and stream errors both surface as a read
/// failure.
fn read_line(term: &mut dyn Terminal) -> Result<String, PromptError> {
    let mut line = String::new();
    match term.input().read_line(&mut line) {
        Ok(0) => Err(PromptError::read_failure()),
        Ok(_) => {
            if line.ends_with('\n') {
                line.pop();
            }
            if line.ends_with('\r') {
                line.pop();
            }
            Ok(line)
        }
        Err(source) => Err(PromptError::read_failure_from(source)),
    }
}

/// Runs `body` with terminal echo disabled, restoring echo on every
/// exit path. Errors from `body` take precedence over a failure to
/// restore echo.
fn with_echo_disabled<R>(
    term: &mut dyn Terminal,
    body: impl FnOnce(&mut dyn Terminal) -> Result<R, PromptError>,
) -> Result<R, PromptError> {
    term.set_echo(false).map_err(PromptError::echo_failure_from)?;
    let result = body(&mut *term);
    let restored = term.set_echo(true);
    match result {
        Err(err) => Err(err),
        Ok(value) => {
            restored.map_err(PromptError::echo_failure_from)?;
            Ok(value)
        }
    }
}

/// Single-line, echoed text entry.
pub struct PlainPrompter<'a> {
    term: &'a mut dyn Terminal,
}

impl<'a> PlainPrompter<'a> {
    pub fn new(term: &'a mut dyn Terminal) -> Self {
        Self { term }
    }

    /// Writes `label + ": "` and returns the next line of input.
    pub fn prompt(&mut self, label: &str) -> Result<String, PromptError> {
        write_prompt(self.term, &format!("{label}: "))?;
        read_line(self.term)
    }
}

/// Single-line secret entry; echo is off for the duration of the read.
pub struct PassphrasePrompter<'a> {
    term: &'a mut dyn Terminal,
}

impl<'a> PassphrasePrompter<'a> {
    pub fn new(term: &'a mut dyn Terminal) -> Self {
        Self { term }
    }

    /// Writes `label` on its own line and reads the secret with echo
    /// suppressed. Echo is restored even when the read fails.
    pub fn prompt(&mut self, label: &str) -> Result<Zeroizing<String>, PromptError> {
        write_prompt(self.term, &format!("{label}\n"))?;
        with_echo_disabled(self.term, |term| read_line(term).map(Zeroizing::new))
    }
}

/// Confirmed double entry with retry until both entries match.
pub struct NewPassphrasePrompter<'a> {
    term: &'a mut dyn Terminal,
}

impl<'a> NewPassphrasePrompter<'a> {
    pub fn new(term: &'a mut dyn Terminal) -> Self {
        Self { term }
    }

    /// Prompts with `label1` then `label2` and returns the entered value
    /// once both entries match.
    ///
    /// Echo is toggled off once before the first attempt and back on
    /// once at the end, however many attempts it takes. A mismatch is
    /// not an error; the loop retries indefinitely until the entries
    /// match or the stream fails.
    pub fn prompt(
        &mut self,
        label1: &str,
        label2: &str,
    ) -> Result<Zeroizing<String>, PromptError> {
        with_echo_disabled(self.term, |term| {
            loop {
                write_prompt(term, &format!("{label1}\n"))?;
                let first = Zeroizing::new(read_line(term)?);
                write_prompt(term, &format!("{label2}\n"))?;
                let second = Zeroizing::new(read_line(term)?);

                if *first == *second {
                    return Ok(first);
                }

                write_prompt(term, "Passphrases do not match. Please try again.\n")?;
            }
        })
    }
}
