//! CLI commands (register, passphrase) and return codes.

use std::io::Write;

use zeroize::Zeroizing;

use crate::error::PromptError;
use crate::prompters::{NewPassphrasePrompter, PassphrasePrompter};
use crate::rpc::{
    AuthRpc, AuthenticateRequest, RpcStatus, RpcStatusKind, SetPassphraseRequest,
};
use crate::terminal::Terminal;

/// Outcome of a command, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Ok,
    /// The daemon rejected the request or failed while handling it.
    CommandFail,
    /// Bad invocation shape, unusable environment, or a failed prompt.
    CommandLineError,
    /// The daemon could not be reached.
    DaemonFail,
}

impl ReturnCode {
    pub fn exit_code(self) -> i32 {
        match self {
            ReturnCode::Ok => 0,
            ReturnCode::CommandFail => 1,
            ReturnCode::CommandLineError => 2,
            ReturnCode::DaemonFail => 3,
        }
    }
}

/// Reports an RPC failure for the named command and maps it to a
/// return code. All commands funnel remote failures through here so
/// the reporting stays uniform.
pub fn standard_failure_handler_for(
    name: &str,
    cerr: &mut dyn Write,
    status: &RpcStatus,
) -> ReturnCode {
    let _ = writeln!(cerr, "{name} failed: {}", status.message);
    match status.kind {
        RpcStatusKind::Unavailable => ReturnCode::DaemonFail,
        _ => ReturnCode::CommandFail,
    }
}

/// `warden register [<passphrase>]` - register this client with the
/// daemon.
///
/// The passphrase comes from the single positional argument when one
/// was given (no prompting, at the cost of exposing it in shell
/// history), otherwise it is solicited interactively with echo off.
pub fn register(
    passphrases: &[String],
    verbosity_level: u8,
    term: &mut dyn Terminal,
    rpc: &mut dyn AuthRpc,
    cerr: &mut dyn Write,
) -> ReturnCode {
    let passphrase = match resolve_passphrase(passphrases, term, cerr) {
        Ok(passphrase) => passphrase,
        Err(code) => return code,
    };

    let request = AuthenticateRequest {
        passphrase,
        verbosity_level,
    };
    match rpc.authenticate(&request) {
        Ok(_) => ReturnCode::Ok,
        Err(status) => standard_failure_handler_for("register", cerr, &status),
    }
}

/// `warden passphrase [<new-passphrase>]` - change the passphrase the
/// daemon requires from registering clients.
///
/// Interactive entry uses confirmed double entry, retrying until both
/// entries match.
pub fn set_passphrase(
    passphrases: &[String],
    verbosity_level: u8,
    term: &mut dyn Terminal,
    rpc: &mut dyn AuthRpc,
    cerr: &mut dyn Write,
) -> ReturnCode {
    let passphrase = match resolve_new_passphrase(passphrases, term, cerr) {
        Ok(passphrase) => passphrase,
        Err(code) => return code,
    };

    let request = SetPassphraseRequest {
        passphrase,
        verbosity_level,
    };
    match rpc.set_passphrase(&request) {
        Ok(()) => ReturnCode::Ok,
        Err(status) => standard_failure_handler_for("passphrase", cerr, &status),
    }
}

/// Checks the invocation shape shared by both commands: zero or one
/// positional passphrase. Returns the supplied value, or `None` when
/// prompting is required.
fn supplied_passphrase<'a>(
    passphrases: &'a [String],
    term: &mut dyn Terminal,
    cerr: &mut dyn Write,
) -> Result<Option<&'a String>, ReturnCode> {
    if passphrases.len() > 1 {
        let _ = writeln!(cerr, "Too many passphrases given");
        return Err(ReturnCode::CommandLineError);
    }
    if let Some(passphrase) = passphrases.first() {
        return Ok(Some(passphrase));
    }
    if !term.is_live() {
        let _ = writeln!(
            cerr,
            "The terminal is not live: The passphrase argument is required"
        );
        return Err(ReturnCode::CommandLineError);
    }
    Ok(None)
}

fn resolve_passphrase(
    passphrases: &[String],
    term: &mut dyn Terminal,
    cerr: &mut dyn Write,
) -> Result<Zeroizing<String>, ReturnCode> {
    if let Some(passphrase) = supplied_passphrase(passphrases, term, cerr)? {
        return Ok(Zeroizing::new(passphrase.clone()));
    }
    let entered = PassphrasePrompter::new(term).prompt("Please enter passphrase: ");
    check_entered(entered, cerr)
}

fn resolve_new_passphrase(
    passphrases: &[String],
    term: &mut dyn Terminal,
    cerr: &mut dyn Write,
) -> Result<Zeroizing<String>, ReturnCode> {
    if let Some(passphrase) = supplied_passphrase(passphrases, term, cerr)? {
        return Ok(Zeroizing::new(passphrase.clone()));
    }
    let entered = NewPassphrasePrompter::new(term)
        .prompt("Please enter passphrase: ", "Please re-enter passphrase: ");
    check_entered(entered, cerr)
}

/// Maps a finished prompt into the command's passphrase, rejecting an
/// empty entry and reporting prompt failures. The prompters restore
/// echo before failing, so printing here is safe.
fn check_entered(
    entered: Result<Zeroizing<String>, PromptError>,
    cerr: &mut dyn Write,
) -> Result<Zeroizing<String>, ReturnCode> {
    match entered {
        Ok(passphrase) if passphrase.is_empty() => {
            let _ = writeln!(cerr, "No passphrase given");
            Err(ReturnCode::CommandLineError)
        }
        Ok(passphrase) => Ok(passphrase),
        Err(err) => {
            let _ = writeln!(cerr, "{err}");
            Err(ReturnCode::CommandLineError)
        }
    }
}
