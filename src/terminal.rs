//! Terminal capability consumed by the prompters.
//!
//! A [`Terminal`] bundles what interactive prompting needs from a
//! session: a liveness check, access to the input and output streams,
//! and echo control. Implementations are substitutable: the real
//! [`UnixTerminal`] for production and [`StubTerminal`] bound to fixed
//! in-memory buffers for deterministic tests.

use std::io::{self, BufRead, IsTerminal, Write};

/// An interactive session as seen by the prompters.
pub trait Terminal {
    /// Whether the session supports interactive prompting. Commands use
    /// this to decide whether a missing required value can be solicited
    /// at all.
    fn is_live(&self) -> bool;

    /// The stream prompts are read from.
    fn input(&mut self) -> &mut dyn BufRead;

    /// The stream prompt labels and confirmations are written to.
    fn output(&mut self) -> &mut dyn Write;

    /// Toggles whether characters typed to `input()` are visibly echoed
    /// on `output()`.
    fn set_echo(&mut self, enabled: bool) -> io::Result<()>;
}

/// The process's controlling terminal, over locked stdin/stdout.
pub struct UnixTerminal {
    stdin: io::StdinLock<'static>,
    stdout: io::StdoutLock<'static>,
}

impl UnixTerminal {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin().lock(),
            stdout: io::stdout().lock(),
        }
    }
}

impl Default for UnixTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for UnixTerminal {
    fn is_live(&self) -> bool {
        self.stdin.is_terminal() && self.stdout.is_terminal()
    }

    fn input(&mut self) -> &mut dyn BufRead {
        &mut self.stdin
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }

    /// Toggle echo on stdin using termios.
    #[cfg(unix)]
    fn set_echo(&mut self, enabled: bool) -> io::Result<()> {
        use std::os::fd::AsRawFd;

        let fd = self.stdin.as_raw_fd();

        let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
        if unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }

        if enabled {
            termios.c_lflag |= libc::ECHO;
        } else {
            termios.c_lflag &= !libc::ECHO;
        }

        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn set_echo(&mut self, _enabled: bool) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "echo control is not supported on this platform",
        ))
    }
}

/// A terminal bound to fixed in-memory buffers (for testing).
///
/// Input is served from a pre-seeded buffer, output is captured, and
/// every `set_echo` call is recorded so tests can verify echo
/// discipline.
pub struct StubTerminal {
    live: bool,
    input: io::Cursor<Vec<u8>>,
    output: Vec<u8>,
    echo_calls: Vec<bool>,
}

impl StubTerminal {
    /// A live stub serving `input` from memory.
    pub fn new(input: &str) -> Self {
        Self::from_bytes(input.as_bytes().to_vec())
    }

    /// A live stub serving raw bytes, which need not be valid UTF-8.
    pub fn from_bytes(input: Vec<u8>) -> Self {
        Self {
            live: true,
            input: io::Cursor::new(input),
            output: Vec::new(),
            echo_calls: Vec::new(),
        }
    }

    /// A stub that reports the session as not interactive.
    pub fn non_live() -> Self {
        let mut term = Self::new("");
        term.live = false;
        term
    }

    /// Everything written to the output stream so far.
    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// The sequence of `set_echo` arguments observed.
    pub fn echo_calls(&self) -> &[bool] {
        &self.echo_calls
    }
}

impl Terminal for StubTerminal {
    fn is_live(&self) -> bool {
        self.live
    }

    fn input(&mut self) -> &mut dyn BufRead {
        &mut self.input
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut self.output
    }

    fn set_echo(&mut self, enabled: bool) -> io::Result<()> {
        self.echo_calls.push(enabled);
        Ok(())
    }
}
