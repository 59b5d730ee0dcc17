//! RPC boundary to the warden daemon.
//!
//! The commands treat the daemon as an opaque blocking collaborator
//! behind the [`AuthRpc`] trait. The concrete [`DaemonClient`] speaks
//! newline-delimited JSON over a Unix domain socket: one request line
//! out, one reply line back. Retry, timeout, and connection policy all
//! live on the daemon side of this boundary.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

/// Request to register this client with the daemon.
pub struct AuthenticateRequest {
    pub passphrase: Zeroizing<String>,
    pub verbosity_level: u8,
}

/// Reply to a successful registration. Carries no state this client
/// inspects.
#[derive(Debug)]
pub struct AuthenticateReply;

/// Request to change the passphrase the daemon requires.
pub struct SetPassphraseRequest {
    pub passphrase: Zeroizing<String>,
    pub verbosity_level: u8,
}

/// Coarse classification of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RpcStatusKind {
    /// The daemon could not be reached at all.
    Unavailable,
    /// The daemon understood the request and rejected it.
    PermissionDenied,
    /// Any other remote failure.
    Internal,
}

/// A failure status returned across the RPC boundary.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RpcStatus {
    pub kind: RpcStatusKind,
    pub message: String,
}

impl RpcStatus {
    pub fn new(kind: RpcStatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Blocking operations the commands dispatch through.
pub trait AuthRpc {
    fn authenticate(
        &mut self,
        request: &AuthenticateRequest,
    ) -> Result<AuthenticateReply, RpcStatus>;

    fn set_passphrase(&mut self, request: &SetPassphraseRequest) -> Result<(), RpcStatus>;
}

#[derive(Serialize)]
struct WireRequest<'a> {
    method: &'static str,
    passphrase: &'a str,
    verbosity_level: u8,
}

#[derive(Deserialize)]
struct WireReply {
    ok: bool,
    #[serde(default)]
    error: Option<WireError>,
}

#[derive(Deserialize)]
struct WireError {
    #[serde(default)]
    code: String,
    message: String,
}

fn kind_from_code(code: &str) -> RpcStatusKind {
    match code {
        "permission-denied" => RpcStatusKind::PermissionDenied,
        "unavailable" => RpcStatusKind::Unavailable,
        _ => RpcStatusKind::Internal,
    }
}

/// Client for the warden daemon's Unix socket endpoint.
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// The socket path used when neither `--socket` nor `WARDEN_SOCKET`
    /// is given: `$XDG_RUNTIME_DIR/warden/wardend.sock`, falling back
    /// to the system-wide `/run/warden/wardend.sock`.
    pub fn default_socket_path() -> PathBuf {
        if let Some(dir) = std::env::var_os("XDG_RUNTIME_DIR") {
            return PathBuf::from(dir).join("warden").join("wardend.sock");
        }
        PathBuf::from("/run/warden/wardend.sock")
    }

    fn call(&self, request: &WireRequest) -> Result<(), RpcStatus> {
        tracing::debug!(
            method = request.method,
            socket = %self.socket_path.display(),
            "dispatching request"
        );

        let mut stream = UnixStream::connect(&self.socket_path).map_err(|e| {
            RpcStatus::new(
                RpcStatusKind::Unavailable,
                format!(
                    "cannot connect to the warden daemon at \"{}\": {}",
                    self.socket_path.display(),
                    e
                ),
            )
        })?;

        let mut line = serde_json::to_string(request).map_err(|e| {
            RpcStatus::new(
                RpcStatusKind::Internal,
                format!("failed to encode request: {e}"),
            )
        })?;
        line.push('\n');
        let sent = stream.write_all(line.as_bytes());
        // The serialized request holds the passphrase.
        line.zeroize();
        sent.map_err(|e| {
            RpcStatus::new(
                RpcStatusKind::Unavailable,
                format!("failed to send request: {e}"),
            )
        })?;

        let mut reply_line = String::new();
        match BufReader::new(&stream).read_line(&mut reply_line) {
            Ok(0) => {
                return Err(RpcStatus::new(
                    RpcStatusKind::Unavailable,
                    "connection closed before a reply arrived",
                ));
            }
            Ok(_) => {}
            Err(e) => {
                return Err(RpcStatus::new(
                    RpcStatusKind::Unavailable,
                    format!("failed to read reply: {e}"),
                ));
            }
        }

        let reply: WireReply = serde_json::from_str(&reply_line).map_err(|e| {
            RpcStatus::new(
                RpcStatusKind::Internal,
                format!("malformed reply from daemon: {e}"),
            )
        })?;

        if reply.ok {
            tracing::debug!(method = request.method, "request accepted");
            return Ok(());
        }

        let error = reply.error.unwrap_or(WireError {
            code: String::new(),
            message: "daemon reported an unspecified failure".to_string(),
        });
        Err(RpcStatus::new(kind_from_code(&error.code), error.message))
    }
}

impl AuthRpc for DaemonClient {
    fn authenticate(
        &mut self,
        request: &AuthenticateRequest,
    ) -> Result<AuthenticateReply, RpcStatus> {
        self.call(&WireRequest {
            method: "authenticate",
            passphrase: &request.passphrase,
            verbosity_level: request.verbosity_level,
        })?;
        Ok(AuthenticateReply)
    }

    fn set_passphrase(&mut self, request: &SetPassphraseRequest) -> Result<(), RpcStatus> {
        self.call(&WireRequest {
            method: "set-passphrase",
            passphrase: &request.passphrase,
            verbosity_level: request.verbosity_level,
        })
    }
}
