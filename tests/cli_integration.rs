//! CLI integration tests
//!
//! Tests the command-line interface end-to-end against a fake daemon
//! serving the Unix socket protocol.

use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::JoinHandle;
use tempfile::TempDir;

/// Get path to the warden binary
fn warden_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps/
    path.push("warden");
    path
}

/// Run warden with the given arguments and daemon socket path. Stdin is
/// a pipe, so the terminal is never live from the binary's point of
/// view.
fn run_warden(args: &[&str], socket: &Path) -> Output {
    Command::new(warden_bin())
        .args(args)
        .env("WARDEN_SOCKET", socket)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap()
}

/// Start a fake daemon that serves exactly one connection: it reads one
/// request line, sends `reply`, and returns the request line.
fn fake_daemon(socket: &Path, reply: &'static str) -> JoinHandle<String> {
    let listener = UnixListener::bind(socket).unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            stream.read_exact(&mut byte).unwrap();
            if byte[0] == b'\n' {
                break;
            }
            request.push(byte[0]);
        }
        stream.write_all(reply.as_bytes()).unwrap();
        String::from_utf8(request).unwrap()
    })
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_register_with_too_many_passphrases() {
    let dir = TempDir::new().unwrap();
    let output = run_warden(&["register", "a", "b"], &dir.path().join("none.sock"));

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("Too many passphrases given"));
}

#[test]
fn test_register_without_passphrase_on_non_live_terminal() {
    let dir = TempDir::new().unwrap();
    let output = run_warden(&["register"], &dir.path().join("none.sock"));

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("The terminal is not live"));
    assert!(stderr_of(&output).contains("The passphrase argument is required"));
}

#[test]
fn test_authenticate_alias() {
    let dir = TempDir::new().unwrap();
    let output = run_warden(&["authenticate", "a", "b"], &dir.path().join("none.sock"));

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("Too many passphrases given"));
}

#[test]
fn test_register_with_unreachable_daemon() {
    let dir = TempDir::new().unwrap();
    let output = run_warden(&["register", "secret"], &dir.path().join("missing.sock"));

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr_of(&output).contains("register failed"));
    assert!(stderr_of(&output).contains("cannot connect"));
}

#[test]
fn test_register_success() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("wardend.sock");
    let daemon = fake_daemon(&socket, "{\"ok\":true}\n");

    let output = run_warden(&["register", "secret"], &socket);

    assert_eq!(
        output.status.code(),
        Some(0),
        "register failed: {}",
        stderr_of(&output)
    );

    let request: serde_json::Value = serde_json::from_str(&daemon.join().unwrap()).unwrap();
    assert_eq!(request["method"], "authenticate");
    assert_eq!(request["passphrase"], "secret");
}

#[test]
fn test_register_rejected_by_daemon() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("wardend.sock");
    let daemon = fake_daemon(
        &socket,
        "{\"ok\":false,\"error\":{\"code\":\"permission-denied\",\"message\":\"Passphrase is not correct\"}}\n",
    );

    let output = run_warden(&["register", "wrong"], &socket);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("register failed: Passphrase is not correct"));
    daemon.join().unwrap();
}

#[test]
fn test_register_passes_verbosity_level() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("wardend.sock");
    let daemon = fake_daemon(&socket, "{\"ok\":true}\n");

    let output = run_warden(&["register", "-vv", "secret"], &socket);

    assert_eq!(output.status.code(), Some(0));
    let request: serde_json::Value = serde_json::from_str(&daemon.join().unwrap()).unwrap();
    assert_eq!(request["verbosity_level"], 2);
}

#[test]
fn test_passphrase_command_success() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("wardend.sock");
    let daemon = fake_daemon(&socket, "{\"ok\":true}\n");

    let output = run_warden(&["passphrase", "next"], &socket);

    assert_eq!(
        output.status.code(),
        Some(0),
        "passphrase failed: {}",
        stderr_of(&output)
    );

    let request: serde_json::Value = serde_json::from_str(&daemon.join().unwrap()).unwrap();
    assert_eq!(request["method"], "set-passphrase");
    assert_eq!(request["passphrase"], "next");
}

#[test]
fn test_passphrase_command_requires_live_terminal() {
    let dir = TempDir::new().unwrap();
    let output = run_warden(&["passphrase"], &dir.path().join("none.sock"));

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("The terminal is not live"));
}
