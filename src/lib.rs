//! Client library for the warden daemon.
//!
//! The interesting part lives in [`prompters`]: a small family of
//! terminal-interaction strategies (plain entry, hidden-echo secret
//! entry, confirmed double entry) layered over the [`terminal`]
//! capability. [`commands`] composes those strategies with request
//! construction and failure reporting against the daemon's RPC
//! boundary in [`rpc`].

pub mod commands;
pub mod error;
pub mod prompters;
pub mod rpc;
pub mod terminal;
