//! taskman - per-user task tracker
//!
//! Tasks live in a key-value store, one list per user, next to a session
//! pointer naming the logged-in user. The same core drives a one-shot CLI
//! and an interactive terminal UI.
//!
//! # Module Organization
//!
//! - `auth`: Credentials, login-or-register, session state
//! - `task`: Task records and the pure task transition function
//! - `filter`: All / Completed / Incomplete views
//! - `persist`: Typed load/save over the store, corrupt-data policy
//! - `storage`: `KvStore` trait, in-memory and file-backed stores
//! - `lock`: File locking and atomic writes
//! - `tracker`: Session + tasks orchestration with write-through persistence
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types, result alias, exit codes
//! - `output`: Human and JSON output envelopes
//! - `cli`: Command-line interface using clap
//! - `ui`: Terminal UI using ratatui

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod lock;
pub mod output;
pub mod persist;
pub mod storage;
pub mod task;
pub mod tracker;
pub mod ui;

pub use error::{Error, Result};
