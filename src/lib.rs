//! taskboard - project-management terminal client
//!
//! This library provides the core functionality for the taskboard CLI,
//! a client for a multi-tenant project-management GraphQL backend.
//!
//! # Core Concepts
//!
//! - **Organizations**: every query is scoped to one organization slug;
//!   without a selected organization nothing is fetched
//! - **Board**: tasks partitioned into To Do / In Progress / Done columns,
//!   with a flat list as the alternate view
//! - **Comment threads**: per-task comment lists behind a keyed cache that
//!   discards stale fetches and prepends created comments without a
//!   re-fetch
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `client`: GraphQL gateway trait and HTTP implementation
//! - `comment`: Comment records, keyed cache, and the store adapter
//! - `config`: Configuration loading from `.taskboard.toml`
//! - `error`: Error types and result aliases
//! - `format`: Display helpers (relative time, author names, initials)
//! - `local`: JSONL-backed gateway for demos and tests
//! - `org`: Organization records and selection state
//! - `output`: Human and JSON output envelopes
//! - `task`: Task records, statuses, and board partitioning
//! - `ui`: Interactive terminal board

pub mod cli;
pub mod client;
pub mod comment;
pub mod config;
pub mod error;
pub mod format;
pub mod local;
pub mod org;
pub mod output;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
