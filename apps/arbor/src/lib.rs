//! # Arbor
//!
//! HTTP API, CLI and configuration around [`arbor_core::Store`].
//!
//! The binary in `main.rs` is a thin wrapper; everything here is public so
//! integration tests can drive the router directly.

pub mod api;
pub mod cli;
pub mod config;
