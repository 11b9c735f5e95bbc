//! Post-install hook library.
//!
//! Exposes the hook and its collaborators for the `post-install` binary and
//! for integration testing.

pub mod commands;
pub mod config;
pub mod hook;
pub mod preflight;
pub mod process;
