//! Exit codes for the status command
//!
//! Any failure (usage, configuration, locate, report or health) exits with
//! `ERROR`.

/// Installation found and every workload healthy
pub const SUCCESS: i32 = 0;

/// Anything else
pub const ERROR: i32 = 1;
