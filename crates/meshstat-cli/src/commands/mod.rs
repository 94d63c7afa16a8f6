//! Command implementations

pub mod status;
