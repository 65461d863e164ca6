//! Shared utilities for the tomoshibi packages.

pub mod logger;
pub mod time;
