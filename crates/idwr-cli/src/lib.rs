//! CLI library components for the IDWR pipeline.

pub mod commands;
pub mod config;
pub mod logging;
