//! File-system storage: the TOML configuration file.

pub mod config;
