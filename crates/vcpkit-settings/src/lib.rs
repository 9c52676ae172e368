//! # VCPKit Settings
//!
//! Configuration persistence for VCPKit. Settings are stored as JSON or
//! TOML in the platform config directory and cover the polling engine
//! and the recent-files list; everything else about the machine comes
//! from the controller itself.

pub mod config;

pub use config::{Config, PollingSettings, RecentFilesSettings};
