//! vmctl configuration management library.
//!
//! Loads the [`ControlConfig`] that describes which VM to drive, with which
//! credentials, and how vmrun should be executed.

pub mod config;


pub use config::{default_config_path, ConfigOverrides, ControlConfig};
