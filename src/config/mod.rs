//! Configuration module for Page-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A configuration file is optional: `Config::default()` is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use page_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("page-mirror.toml")).unwrap();
//! println!("Failure policy: {:?}", config.loader.failure_policy);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FailurePolicy, HttpConfig, LoaderConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
