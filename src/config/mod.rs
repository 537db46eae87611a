//! Configuration module
//!
//! This module handles loading, parsing, and validating the TOML file that
//! holds the search constraints and recording options for a crawl.
//!
//! # Example
//!
//! ```no_run
//! use linkwade::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.search.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, RecordFormat, RecordOptions, SearchConstraints};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;

/// Default path of the constraint file
pub const DEFAULT_CONFIG_PATH: &str = "crawl.toml";
