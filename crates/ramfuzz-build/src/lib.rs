//! Project configuration for RamFuzz.
//!
//! This crate provides:
//! - The `ramfuzz.toml` configuration format
//! - compile_commands.json parsing, for source lists and include paths
//!
//! # Example
//!
//! ```toml
//! # ramfuzz.toml
//! [project]
//! name = "geometry"
//!
//! [harness]
//! namespace = "ramfuzz"
//! class_prefix = "RF__"
//! eligibility = "direct-members"
//!
//! [sources]
//! files = ["include/shape.hpp", "include/widget.hpp"]
//! includes = ["include"]
//! ```

mod config;
mod compile_commands;
mod error;

pub use config::{HarnessConfig, ProjectConfig, RamfuzzConfig, SourcesConfig};
pub use compile_commands::{CompileCommand, CompileCommands};
pub use error::{BuildError, Result};
