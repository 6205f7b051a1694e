//! Shared types, error model, and configuration for notecraft.
//!
//! This crate is the foundation depended on by all other notecraft crates.
//! It provides:
//! - [`NotecraftError`]: the unified error type
//! - Domain types ([`Message`], [`Document`], [`SectionKind`], [`ReviewReport`])
//! - Configuration ([`AppConfig`], [`ExtractionConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CategoryRule, DefaultsConfig, ExtractionConfig, ReviewConfig, SaveMode,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{NotecraftError, Result};
pub use types::{
    CodeSample, Concept, ConceptEntry, Document, DocumentStats, KeyPoint, Message, QaPair,
    ReviewIssue, ReviewReport, Role, SectionKind, Severity, SessionId,
};
