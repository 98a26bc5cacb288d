//! Editor configuration loaded from TOML.

pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    DiffOptions, EditorConfig, LanguageMap, PersistOptions, ValidationError, ValidationIssue,
};
