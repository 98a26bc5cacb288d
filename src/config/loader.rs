use crate::config::schema::{EditorConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read editor config from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse editor config TOML{}: {source}", display_path(path))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("invalid editor config{}: {source}", display_path(path))]
    Validation {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

pub fn load_from_str(input: &str) -> Result<EditorConfig, ConfigError> {
    let config: EditorConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<EditorConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_defaults() {
        let config = load_from_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = load_from_str(
            r#"
[diff]
context_lines = 1

[persist]
keep_backup = true
"#,
        )
        .unwrap();

        assert_eq!(config.diff.context_lines, 1);
        assert_eq!(config.diff.original_label, "original");
        assert!(config.persist.keep_backup);
        assert!(config.persist.verify);
        assert_eq!(config.persist.backup_suffix, ".orig");
    }

    #[test]
    fn custom_languages() {
        let config = load_from_str(
            r#"
[languages]
python = ["py", "pyw"]
javascript = ["js"]
"#,
        )
        .unwrap();

        assert_eq!(config.languages.python, vec!["py", "pyw"]);
        assert_eq!(config.languages.javascript, vec!["js"]);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = load_from_str("[diff\ncontext_lines = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { path: None, .. }));
    }

    #[test]
    fn validation_failure_is_reported() {
        let err = load_from_str(
            r#"
[languages]
python = ["js"]
javascript = ["js"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn load_from_path_attaches_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("structedit.toml");
        fs::write(&path, "[persist]\nbackup_suffix = \"\"\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        match err {
            ConfigError::Validation { path: Some(p), .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_from_path("/nonexistent/structedit.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
