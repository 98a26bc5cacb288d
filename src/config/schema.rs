use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Construction-time settings for an [`crate::Editor`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub diff: DiffOptions,
    pub persist: PersistOptions,
    pub languages: LanguageMap,
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.diff.original_label.trim().is_empty() {
            issues.push(ValidationIssue::EmptyField("diff.original_label"));
        }
        if self.diff.modified_label.trim().is_empty() {
            issues.push(ValidationIssue::EmptyField("diff.modified_label"));
        }
        if self.persist.backup_suffix.trim().is_empty() {
            issues.push(ValidationIssue::EmptyField("persist.backup_suffix"));
        }
        if self.languages.python.is_empty() {
            issues.push(ValidationIssue::EmptyField("languages.python"));
        }
        if self.languages.javascript.is_empty() {
            issues.push(ValidationIssue::EmptyField("languages.javascript"));
        }

        let python: HashSet<String> = self
            .languages
            .python
            .iter()
            .map(|e| normalize_extension(e))
            .collect();
        let mut shared: Vec<String> = self
            .languages
            .javascript
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| python.contains(e))
            .collect();
        shared.sort();
        shared.dedup();
        for ext in shared {
            issues.push(ValidationIssue::SharedExtension(ext));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Unified diff rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub context_lines: usize,
    pub original_label: String,
    pub modified_label: String,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: 3,
            original_label: "original".to_string(),
            modified_label: "modified".to_string(),
        }
    }
}

/// Writing edited sources back to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistOptions {
    /// Leave a copy of the previous content next to the target.
    pub keep_backup: bool,
    pub backup_suffix: String,
    /// Re-read the target after writing and restore on mismatch.
    pub verify: bool,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self {
            keep_backup: false,
            backup_suffix: ".orig".to_string(),
            verify: true,
        }
    }
}

/// File extensions routed to each tree-backed adapter. Anything else is
/// edited as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageMap {
    pub python: Vec<String>,
    pub javascript: Vec<String>,
}

impl Default for LanguageMap {
    fn default() -> Self {
        Self {
            python: vec!["py".to_string(), "pyi".to_string()],
            javascript: vec![
                "js".to_string(),
                "mjs".to_string(),
                "cjs".to_string(),
                "jsx".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyField(&'static str),
    SharedExtension(String),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyField(field) => write!(f, "{field} must not be empty"),
            ValidationIssue::SharedExtension(ext) => {
                write!(f, "extension '{ext}' is mapped to both python and javascript")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}
