use crate::config::LanguageMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Source classification that decides which adapter variant handles a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Native arena tree over the Python grammar.
    Python,
    /// Immutable tree-sitter tree over the JavaScript grammar.
    JavaScript,
    /// Untyped text, edited line by line.
    PlainText,
}

impl Language {
    /// Classify a path by its extension. Unknown extensions are plain text.
    pub fn from_path(path: &Path, map: &LanguageMap) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Language::PlainText;
        };
        let listed = |exts: &[String]| {
            exts.iter()
                .any(|e| e.trim().trim_start_matches('.').eq_ignore_ascii_case(ext))
        };

        if listed(&map.python) {
            Language::Python
        } else if listed(&map.javascript) {
            Language::JavaScript
        } else {
            Language::PlainText
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Python => f.write_str("python"),
            Language::JavaScript => f.write_str("javascript"),
            Language::PlainText => f.write_str("text"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" => Ok(Language::JavaScript),
            "text" | "txt" | "plain" => Ok(Language::PlainText),
            other => Err(format!("unknown language: {other}")),
        }
    }
}
