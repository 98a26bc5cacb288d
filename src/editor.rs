//! The editor facade: one adapter per open unit.

use crate::adapter::{
    ElementStructure, ExternalTreeAdapter, LanguageAdapter, LineFallbackAdapter,
    NativeTreeAdapter, PartialTarget,
};
use crate::config::EditorConfig;
use crate::error::{EditorError, ParseError};
use crate::language::Language;
use crate::persist::{self, PersistError, SaveOutcome};
use std::fs;
use std::path::{Path, PathBuf};

/// Structural editor over a single source unit.
///
/// # Example
///
/// ```
/// use structedit::{Editor, Language};
///
/// let mut editor = Editor::from_source(
///     "def greet():\n    return 'hi'\n",
///     Language::Python,
/// )
/// .unwrap();
///
/// assert!(editor.replace_element("greet", "def greet():\n    return 'hello'\n"));
/// assert!(editor.diff().contains("+    return 'hello'"));
/// ```
pub struct Editor {
    path: Option<PathBuf>,
    config: EditorConfig,
    adapter: Box<dyn LanguageAdapter + Send>,
}

impl Editor {
    /// Open a file with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        Self::open_with_config(path, EditorConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: EditorConfig) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let language = Language::from_path(path, &config.languages);
        Self::open_as(path, language, config)
    }

    /// Open a file with an explicit language, ignoring its extension.
    pub fn open_as(path: impl AsRef<Path>, language: Language, config: EditorConfig) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), %language, bytes = source.len(), "opening");

        let adapter = adapter_for(&source, language).map_err(|source| EditorError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            config,
            adapter,
        })
    }

    /// Editor over in-memory source, not backed by a file.
    pub fn from_source(source: &str, language: Language) -> Result<Self, ParseError> {
        Self::from_source_with_config(source, language, EditorConfig::default())
    }

    pub fn from_source_with_config(
        source: &str,
        language: Language,
        config: EditorConfig,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            path: None,
            config,
            adapter: adapter_for(source, language)?,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn language(&self) -> Language {
        self.adapter.language()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn list_elements(&self) -> Vec<String> {
        self.adapter.list_elements()
    }

    pub fn get_source(&self, name: &str) -> Option<String> {
        self.adapter.get_source(name)
    }

    pub fn get_structure(&self, name: &str) -> Option<ElementStructure> {
        self.adapter.get_structure(name)
    }

    pub fn get_body_snippet(&self, name: &str, line_start: usize, line_end: usize) -> Option<String> {
        self.adapter.get_body_snippet(name, line_start, line_end)
    }

    pub fn replace_element(&mut self, name: &str, new_code: &str) -> bool {
        self.adapter.replace_element(name, new_code)
    }

    pub fn add_element(&mut self, new_code: &str, anchor: Option<&str>, before: bool) -> bool {
        self.adapter.add_element(new_code, anchor, before)
    }

    pub fn delete_element(&mut self, name: &str) -> bool {
        self.adapter.delete_element(name)
    }

    /// Replace part of an element's body. The statement index wins over the
    /// line range; with neither the edit is refused.
    pub fn replace_partial(
        &mut self,
        name: &str,
        new_code: &str,
        line_start: Option<usize>,
        line_end: Option<usize>,
        statement_index: Option<usize>,
    ) -> bool {
        match PartialTarget::from_parts(line_start, line_end, statement_index) {
            Some(target) => self.adapter.replace_partial(name, new_code, target),
            None => {
                tracing::debug!(
                    operation = "replace_partial",
                    failure = %crate::error::EditFailure::MissingTarget,
                    "edit rejected"
                );
                false
            }
        }
    }

    pub fn replace_source(&mut self, new_source: &str) -> bool {
        self.adapter.replace_source(new_source)
    }

    pub fn original_source(&self) -> &str {
        self.adapter.original_source()
    }

    pub fn modified_source(&self) -> String {
        self.adapter.modified_source()
    }

    /// Unified diff against the source at open time, using the configured
    /// labels and context.
    pub fn diff(&self) -> String {
        self.adapter.diff(&self.config.diff)
    }

    /// Write the current source back to the opened file.
    pub fn save(&self) -> Result<SaveOutcome, PersistError> {
        let path = self.path.as_deref().ok_or(PersistError::NoPath)?;
        self.save_to(path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<SaveOutcome, PersistError> {
        persist::write_verified(path.as_ref(), &self.modified_source(), &self.config.persist)
    }
}

fn adapter_for(source: &str, language: Language) -> Result<Box<dyn LanguageAdapter + Send>, ParseError> {
    Ok(match language {
        Language::Python => Box::new(NativeTreeAdapter::new(source)?),
        Language::JavaScript => Box::new(ExternalTreeAdapter::new(source)?),
        Language::PlainText => Box::new(LineFallbackAdapter::new(source)),
    })
}
