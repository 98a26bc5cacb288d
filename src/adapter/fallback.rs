//! Plain-text adapter.
//!
//! No syntax tree: the whole unit is a single element, `content`, whose body
//! statements are its lines.

use super::{BodyItem, ElementStructure, LanguageAdapter, PartialTarget};
use crate::error::{report, EditFailure};
use crate::language::Language;

pub const CONTENT: &str = "content";

pub struct LineFallbackAdapter {
    original: String,
    source: String,
}

impl LineFallbackAdapter {
    pub fn new(source: &str) -> Self {
        Self {
            original: source.to_string(),
            source: source.to_string(),
        }
    }

    fn lines(&self) -> Vec<&str> {
        self.source.lines().collect()
    }

    fn check_name(name: &str) -> Result<(), EditFailure> {
        if name == CONTENT {
            Ok(())
        } else {
            Err(EditFailure::not_found(name))
        }
    }

    fn try_replace(&mut self, name: &str, new_code: &str) -> Result<(), EditFailure> {
        Self::check_name(name)?;
        if new_code.is_empty() {
            return Err(EditFailure::EmptyPatch);
        }
        self.source = new_code.to_string();
        Ok(())
    }

    fn try_add(&mut self, new_code: &str, anchor: Option<&str>, before: bool) -> Result<(), EditFailure> {
        if let Some(anchor) = anchor.filter(|a| *a != CONTENT) {
            return Err(EditFailure::AnchorNotFound {
                name: anchor.to_string(),
            });
        }
        if new_code.is_empty() {
            return Err(EditFailure::EmptyPatch);
        }

        let mut block = new_code.to_string();
        if !block.ends_with('\n') {
            block.push('\n');
        }
        if before {
            block.push_str(&self.source);
            self.source = block;
        } else {
            if !self.source.is_empty() && !self.source.ends_with('\n') {
                self.source.push('\n');
            }
            self.source.push_str(&block);
        }
        Ok(())
    }

    fn try_replace_partial(
        &mut self,
        name: &str,
        new_code: &str,
        target: PartialTarget,
    ) -> Result<(), EditFailure> {
        Self::check_name(name)?;
        if new_code.is_empty() {
            return Err(EditFailure::EmptyPatch);
        }

        let lines = self.lines();
        let out_of_range = || EditFailure::TargetOutOfRange {
            name: name.to_string(),
            target: target.to_string(),
        };
        let (first, last) = match target {
            PartialTarget::Statement(index) if index < lines.len() => (index, index),
            PartialTarget::Lines { start, end } if start > 0 && start <= lines.len() => {
                // An end past the last line runs to the end of the text.
                let end = end.unwrap_or(start).max(start).min(lines.len());
                (start - 1, end - 1)
            }
            _ => return Err(out_of_range()),
        };

        let mut out: Vec<&str> = Vec::with_capacity(lines.len());
        out.extend_from_slice(&lines[..first]);
        out.extend(new_code.lines());
        out.extend_from_slice(&lines[last + 1..]);

        let mut text = out.join("\n");
        if self.source.ends_with('\n') {
            text.push('\n');
        }
        self.source = text;
        Ok(())
    }
}

impl LanguageAdapter for LineFallbackAdapter {
    fn language(&self) -> Language {
        Language::PlainText
    }

    fn list_elements(&self) -> Vec<String> {
        vec![CONTENT.to_string()]
    }

    fn get_source(&self, name: &str) -> Option<String> {
        (name == CONTENT).then(|| self.source.clone())
    }

    fn get_structure(&self, name: &str) -> Option<ElementStructure> {
        if name != CONTENT {
            return None;
        }
        let body_items: Vec<BodyItem> = self
            .lines()
            .iter()
            .enumerate()
            .map(|(index, _)| BodyItem {
                index,
                kind: "Line".to_string(),
                line_start: index + 1,
                line_end: index + 1,
                tag: None,
            })
            .collect();

        Some(ElementStructure {
            name: CONTENT.to_string(),
            kind: "TextContent".to_string(),
            line_start: 1,
            line_end: body_items.len().max(1),
            body_items,
        })
    }

    fn get_body_snippet(&self, name: &str, line_start: usize, line_end: usize) -> Option<String> {
        if name != CONTENT || line_start == 0 || line_end < line_start {
            return None;
        }
        let lines = self.lines();
        if line_start > lines.len() {
            return None;
        }
        let end = line_end.min(lines.len());
        Some(lines[line_start - 1..end].join("\n"))
    }

    fn replace_element(&mut self, name: &str, new_code: &str) -> bool {
        let outcome = self.try_replace(name, new_code);
        report("replace_element", outcome)
    }

    fn add_element(&mut self, new_code: &str, anchor: Option<&str>, before: bool) -> bool {
        let outcome = self.try_add(new_code, anchor, before);
        report("add_element", outcome)
    }

    fn delete_element(&mut self, name: &str) -> bool {
        let outcome = Self::check_name(name).map(|()| self.source.clear());
        report("delete_element", outcome)
    }

    fn replace_partial(&mut self, name: &str, new_code: &str, target: PartialTarget) -> bool {
        let outcome = self.try_replace_partial(name, new_code, target);
        report("replace_partial", outcome)
    }

    fn replace_source(&mut self, new_source: &str) -> bool {
        self.source = new_source.to_string();
        true
    }

    fn original_source(&self) -> &str {
        &self.original
    }

    fn modified_source(&self) -> String {
        self.source.clone()
    }
}
