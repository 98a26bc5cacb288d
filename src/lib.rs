//! structedit: structural editing of source files by element name
//!
//! Elements (functions, classes, methods, top-level bindings and import
//! aliases) are addressed by name instead of by byte offset. Edits are
//! expressed as whole-element replacement, insertion next to an anchor,
//! deletion, or replacement of part of an element's body.
//!
//! # Architecture
//!
//! Each source unit is owned by one [`LanguageAdapter`]:
//!
//! - [`NativeTreeAdapter`] lowers Python into a mutable statement arena and
//!   renders it back, byte-identical when untouched.
//! - [`ExternalTreeAdapter`] keeps an immutable tree-sitter tree over
//!   JavaScript and splices text, re-parsing after every edit.
//! - [`LineFallbackAdapter`] treats anything else as a single `content`
//!   element made of lines.
//!
//! # Guarantees
//!
//! - A refused edit leaves the source untouched
//! - Every committed edit re-parses cleanly
//! - Imports brought in by replacement code are merged, never duplicated
//! - New code is never placed after the entry-point guard
//! - Saved files are written atomically and verified by read-back
//!
//! # Example
//!
//! ```
//! use structedit::{Editor, Language};
//!
//! let source = "import os\n\ndef main():\n    print(os.getcwd())\n";
//! let mut editor = Editor::from_source(source, Language::Python).unwrap();
//!
//! assert!(editor.replace_element(
//!     "main",
//!     "import sys\n\ndef main():\n    print(sys.argv)\n",
//! ));
//! assert_eq!(
//!     editor.modified_source(),
//!     "import os\nimport sys\n\ndef main():\n    print(sys.argv)\n",
//! );
//! ```

pub mod adapter;
pub mod config;
pub mod diff;
pub mod editor;
pub mod error;
pub mod guard;
pub mod imports;
pub mod index;
pub mod language;
pub mod persist;
pub mod pool;
pub mod text;
pub mod ts;

// Re-exports
pub use adapter::{
    BodyItem, ElementStructure, ExternalTreeAdapter, LanguageAdapter, LineFallbackAdapter,
    NativeTreeAdapter, PartialTarget,
};
pub use config::{
    load_from_path, load_from_str, ConfigError, DiffOptions, EditorConfig, LanguageMap,
    PersistOptions,
};
pub use editor::Editor;
pub use error::{EditFailure, EditorError, ParseError};
pub use language::Language;
pub use persist::{write_verified, PersistError, SaveOutcome};
pub use ts::TreeSitterError;
