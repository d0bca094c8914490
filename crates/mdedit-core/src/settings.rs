//! Editor configuration.
//!
//! Settings are plain serde structs so hosts can load them from JSON (or any serde format).
//! Every field has a default; partial documents only override what they name.

use serde::{Deserialize, Serialize};

use crate::undo::DEFAULT_MAX_UNDO_DEPTH;

/// Default hard-wrap width used by the blockquote command.
pub const DEFAULT_LINE_LENGTH: usize = 72;

/// Behavioural settings of a [`MarkdownEditor`](crate::MarkdownEditor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    /// Hard-wrap width for quoted paragraphs (the `> ` prefix is included).
    pub line_length: usize,
    /// Maximum number of snapshots kept by the undo history.
    pub max_undo_depth: usize,
    /// Whether the editor keeps an undo history at all.
    pub undo_enabled: bool,
    /// Placeholder texts inserted by commands.
    pub strings: EditorStrings,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            line_length: DEFAULT_LINE_LENGTH,
            max_undo_depth: DEFAULT_MAX_UNDO_DEPTH,
            undo_enabled: true,
            strings: EditorStrings::default(),
        }
    }
}

/// Localizable placeholder texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorStrings {
    /// Link text used when a link is inserted without a selection.
    pub link_description: String,
    /// Alt text used when an image is inserted without a selection.
    pub image_description: String,
    /// Text of an empty blockquote.
    pub quote_example: String,
    /// Text of an empty code span or block.
    pub code_example: String,
}

impl Default for EditorStrings {
    fn default() -> Self {
        Self {
            link_description: "enter link description here".to_string(),
            image_description: "enter image description here".to_string(),
            quote_example: "Blockquote".to_string(),
            code_example: "enter code here".to_string(),
        }
    }
}
