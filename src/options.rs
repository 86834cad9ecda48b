use serde::Deserialize;

/// Options controlling how a document is rendered to text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOptions {
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first (default: true)
    #[serde(default = "default_true")]
    pub xml_declaration: bool,

    /// Spaces per nesting level; 0 renders the whole document on one line (default: 2)
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Add GPX 1.1 `version` and `xmlns` attributes to the root (default: false)
    #[serde(default)]
    pub schema_attributes: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            indent: default_indent(),
            schema_attributes: false,
        }
    }
}

impl WriteOptions {
    /// Single-line output without a declaration.
    pub fn compact() -> Self {
        Self {
            xml_declaration: false,
            indent: 0,
            schema_attributes: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_indent() -> usize {
    2
}
