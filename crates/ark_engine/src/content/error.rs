use std::fmt;
use std::path::PathBuf;

use roxmltree::{Document, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    Discovery,
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateDefInMod,
}

#[derive(Debug, Clone)]
pub struct ContentError {
    pub code: ContentErrorCode,
    pub message: String,
    pub mod_id: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl ContentError {
    pub(crate) fn at_node(
        code: ContentErrorCode,
        message: String,
        mod_id: &str,
        file_path: PathBuf,
        doc: &Document<'_>,
        node: Node<'_, '_>,
    ) -> Self {
        let pos = doc.text_pos_at(node.range().start);
        Self {
            code,
            message,
            mod_id: mod_id.to_string(),
            file_path,
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }
}

impl ContentErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::ReadFile => "read_file",
            Self::XmlMalformed => "xml_malformed",
            Self::InvalidRoot => "invalid_root",
            Self::UnknownDefType => "unknown_def_type",
            Self::UnknownField => "unknown_field",
            Self::DuplicateField => "duplicate_field",
            Self::MissingField => "missing_field",
            Self::InvalidValue => "invalid_value",
            Self::DuplicateDefInMod => "duplicate_def_in_mod",
        }
    }
}

/// `[code] path:line:column (mod id): message`; the position is omitted when unknown.
impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.file_path.display())?;
        if let Some(SourceLocation { line, column }) = self.location {
            write!(f, ":{line}:{column}")?;
        }
        write!(f, " (mod {}): {}", self.mod_id, self.message)
    }
}

impl std::error::Error for ContentError {}
