use std::{
    borrow::Cow,
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Closed set of symbol categories the index understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    File,
    Class,
    Method,
    Function,
    Variable,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 5] =
        [SymbolKind::File, SymbolKind::Class, SymbolKind::Method, SymbolKind::Function, SymbolKind::Variable];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Class => "class",
            Self::Method => "method",
            Self::Function => "function",
            Self::Variable => "variable",
        }
    }

    /// Map a ctags kind name onto a symbol kind.
    ///
    /// Names outside the table are not an error: the tag is simply dropped.
    pub fn from_ctags_kind(kind: &str) -> Option<Self> {
        match kind {
            "class" => Some(Self::Class),
            "function" => Some(Self::Function),
            "method" => Some(Self::Method),
            "member" | "variable" => Some(Self::Variable),
            _ => None,
        }
    }
}

impl Display for SymbolKind {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named location inside a file.
///
/// Symbols are immutable once built; the line is always 1-based and at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
    file_path: PathBuf,
    line: u32,
    scope: Option<String>,
    language: Option<String>,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        file_path: impl Into<PathBuf>,
        line: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            file_path: file_path.into(),
            line: line.max(1),
            scope: None,
            language: None,
        }
    }

    pub fn with_scope(
        mut self,
        scope: Option<String>,
    ) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_language(
        mut self,
        language: Option<String>,
    ) -> Self {
        self.language = language;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// `scope.name` when the symbol has a non-empty scope, otherwise `name`.
    pub fn display_name(&self) -> Cow<'_, str> {
        match self.scope.as_deref() {
            Some(scope) if !scope.is_empty() => Cow::Owned(format!("{scope}.{}", self.name)),
            _ => Cow::Borrowed(&self.name),
        }
    }
}
