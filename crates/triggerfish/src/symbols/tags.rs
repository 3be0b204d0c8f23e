use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::symbols::types::{Symbol, SymbolKind};

/// One tag emitted by the external tagger, validated field by field.
///
/// `name` and `kind` are required strings. Everything else is coerced: a
/// missing or non-positive `line` becomes 1, and a non-string `scope`,
/// `language` or `path` is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub name: String,
    pub kind: String,
    pub line: u32,
    pub path: Option<PathBuf>,
    pub scope: Option<String>,
    pub language: Option<String>,
}

impl TagRecord {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            line: line.max(1),
            path: None,
            scope: None,
            language: None,
        }
    }

    pub fn from_json(entry: &Value) -> Option<Self> {
        let name = entry.get("name")?.as_str()?;
        let kind = entry.get("kind")?.as_str()?;
        let line = entry
            .get("line")
            .and_then(Value::as_u64)
            .and_then(|line| u32::try_from(line).ok())
            .filter(|line| *line >= 1)
            .unwrap_or(1);

        Some(Self {
            name: name.to_string(),
            kind: kind.to_string(),
            line,
            path: string_field(entry, "path").map(PathBuf::from),
            scope: string_field(entry, "scope"),
            language: string_field(entry, "language"),
        })
    }

    /// Convert into an index symbol owned by `file_path`, or `None` for kinds
    /// outside the supported table.
    pub fn to_symbol(
        &self,
        file_path: &Path,
    ) -> Option<Symbol> {
        let kind = SymbolKind::from_ctags_kind(&self.kind)?;
        Some(
            Symbol::new(self.name.clone(), kind, file_path, self.line)
                .with_scope(self.scope.clone())
                .with_language(self.language.clone()),
        )
    }
}

fn string_field(
    entry: &Value,
    key: &str,
) -> Option<String> {
    entry.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Build the full symbol set for one file: a synthetic file symbol named
/// `display_name` followed by every tag with a known kind.
pub fn symbols_from_tags(
    file_path: &Path,
    display_name: &str,
    tags: &[TagRecord],
) -> Vec<Symbol> {
    let mut symbols = Vec::with_capacity(tags.len() + 1);
    symbols.push(Symbol::new(display_name, SymbolKind::File, file_path, 1));
    symbols.extend(tags.iter().filter_map(|tag| tag.to_symbol(file_path)));
    symbols
}

/// Workspace-relative POSIX path when `file_path` lives under the root,
/// otherwise the bare file name.
pub fn file_display_name(
    workspace_root: Option<&Path>,
    file_path: &Path,
) -> String {
    if let Some(relative) = workspace_root.and_then(|root| file_path.strip_prefix(root).ok())
        && relative.components().next().is_some()
    {
        return relative.components().map(|part| part.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
    }

    file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string_lossy().into_owned())
}

#[cfg(test)]
#[path = "../../tests/src/symbols/tags_tests.rs"]
mod tests;
