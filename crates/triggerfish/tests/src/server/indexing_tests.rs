use std::{fs, time::Duration};

use tempfile::TempDir;

use super::*;
use crate::symbols::SymbolKind;

fn touch(
    root: &Path,
    relative: &str,
) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "x = 1\n").unwrap();
}

#[test]
fn discovers_matching_files_in_stable_order() {
    let dir = TempDir::new().unwrap();
    for file in [
        "a.py",
        "sub/b.py",
        "sub/deeper/c.py",
        ".hidden/d.py",
        "build/e.py",
        "node_modules/f.py",
        "__pycache__/g.py",
        "generated/h.py",
        "notes.txt",
    ] {
        touch(dir.path(), file);
    }

    let settings = IndexingSettings {
        exclude_paths: vec!["generated".to_string()],
        ..IndexingSettings::default()
    };
    let relative: Vec<_> = discover_workspace_files(dir.path(), &settings)
        .iter()
        .map(|path| file_display_name(Some(dir.path()), path))
        .collect();

    assert_eq!(relative, vec!["a.py", "sub/b.py", "sub/deeper/c.py"]);
}

#[test]
fn absolute_excludes_and_extra_extensions() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "pkg/a.py");
    touch(dir.path(), "pkg/a.pyi");
    touch(dir.path(), "vendor/z.py");

    let settings = IndexingSettings {
        extensions: vec!["py".to_string(), "pyi".to_string()],
        exclude_paths: vec![dir.path().join("vendor").to_string_lossy().into_owned()],
    };
    let relative: Vec<_> = discover_workspace_files(dir.path(), &settings)
        .iter()
        .map(|path| file_display_name(Some(dir.path()), path))
        .collect();

    assert_eq!(relative, vec!["pkg/a.py", "pkg/a.pyi"]);
}

#[tokio::test]
async fn failed_extraction_still_replaces_file_entry() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "pkg/mod.py");
    let path = dir.path().join("pkg/mod.py");

    let index = SymbolIndex::new();
    index.add_symbols([
        Symbol::new("Stale", SymbolKind::Class, &path, 3),
        Symbol::new("stale_fn", SymbolKind::Function, &path, 9),
    ]);

    let ctags = CtagsRunner::new("triggerfish-test-no-such-ctags", Duration::from_secs(5));
    let count = index_file(&index, &ctags, Some(dir.path()), &path).await;

    assert_eq!(count, 1);
    let symbols = index.symbols_in_file(&path);
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name(), "pkg/mod.py");
    assert_eq!(symbols[0].kind(), SymbolKind::File);
    assert_eq!(symbols[0].line(), 1);
    assert_eq!(index.stats().total, 1);
}

#[tokio::test]
async fn file_outside_root_uses_file_name() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "lonely.py");
    let ctags = CtagsRunner::new("triggerfish-test-no-such-ctags", Duration::from_secs(5));

    let symbols =
        extract_file_symbols(&ctags, Some(Path::new("/definitely/not/the/root")), &dir.path().join("lonely.py"))
            .await;
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name(), "lonely.py");
}

#[test]
fn generations_are_unique_and_pruned_after_commit() {
    let index = SymbolIndex::new();
    let generations = DashMap::new();
    let path = Path::new("/work/main.py");

    let first = next_index_generation(&generations, path);
    let second = next_index_generation(&generations, path);
    assert!(second > first);

    let stale = vec![Symbol::new("old", SymbolKind::Function, path, 1)];
    let fresh = vec![Symbol::new("new", SymbolKind::Function, path, 1)];
    assert!(!commit_if_latest(&index, &generations, path, first, stale));
    assert!(commit_if_latest(&index, &generations, path, second, fresh));
    assert!(generations.is_empty());
    assert_eq!(index.symbols_in_file(path)[0].name(), "new");

    let third = next_index_generation(&generations, path);
    assert!(third > second);
    assert!(!commit_if_latest(&index, &generations, Path::new("/work/other.py"), third, Vec::new()));
}

#[tokio::test]
async fn workspace_pass_does_not_overwrite_newer_reindex() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "pkg/a.py");
    let path = dir.path().join("pkg/a.py");
    let index = SymbolIndex::new();
    let generations = DashMap::new();
    let ctags = CtagsRunner::new("triggerfish-test-no-such-ctags", Duration::from_secs(5));

    // The scan claims the file, then a save claims it again and commits first.
    let scan = next_index_generation(&generations, &path);
    let save = next_index_generation(&generations, &path);
    let saved = vec![
        Symbol::new("pkg/a.py", SymbolKind::File, &path, 1),
        Symbol::new("fresh", SymbolKind::Function, &path, 4),
    ];
    assert!(commit_if_latest(&index, &generations, &path, save, saved));

    let scanned = index_file_at_generation(&index, &ctags, &generations, Some(dir.path()), &path, scan).await;
    assert_eq!(scanned, None);
    let names: Vec<_> =
        index.symbols_in_file(&path).iter().map(|symbol| symbol.name().to_string()).collect();
    assert_eq!(names, vec!["pkg/a.py", "fresh"]);
    assert!(generations.is_empty());
}

#[tokio::test]
async fn latest_request_commits_its_extraction() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "b.py");
    let path = dir.path().join("b.py");
    let index = SymbolIndex::new();
    let generations = DashMap::new();
    let ctags = CtagsRunner::new("triggerfish-test-no-such-ctags", Duration::from_secs(5));

    let generation = next_index_generation(&generations, &path);
    let count = index_file_at_generation(&index, &ctags, &generations, Some(dir.path()), &path, generation).await;
    assert_eq!(count, Some(1));
    assert_eq!(index.symbols_in_file(&path)[0].name(), "b.py");
    assert!(generations.is_empty());
}
