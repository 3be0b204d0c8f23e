use std::path::PathBuf;

use super::*;

fn file_symbol(
    name: &str,
    path: &str,
) -> Symbol {
    Symbol::new(name, SymbolKind::File, path, 1)
}

fn names(symbols: &[Symbol]) -> Vec<&str> {
    symbols.iter().map(Symbol::name).collect()
}

#[test]
fn add_and_search_symbols() {
    let index = SymbolIndex::new();
    index.add_symbols([file_symbol("utils.py", "/tmp/utils.py"), file_symbol("main.py", "/tmp/main.py")]);

    let matches = index.fuzzy_search("util", Some(SymbolKind::File), 50, 60.0);
    assert!(!matches.is_empty());
    assert_eq!(matches[0].symbol.name(), "utils.py");
}

#[test]
fn clear_file_removes_symbols_from_every_bucket() {
    let index = SymbolIndex::new();
    let main = PathBuf::from("/tmp/main.py");
    index.add_symbols([
        file_symbol("main.py", "/tmp/main.py"),
        Symbol::new("main", SymbolKind::Function, &main, 3),
        file_symbol("utils.py", "/tmp/utils.py"),
    ]);

    index.clear_file(&main);

    assert_eq!(names(&index.get_symbols(None)), vec!["utils.py"]);
    assert!(index.get_symbols(Some(SymbolKind::Function)).is_empty());
    let stats = index.stats();
    assert_eq!(stats.total, 1);
    assert!(!stats.by_kind.contains_key(&SymbolKind::Function), "empty kind bucket must be dropped");
}

#[test]
fn clear_unknown_file_is_noop() {
    let index = SymbolIndex::new();
    index.add_symbols([file_symbol("main.py", "/tmp/main.py")]);
    index.clear_file(Path::new("/tmp/missing.py"));
    assert_eq!(index.stats().total, 1);
}

#[test]
fn survivors_keep_insertion_order() {
    let index = SymbolIndex::new();
    index.add_symbols([
        file_symbol("a.py", "/a.py"),
        file_symbol("b.py", "/b.py"),
        file_symbol("c.py", "/c.py"),
        Symbol::new("helper", SymbolKind::Function, "/b.py", 2),
        file_symbol("d.py", "/d.py"),
    ]);

    index.clear_file(Path::new("/b.py"));

    assert_eq!(names(&index.get_symbols(None)), vec!["a.py", "c.py", "d.py"]);
}

#[test]
fn duplicates_are_kept() {
    let index = SymbolIndex::new();
    index.add_symbols([file_symbol("main.py", "/tmp/main.py"), file_symbol("main.py", "/tmp/main.py")]);

    assert_eq!(index.get_symbols(None).len(), 2);
    assert_eq!(index.fuzzy_search("main.py", None, 10, 100.0).len(), 2);
}

#[test]
fn update_file_replaces_and_is_idempotent() {
    let index = SymbolIndex::new();
    let path = PathBuf::from("/tmp/main.py");
    index.add_symbols([file_symbol("main.py", "/tmp/main.py"), Symbol::new("old", SymbolKind::Class, &path, 4)]);

    let replacement = vec![file_symbol("main.py", "/tmp/main.py"), Symbol::new("new", SymbolKind::Method, &path, 9)];
    index.update_file(&path, replacement.clone());
    let first = index.get_symbols(None);
    index.update_file(&path, replacement);
    let second = index.get_symbols(None);

    assert_eq!(first, second);
    assert_eq!(names(&second), vec!["main.py", "new"]);
    assert!(index.get_symbols(Some(SymbolKind::Class)).is_empty());
}

#[test]
fn update_file_matches_clear_then_add() {
    let seeded = || {
        let index = SymbolIndex::new();
        index.add_symbols([file_symbol("a.py", "/a.py"), file_symbol("b.py", "/b.py")]);
        index
    };
    let new_symbols = vec![file_symbol("a.py", "/a.py"), Symbol::new("f", SymbolKind::Function, "/a.py", 2)];

    let updated = seeded();
    updated.update_file(Path::new("/a.py"), new_symbols.clone());

    let manual = seeded();
    manual.clear_file(Path::new("/a.py"));
    manual.add_symbols(new_symbols);

    assert_eq!(updated.get_symbols(None), manual.get_symbols(None));
    assert_eq!(updated.stats(), manual.stats());
}

#[test]
fn get_symbols_filters_by_kind() {
    let index = SymbolIndex::new();
    index.add_symbols([
        file_symbol("main.py", "/main.py"),
        Symbol::new("Application", SymbolKind::Class, "/main.py", 2),
    ]);

    assert_eq!(names(&index.get_symbols(Some(SymbolKind::Class))), vec!["Application"]);
    assert!(index.get_symbols(Some(SymbolKind::Variable)).is_empty());
}

#[test]
fn symbols_in_file_returns_file_bucket() {
    let index = SymbolIndex::new();
    index.add_symbols([file_symbol("a.py", "/a.py"), file_symbol("b.py", "/b.py")]);
    assert_eq!(names(&index.symbols_in_file(Path::new("/b.py"))), vec!["b.py"]);
    assert_eq!(index.file_count(), 2);
}

#[test]
fn fuzzy_search_uses_scoped_display_name() {
    let index = SymbolIndex::new();
    index.add_symbols([Symbol::new("run", SymbolKind::Method, "/main.py", 3).with_scope(Some("Application".into()))]);

    let hits = index.fuzzy_search("Application.run", None, 10, 100.0);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].score, 100.0);
}

#[test]
fn fuzzy_search_respects_limit_and_ordering() {
    let index = SymbolIndex::new();
    index.add_symbols((0..20).map(|i| file_symbol(&format!("module_{i}.py"), &format!("/m{i}.py"))));
    index.add_symbols([file_symbol("module.py", "/module.py")]);

    let hits = index.fuzzy_search("module", None, 5, 0.0);
    assert_eq!(hits.len(), 5);
    assert!(hits.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn fuzzy_search_min_score_zero_keeps_everything() {
    let index = SymbolIndex::new();
    index.add_symbols([file_symbol("alpha.py", "/alpha.py"), file_symbol("beta.py", "/beta.py")]);

    let hits = index.fuzzy_search("zzz", None, 10, 0.0);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].symbol.name(), "alpha.py", "ties keep candidate order");
}

#[test]
fn fuzzy_search_min_score_max_requires_exact_match() {
    let index = SymbolIndex::new();
    index.add_symbols([file_symbol("utils.py", "/utils.py"), file_symbol("utils_extra.py", "/x.py")]);

    let hits = index.fuzzy_search("utils.py", None, 10, 100.0);
    assert_eq!(names(&hits.into_iter().map(|hit| hit.symbol).collect::<Vec<_>>()), vec!["utils.py"]);
}

#[test]
fn fuzzy_search_finds_files_despite_typos() {
    let index = SymbolIndex::new();
    index.add_symbols([file_symbol("main.py", "/main.py"), file_symbol("zebra.py", "/zebra.py")]);

    let hits = index.fuzzy_search("mian", Some(SymbolKind::File), 10, 60.0);
    assert_eq!(names(&hits.into_iter().map(|hit| hit.symbol).collect::<Vec<_>>()), vec!["main.py"]);
}

#[test]
fn fuzzy_search_tolerates_empty_index_and_odd_queries() {
    let index = SymbolIndex::new();
    assert!(index.fuzzy_search("anything", None, 10, 0.0).is_empty());

    index.add_symbols([file_symbol("main.py", "/main.py")]);
    for query in ["", "@#$%", "\\", "main\u{1F600}", "(("] {
        let _ = index.fuzzy_search(query, Some(SymbolKind::File), 10, 60.0);
    }
    assert!(index.fuzzy_search("main", Some(SymbolKind::Class), 10, 0.0).is_empty());
}

#[test]
fn stats_counts_by_kind() {
    let index = SymbolIndex::new();
    index.add_symbols([file_symbol("main.py", "/tmp/main.py")]);
    let stats = index.stats();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.count(SymbolKind::File), 1);
    assert_eq!(stats.to_string(), "total=1 file=1");
}

#[test]
fn concurrent_updates_never_expose_partial_state() {
    let index = Arc::new(SymbolIndex::new());
    let path = PathBuf::from("/tmp/busy.py");
    let batch = |tag: &str| -> Vec<Symbol> {
        (0..50).map(|i| Symbol::new(format!("{tag}{i}"), SymbolKind::Variable, "/tmp/busy.py", i + 1)).collect()
    };
    index.add_symbols(batch("a"));

    let writer = {
        let index = Arc::clone(&index);
        let path = path.clone();
        std::thread::spawn(move || {
            for round in 0..200 {
                let tag = if round % 2 == 0 { "b" } else { "a" };
                index.update_file(&path, batch(tag));
            }
        })
    };

    for _ in 0..200 {
        let snapshot = index.symbols_in_file(&path);
        assert_eq!(snapshot.len(), 50, "reader saw a half-applied replace");
        assert_eq!(index.stats().total, 50);
    }
    writer.join().expect("writer thread");
}
