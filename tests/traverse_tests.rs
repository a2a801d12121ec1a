mod common;

use common::{Fixture, collect, names};
use unified_fs::prelude::*;
use unified_fs::FileManagerId;

fn populate(write: impl Fn(&str, &str)) {
    write("a.txt", "a");
    write("d1/b.txt", "b");
    write("d1/d2/c.txt", "c");
    write("e.txt", "e");
}

#[test]
fn direct_children_in_listing_order() {
    let fx = Fixture::new();
    populate(|p, c| fx.write_flat(&format!("root/{p}"), c));
    let root = fx.flat("root");

    let all = collect(&fx.facade, &root, false, TraverseMode::Both);
    assert_eq!(names(&fx.facade, &all), vec!["a.txt", "d1", "e.txt"]);
}

#[test]
fn recursive_walk_is_breadth_first() {
    let fx = Fixture::new();
    populate(|p, c| fx.write_flat(&format!("root/{p}"), c));
    let root = fx.flat("root");

    let files = collect(&fx.facade, &root, true, TraverseMode::OnlyFiles);
    assert_eq!(names(&fx.facade, &files), vec!["a.txt", "e.txt", "b.txt", "c.txt"]);

    let dirs = collect(&fx.facade, &root, true, TraverseMode::OnlyDirs);
    assert_eq!(names(&fx.facade, &dirs), vec!["d1", "d2"]);

    let both = collect(&fx.facade, &root, true, TraverseMode::Both);
    assert_eq!(both.len(), 6);
    assert!(!both.contains(&root));
}

#[test]
fn tree_backend_walks_the_same_way() {
    let fx = Fixture::new();
    populate(|p, c| fx.write_tree(&format!("root/{p}"), c));
    let root = fx.tree("root");

    let files = collect(&fx.facade, &root, true, TraverseMode::OnlyFiles);
    assert_eq!(names(&fx.facade, &files), vec!["a.txt", "e.txt", "b.txt", "c.txt"]);
    assert!(files.iter().all(|f| f.manager_id() == FileManagerId::TREE));
}

#[test]
fn missing_file_or_empty_roots_deliver_nothing() {
    let fx = Fixture::new();
    fx.write_flat("plain.txt", "x");
    fx.mkdir_flat("empty");

    for root in [fx.flat("missing"), fx.flat("plain.txt"), fx.flat("empty")] {
        assert!(collect(&fx.facade, &root, true, TraverseMode::Both).is_empty(), "{root}");
    }
}

#[test]
fn unregistered_backend_is_fatal() {
    let mut fx = Fixture::new();
    fx.mkdir_tree("root");
    let root = fx.tree("root");
    fx.facade.remove_manager(FileManagerId::TREE);

    let err = fx
        .facade
        .traverse_directory(&root, false, TraverseMode::Both, |_| {})
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnregisteredBackend(FileManagerId::TREE)));
}

#[cfg(unix)]
#[test]
fn entry_that_is_neither_file_nor_directory_breaks_the_contract() {
    let fx = Fixture::new();
    fx.mkdir_flat("root");
    std::os::unix::fs::symlink(fx.flat_path().join("nowhere"), fx.flat_path().join("root/dangling")).unwrap();
    let root = fx.flat("root");

    let err = fx
        .facade
        .traverse_directory(&root, false, TraverseMode::Both, |_| {})
        .unwrap_err();
    assert!(matches!(err, ConfigError::ContractViolation(_)));
}
