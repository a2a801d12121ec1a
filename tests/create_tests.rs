mod common;

use std::fs;

use common::Fixture;
use unified_fs::prelude::*;
use unified_fs::snapshot::read_cache;

#[test]
fn create_unsafe_builds_nested_flat_path() {
    let fx = Fixture::new();
    let base = fx.flat("");

    let made = fx.facade.create_unsafe(&base, "a/b/report.pdf").unwrap().expect("created");
    assert!(made.is_file_root());
    assert!(fx.flat_path().join("a/b/report.pdf").is_file());
    assert!(fx.facade.is_file(&made).unwrap());

    let dir = fx.facade.create_unsafe(&base, "a/b/notes").unwrap().expect("created");
    assert!(fx.facade.is_directory(&dir).unwrap());
}

#[test]
fn create_is_idempotent_and_keeps_existing_content() {
    let fx = Fixture::new();
    fx.write_flat("docs/readme.txt", "keep me");
    let base = fx.flat("");

    let first = fx.facade.create_file(&base, "docs/readme.txt").unwrap().expect("existing file");
    let second = fx.facade.create_file(&base, "docs/readme.txt").unwrap().expect("existing file");
    assert_eq!(first.full_path(), second.full_path());
    assert_eq!(fs::read_to_string(fx.flat_path().join("docs/readme.txt")).unwrap(), "keep me");
}

#[test]
fn create_on_tree_backend_reaches_the_host_volume() {
    let fx = Fixture::new();
    let root = fx.tree("");

    let made = fx.facade.create_file(&root, "x/y/z.dat").unwrap().expect("created");
    assert!(fx.volume_path().join("x/y/z.dat").is_file());
    assert_eq!(fx.facade.name(&made).unwrap().as_deref(), Some("z.dat"));
    assert_eq!(fx.facade.segment_names(&made).unwrap(), vec!["x", "y", "z.dat"]);
}

#[test]
fn type_collision_yields_none() {
    let fx = Fixture::new();
    fx.write_flat("a.txt", "file");
    fx.mkdir_flat("folder.txt");
    let base = fx.flat("");

    assert!(fx.facade.create_dir(&base, "a.txt").unwrap().is_none());
    assert!(fx.facade.create_file(&base, "folder.txt").unwrap().is_none());
    assert!(fx.flat_path().join("a.txt").is_file());
}

#[test]
fn file_segment_before_the_end_is_refused() {
    let fx = Fixture::new();
    let base = fx.flat("");
    let segments = [Segment::File("a.txt".into()), Segment::Directory("b".into())];

    assert!(fx.facade.create(&base, &segments).unwrap().is_none());
    assert!(!fx.flat_path().join("a.txt").exists());
}

#[test]
fn bad_symbols_follow_the_policy() {
    let fx = Fixture::new();

    let replaced = fx.facade.create_file(&fx.flat(""), "what?.txt").unwrap().expect("renamed");
    assert_eq!(fx.facade.name(&replaced).unwrap().as_deref(), Some("what_.txt"));
    assert!(fx.flat_path().join("what_.txt").is_file());

    let strict = FileFacade::new(fx.provider.clone()).with_policy(BadSymbolPolicy::Reject);
    let base = strict.file_from_path(fx.flat_path());
    assert!(strict.create_file(&base, "no|pe.txt").unwrap().is_none());
    assert!(!fx.flat_path().join("no|pe.txt").exists());
}

#[test]
fn empty_sequence_returns_an_existing_base() {
    let fx = Fixture::new();
    fx.mkdir_flat("kept");
    let base = fx.flat("kept");

    let got = fx.facade.create(&base, &[]).unwrap().expect("existing base");
    assert_eq!(got, base);
}

#[test]
fn empty_sequence_recreates_a_missing_tree_base() {
    let fx = Fixture::new();
    let missing = AbstractFile::tree_dir(fx.tree_uri("gone/deep"), fx.facade.policy());
    assert!(!fx.facade.exists(&missing).unwrap());

    let made = fx.facade.create(&missing, &[]).unwrap().expect("recreated");
    assert!(fx.volume_path().join("gone/deep").is_dir());
    assert!(fx.facade.is_directory(&made).unwrap());
}

#[test]
fn empty_sequence_recreates_a_missing_flat_base() {
    let fx = Fixture::new();
    let missing = fx.flat("m/n");

    let made = fx.facade.create(&missing, &[]).unwrap().expect("recreated");
    assert!(fx.flat_path().join("m/n").is_dir());
    assert_eq!(fx.facade.segment_names(&made).unwrap(), fx.facade.segment_names(&missing).unwrap());
}

#[test]
fn tree_create_updates_a_cached_listing() {
    let fx = Fixture::new();
    fx.mkdir_tree("inbox");
    let inbox = fx.tree("inbox");

    fx.facade
        .with_snapshot(&inbox, false, |facade| {
            let before = fx.provider.listing_count();
            facade.create_file(&inbox, "new.txt")?;
            let listed = facade.list_files(&inbox)?;
            assert_eq!(common::names(facade, &listed), vec!["new.txt"]);
            assert_eq!(fx.provider.listing_count(), before, "served from the snapshot");
            assert!(read_cache(facade.snapshot_cache()).listing(inbox.as_tree().unwrap().uri()).is_some());
            Ok(())
        })
        .unwrap();
}

#[test]
fn repeated_create_yields_the_same_entry_on_both_backends() {
    let mut fx = Fixture::new();
    fx.register_tree_base("volume", "");
    let flat_root = fx.flat_path();
    fx.register_flat_base("flat", &flat_root);

    for base in [fx.tree(""), fx.flat("")] {
        let first = fx.facade.create_file(&base, "docs/a.txt").unwrap().expect("created");
        let second = fx.facade.create_file(&base, "docs/a.txt").unwrap().expect("existing");
        assert!(fx.facade.are_the_same(&first, &second).unwrap(), "{first} vs {second}");
    }
}
