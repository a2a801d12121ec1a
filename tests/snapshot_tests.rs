mod common;

use std::panic::{AssertUnwindSafe, catch_unwind};

use common::{Fixture, collect};
use unified_fs::prelude::*;
use unified_fs::FsError;
use unified_fs::snapshot::read_cache;

fn populate(fx: &Fixture) {
    fx.write_tree("data/x.txt", "x");
    fx.write_tree("data/d1/y.txt", "y");
    fx.mkdir_tree("data/d1/d2");
}

fn cached(fx: &Fixture) -> usize {
    read_cache(fx.facade.snapshot_cache()).len()
}

#[test]
fn snapshot_serves_traversal_without_listing_again() {
    let fx = Fixture::new();
    populate(&fx);
    let data = fx.tree("data");

    let before = fx.provider.listing_count();
    assert_eq!(fx.facade.create_snapshot(&data, true).unwrap(), 3);
    assert_eq!(fx.provider.listing_count(), before + 3);

    let walked = collect(&fx.facade, &data, true, TraverseMode::Both);
    assert_eq!(walked.len(), 4);
    assert_eq!(fx.provider.listing_count(), before + 3);

    assert_eq!(fx.facade.release_snapshot(&data).unwrap(), 3);
    assert_eq!(cached(&fx), 0);
    fx.facade.list_files(&data).unwrap();
    assert_eq!(fx.provider.listing_count(), before + 4);
}

#[test]
fn shallow_snapshot_caches_only_the_root() {
    let fx = Fixture::new();
    populate(&fx);
    let data = fx.tree("data");

    assert_eq!(fx.facade.create_snapshot(&data, false).unwrap(), 1);
    assert_eq!(cached(&fx), 1);
}

#[test]
fn flat_directories_need_no_snapshot() {
    let fx = Fixture::new();
    fx.write_flat("data/a.txt", "a");

    assert_eq!(fx.facade.create_snapshot(&fx.flat("data"), true).unwrap(), 0);
    assert_eq!(fx.facade.release_snapshot(&fx.flat("data")).unwrap(), 0);
    assert_eq!(cached(&fx), 0);
}

#[test]
fn base_directory_listing_is_tagged() {
    let mut fx = Fixture::new();
    populate(&fx);
    fx.register_tree_base("data", "data");
    let data = fx.tree("data");

    fx.facade.create_snapshot(&data, true).unwrap();
    let cache = read_cache(fx.facade.snapshot_cache());
    let root = cache.listing(data.as_tree().unwrap().uri()).expect("root cached");
    assert!(root.parent_is_base);
    assert_eq!(root.children.len(), 2);
    let sub = cache.listing(&fx.tree_uri("data").child("d1")).expect("subdir cached");
    assert!(!sub.parent_is_base);
}

#[test]
fn with_snapshot_releases_after_the_body() {
    let fx = Fixture::new();
    populate(&fx);
    let data = fx.tree("data");

    let count = fx
        .facade
        .with_snapshot(&data, true, |facade| {
            assert_eq!(read_cache(facade.snapshot_cache()).len(), 3);
            Ok(facade.list_snapshot_files(&data, true)?.len())
        })
        .unwrap();
    assert_eq!(count, 4);
    assert_eq!(cached(&fx), 0);
}

#[test]
fn with_snapshot_releases_when_the_body_fails() {
    let fx = Fixture::new();
    populate(&fx);
    let data = fx.tree("data");

    let result: Result<(), VfsError> = fx
        .facade
        .with_snapshot(&data, true, |_| Err(FsError::not_found("wanted").into()));
    assert!(matches!(result, Err(VfsError::Fs(FsError::NotFound(_)))));
    assert_eq!(cached(&fx), 0);
}

#[test]
fn with_snapshot_releases_when_the_body_panics() {
    let fx = Fixture::new();
    populate(&fx);
    let data = fx.tree("data");

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        fx.facade
            .with_snapshot(&data, true, |_| -> Result<(), VfsError> { panic!("body blew up") })
    }));
    assert!(outcome.is_err());
    assert_eq!(cached(&fx), 0);
}

#[test]
fn deleting_inside_a_snapshot_keeps_it_consistent() {
    let fx = Fixture::new();
    populate(&fx);
    let data = fx.tree("data");

    fx.facade
        .with_snapshot(&data, true, |facade| {
            let d1 = facade.find_file(&data, "d1")?.expect("listed");
            assert!(facade.delete(&d1)?);
            let left = facade.list_files(&data)?;
            assert_eq!(common::names(facade, &left), vec!["x.txt"]);
            Ok(())
        })
        .unwrap();
    assert!(!fx.volume_path().join("data/d1").exists());
}

#[test]
fn content_copied_into_a_new_file_shows_in_its_cached_length() {
    let fx = Fixture::new();
    fx.mkdir_tree("inbox");
    fx.write_flat("in.txt", "7 bytes");
    let inbox = fx.tree("inbox");

    fx.facade
        .with_snapshot(&inbox, false, |facade| {
            let made = facade.create_file(&inbox, "x.txt")?.expect("created");
            assert_eq!(facade.length(&made)?, 0);
            assert!(facade.copy_file_contents(&fx.flat("in.txt"), &made)?);
            assert_eq!(facade.length(&made)?, 7);
            assert!(facade.last_modified(&made)?.is_some());
            Ok(())
        })
        .unwrap();
}
