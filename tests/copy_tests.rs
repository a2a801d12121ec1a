mod common;

use assert_fs::prelude::*;
use std::fs;

use common::Fixture;
use unified_fs::prelude::*;
use unified_fs::{CopyFailure, FileManagerId};

fn source_tree(fx: &Fixture) {
    fx.write_flat("src/1.txt", "one");
    fx.write_flat("src/a/2.txt", "two");
    fx.write_flat("src/a/b/3.txt", "three");
    fx.mkdir_flat("dst");
}

fn copy(fx: &Fixture, src: &AbstractFile, dst: &AbstractFile, recursive: bool) -> CopyOutcome {
    fx.facade
        .copy_directory_with_content(src, dst, recursive, None)
        .expect("routed")
}

#[test]
fn recursive_flat_copy_recreates_everything() {
    let fx = Fixture::new();
    source_tree(&fx);

    let outcome = copy(&fx, &fx.flat("src"), &fx.flat("dst"), true);
    assert_eq!(outcome, CopyOutcome::Copied { entries: 5 });

    let dst = fx.temp.child("flat").child("dst");
    dst.child("1.txt").assert("one");
    dst.child("a/2.txt").assert("two");
    dst.child("a/b/3.txt").assert("three");
    fx.temp.child("flat").child("src/a/b/3.txt").assert("three");
}

#[test]
fn shallow_copy_takes_direct_children_only() {
    let fx = Fixture::new();
    source_tree(&fx);

    let outcome = copy(&fx, &fx.flat("src"), &fx.flat("dst"), false);
    assert_eq!(outcome, CopyOutcome::Copied { entries: 2 });
    assert!(fx.flat_path().join("dst/a").is_dir());
    assert!(!fx.flat_path().join("dst/a/2.txt").exists());
}

#[test]
fn tree_to_flat_copy_crosses_backends() {
    let fx = Fixture::new();
    fx.write_tree("photos/2024/one.jpg", "jpeg-1");
    fx.write_tree("photos/cover.png", "png");
    fx.mkdir_flat("backup");

    let outcome = copy(&fx, &fx.tree("photos"), &fx.flat("backup"), true);
    assert!(outcome.is_success());
    assert_eq!(outcome, CopyOutcome::Copied { entries: 3 });
    assert_eq!(fs::read_to_string(fx.flat_path().join("backup/2024/one.jpg")).unwrap(), "jpeg-1");
    assert_eq!(fs::read_to_string(fx.flat_path().join("backup/cover.png")).unwrap(), "png");
}

#[test]
fn flat_to_tree_copy_crosses_backends() {
    let fx = Fixture::new();
    source_tree(&fx);
    fx.mkdir_tree("incoming");

    let outcome = copy(&fx, &fx.flat("src"), &fx.tree("incoming"), true);
    assert_eq!(outcome, CopyOutcome::Copied { entries: 5 });
    assert_eq!(fs::read_to_string(fx.volume_path().join("incoming/a/b/3.txt")).unwrap(), "three");
}

#[test]
fn preconditions_fail_in_order() {
    let fx = Fixture::new();
    source_tree(&fx);
    fx.mkdir_flat("empty");
    fx.write_flat("file.txt", "x");

    assert_eq!(
        copy(&fx, &fx.flat("nope"), &fx.flat("also-nope"), true),
        CopyOutcome::Failed(CopyFailure::SourceMissing)
    );
    // An empty source succeeds before the destination is looked at.
    assert_eq!(
        copy(&fx, &fx.flat("empty"), &fx.flat("also-nope"), true),
        CopyOutcome::NothingToCopy
    );
    assert_eq!(
        copy(&fx, &fx.flat("src"), &fx.flat("also-nope"), true),
        CopyOutcome::Failed(CopyFailure::DestinationMissing)
    );
    assert_eq!(
        copy(&fx, &fx.flat("src"), &fx.flat("file.txt"), true),
        CopyOutcome::Failed(CopyFailure::DestinationNotDirectory)
    );
    assert!(!CopyOutcome::Failed(CopyFailure::SourceMissing).is_success());
    assert!(CopyOutcome::NothingToCopy.is_success());
}

#[test]
fn progress_sees_every_index_against_the_total() {
    let fx = Fixture::new();
    source_tree(&fx);
    let mut seen = Vec::new();
    let progress: &mut dyn FnMut(usize, usize) -> Progress = &mut |index, total| {
        seen.push((index, total));
        Progress::Continue
    };

    let outcome = fx
        .facade
        .copy_directory_with_content(&fx.flat("src"), &fx.flat("dst"), true, Some(progress))
        .unwrap();
    assert_eq!(outcome, CopyOutcome::Copied { entries: 5 });
    assert_eq!(seen, vec![(0, 5), (1, 5), (2, 5), (3, 5), (4, 5)]);
}

#[test]
fn cancelling_stops_after_the_current_entry() {
    let fx = Fixture::new();
    source_tree(&fx);
    let progress: &mut dyn FnMut(usize, usize) -> Progress =
        &mut |index, _| if index == 1 { Progress::Cancel } else { Progress::Continue };

    let outcome = fx
        .facade
        .copy_directory_with_content(&fx.flat("src"), &fx.flat("dst"), true, Some(progress))
        .unwrap();
    assert_eq!(outcome, CopyOutcome::Cancelled { entries: 2 });
    assert!(outcome.is_success());
    assert!(fx.flat_path().join("dst/1.txt").is_file());
    assert!(fx.flat_path().join("dst/a").is_dir());
    assert!(!fx.flat_path().join("dst/a/2.txt").exists());
}

#[test]
fn base_directory_roots_are_not_copied_as_entries() {
    let mut fx = Fixture::new();
    fx.write_flat("src/1.txt", "one");
    fx.write_flat("src/a/2.txt", "two");
    fx.mkdir_flat("dst");
    let granted = fx.flat_path().join("src/a");
    fx.register_flat_base("granted", &granted);

    let outcome = copy(&fx, &fx.flat("src"), &fx.flat("dst"), true);
    assert_eq!(outcome, CopyOutcome::Copied { entries: 2 });
    assert_eq!(fs::read_to_string(fx.flat_path().join("dst/a/2.txt")).unwrap(), "two");
}

#[test]
fn progress_reaches_a_trailing_skipped_entry() {
    let mut fx = Fixture::new();
    fx.write_flat("src/1.txt", "one");
    fx.mkdir_flat("src/z");
    fx.mkdir_flat("dst");
    let granted = fx.flat_path().join("src/z");
    fx.register_flat_base("granted", &granted);
    let mut seen = Vec::new();
    let progress: &mut dyn FnMut(usize, usize) -> Progress = &mut |index, total| {
        seen.push((index, total));
        Progress::Continue
    };

    let outcome = fx
        .facade
        .copy_directory_with_content(&fx.flat("src"), &fx.flat("dst"), true, Some(progress))
        .unwrap();
    assert_eq!(outcome, CopyOutcome::Copied { entries: 1 });
    assert_eq!(seen, vec![(0, 2), (1, 2)]);
    assert!(!fx.flat_path().join("dst/z").exists());
}

#[test]
fn copying_a_directory_onto_itself_is_refused() {
    let fx = Fixture::new();
    source_tree(&fx);

    assert_eq!(
        copy(&fx, &fx.flat("src"), &fx.flat("src"), true),
        CopyOutcome::Failed(CopyFailure::SameLocation)
    );
    fx.temp.child("flat").child("src/1.txt").assert("one");
    fx.temp.child("flat").child("src/a/b/3.txt").assert("three");
}

#[test]
fn tree_and_flat_handles_on_one_host_dir_are_the_same_location() {
    let fx = Fixture::new();
    fx.write_tree("data/1.txt", "one");
    let as_flat = fx.facade.file_from_path(fx.volume_path().join("data"));

    assert_eq!(
        copy(&fx, &fx.tree("data"), &as_flat, true),
        CopyOutcome::Failed(CopyFailure::SameLocation)
    );
    assert_eq!(fs::read_to_string(fx.volume_path().join("data/1.txt")).unwrap(), "one");

    let file_as_flat = fx.facade.file_from_path(fx.volume_path().join("data/1.txt"));
    assert!(!fx.facade.copy_file_contents(&fx.tree("data/1.txt"), &file_as_flat).unwrap());
    assert_eq!(fs::read_to_string(fx.volume_path().join("data/1.txt")).unwrap(), "one");
}

#[test]
fn file_content_copy_onto_itself_keeps_the_content() {
    let fx = Fixture::new();
    fx.write_flat("x.txt", "precious");

    assert!(!fx.facade.copy_file_contents(&fx.flat("x.txt"), &fx.flat("x.txt")).unwrap());
    assert_eq!(fs::read_to_string(fx.flat_path().join("x.txt")).unwrap(), "precious");
}

#[test]
fn file_content_copy_reports_failure_as_false() {
    let fx = Fixture::new();
    fx.write_flat("in.txt", "payload");

    assert!(fx.facade.copy_file_contents(&fx.flat("in.txt"), &fx.flat("out.txt")).unwrap());
    assert_eq!(fs::read_to_string(fx.flat_path().join("out.txt")).unwrap(), "payload");
    assert!(!fx.facade.copy_file_contents(&fx.flat("missing.txt"), &fx.flat("out2.txt")).unwrap());
}

#[test]
fn missing_backend_is_fatal_for_copies() {
    let mut fx = Fixture::new();
    source_tree(&fx);
    fx.facade.remove_manager(FileManagerId::FLAT);

    let err = fx
        .facade
        .copy_directory_with_content(&fx.flat("src"), &fx.flat("dst"), true, None)
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnregisteredBackend(FileManagerId::FLAT)));
}
