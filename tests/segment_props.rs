use proptest::prelude::*;

use unified_fs::segment::{
    has_recognizable_extension, is_well_formed, join_names, segments_from_relative, split_path,
    suffix_equivalent,
};

proptest! {
    #[test]
    fn joined_names_split_back(names in prop::collection::vec("[A-Za-z0-9_]{1,8}", 0..6)) {
        let joined = join_names(&names);
        prop_assert_eq!(split_path(&joined), names);
    }

    #[test]
    fn relative_paths_classify_well_formed(path in "[a-z]{1,5}(/[a-z]{1,5}){0,4}(\\.[a-z]{1,3})?") {
        let segments = segments_from_relative(&path);
        prop_assert!(is_well_formed(&segments));
        let last = segments.last().expect("at least one component");
        prop_assert_eq!(last.is_file(), has_recognizable_extension(last.name()));
    }

    #[test]
    fn suffix_equivalence_is_symmetric(a in "[ab/]{0,10}", b in "[ab/]{0,10}") {
        prop_assert_eq!(suffix_equivalent(&a, &b), suffix_equivalent(&b, &a));
    }

    #[test]
    fn a_path_matches_any_of_its_tails(names in prop::collection::vec("[a-z]{1,4}", 1..6), cut in 0usize..6) {
        let full = join_names(&names);
        let tail = join_names(&names[cut.min(names.len() - 1)..]);
        prop_assert!(suffix_equivalent(&full, &tail));
    }
}

#[test]
fn equal_length_requires_equality() {
    assert!(suffix_equivalent("a/b", "a/b"));
    assert!(!suffix_equivalent("a/b", "a/c"));
    assert!(suffix_equivalent("", ""));
}
