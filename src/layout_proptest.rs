//! Property-based tests for backup path mangling.

#[cfg(test)]
mod proptest_tests {
    use crate::layout::mangle_relative_path;
    use proptest::prelude::*;

    proptest! {
        /// Property: the mangled name is a single path component
        #[test]
        fn mangled_name_has_no_separators(input in "[a-z/\\\\_.]{0,40}") {
            let result = mangle_relative_path(&input);
            prop_assert!(!result.contains('/'));
            prop_assert!(!result.contains('\\'));
        }

        /// Property: mangling is deterministic
        #[test]
        fn mangling_is_deterministic(input in ".*") {
            prop_assert_eq!(mangle_relative_path(&input), mangle_relative_path(&input));
        }

        /// Property: names without separators are unchanged
        #[test]
        fn plain_names_are_unchanged(input in "[a-z0-9_]{1,20}") {
            prop_assert_eq!(mangle_relative_path(&input), input);
        }

        /// Property: segments keep their order and text
        #[test]
        fn segments_are_joined_with_underscores(
            segments in proptest::collection::vec("[a-z0-9]{1,8}", 1..6)
        ) {
            let relative = segments.join("/");
            prop_assert_eq!(mangle_relative_path(&relative), segments.join("_"));
        }
    }
}
