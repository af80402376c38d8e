//! Property-based tests for line merging.
//!
//! These tests use proptest to generate random ignore-file contents and
//! verify that merging only ever adds lines.

#[cfg(test)]
mod proptest_tests {
    use crate::reconcile::merge_lines;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn trimmed_lines(content: &str) -> Vec<String> {
        content
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }

    // Small alphabet so source and destination overlap often.
    fn ignore_file() -> impl Strategy<Value = String> {
        prop::collection::vec("[ ]{0,2}[abc*/.]{0,4}[ ]{0,2}", 0..8).prop_map(|lines| lines.join("\n"))
    }

    proptest! {
        /// Property: existing destination lines survive in their original order
        #[test]
        fn merge_keeps_destination_lines_in_order(source in ignore_file(), dest in ignore_file()) {
            if let Some(merged) = merge_lines(&source, &dest) {
                let before = trimmed_lines(&dest);
                let after = trimmed_lines(&merged);
                prop_assert!(after.len() >= before.len());
                prop_assert_eq!(&after[..before.len()], &before[..]);
            }
        }

        /// Property: every source line is present after merging
        #[test]
        fn merge_covers_every_source_line(source in ignore_file(), dest in ignore_file()) {
            let result = merge_lines(&source, &dest).unwrap_or_else(|| dest.clone());
            let present: HashSet<String> = trimmed_lines(&result).into_iter().collect();
            for line in trimmed_lines(&source) {
                prop_assert!(present.contains(&line), "missing line '{}'", line);
            }
        }

        /// Property: merging is idempotent
        #[test]
        fn merge_twice_changes_nothing(source in ignore_file(), dest in ignore_file()) {
            let once = merge_lines(&source, &dest).unwrap_or_else(|| dest.clone());
            prop_assert_eq!(merge_lines(&source, &once), None);
        }

        /// Property: a merged file always ends with a newline
        #[test]
        fn merge_ends_with_newline(source in ignore_file(), dest in ignore_file()) {
            if let Some(merged) = merge_lines(&source, &dest) {
                prop_assert!(merged.ends_with('\n'));
            }
        }
    }
}
