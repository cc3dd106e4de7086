//! Property-based tests for source descriptor parsing.
//!
//! These tests use proptest to generate random descriptors and verify that
//! the parsing invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::source::Source;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,20}".prop_filter("must not end in .git", |s| {
            !s.ends_with(".git") && s != "."
        })
    }

    proptest! {
        /// Property: organization/repository are exactly the path segments
        #[test]
        fn parse_yields_exact_segments(
            host in "[a-z][a-z0-9.@-]{0,20}",
            org in segment(),
            repo in segment(),
            suffix in prop::bool::ANY,
            revision in "[0-9a-f]{7,40}",
        ) {
            let git = if suffix { ".git" } else { "" };
            let line = format!("{}:{}/{}{} {}", host, org, repo, git, revision);
            let source = Source::parse(&line).unwrap();

            prop_assert_eq!(source.organization(), org.as_str());
            prop_assert_eq!(source.repository(), repo.as_str());
            prop_assert_eq!(source.revision(), revision.as_str());

            // Re-deriving the path from the segments round-trips (mod .git)
            let path = source.origin().split(':').nth(1).unwrap();
            let path = path.strip_suffix(".git").unwrap_or(path);
            prop_assert_eq!(
                path.to_string(),
                format!("{}/{}", source.organization(), source.repository())
            );
        }

        /// Property: lines without exactly one space never parse
        #[test]
        fn parse_rejects_wrong_token_count(
            tokens in prop::collection::vec("[a-z:/]{1,10}", 3..6),
        ) {
            prop_assert!(Source::parse(&tokens.join(" ")).is_err());
        }

        /// Property: origins with more than one ':' never parse
        #[test]
        fn parse_rejects_extra_colons(
            a in "[a-z]{1,8}",
            b in "[a-z]{1,8}",
            org in segment(),
            repo in segment(),
        ) {
            let line = format!("{}:{}:{}/{} abc", a, b, org, repo);
            prop_assert!(Source::parse(&line).is_err());
        }

        /// Property: working directory always ends in organization/repository
        #[test]
        fn working_directory_ends_with_segments(
            org in segment(),
            repo in segment(),
        ) {
            let source = Source::parse(&format!("git@h:{}/{} abc", org, repo)).unwrap();
            let dir = source.working_directory(std::path::Path::new("/root"), false);
            prop_assert!(dir.ends_with(std::path::Path::new(&org).join(&repo)));
        }
    }
}
