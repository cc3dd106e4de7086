//! # Source Descriptors
//!
//! A [`Source`] is one acquisition request: an origin URL pinned to an opaque
//! revision identifier. Sources are parsed from lines of the form
//!
//! ```text
//! git@github.com:org/repo.git 0123456789abcdef0123456789abcdef01234567
//! ```
//!
//! The organization and repository names are derived from the origin and used
//! to lay out the destination tree (`<root>/<organization>/<repository>`).

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One acquisition request. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    origin: String,
    revision: String,
    organization: String,
    repository: String,
}

impl Source {
    /// Parses a `<origin> <revision>` descriptor line.
    ///
    /// The origin must contain exactly one `:` and its path part (after an
    /// optional `.git` suffix is stripped) exactly one `/`.
    pub fn parse(line: &str) -> Result<Self> {
        let invalid = |message: String| Error::InvalidInput {
            line: line.to_string(),
            message,
        };

        let tokens: Vec<&str> = line.split(' ').collect();
        let (origin, revision) = match tokens.as_slice() {
            [origin, revision] if !origin.is_empty() && !revision.is_empty() => {
                (*origin, *revision)
            }
            _ => {
                return Err(invalid(
                    "expected `<origin> <revision>` separated by a single space".to_string(),
                ))
            }
        };

        let (organization, repository) = split_origin(origin).map_err(invalid)?;

        Ok(Self {
            origin: origin.to_string(),
            revision: revision.to_string(),
            organization: organization.to_string(),
            repository: repository.to_string(),
        })
    }

    /// The remote URL.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The pinned revision, as given in the input.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Working directory of this source under `root`.
    ///
    /// With `revision_suffix` the revision is appended to the repository
    /// directory, so several revisions of one repository can coexist.
    pub fn working_directory(&self, root: &Path, revision_suffix: bool) -> PathBuf {
        let leaf = if revision_suffix {
            format!("{}-{}", self.repository, self.revision)
        } else {
            self.repository.clone()
        };
        root.join(&self.organization).join(leaf)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.origin, self.revision)
    }
}

/// Splits `host:org/repo[.git]` into `(org, repo)`.
fn split_origin(origin: &str) -> std::result::Result<(&str, &str), String> {
    let parts: Vec<&str> = origin.split(':').collect();
    let path = match parts.as_slice() {
        [_, path] => *path,
        _ => return Err(format!("invalid URL structure: {}", origin)),
    };

    let path = path.strip_suffix(".git").unwrap_or(path);
    match path.split('/').collect::<Vec<_>>().as_slice() {
        [organization, repository]
            if is_plain_segment(organization) && is_plain_segment(repository) =>
        {
            Ok((*organization, *repository))
        }
        _ => Err(format!(
            "invalid organization and repository name structure: {}",
            path
        )),
    }
}

/// A segment that names exactly one directory below its parent.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\')
}

/// Parses a whole input list.
///
/// Lines are trimmed, blank lines are skipped and duplicate lines are dropped
/// (first occurrence wins). The first malformed line aborts the parse.
pub fn parse_list(contents: &str) -> Result<Vec<Source>> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || !seen.insert(line) {
            continue;
        }
        let source = Source::parse(line).map_err(|e| match e {
            Error::InvalidInput { line, message } => Error::InvalidInput {
                line,
                message: format!("line {}: {}", index + 1, message),
            },
            other => other,
        })?;
        sources.push(source);
    }

    Ok(sources)
}

/// Reads and parses the input list at `path`.
pub fn read_list<P: AsRef<Path>>(path: P) -> Result<Vec<Source>> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse_list(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "ef33fff761a2fabb7f0daf0c1779d2dfac1056da";

    #[test]
    fn test_parse_scp_style_origin() {
        let line = format!("git@github.com:go-git/go-git.git {}", HASH);
        let source = Source::parse(&line).unwrap();
        assert_eq!(source.origin(), "git@github.com:go-git/go-git.git");
        assert_eq!(source.revision(), HASH);
        assert_eq!(source.organization(), "go-git");
        assert_eq!(source.repository(), "go-git");
    }

    #[test]
    fn test_parse_without_git_suffix() {
        let source = Source::parse("git@gitlab.com:acme/widgets abc").unwrap();
        assert_eq!(source.organization(), "acme");
        assert_eq!(source.repository(), "widgets");
    }

    #[test]
    fn test_parse_rejects_single_token() {
        assert!(matches!(
            Source::parse("bad-line"),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_three_tokens() {
        assert!(matches!(
            Source::parse("a b c"),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_double_space() {
        assert!(matches!(
            Source::parse(&format!("git@h:o/r.git  {}", HASH)),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_https_url() {
        // https://host/org/repo has two ':'-separated parts but a multi-segment path
        let result = Source::parse(&format!("https://github.com/org/repo.git {}", HASH));
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_parse_rejects_protocol_without_path_split() {
        assert!(matches!(
            Source::parse("proto://no-colon-split"),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            Source::parse(&format!("proto://no-colon-split {}", HASH)),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_too_many_colons() {
        assert!(matches!(
            Source::parse(&format!("ssh://git@host:22:org/repo {}", HASH)),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(Source::parse("git@host:/repo.git abc").is_err());
        assert!(Source::parse("git@host:org/.git abc").is_err());
    }

    #[test]
    fn test_parse_rejects_relative_segments() {
        for origin in [
            "git@h:../escaped",
            "git@h:../..",
            "git@h:org/..",
            "git@h:./repo.git",
            "git@h:org/.",
            "git@h:org\\..\\x/repo",
        ] {
            let result = Source::parse(&format!("{} {}", origin, HASH));
            assert!(
                matches!(result, Err(Error::InvalidInput { .. })),
                "{} was accepted",
                origin
            );
        }
    }

    #[test]
    fn test_parse_accepts_dotted_names() {
        let source = Source::parse(&format!("git@h:my.org/.dotfiles.git {}", HASH)).unwrap();
        assert_eq!(source.organization(), "my.org");
        assert_eq!(source.repository(), ".dotfiles");
    }

    #[test]
    fn test_working_directory_layout() {
        let source = Source::parse(&format!("git@github.com:org/repo.git {}", HASH)).unwrap();
        let root = Path::new("/data");
        assert_eq!(
            source.working_directory(root, false),
            PathBuf::from("/data/org/repo")
        );
        assert_eq!(
            source.working_directory(root, true),
            PathBuf::from(format!("/data/org/repo-{}", HASH))
        );
    }

    #[test]
    fn test_parse_list_skips_blank_and_duplicate_lines() {
        let contents = format!(
            "git@h:a/one.git {h}\r\n\n   \ngit@h:b/two.git {h}\ngit@h:a/one.git {h}\n",
            h = HASH
        );
        let sources = parse_list(&contents).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].repository(), "one");
        assert_eq!(sources[1].repository(), "two");
    }

    #[test]
    fn test_parse_list_reports_line_number() {
        let contents = format!("git@h:a/one.git {}\nnot a valid line\n", HASH);
        let err = parse_list(&contents).unwrap_err();
        match err {
            Error::InvalidInput { message, .. } => assert!(message.starts_with("line 2:")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_list_missing_file() {
        let result = read_list("/nonexistent/pinfetch/list.txt");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_display_round_trips_to_descriptor() {
        let line = format!("git@github.com:org/repo.git {}", HASH);
        let source = Source::parse(&line).unwrap();
        assert_eq!(source.to_string(), line);
        assert_eq!(Source::parse(&source.to_string()).unwrap(), source);
    }
}
