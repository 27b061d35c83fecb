//! Secret path type.
//!
//! A logical path such as `web/github` or `web/github#user`: `/`-separated,
//! case-sensitive segments with an optional sub-key after the last one.

use std::fmt;
use std::str::FromStr;

use crate::core::constants::SUBKEY_SEPARATOR;
use crate::error::MountError;

/// A validated logical secret path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SecretPath {
    segments: Vec<String>,
    key: Option<String>,
}

impl SecretPath {
    /// Parse a path, accepting an optional `#key` suffix.
    ///
    /// Leading and trailing slashes are ignored. Empty, `.` and `..`
    /// segments are rejected, as are NUL bytes and backslashes.
    pub fn parse(input: &str) -> Result<Self, MountError> {
        let (path, key) = match input.split_once(SUBKEY_SEPARATOR) {
            Some((_, key)) if key.is_empty() => {
                return Err(invalid(input, "empty sub-key after '#'"));
            }
            Some((path, key)) => (path, Some(key.to_string())),
            None => (input, None),
        };

        let trimmed = path.trim_matches('/');
        let segments = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split('/')
                .map(|s| validate_segment(input, s).map(|_| s.to_string()))
                .collect::<Result<Vec<_>, _>>()?
        };

        if key.is_some() && segments.is_empty() {
            return Err(invalid(input, "sub-key without a secret"));
        }

        Ok(Self { segments, key })
    }

    /// Build a path from segments without a sub-key.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, MountError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let joined = segments.join("/");
        for s in &segments {
            validate_segment(&joined, s)?;
        }
        Ok(Self {
            segments,
            key: None,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sub-key addressed by this path, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Same path with a different sub-key.
    pub fn with_key(mut self, key: Option<String>) -> Self {
        self.key = key;
        self
    }

    /// Path without its sub-key.
    pub fn without_key(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            key: None,
        }
    }

    /// Whether `prefix` is a segment-wise prefix of this path.
    pub fn starts_with(&self, prefix: &SecretPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Remaining path after removing `prefix` segments. Keeps the sub-key.
    pub fn strip_prefix(&self, prefix: &SecretPath) -> Option<Self> {
        self.segments
            .strip_prefix(prefix.segments.as_slice())
            .map(|rest| Self {
                segments: rest.to_vec(),
                key: self.key.clone(),
            })
    }

    /// `prefix` followed by this path's segments.
    pub fn prepend(&self, prefix: &SecretPath) -> Self {
        let mut segments = prefix.segments.clone();
        segments.extend(self.segments.iter().cloned());
        Self {
            segments,
            key: self.key.clone(),
        }
    }

    /// The `/`-joined segments, without the sub-key.
    pub fn as_string(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))?;
        if let Some(key) = &self.key {
            write!(f, "{}{}", SUBKEY_SEPARATOR, key)?;
        }
        Ok(())
    }
}

impl FromStr for SecretPath {
    type Err = MountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn validate_segment(input: &str, segment: &str) -> Result<(), MountError> {
    if segment.is_empty() {
        return Err(invalid(input, "empty path segment"));
    }
    if segment == "." || segment == ".." {
        return Err(invalid(input, "relative segments are not allowed"));
    }
    if segment.starts_with('.') {
        return Err(invalid(input, "segments cannot start with '.'"));
    }
    if segment.contains('\0') || segment.contains('\\') {
        return Err(invalid(input, "illegal character in segment"));
    }
    Ok(())
}

fn invalid(path: &str, reason: &str) -> MountError {
    MountError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let path = SecretPath::parse("some/secret").unwrap();
        assert_eq!(path.segments(), ["some", "secret"]);
        assert_eq!(path.key(), None);
        assert_eq!(path.to_string(), "some/secret");
    }

    #[test]
    fn test_parse_subkey() {
        let path = SecretPath::parse("web/github#user").unwrap();
        assert_eq!(path.segments(), ["web", "github"]);
        assert_eq!(path.key(), Some("user"));
        assert_eq!(path.to_string(), "web/github#user");
    }

    #[test]
    fn test_parse_trims_slashes() {
        let path = SecretPath::parse("/a/b/").unwrap();
        assert_eq!(path.as_string(), "a/b");
    }

    #[test]
    fn test_parse_root() {
        assert!(SecretPath::parse("").unwrap().is_root());
    }

    #[test]
    fn test_parse_rejects_bad_segments() {
        assert!(SecretPath::parse("a//b").is_err());
        assert!(SecretPath::parse("a/../b").is_err());
        assert!(SecretPath::parse("./a").is_err());
        assert!(SecretPath::parse("a#").is_err());
        assert!(SecretPath::parse("#key").is_err());
    }

    #[test]
    fn test_parse_rejects_hidden_segments() {
        assert!(SecretPath::parse(".hidden").is_err());
        assert!(SecretPath::parse("dir/.env").is_err());
        assert!(SecretPath::parse(".plain-ids").is_err());
        assert!(SecretPath::parse("dir/a.b").is_ok());
    }

    #[test]
    fn test_case_sensitive() {
        assert_ne!(
            SecretPath::parse("Web/x").unwrap(),
            SecretPath::parse("web/x").unwrap()
        );
    }

    #[test]
    fn test_prefix_is_segment_wise() {
        let path = SecretPath::parse("work/team/db").unwrap();
        let work = SecretPath::parse("work").unwrap();
        let wo = SecretPath::parse("wo").unwrap();

        assert!(path.starts_with(&work));
        assert!(!path.starts_with(&wo));
        assert_eq!(path.strip_prefix(&work).unwrap().as_string(), "team/db");
        assert!(path.strip_prefix(&wo).is_none());
    }

    #[test]
    fn test_prepend_keeps_key() {
        let rel = SecretPath::parse("db#user").unwrap();
        let prefix = SecretPath::parse("work").unwrap();
        assert_eq!(rel.prepend(&prefix).to_string(), "work/db#user");
    }
}
