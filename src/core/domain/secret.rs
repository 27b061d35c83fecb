//! Secret type and its plaintext codec.
//!
//! The plaintext of every blob is line oriented:
//!
//! ```text
//! hunter2              <- password (first line, verbatim)
//! user: alice          <- attribute
//! some free text       <- body line
//! ---                  <- YAML marker: later values are coerced on read
//! pin: 0123            <- read back as `83`
//! ```
//!
//! Attributes and body lines live in one ordered entry list so the original
//! interleaving survives a serialize. Parsing is allowed to be lossy for the
//! parsed view; the original bytes are kept for no-parse reads.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use zeroize::Zeroize;

use crate::core::constants::YAML_MARKER;
use crate::error::SecretError;

/// Line terminator observed on input and reused on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    #[default]
    Lf,
    CrLf,
}

impl Newline {
    pub fn as_str(self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
        }
    }

    fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            Newline::CrLf
        } else {
            Newline::Lf
        }
    }
}

/// One line after the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// `key: value`. `spaced` records whether a space followed the colon.
    Attribute {
        key: String,
        value: String,
        spaced: bool,
    },
    /// Anything that is not an attribute, kept verbatim.
    Line(String),
}

impl Entry {
    fn is_marker(&self) -> bool {
        matches!(self, Entry::Line(l) if l == YAML_MARKER)
    }
}

/// How `get` treats duplicate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookup {
    /// Return the first match in sequence order.
    #[default]
    First,
    /// Fail with `AmbiguousKey` when more than one attribute matches.
    Strict,
}

/// Decoded form of one secret blob.
#[derive(Clone, Default)]
pub struct Secret {
    password: String,
    entries: Vec<Entry>,
    newline: Newline,
    raw: Option<Vec<u8>>,
}

impl Secret {
    /// An empty secret with only a password line.
    pub fn new(password: impl Into<String>) -> Result<Self, SecretError> {
        let password = password.into();
        single_line("password", &password)?;
        Ok(Self {
            password,
            entries: Vec::new(),
            newline: Newline::Lf,
            raw: None,
        })
    }

    /// Parse plaintext bytes. Never fails; invalid UTF-8 is replaced in the
    /// parsed view while [`Secret::raw`] keeps the exact input.
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let newline = Newline::detect(&text);

        let mut lines = text.split(newline.as_str());
        let password = lines.next().unwrap_or_default().to_string();

        let mut yaml = false;
        let mut entries = Vec::new();
        for line in lines {
            if line == YAML_MARKER {
                yaml = true;
                entries.push(Entry::Line(line.to_string()));
                continue;
            }
            entries.push(match parse_attribute(line, yaml) {
                Some((key, value, spaced)) => Entry::Attribute {
                    key: key.to_string(),
                    value: value.to_string(),
                    spaced,
                },
                None => Entry::Line(line.to_string()),
            });
        }

        Self {
            password,
            entries,
            newline,
            raw: Some(raw.to_vec()),
        }
    }

    /// Encode to plaintext bytes. Values are written literally; YAML
    /// coercion is a read concern and never reaches storage.
    pub fn serialize(&self) -> Vec<u8> {
        self.encode(false).into_bytes()
    }

    /// Text for a parsed read: like [`Secret::serialize`] but with coerced
    /// values after the YAML marker.
    pub fn render(&self) -> String {
        self.encode(true)
    }

    fn encode(&self, coerced: bool) -> String {
        let nl = self.newline.as_str();
        let mut out = self.password.clone();
        let mut yaml = false;
        for entry in &self.entries {
            out.push_str(nl);
            match entry {
                Entry::Attribute { key, value, spaced } => {
                    let value = if coerced && yaml {
                        coerce(value).map(Cow::Owned).unwrap_or(Cow::Borrowed(value.as_str()))
                    } else {
                        Cow::Borrowed(value.as_str())
                    };
                    out.push_str(key);
                    out.push(':');
                    if *spaced {
                        out.push(' ');
                    }
                    out.push_str(&value);
                }
                Entry::Line(line) => out.push_str(line),
            }
            yaml |= entry.is_marker();
        }
        out
    }

    /// The bytes this secret was parsed from, or its encoding if it was
    /// built in memory.
    pub fn raw(&self) -> Cow<'_, [u8]> {
        match &self.raw {
            Some(raw) => Cow::Borrowed(raw),
            None => Cow::Owned(self.serialize()),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> Result<(), SecretError> {
        let password = password.into();
        single_line("password", &password)?;
        self.password = password;
        self.raw = None;
        Ok(())
    }

    pub fn newline(&self) -> Newline {
        self.newline
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Attributes in order, with their literal values.
    pub fn attributes(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                Entry::Attribute { key, value, .. } => Some((key.as_str(), value.as_str())),
                Entry::Line(_) => None,
            })
            .collect()
    }

    /// Body lines in order.
    pub fn body(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                Entry::Line(line) => Some(line.as_str()),
                Entry::Attribute { .. } => None,
            })
            .collect()
    }

    /// Distinct attribute keys (first spelling wins), in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        let index = self.key_index();
        let mut firsts: Vec<usize> = index.values().map(|v| v[0]).collect();
        firsts.sort_unstable();
        firsts
            .into_iter()
            .filter_map(|i| match &self.entries[i] {
                Entry::Attribute { key, .. } => Some(key.as_str()),
                Entry::Line(_) => None,
            })
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.key_index().contains_key(&fold(key))
    }

    /// Look up an attribute by case-insensitive key. The returned value is
    /// the parsed view: coerced when the attribute follows the YAML marker.
    pub fn get(&self, key: &str, lookup: Lookup) -> Result<String, SecretError> {
        let i = self.find(key, lookup)?;
        let value = self.value_at(i, key)?;
        if self.after_marker(i) {
            Ok(coerce(value).unwrap_or_else(|| value.to_string()))
        } else {
            Ok(value.to_string())
        }
    }

    /// Like [`Secret::get`] but returns the value exactly as stored.
    pub fn get_literal(&self, key: &str, lookup: Lookup) -> Result<&str, SecretError> {
        let i = self.find(key, lookup)?;
        self.value_at(i, key)
    }

    fn find(&self, key: &str, lookup: Lookup) -> Result<usize, SecretError> {
        let index = self.key_index();
        let hits = index
            .get(&fold(key))
            .ok_or_else(|| SecretError::KeyNotFound(key.to_string()))?;

        if lookup == Lookup::Strict && hits.len() > 1 {
            return Err(SecretError::AmbiguousKey {
                key: key.to_string(),
                count: hits.len(),
            });
        }
        Ok(hits[0])
    }

    fn value_at(&self, i: usize, key: &str) -> Result<&str, SecretError> {
        match &self.entries[i] {
            Entry::Attribute { value, .. } => Ok(value.as_str()),
            Entry::Line(_) => Err(SecretError::KeyNotFound(key.to_string())),
        }
    }

    /// Set the value of the first attribute matching `key`, keeping its
    /// position and spelling, or append a new attribute. Returns `true` when
    /// an existing value was replaced.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<bool, SecretError> {
        validate_key(key)?;
        let value = value.into();
        single_line("value", &value)?;
        self.raw = None;

        let folded = fold(key);
        let hit = self
            .entries
            .iter()
            .position(|e| matches!(e, Entry::Attribute { key: k, .. } if fold(k) == folded));
        if let Some(i) = hit {
            // A YAML mapping needs ": "; `key:` only parses back when empty.
            // A leading space in the value is only kept behind the separator.
            let yaml = self.after_marker(i);
            if let Entry::Attribute { value: v, spaced, .. } = &mut self.entries[i] {
                *spaced |= (yaml && !value.is_empty()) || value.starts_with(' ');
                *v = value;
            }
            return Ok(true);
        }

        let at = self.append_position();
        self.entries.insert(
            at,
            Entry::Attribute {
                key: key.to_string(),
                value,
                spaced: true,
            },
        );
        Ok(false)
    }

    /// Append an attribute even if the key already exists.
    pub fn add(&mut self, key: &str, value: impl Into<String>) -> Result<(), SecretError> {
        validate_key(key)?;
        let value = value.into();
        single_line("value", &value)?;
        self.raw = None;
        self.entries.push(Entry::Attribute {
            key: key.to_string(),
            value,
            spaced: true,
        });
        Ok(())
    }

    /// Append a free-form body line. Lines that would read back as an
    /// attribute are rejected; use [`Secret::add`] for those.
    pub fn push_line(&mut self, line: impl Into<String>) -> Result<(), SecretError> {
        let line = line.into();
        single_line("body line", &line)?;
        let yaml = self.entries.iter().any(Entry::is_marker);
        if parse_attribute(&line, yaml).is_some() {
            return Err(SecretError::AttributeLikeLine);
        }
        self.raw = None;
        self.entries.push(Entry::Line(line));
        Ok(())
    }

    /// Case-folded key -> entry positions. Rebuilt per lookup; secrets are
    /// small and the entry list is the source of truth.
    fn key_index(&self) -> BTreeMap<String, Vec<usize>> {
        let mut index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if let Entry::Attribute { key, .. } = entry {
                index.entry(fold(key)).or_default().push(i);
            }
        }
        index
    }

    /// New attributes go before trailing blank lines, so a secret that
    /// ended in a newline still does.
    fn append_position(&self) -> usize {
        self.entries
            .iter()
            .rposition(|e| !matches!(e, Entry::Line(l) if l.is_empty()))
            .map_or(0, |i| i + 1)
    }

    fn after_marker(&self, i: usize) -> bool {
        self.entries[..i].iter().any(Entry::is_marker)
    }
}

impl PartialEq for Secret {
    /// Structural equality; the retained raw bytes do not take part.
    fn eq(&self, other: &Self) -> bool {
        self.password == other.password
            && self.entries == other.entries
            && self.newline == other.newline
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("password", &"<redacted>")
            .field("keys", &self.keys())
            .field("lines", &self.body().len())
            .finish()
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.password.zeroize();
        if let Some(raw) = self.raw.as_mut() {
            raw.zeroize();
        }
        for entry in &mut self.entries {
            match entry {
                Entry::Attribute { value, .. } => value.zeroize(),
                Entry::Line(line) => line.zeroize(),
            }
        }
    }
}

/// Validate an attribute key: non-empty, no colon, no whitespace.
pub fn validate_key(key: &str) -> Result<(), SecretError> {
    let reason = if key.is_empty() {
        "cannot be empty"
    } else if key.contains(':') {
        "cannot contain ':'"
    } else if key.chars().any(char::is_whitespace) {
        "cannot contain whitespace"
    } else {
        return Ok(());
    };
    Err(SecretError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}

fn single_line(field: &'static str, text: &str) -> Result<(), SecretError> {
    if text.contains(['\n', '\r']) {
        Err(SecretError::LineBreak(field))
    } else {
        Ok(())
    }
}

/// Split `key: value`. Before the marker the space after the colon is
/// optional; after it a YAML mapping needs `": "` (or a bare trailing colon).
fn parse_attribute(line: &str, yaml: bool) -> Option<(&str, &str, bool)> {
    let (key, rest) = line.split_once(':')?;
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return None;
    }
    match rest.strip_prefix(' ') {
        Some(value) => Some((key, value, true)),
        None if yaml && !rest.is_empty() => None,
        None => Some((key, rest, false)),
    }
}

/// YAML 1.1 octal scalar: a leading zero and only digits, e.g. `0123` -> `83`.
fn coerce(value: &str) -> Option<String> {
    if value.len() > 1 && value.starts_with('0') && value.bytes().all(|b| b.is_ascii_digit()) {
        u64::from_str_radix(value, 8).ok().map(|n| n.to_string())
    } else {
        None
    }
}

fn fold(key: &str) -> String {
    key.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_only() {
        let secret = Secret::parse(b"moar");
        assert_eq!(secret.password(), "moar");
        assert!(secret.entries().is_empty());
        assert_eq!(secret.serialize(), b"moar");
    }

    #[test]
    fn test_empty_input() {
        let secret = Secret::parse(b"");
        assert_eq!(secret.password(), "");
        assert!(secret.entries().is_empty());
        assert_eq!(secret.serialize(), b"");
    }

    #[test]
    fn test_attributes_and_body_interleaved() {
        let raw = "thepassword\nuser: a user\nsome note\nweb: test.com\n\nuser: second user";
        let secret = Secret::parse(raw.as_bytes());

        assert_eq!(secret.password(), "thepassword");
        assert_eq!(
            secret.attributes(),
            vec![("user", "a user"), ("web", "test.com"), ("user", "second user")]
        );
        assert_eq!(secret.body(), vec!["some note", ""]);
        assert_eq!(secret.serialize(), raw.as_bytes());
    }

    #[test]
    fn test_trailing_newline_preserved() {
        let secret = Secret::parse(b"pw\nuser: bob\n");
        assert_eq!(secret.serialize(), b"pw\nuser: bob\n");
    }

    #[test]
    fn test_crlf_preserved() {
        let raw = b"pw\r\nuser: bob\r\nnote";
        let secret = Secret::parse(raw);
        assert_eq!(secret.newline(), Newline::CrLf);
        assert_eq!(secret.get("user", Lookup::First).unwrap(), "bob");
        assert_eq!(secret.serialize(), raw);
    }

    #[test]
    fn test_compact_attribute_kept_verbatim() {
        let secret = Secret::parse(b"pw\nuser:bob");
        assert_eq!(secret.get("user", Lookup::First).unwrap(), "bob");
        assert_eq!(secret.serialize(), b"pw\nuser:bob");
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let secret = Secret::parse(b"pw\nTest: inline");
        assert_eq!(secret.get("test", Lookup::First).unwrap(), "inline");
        assert_eq!(secret.get("TEST", Lookup::First).unwrap(), "inline");
    }

    #[test]
    fn test_get_first_match_with_duplicates() {
        let secret = Secret::parse(b"pw\nuser: a user\nweb: test.com\nuser: second user");
        assert_eq!(secret.get("user", Lookup::First).unwrap(), "a user");
    }

    #[test]
    fn test_get_strict_rejects_duplicates() {
        let secret = Secret::parse(b"pw\nuser: a\nUSER: b");
        let err = secret.get("user", Lookup::Strict).unwrap_err();
        assert!(matches!(err, SecretError::AmbiguousKey { count: 2, .. }));

        let secret = Secret::parse(b"pw\nuser: a");
        assert_eq!(secret.get("user", Lookup::Strict).unwrap(), "a");
    }

    #[test]
    fn test_get_missing_key() {
        let secret = Secret::parse(b"pw\nuser: a");
        assert!(matches!(
            secret.get("nope", Lookup::First),
            Err(SecretError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_yaml_octal_coercion() {
        let raw = b"yamltest\n---\nuser: 0123";
        let secret = Secret::parse(raw);

        assert_eq!(secret.render(), "yamltest\n---\nuser: 83");
        assert_eq!(secret.get("user", Lookup::First).unwrap(), "83");
        assert_eq!(secret.get_literal("user", Lookup::First).unwrap(), "0123");
        // storage is untouched
        assert_eq!(secret.serialize(), raw);
        assert_eq!(secret.raw().as_ref(), raw);
    }

    #[test]
    fn test_no_coercion_before_marker() {
        let secret = Secret::parse(b"pw\npin: 0123\n---\nzip: 0755");
        assert_eq!(secret.get("pin", Lookup::First).unwrap(), "0123");
        assert_eq!(secret.get("zip", Lookup::First).unwrap(), "493");
        assert_eq!(secret.render(), "pw\npin: 0123\n---\nzip: 493");
    }

    #[test]
    fn test_coerce_rules() {
        assert_eq!(coerce("0123").as_deref(), Some("83"));
        assert_eq!(coerce("00").as_deref(), Some("0"));
        assert_eq!(coerce("0"), None);
        assert_eq!(coerce("123"), None);
        assert_eq!(coerce("089"), None);
        assert_eq!(coerce("0x1f"), None);
    }

    #[test]
    fn test_key_lookup_with_embedded_delimiters() {
        let raw = "somepasswd\n---\nTest / test.com\nuser:myuser\nurl: test.com/";
        let secret = Secret::parse(raw.as_bytes());

        assert_eq!(secret.get("url", Lookup::First).unwrap(), "test.com/");
        // YAML needs ": ", so this stays a body line
        assert!(secret.get("user", Lookup::First).is_err());
        assert_eq!(secret.render(), raw);
    }

    #[test]
    fn test_prose_with_colon_is_body() {
        let secret = Secret::parse(b"pw\nRemember to call: Bob\n    \"ID\": \"SGML\",");
        assert!(secret.attributes().is_empty());
        assert_eq!(secret.body().len(), 2);
    }

    #[test]
    fn test_raw_is_exact_for_invalid_utf8() {
        let raw = [b'p', b'w', b'\n', 0xff, 0xfe];
        let secret = Secret::parse(&raw);
        assert_eq!(secret.raw().as_ref(), &raw);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut secret = Secret::parse(b"pw\nuser: a\nTest: old\nweb: x");
        assert!(secret.set("test", "new").unwrap());
        assert_eq!(secret.serialize(), b"pw\nuser: a\nTest: new\nweb: x");
    }

    #[test]
    fn test_set_appends_missing_key() {
        let mut secret = Secret::new("pw").unwrap();
        assert!(!secret.set("user", "bob").unwrap());
        assert_eq!(secret.serialize(), b"pw\nuser: bob");
    }

    #[test]
    fn test_set_keeps_trailing_newline() {
        let mut secret = Secret::parse(b"pw\nuser: bob\n");
        secret.set("url", "x").unwrap();
        assert_eq!(secret.serialize(), b"pw\nuser: bob\nurl: x\n");
    }

    #[test]
    fn test_set_invalidates_raw() {
        let mut secret = Secret::parse(b"pw\nuser:bob");
        secret.set("user", "alice").unwrap();
        assert_eq!(secret.raw().as_ref(), b"pw\nuser:alice");
    }

    #[test]
    fn test_set_empty_yaml_value() {
        let mut secret = Secret::parse(b"pw\n---\nuser:");
        assert_eq!(secret.get_literal("user", Lookup::First).unwrap(), "");

        secret.set("user", "alice").unwrap();
        assert_eq!(secret.serialize(), b"pw\n---\nuser: alice");
        let reparsed = Secret::parse(&secret.serialize());
        assert_eq!(reparsed.get("user", Lookup::First).unwrap(), "alice");
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let mut secret = Secret::new("pw").unwrap();
        assert!(secret.set("", "x").is_err());
        assert!(secret.set("a:b", "x").is_err());
        assert!(secret.add("a b", "x").is_err());
    }

    #[test]
    fn test_structural_roundtrip() {
        let mut secret = Secret::new("s3cret").unwrap();
        secret.add("user", "alice").unwrap();
        secret.push_line("free text").unwrap();
        secret.push_line("").unwrap();
        secret.add("user", "bob").unwrap();
        secret.add("url", " https://example.com/").unwrap();

        let parsed = Secret::parse(&secret.serialize());
        assert_eq!(parsed, secret);
        assert_eq!(parsed.attributes(), secret.attributes());
        assert_eq!(parsed.body(), secret.body());
    }

    #[test]
    fn test_line_breaks_rejected() {
        assert!(matches!(
            Secret::new("line1\nuser: x"),
            Err(SecretError::LineBreak("password"))
        ));

        let mut secret = Secret::new("pw").unwrap();
        assert!(secret.set_password("a\rb").is_err());
        assert!(secret.set("user", "a\nb").is_err());
        assert!(secret.add("user", "a\r\nb").is_err());
        assert!(secret.push_line("one\ntwo").is_err());
        assert_eq!(secret.serialize(), b"pw");

        secret.set_password("new").unwrap();
        assert_eq!(secret.password(), "new");
    }

    #[test]
    fn test_push_line_rejects_attribute_lookalike() {
        let mut secret = Secret::new("pw").unwrap();
        assert!(matches!(
            secret.push_line("note: this is prose"),
            Err(SecretError::AttributeLikeLine)
        ));
        assert!(secret.push_line("note:x").is_err());
        secret.push_line("Remember to call: Bob").unwrap();

        // after the marker an unspaced colon is prose
        secret.push_line("---").unwrap();
        secret.push_line("note:x").unwrap();
        assert!(secret.push_line("note: x").is_err());

        assert_eq!(Secret::parse(&secret.serialize()), secret);
    }

    #[test]
    fn test_set_leading_space_on_compact_attribute() {
        let mut secret = Secret::parse(b"pw\nuser:bob");
        secret.set("user", " padded").unwrap();
        assert_eq!(secret.serialize(), b"pw\nuser:  padded");

        let reparsed = Secret::parse(&secret.serialize());
        assert_eq!(reparsed, secret);
        assert_eq!(reparsed.get_literal("user", Lookup::First).unwrap(), " padded");
    }

    #[test]
    fn test_keys_distinct_in_order() {
        let secret = Secret::parse(b"pw\nweb: a\nUser: b\nuser: c");
        assert_eq!(secret.keys(), vec!["web", "User"]);
    }

    #[test]
    fn test_debug_redacts_password() {
        let secret = Secret::parse(b"hunter2\nuser: bob");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("hunter2"));
    }
}
