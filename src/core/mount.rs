//! Mount table: routes logical secret paths to stores.
//!
//! The root store sits at the empty prefix and is always present. Other
//! stores are mounted at non-empty prefixes; a path goes to the store with
//! the longest prefix matching its leading segments, falling back to root.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::core::constants::ROOT_STORE_LABEL;
use crate::core::domain::SecretPath;
use crate::core::prompt::{Choice, Prompt};
use crate::core::session::Session;
use crate::core::types::MountPrefix;
use crate::error::{MountError, Result};

/// Anything that can enumerate its mount points.
pub trait MountPointer {
    /// Mounted prefixes, excluding root, sorted.
    fn mount_points(&self) -> Vec<String>;
}

/// Prefix-routed collection of stores.
#[derive(Debug)]
pub struct MountTable<S> {
    root: S,
    mounts: BTreeMap<MountPrefix, Mounted<S>>,
}

#[derive(Debug)]
struct Mounted<S> {
    prefix: SecretPath,
    store: S,
}

/// Outcome of routing a path.
#[derive(Debug)]
pub struct Resolved<'a, S> {
    pub store: &'a S,
    /// Prefix the store is mounted at; empty for root.
    pub prefix: &'a str,
    /// Path relative to the store, keeping any sub-key.
    pub rel: SecretPath,
}

impl<S> MountTable<S> {
    pub fn new(root: S) -> Self {
        Self {
            root,
            mounts: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &S {
        &self.root
    }

    /// Register `store` at `prefix`.
    ///
    /// # Errors
    ///
    /// `MountError::AlreadyMounted` if the prefix is taken (the empty
    /// prefix always is), `MountError::InvalidPath` if it is not a plain path.
    pub fn mount(&mut self, prefix: &str, store: S) -> Result<()> {
        let parsed = parse_prefix(prefix)?;
        let key = parsed.as_string();
        if parsed.is_root() || self.mounts.contains_key(&key) {
            return Err(MountError::AlreadyMounted(key).into());
        }
        info!(prefix = %key, "mounted store");
        self.mounts.insert(
            key,
            Mounted {
                prefix: parsed,
                store,
            },
        );
        Ok(())
    }

    /// Remove the store at `prefix` and hand it back.
    pub fn unmount(&mut self, prefix: &str) -> Result<S> {
        let key = parse_prefix(prefix)?.as_string();
        match self.mounts.remove(&key) {
            Some(mounted) => {
                info!(prefix = %key, "unmounted store");
                Ok(mounted.store)
            }
            None => Err(MountError::NotMounted(key).into()),
        }
    }

    /// Store mounted exactly at `prefix`; the empty prefix is root.
    pub fn get(&self, prefix: &str) -> Option<&S> {
        let key = prefix.trim_matches('/');
        if key.is_empty() {
            return Some(&self.root);
        }
        self.mounts.get(key).map(|m| &m.store)
    }

    /// Route `path` to its store. Never fails: root takes anything no
    /// mount claims.
    pub fn resolve(&self, path: &SecretPath) -> Resolved<'_, S> {
        let best = self
            .mounts
            .iter()
            .filter(|(_, m)| path.starts_with(&m.prefix))
            .max_by_key(|(_, m)| m.prefix.segments().len());

        match best {
            Some((key, mounted)) => {
                let rel = path
                    .strip_prefix(&mounted.prefix)
                    .unwrap_or_else(|| path.clone());
                debug!(path = %path, prefix = %key, rel = %rel, "resolved to mount");
                Resolved {
                    store: &mounted.store,
                    prefix: key.as_str(),
                    rel,
                }
            }
            None => Resolved {
                store: &self.root,
                prefix: "",
                rel: path.clone(),
            },
        }
    }

    /// Root first, then mounts in prefix order.
    pub fn stores(&self) -> impl Iterator<Item = (&str, &S)> {
        std::iter::once(("", &self.root)).chain(
            self.mounts
                .iter()
                .map(|(k, m)| (k.as_str(), &m.store)),
        )
    }
}

impl<S> MountPointer for MountTable<S> {
    fn mount_points(&self) -> Vec<String> {
        // BTreeMap keys are already sorted
        self.mounts.keys().cloned().collect()
    }
}

fn parse_prefix(prefix: &str) -> Result<SecretPath> {
    let parsed = SecretPath::parse(prefix)?;
    if parsed.key().is_some() {
        return Err(MountError::InvalidPath {
            path: prefix.to_string(),
            reason: "a mount point cannot address a sub-key".to_string(),
        }
        .into());
    }
    Ok(parsed)
}

/// Ask which store a new secret should go to.
///
/// Returns the chosen prefix, or `""` for the root store. Never errors:
/// without a usable prompt, with `--yes`, with fewer than two mount points,
/// or on any prompt failure, the root store is chosen.
pub fn ask_for_store(session: &Session, mounts: &dyn MountPointer, prompt: &dyn Prompt) -> String {
    if !session.can_prompt() {
        return String::new();
    }

    let mut points = mounts.mount_points();
    if points.len() <= 1 {
        return String::new();
    }
    points.sort();

    let mut options = Vec::with_capacity(points.len() + 1);
    options.push(ROOT_STORE_LABEL.to_string());
    options.extend(points.iter().cloned());

    match prompt.choose_one("Please select the store you would like to use", &options) {
        Ok(Choice::Index(i)) if i > 0 && i <= points.len() => points[i - 1].clone(),
        Ok(_) => String::new(),
        Err(e) => {
            debug!(error = %e, "store selection failed, using root");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prompt::Scripted;
    use crate::error::Error;

    struct FakeMountPointer(Vec<&'static str>);

    impl MountPointer for FakeMountPointer {
        fn mount_points(&self) -> Vec<String> {
            self.0.iter().map(|s| s.to_string()).collect()
        }
    }

    fn path(s: &str) -> SecretPath {
        SecretPath::parse(s).unwrap()
    }

    fn table() -> MountTable<&'static str> {
        let mut t = MountTable::new("root");
        t.mount("work", "work").unwrap();
        t.mount("work/team", "team").unwrap();
        t.mount("personal", "personal").unwrap();
        t
    }

    #[test]
    fn test_resolve_longest_prefix() {
        let t = table();

        let r = t.resolve(&path("work/team/db"));
        assert_eq!(*r.store, "team");
        assert_eq!(r.prefix, "work/team");
        assert_eq!(r.rel, path("db"));

        let r = t.resolve(&path("work/other"));
        assert_eq!(*r.store, "work");
        assert_eq!(r.rel, path("other"));
    }

    #[test]
    fn test_resolve_is_segment_wise() {
        let t = table();
        let r = t.resolve(&path("workshop/key"));
        assert_eq!(*r.store, "root");
        assert_eq!(r.rel, path("workshop/key"));
    }

    #[test]
    fn test_resolve_keeps_sub_key() {
        let t = table();
        let r = t.resolve(&path("personal/mail#user"));
        assert_eq!(*r.store, "personal");
        assert_eq!(r.rel.key(), Some("user"));
    }

    #[test]
    fn test_resolve_falls_back_to_root() {
        let t = MountTable::new("root");
        let r = t.resolve(&path("anything/here"));
        assert_eq!(*r.store, "root");
        assert_eq!(r.prefix, "");
    }

    #[test]
    fn test_mount_duplicate_and_root() {
        let mut t = table();
        assert!(matches!(
            t.mount("/work/", "again").unwrap_err(),
            Error::Mount(MountError::AlreadyMounted(p)) if p == "work"
        ));
        assert!(matches!(
            t.mount("", "root2").unwrap_err(),
            Error::Mount(MountError::AlreadyMounted(_))
        ));
        assert!(t.mount("a#b", "x").is_err());
    }

    #[test]
    fn test_unmount() {
        let mut t = table();
        assert_eq!(t.unmount("work/team").unwrap(), "team");
        assert_eq!(*t.resolve(&path("work/team/db")).store, "work");
        assert!(matches!(
            t.unmount("work/team").unwrap_err(),
            Error::Mount(MountError::NotMounted(_))
        ));
        assert!(t.unmount("").is_err());
    }

    #[test]
    fn test_mount_points_sorted_without_root() {
        let t = table();
        assert_eq!(t.mount_points(), vec!["personal", "work", "work/team"]);
        let names: Vec<&str> = t.stores().map(|(p, _)| p).collect();
        assert_eq!(names, vec!["", "personal", "work", "work/team"]);
    }

    #[test]
    fn test_ask_for_store_never_blocks_without_prompting() {
        let prompt = Scripted::new();

        let session = Session::non_interactive();
        assert_eq!(ask_for_store(&session, &FakeMountPointer(vec!["foo", "bar"]), &prompt), "");

        let session = Session::default().with_always_yes(true);
        assert_eq!(ask_for_store(&session, &FakeMountPointer(vec!["foo", "bar"]), &prompt), "");
        assert_eq!(ask_for_store(&session, &FakeMountPointer(vec![]), &prompt), "");
        assert_eq!(ask_for_store(&session, &FakeMountPointer(vec!["foo"]), &prompt), "");

        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn test_ask_for_store_single_mount_interactive() {
        let prompt = Scripted::new().choose(Choice::Index(1));
        let session = Session::default();
        assert_eq!(ask_for_store(&session, &FakeMountPointer(vec!["foo"]), &prompt), "");
        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn test_ask_for_store_prompts_with_sorted_options() {
        let session = Session::default();

        let prompt = Scripted::new().choose(Choice::Index(1));
        assert_eq!(
            ask_for_store(&session, &FakeMountPointer(vec!["foo", "bar"]), &prompt),
            "bar"
        );

        let prompt = Scripted::new().choose(Choice::Index(0));
        assert_eq!(ask_for_store(&session, &FakeMountPointer(vec!["foo", "bar"]), &prompt), "");
    }

    #[test]
    fn test_ask_for_store_abort_and_out_of_range() {
        let session = Session::default();
        let mps = FakeMountPointer(vec!["foo", "bar"]);

        let prompt = Scripted::new().choose(Choice::Abort);
        assert_eq!(ask_for_store(&session, &mps, &prompt), "");

        let prompt = Scripted::new().choose(Choice::Index(7));
        assert_eq!(ask_for_store(&session, &mps, &prompt), "");
    }
}
