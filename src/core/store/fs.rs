//! Filesystem helpers for store trees.
//!
//! Blobs are replaced by writing a temp file in the destination directory and
//! renaming it over the target, so readers see either the old or the new
//! file and never a partial one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;
use walkdir::WalkDir;

use crate::core::constants::TEMP_PREFIX;
use crate::error::{Result, StoreError};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Atomically replace `path` with `contents` (mode 0600 on Unix).
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|source| write_err(dir, source))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = dir.join(format!(
        "{}{}-{}-{}",
        TEMP_PREFIX,
        name,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    trace!(tmp = %tmp.display(), target = %path.display(), "atomic write");

    let result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(path, source).into());
    }
    Ok(())
}

/// Read a file, attaching the path to any error.
pub fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| {
        StoreError::Read {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// Remove `path` and then any directories above it, up to but excluding
/// `root`, that became empty.
pub fn remove_and_prune(root: &Path, path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|source| write_err(path, source))?;

    let mut parent = path.parent();
    while let Some(dir) = parent {
        if dir == root || !dir.starts_with(root) {
            break;
        }
        let empty = match fs::read_dir(dir) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => false,
        };
        if !empty {
            break;
        }
        fs::remove_dir(dir).map_err(|source| write_err(dir, source))?;
        parent = dir.parent();
    }
    Ok(())
}

/// Relative paths (with `/` separators, extension stripped) of every regular
/// file under `root` ending in `.ext`. Dot-entries are skipped and symlinks
/// are never followed.
pub fn walk(root: &Path, ext: &str) -> Result<Vec<String>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let suffix = format!(".{}", ext);
    let mut found = Vec::new();
    let entries = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in entries {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            StoreError::Read {
                path,
                source: e.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel: Vec<_> = rel.iter().map(|c| c.to_string_lossy()).collect();
        if let Some(stem) = rel.join("/").strip_suffix(&suffix) {
            found.push(stem.to_string());
        }
    }

    found.sort();
    Ok(found)
}

fn write_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Write {
        path: PathBuf::from(path),
        source,
    }
}
