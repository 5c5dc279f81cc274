//! Re-keying of trace-recorded paths onto the current source tree.
//!
//! Traces are often recorded on another machine or checkout. Two passes
//! map their paths onto files that can actually be read:
//! - [`make_absolute`] resolves relative paths under a source root
//! - [`replace_paths`] swaps a recorded prefix (the filter root) for the
//!   source root, and drops every path that is not under that prefix
//!
//! Both passes return a new map. When two keys land on the same path their
//! values are merged.

use crate::utils::diagnostics::{Diagnostics, DropReason};
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Values that can absorb another value recorded under a colliding key
pub trait Merge {
    fn merge(&mut self, other: Self);
}

/// Re-key entries whose path resolves to an existing file under `source_root`
///
/// **Public** - first reconciliation pass
///
/// Keys that don't resolve are kept as they are. Absolute keys resolve to
/// themselves. When two keys resolve to the same file their values are
/// merged rather than the later one replacing the earlier.
///
/// # Arguments
/// * `mapping` - Entries keyed by recorded path
/// * `source_root` - Directory to resolve relative paths against
///
/// # Returns
/// The re-keyed map
pub fn make_absolute<V: Merge>(
    mapping: BTreeMap<PathBuf, V>,
    source_root: &Path,
) -> BTreeMap<PathBuf, V> {
    let root = absolute_root(source_root);
    let mut resolved = BTreeMap::new();

    for (key, value) in mapping {
        let candidate = root.join(&key);
        let new_key = if candidate.is_file() {
            candidate
        } else {
            debug!("{} does not resolve under {}", key.display(), root.display());
            key
        };
        insert_merged(&mut resolved, new_key, value);
    }

    resolved
}

/// Move entries recorded under `filter_root` onto `source_root`
///
/// **Public** - second reconciliation pass
///
/// Every key is expressed relative to `filter_root` and re-rooted under
/// `source_root`. Only keys whose re-rooted path exists and differs from the
/// key itself are kept, under the new path. Everything else is removed:
/// keys outside `filter_root`, keys whose re-rooted path is missing, and
/// keys that re-root onto themselves (as when `filter_root == source_root`).
/// This makes the filter root an allow-list.
///
/// Keys that re-root onto the same path have their values merged rather
/// than the later one replacing the earlier.
///
/// # Arguments
/// * `mapping` - Entries keyed by recorded path
/// * `source_root` - Directory holding the current sources
/// * `filter_root` - Prefix the trace was recorded under
/// * `diagnostics` - Receives a `path_dropped` call for every removed key
pub fn replace_paths<V: Merge>(
    mapping: BTreeMap<PathBuf, V>,
    source_root: &Path,
    filter_root: &Path,
    diagnostics: &dyn Diagnostics,
) -> BTreeMap<PathBuf, V> {
    let mut replaced = BTreeMap::new();

    for (key, value) in mapping {
        let Ok(relative) = key.strip_prefix(filter_root) else {
            diagnostics.path_dropped(&key, DropReason::OutsideFilterRoot);
            continue;
        };

        let new_key = source_root.join(relative);
        if new_key == key {
            diagnostics.path_dropped(&key, DropReason::UnchangedPath);
        } else if new_key.exists() {
            insert_merged(&mut replaced, new_key, value);
        } else {
            diagnostics.path_dropped(&key, DropReason::MissingUnderSourceRoot);
        }
    }

    replaced
}

/// **Private** - insert, merging into any value already under `key`
fn insert_merged<V: Merge>(map: &mut BTreeMap<PathBuf, V>, key: PathBuf, value: V) {
    match map.get_mut(&key) {
        Some(existing) => existing.merge(value),
        None => {
            map.insert(key, value);
        }
    }
}

/// **Private** - absolutize against the working directory when possible
fn absolute_root(root: &Path) -> PathBuf {
    if root.is_absolute() {
        return root.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(root),
        Err(_) => root.to_path_buf(),
    }
}
