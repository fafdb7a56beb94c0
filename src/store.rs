//! The persisted URL set: one absolute URL per line, append-only across
//! runs, rewritten in full on every update.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};

pub fn load(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(raw
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn save(path: &Path, urls: &[String]) -> Result<()> {
    let mut out = String::new();
    for url in urls {
        out.push_str(url);
        out.push('\n');
    }
    write_atomic(path, out.as_bytes())
}

/// URLs in `discovered` not yet in `persisted`, preserving `discovered`'s
/// order so downstream entries land in the feed deterministically. Repeats
/// within `discovered` are collapsed to their first occurrence.
pub fn compute_new(persisted: &[String], discovered: &[String]) -> Vec<String> {
    let seen: HashSet<&str> = persisted.iter().map(String::as_str).collect();
    let mut picked: HashSet<&str> = HashSet::new();
    let mut new_urls = Vec::new();
    for url in discovered {
        if !seen.contains(url.as_str()) && picked.insert(url.as_str()) {
            new_urls.push(url.clone());
        }
    }
    new_urls
}

/// Write through a temp file in the target directory and rename over the
/// destination, so readers never observe a partially written store.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(path, e))?;
    tmp.write_all(bytes).map_err(|e| Error::io(path, e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        let stored = urls(&["https://a.example/1", "https://a.example/2", "https://a.example/3"]);
        save(&path, &stored).unwrap();
        assert_eq!(load(&path).unwrap(), stored);
    }

    #[test]
    fn saved_file_has_one_url_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        save(&path, &urls(&["https://a.example/1", "https://a.example/2"])).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "https://a.example/1\nhttps://a.example/2\n");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn new_urls_preserve_discovered_order() {
        let persisted = urls(&["u1"]);
        let discovered = urls(&["u1", "u2", "u3"]);
        assert_eq!(compute_new(&persisted, &discovered), urls(&["u2", "u3"]));
    }

    #[test]
    fn duplicate_discoveries_collapse_to_first() {
        let discovered = urls(&["u1", "u2", "u1", "u3", "u2"]);
        assert_eq!(compute_new(&[], &discovered), urls(&["u1", "u2", "u3"]));
    }

    #[test]
    fn diff_is_idempotent_after_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        let persisted = urls(&["u1"]);
        let discovered = urls(&["u1", "u2", "u3"]);

        let new_urls = compute_new(&persisted, &discovered);
        let mut all = persisted;
        all.extend(new_urls);
        save(&path, &all).unwrap();

        let reloaded = load(&path).unwrap();
        assert!(compute_new(&reloaded, &discovered).is_empty());
    }

    #[test]
    fn unchanged_discovery_yields_empty_diff() {
        let persisted = urls(&["u1", "u2"]);
        assert!(compute_new(&persisted, &persisted).is_empty());
    }
}
