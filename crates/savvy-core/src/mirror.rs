//! Local snapshot of remote state
//!
//! The store keeps a JSON mirror of the last fetched links and categories
//! so read-only commands still work without a network round-trip.
//! Uses atomic writes (write to temp file, then rename) to prevent
//! corruption.
//!
//! Storage location: `~/.local/share/savvy/` (configurable via `Config`)
//!
//! Files:
//! - `links.json` - last fetched links, newest first
//! - `categories.json` - last fetched categories

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::models::{Category, Link};

/// On-disk mirror of the last remote snapshot
pub struct Mirror {
    links_path: PathBuf,
    categories_path: PathBuf,
}

impl Mirror {
    /// Create a mirror rooted at the configured data directory
    pub fn new(config: &Config) -> Self {
        Self {
            links_path: config.links_cache_path(),
            categories_path: config.categories_cache_path(),
        }
    }

    /// Whether any snapshot has been written yet
    pub fn exists(&self) -> bool {
        self.links_path.exists() || self.categories_path.exists()
    }

    /// Save the link snapshot
    pub fn save_links(&self, links: &[Link]) -> Result<()> {
        save_json(&self.links_path, &links)
    }

    /// Load the link snapshot, `None` if never written
    pub fn load_links(&self) -> Result<Option<Vec<Link>>> {
        load_json(&self.links_path)
    }

    /// Save the category snapshot
    pub fn save_categories(&self, categories: &[Category]) -> Result<()> {
        save_json(&self.categories_path, &categories)
    }

    /// Load the category snapshot, `None` if never written
    pub fn load_categories(&self) -> Result<Option<Vec<Category>>> {
        load_json(&self.categories_path)
    }

    /// Delete both snapshots
    pub fn clear(&self) -> Result<()> {
        for path in [&self.links_path, &self.categories_path] {
            if path.exists() {
                fs::remove_file(path).with_context(|| format!("Failed to delete {:?}", path))?;
            }
        }
        Ok(())
    }
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("Failed to serialize snapshot")?;
    atomic_write(path, &bytes).with_context(|| format!("Failed to save snapshot to {:?}", path))
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read snapshot {:?}", path))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot {:?}", path))?;
    Ok(Some(value))
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    // Create temp file in the same directory (for atomic rename)
    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .with_context(|| format!("Failed to create temp file {:?}", temp_path))?;

    file.write_all(data)
        .with_context(|| format!("Failed to write to temp file {:?}", temp_path))?;

    // Sync to disk before rename
    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {:?}", temp_path))?;

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename {:?} to {:?}", temp_path, path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_mirror(temp_dir: &TempDir) -> Mirror {
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        Mirror::new(&config)
    }

    #[test]
    fn test_missing_snapshots_load_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = test_mirror(&temp_dir);

        assert!(!mirror.exists());
        assert!(mirror.load_links().unwrap().is_none());
        assert!(mirror.load_categories().unwrap().is_none());
    }

    #[test]
    fn test_links_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = test_mirror(&temp_dir);

        let mut link = Link::new("https://example.com");
        link.set_title("Example");
        link.set_progress(40);
        let links = vec![link];

        mirror.save_links(&links).unwrap();
        assert!(mirror.exists());

        let loaded = mirror.load_links().unwrap().unwrap();
        assert_eq!(loaded, links);
    }

    #[test]
    fn test_categories_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = test_mirror(&temp_dir);

        let categories = Category::defaults();
        mirror.save_categories(&categories).unwrap();

        let loaded = mirror.load_categories().unwrap().unwrap();
        assert_eq!(loaded, categories);
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = test_mirror(&temp_dir);

        mirror.save_links(&[Link::new("https://one.com")]).unwrap();
        mirror
            .save_links(&[Link::new("https://two.com"), Link::new("https://three.com")])
            .unwrap();

        let loaded = mirror.load_links().unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].url, "https://two.com");
    }

    #[test]
    fn test_clear_removes_snapshots() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = test_mirror(&temp_dir);

        mirror.save_links(&[Link::new("https://one.com")]).unwrap();
        mirror.save_categories(&Category::defaults()).unwrap();

        mirror.clear().unwrap();
        assert!(!mirror.exists());
        assert!(mirror.load_links().unwrap().is_none());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = test_mirror(&temp_dir);

        mirror.save_links(&[Link::new("https://one.com")]).unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "tmp").unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());
    }
}
