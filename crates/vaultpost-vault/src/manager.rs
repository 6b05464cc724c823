//! Vault manager: path-safe reads and Obsidian-style link resolution

use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::instrument;
use vaultpost_core::prelude::*;
use walkdir::WalkDir;

/// Read-only view of a vault directory
pub struct VaultManager {
    config: VaultConfig,
    vault_path: PathBuf,
}

impl VaultManager {
    /// Create a new vault manager
    pub fn new(config: VaultConfig) -> Result<Self> {
        config.validate()?;
        let vault_path = config.path.canonicalize().map_err(Error::io)?;

        Ok(Self { config, vault_path })
    }

    /// Get canonical vault path
    pub fn vault_path(&self) -> &Path {
        &self.vault_path
    }

    /// Get vault configuration
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Read a note as text
    #[instrument(skip(self), fields(file = ?path), name = "vault_read_note")]
    pub async fn read_note(&self, path: &Path) -> Result<String> {
        let full_path = self.resolve_path(path)?;
        if !full_path.is_file() {
            return Err(Error::file_not_found(path));
        }

        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(Error::io)
    }

    /// Read an asset's bytes.
    ///
    /// Missing paths and directories are reported as [`Error::FileNotFound`];
    /// files above `max_asset_size` as [`Error::FileTooLarge`].
    #[instrument(skip(self), fields(file = ?path), name = "vault_read_binary")]
    pub async fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        let full_path = self.resolve_path(path)?;

        let metadata = match tokio::fs::metadata(&full_path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(Error::file_not_found(path)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::file_not_found(path));
            }
            Err(e) => return Err(Error::io(e)),
        };

        let max = self.config.max_asset_size;
        if metadata.len() > max {
            return Err(Error::file_too_large(path, metadata.len(), max));
        }

        let bytes = tokio::fs::read(&full_path).await.map_err(Error::io)?;
        log::debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(bytes)
    }

    /// Resolve an embed link to a vault-relative file path.
    ///
    /// Lookup order:
    /// 1. relative to the folder of `context` (the note containing the embed)
    /// 2. relative to the vault root
    /// 3. any vault file whose trailing path components equal the link,
    ///    preferring the shortest path, then case-insensitively
    ///
    /// A link without an extension also matches `<link>.md`. Excluded folders
    /// are never returned.
    pub fn resolve_link_path(&self, link: &str, context: &Path) -> Option<PathBuf> {
        let link = link.trim().trim_start_matches('/');
        if link.is_empty() {
            return None;
        }

        let candidates = Self::candidates(link);
        let context = context.strip_prefix(&self.vault_path).unwrap_or(context);
        let context_dir = context.parent().unwrap_or_else(|| Path::new(""));

        for candidate in &candidates {
            for base in [context_dir, Path::new("")] {
                if let Ok(full_path) = self.resolve_path(&base.join(candidate))
                    && full_path.is_file()
                    && !self.is_excluded(&full_path)
                {
                    return self.relative(&full_path);
                }
            }
        }

        let files = self.scan_files();
        for candidate in &candidates {
            let wanted: Vec<&str> = candidate
                .split('/')
                .filter(|p| !p.is_empty() && *p != ".")
                .collect();
            if wanted.is_empty() || wanted.contains(&"..") {
                continue;
            }

            if let Some(found) = best_suffix_match(&files, &wanted, |a, b| a == b) {
                return Some(found);
            }
            if let Some(found) = best_suffix_match(&files, &wanted, |a, b| {
                a.to_lowercase() == b.to_lowercase()
            }) {
                return Some(found);
            }
        }

        log::debug!("No vault file matches link '{}'", link);
        None
    }

    /// List every file in the vault (vault-relative), skipping excluded folders
    pub fn scan_files(&self) -> Vec<PathBuf> {
        let excluded = &self.config.excluded_paths;

        WalkDir::new(&self.vault_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| excluded.contains(name))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable vault entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.relative(entry.path()))
            .collect()
    }

    fn candidates(link: &str) -> Vec<String> {
        if Path::new(link).extension().is_some() {
            vec![link.to_string()]
        } else {
            vec![link.to_string(), format!("{}.md", link)]
        }
    }

    /// Resolve a path (absolute or vault-relative) to an absolute path inside the vault
    fn resolve_path(&self, path: &Path) -> Result<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_path("empty path"));
        }

        let full_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.vault_path.join(path)
        };

        // Canonicalize when possible so symlinks are checked, otherwise normalize lexically
        let normalized = if full_path.exists() {
            full_path.canonicalize().map_err(|_| {
                Error::invalid_path(format!("Cannot resolve path: {}", path.display()))
            })?
        } else {
            normalize_lexically(&full_path)
        };

        if !normalized.starts_with(&self.vault_path) {
            return Err(Error::path_traversal(path));
        }

        Ok(normalized)
    }

    fn relative(&self, full_path: &Path) -> Option<PathBuf> {
        full_path
            .strip_prefix(&self.vault_path)
            .ok()
            .map(Path::to_path_buf)
    }

    fn is_excluded(&self, full_path: &Path) -> bool {
        self.relative(full_path).is_some_and(|rel| {
            rel.iter()
                .filter_map(|c| c.to_str())
                .any(|c| self.config.excluded_paths.contains(c))
        })
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn best_suffix_match(
    files: &[PathBuf],
    wanted: &[&str],
    eq: impl Fn(&str, &str) -> bool,
) -> Option<PathBuf> {
    files
        .iter()
        .filter(|path| {
            let parts: Vec<&str> = path.iter().filter_map(|p| p.to_str()).collect();
            parts.len() >= wanted.len()
                && parts[parts.len() - wanted.len()..]
                    .iter()
                    .zip(wanted)
                    .all(|(a, b)| eq(a, b))
        })
        .min_by(|a, b| {
            a.components()
                .count()
                .cmp(&b.components().count())
                .then_with(|| a.cmp(b))
        })
        .cloned()
}
