//! Persistent storage for the activated license key.
//!
//! The key is kept as a plain text file containing nothing but the token.
//!
//! ## Storage Locations
//!
//! **Canonical (written by `save`, searched first):**
//! - Windows: `%APPDATA%\<app_dir>\license.key`
//! - macOS: `~/Library/Application Support/<app_dir>/license.key`
//! - Linux: `~/.local/share/<app_dir>/license.key`
//!
//! **Legacy fallbacks (searched in order):**
//! 1. The directory containing the running executable
//! 2. The current working directory
//!
//! ## Migration
//!
//! When a key is only found in a legacy location it is copied into the
//! canonical location so later lookups hit the first candidate. The legacy
//! file is left alone; the installation directory may be read-only. A failed
//! copy is not retried for the lifetime of the store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::errors::{LicenseError, LicenseResult};

/// One place a license file may live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseLocation {
    /// `<per-user data dir>/<app_dir_name>`
    AppData { app_dir_name: String },
    /// Directory of the running executable.
    InstallDir,
    /// Current working directory.
    WorkingDir,
    /// A fixed directory.
    Directory(PathBuf),
}

impl LicenseLocation {
    /// Resolves the directory for this location, if it can be determined.
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        match self {
            LicenseLocation::AppData { app_dir_name } => {
                dirs::data_dir().map(|p| p.join(app_dir_name))
            }
            LicenseLocation::InstallDir => std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf)),
            LicenseLocation::WorkingDir => std::env::current_dir().ok(),
            LicenseLocation::Directory(dir) => Some(dir.clone()),
        }
    }
}

/// Reads and writes the license file across an ordered list of locations.
///
/// The first location is canonical: `save` writes there and `load` looks
/// there first.
#[derive(Debug, Clone)]
pub struct LicenseStore {
    file_name: String,
    locations: Vec<LicenseLocation>,
    migrate_legacy: bool,
    migration_failed: Arc<AtomicBool>,
}

impl LicenseStore {
    pub fn new(file_name: impl Into<String>, locations: Vec<LicenseLocation>) -> Self {
        Self {
            file_name: file_name.into(),
            locations,
            migrate_legacy: false,
            migration_failed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Enables or disables copying legacy files into the canonical location.
    pub fn with_migration(mut self, migrate_legacy: bool) -> Self {
        self.migrate_legacy = migrate_legacy;
        self
    }

    /// Builds the standard location list from configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        let mut locations = vec![LicenseLocation::AppData {
            app_dir_name: config.app_dir_name.trim().to_string(),
        }];
        if config.search_install_dir {
            locations.push(LicenseLocation::InstallDir);
        }
        if config.search_working_dir {
            locations.push(LicenseLocation::WorkingDir);
        }

        Self::new(config.file_name.trim(), locations).with_migration(config.migrate_legacy)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn locations(&self) -> &[LicenseLocation] {
        &self.locations
    }

    /// Path that `save` writes to.
    pub fn canonical_path(&self) -> Option<PathBuf> {
        self.locations
            .first()
            .and_then(LicenseLocation::resolve_dir)
            .map(|dir| dir.join(&self.file_name))
    }

    /// Every resolvable candidate path in search order, without duplicates.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for dir in self.locations.iter().filter_map(LicenseLocation::resolve_dir) {
            let path = dir.join(&self.file_name);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// Writes `token` to the canonical location, creating directories as needed.
    pub fn save(&self, token: &str) -> LicenseResult<PathBuf> {
        let path = self.canonical_path().ok_or_else(|| {
            LicenseError::StorageError(std::io::Error::new(
                ErrorKind::NotFound,
                "Could not determine license storage directory",
            ))
        })?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, token.trim())?;

        log::debug!("Saved license to {}", path.display());
        Ok(path)
    }

    /// Returns the first non-empty license found, or `None`.
    ///
    /// Read errors at any location are treated as "not found" there.
    pub fn load(&self) -> Option<String> {
        let canonical = self.canonical_path();

        for path in self.candidate_paths() {
            let token = match read_token(&path) {
                Some(token) => token,
                None => continue,
            };

            log::debug!("Loaded license from {}", path.display());

            if self.migrate_legacy
                && canonical.as_ref() != Some(&path)
                && !self.migration_failed.load(Ordering::Relaxed)
            {
                self.migrate(&path, &token);
            }
            return Some(token);
        }

        log::debug!("No license found in {} location(s)", self.locations.len());
        None
    }

    fn migrate(&self, from: &Path, token: &str) {
        match self.save(token) {
            Ok(to) => log::info!(
                "Migrated license from {} to {}",
                from.display(),
                to.display()
            ),
            Err(e) => {
                self.migration_failed.store(true, Ordering::Relaxed);
                log::warn!("Failed to migrate license from {}: {}", from.display(), e);
            }
        }
    }
}

fn read_token(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(data) => {
            let token = data.trim();
            if token.is_empty() {
                log::debug!("Ignoring empty license file {}", path.display());
                None
            } else {
                Some(token.to_string())
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            log::debug!("Could not read {}: {}", path.display(), e);
            None
        }
    }
}
