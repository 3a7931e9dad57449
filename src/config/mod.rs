//! Typed, validated provider settings and their persistence.

pub mod codec;
pub mod entry;
pub mod persist;
mod store;

pub use codec::EntryCodec;
pub use entry::{ConfigEntry, EntryKind};
pub use store::ConfigStore;

use parking_lot::RwLock;
use std::path::{Path, PathBuf};

/// Environment variable consulted for the default settings directory.
pub const CONFIG_DIR_ENV: &str = "SCRAPER_CONFIG_DIR";

const FALLBACK_CONFIG_DIR: &str = "config";

static DEFAULT_CONFIG_DIR: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Directory used by the zero-argument `load()` / `save()` forms.
///
/// Resolution order: an override installed with
/// [`set_default_config_dir`], then `$SCRAPER_CONFIG_DIR` (tilde-expanded),
/// then `./config`.
pub fn default_config_dir() -> PathBuf {
    if let Some(dir) = DEFAULT_CONFIG_DIR.read().as_ref() {
        return dir.clone();
    }

    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            PathBuf::from(shellexpand::tilde(dir.trim()).as_ref())
        }
        _ => PathBuf::from(FALLBACK_CONFIG_DIR),
    }
}

/// Install a process-wide default settings directory.
pub fn set_default_config_dir(dir: impl AsRef<Path>) {
    let dir = dir.as_ref().to_path_buf();
    tracing::debug!("Default settings directory set to {}", dir.display());
    *DEFAULT_CONFIG_DIR.write() = Some(dir);
}

/// Remove an override installed with [`set_default_config_dir`].
pub fn reset_default_config_dir() {
    *DEFAULT_CONFIG_DIR.write() = None;
}
