//! Registry of provider settings.
//!
//! The [`ProviderRegistry`] holds the [`ProviderInfo`] of every registered
//! metadata provider and loads or saves all of their settings in one pass.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::provider::ProviderInfo;
use crate::config::default_config_dir;
use crate::error::Result;

/// Providers in registration order, addressable by id.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use scraper_config::metadata::{ProviderInfo, ProviderRegistry};
///
/// let tmdb = Arc::new(ProviderInfo::new("tmdb", "TMDB", "The Movie Database"));
/// tmdb.config().add_boolean("includeAdult", false);
///
/// let mut registry = ProviderRegistry::new();
/// registry.register(tmdb);
/// registry.load_all()?;
/// # Ok::<(), scraper_config::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<ProviderInfo>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. A provider with the same id is replaced in
    /// place.
    pub fn register(&mut self, provider: Arc<ProviderInfo>) {
        if let Some(existing) = self.providers.iter_mut().find(|p| p.id() == provider.id()) {
            warn!(provider = provider.id(), "Provider registered twice; replacing");
            *existing = provider;
        } else {
            self.providers.push(provider);
        }
    }

    /// Look up a provider by id.
    pub fn get(&self, id: &str) -> Option<Arc<ProviderInfo>> {
        self.providers.iter().find(|p| p.id() == id).cloned()
    }

    /// Ids in registration order.
    pub fn ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn providers(&self) -> &[Arc<ProviderInfo>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Load every provider's settings from `dir`.
    ///
    /// All providers are attempted; the first failure is returned once the
    /// pass completes.
    pub fn load_all_from_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        self.for_each_provider("load", |p| p.config().load_from_dir(dir))
    }

    /// Save every provider's settings to `dir`.
    ///
    /// All providers are attempted; the first failure is returned once the
    /// pass completes.
    pub fn save_all_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        self.for_each_provider("save", |p| p.config().save_to_dir(dir))
    }

    /// [`load_all_from_dir`](Self::load_all_from_dir) against the default
    /// directory.
    pub fn load_all(&self) -> Result<()> {
        self.load_all_from_dir(default_config_dir())
    }

    /// [`save_all_to_dir`](Self::save_all_to_dir) against the default
    /// directory.
    pub fn save_all(&self) -> Result<()> {
        self.save_all_to_dir(default_config_dir())
    }

    fn for_each_provider<F>(&self, action: &str, mut op: F) -> Result<()>
    where
        F: FnMut(&ProviderInfo) -> Result<()>,
    {
        let mut first_error = None;
        let mut failed = 0usize;

        for provider in &self.providers {
            if let Err(e) = op(provider) {
                warn!(provider = provider.id(), "Failed to {action} provider settings: {e}");
                failed += 1;
                first_error.get_or_insert(e);
            }
        }

        info!(
            total = self.providers.len(),
            failed,
            "Finished {action} of provider settings"
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
