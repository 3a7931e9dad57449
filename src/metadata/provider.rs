//! Provider identity bound to its settings.
//!
//! Every metadata provider (TMDB, OMDb, Kodi scrapers, ...) owns exactly one
//! [`ProviderInfo`]. The info carries the immutable identity shown to users
//! and the [`ConfigStore`] the provider declares its settings in.

use std::fmt;

use crate::config::{ConfigStore, EntryCodec};

/// Identity of a metadata provider plus its settings store.
pub struct ProviderInfo {
    /// Short, stable identifier (e.g. `"tmdb"`). Names the settings file.
    id: String,
    /// Human-readable name.
    name: String,
    /// One-line description.
    description: String,
    config: ConfigStore,
}

impl ProviderInfo {
    /// Create a provider with an empty settings store.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let config = ConfigStore::new(id.clone());
        Self {
            id,
            name: name.into(),
            description: description.into(),
            config,
        }
    }

    /// Like [`ProviderInfo::new`], with a custom codec for encrypted settings.
    pub fn with_codec(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        codec: EntryCodec,
    ) -> Self {
        let id = id.into();
        let config = ConfigStore::with_codec(id.clone(), codec);
        Self {
            id,
            name: name.into(),
            description: description.into(),
            config,
        }
    }

    /// Stable identifier; also names the persisted settings file.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable provider name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short description shown alongside the name.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The provider's settings.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }
}

impl fmt::Debug for ProviderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("config", &self.config)
            .finish()
    }
}
