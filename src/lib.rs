//! scraper-config - Typed, validated settings for metadata providers
//!
//! Each provider owns a [`ProviderInfo`] whose [`ConfigStore`] holds the
//! settings it declares (booleans, free text, selects and index selects).
//! Invalid values are never committed, and settings persist to one
//! `scraper_<id>.conf` file per provider, with sensitive text obfuscated at
//! rest.

pub mod config;
pub mod error;
pub mod metadata;

pub use config::{ConfigEntry, ConfigStore, EntryCodec, EntryKind};
pub use error::{Error, Result};
pub use metadata::{ProviderInfo, ProviderRegistry};
