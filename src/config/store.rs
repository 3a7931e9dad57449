//! Per-provider settings store.
//!
//! [`ConfigStore`] keeps the declared entries (in declaration order) and the
//! current values together behind one [`RwLock`], so multi-step operations
//! such as resolving a SelectIndex token and writing its index happen under a
//! single writer. All accessors take `&self`; a store can be shared across
//! threads through its owning [`ProviderInfo`].
//!
//! Values that fail validation are never committed. The caller is not told,
//! unless it uses [`ConfigStore::try_set_value`].
//!
//! [`ProviderInfo`]: crate::metadata::ProviderInfo

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

use super::codec::EntryCodec;
use super::entry::{parse_bool, ConfigEntry, EntryKind};
use super::persist;
use crate::error::Result;

/// Declared settings and current values for one provider.
pub struct ConfigStore {
    /// Id of the owning provider; names the persisted file.
    owner: String,
    inner: RwLock<StoreInner>,
    /// Serializes file access for this store.
    io_lock: Mutex<()>,
    codec: EntryCodec,
}

#[derive(Debug, Default)]
struct StoreInner {
    entries: Vec<ConfigEntry>,
    values: HashMap<String, String>,
}

impl StoreInner {
    fn entry(&self, key: &str) -> Option<&ConfigEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    fn declare(&mut self, owner: &str, entry: ConfigEntry) {
        let Some(pos) = self.entries.iter().position(|e| e.key == entry.key) else {
            self.entries.push(entry);
            return;
        };

        warn!(
            provider = owner,
            key = %entry.key,
            "Setting declared twice; replacing previous declaration"
        );

        let previous_kind = self.entries[pos].kind;
        if let Some(value) = self.values.remove(&entry.key) {
            let kept = if previous_kind == entry.kind {
                entry.validate_stored(&value)
            } else {
                None
            };
            match kept {
                Some(value) => {
                    self.values.insert(entry.key.clone(), value);
                }
                None => debug!(
                    provider = owner,
                    key = %entry.key,
                    "Dropped value incompatible with new declaration"
                ),
            }
        }
        self.entries[pos] = entry;
    }

    /// Validate user input and commit. Leaves `values` untouched on
    /// rejection.
    fn apply(&mut self, key: &str, value: &str) -> bool {
        let Some(normalized) = self.entry(key).and_then(|e| e.normalize(value)) else {
            return false;
        };
        self.values.insert(key.to_string(), normalized);
        true
    }

    /// Like [`apply`](Self::apply) for values already in stored form.
    fn apply_stored(&mut self, key: &str, stored: &str) -> bool {
        let Some(validated) = self.entry(key).and_then(|e| e.validate_stored(stored)) else {
            return false;
        };
        self.values.insert(key.to_string(), validated);
        true
    }

    /// Current value, falling back to the declared default.
    fn resolve(&self, key: &str) -> Option<(&ConfigEntry, &str)> {
        let entry = self.entry(key)?;
        let value = self
            .values
            .get(key)
            .map(String::as_str)
            .unwrap_or(entry.default.as_str());
        Some((entry, value))
    }
}

impl ConfigStore {
    /// Create an empty store owned by provider `owner`, using the default
    /// codec for encrypted entries.
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_codec(owner, EntryCodec::default())
    }

    /// Create an empty store with a specific codec for encrypted entries.
    pub fn with_codec(owner: impl Into<String>, codec: EntryCodec) -> Self {
        Self {
            owner: owner.into(),
            inner: RwLock::new(StoreInner::default()),
            io_lock: Mutex::new(()),
            codec,
        }
    }

    /// Id of the provider this store belongs to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    // -----------------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------------

    /// Declare a boolean setting.
    pub fn add_boolean(&self, key: &str, default: bool) {
        self.declare(ConfigEntry::boolean(key, default));
    }

    /// Declare a free-text setting.
    pub fn add_text(&self, key: &str, default: &str) {
        self.declare(ConfigEntry::text(key, default, false));
    }

    /// Declare a free-text setting that is obfuscated when persisted.
    /// In memory the value is plain text.
    pub fn add_encrypted_text(&self, key: &str, default: &str) {
        self.declare(ConfigEntry::text(key, default, true));
    }

    /// Declare a single-select setting. If `default` is not one of
    /// `allowed`, reads return `""` until a valid value is set.
    pub fn add_select<S: AsRef<str>>(&self, key: &str, allowed: &[S], default: &str) {
        self.declare(ConfigEntry::select(key, allowed, default));
    }

    /// Declare a select setting whose value is the index of the chosen
    /// token. If `default_token` is unknown, reads return `""` until a valid
    /// value is set.
    pub fn add_select_index<S: AsRef<str>>(&self, key: &str, tokens: &[S], default_token: &str) {
        self.declare(ConfigEntry::select_index(key, tokens, default_token));
    }

    fn declare(&self, entry: ConfigEntry) {
        self.inner.write().declare(&self.owner, entry);
    }

    // -----------------------------------------------------------------------
    // Values
    // -----------------------------------------------------------------------

    /// Current value, else the default, else `""` for an undeclared key.
    ///
    /// SelectIndex entries yield the index of the selected token.
    pub fn get_value(&self, key: &str) -> String {
        self.inner
            .read()
            .resolve(key)
            .map(|(_, value)| value.to_string())
            .unwrap_or_default()
    }

    /// Set a value if it is valid for the entry; otherwise keep the previous
    /// one.
    pub fn set_value(&self, key: &str, value: &str) {
        self.try_set_value(key, value);
    }

    /// Like [`set_value`](Self::set_value), but reports whether the value was
    /// accepted.
    pub fn try_set_value(&self, key: &str, value: &str) -> bool {
        let accepted = self.inner.write().apply(key, value);
        if !accepted {
            debug!(provider = %self.owner, key, value, "Rejected setting value");
        }
        accepted
    }

    /// Set a boolean entry.
    pub fn set_bool(&self, key: &str, value: bool) {
        self.set_value(key, if value { "true" } else { "false" });
    }

    /// The value of a Boolean entry. `None` for any other kind and for
    /// undeclared keys, so "false" and "not a boolean" stay distinct.
    pub fn get_value_as_bool(&self, key: &str) -> Option<bool> {
        let inner = self.inner.read();
        let (entry, value) = inner.resolve(key)?;
        if entry.kind != EntryKind::Boolean {
            return None;
        }
        parse_bool(value)
    }

    /// Selected index of a SelectIndex entry.
    pub fn get_value_as_index(&self, key: &str) -> Option<usize> {
        let inner = self.inner.read();
        let (entry, value) = inner.resolve(key)?;
        if entry.kind != EntryKind::SelectIndex {
            return None;
        }
        value.parse().ok()
    }

    /// Selected token of a SelectIndex entry.
    pub fn get_selected_token(&self, key: &str) -> Option<String> {
        let inner = self.inner.read();
        let (entry, value) = inner.resolve(key)?;
        entry.token_at(value).map(str::to_string)
    }

    /// Declared keys in declaration order.
    pub fn get_all_entries(&self) -> Vec<String> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|e| e.key.clone())
            .collect()
    }

    /// Copy of the declaration for `key`.
    pub fn entry(&self, key: &str) -> Option<ConfigEntry> {
        self.inner.read().entry(key).cloned()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load persisted values from the process-wide default directory.
    pub fn load(&self) -> Result<()> {
        self.load_from_dir(super::default_config_dir())
    }

    /// Persist current values to the process-wide default directory.
    pub fn save(&self) -> Result<()> {
        self.save_to_dir(super::default_config_dir())
    }

    /// Load persisted values from `dir`. A missing file is not an error.
    pub fn load_from_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        persist::load_from_dir(self, dir.as_ref())
    }

    /// Persist current values to `dir`, creating it if needed.
    pub fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        persist::save_to_dir(self, dir.as_ref())
    }

    pub(crate) fn codec(&self) -> &EntryCodec {
        &self.codec
    }

    pub(crate) fn io_guard(&self) -> MutexGuard<'_, ()> {
        self.io_lock.lock()
    }

    /// Apply persisted pairs under one write lock. Unknown keys are skipped;
    /// `decode` may drop a raw value by returning `None`. Returns how many
    /// values were committed.
    pub(crate) fn apply_persisted<F>(&self, pairs: Vec<(String, String)>, decode: F) -> usize
    where
        F: Fn(&ConfigEntry, &str) -> Option<String>,
    {
        let mut inner = self.inner.write();
        let mut applied = 0;

        for (key, raw) in pairs {
            let Some(value) = inner.entry(&key).and_then(|entry| decode(entry, &raw)) else {
                debug!(provider = %self.owner, key = %key, "Skipped persisted setting");
                continue;
            };
            if inner.apply_stored(&key, &value) {
                applied += 1;
            } else {
                debug!(provider = %self.owner, key = %key, "Persisted value failed validation");
            }
        }

        applied
    }

    /// Entries that currently hold an explicit value, with that value, in
    /// declaration order.
    pub(crate) fn explicit_values(&self) -> Vec<(ConfigEntry, String)> {
        let inner = self.inner.read();
        inner
            .entries
            .iter()
            .filter_map(|entry| {
                let value = inner.values.get(&entry.key)?;
                Some((entry.clone(), value.clone()))
            })
            .collect()
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ConfigStore")
            .field("owner", &self.owner)
            .field("entries", &inner.entries.len())
            .field("values", &inner.values.len())
            .finish()
    }
}

/// One `key=value` line per declared entry; encrypted values are masked.
impl fmt::Display for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        writeln!(f, "[{}]", self.owner)?;
        for entry in &inner.entries {
            let value = inner
                .resolve(&entry.key)
                .map(|(_, v)| v)
                .unwrap_or_default();
            if entry.is_encrypted() {
                writeln!(f, "{}=********", entry.key)?;
            } else {
                writeln!(f, "{}={}", entry.key, value)?;
            }
        }
        Ok(())
    }
}
