//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which owns a temporary settings directory, and
//! [`sample_provider`], which declares the settings used across the suites.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Once;

use scraper_config::ProviderInfo;
use tempfile::TempDir;

pub const ISO_CODES: &str =
    "bg|cs|da|de|el|en|es|fi|fr|he|hr|hu|it|ja|ko|nb|nl|no|pl|pt|ro|ru|sk|sl|sr|sv|th|tr|uk|zh";

static TRACING: Once = Once::new();

/// Install a test-writer tracing subscriber once per test binary.
/// Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Temporary settings directory, removed on drop.
pub struct TestHarness {
    pub dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the settings file for `provider_id`.
    pub fn settings_file(&self, provider_id: &str) -> PathBuf {
        scraper_config::config::persist::settings_path(self.path(), provider_id)
    }

    /// Write a raw settings file for `provider_id`.
    pub fn write_settings(&self, provider_id: &str, content: &str) {
        std::fs::write(self.settings_file(provider_id), content)
            .expect("failed to write settings file");
    }

    pub fn read_settings(&self, provider_id: &str) -> String {
        std::fs::read_to_string(self.settings_file(provider_id))
            .expect("failed to read settings file")
    }
}

/// A provider declaring one setting of every kind.
pub fn sample_provider(id: &str) -> ProviderInfo {
    let mpi = ProviderInfo::new(id, "name", "description");
    let config = mpi.config();
    config.add_boolean("filterUnwantedCategories", false);
    config.add_boolean("useTmdb", false);
    config.add_boolean("scrapeCollectionInfo", true);
    config.add_boolean("someBool", true);
    config.add_text("someInput", "none");
    config.add_select("language", &["aa", "bb", "cc", "dd", "ee"], "dd");
    let codes: Vec<&str> = ISO_CODES.split('|').collect();
    config.add_select_index("languageInt", &codes, "en");
    config.add_encrypted_text("encrypted", "This is some encrypted text");
    mpi
}
