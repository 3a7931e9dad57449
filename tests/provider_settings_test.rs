//! Provider settings integration tests.
//!
//! Walks a provider through declaration, loading an existing settings file,
//! runtime mutation with rejected values, and saving.

mod common;

use common::{sample_provider, TestHarness};
use scraper_config::{EntryCodec, ProviderInfo};

// ---------------------------------------------------------------------------
// Reference scenario
// ---------------------------------------------------------------------------

#[test]
fn get_settings() {
    let h = TestHarness::new();
    h.write_settings(
        "config",
        "# existing settings\nuseTmdb=true\nlanguage=cc\nunknownKey=whatever\n",
    );

    let mpi = sample_provider("config");
    let config = mpi.config();

    // Defaults.
    assert_eq!(config.get_value_as_bool("filterUnwantedCategories"), Some(false));
    assert_eq!(config.get_value_as_bool("useTmdb"), Some(false));
    assert_eq!(config.get_value_as_bool("scrapeCollectionInfo"), Some(true));
    assert_eq!(config.get_value("language"), "dd");
    assert_eq!(config.get_value("languageInt"), "5");

    config.load_from_dir(h.path()).unwrap();
    assert_eq!(config.get_value("language"), "cc");
    assert_eq!(config.get_value("unknownKey"), "");

    config.set_bool("someBool", false);
    assert_eq!(config.get_value_as_bool("someBool"), Some(false));

    config.set_value("language", "bb");
    assert_eq!(config.get_value("language"), "bb");
    config.set_value("language", "ff");
    assert_eq!(config.get_value("language"), "bb");

    config.set_value("languageInt", "de");
    assert_eq!(config.get_value("languageInt"), "3");
    config.set_value("languageInt", "unknown");
    assert_eq!(config.get_value("languageInt"), "3");

    assert_eq!(config.get_value_as_bool("languageInt"), None);
    assert_eq!(config.get_value_as_bool("useTmdb"), Some(true));
    assert_eq!(config.get_value("encrypted"), "This is some encrypted text");

    let rendered = config.to_string();
    for key in config.get_all_entries() {
        assert!(rendered.contains(&format!("{key}=")));
    }

    config.save_to_dir(h.path()).unwrap();
    let written = h.read_settings("config");
    assert!(written.lines().any(|l| l == "languageInt=3"));
    assert!(written.lines().any(|l| l == "someBool=false"));
    assert!(!written.contains("unknownKey"));
}

#[test]
fn invalid_defaults() {
    let mpi = ProviderInfo::new("save", "name", "description");
    let config = mpi.config();
    config.add_boolean("bool1", false);
    config.add_text("someInput", "none");
    config.add_select("language", &["aa", "bb", "cc", "dd", "ee"], "dd");
    config.add_select_index("languageInt", &["bg", "cs", "da", "de", "el", "en", "es"], "en");

    config.add_select("invalid", &["aa", "bb", "cc", "dd", "ee"], "invalidEntry");
    config.add_select_index(
        "invalidInt",
        &["bg", "cs", "da", "de", "el", "en", "es"],
        "invalidEntry",
    );

    assert_eq!(config.get_value("invalid"), "");
    assert_eq!(config.get_value_as_bool("invalid"), None);
    assert_eq!(config.get_value("invalidInt"), "");
}

#[test]
fn empty_settings_load_save() {
    let h = TestHarness::new();
    let mpi = ProviderInfo::new("asdfasdf", "name", "description");

    mpi.config().load_from_dir(h.path()).unwrap();
    assert!(!h.settings_file("asdfasdf").exists());

    mpi.config().save_to_dir(h.path()).unwrap();
    assert!(h.settings_file("asdfasdf").exists());
}

#[test]
fn unknown_config_load_save() {
    let h = TestHarness::new();
    let mpi = ProviderInfo::new("asdfasdf", "name", "description");
    mpi.config().add_text("language", "de");

    mpi.config().load_from_dir(h.path()).unwrap();
    mpi.config().save_to_dir(h.path()).unwrap();
    assert_eq!(mpi.config().get_value("language"), "de");
}

#[test]
fn get_unknown_value() {
    let h = TestHarness::new();
    h.write_settings("config", "useTmdb=true\n");
    let mpi = ProviderInfo::new("config", "name", "description");
    mpi.config().load_from_dir(h.path()).unwrap();

    assert_eq!(mpi.config().get_value("asdfasdfasdfasdf"), "");
    assert_eq!(mpi.config().get_value_as_bool("sdfgsdfgsdfg"), None);
    // Undeclared keys in the file are not adopted.
    assert_eq!(mpi.config().get_value("useTmdb"), "");
}

#[test]
fn set_not_available_config() {
    let mpi = ProviderInfo::new("asdfasdf", "name", "description");
    mpi.config().set_value("language", "de");
    assert_eq!(mpi.config().get_value("language"), "");
    assert!(mpi.config().get_all_entries().is_empty());
}

// ---------------------------------------------------------------------------
// Loading clamps bad persisted data
// ---------------------------------------------------------------------------

#[test]
fn malformed_values_in_file_are_clamped() {
    let h = TestHarness::new();
    h.write_settings(
        "clamp",
        "useTmdb=maybe\nlanguage=zz\nlanguageInt=99\nsomeInput\nencrypted=not-a-secret\n",
    );

    let mpi = sample_provider("clamp");
    mpi.config().load_from_dir(h.path()).unwrap();

    assert_eq!(mpi.config().get_value_as_bool("useTmdb"), Some(false));
    assert_eq!(mpi.config().get_value("language"), "dd");
    assert_eq!(mpi.config().get_value("languageInt"), "5");
    assert_eq!(mpi.config().get_value("someInput"), "none");
    assert_eq!(mpi.config().get_value("encrypted"), "This is some encrypted text");
}

#[test]
fn load_keeps_values_set_before_loading_when_file_is_silent() {
    let h = TestHarness::new();
    h.write_settings("partial", "language=ee\n");

    let mpi = sample_provider("partial");
    mpi.config().set_value("someInput", "typed-before-load");
    mpi.config().load_from_dir(h.path()).unwrap();

    assert_eq!(mpi.config().get_value("someInput"), "typed-before-load");
    assert_eq!(mpi.config().get_value("language"), "ee");
}

#[test]
fn select_index_loads_from_persisted_index() {
    let h = TestHarness::new();
    h.write_settings("idx", "languageInt=29\n");

    let mpi = sample_provider("idx");
    mpi.config().load_from_dir(h.path()).unwrap();

    assert_eq!(mpi.config().get_value("languageInt"), "29");
    assert_eq!(mpi.config().get_selected_token("languageInt").as_deref(), Some("zh"));
}

#[test]
fn encrypted_value_written_by_another_secret_falls_back() {
    let h = TestHarness::new();
    let stored = EntryCodec::new("someone else").encode("leaked");
    h.write_settings("enc", &format!("encrypted={stored}\n"));

    let mpi = sample_provider("enc");
    mpi.config().load_from_dir(h.path()).unwrap();
    assert_eq!(mpi.config().get_value("encrypted"), "This is some encrypted text");
}
