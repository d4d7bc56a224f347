use std::fs;

use pretty_assertions::assert_eq;
use tempfile::tempdir;
use textmerger_settings::{
    default_patterns, settings_path, JsonFileStore, KeyValueStore, Settings, Theme,
    EXCLUDED_PATTERNS_KEY, LANGUAGE_KEY, THEME_KEY,
};

#[test]
fn fresh_workspace_uses_defaults() {
    let temp = tempdir().expect("tempdir");

    let settings = Settings::open_workspace(temp.path()).expect("open");
    assert_eq!(settings.theme(), Theme::Dark);
    assert_eq!(settings.language(), "en");
    assert_eq!(settings.excluded_patterns(), default_patterns().as_slice());
    assert!(!settings_path(temp.path()).exists());
}

#[test]
fn changes_survive_a_reload() {
    let temp = tempdir().expect("tempdir");

    {
        let mut settings = Settings::open_workspace(temp.path()).expect("open");
        settings.toggle_theme().expect("theme");
        settings.toggle_language().expect("language");
        settings.add_pattern("*.log").expect("add");
        settings.remove_pattern("target").expect("remove");
    }

    let settings = Settings::open_workspace(temp.path()).expect("reload");
    assert_eq!(settings.theme(), Theme::Light);
    assert_eq!(settings.language(), "it");
    assert!(settings.excluded_patterns().iter().any(|p| p == "*.log"));
    assert!(!settings.excluded_patterns().iter().any(|p| p == "target"));
}

#[test]
fn settings_file_uses_documented_keys() {
    let temp = tempdir().expect("tempdir");
    let mut settings = Settings::open_workspace(temp.path()).expect("open");
    settings.set_theme(Theme::Light).expect("theme");
    settings.set_language("fr").expect("language");
    settings.reset_patterns().expect("reset");

    let raw = fs::read_to_string(settings_path(temp.path())).expect("read");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value[THEME_KEY], "light");
    assert_eq!(value[LANGUAGE_KEY], "fr");
    let patterns: Vec<String> =
        serde_json::from_str(value[EXCLUDED_PATTERNS_KEY].as_str().expect("string"))
            .expect("array");
    assert_eq!(patterns, default_patterns());
}

#[test]
fn corrupt_values_fall_back_to_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = settings_path(temp.path());
    {
        let mut store = JsonFileStore::open(&path).expect("open");
        store.set(THEME_KEY, "neon").expect("set");
        store.set(EXCLUDED_PATTERNS_KEY, "not a list").expect("set");
    }

    let settings = Settings::load(JsonFileStore::open(&path).expect("reopen"));
    assert_eq!(settings.theme(), Theme::Dark);
    assert_eq!(settings.excluded_patterns(), default_patterns().as_slice());
}
