use std::path::{Path, PathBuf};

use crate::exclusions::ExclusionSettings;
use crate::locale::LocaleStore;
use crate::storage::{JsonFileStore, KeyValueStore, StorageError};
use crate::theme::{Theme, ThemeStore};

pub const SETTINGS_DIR: &str = ".textmerger";
pub const SETTINGS_FILE: &str = "settings.json";
pub const LANGS_DIR: &str = "langs";

/// 工作區設定檔路徑。 / Location of the settings file inside a workspace.
pub fn settings_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(SETTINGS_DIR).join(SETTINGS_FILE)
}

/// 額外翻譯目錄路徑。 / Directory holding user supplied `<code>.json` catalogs.
pub fn langs_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(SETTINGS_DIR).join(LANGS_DIR)
}

/// 主題、語言與排除樣式的統一入口。 / Theme, language and exclusion mirrors sharing one backing store.
#[derive(Debug)]
pub struct Settings<S: KeyValueStore> {
    store: S,
    theme: ThemeStore,
    locale: LocaleStore,
    exclusions: ExclusionSettings,
}

impl Settings<JsonFileStore> {
    /// 開啟工作區下的設定檔。 / Opens `<workspace>/.textmerger/settings.json`.
    pub fn open_workspace(workspace_root: &Path) -> Result<Self, StorageError> {
        Ok(Self::load(JsonFileStore::open(settings_path(workspace_root))?))
    }
}

impl<S: KeyValueStore> Settings<S> {
    pub fn load(store: S) -> Self {
        let theme = ThemeStore::load(&store);
        let locale = LocaleStore::load(&store);
        let exclusions = ExclusionSettings::load(&store);
        Self {
            store,
            theme,
            locale,
            exclusions,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn language(&self) -> &str {
        self.locale.language()
    }

    pub fn excluded_patterns(&self) -> &[String] {
        self.exclusions.patterns()
    }

    pub fn theme_store(&mut self) -> &mut ThemeStore {
        &mut self.theme
    }

    pub fn locale_store(&mut self) -> &mut LocaleStore {
        &mut self.locale
    }

    pub fn exclusion_settings(&mut self) -> &mut ExclusionSettings {
        &mut self.exclusions
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StorageError> {
        self.theme.set_theme(&mut self.store, theme)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, StorageError> {
        self.theme.toggle(&mut self.store)
    }

    pub fn set_language(&mut self, code: &str) -> Result<(), StorageError> {
        self.locale.set(&mut self.store, code)
    }

    pub fn toggle_language(&mut self) -> Result<String, StorageError> {
        self.locale.toggle(&mut self.store)
    }

    pub fn add_pattern(&mut self, pattern: &str) -> Result<bool, StorageError> {
        self.exclusions.add_pattern(&mut self.store, pattern)
    }

    pub fn remove_pattern(&mut self, pattern: &str) -> Result<bool, StorageError> {
        self.exclusions.remove_pattern(&mut self.store, pattern)
    }

    pub fn reset_patterns(&mut self) -> Result<(), StorageError> {
        self.exclusions.reset(&mut self.store)
    }
}
