pub mod exclusions;
pub mod locale;
pub mod settings;
pub mod storage;
pub mod theme;
pub mod translations;

pub use exclusions::{
    default_patterns, ExclusionSettings, DEFAULT_EXCLUDED_PATTERNS, EXCLUDED_PATTERNS_KEY,
};
pub use locale::{is_supported, LocaleStore, DEFAULT_LANGUAGE, LANGUAGE_KEY, SUPPORTED_LANGUAGES};
pub use settings::{langs_dir, settings_path, Settings, SETTINGS_DIR, SETTINGS_FILE};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
pub use theme::{ParseThemeError, Theme, ThemeStore, THEME_KEY};
pub use translations::{TranslationError, Translator};
