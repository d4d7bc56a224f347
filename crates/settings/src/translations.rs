use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

use crate::locale::DEFAULT_LANGUAGE;

const BUILTIN_EN: &str = r#"{
  "app": { "title": "TextMerger" },
  "tabs": {
    "new": "New tab",
    "close": "Close tab",
    "rename": "Rename tab",
    "unite": "Unite tabs",
    "empty": "No files in this tab"
  },
  "files": {
    "count": "Files",
    "chars": "Characters",
    "remove": "Remove file",
    "copy": "Copy merged text"
  },
  "settings": {
    "theme": "Theme",
    "language": "Language",
    "exclusions": "Excluded patterns",
    "reset": "Reset to defaults"
  },
  "errors": {
    "binary": "Binary file skipped",
    "too_large": "File too large",
    "encoding": "Unsupported text encoding"
  }
}"#;

const BUILTIN_IT: &str = r#"{
  "app": { "title": "TextMerger" },
  "tabs": {
    "new": "Nuova scheda",
    "close": "Chiudi scheda",
    "rename": "Rinomina scheda",
    "unite": "Unisci schede",
    "empty": "Nessun file in questa scheda"
  },
  "files": {
    "count": "File",
    "chars": "Caratteri",
    "remove": "Rimuovi file",
    "copy": "Copia testo unito"
  },
  "settings": {
    "theme": "Tema",
    "language": "Lingua",
    "exclusions": "Modelli esclusi",
    "reset": "Ripristina predefiniti"
  },
  "errors": {
    "binary": "File binario ignorato",
    "too_large": "File troppo grande",
    "encoding": "Codifica del testo non supportata"
  }
}"#;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("failed to enumerate translation directory {0}: {1}")]
    ReadDir(PathBuf, io::Error),
    #[error("failed to read translation file {0}: {1}")]
    ReadFile(PathBuf, io::Error),
    #[error("failed to parse translation file {0}: {1}")]
    ParseFile(PathBuf, serde_json::Error),
    #[error("translation file {0} must contain a JSON object")]
    NotAnObject(PathBuf),
}

/// 介面字串目錄。 / Nested string catalogs keyed by language code.
#[derive(Debug, Clone)]
pub struct Translator {
    catalogs: BTreeMap<String, Value>,
    active: String,
}

impl Translator {
    /// 以內建的英文與義大利文目錄建立。 / Builds a translator from the embedded catalogs.
    pub fn builtin() -> Self {
        let mut catalogs = BTreeMap::new();
        for (code, source) in [("en", BUILTIN_EN), ("it", BUILTIN_IT)] {
            match serde_json::from_str::<Value>(source) {
                Ok(value) => {
                    catalogs.insert(code.to_string(), value);
                }
                Err(err) => warn!("embedded catalog `{code}` is invalid: {err}"),
            }
        }
        Self {
            catalogs,
            active: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// 從目錄載入 `<code>.json` 檔案，覆蓋內建目錄。 / Loads `<code>.json` files on top of the builtin catalogs.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, TranslationError> {
        let dir = dir.as_ref();
        let mut translator = Self::builtin();
        let entries =
            fs::read_dir(dir).map_err(|err| TranslationError::ReadDir(dir.to_path_buf(), err))?;
        for entry in entries {
            let entry = entry.map_err(|err| TranslationError::ReadDir(dir.to_path_buf(), err))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(code) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let contents = fs::read_to_string(&path)
                .map_err(|err| TranslationError::ReadFile(path.clone(), err))?;
            let value: Value = serde_json::from_str(&contents)
                .map_err(|err| TranslationError::ParseFile(path.clone(), err))?;
            if !value.is_object() {
                return Err(TranslationError::NotAnObject(path));
            }
            debug!("loaded translations for `{code}` from {}", path.display());
            translator.catalogs.insert(code.to_string(), value);
        }
        Ok(translator)
    }

    pub fn languages(&self) -> Vec<&str> {
        self.catalogs.keys().map(String::as_str).collect()
    }

    pub fn active_language(&self) -> &str {
        &self.active
    }

    /// 切換語言；未知代碼回傳 `false`。 / Switches the active catalog, returning `false` for unknown codes.
    pub fn set_language(&mut self, code: &str) -> bool {
        if self.catalogs.contains_key(code) {
            self.active = code.to_string();
            true
        } else {
            false
        }
    }

    /// Looks up a dotted key such as `tabs.new`; missing entries yield the key itself.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        let Some(mut node) = self.catalogs.get(&self.active) else {
            return key;
        };
        for segment in key.split('.') {
            match node.get(segment) {
                Some(next) => node = next,
                None => return key,
            }
        }
        match node.as_str() {
            Some(text) if !text.is_empty() => text,
            _ => key,
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn looks_up_nested_keys() {
        let mut translator = Translator::builtin();
        assert_eq!(translator.text("tabs.new"), "New tab");
        assert!(translator.set_language("it"));
        assert_eq!(translator.text("tabs.new"), "Nuova scheda");
    }

    #[test]
    fn missing_or_partial_keys_return_the_key() {
        let translator = Translator::builtin();
        assert_eq!(translator.text("tabs.unknown"), "tabs.unknown");
        assert_eq!(translator.text("tabs"), "tabs");
        assert_eq!(translator.text(""), "");
    }

    #[test]
    fn unknown_language_is_rejected() {
        let mut translator = Translator::builtin();
        assert!(!translator.set_language("xx"));
        assert_eq!(translator.active_language(), "en");
    }

    #[test]
    fn directory_catalogs_extend_builtin() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("fr.json"), r#"{"tabs":{"new":"Nouvel onglet"}}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut translator = Translator::load_from_dir(dir.path()).unwrap();
        assert_eq!(translator.languages(), vec!["en", "fr", "it"]);
        assert!(translator.set_language("fr"));
        assert_eq!(translator.text("tabs.new"), "Nouvel onglet");
        assert_eq!(translator.text("tabs.close"), "tabs.close");
    }

    #[test]
    fn invalid_catalog_is_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("de.json"), "{ broken").unwrap();
        assert!(matches!(
            Translator::load_from_dir(dir.path()),
            Err(TranslationError::ParseFile(..))
        ));

        fs::write(dir.path().join("de.json"), "[1]").unwrap();
        assert!(matches!(
            Translator::load_from_dir(dir.path()),
            Err(TranslationError::NotAnObject(..))
        ));
    }
}
