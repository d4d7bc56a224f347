use log::debug;
use textmerger_core::{Subscribers, SubscriptionId};

use crate::storage::{KeyValueStore, StorageError};

pub const LANGUAGE_KEY: &str = "language";
pub const DEFAULT_LANGUAGE: &str = "en";
/// 內建支援的語言代碼。 / Language codes shipped with the application.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "it", "es", "fr", "de"];

/// 介面語言設定的鏡像。 / Mirror of the persisted interface language.
#[derive(Debug)]
pub struct LocaleStore {
    language: String,
    subscribers: Subscribers<String>,
}

impl LocaleStore {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let language = store
            .get(LANGUAGE_KEY)
            .map(|raw| raw.trim().to_string())
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        Self {
            language,
            subscribers: Subscribers::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// 設定語言並寫回儲存。 / Sets and persists the language code.
    pub fn set<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        code: &str,
    ) -> Result<(), StorageError> {
        let code = code.trim();
        store.set(LANGUAGE_KEY, code)?;
        debug!("language set to {code}");
        self.language = code.to_string();
        self.subscribers.notify(&self.language);
        Ok(())
    }

    /// 在英文與義大利文之間切換。 / Switches between English and Italian.
    ///
    /// Any language other than English toggles back to English.
    pub fn toggle<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<String, StorageError> {
        let next = if self.language == "en" { "it" } else { "en" };
        self.set(store, next)?;
        Ok(next.to_string())
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&String) + 'static,
    {
        self.subscribers.subscribe(&self.language, observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}
