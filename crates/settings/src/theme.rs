use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use textmerger_core::{Subscribers, SubscriptionId};
use thiserror::Error;

use crate::storage::{KeyValueStore, StorageError};

pub const THEME_KEY: &str = "textmerger_theme";

/// 介面主題。 / Colour scheme of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown theme `{0}` (expected `light` or `dark`)")]
pub struct ParseThemeError(String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

/// 主題設定的鏡像。 / Mirror of the persisted theme value.
#[derive(Debug, Default)]
pub struct ThemeStore {
    theme: Theme,
    subscribers: Subscribers<Theme>,
}

impl ThemeStore {
    /// 從鍵值儲存載入；無效值回退為深色。 / Loads the theme, falling back to dark on missing or unknown values.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let theme = match store.get(THEME_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!("ignoring stored theme: {err}");
                Theme::default()
            }),
            None => Theme::default(),
        };
        Self {
            theme,
            subscribers: Subscribers::new(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        theme: Theme,
    ) -> Result<(), StorageError> {
        store.set(THEME_KEY, theme.as_str())?;
        debug!("theme set to {theme}");
        self.theme = theme;
        self.subscribers.notify(&self.theme);
        Ok(())
    }

    /// 切換深淺色並回傳新值。 / Flips between light and dark, returning the new theme.
    pub fn toggle<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<Theme, StorageError> {
        let next = self.theme.toggled();
        self.set_theme(store, next)?;
        Ok(next)
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Theme) + 'static,
    {
        self.subscribers.subscribe(&self.theme, observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_to_dark() {
        let store = MemoryStore::new();
        assert_eq!(ThemeStore::load(&store).theme(), Theme::Dark);
    }

    #[test]
    fn unknown_stored_value_falls_back() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(ThemeStore::load(&store).theme(), Theme::Dark);
    }

    #[test]
    fn toggle_persists() {
        let mut store = MemoryStore::new();
        let mut theme = ThemeStore::load(&store);
        assert_eq!(theme.toggle(&mut store).unwrap(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(theme.toggle(&mut store).unwrap(), Theme::Dark);
        assert_eq!(ThemeStore::load(&store).theme(), Theme::Dark);
    }
}
