use log::{debug, warn};
use textmerger_core::{Subscribers, SubscriptionId};

use crate::storage::{KeyValueStore, StorageError};

pub const EXCLUDED_PATTERNS_KEY: &str = "excludedPatterns";

/// 預設排除的名稱樣式。 / Names skipped during scanning unless the user changes the list.
pub const DEFAULT_EXCLUDED_PATTERNS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".DS_Store",
    "Thumbs.db",
    "node_modules",
    "__pycache__",
    ".venv",
    ".env",
    ".vscode",
    ".idea",
    "dist",
    "build",
    "target",
    "*.meta",
    "*.pyc",
    "*.pyo",
    "*.exe",
    "*.dll",
    "*.so",
    "*.dylib",
    "*.class",
    "*.jar",
    "*.war",
    "*.ear",
    "*.zip",
    "*.tar",
    "*.gz",
    "*.rar",
    "*.7z",
    "*.iso",
    "*.img",
    "*.dmg",
];

pub fn default_patterns() -> Vec<String> {
    DEFAULT_EXCLUDED_PATTERNS
        .iter()
        .map(|pattern| pattern.to_string())
        .collect()
}

/// 掃描排除樣式清單的鏡像。 / Mirror of the persisted exclusion pattern list.
#[derive(Debug)]
pub struct ExclusionSettings {
    patterns: Vec<String>,
    subscribers: Subscribers<Vec<String>>,
}

impl ExclusionSettings {
    /// 載入樣式；缺少或無法解析時使用預設值。 / Loads patterns, using the defaults when unset or unparsable.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let patterns = match store.get(EXCLUDED_PATTERNS_KEY) {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|err| {
                warn!("stored exclusion patterns are invalid, using defaults: {err}");
                default_patterns()
            }),
            None => default_patterns(),
        };
        Self {
            patterns,
            subscribers: Subscribers::new(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// 新增樣式；空白或重複者略過並回傳 `false`。 / Appends a pattern; blank or duplicate patterns are ignored.
    pub fn add_pattern<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        pattern: &str,
    ) -> Result<bool, StorageError> {
        let pattern = pattern.trim();
        if pattern.is_empty() || self.patterns.iter().any(|existing| existing == pattern) {
            return Ok(false);
        }
        let mut next = self.patterns.clone();
        next.push(pattern.to_string());
        self.install(store, next)?;
        Ok(true)
    }

    /// 移除所有相同的樣式。 / Removes every entry equal to `pattern`.
    pub fn remove_pattern<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        pattern: &str,
    ) -> Result<bool, StorageError> {
        let next: Vec<String> = self
            .patterns
            .iter()
            .filter(|existing| existing.as_str() != pattern)
            .cloned()
            .collect();
        if next.len() == self.patterns.len() {
            return Ok(false);
        }
        self.install(store, next)?;
        Ok(true)
    }

    pub fn reset<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StorageError> {
        self.install(store, default_patterns())
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Vec<String>) + 'static,
    {
        self.subscribers.subscribe(&self.patterns, observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn install<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        patterns: Vec<String>,
    ) -> Result<(), StorageError> {
        // Serializing a list of strings cannot fail.
        let payload = serde_json::to_string(&patterns).unwrap_or_else(|_| "[]".to_string());
        store.set(EXCLUDED_PATTERNS_KEY, &payload)?;
        debug!("{} exclusion pattern(s) stored", patterns.len());
        self.patterns = patterns;
        self.subscribers.notify(&self.patterns);
        Ok(())
    }
}
