use serde::{Deserialize, Serialize};

/// 分頁中追蹤的單一檔案參照。 / Immutable reference to one file tracked by a tab.
///
/// `path` is the identity key inside a tab; the remaining fields are display
/// metadata captured when the file was scanned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    pub path: String,
    pub name: String,
    /// 字元數（Unicode 純量值，而非位元組）。 / Characters of decoded text, counted as Unicode
    /// scalar values. Earlier TextMerger releases stored the UTF-8 byte length here.
    #[serde(default)]
    pub char_count: usize,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub extension: String,
}

impl FileRef {
    /// 以路徑與顯示名稱建立參照。 / Creates a reference with zeroed counters.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            char_count: 0,
            size_bytes: 0,
            extension: String::new(),
        }
    }

    /// 依路徑最後一段推導名稱與副檔名。 / Derives name and extension from the last path segment.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .rsplit(|ch| ch == '/' || ch == '\\')
            .next()
            .unwrap_or_default()
            .to_string();
        let extension = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_string(),
            _ => String::new(),
        };
        Self {
            path,
            name,
            char_count: 0,
            size_bytes: 0,
            extension,
        }
    }

    pub fn with_counts(mut self, char_count: usize, size_bytes: u64) -> Self {
        self.char_count = char_count;
        self.size_bytes = size_bytes;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}
