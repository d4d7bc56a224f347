use globset::{Glob, GlobSet, GlobSetBuilder};
use log::warn;

/// 以 glob 樣式比對檔名。 / Matches single file or directory names against glob patterns.
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    set: GlobSet,
    patterns: Vec<String>,
}

impl ExclusionMatcher {
    /// 編譯樣式；無效者略過並記錄警告。 / Compiles the patterns, skipping invalid ones with a warning.
    pub fn new<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut accepted = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    accepted.push(pattern.to_string());
                }
                Err(err) => warn!("skipping exclusion pattern `{pattern}`: {err}"),
            }
        }
        let set = builder.build().unwrap_or_else(|err| {
            warn!("exclusion patterns could not be combined: {err}");
            GlobSet::empty()
        });
        Self {
            set,
            patterns: accepted,
        }
    }

    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    /// Patterns that compiled successfully, in input order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for ExclusionMatcher {
    fn default() -> Self {
        Self::empty()
    }
}
