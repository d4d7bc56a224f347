use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use textmerger_core::FileRef;
use walkdir::{DirEntry, WalkDir};

use crate::exclude::ExclusionMatcher;
use crate::reader::read_file;

/// 掃描結果：成功的檔案與錯誤訊息。 / Files that could be read plus one message per failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub files: Vec<FileRef>,
    pub errors: Vec<String>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.errors.is_empty()
    }
}

/// 展開路徑並讀取每個候選檔案。 / Expands directories and reads every candidate file.
///
/// Directories are walked recursively in file-name order. Entries whose name
/// is excluded or hidden are pruned, except the directory that was passed in.
/// Paths reached twice are only reported once. Candidates are read in
/// parallel and reported in discovery order.
pub fn scan_paths<P: AsRef<Path>>(paths: &[P], matcher: &ExclusionMatcher) -> ScanReport {
    let mut report = ScanReport::default();
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for path in paths {
        for candidate in expand(path.as_ref(), matcher, &mut report.errors) {
            if seen.insert(candidate.clone()) {
                candidates.push(candidate);
            }
        }
    }

    let results: Vec<Result<FileRef, String>> = candidates
        .into_par_iter()
        .map(|candidate| scan_file(&candidate))
        .collect();
    for result in results {
        match result {
            Ok(file) => report.files.push(file),
            Err(message) => {
                debug!("{message}");
                report.errors.push(message);
            }
        }
    }

    debug!(
        "scanned {} file(s), {} error(s)",
        report.files.len(),
        report.errors.len()
    );
    report
}

fn expand(path: &Path, matcher: &ExclusionMatcher, errors: &mut Vec<String>) -> Vec<PathBuf> {
    if !path.is_dir() {
        let excluded = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| matcher.is_excluded(name));
        if excluded {
            debug!("skipping excluded path {}", path.display());
            return Vec::new();
        }
        return vec![path.to_path_buf()];
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_pruned(entry, matcher));
    for entry in walker {
        match entry {
            Ok(entry) if entry.path().is_file() => found.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => errors.push(err.to_string()),
        }
    }
    found
}

fn is_pruned(entry: &DirEntry, matcher: &ExclusionMatcher) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || matcher.is_excluded(&name)
}

fn scan_file(path: &Path) -> Result<FileRef, String> {
    let text = read_file(path, false).map_err(|err| err.to_string())?;
    let display = path
        .to_str()
        .ok_or_else(|| format!("path is not valid UTF-8: {}", path.display()))?;
    let size_bytes = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
    Ok(FileRef::from_path(display).with_counts(text.chars().count(), size_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn hidden_root_is_still_walked() {
        let dir = tempdir().unwrap();
        let root = dir.path().join(".config");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.toml"), "x = 1").unwrap();

        let report = scan_paths(&[root], &ExclusionMatcher::empty());
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].name, "a.toml");
    }

    #[test]
    fn overlapping_inputs_report_each_file_once() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("one.txt");
        fs::write(&file, "1").unwrap();

        let report = scan_paths(&[dir.path().to_path_buf(), file], &ExclusionMatcher::empty());
        assert_eq!(report.files.len(), 1);
    }

    #[test]
    fn parallel_reads_keep_file_name_order() {
        let dir = tempdir().unwrap();
        for index in (0..40).rev() {
            fs::write(dir.path().join(format!("f{index:02}.txt")), "x".repeat(index)).unwrap();
        }

        let report = scan_paths(&[dir.path()], &ExclusionMatcher::empty());
        let names: Vec<String> = report.files.iter().map(|file| file.name.clone()).collect();
        let expected: Vec<String> = (0..40).map(|index| format!("f{index:02}.txt")).collect();
        assert_eq!(names, expected);
        assert_eq!(report.files[39].char_count, 39);
    }
}
