//! Default tab labels and the inference used when files land in a fresh tab.

use crate::file_ref::FileRef;

/// 自動命名的前綴。 / Prefix of generated tab names (`"Tab 3"`).
pub const AUTO_NAME_PREFIX: &str = "Tab ";

/// 產生第 n 個分頁的預設名稱。 / Builds the generated name for the given ordinal.
pub fn auto_name(ordinal: usize) -> String {
    format!("{AUTO_NAME_PREFIX}{ordinal}")
}

/// 判斷名稱是否仍為自動產生的格式。 / Returns `true` for names of the form `"Tab "` + digits.
pub fn is_auto_name(name: &str) -> bool {
    name.strip_prefix(AUTO_NAME_PREFIX)
        .map(|digits| !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()))
        .unwrap_or(false)
}

/// 依新增的檔案推導分頁名稱。 / Infers a tab label from the files that were just added.
///
/// A single file names the tab after itself. Several files name it after the
/// last path segment they all share positionally; when nothing is shared, or
/// the shared segment is empty (e.g. only the leading separator matches), the
/// first file's name is used instead.
pub fn infer_tab_name(files: &[FileRef]) -> Option<String> {
    let (first, rest) = files.split_first()?;
    if rest.is_empty() {
        return Some(first.name.clone());
    }

    let first_segments: Vec<&str> = path_segments(&first.path).collect();
    let common = rest.iter().fold(first_segments.len(), |common, file| {
        path_segments(&file.path)
            .zip(&first_segments[..common])
            .take_while(|(segment, expected)| segment == *expected)
            .count()
    });

    match common.checked_sub(1).map(|last| first_segments[last]) {
        Some(segment) if !segment.is_empty() => Some(segment.to_string()),
        _ => Some(first.name.clone()),
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> + '_ {
    path.split(|ch| ch == '/' || ch == '\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> FileRef {
        FileRef::from_path(path)
    }

    #[test]
    fn auto_name_pattern() {
        assert!(is_auto_name("Tab 1"));
        assert!(is_auto_name("Tab 42"));
        assert!(is_auto_name(&auto_name(7)));
        assert!(!is_auto_name("Tab "));
        assert!(!is_auto_name("Tab 1a"));
        assert!(!is_auto_name("tab 1"));
        assert!(!is_auto_name("Notes"));
    }

    #[test]
    fn single_file_uses_its_name() {
        let name = infer_tab_name(&[FileRef::new("/a/b/x.txt", "x.txt")]);
        assert_eq!(name.as_deref(), Some("x.txt"));
    }

    #[test]
    fn shared_directory_names_the_tab() {
        let name = infer_tab_name(&[file("/a/b/x.txt"), file("/a/b/y.txt")]);
        assert_eq!(name.as_deref(), Some("b"));
    }

    #[test]
    fn common_run_is_shortest_across_all_files() {
        let name = infer_tab_name(&[
            file("/repo/src/core/a.rs"),
            file("/repo/src/core/b.rs"),
            file("/repo/src/c.rs"),
        ]);
        assert_eq!(name.as_deref(), Some("src"));
    }

    #[test]
    fn mixed_separators_are_split_alike() {
        let name = infer_tab_name(&[file(r"C:\work\proj\a.txt"), file("C:/work/proj/b.txt")]);
        assert_eq!(name.as_deref(), Some("proj"));
    }

    #[test]
    fn empty_shared_segment_falls_back_to_first_name() {
        let name = infer_tab_name(&[file("/alpha/x.txt"), file("/beta/y.txt")]);
        assert_eq!(name.as_deref(), Some("x.txt"));
    }

    #[test]
    fn nothing_shared_falls_back_to_first_name() {
        let name = infer_tab_name(&[file("alpha/x.txt"), file("beta/y.txt")]);
        assert_eq!(name.as_deref(), Some("x.txt"));
    }

    #[test]
    fn empty_batch_has_no_name() {
        assert_eq!(infer_tab_name(&[]), None);
    }
}
