use std::path::Path;

use html_escape::{encode_single_quoted_attribute, encode_text};
use rayon::prelude::*;
use textmerger_core::Tab;

use crate::reader::read_file;
use crate::DASH_LINE;

/// 合併輸出格式。 / Output flavour of a merged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeFormat {
    #[default]
    Text,
    Html,
}

/// 依序讀取並串接檔案內容。 / Reads the files in order and concatenates them with path headers.
///
/// Files are read in parallel; blocks keep the order of `paths`. A file that
/// cannot be read becomes an inline error block and the rest of the output is
/// still produced.
pub fn render_merged<P>(paths: &[P], show_outputs: bool, format: MergeFormat) -> String
where
    P: AsRef<Path> + Sync,
{
    let blocks: Vec<String> = paths
        .par_iter()
        .enumerate()
        .map(|(index, path)| render_block(index, path.as_ref(), show_outputs, format))
        .collect();
    match format {
        MergeFormat::Text => blocks.concat(),
        MergeFormat::Html => blocks.join("\n"),
    }
}

/// Merges the files of a tab in tab order.
pub fn render_tab(tab: &Tab, show_outputs: bool, format: MergeFormat) -> String {
    let paths: Vec<&str> = tab.files.iter().map(|file| file.path.as_str()).collect();
    render_merged(&paths, show_outputs, format)
}

fn render_block(index: usize, path: &Path, show_outputs: bool, format: MergeFormat) -> String {
    let shown = path.display().to_string();
    let content = read_file(path, show_outputs);
    match (format, content) {
        (MergeFormat::Text, Ok(text)) => text_block(&shown, &text),
        (MergeFormat::Text, Err(err)) => text_block(&shown, &format!("Error reading {shown}: {err}")),
        (MergeFormat::Html, Ok(text)) => {
            let extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or_default();
            format!(
                "<div id='file-{index}' class='file-header' data-path='{attr}'>\n{DASH_LINE}\n{label}\n{DASH_LINE}\n</div>\n<pre><code class='language-{ext}'>{body}</code></pre>\n<hr/>\n",
                attr = encode_single_quoted_attribute(&shown),
                label = encode_text(&shown),
                ext = encode_single_quoted_attribute(extension),
                body = encode_text(&text),
            )
        }
        (MergeFormat::Html, Err(err)) => format!(
            "<div class='error'>Error reading {}: {}</div>\n",
            encode_text(&shown),
            encode_text(&err.to_string())
        ),
    }
}

fn text_block(path: &str, body: &str) -> String {
    let mut block = format!("{DASH_LINE}\n{path}\n{DASH_LINE}\n{body}");
    if !block.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(DASH_LINE);
    block.push_str("\n\n");
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_block_escapes_body_and_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("it's.html");
        std::fs::write(&path, r#"<a href="x">&</a>"#).unwrap();

        let block = render_block(3, &path, false, MergeFormat::Html);
        assert!(block.starts_with("<div id='file-3' class='file-header' data-path='"));
        assert!(block.contains("it&#x27;s.html'>\n"));
        assert!(block.contains(
            "<code class='language-html'>&lt;a href=\"x\"&gt;&amp;&lt;/a&gt;</code>"
        ));
    }

    #[test]
    fn parallel_merge_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (0..32)
            .map(|index| {
                let path = dir.path().join(format!("part-{index:02}.txt"));
                std::fs::write(&path, format!("body {index}")).unwrap();
                path
            })
            .collect();

        let merged = render_merged(&paths, false, MergeFormat::Text);
        let positions: Vec<usize> = (0..32)
            .map(|index| merged.find(&format!("body {index}\n")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn text_block_closes_with_dash_line() {
        assert_eq!(
            text_block("/a.txt", "body"),
            "-------------------\n/a.txt\n-------------------\nbody\n-------------------\n\n"
        );
    }
}
