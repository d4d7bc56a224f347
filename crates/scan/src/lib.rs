//! File discovery, decoding and merging for TextMerger.
//! TextMerger 的檔案探索、解碼與合併。

pub mod exclude;
pub mod merge;
pub mod notebook;
pub mod reader;
pub mod scanner;

/// Separator line framing file headers and notebook cells.
pub const DASH_LINE: &str = "-------------------";

pub use exclude::ExclusionMatcher;
pub use merge::{render_merged, render_tab, MergeFormat};
pub use notebook::render_notebook;
pub use reader::{decode_text, media_type, read_file, ReadError, MAX_FILE_SIZE};
pub use scanner::{scan_paths, ScanReport};
