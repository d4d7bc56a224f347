use std::borrow::Cow;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chardetng::EncodingDetector;
use content_inspector::inspect;
use encoding_rs::{Encoding, UTF_8};
use image::io::Reader as ImageReader;
use log::debug;
use mime_guess::{mime, Mime};
use nom_exif::{ExifIter, MediaParser, MediaSource};
use thiserror::Error;

use crate::notebook::render_notebook;
use crate::DASH_LINE;

/// 可讀取的最大檔案大小（10 MiB）。 / Largest file that is read as text (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Bytes inspected when deciding whether a file is binary.
pub const SNIFF_LEN: usize = 1024;

/// EXIF tags copied into a media summary.
const SUMMARY_TAGS: &[&str] = &[
    "Duration",
    "ImageWidth",
    "ImageHeight",
    "Make",
    "Model",
    "CreateDate",
    "FrameRate",
    "BitRate",
];

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("is a directory: {0}")]
    IsDirectory(PathBuf),
    #[error("file too large ({size} bytes, limit is 10 MiB): {path}")]
    TooLarge { path: PathBuf, size: u64 },
    #[error("binary file detected: {0}")]
    Binary(PathBuf),
    #[error("unsupported text encoding: {0}")]
    InvalidEncoding(PathBuf),
    #[error("failed to extract PDF text from {path}: {message}")]
    Pdf { path: PathBuf, message: String },
    #[error("invalid notebook {path}: {source}")]
    InvalidNotebook {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 讀取單一檔案為文字。 / Reads one file as text.
///
/// PDFs yield their extracted text, notebooks are rendered cell by cell and
/// images or videos are replaced by a metadata summary.
pub fn read_file(path: &Path, show_outputs: bool) -> Result<String, ReadError> {
    let metadata = fs::metadata(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ReadError::NotFound(path.to_path_buf()),
        _ => ReadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    if metadata.is_dir() {
        return Err(ReadError::IsDirectory(path.to_path_buf()));
    }

    match lowercase_extension(path).as_str() {
        "pdf" => return read_pdf(path),
        "ipynb" => return read_notebook(path, show_outputs),
        _ => {}
    }
    if let Some(mime) = media_type(path) {
        return Ok(media_summary(path, metadata.len(), &mime));
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(ReadError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
        });
    }

    let bytes = read_bytes(path)?;
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    if inspect(head).is_binary() {
        return Err(ReadError::Binary(path.to_path_buf()));
    }
    decode_text(&bytes).ok_or_else(|| ReadError::InvalidEncoding(path.to_path_buf()))
}

/// 解碼位元組為文字。 / Decodes bytes as UTF-8, BOM-marked UTF-16, or a detected legacy encoding.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(encoding, &bytes[bom_len..]);
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_owned());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, true);
    if guess == UTF_8 {
        return None;
    }
    debug!("decoding as {}", guess.name());
    decode_with(guess, bytes)
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ReadError> {
    fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_notebook(path: &Path, show_outputs: bool) -> Result<String, ReadError> {
    let bytes = read_bytes(path)?;
    let json = decode_text(&bytes).ok_or_else(|| ReadError::InvalidEncoding(path.to_path_buf()))?;
    render_notebook(&json, show_outputs).map_err(|source| ReadError::InvalidNotebook {
        path: path.to_path_buf(),
        source,
    })
}

fn read_pdf(path: &Path) -> Result<String, ReadError> {
    pdf_extract::extract_text(path).map_err(|err| ReadError::Pdf {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// 影像或影片的 MIME 類型。 / MIME type of paths that get a summary instead of content.
///
/// Covers every image and video type known to `mime_guess` except SVG, which
/// is XML text and is merged like any other text file.
pub fn media_type(path: &Path) -> Option<Mime> {
    let guess = mime_guess::from_path(path).first()?;
    let is_media = guess.type_() == mime::IMAGE || guess.type_() == mime::VIDEO;
    (is_media && guess.suffix() != Some(mime::XML)).then_some(guess)
}

fn media_summary(path: &Path, size: u64, mime: &Mime) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let mut summary = format!(
        "{DASH_LINE}\n{}\n{DASH_LINE}\nName: {name} | Size: {size} bytes | Type: {mime}\n{DASH_LINE}\n\nMetadata:\n",
        path.display()
    );
    if let Some((width, height)) = image_dimensions(path) {
        summary.push_str(&format!("Dimensions: {width}x{height}\n"));
    }
    for (tag, value) in exif_tags(path) {
        summary.push_str(&format!("{tag}: {value}\n"));
    }
    summary
}

/// Reads the image header only; the pixels are never decoded.
fn image_dimensions(path: &Path) -> Option<(u32, u32)> {
    ImageReader::open(path)
        .ok()?
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

fn exif_tags(path: &Path) -> Vec<(String, String)> {
    let source = match MediaSource::file_path(path) {
        Ok(source) => source,
        Err(err) => {
            debug!("cannot open {} for EXIF: {err}", path.display());
            return Vec::new();
        }
    };
    let mut parser = MediaParser::new();
    let parsed: Result<ExifIter, nom_exif::Error> = parser.parse(source);
    match parsed {
        Ok(entries) => entries
            .filter_map(|entry| {
                let tag = entry.tag()?.to_string();
                if !SUMMARY_TAGS.contains(&tag.as_str()) {
                    return None;
                }
                let value = entry
                    .get_value()
                    .map(|value| value.to_string())
                    .unwrap_or_default();
                Some((tag, value))
            })
            .collect(),
        Err(err) => {
            debug!("no EXIF data in {}: {err}", path.display());
            Vec::new()
        }
    }
}
