use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Image container formats recognized by signature sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
        if bytes.len() < 12 {
            return None;
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::WebP)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            Some(ImageFormat::Tiff)
        } else {
            None
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
        }
    }
}

/// Strips directory components and anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim_start_matches('.');

    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// Validates and writes an upload under `dir`, returning the stored file name.
///
/// The size cap is checked before anything touches the disk. The file is
/// written to a temporary sibling and renamed into place, so a crash mid-write
/// never leaves a partial file under the final name.
pub fn store_upload(
    dir: &Path,
    original_name: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> AppResult<String> {
    if original_name.trim().is_empty() {
        return Err(AppError::InvalidUpload("No selected file".to_string()));
    }
    if bytes.is_empty() {
        return Err(AppError::InvalidUpload("Uploaded file is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(max_bytes));
    }

    let mut sanitized = sanitize_filename(original_name);
    if sanitized.is_empty() {
        sanitized = "upload".to_string();
    }

    // Timestamp prefix keeps names ordered; the uuid fragment disambiguates
    // uploads landing within the same second.
    let suffix = uuid::Uuid::new_v4().to_string();
    let stored_name = format!(
        "{}_{}_{}",
        chrono::Utc::now().timestamp(),
        suffix.split_at(8).0,
        sanitized
    );

    fs::create_dir_all(dir)?;
    let final_path = dir.join(&stored_name);
    let tmp_path = dir.join(format!(".{}.tmp", stored_name));

    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.flush()?;
    }
    if let Err(e) = fs::rename(&tmp_path, &final_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(stored_name)
}
