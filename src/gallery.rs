//! Photos embedded as data URIs, and the evolution gallery export

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;

use crate::i18n::Language;
use crate::model::{EvolutionPhoto, new_id};

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Read an image file into a data URI
pub fn data_url_from_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(encode_data_url(mime_for(path), &bytes))
}

/// Decode the payload of a base64 data URI
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("not a data URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("data URI has no payload"))?;
    if !meta.ends_with(";base64") {
        return Err(anyhow!("data URI is not base64 encoded"));
    }
    STANDARD.decode(payload).context("invalid base64 payload")
}

/// New gallery entry from an image file, dated `today`
pub fn capture(path: &Path, language: Language, today: NaiveDate) -> Result<EvolutionPhoto> {
    Ok(EvolutionPhoto {
        id: new_id(),
        date: language.format_date(today),
        data_url: data_url_from_file(path)?,
    })
}

/// `Evolution_<date>.png` with slashes in the date turned into hyphens
pub fn export_file_name(date: &str) -> String {
    format!("Evolution_{}.png", date.replace('/', "-"))
}

/// Write a gallery photo into `dir`, returning the file written
pub fn export(photo: &EvolutionPhoto, dir: &Path) -> Result<PathBuf> {
    let bytes = decode_data_url(&photo.data_url)?;
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(export_file_name(&photo.date));
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("gympro-gallery-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("19/10/2026"), "Evolution_19-10-2026.png");
        assert_eq!(export_file_name("3/7/2026"), "Evolution_3-7-2026.png");
    }

    #[test]
    fn test_data_url_roundtrip() {
        let url = encode_data_url("image/png", b"\x89PNG");
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), b"\x89PNG");
        assert!(decode_data_url("http://example.com/a.png").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_capture_and_export() {
        let dir = temp_dir();
        fs::create_dir_all(&dir).unwrap();
        let src = dir.join("front.JPG");
        fs::write(&src, b"jpeg-bytes").unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let photo = capture(&src, Language::Pt, today).unwrap();
        assert_eq!(photo.date, "19/10/2026");
        assert!(photo.data_url.starts_with("data:image/jpeg;base64,"));

        let out = export(&photo, &dir.join("out")).unwrap();
        assert_eq!(out.file_name().unwrap(), "Evolution_19-10-2026.png");
        assert_eq!(fs::read(&out).unwrap(), b"jpeg-bytes");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_capture_missing_file() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert!(capture(Path::new("/nonexistent/photo.png"), Language::En, today).is_err());
    }
}
