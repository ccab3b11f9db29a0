//! Shared fixtures for building xmeml projects in integration tests.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Temporary directory with a UTF-8 path.
pub fn utf8_temp_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, path)
}

/// `file://` URL for a local path, percent-encoded the way editors export it.
pub fn path_url(path: &Utf8Path) -> String {
    url::Url::from_file_path(path).unwrap().to_string()
}

/// Wrap project children in a complete xmeml document.
pub fn xmeml(children: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE xmeml>
<xmeml version="4">
  <project>
    <name>Fixture</name>
    <children>
{children}
    </children>
  </project>
</xmeml>"#
    )
}

pub fn bin(name: &str, children: &str) -> String {
    format!("<bin><name>{name}</name><children>{children}</children></bin>")
}

/// A file record with its URL.
pub fn file_record(id: &str, url: &str) -> String {
    format!("<file id=\"{id}\"><pathurl>{url}</pathurl></file>")
}

/// Clip whose video track references `file_id` (a bare reference).
pub fn video_clip(name: &str, file_id: &str) -> String {
    format!(
        "<clip><name>{name}</name><media><video><track><clipitem><file id=\"{file_id}\"/></clipitem></track></video></media></clip>"
    )
}

/// Clip whose video track embeds the full file record, as editors do for
/// the first occurrence of a file.
pub fn video_clip_inline(name: &str, file_id: &str, url: &str) -> String {
    format!(
        "<clip><name>{name}</name><media><video><track><clipitem>{}</clipitem></track></video></media></clip>",
        file_record(file_id, url)
    )
}

/// Audio-only clip with one track per file id.
pub fn audio_clip(name: &str, file_ids: &[&str]) -> String {
    let tracks: String = file_ids
        .iter()
        .map(|id| format!("<track><clipitem><file id=\"{id}\"/></clipitem></track>"))
        .collect();
    format!("<clip><name>{name}</name><media><audio>{tracks}</audio></media></clip>")
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_media(dir: &Utf8Path, name: &str, contents: &[u8]) -> Utf8PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}
