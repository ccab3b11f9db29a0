//! Conversion of `pathurl` values into filesystem paths.

use camino::Utf8PathBuf;
use percent_encoding::percent_decode_str;
use url::Url;

/// Resolve a `file://` style URL from the project into a filesystem path.
///
/// The URL path is percent-decoded and one redundant leading separator is
/// dropped: `file://localhost/C:/Media/a.mov` becomes `C:/Media/a.mov` and
/// `file://localhost//Volumes/a.mov` becomes `/Volumes/a.mov`. A lone leading
/// separator in front of a POSIX path is the filesystem root and is kept.
///
/// Values that do not parse as URLs are decoded as-is; the result is not
/// validated here.
pub fn resolve_path_url(pathurl: &str) -> Utf8PathBuf {
    let pathurl = pathurl.trim();
    let encoded = match Url::parse(pathurl) {
        Ok(url) => url.path().to_string(),
        Err(err) => {
            tracing::debug!("pathurl {:?} is not a URL ({}), decoding raw value", pathurl, err);
            pathurl.to_string()
        }
    };

    let decoded = percent_decode_str(&encoded).decode_utf8_lossy();
    Utf8PathBuf::from(strip_redundant_separator(&decoded))
}

fn strip_redundant_separator(path: &str) -> &str {
    match path.strip_prefix('/') {
        Some(rest) if rest.starts_with('/') || has_drive_prefix(rest) => rest,
        _ => path,
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
