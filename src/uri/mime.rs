//! The static-asset classifier and MIME lookup table.

const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("mjs", "text/javascript"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("webp", "image/webp"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("xml", "application/xml"),
];

const DEFAULT_MIME: &str = "application/octet-stream";

/// Extracts the text after the last `.` in `path`. The query must already be stripped
/// by the caller. Returns `None` when there is no `.` (or the path ends with one).
pub fn extension_of(path: &str) -> Option<&str> {
    let (_, ext) = path.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// True iff `path`'s extension is in the recognized static-asset allowlist.
pub fn is_static_asset(path: &str) -> bool {
    match extension_of(path) {
        Some(ext) => EXTENSION_TABLE
            .iter()
            .any(|(known, _)| known.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Maps `path`'s extension to a MIME type, falling back to
/// `application/octet-stream` for unrecognized or missing extensions.
pub fn mime_for(path: &str) -> &'static str {
    match extension_of(path) {
        Some(ext) => EXTENSION_TABLE
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(ext))
            .map(|(_, mime)| *mime)
            .unwrap_or(DEFAULT_MIME),
        None => DEFAULT_MIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_extensions() {
        assert!(is_static_asset("/app.js"));
        assert!(is_static_asset("/style.CSS"));
        assert!(!is_static_asset("/no_extension"));
        assert!(!is_static_asset("/weird.xyz"));
    }

    #[test]
    fn maps_extension_to_mime_with_fallback() {
        assert_eq!(mime_for("/app.js"), "text/javascript");
        assert_eq!(mime_for("/image.PNG"), "image/png");
        assert_eq!(mime_for("/blob.xyz"), "application/octet-stream");
        assert_eq!(mime_for("/noext"), "application/octet-stream");
    }
}
