//! `Location` URIs for Rekordbox
//!
//! Rekordbox wants `file://localhost/` URIs with each path segment
//! percent-encoded:
//! - `/Users/DJ/Music/Track.mp3` -> `file://localhost/Users/DJ/Music/Track.mp3`
//! - `C:\Music\Track.mp3` -> `file://localhost/C:/Music/Track.mp3`

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::Path;

/// Bytes escaped inside a path segment (RFC 3986 plus what trips Rekordbox)
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Convert a filesystem path to a Rekordbox `Location` URI
///
/// The path is canonicalized when it exists so relative inputs still
/// resolve in Rekordbox.
///
/// ```
/// use std::path::Path;
/// use mixmap::export::rekordbox::uri::path_to_rekordbox_uri;
///
/// let uri = path_to_rekordbox_uri(Path::new("/no/such/dir/My Track.mp3"));
/// assert_eq!(uri, "file://localhost/no/such/dir/My%20Track.mp3");
/// ```
pub fn path_to_rekordbox_uri(path: &Path) -> String {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    encode_path(&resolved.to_string_lossy())
}

/// Encode an already-resolved path string
fn encode_path(raw: &str) -> String {
    let forward = raw.replace('\\', "/");
    // Canonical Windows paths may carry the verbatim prefix
    let forward = forward.strip_prefix("//?/").unwrap_or(&forward);

    let rooted = if has_drive_letter(forward) {
        format!("/{}", forward)
    } else {
        forward.to_string()
    };

    let encoded: Vec<String> = rooted
        .split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect();
    format!("file://localhost{}", encoded.join("/"))
}

fn has_drive_letter(path: &str) -> bool {
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_path() {
        assert_eq!(
            encode_path("/Users/DJ/Music/Track.mp3"),
            "file://localhost/Users/DJ/Music/Track.mp3"
        );
    }

    #[test]
    fn test_windows_path() {
        assert_eq!(
            encode_path("C:\\Music\\Track.mp3"),
            "file://localhost/C:/Music/Track.mp3"
        );
        assert_eq!(
            encode_path("\\\\?\\D:\\Sets\\a.wav"),
            "file://localhost/D:/Sets/a.wav"
        );
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(
            encode_path("/Music/[2024] Drum & Bass/100% #1.mp3"),
            "file://localhost/Music/%5B2024%5D%20Drum%20%26%20Bass/100%25%20%231.mp3"
        );
    }

    #[test]
    fn test_unicode_is_utf8_encoded() {
        assert_eq!(encode_path("/Música/é.mp3"), "file://localhost/M%C3%BAsica/%C3%A9.mp3");
    }

    #[test]
    fn test_drive_letter_detection() {
        assert!(has_drive_letter("C:/Music"));
        assert!(has_drive_letter("d:"));
        assert!(!has_drive_letter("/Users/DJ"));
        assert!(!has_drive_letter("1:/x"));
    }
}
