//! Mapping between panel directory paths and browser history URLs.
//!
//! A directory `/home/user/` is pushed as `<prefix>/fs/home/user/`; the root
//! is pushed as `<prefix>/`. Restoring strips both again.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Mount point of the file system routes
pub const FS: &str = "/fs";

/// Characters left alone by `encodeURI`
pub const ENCODE_URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'#');

/// Like [`ENCODE_URI`] but also escapes the characters that would end the
/// path part of a URL
pub const ENCODE_PATH: &AsciiSet = &ENCODE_URI.add(b'#').add(b'?');

/// URL pushed to history when a panel shows `dir_path`
pub fn history_path(prefix: &str, dir_path: &str) -> String {
    if dir_path == "/" {
        return format!("{}/", prefix);
    }

    let encoded = utf8_percent_encode(dir_path, ENCODE_PATH);
    format!("{}{}{}", prefix, FS, encoded)
}

/// Directory path encoded in a history URL, `None` when the URL is not one
/// of ours
pub fn path_from_history(prefix: &str, url: &str) -> Option<String> {
    let rest = url.strip_prefix(prefix)?;

    if rest.is_empty() || rest == "/" {
        return Some("/".to_string());
    }

    let encoded = rest.strip_prefix(FS)?;
    if encoded.is_empty() {
        return Some("/".to_string());
    }
    if !encoded.starts_with('/') {
        return None;
    }

    Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned())
}

/// Window title for a panel showing `path`
pub fn title(app_name: &str, path: &str) -> String {
    if app_name.is_empty() {
        return path.to_string();
    }
    format!("{} - {}", app_name, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_path() {
        assert_eq!(history_path("", "/"), "/");
        assert_eq!(history_path("", "/home/"), "/fs/home/");
        assert_eq!(history_path("/cmd", "/my docs/#1?/"), "/cmd/fs/my%20docs/%231%3F/");
    }

    #[test]
    fn test_path_from_history() {
        assert_eq!(path_from_history("", "/").as_deref(), Some("/"));
        assert_eq!(
            path_from_history("/cmd", "/cmd/fs/my%20docs/%231%3F/").as_deref(),
            Some("/my docs/#1?/")
        );
        assert_eq!(path_from_history("/cmd", "/other/fs/x/"), None);
        assert_eq!(path_from_history("", "/api/v1"), None);
    }

    #[test]
    fn test_unicode_survives() {
        let url = history_path("", "/Привет/");
        assert!(url.is_ascii());
        assert_eq!(path_from_history("", &url).as_deref(), Some("/Привет/"));
    }

    #[test]
    fn test_title() {
        assert_eq!(title("Cloud Commander", "/tmp/"), "Cloud Commander - /tmp/");
        assert_eq!(title("", "/tmp/"), "/tmp/");
    }
}
