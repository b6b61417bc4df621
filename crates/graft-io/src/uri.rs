//! Resource locator parsing.
//!
//! A [`Uri`] owns its percent-decoded text and stores every component as a
//! byte range into that storage, so component accessors can never outlive or
//! dangle from a reallocation; they are re-derived from the ranges on every
//! call.

use std::ops::Range;

/// A parsed, percent-decoded URI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uri {
    text: String,
    valid: bool,
    scheme: Range<usize>,
    userinfo: Range<usize>,
    host: Range<usize>,
    port: Range<usize>,
    path: Range<usize>,
    query: Range<usize>,
    fragment: Range<usize>,
}

impl Uri {
    /// Percent-decode and parse a URI.
    ///
    /// Invalid inputs still produce a `Uri` so the raw text stays
    /// inspectable; check [`Uri::valid`].
    pub fn parse(text: impl Into<String>) -> Self {
        let mut uri = Self {
            text: decode_percents(text.into()),
            ..Self::default()
        };
        uri.split_components();
        uri
    }

    /// Whether the input parsed as a URI.
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// The full percent-decoded text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn scheme(&self) -> &str {
        &self.text[self.scheme.clone()]
    }

    pub fn userinfo(&self) -> &str {
        &self.text[self.userinfo.clone()]
    }

    pub fn host(&self) -> &str {
        &self.text[self.host.clone()]
    }

    pub fn port(&self) -> &str {
        &self.text[self.port.clone()]
    }

    pub fn path(&self) -> &str {
        &self.text[self.path.clone()]
    }

    pub fn query(&self) -> &str {
        &self.text[self.query.clone()]
    }

    pub fn fragment(&self) -> &str {
        &self.text[self.fragment.clone()]
    }

    /// Whether the URI names a file on the local filesystem.
    pub fn is_local_path(&self) -> bool {
        self.scheme().is_empty() || (self.scheme() == "file" && self.host().is_empty())
    }

    /// Whether the URI uses the `data:` scheme.
    pub fn is_data_uri(&self) -> bool {
        self.scheme() == "data"
    }

    /// Split a data URI into (media type, base64 flag, payload).
    pub fn data_parts(&self) -> Option<(&str, bool, &str)> {
        if !self.is_data_uri() {
            return None;
        }
        let (header, payload) = self.path().split_once(',')?;
        let base64 = header.ends_with(";base64");
        let media_type = header.strip_suffix(";base64").unwrap_or(header);
        Some((media_type, base64, payload))
    }

    fn split_components(&mut self) {
        let text = self.text.as_str();
        if text.is_empty() {
            return;
        }

        let mut idx = 0;
        if let Some(colon) = text.find(':') {
            if colon == 0 {
                // An empty scheme is invalid.
                return;
            }
            self.scheme = 0..colon;
            idx = colon + 1;
        }

        if text[idx..].starts_with("//") {
            idx += 2;
            let authority_end = text[idx..].find('/').map_or(text.len(), |i| idx + i);

            if let Some(at) = text[idx..authority_end].find('@') {
                self.userinfo = idx..idx + at;
                idx += at + 1;
            }

            if text[idx..].starts_with('[') {
                // IPv6 literals contain colons, so the port separator must be
                // searched after the closing bracket.
                let Some(close) = text[idx..authority_end].find(']') else {
                    return;
                };
                self.host = idx + 1..idx + close;
                idx += close + 1;
                if text[idx..authority_end].starts_with(':') {
                    self.port = idx + 1..authority_end;
                }
            } else if let Some(colon) = text[idx..authority_end].find(':') {
                self.host = idx..idx + colon;
                self.port = idx + colon + 1..authority_end;
            } else {
                self.host = idx..authority_end;
            }

            // The path includes the slash that ended the authority.
            idx = authority_end;
        }

        if self.scheme() == "data" {
            // The data scheme is followed by a media type and the payload,
            // which can be megabytes of base64; no query/fragment split is
            // attempted on it.
            self.path = idx..text.len();
            self.valid = true;
            return;
        }

        let question = text[idx..].find('?').map(|i| idx + i);
        let hash = text[idx..].find('#').map(|i| idx + i);
        match (question, hash) {
            (Some(q), Some(h)) => {
                self.path = idx..q;
                self.query = q + 1..h;
                self.fragment = h + 1..text.len();
            }
            (Some(q), None) => {
                self.path = idx..q;
                self.query = q + 1..text.len();
            }
            (None, Some(h)) => {
                self.path = idx..h;
                self.fragment = h + 1..text.len();
            }
            (None, None) => {
                self.path = idx..text.len();
            }
        }
        self.valid = true;
    }
}

/// Rewrite `%XX` escapes. Malformed escapes and non-UTF-8 results are left
/// untouched.
fn decode_percents(text: String) -> String {
    if !text.contains('%') {
        return text;
    }

    let hex_digit = |byte: u8| (byte as char).to_digit(16).map(|value| value as u8);

    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                decoded.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(decoded).unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_authority() {
        let uri = Uri::parse("scheme://user@host:1234/path?q#f");
        assert!(uri.valid());
        assert_eq!(uri.scheme(), "scheme");
        assert_eq!(uri.userinfo(), "user");
        assert_eq!(uri.host(), "host");
        assert_eq!(uri.port(), "1234");
        assert_eq!(uri.path(), "/path");
        assert_eq!(uri.query(), "q");
        assert_eq!(uri.fragment(), "f");
    }

    #[test]
    fn empty_input_is_invalid() {
        assert!(!Uri::parse("").valid());
        assert!(!Uri::parse(":no-scheme").valid());
        assert!(!Uri::parse("http://[::1").valid());
    }

    #[test]
    fn bracketed_ipv6_host() {
        let uri = Uri::parse("http://[2001:db8::1]:8080/index");
        assert!(uri.valid());
        assert_eq!(uri.host(), "2001:db8::1");
        assert_eq!(uri.port(), "8080");
        assert_eq!(uri.path(), "/index");
    }

    #[test]
    fn relative_path() {
        let uri = Uri::parse("textures/albedo.png");
        assert!(uri.valid());
        assert!(uri.is_local_path());
        assert_eq!(uri.scheme(), "");
        assert_eq!(uri.path(), "textures/albedo.png");
    }

    #[test]
    fn percent_decoding() {
        let uri = Uri::parse("my%20model.bin");
        assert_eq!(uri.path(), "my model.bin");
    }

    #[test]
    fn data_uri_keeps_payload_whole() {
        let uri = Uri::parse("data:application/octet-stream;base64,SGVsbG8/I0E=");
        assert!(uri.valid());
        assert!(uri.is_data_uri());
        // No query/fragment split happens on the payload.
        assert_eq!(uri.query(), "");
        assert_eq!(uri.fragment(), "");
        let (media_type, base64, payload) = uri.data_parts().unwrap();
        assert_eq!(media_type, "application/octet-stream");
        assert!(base64);
        assert_eq!(payload, "SGVsbG8/I0E=");
    }
}
