use http::Method;

use crate::{constants, helpers};

/// The request line and headers of a request.
///
/// Header lookup is case-sensitive and returns the first match, so repeated
/// headers keep their original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadInfo {
    method: Method,
    path: String,
    protocol: String,
    headers: Vec<(String, String)>,
}

impl HeadInfo {
    /// Parses the bytes preceding the `\r\n\r\n` head terminator.
    pub fn parse(bytes: &[u8]) -> crate::Result<HeadInfo> {
        let text = helpers::decode_utf8(bytes).ok_or_else(|| crate::Error::MalformedRequestLine {
            line: helpers::decode_utf8_lossy(bytes).into_owned(),
        })?;

        let mut lines = text.split(constants::CRLF);
        let request_line = lines.next().unwrap_or("");

        let tokens: Vec<&str> = request_line.split(' ').collect();
        let (method, path, protocol) = match tokens[..] {
            [method, path, protocol] => (method, path, protocol),
            _ => return Err(malformed(request_line)),
        };

        let method = Method::from_bytes(method.as_bytes()).map_err(|_| malformed(request_line))?;

        let headers = lines
            .map(|line| {
                line.split_once(constants::HEADER_SEP)
                    .map(|(name, value)| (name.to_owned(), value.to_owned()))
                    .ok_or_else(|| malformed(line))
            })
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(HeadInfo {
            method,
            path: path.to_owned(),
            protocol: protocol.to_owned(),
            headers,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns the value of the first header named exactly `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

fn malformed(line: &str) -> crate::Error {
    crate::Error::MalformedRequestLine { line: line.to_owned() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_head() {
        let head = HeadInfo::parse(
            b"POST /upload HTTP/1.0\r\nContent-Type: multipart/form-data; boundary=X\r\nContent-Length: 42",
        )
        .unwrap();

        assert_eq!(head.method(), &Method::POST);
        assert_eq!(head.path(), "/upload");
        assert_eq!(head.protocol(), "HTTP/1.0");
        assert_eq!(head.header("Content-Type"), Some("multipart/form-data; boundary=X"));
        assert_eq!(head.header("Content-Length"), Some("42"));
        assert_eq!(head.headers().count(), 2);
    }

    #[test]
    fn test_header_lookup_is_first_match_and_case_sensitive() {
        let head = HeadInfo::parse(b"GET / HTTP/1.0\r\nX-Tag: one\r\nX-Tag: two\r\nHost: a: b").unwrap();

        assert_eq!(head.header("X-Tag"), Some("one"));
        assert_eq!(head.header("x-tag"), None);
        assert_eq!(head.header("Host"), Some("a: b"));
        assert_eq!(head.header("Missing"), None);
    }

    #[test]
    fn test_request_line_needs_three_tokens() {
        assert_eq!(
            HeadInfo::parse(b"GET /"),
            Err(crate::Error::MalformedRequestLine { line: "GET /".into() })
        );
        assert!(HeadInfo::parse(b"GET  / HTTP/1.0").is_err());
        assert!(HeadInfo::parse(b"GET / HTTP/1.0 extra").is_err());
        assert!(HeadInfo::parse(b"").is_err());
    }

    #[test]
    fn test_header_without_separator() {
        assert_eq!(
            HeadInfo::parse(b"GET / HTTP/1.0\r\nHost:example.com"),
            Err(crate::Error::MalformedRequestLine {
                line: "Host:example.com".into()
            })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(HeadInfo::parse(b"GET /\xff HTTP/1.0").is_err());
    }
}
