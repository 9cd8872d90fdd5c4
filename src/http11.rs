//! HTTP/1.1 request parsing and response serialization.

use crate::app::Chunk;
use crate::error::ParseError;
use crate::start_response::Declaration;
use std::io;
use std::io::Write;

/// Marks the end of the request head, where the body begins.
const END_OF_HEADER: &[u8] = b"\r\n\r\n";

/// Header names and values in the order they first appeared on the wire.
///
/// Names are kept exactly as received, lookups are case sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Get the value of a header by its exact name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(name, value)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Tell if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // A repeated name replaces the value but keeps its first position.
    fn insert(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.0.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_string();
        } else {
            self.0.push((name.to_string(), value.to_string()));
        }
    }
}

/// A request split into its parts, before it's turned into an environment.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    /// Validated request method.
    pub method: http::Method,
    /// Percent decoded path without the query string.
    pub path: String,
    /// Raw query string, empty if there is none.
    pub query: String,
    /// Protocol token from the request line, i.e. `HTTP/1.1`.
    pub protocol: String,
    /// Request headers, as sent.
    pub headers: Headers,
    /// Everything physically received after the blank line.
    pub body: Vec<u8>,
}

/// Parse the header block between the request line and the blank line.
///
/// Each line is split on the first `": "`. Lines without that separator
/// are skipped.
pub fn parse_headers(text: &str) -> Headers {
    let mut headers = Headers::default();

    for line in text.lines() {
        match line.split_once(": ") {
            Some((name, value)) => headers.insert(name, value),
            None => {
                if !line.is_empty() {
                    trace!("Skipping header line without separator: {:?}", line);
                }
            }
        }
    }

    headers
}

/// Parse a raw http/1.1 request.
///
/// The head is decoded lossily, undecodable sequences become U+FFFD. The body
/// is left as bytes.
pub fn parse_request(raw: &[u8]) -> Result<ParsedRequest, ParseError> {
    let (head, body) = match find_end_of_header(raw) {
        Some(idx) => (&raw[..idx], &raw[idx + END_OF_HEADER.len()..]),
        None => (raw, &[][..]),
    };

    let head = String::from_utf8_lossy(head);
    trace!("parse_request: {:?}", head);

    let mut split = head.splitn(2, "\r\n");
    let request_line = split.next().unwrap_or("");
    let header_text = split.next().unwrap_or("");

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(ParseError::RequestLine(request_line.to_string()));
    }

    let method = http::Method::from_bytes(parts[0].as_bytes())
        .map_err(|_| ParseError::Method(parts[0].to_string()))?;

    let (path, query) = match parts[1].split_once('?') {
        Some((path, query)) => (path, query),
        None => (parts[1], ""),
    };

    let decoded = urlencoding::decode_binary(path.as_bytes());

    let parsed = ParsedRequest {
        method,
        path: String::from_utf8_lossy(&decoded).into_owned(),
        query: query.to_string(),
        protocol: parts[2].to_string(),
        headers: parse_headers(header_text),
        body: body.to_vec(),
    };

    debug!(
        "parse_request success: {} {} ({} headers, {} body bytes)",
        parsed.method,
        parsed.path,
        parsed.headers.len(),
        parsed.body.len()
    );

    Ok(parsed)
}

fn find_end_of_header(buf: &[u8]) -> Option<usize> {
    buf.windows(END_OF_HEADER.len())
        .position(|w| w == END_OF_HEADER)
}

/// Write an http/1.1 response to a buffer.
///
/// Headers are written exactly as declared, nothing is added or removed.
#[allow(clippy::write_with_newline)]
pub fn write_response(decl: &Declaration, body: &[Chunk]) -> Result<Vec<u8>, io::Error> {
    let body_len: usize = body.iter().map(|c| c.as_bytes().len()).sum();
    let mut w = Vec::with_capacity(256 + body_len);

    write!(w, "HTTP/1.1 {}\r\n", decl.status())?;

    for (name, value) in decl.headers() {
        write!(w, "{}: {}\r\n", name, value)?;
    }
    write!(w, "\r\n")?;

    debug!("write_response: {:?}", String::from_utf8_lossy(&w));

    for chunk in body {
        w.write_all(chunk.as_bytes())?;
    }

    Ok(w)
}

/// Attempt to parse an http/1.1 response head.
///
/// Returns the declaration and the length of the head, or `None` if the
/// buffer doesn't hold a complete head yet.
pub fn try_parse_res(buf: &[u8]) -> Result<Option<(Declaration, usize)>, io::Error> {
    trace!("try_parse_res: {:?}", String::from_utf8_lossy(buf));

    let mut headers = [httparse::EMPTY_HEADER; 128];
    let mut parser = httparse::Response::new(&mut headers);

    let status = parser
        .parse(buf)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let len = match status {
        httparse::Status::Complete(len) => len,
        httparse::Status::Partial => return Ok(None),
    };

    let code = parser.code.unwrap_or(0);
    let status_line = match parser.reason {
        Some(reason) if !reason.is_empty() => format!("{} {}", code, reason),
        _ => code.to_string(),
    };

    let headers = parser
        .headers
        .iter()
        .map(|h| {
            (
                h.name.to_string(),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();

    Ok(Some((Declaration::new(status_line, headers), len)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn headers_split_on_first_separator() {
        let headers = parse_headers("Host: localhost:8000\r\nX-Thing: a: b\r\n");

        assert_eq!(headers.get("Host"), Some("localhost:8000"));
        assert_eq!(headers.get("X-Thing"), Some("a: b"));
    }

    #[test]
    fn headers_skip_lines_without_separator() {
        let headers = parse_headers("Host: a\r\nnonsense\r\nX-Empty:\r\nAccept: */*\r\n");

        let names: Vec<_> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Host", "Accept"]);
    }

    #[test]
    fn headers_are_case_sensitive() {
        let headers = parse_headers("content-type: text/plain\r\n");

        assert_eq!(headers.get("Content-Type"), None);
        assert_eq!(headers.get("content-type"), Some("text/plain"));
    }

    #[test]
    fn request_with_query_and_body() {
        let raw = b"POST /a%20b/c?x=1&y=%20 HTTP/1.1\r\nHost: h\r\nContent-Length: 3\r\n\r\nabc";
        let req = parse_request(raw).unwrap();

        assert_eq!(req.method, http::Method::POST);
        assert_eq!(req.path, "/a b/c");
        assert_eq!(req.query, "x=1&y=%20");
        assert_eq!(req.protocol, "HTTP/1.1");
        assert_eq!(req.headers.get("Content-Length"), Some("3"));
        assert_eq!(req.body, b"abc");
    }

    #[test]
    fn request_without_blank_line() {
        let req = parse_request(b"GET / HTTP/1.1\r\nHost: h").unwrap();

        assert_eq!(req.path, "/");
        assert_eq!(req.query, "");
        assert_eq!(req.headers.get("Host"), Some("h"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn request_line_must_have_three_parts() {
        let err = parse_request(b"GET /\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::RequestLine("GET /".into()));

        let err = parse_request(b"\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::RequestLine("".into()));
    }

    #[test]
    fn request_rejects_bad_method() {
        let err = parse_request(b"G(T / HTTP/1.1\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::Method("G(T".into()));
    }

    #[test]
    fn request_head_is_decoded_lossily() {
        let req = parse_request(b"GET / HTTP/1.1\r\nX-Bin: \xff\xfe\r\n\r\n").unwrap();
        assert_eq!(req.headers.get("X-Bin"), Some("\u{fffd}\u{fffd}"));
    }

    #[test]
    fn response_keeps_declared_header_order() {
        let decl = Declaration::new(
            "404 Not Found".into(),
            vec![
                ("X-B".into(), "2".into()),
                ("Content-Type".into(), "text/plain".into()),
                ("X-B".into(), "1".into()),
            ],
        );
        let body = vec![Chunk::from("Not "), Chunk::from(b"Found".to_vec())];

        let buf = write_response(&decl, &body).unwrap();
        assert_eq!(
            String::from_utf8(buf.clone()).unwrap(),
            "HTTP/1.1 404 Not Found\r\nX-B: 2\r\nContent-Type: text/plain\r\nX-B: 1\r\n\r\nNot Found"
        );

        let (parsed, len) = try_parse_res(&buf).unwrap().unwrap();
        assert_eq!(parsed, decl);
        assert_eq!(&buf[len..], b"Not Found");
    }

    #[test]
    fn partial_response_head() {
        assert!(try_parse_res(b"HTTP/1.1 200 OK\r\nContent-").unwrap().is_none());
    }
}
