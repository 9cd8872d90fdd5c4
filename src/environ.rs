//! The request environment handed to applications.

use crate::error::ParseError;
use crate::http11::ParsedRequest;
use crate::server::Mode;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::io::Read;
use std::net::SocketAddr;

/// Request method, i.e. `GET`.
pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
/// Percent decoded request path.
pub const PATH_INFO: &str = "PATH_INFO";
/// Raw query string without the `?`.
pub const QUERY_STRING: &str = "QUERY_STRING";
/// Mount point of the application, always empty.
pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
/// Configured host of the server.
pub const SERVER_NAME: &str = "SERVER_NAME";
/// Port the server listens on.
pub const SERVER_PORT: &str = "SERVER_PORT";
/// Protocol token of the request line.
pub const SERVER_PROTOCOL: &str = "SERVER_PROTOCOL";
/// IP address of the peer.
pub const REMOTE_ADDR: &str = "REMOTE_ADDR";
/// `Content-Type` header, empty if absent.
pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
/// Declared `Content-Length`, `0` if absent.
pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";

const HEADER_PREFIX: &str = "HTTP_";

/// Fixed facts about the server an application may want to adapt to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayMeta {
    /// Requests may be handled concurrently on other threads.
    pub multithread: bool,
    /// Requests may be handled by other processes.
    pub multiprocess: bool,
    /// The application is only invoked once for the life of the process.
    pub run_once: bool,
    /// Always `http`, there is no TLS.
    pub url_scheme: &'static str,
}

impl GatewayMeta {
    /// Metadata for a server running in `mode`.
    pub fn for_mode(mode: Mode) -> Self {
        GatewayMeta {
            multithread: mode == Mode::Concurrent,
            multiprocess: false,
            run_once: false,
            url_scheme: "http",
        }
    }
}

/// Reader over the request body.
///
/// Holds at most `CONTENT_LENGTH` bytes, fewer if the client sent less
/// than it declared. Positioned at the start.
pub struct Input(io::Cursor<Vec<u8>>);

impl Input {
    /// Reader positioned at the start of `body`.
    pub fn new(body: Vec<u8>) -> Self {
        Input(io::Cursor::new(body))
    }

    /// Total length of the body, regardless of how much is read.
    pub fn len(&self) -> usize {
        self.0.get_ref().len()
    }

    /// Tell if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Input({} bytes)", self.len())
    }
}

/// Per request environment.
///
/// String variables use CGI style keys, see the constants in this module.
/// Every incoming header is present as `HTTP_<NAME>`, except `Content-Type`
/// and `Content-Length` which have dedicated keys.
#[derive(Debug)]
pub struct Environ {
    vars: BTreeMap<String, String>,
    input: Input,
    meta: GatewayMeta,
}

impl Environ {
    /// Look up a variable by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|v| v.as_str())
    }

    /// All variables, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Shorthand for [`REQUEST_METHOD`].
    pub fn method(&self) -> &str {
        self.get(REQUEST_METHOD).unwrap_or("GET")
    }

    /// Shorthand for [`PATH_INFO`].
    pub fn path(&self) -> &str {
        self.get(PATH_INFO).unwrap_or("/")
    }

    /// Shorthand for [`QUERY_STRING`].
    pub fn query(&self) -> &str {
        self.get(QUERY_STRING).unwrap_or("")
    }

    /// The declared [`CONTENT_LENGTH`]. The input may hold fewer bytes if
    /// the client sent less.
    pub fn content_length(&self) -> usize {
        self.get(CONTENT_LENGTH)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// The request body.
    pub fn input(&mut self) -> &mut Input {
        &mut self.input
    }

    /// Facts about the server handling this request.
    pub fn meta(&self) -> &GatewayMeta {
        &self.meta
    }
}

/// Server side facts that go into every environment.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    /// Becomes `SERVER_NAME`.
    pub host: String,
    /// Becomes `SERVER_PORT`.
    pub port: u16,
    /// Peer of the connection, becomes `REMOTE_ADDR` when known.
    pub remote: Option<SocketAddr>,
    /// Passed on as [`Environ::meta`].
    pub meta: GatewayMeta,
}

/// Derive the environment key of a wire header name.
///
/// `X-Forwarded-For` becomes `HTTP_X_FORWARDED_FOR`.
pub fn header_key(name: &str) -> String {
    format!("{}{}", HEADER_PREFIX, normalize(name))
}

fn normalize(name: &str) -> String {
    name.to_ascii_uppercase().replace('-', "_")
}

/// Turn a parsed request into the environment for the application.
pub fn build_environ(req: ParsedRequest, server: &ServerInfo) -> Result<Environ, ParseError> {
    let mut content_type = "";
    let mut content_length = "";
    let mut vars = BTreeMap::new();

    for (name, value) in req.headers.iter() {
        match normalize(name).as_str() {
            CONTENT_TYPE => content_type = value,
            CONTENT_LENGTH => content_length = value,
            _ => {
                vars.insert(header_key(name), value.to_string());
            }
        }
    }

    let length = parse_content_length(content_length)?;

    let mut body = req.body;
    if body.len() > length {
        body.truncate(length);
    } else if body.len() < length {
        debug!(
            "Declared content-length {} but only {} body bytes received",
            length,
            body.len()
        );
    }

    vars.insert(REQUEST_METHOD.into(), req.method.to_string());
    vars.insert(PATH_INFO.into(), req.path);
    vars.insert(QUERY_STRING.into(), req.query);
    vars.insert(SCRIPT_NAME.into(), String::new());
    vars.insert(SERVER_NAME.into(), server.host.clone());
    vars.insert(SERVER_PORT.into(), server.port.to_string());
    vars.insert(SERVER_PROTOCOL.into(), req.protocol);
    vars.insert(CONTENT_TYPE.into(), content_type.to_string());
    vars.insert(CONTENT_LENGTH.into(), length.to_string());
    if let Some(remote) = server.remote {
        vars.insert(REMOTE_ADDR.into(), remote.ip().to_string());
    }

    Ok(Environ {
        vars,
        input: Input::new(body),
        meta: server.meta,
    })
}

fn parse_content_length(value: &str) -> Result<usize, ParseError> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(0);
    }

    value
        .parse()
        .map_err(|_| ParseError::ContentLength(value.to_string()))
}
