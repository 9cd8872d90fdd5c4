use std::fmt;
use std::io;

/// Error type applications return from [`Application::call`].
///
/// [`Application::call`]: crate::Application::call
pub type AppError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Possible errors from this crate.
#[derive(Debug)]
pub enum Error {
    /// A user/usage problem such as declaring a response twice.
    User(String),
    /// A wrapped std::io::Error from the underlying transport (socket) or file system.
    Io(io::Error),
    /// The incoming request could not be parsed.
    Parse(ParseError),
    /// The application failed, panicked or never declared a response.
    App(String),
}

/// Reasons a raw request is rejected before reaching the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The request line is not `<method> <target> <protocol>`.
    RequestLine(String),
    /// The method is not a valid http token.
    Method(String),
    /// A non-empty `Content-Length` that isn't a number.
    ContentLength(String),
}

impl Error {
    pub(crate) fn app<E: fmt::Display>(e: E) -> Self {
        Error::App(e.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::User(v) => write!(f, "{}", v),
            Error::Io(v) => fmt::Display::fmt(v, f),
            Error::Parse(v) => write!(f, "request parser: {}", v),
            Error::App(v) => write!(f, "application: {}", v),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::RequestLine(v) => write!(f, "malformed request line: {:?}", v),
            ParseError::Method(v) => write!(f, "invalid method: {:?}", v),
            ParseError::ContentLength(v) => write!(f, "invalid content-length: {:?}", v),
        }
    }
}

impl std::error::Error for Error {}

impl std::error::Error for ParseError {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}
