use crate::environ::Environ;
use crate::error::AppError;
use crate::start_response::StartResponse;
use std::fmt;

/// A synchronous application invoked once per request.
///
/// The application must declare its status and headers through
/// [`StartResponse::start_response`] exactly once before returning the body.
/// Returning `Err`, panicking or never declaring a response all make the
/// server answer `500 Internal Server Error`.
///
/// Implemented for any matching closure:
///
/// ```rust
/// use gateway_h1::{AppError, Chunk, Environ, StartResponse};
///
/// let app = |_env: Environ, start: &mut StartResponse| -> Result<Vec<Chunk>, AppError> {
///     start.start_response("200 OK", vec![("Content-Type".into(), "text/plain".into())], None)?;
///     Ok(vec![Chunk::from("hi")])
/// };
/// # fn is_app<A: gateway_h1::Application>(_: &A) {}
/// # is_app(&app);
/// ```
pub trait Application: Send + Sync + 'static {
    /// Handle one request, returning the body chunks.
    fn call(
        &self,
        environ: Environ,
        start_response: &mut StartResponse,
    ) -> Result<Vec<Chunk>, AppError>;
}

impl<F> Application for F
where
    F: Fn(Environ, &mut StartResponse) -> Result<Vec<Chunk>, AppError> + Send + Sync + 'static,
{
    fn call(
        &self,
        environ: Environ,
        start_response: &mut StartResponse,
    ) -> Result<Vec<Chunk>, AppError> {
        self(environ, start_response)
    }
}

/// One piece of a response body.
#[derive(Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Encoded as UTF-8 on the wire.
    Text(String),
    /// Passed through untouched.
    Bytes(Vec<u8>),
}

impl Chunk {
    /// Bytes as they go on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Chunk::Text(s) => s.as_bytes(),
            Chunk::Bytes(b) => b,
        }
    }
}

impl From<&str> for Chunk {
    fn from(s: &str) -> Self {
        Chunk::Text(s.to_string())
    }
}

impl From<String> for Chunk {
    fn from(s: String) -> Self {
        Chunk::Text(s)
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(b: Vec<u8>) -> Self {
        Chunk::Bytes(b)
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chunk::Text(s) => write!(f, "Text({:?})", s),
            Chunk::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
        }
    }
}
