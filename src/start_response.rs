use crate::Error;
use std::error::Error as StdError;
use std::io;

/// Status line and headers declared by an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    status: String,
    headers: Vec<(String, String)>,
}

impl Declaration {
    /// Status line (without protocol) and headers in wire order.
    pub fn new(status: String, headers: Vec<(String, String)>) -> Self {
        Declaration { status, headers }
    }

    /// Status line without the protocol, i.e. `200 OK`.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Numeric status code, if the status line starts with a valid one.
    pub fn status_code(&self) -> Option<http::StatusCode> {
        let code = self.status.split_whitespace().next()?;
        http::StatusCode::from_bytes(code.as_bytes()).ok()
    }

    /// Headers in declaration order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// Single assignment slot an application declares its response through.
///
/// A fresh instance is created for every request and handed to the
/// application by mutable reference, so a declaration never outlives the
/// request it belongs to.
#[derive(Debug, Default)]
pub struct StartResponse {
    declared: Option<Declaration>,
}

impl StartResponse {
    /// An empty slot, nothing declared yet.
    pub fn new() -> Self {
        StartResponse::default()
    }

    /// Declare the response status and headers.
    ///
    /// `exc_info` is the error that made the application re-declare its
    /// response. Without it, a second declaration is refused. With it, the
    /// earlier one is replaced since no bytes have been sent yet.
    ///
    /// The returned writer discards everything. Applications return their
    /// body instead of writing it.
    pub fn start_response(
        &mut self,
        status: &str,
        headers: Vec<(String, String)>,
        exc_info: Option<&dyn StdError>,
    ) -> Result<io::Sink, Error> {
        if let Some(prev) = &self.declared {
            match exc_info {
                Some(e) => {
                    debug!("Replacing declared {:?} after error: {}", prev.status(), e);
                }
                None => {
                    return Err(Error::User(format!(
                        "start_response called twice, already declared {:?}",
                        prev.status()
                    )));
                }
            }
        }

        trace!("start_response: {} {:?}", status, headers);

        self.declared = Some(Declaration::new(status.to_string(), headers));

        Ok(io::sink())
    }

    /// Tell if `start_response` has been called.
    pub fn is_declared(&self) -> bool {
        self.declared.is_some()
    }

    /// Take the declaration once the application has returned.
    pub fn into_declaration(self) -> Option<Declaration> {
        self.declared
    }
}
