#![warn(missing_docs, missing_debug_implementations)]
#![warn(clippy::all)]

//! A small HTTP/1.1 server bridging TCP connections to synchronous applications.
//!
//! Each connection carries exactly one request. The server reads it, builds an
//! [`Environ`] describing it and calls an [`Application`] with that environment and
//! a [`StartResponse`] slot. The application declares its status and headers through
//! the slot and returns the body as a list of [`Chunk`]s, which the server writes
//! back before closing the connection.
//!
//! ## In scope
//!
//! * `Content-Length` delimited request bodies.
//! * Static files under `/static/`, served without involving the application.
//! * Canned 404 (from `templates/404.html`) and 500 responses.
//! * Sequential or task-per-connection dispatch, see [`Mode`].
//!
//! ## Out of scope
//!
//! * `Connection: keep-alive`, pipelining. The connection is closed after one
//!   response.
//! * `Transfer-Encoding: chunked` in either direction.
//! * HTTP/2, TLS.
//! * Routing, templating. That's up to the application.
//!
//! # Reading requests
//!
//! Requests are read in fixed size chunks until a read comes back short, see
//! [`read::read_request`]. This is fine for small requests from well behaved
//! clients, but it is not a length aware read.
//!
//! [`Mode`]: server::Mode

#[macro_use]
extern crate log;

mod app;
mod error;
mod start_response;

pub mod apps;
pub mod environ;
pub mod read;
pub mod server;
pub mod static_files;

#[doc(hidden)]
pub mod http11;

pub(crate) use futures_io::{AsyncRead, AsyncWrite};

pub use app::{Application, Chunk};
pub use environ::{Environ, GatewayMeta, Input};
pub use error::{AppError, Error, ParseError};
pub use server::{Mode, Server, ServerConfig};
pub use start_response::{Declaration, StartResponse};
