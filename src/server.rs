//! Server side: accept loop and per connection handling.
//!
//! # Example
//!
//! ```rust, no_run
//! use gateway_h1::{AppError, Chunk, Environ, Server, ServerConfig, StartResponse};
//!
//! fn hello(env: Environ, start: &mut StartResponse) -> Result<Vec<Chunk>, AppError> {
//!     let headers = vec![("Content-Type".into(), "text/plain".into())];
//!     start.start_response("200 OK", headers, None)?;
//!     Ok(vec![format!("Hello {}", env.path()).into()])
//! }
//!
//! #[async_std::main]
//! async fn main() -> Result<(), gateway_h1::Error> {
//!     let config = ServerConfig {
//!         port: 3000,
//!         ..ServerConfig::default()
//!     };
//!
//!     // Runs until the process is killed.
//!     Server::with_config(config, hello).serve().await
//! }
//! ```

use crate::environ::{build_environ, Environ, GatewayMeta, ServerInfo};
use crate::http11::{parse_request, write_response};
use crate::read::read_request;
use crate::start_response::{Declaration, StartResponse};
use crate::static_files::{internal_error, StaticFiles};
use crate::{Application, Chunk, Error};
use crate::{AsyncRead, AsyncWrite};
use async_std::net::TcpListener;
use async_std::task;
use futures_util::AsyncWriteExt;
use std::any::Any;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

/// How accepted connections are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The accept loop handles each connection itself, one at a time.
    Sequential,
    /// Every connection gets its own task, the application runs on the
    /// blocking thread pool.
    #[default]
    Concurrent,
}

/// Configuration for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host name or address to bind, also reported as `SERVER_NAME`.
    pub host: String,
    /// Port to listen on, 0 picks a free one.
    pub port: u16,
    /// Root of the files served under `/static/`.
    pub static_dir: PathBuf,
    /// Directory holding `404.html`.
    pub template_dir: PathBuf,
    /// Scheduling of accepted connections.
    pub mode: Mode,
    /// Append application error descriptions to 500 bodies.
    pub show_errors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".into(),
            port: 8000,
            static_dir: "static".into(),
            template_dir: "templates".into(),
            mode: Mode::default(),
            show_errors: false,
        }
    }
}

/// A server bridging connections to one application.
///
/// See [module level doc](index.html) for an example.
pub struct Server {
    config: ServerConfig,
    app: Arc<dyn Application>,
}

impl Server {
    /// Create a server with default configuration.
    pub fn new<A: Application>(app: A) -> Self {
        Server::with_config(ServerConfig::default(), app)
    }

    /// Create a server with the given configuration.
    pub fn with_config<A: Application>(config: ServerConfig, app: A) -> Self {
        Server {
            config,
            app: Arc::new(app),
        }
    }

    /// The configuration this server runs with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, io::Error> {
        TcpListener::bind((self.config.host.as_str(), self.config.port)).await
    }

    /// Bind and run the accept loop. Never returns unless binding fails.
    pub async fn serve(self) -> Result<(), Error> {
        let listener = self.bind().await?;
        self.serve_on(listener).await
    }

    /// Run the accept loop on an already bound listener.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), Error> {
        let local = listener.local_addr()?;
        let mode = self.config.mode;

        let handler = Arc::new(Handler {
            app: self.app,
            files: StaticFiles::new(&self.config.static_dir, &self.config.template_dir),
            host: self.config.host.clone(),
            port: local.port(),
            mode,
            show_errors: self.config.show_errors,
        });

        info!(
            "Gateway listening on http://{}:{} ({:?})",
            handler.host, handler.port, mode
        );

        loop {
            let (tcp, peer) = match listener.accept().await {
                Ok(v) => v,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            trace!("Accepted connection from {}", peer);

            match mode {
                Mode::Sequential => {
                    handle_connection(tcp, Some(peer), &handler).await;
                }
                Mode::Concurrent => {
                    let handler = handler.clone();
                    task::spawn(async move {
                        handle_connection(tcp, Some(peer), &handler).await;
                    });
                }
            }
        }
    }
}

/// Everything needed to handle one connection. Shared read only between
/// connections.
pub(crate) struct Handler {
    app: Arc<dyn Application>,
    files: StaticFiles,
    host: String,
    port: u16,
    mode: Mode,
    show_errors: bool,
}

/// Handle a single connection: one request, one response, then close.
///
/// Takes ownership of the stream so it's released exactly once, whatever
/// happens.
pub(crate) async fn handle_connection<S>(mut io: S, remote: Option<SocketAddr>, handler: &Handler)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let res = match handler.respond(&mut io, remote).await {
        Ok(Some(res)) => res,
        Ok(None) => {
            // peer went away before sending a request.
            io.close().await.ok();
            return;
        }
        Err(e) => {
            debug!("Request failed: {}", e);
            match e {
                Error::App(msg) if handler.show_errors => internal_error(Some(&msg)),
                _ => internal_error(None),
            }
        }
    };

    if let Err(e) = io.write_all(&res).await {
        debug!("Failed to write response: {}", e);
    }

    if let Err(e) = io.close().await {
        trace!("Failed to close connection: {}", e);
    }
}

impl Handler {
    async fn respond<S>(&self, io: &mut S, remote: Option<SocketAddr>) -> Result<Option<Vec<u8>>, Error>
    where
        S: AsyncRead + Unpin,
    {
        let raw = match read_request(io).await? {
            Some(v) => v,
            None => return Ok(None),
        };

        let req = parse_request(&raw)?;

        let info = ServerInfo {
            host: self.host.clone(),
            port: self.port,
            remote,
            meta: GatewayMeta::for_mode(self.mode),
        };

        let environ = build_environ(req, &info)?;

        if StaticFiles::is_static(environ.path()) {
            return Ok(Some(self.files.respond(environ.path()).await));
        }

        let method = environ.method().to_string();
        let path = environ.path().to_string();

        let (decl, body) = self.invoke(environ).await?;

        debug!("{} {} -> {}", method, path, decl.status());

        Ok(Some(write_response(&decl, &body)?))
    }

    async fn invoke(&self, environ: Environ) -> Result<(Declaration, Vec<Chunk>), Error> {
        match self.mode {
            Mode::Sequential => call_app(&*self.app, environ),
            Mode::Concurrent => {
                let app = self.app.clone();
                task::spawn_blocking(move || call_app(&*app, environ)).await
            }
        }
    }
}

/// Run the application with a fresh capture slot.
fn call_app(app: &dyn Application, environ: Environ) -> Result<(Declaration, Vec<Chunk>), Error> {
    let mut start = StartResponse::new();

    let result = panic::catch_unwind(AssertUnwindSafe(|| app.call(environ, &mut start)));

    let body = match result {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => return Err(Error::app(e)),
        Err(panic) => return Err(Error::App(panic_message(&*panic))),
    };

    let decl = start.into_declaration().ok_or_else(|| {
        Error::App("application returned without calling start_response".into())
    })?;

    Ok((decl, body))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic".to_string()
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .finish()
    }
}
