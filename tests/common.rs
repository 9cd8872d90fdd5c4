#![allow(dead_code)]

use async_std::net::TcpStream;
use futures_util::{AsyncReadExt, AsyncWriteExt};
use gateway_h1::http11::try_parse_res;
use gateway_h1::{Application, Declaration, Error, Server, ServerConfig};
use std::fs;
use std::net::{Shutdown, SocketAddr};
use std::path::PathBuf;
use std::sync::Once;

/// Start a server for `app` on a free port.
pub async fn run_server<A: Application>(config: ServerConfig, app: A) -> Result<Connector, Error> {
    setup_logger();

    let config = ServerConfig { port: 0, ..config };
    let server = Server::with_config(config, app);

    let l = server.bind().await?;
    let addr = l.local_addr()?;

    async_std::task::spawn(async move {
        if let Err(e) = server.serve_on(l).await {
            panic!("serve_on failed: {}", e)
        }
    });

    Ok(Connector(addr))
}

pub struct Connector(pub SocketAddr);

impl Connector {
    pub async fn connect(&self) -> Result<TcpStream, Error> {
        Ok(TcpStream::connect(self.0).await?)
    }

    /// Send a raw request and read until the server closes.
    pub async fn send(&self, req: &[u8]) -> Result<Vec<u8>, Error> {
        let mut tcp = self.connect().await?;
        tcp.write_all(req).await?;

        let mut buf = vec![];
        tcp.read_to_end(&mut buf).await?;

        Ok(buf)
    }

    /// Like `send`, but shuts down the write half after the request.
    pub async fn send_and_shutdown(&self, req: &[u8]) -> Result<Vec<u8>, Error> {
        let mut tcp = self.connect().await?;
        tcp.write_all(req).await?;
        tcp.shutdown(Shutdown::Write)?;

        let mut buf = vec![];
        tcp.read_to_end(&mut buf).await?;

        Ok(buf)
    }

    /// Send a raw request and split the response into head and body.
    pub async fn exchange(&self, req: &[u8]) -> Result<(Declaration, Vec<u8>), Error> {
        let buf = self.send(req).await?;
        split_response(&buf)
    }
}

pub fn split_response(buf: &[u8]) -> Result<(Declaration, Vec<u8>), Error> {
    let (decl, len) = try_parse_res(buf)?.expect("Complete response head");
    Ok((decl, buf[len..].to_vec()))
}

pub fn header<'a>(decl: &'a Declaration, name: &str) -> Option<&'a str> {
    decl.headers()
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

pub const LOGO: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0x0d, 0xff, 0x00];

pub const NOT_FOUND_HTML: &str = "<html><body><h1>Nothing here</h1></body></html>";

/// A site directory with `static/logo.png`, `static/css/site.css` and
/// `templates/404.html`.
pub fn site() -> (tempfile::TempDir, ServerConfig) {
    let dir = tempfile::tempdir().expect("tempdir");
    let static_dir: PathBuf = dir.path().join("static");
    let template_dir: PathBuf = dir.path().join("templates");

    fs::create_dir_all(static_dir.join("css")).unwrap();
    fs::create_dir_all(&template_dir).unwrap();
    fs::write(static_dir.join("logo.png"), LOGO).unwrap();
    fs::write(static_dir.join("css/site.css"), "h1 { color: red; }\n").unwrap();
    fs::write(template_dir.join("404.html"), NOT_FOUND_HTML).unwrap();

    let config = ServerConfig {
        static_dir,
        template_dir,
        ..ServerConfig::default()
    };

    (dir, config)
}

pub fn setup_logger() {
    static START: Once = Once::new();
    START.call_once(|| {
        let test_log = std::env::var("TEST_LOG")
            .map(|x| x != "0" && x.to_lowercase() != "false")
            .unwrap_or(false);
        let level = if test_log {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        };
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Warn)
            .filter_module("gateway_h1", level)
            .target(env_logger::Target::Stdout)
            .init();
    });
}
