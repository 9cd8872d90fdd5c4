//! Responses the server produces on its own, without the application.

use http::StatusCode;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Requests under this prefix never reach the application.
pub const STATIC_PREFIX: &str = "/static/";

/// Name of the template served with 404 responses.
pub const NOT_FOUND_TEMPLATE: &str = "404.html";

const NOT_FOUND_BODY: &str = "404 Not Found";
const INTERNAL_ERROR_BODY: &str = "500 Internal Server Error";

/// Serves files under [`STATIC_PREFIX`] and the canned 404 page.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
    template_dir: PathBuf,
}

impl StaticFiles {
    /// Serve files from `base`, the 404 page from `templates`.
    pub fn new<P: Into<PathBuf>, T: Into<PathBuf>>(base: P, templates: T) -> Self {
        StaticFiles {
            base_dir: base.into(),
            template_dir: templates.into(),
        }
    }

    /// Tell if a request path is handled here.
    pub fn is_static(url_path: &str) -> bool {
        url_path.starts_with(STATIC_PREFIX)
    }

    // Only plain components are accepted, so nothing resolves outside base_dir.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let rest = url_path.strip_prefix(STATIC_PREFIX)?;

        let mut pb = self.base_dir.clone();
        let mut any = false;
        for comp in Path::new(rest).components() {
            match comp {
                Component::Normal(s) => {
                    pb.push(s);
                    any = true;
                }
                Component::CurDir => {}
                _ => return None,
            }
        }

        if any {
            Some(pb)
        } else {
            None
        }
    }

    /// Complete response for a static request: 200 with the file, 404 if
    /// there is no such file, 500 if it can't be read.
    pub async fn respond(&self, url_path: &str) -> Vec<u8> {
        let path = match self.map_path(url_path) {
            Some(p) => p,
            None => {
                debug!("Static path doesn't map to a file: {}", url_path);
                return self.not_found().await;
            }
        };

        let is_file = async_std::fs::metadata(path.as_os_str())
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);

        if !is_file {
            debug!("Static file not found: {}", path.display());
            return self.not_found().await;
        }

        let read = async_std::fs::read(path.as_os_str()).await;

        file_response(&path, read)
    }

    /// 404 using the html template, or a plain text body if the template
    /// can't be read.
    pub async fn not_found(&self) -> Vec<u8> {
        let template = self.template_dir.join(NOT_FOUND_TEMPLATE);

        match async_std::fs::read(template.as_os_str()).await {
            Ok(body) => canned(StatusCode::NOT_FOUND, "text/html", &body),
            Err(e) => {
                debug!("No 404 template at {}: {}", template.display(), e);
                canned(
                    StatusCode::NOT_FOUND,
                    "text/plain",
                    NOT_FOUND_BODY.as_bytes(),
                )
            }
        }
    }
}

/// 200 with the file contents, or 500 if the existing file couldn't be read.
fn file_response(path: &Path, read: io::Result<Vec<u8>>) -> Vec<u8> {
    let bytes = match read {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to read static file {}: {}", path.display(), e);
            return internal_error(None);
        }
    };

    let content_type = mime_guess::from_path(path).first_or_octet_stream();

    trace!(
        "Serving {} ({}, {} bytes)",
        path.display(),
        content_type,
        bytes.len()
    );

    canned(StatusCode::OK, content_type.as_ref(), &bytes)
}

/// Fixed plain text 500 response, optionally carrying an error description.
pub fn internal_error(detail: Option<&str>) -> Vec<u8> {
    let body = match detail {
        Some(d) => format!("{}\n\n{}", INTERNAL_ERROR_BODY, d),
        None => INTERNAL_ERROR_BODY.to_string(),
    };

    canned(StatusCode::INTERNAL_SERVER_ERROR, "text/plain", body.as_bytes())
}

fn status_line(status: StatusCode) -> String {
    format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

// Written in one piece, bypassing the declaration path.
fn canned(status: StatusCode, content_type: &str, body: &[u8]) -> Vec<u8> {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
        status_line(status),
        content_type,
        body.len()
    );

    let mut res = Vec::with_capacity(head.len() + body.len());
    res.extend_from_slice(head.as_bytes());
    res.extend_from_slice(body);
    res
}
