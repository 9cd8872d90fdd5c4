use crate::{AppError, Chunk, Environ, StartResponse};
use std::io::Read;

const HTML: &str = "text/html; charset=utf-8";

/// Small routing application.
///
/// * `GET /` greets.
/// * `GET /greet/<name>` greets `name`.
/// * `POST /echo` answers with the request body.
///
/// Known paths with another method get 405, anything else 404.
pub fn router_app(mut environ: Environ, start: &mut StartResponse) -> Result<Vec<Chunk>, AppError> {
    let method = environ.method().to_string();
    let path = environ.path().to_string();
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    let (status, body) = match (method.as_str(), &segments[..]) {
        ("GET", [""]) => ("200 OK", "Hello from the gateway!".to_string()),

        ("GET", ["greet", name]) if !name.is_empty() => ("200 OK", format!("Hello, {}!", name)),

        ("POST", ["echo"]) => {
            let mut posted = vec![];
            environ.input().read_to_end(&mut posted)?;
            ("200 OK", format!("Posted: {}", String::from_utf8_lossy(&posted)))
        }

        (_, ["greet", name]) if !name.is_empty() => not_allowed(),
        (_, [""]) | (_, ["echo"]) => not_allowed(),

        _ => ("404 Not Found", "Not Found".to_string()),
    };

    trace!("router_app: {} {} -> {}", method, path, status);

    let headers = vec![
        ("Content-Type".into(), HTML.into()),
        ("Content-Length".into(), body.len().to_string()),
    ];
    start.start_response(status, headers, None)?;

    Ok(vec![body.into()])
}

fn not_allowed() -> (&'static str, String) {
    ("405 Method Not Allowed", "Method Not Allowed".to_string())
}
