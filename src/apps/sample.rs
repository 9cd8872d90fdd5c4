use crate::{AppError, Chunk, Environ, StartResponse};

/// Minimal application: a greeting on `/`, a deliberate failure on
/// `/error` and 404 for everything else.
///
/// Failures are caught inside the application and reported as a 500 with
/// the error text in the body.
pub fn sample_app(environ: Environ, start: &mut StartResponse) -> Result<Vec<Chunk>, AppError> {
    match route(environ.path()) {
        Ok((status, body)) => {
            start.start_response(status, plain_text(), None)?;
            Ok(vec![body.into()])
        }
        Err(e) => {
            start.start_response("500 Internal Server Error", plain_text(), None)?;
            Ok(vec![format!("App Error: {}", e).into()])
        }
    }
}

fn route(path: &str) -> Result<(&'static str, &'static str), AppError> {
    match path {
        "/" => Ok(("200 OK", "Hello, WSGI Server!")),
        "/error" => Err("Manual error for testing".into()),
        _ => Ok(("404 Not Found", "Not Found")),
    }
}

fn plain_text() -> Vec<(String, String)> {
    vec![("Content-Type".into(), "text/plain".into())]
}
