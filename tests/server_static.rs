use gateway_h1::apps::sample_app;
use gateway_h1::{AppError, Chunk, Environ, Error, Mode, ServerConfig, StartResponse};

mod common;

#[async_std::test]
async fn static_binary_file() -> Result<(), Error> {
    let (_dir, config) = common::site();
    let conn = common::run_server(config, sample_app).await?;

    let (decl, body) = conn.exchange(b"GET /static/logo.png HTTP/1.1\r\n\r\n").await?;

    assert_eq!(decl.status(), "200 OK");
    assert_eq!(common::header(&decl, "Content-Type"), Some("image/png"));
    assert_eq!(
        common::header(&decl, "Content-Length"),
        Some(common::LOGO.len().to_string().as_str())
    );
    assert_eq!(body, common::LOGO);

    Ok(())
}

#[async_std::test]
async fn static_nested_file() -> Result<(), Error> {
    let (_dir, config) = common::site();
    let conn = common::run_server(config, sample_app).await?;

    let res = conn.send(b"GET /static/css/site.css HTTP/1.1\r\n\r\n").await?;

    assert_eq!(
        String::from_utf8(res).unwrap(),
        "HTTP/1.1 200 OK\r\nContent-Type: text/css\r\nContent-Length: 19\r\n\r\nh1 { color: red; }\n"
    );

    Ok(())
}

#[async_std::test]
async fn static_same_bytes_twice() -> Result<(), Error> {
    let (_dir, config) = common::site();
    let config = ServerConfig {
        mode: Mode::Sequential,
        ..config
    };
    let conn = common::run_server(config, sample_app).await?;

    let req = b"GET /static/logo.png HTTP/1.1\r\n\r\n";
    let first = conn.send(req).await?;
    let second = conn.send(req).await?;

    assert!(!first.is_empty());
    assert_eq!(first, second);

    Ok(())
}

#[async_std::test]
async fn static_missing_uses_template() -> Result<(), Error> {
    let (_dir, config) = common::site();
    let conn = common::run_server(config, sample_app).await?;

    let (decl, body) = conn.exchange(b"GET /static/nope.png HTTP/1.1\r\n\r\n").await?;

    assert_eq!(decl.status(), "404 Not Found");
    assert_eq!(common::header(&decl, "Content-Type"), Some("text/html"));
    assert_eq!(String::from_utf8(body).unwrap(), common::NOT_FOUND_HTML);

    Ok(())
}

#[async_std::test]
async fn static_directory_is_404() -> Result<(), Error> {
    let (_dir, config) = common::site();
    let conn = common::run_server(config, sample_app).await?;

    let (decl, _) = conn.exchange(b"GET /static/css HTTP/1.1\r\n\r\n").await?;
    assert_eq!(decl.status(), "404 Not Found");

    let (decl, _) = conn.exchange(b"GET /static/../Cargo.toml HTTP/1.1\r\n\r\n").await?;
    assert_eq!(decl.status(), "404 Not Found");

    Ok(())
}

#[async_std::test]
async fn static_missing_without_template() -> Result<(), Error> {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        static_dir: dir.path().join("static"),
        template_dir: dir.path().join("templates"),
        ..ServerConfig::default()
    };
    let conn = common::run_server(config, sample_app).await?;

    let (decl, body) = conn.exchange(b"GET /static/logo.png HTTP/1.1\r\n\r\n").await?;

    assert_eq!(decl.status(), "404 Not Found");
    assert_eq!(common::header(&decl, "Content-Type"), Some("text/plain"));
    assert_eq!(body, b"404 Not Found");

    Ok(())
}

fn broken(_env: Environ, _start: &mut StartResponse) -> Result<Vec<Chunk>, AppError> {
    panic!("application must not be called for static files");
}

#[async_std::test]
async fn static_works_with_broken_app() -> Result<(), Error> {
    let (_dir, config) = common::site();
    let conn = common::run_server(config, broken).await?;

    let (decl, body) = conn.exchange(b"GET /static/logo.png HTTP/1.1\r\n\r\n").await?;
    assert_eq!(decl.status(), "200 OK");
    assert_eq!(body, common::LOGO);

    let (decl, _) = conn.exchange(b"GET /static/missing HTTP/1.1\r\n\r\n").await?;
    assert_eq!(decl.status(), "404 Not Found");

    // everything else does reach the app
    let (decl, _) = conn.exchange(b"GET /staticfoo HTTP/1.1\r\n\r\n").await?;
    assert_eq!(decl.status(), "500 Internal Server Error");

    Ok(())
}
