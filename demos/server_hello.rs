use gateway_h1::{AppError, Chunk, Environ, Error, Server, ServerConfig, StartResponse};

#[async_std::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let config = ServerConfig {
        port: 3000,
        ..ServerConfig::default()
    };

    let server = Server::with_config(config, hello);

    println!("Listening to {}:{}", server.config().host, server.config().port);
    server.serve().await
}

fn hello(env: Environ, start: &mut StartResponse) -> Result<Vec<Chunk>, AppError> {
    let body = format!("Hello world! You asked for {}\n", env.path());

    let headers = vec![
        ("Content-Type".into(), "text/plain".into()),
        ("Content-Length".into(), body.len().to_string()),
    ];
    start.start_response("200 OK", headers, None)?;

    Ok(vec![body.into()])
}
