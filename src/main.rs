use clap::{Parser, ValueEnum};
use gateway_h1::apps::{router_app, sample_app};
use gateway_h1::{Error, Mode, Server, ServerConfig};
use std::path::PathBuf;

/// Serve one of the bundled applications.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Application to serve.
    #[arg(long, value_enum, default_value_t = App::Sample)]
    app: App,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Directory served under /static/.
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,

    /// Directory holding 404.html.
    #[arg(long, default_value = "templates")]
    template_dir: PathBuf,

    /// Handle one connection at a time on the accept loop.
    #[arg(long)]
    sequential: bool,

    /// Include application error descriptions in 500 responses.
    #[arg(long)]
    show_errors: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum App {
    Sample,
    Router,
}

#[async_std::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        static_dir: args.static_dir,
        template_dir: args.template_dir,
        mode: if args.sequential {
            Mode::Sequential
        } else {
            Mode::Concurrent
        },
        show_errors: args.show_errors,
    };

    let server = match args.app {
        App::Sample => Server::with_config(config, sample_app),
        App::Router => Server::with_config(config, router_app),
    };

    server.serve().await
}
