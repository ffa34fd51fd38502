//! `koko-server <config>`: run the server described by a config file.

use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use koko_server::config::parse_file;
use koko_server::handlers::build_router;
use koko_server::server::{HttpServer, RequestLog, ServerConfig, ServerContext};

#[derive(Parser)]
#[command(name = "koko-server")]
#[command(about = "Multi-threaded HTTP/HTTPS server with prefix routing", long_about = None)]
struct Args {
    /// Path to the nginx-style config file
    config: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match parse_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid config file {}: {e}", args.config.display());
            exit(1);
        }
    };
    let server_config = ServerConfig::from_config(&config);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(server_config.threads)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {e}");
            exit(1);
        }
    };
    info!("Starting {} worker threads", server_config.threads);

    let log = Arc::new(RequestLog::new());
    let router = build_router(&config, &log);
    let server = HttpServer::new(server_config, ServerContext::new(router, log));

    if let Err(e) = runtime.block_on(server.start()) {
        error!("Server error: {e}");
        exit(1);
    }
}
