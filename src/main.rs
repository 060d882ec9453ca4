//! # H1 Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada: parsea la configuración, carga los archivos
//! estáticos, registra las rutas y corre el servidor hasta Ctrl-C.

use clap::Parser;
use h1_server::commands::{self, WWW_FILES};
use h1_server::config::Config;
use h1_server::logging::init_logging;
use h1_server::resources::ResourceTable;
use h1_server::server::Server;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    init_logging();

    let config = Config::parse();

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    config.print_summary();

    match launch(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

fn launch(config: Config) -> h1_server::Result<()> {
    let mut resources = ResourceTable::new();
    let loaded = resources.load_dir(&config.www_dir, WWW_FILES);

    if loaded < WWW_FILES.len() {
        warn!(
            loaded,
            expected = WWW_FILES.len(),
            dir = %config.www_dir.display(),
            "some static files are missing"
        );
    }

    let mut server = Server::new(config).with_resources(Arc::new(resources));
    commands::register_defaults(&mut server)?;

    let shutdown = server.shutdown_token();
    let installed = ctrlc::set_handler(move || {
        info!("interrupt received, shutting down");
        shutdown.trigger();
    });

    if let Err(e) = installed {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let metrics = server.metrics().clone();
    server.run()?;

    match metrics.to_json() {
        Ok(json) => info!("final metrics:\n{}", json),
        Err(e) => warn!(error = %e, "could not serialize metrics"),
    }

    Ok(())
}
