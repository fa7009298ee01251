use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

use error::StartupError;

fn main() -> ExitCode {
    let cfg = match config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            logger::log_fatal(&StartupError::from(e).to_string());
            return ExitCode::FAILURE;
        }
    };

    if let Err(code) = preflight(&cfg) {
        return code;
    }

    match run(cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_fatal(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Checks that must pass before the runtime is built or anything is bound
fn preflight(cfg: &config::Config) -> Result<(), ExitCode> {
    cfg.validate().map_err(|e| {
        if e.is_missing_build() {
            logger::log_missing_build(&e.to_string(), &cfg.site.build_hint);
        } else {
            logger::log_fatal(&e.to_string());
        }
        ExitCode::FAILURE
    })
}

fn run(cfg: config::Config) -> Result<(), StartupError> {
    logger::init(&cfg).map_err(StartupError::LogFile)?;

    // Create the Tokio runtime, sized by the optional workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), StartupError> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)
        .map_err(|source| StartupError::Bind { addr, source })?;

    let state = Arc::new(config::AppState::new(&cfg));
    logger::log_server_start(&addr, &cfg);

    server::start_server_loop(listener, state, async {
        match server::wait_for_shutdown().await {
            Ok(signal) => logger::log_signal(signal),
            Err(e) => {
                // Without signal handlers the server simply runs until killed
                logger::log_error(&format!("Failed to register signal handlers: {e}"));
                std::future::pending::<()>().await;
            }
        }
    })
    .await;

    logger::log_shutdown();
    Ok(())
}
