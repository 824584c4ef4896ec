//! tradesim-server entry point.
//!
//! `tradesim-server [port]` — binds the listener, opens the store,
//! spawns the worker pool and a background maintenance thread, then
//! runs the TCP accept loop until SIGINT/SIGTERM flips the running
//! flag (spec.md §5/§6).

use std::net::TcpListener;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tradesim_server::config::ServerConfig;
use tradesim_server::state::AppState;
use tradesim_server::worker_pool::WorkerPool;
use tradesim_server::{logging, net};

fn parse_port_arg() -> Option<u16> {
    std::env::args().nth(1).and_then(|s| s.parse().ok())
}

fn main() -> ExitCode {
    let config = ServerConfig::from_env(parse_port_arg());
    let _log_guard = logging::init_logging(&config);

    let state = match AppState::new(config.clone()) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize server state");
            return ExitCode::FAILURE;
        }
    };

    let listener = match TcpListener::bind(("0.0.0.0", config.port)) {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, port = config.port, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    let pool = Arc::new(WorkerPool::new(config.worker_count, config.queue_capacity));
    let running = Arc::new(AtomicBool::new(true));

    let shutdown_flag = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("shutdown signal received");
        shutdown_flag.store(false, Ordering::SeqCst);
    }) {
        tracing::warn!(error = %e, "failed to install signal handler");
    }

    let maintenance_state = state.clone();
    let maintenance_running = running.clone();
    let maintenance_thread = std::thread::spawn(move || {
        while maintenance_running.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_secs(30));
            maintenance_state.run_maintenance_sweep(tradesim_server::now_unix());
        }
    });

    tracing::info!(
        port = config.port,
        workers = config.worker_count,
        git_hash = env!("GIT_HASH"),
        "tradesim-server listening"
    );

    let result = net::run(listener, state, pool.clone(), running);

    let _ = maintenance_thread.join();

    // Connection threads hold their own Arc<WorkerPool> clone until their
    // current read_frame call returns, which can lag the accept loop
    // exiting by up to one in-flight request. Give them a moment to drain
    // before reclaiming the pool for an owned shutdown.
    let mut pool = pool;
    for _ in 0..50 {
        match Arc::try_unwrap(pool) {
            Ok(pool) => {
                pool.shutdown();
                break;
            }
            Err(still_shared) => {
                pool = still_shared;
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }

    match result {
        Ok(()) => {
            tracing::info!("tradesim-server shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "accept loop exited with error");
            ExitCode::FAILURE
        }
    }
}
