//! TCP acceptor and per-connection request loop (spec.md §4.2/§5).
//!
//! One acceptor thread owns the listening socket, polls for new
//! connections with a 1-second accept timeout so the shutdown flag is
//! checked at least every second, and spawns one reader thread per
//! connection. Each reader performs a blocking framed read, hands the
//! request to the worker pool, and does not read the next request from
//! that connection until the worker has written the response — this is
//! what keeps per-connection ordering single-flight (spec.md §4.2).

use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::dispatcher;
use crate::protocol::codec::{read_frame, write_frame};
use crate::protocol::frame::FrameError;
use crate::state::AppState;
use crate::worker_pool::WorkerPool;

pub fn run(listener: TcpListener, state: Arc<AppState>, pool: Arc<WorkerPool>, running: Arc<AtomicBool>) -> std::io::Result<()> {
    listener.set_nonblocking(true)?;

    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, addr)) => {
                tracing::info!(%addr, "accepted connection");
                let state = state.clone();
                let pool = pool.clone();
                let running = running.clone();
                std::thread::spawn(move || handle_connection(stream, state, pool, running));
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_secs(1));
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
            }
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream, state: Arc<AppState>, pool: Arc<WorkerPool>, running: Arc<AtomicBool>) {
    stream.set_nonblocking(false).ok();

    while running.load(Ordering::SeqCst) {
        let request = match read_frame(&mut stream) {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            Err(e) => {
                tracing::debug!(error = %e, "framing error, closing connection");
                break;
            }
        };

        let (tx, rx) = std::sync::mpsc::channel();
        let state = state.clone();
        let submitted = pool.submit(move || {
            let now = crate::now_unix();
            let response = dispatcher::dispatch(&state, &request, now);
            let _ = tx.send(response);
        });
        if submitted.is_err() {
            tracing::warn!("worker pool rejected job during shutdown");
            break;
        }

        let Ok(response) = rx.recv() else { break };
        if let Err(e) = write_frame(&mut stream, &response) {
            tracing::debug!(error = %e, "write failed, closing connection");
            break;
        }
        let _ = stream.flush();
    }
}
