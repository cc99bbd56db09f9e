//! Helpers for exercising the blocking adapters against a stalled backend.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A backend that accepts connections and never writes a byte.
pub(crate) async fn silent_backend() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (url, handle)
}

/// Await `call` while a ticker task runs on the same runtime.
///
/// Returns the call's output, how long it took, and how many 50ms ticks
/// fired meanwhile. Zero ticks means the call held the event loop.
pub(crate) async fn ticks_during<F: Future>(call: F) -> (F::Output, Duration, u32) {
    let ticks = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&ticks);
    let ticker = tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(50)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let started = Instant::now();
    let output = call.await;
    let elapsed = started.elapsed();
    ticker.abort();
    (output, elapsed, ticks.load(Ordering::SeqCst))
}
