//! Worker-pool TCP connect scanner
//!
//! A fixed-size pool of tasks drains a shared queue of port numbers for one
//! host. Open ports flow through an mpsc channel so only the append step is
//! synchronized; `scan` returns once the queue is empty and every worker has
//! been joined.

pub mod engine;

pub use engine::ScanEngine;

use std::collections::VecDeque;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;

/// Concurrent port scanner for a single host
#[derive(Debug, Clone)]
pub struct PortScanner {
    workers: usize,
    connect_timeout: Duration,
}

impl PortScanner {
    pub fn new(workers: usize, connect_timeout: Duration) -> Self {
        Self {
            workers: workers.max(1),
            connect_timeout,
        }
    }

    /// Attempt every port in `ports` exactly once and return the sorted open
    /// subset. Refused, timed-out, and unreachable attempts are folded into
    /// "closed/filtered" and never surface as errors.
    pub async fn scan(&self, host: Ipv4Addr, ports: &[u16]) -> Vec<u16> {
        let queue: Arc<Mutex<VecDeque<u16>>> =
            Arc::new(Mutex::new(ports.iter().copied().collect()));
        let (open_tx, mut open_rx) = mpsc::unbounded_channel::<u16>();

        let mut handles = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            let queue = Arc::clone(&queue);
            let open_tx = open_tx.clone();
            let connect_timeout = self.connect_timeout;

            handles.push(tokio::spawn(async move {
                loop {
                    // Pop under the lock so each port is attempted exactly once
                    let port = { queue.lock().await.pop_front() };
                    let Some(port) = port else { break };

                    let addr = SocketAddr::from((host, port));
                    match timeout(connect_timeout, TcpStream::connect(addr)).await {
                        Ok(Ok(stream)) => {
                            drop(stream);
                            let _ = open_tx.send(port);
                        }
                        // Refused or timed out: closed/filtered, not an error
                        Ok(Err(_)) | Err(_) => {}
                    }
                }
            }));
        }
        drop(open_tx);

        // Barrier: the queue must be fully drained before results are read
        for handle in handles {
            let _ = handle.await;
        }

        let mut open = Vec::new();
        while let Some(port) = open_rx.recv().await {
            open.push(port);
        }
        open.sort_unstable();
        open
    }
}
