//! MetadataService - background thread for track lookups
//!
//! Lookups block on the network, so they run on a dedicated thread. Commands
//! arrive over a crossbeam channel and results go back through oneshot reply
//! channels that the cache polls from the UI loop.
//!
//! Shutdown also raises a stop flag, so lookups still queued behind it are
//! dropped instead of being run; their replies close unanswered.

use crossbeam::channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;

use super::{LookupError, TrackInfo, TrackLookup};

/// Commands accepted by the metadata service
pub enum MetadataCommand {
    Resolve {
        track_id: String,
        reply: oneshot::Sender<Result<TrackInfo, LookupError>>,
    },
    Shutdown,
}

/// Handle to a running service thread
pub struct ServiceHandle<Cmd> {
    /// Channel for sending commands to the service
    pub command_tx: Sender<Cmd>,
    /// Thread handle for the service
    pub thread_handle: Option<thread::JoinHandle<()>>,
    /// Raised on shutdown; the service stops before its next command
    pub stop: Arc<AtomicBool>,
}

impl<Cmd> ServiceHandle<Cmd> {
    /// Check if the service is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Wait for the service thread to exit
    pub fn join(mut self) {
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("metadata: service thread panicked");
            }
        }
    }
}

pub struct MetadataService {
    lookup: Box<dyn TrackLookup>,
    command_rx: Receiver<MetadataCommand>,
    stop: Arc<AtomicBool>,
}

impl MetadataService {
    /// Spawn the service on a named background thread
    pub fn spawn(lookup: Box<dyn TrackLookup>) -> Result<ServiceHandle<MetadataCommand>, String> {
        let (command_tx, command_rx) = crossbeam::channel::unbounded();

        let stop = Arc::new(AtomicBool::new(false));

        let service = MetadataService {
            lookup,
            command_rx,
            stop: Arc::clone(&stop),
        };

        let handle = thread::Builder::new()
            .name("metadata-service".into())
            .spawn(move || {
                service.run();
            })
            .map_err(|e| format!("Failed to spawn metadata service thread: {}", e))?;

        Ok(ServiceHandle {
            command_tx,
            thread_handle: Some(handle),
            stop,
        })
    }

    fn run(self) {
        log::info!("MetadataService started");

        while let Ok(cmd) = self.command_rx.recv() {
            if self.stop.load(Ordering::Acquire) {
                drop(cmd);
                let dropped = self.command_rx.try_iter().count() + 1;
                log::info!(
                    "MetadataService stopping, dropped {} queued command(s)",
                    dropped
                );
                break;
            }
            match cmd {
                MetadataCommand::Resolve { track_id, reply } => {
                    log::debug!("metadata: resolving {}", track_id);
                    let result = self.lookup.lookup(&track_id);
                    let _ = reply.send(result);
                }
                MetadataCommand::Shutdown => {
                    log::info!("MetadataService shutting down");
                    break;
                }
            }
        }

        log::info!("MetadataService stopped");
    }
}

/// Client side of the metadata service
#[derive(Clone)]
pub struct MetadataClient {
    command_tx: Sender<MetadataCommand>,
    stop: Arc<AtomicBool>,
}

impl MetadataClient {
    pub fn new(handle: &ServiceHandle<MetadataCommand>) -> Self {
        Self {
            command_tx: handle.command_tx.clone(),
            stop: Arc::clone(&handle.stop),
        }
    }

    /// Queue a lookup; the reply arrives on the returned receiver
    pub fn resolve(
        &self,
        track_id: &str,
    ) -> Result<oneshot::Receiver<Result<TrackInfo, LookupError>>, LookupError> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(MetadataCommand::Resolve {
                track_id: track_id.to_string(),
                reply: tx,
            })
            .map_err(|_| LookupError::ServiceUnavailable)?;
        Ok(rx)
    }

    /// Resolve and wait for the answer (blocking)
    ///
    /// Must not be called from inside an async runtime.
    pub fn resolve_blocking(&self, track_id: &str) -> Result<TrackInfo, LookupError> {
        let rx = self.resolve(track_id)?;
        rx.blocking_recv()
            .map_err(|_| LookupError::ServiceUnavailable)?
    }

    /// Stop the service; queued lookups are dropped, not run
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Release);
        let _ = self.command_tx.send(MetadataCommand::Shutdown);
    }
}
