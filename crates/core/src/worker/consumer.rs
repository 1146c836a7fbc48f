//! Queue consumer loop.
//!
//! Single-concurrency by design: one message is pulled, processed to a
//! terminal state, and acknowledged before the next poll. Horizontal scale
//! comes from running more worker processes against the same queue; the
//! queue's visibility timeout is the only mutual exclusion between them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::WorkerConfig;
use crate::metrics::{MESSAGES_MALFORMED, MESSAGES_RECEIVED};
use crate::queue::{JobQueue, QueueMessage, TranscriptionRequest};

use super::pipeline::JobPipeline;

/// What one poll cycle did. Exposed for tests and supervision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No message arrived within the long-poll window.
    Idle,
    /// A message was processed (successfully or not) and acknowledged.
    Handled,
    /// A message body failed to parse and was left for redelivery.
    Malformed,
    /// The queue itself failed; the loop backs off and continues.
    QueueError,
}

/// Long-running queue worker.
pub struct Worker {
    queue: Arc<dyn JobQueue>,
    pipeline: Arc<JobPipeline>,
    config: WorkerConfig,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Worker {
    pub fn new(queue: Arc<dyn JobQueue>, pipeline: Arc<JobPipeline>, config: WorkerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            queue,
            pipeline,
            config,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Signal the polling loop to stop after the in-flight job finishes.
    /// Cancellation mid-job is deliberately unsupported.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Poll-process-acknowledge loop. Runs until `stop()` is called.
    ///
    /// A single bad job must never terminate the worker: every error path
    /// logs and keeps polling.
    pub async fn run(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Worker already running");
            return;
        }
        info!("Worker started");

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Worker received shutdown signal");
                    break;
                }
                outcome = self.poll_once() => {
                    if !self.running.load(Ordering::SeqCst) {
                        break;
                    }
                    if outcome == PollOutcome::QueueError {
                        tokio::time::sleep(Duration::from_secs(
                            self.config.error_backoff_secs as u64,
                        ))
                        .await;
                    }
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("Worker stopped");
    }

    /// One receive-process-acknowledge cycle.
    pub async fn poll_once(&self) -> PollOutcome {
        let message = match self.queue.receive().await {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!("no messages, waiting");
                return PollOutcome::Idle;
            }
            Err(e) => {
                error!(error = %e, "queue receive failed");
                return PollOutcome::QueueError;
            }
        };

        MESSAGES_RECEIVED.inc();
        self.handle_message(message).await
    }

    async fn handle_message(&self, message: QueueMessage) -> PollOutcome {
        // A body we cannot parse is left alone: the queue's own redelivery
        // and expiry policy deals with it.
        let request = match TranscriptionRequest::parse(&message.body) {
            Ok(request) => request,
            Err(e) => {
                MESSAGES_MALFORMED.inc();
                warn!(error = %e, body = %message.body, "malformed message body; leaving for redelivery");
                return PollOutcome::Malformed;
            }
        };

        if let Err(e) = self.pipeline.run(&request).await {
            error!(job_id = request.video_id, stage = e.stage(), error = %e, "job run failed");
        }

        // Acknowledge on success AND failure: a permanently failing job must
        // not loop forever. Operators inspect status=failed records instead.
        if let Err(e) = self.queue.delete(&message.receipt_handle).await {
            error!(error = %e, "failed to delete queue message");
        }

        PollOutcome::Handled
    }
}
