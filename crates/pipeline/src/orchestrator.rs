//! Bus subscriber that drives the pipeline.
//!
//! Each received event is handled on its own tokio task: events for
//! different tickets run concurrently, and even events for the same
//! ticket carry no ordering guarantee. The repositories' conditional
//! writes make that safe.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use deskpilot_events::TicketEvent;

use crate::context::PipelineContext;
use crate::handlers;

/// Long-lived pipeline driver.
pub struct Orchestrator {
    ctx: Arc<PipelineContext>,
}

impl Orchestrator {
    /// Create an orchestrator over the shared pipeline context.
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        Self { ctx }
    }

    /// Run the main loop until the bus closes or the token is cancelled.
    ///
    /// Spawned handler tasks are detached; in-flight events finish on
    /// their own after shutdown begins.
    pub async fn run(self, mut receiver: broadcast::Receiver<TicketEvent>, cancel: CancellationToken) {
        tracing::info!("Pipeline orchestrator started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Pipeline orchestrator shutting down");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => {
                        let ctx = self.ctx.clone();
                        tokio::spawn(async move {
                            handlers::handle_event(&ctx, event).await;
                        });
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Orchestrator lagged, events were dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, orchestrator shutting down");
                        break;
                    }
                }
            }
        }
    }
}
