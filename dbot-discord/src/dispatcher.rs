//! Bounded intake queue and dispatcher: one task per queued trigger.

use dbot_core::Message;
use handler_chain::HandlerChain;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Capacity of the intake queue between the gateway callback and the dispatcher.
pub const INTAKE_QUEUE_CAPACITY: usize = 128;

/// Sending half used by the gateway callback. Never blocks.
#[derive(Clone)]
pub struct IntakeQueue {
    tx: mpsc::Sender<Message>,
}

impl IntakeQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueues without waiting. Returns false (and logs) when the queue is full or closed.
    pub fn offer(&self, message: Message) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(message)) => {
                warn!(message_id = %message.id, "Intake queue full, message dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(message)) => {
                warn!(message_id = %message.id, "Intake queue closed, message dropped");
                false
            }
        }
    }
}

/// Receives triggers until `cancel` fires or the queue closes, running `chain.handle` for each on
/// its own task. In-flight tasks are awaited before returning; they observe `cancel` themselves.
pub async fn dispatch(
    mut rx: mpsc::Receiver<Message>,
    chain: HandlerChain,
    cancel: CancellationToken,
) {
    let mut tasks = JoinSet::new();

    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => {
                info!("Dispatcher cancelled");
                break;
            }
            message = rx.recv() => match message {
                Some(message) => message,
                None => {
                    info!("Intake queue closed");
                    break;
                }
            },
        };

        let chain = chain.clone();
        tasks.spawn(async move {
            info!(
                author_id = %message.author.id,
                channel_id = %message.channel.id,
                message_id = %message.id,
                "step: processing message (handler chain started)"
            );
            if let Err(e) = chain.handle(&message).await {
                error!(error = %e, message_id = %message.id, "Handler chain failed");
            }
        });

        // Reap finished tasks.
        while tasks.try_join_next().is_some() {}
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            error!(error = %e, "Message task panicked");
        }
    }
}
