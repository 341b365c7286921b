use crate::error::BridgeError;
use crate::logging::Logger;
use buienradar_broker::Broker;
use buienradar_core::handoff::HandoffReceiver;
use buienradar_core::{OutboundMessage, join_topic};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Pause after a failed idle poll; the next poll reconnects.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Sole writer to the broker: publishes handed-over messages one at a time under
/// `prefix`, keeping the connection alive in between.
pub struct Publisher<B> {
    broker: B,
    receiver: HandoffReceiver<OutboundMessage>,
    prefix: String,
    logger: Logger,
    cancel: CancellationToken,
}

impl<B: Broker> Publisher<B> {
    pub fn new(
        broker: B,
        receiver: HandoffReceiver<OutboundMessage>,
        prefix: impl Into<String>,
        logger: Logger,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            broker,
            receiver,
            prefix: prefix.into(),
            logger,
            cancel,
        }
    }

    /// Runs until every sender is gone or the token is cancelled, then disconnects.
    pub async fn run(mut self) -> Result<(), BridgeError> {
        loop {
            // A message winning the race drops the pending poll. While idle the event
            // loop only writes 2-byte PINGREQs, and a publish polls it again anyway.
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.logger.info("publisher.stopped", "Publisher cancelled");
                    break;
                }
                message = self.receiver.recv() => match message {
                    Some(message) => self.publish(message).await?,
                    None => {
                        self.logger.info("publisher.drained", "No producers left");
                        break;
                    }
                },
                polled = self.broker.poll() => {
                    if let Err(err) = polled {
                        self.logger.warn(
                            "publisher.connection_lost",
                            &format!("Broker connection lost while idle, reconnecting: {err}"),
                        );
                        tokio::select! {
                            _ = self.cancel.cancelled() => {}
                            _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                        }
                    }
                }
            }
        }

        if let Err(err) = self.broker.disconnect().await {
            self.logger
                .warn("publisher.disconnect_failed", &format!("Unclean disconnect: {err}"));
        }
        Ok(())
    }

    async fn publish(&mut self, message: OutboundMessage) -> Result<(), BridgeError> {
        let topic = join_topic(&self.prefix, &message.topic);
        let logger = self.logger.clone().topic(&topic).payload(&message.payload);

        if let Err(source) = self
            .broker
            .publish(&topic, &message.payload, message.retain)
            .await
        {
            logger.error("publisher.publish_failed", &source, "Could not publish message");
            return Err(BridgeError::Publish { topic, source });
        }

        logger.info("publisher.published", "Published message");
        Ok(())
    }
}
