use crate::feed::FeedError;
use buienradar_broker::BrokerError;
use thiserror::Error;

/// Conditions that stop the bridge; `main` exits non-zero on any of them.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("could not publish to `{topic}`: {source}")]
    Publish {
        topic: String,
        #[source]
        source: BrokerError,
    },

    #[error("publisher stopped taking messages")]
    PublisherGone,

    #[error("observation task ended abnormally: {0}")]
    ObservationTask(tokio::task::JoinError),
}
