use buienradar_core::Observation;
use buienradar_core::observation::FeedParseError;
use std::future::Future;
use thiserror::Error;
pub mod buienradar;

pub trait Feed {
    /// Every station in the feed, in feed order.
    fn fetch_observations(
        &self,
    ) -> impl Future<Output = Result<Vec<Observation>, FeedError>> + Send;
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("could not retrieve the feed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Parse(#[from] FeedParseError),
}
