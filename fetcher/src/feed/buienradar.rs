use super::{Feed, FeedError};
use buienradar_core::{Observation, parse_feed};
use reqwest::Client as HTTPClient;

pub const FEED_URL: &str = "https://data.buienradar.nl/1.0/feed/xml";

pub struct Buienradar {
    http_client: HTTPClient,
    url: String,
}

impl Buienradar {
    pub fn new(http_client: HTTPClient) -> Self {
        Self {
            http_client,
            url: FEED_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_url(http_client: HTTPClient, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }
}

impl Feed for Buienradar {
    async fn fetch_observations(&self) -> Result<Vec<Observation>, FeedError> {
        let response = self.http_client.get(&self.url).send().await?;
        let body = response.error_for_status()?.bytes().await?;
        Ok(parse_feed(&body)?)
    }
}
