use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub(crate) const TARGET: &str = "buienradar_fetcher";

/// JSON lines on stderr, level taken from `RUST_LOG` (default `info`).
pub(crate) fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .with_target(false)
        .init();
}

#[derive(Clone, Default)]
pub(crate) struct Logger {
    station: Option<String>,
    region: Option<String>,
    topic: Option<String>,
    payload: Option<String>,
    key: Option<&'static str>,
    url: Option<&'static str>,
}

impl Logger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }

    pub(crate) fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub(crate) fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub(crate) fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub(crate) fn key(mut self, key: &'static str) -> Self {
        self.key = Some(key);
        self
    }

    pub(crate) fn url(mut self, url: &'static str) -> Self {
        self.url = Some(url);
        self
    }

    pub(crate) fn info(&self, event: &'static str, message: &str) {
        info!(
            target: TARGET,
            event,
            station = self.station.as_deref(),
            region = self.region.as_deref(),
            topic = self.topic.as_deref(),
            payload = self.payload.as_deref(),
            key = self.key,
            url = self.url,
            "{}",
            message
        );
    }

    pub(crate) fn warn(&self, event: &'static str, message: &str) {
        warn!(
            target: TARGET,
            event,
            station = self.station.as_deref(),
            region = self.region.as_deref(),
            topic = self.topic.as_deref(),
            payload = self.payload.as_deref(),
            key = self.key,
            url = self.url,
            "{}",
            message
        );
    }

    pub(crate) fn error<E: std::fmt::Debug>(&self, event: &'static str, err: &E, message: &str) {
        error!(
            target: TARGET,
            event,
            station = self.station.as_deref(),
            region = self.region.as_deref(),
            topic = self.topic.as_deref(),
            payload = self.payload.as_deref(),
            key = self.key,
            url = self.url,
            error = ?err,
            "{}",
            message
        );
    }
}
