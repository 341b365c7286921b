use crate::config::{ObservationSettings, REGION_KEY, TOPIC_KEY};
use crate::error::BridgeError;
use crate::feed::{Feed, buienradar::FEED_URL};
use crate::logging::Logger;
use buienradar_core::OutboundMessage;
use buienradar_core::handoff::HandoffSender;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Fetches the feed every [`POLL_INTERVAL`] and hands one message per available
/// reading of the configured region to the publisher.
pub struct ObservationLoop<F> {
    feed: F,
    settings: ObservationSettings,
    sender: HandoffSender<OutboundMessage>,
    logger: Logger,
    cancel: CancellationToken,
}

impl<F: Feed> ObservationLoop<F> {
    pub fn new(
        feed: F,
        settings: ObservationSettings,
        sender: HandoffSender<OutboundMessage>,
        logger: Logger,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            feed,
            settings,
            sender,
            logger,
            cancel,
        }
    }

    /// Returns `Ok` when disabled by missing settings or once cancelled; any fetch
    /// or parse failure ends the loop with an error.
    pub async fn run(self) -> Result<(), BridgeError> {
        let Some(topic) = self.settings.topic.as_deref() else {
            self.logger.clone().key(TOPIC_KEY).warn(
                "observation.disabled",
                &format!("`{TOPIC_KEY}` is not set, observation loop disabled"),
            );
            return Ok(());
        };
        let Some(region) = self.settings.region.as_deref() else {
            self.logger.clone().key(REGION_KEY).warn(
                "observation.disabled",
                &format!("`{REGION_KEY}` is not set, observation loop disabled"),
            );
            return Ok(());
        };

        loop {
            match self.run_cycle(topic, region).await {
                Ok(()) => {}
                Err(BridgeError::PublisherGone) if self.cancel.is_cancelled() => return Ok(()),
                Err(err) => return Err(err),
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.logger.info("observation.stopped", "Observation loop cancelled");
                    return Ok(());
                }
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }
        }
    }

    async fn run_cycle(&self, topic: &str, region: &str) -> Result<(), BridgeError> {
        let observations = self.feed.fetch_observations().await.inspect_err(|err| {
            self.logger
                .clone()
                .url(FEED_URL)
                .error("feed.fetch_failed", err, "Could not fetch the feed");
        })?;

        let mut sent = 0usize;
        for observation in observations.iter().filter(|o| o.in_region(region)) {
            let messages = OutboundMessage::from_observation(topic, observation);
            self.logger
                .clone()
                .station(&observation.station.name)
                .region(region)
                .info(
                    "observation.matched",
                    &format!("Station {} has {} readings", observation.code, messages.len()),
                );
            for message in messages {
                self.sender
                    .send(message)
                    .await
                    .map_err(|_| BridgeError::PublisherGone)?;
                sent += 1;
            }
        }

        self.logger.clone().region(region).info(
            "observation.cycle_done",
            &format!(
                "Handed {sent} messages from {} stations to the publisher",
                observations.len()
            ),
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::feed::FeedError;
    use buienradar_core::handoff;
    use buienradar_core::observation::{FeedParseError, Observation, StationName, parse_feed};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves the same stations on every fetch, optionally cancelling a token
    /// once `cycles` fetches happened.
    #[derive(Clone)]
    pub(crate) struct FakeFeed {
        stations: Vec<Observation>,
        fetches: Arc<AtomicUsize>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl FakeFeed {
        pub(crate) fn new(stations: Vec<Observation>) -> Self {
            Self {
                stations,
                fetches: Arc::new(AtomicUsize::new(0)),
                cancel_after: None,
            }
        }

        pub(crate) fn cancelling(mut self, cycles: usize, cancel: CancellationToken) -> Self {
            self.cancel_after = Some((cycles, cancel));
            self
        }

        pub(crate) fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl Feed for FakeFeed {
        async fn fetch_observations(&self) -> Result<Vec<Observation>, FeedError> {
            let fetched = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((cycles, cancel)) = &self.cancel_after
                && fetched >= *cycles
            {
                cancel.cancel();
            }
            Ok(self.stations.clone())
        }
    }

    struct BrokenFeed;

    impl Feed for BrokenFeed {
        async fn fetch_observations(&self) -> Result<Vec<Observation>, FeedError> {
            let err: FeedParseError = parse_feed(b"<buienradarnl>").unwrap_err();
            Err(FeedError::Parse(err))
        }
    }

    pub(crate) fn station(region: &str, humidity: &str, rain: &str) -> Observation {
        Observation {
            code: "6344".to_string(),
            station: StationName {
                region: region.to_string(),
                name: format!("Meetstation {region}"),
            },
            humidity: humidity.to_string(),
            temperature_ground: "-".to_string(),
            temperature_10cm: "-".to_string(),
            wind_speed: "-".to_string(),
            gust_speed: "-".to_string(),
            air_pressure: "-".to_string(),
            rain: rain.to_string(),
            sight_range: "-".to_string(),
            ..Observation::default()
        }
    }

    pub(crate) fn settings(topic: Option<&str>, region: Option<&str>) -> ObservationSettings {
        ObservationSettings {
            topic: topic.map(str::to_string),
            region: region.map(str::to_string),
        }
    }

    /// Runs the loop for `cycles` fetches and collects what it handed over.
    async fn collect(
        stations: Vec<Observation>,
        settings: ObservationSettings,
        cycles: usize,
    ) -> (Vec<OutboundMessage>, usize) {
        let cancel = CancellationToken::new();
        let feed = FakeFeed::new(stations).cancelling(cycles, cancel.clone());
        let (sender, mut receiver) = handoff::channel();
        let observation =
            ObservationLoop::new(feed.clone(), settings, sender, Logger::new(), cancel);
        let handle = tokio::spawn(observation.run());

        let mut received = Vec::new();
        while let Some(message) = receiver.recv().await {
            received.push(message);
        }
        handle.await.unwrap().unwrap();
        (received, feed.fetches())
    }

    #[tokio::test]
    async fn publishes_present_readings_of_matching_region() {
        let (received, fetches) = collect(
            vec![station("Zuid-Holland", "77", "-")],
            settings(Some("weather"), Some("zuid-holland")),
            1,
        )
        .await;
        assert_eq!(received, vec![OutboundMessage::new("weather/humidity", "77")]);
        assert_eq!(fetches, 1);
    }

    #[tokio::test]
    async fn other_regions_produce_nothing() {
        let (received, fetches) = collect(
            vec![station("Friesland", "77", "0.4")],
            settings(Some("weather"), Some("zuid-holland")),
            1,
        )
        .await;
        assert!(received.is_empty());
        assert_eq!(fetches, 1);
    }

    #[tokio::test]
    async fn every_matching_station_is_published_in_feed_order() {
        let (received, _) = collect(
            vec![
                station("Zuid Holland", "80", "0.1"),
                station("Friesland", "60", "-"),
                station("zuid-holland", "-", "0.3"),
            ],
            settings(Some("weather"), Some("zuid-holland")),
            1,
        )
        .await;
        assert_eq!(
            received,
            vec![
                OutboundMessage::new("weather/humidity", "80"),
                OutboundMessage::new("weather/rain", "0.1"),
                OutboundMessage::new("weather/rain", "0.3"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn polls_again_after_the_interval() {
        let (received, fetches) = collect(
            vec![station("Zuid-Holland", "77", "-")],
            settings(Some("weather"), Some("zuid-holland")),
            3,
        )
        .await;
        assert_eq!(fetches, 3);
        assert_eq!(received.len(), 3);
    }

    #[tokio::test]
    async fn missing_settings_disable_the_loop() {
        for settings in [
            settings(None, Some("zuid-holland")),
            settings(Some("weather"), None),
            settings(None, None),
        ] {
            let (received, fetches) =
                collect(vec![station("Zuid-Holland", "77", "0.4")], settings, 1).await;
            assert!(received.is_empty());
            assert_eq!(fetches, 0);
        }
    }

    #[tokio::test]
    async fn feed_failure_ends_the_loop() {
        let (sender, _receiver) = handoff::channel();
        let observation = ObservationLoop::new(
            BrokenFeed,
            settings(Some("weather"), Some("zuid-holland")),
            sender,
            Logger::new(),
            CancellationToken::new(),
        );
        assert!(matches!(
            observation.run().await,
            Err(BridgeError::Feed(FeedError::Parse(_)))
        ));
    }

    #[tokio::test]
    async fn stops_when_publisher_is_gone() {
        let (sender, receiver) = handoff::channel();
        drop(receiver);
        let feed = FakeFeed::new(vec![station("Zuid-Holland", "77", "-")]);
        let observation = ObservationLoop::new(
            feed,
            settings(Some("weather"), Some("zuid-holland")),
            sender,
            Logger::new(),
            CancellationToken::new(),
        );
        assert!(matches!(
            observation.run().await,
            Err(BridgeError::PublisherGone)
        ));
    }
}
