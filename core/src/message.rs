use crate::measurement::Measurement;
use crate::observation::{Observation, normalize_value};

/// A single value on its way to the broker.
///
/// `topic` is relative to the broker prefix: `{topic base}/{measurement}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

impl OutboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retain: false,
        }
    }

    /// Messages for every available reading of `observation`, in measurement order.
    ///
    /// Availability is decided on the normalized value, the payload keeps the raw one.
    pub fn from_observation(topic_base: &str, observation: &Observation) -> Vec<Self> {
        Measurement::ALL
            .iter()
            .filter_map(|measurement| {
                let raw = measurement.value(observation);
                if normalize_value(raw).is_empty() {
                    return None;
                }
                Some(Self::new(join_topic(topic_base, measurement.topic()), raw))
            })
            .collect()
    }
}

/// Joins two topic levels with exactly one `/` between them.
pub fn join_topic(prefix: &str, topic: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        topic.trim_start_matches('/')
    )
}
