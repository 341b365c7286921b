pub mod handoff;
pub mod measurement;
pub mod message;
pub mod observation;
pub use measurement::Measurement;
pub use message::{OutboundMessage, join_topic};
pub use observation::{Observation, normalize_region, normalize_value, parse_feed};

/// Sentinel the feed uses for a reading that is not available.
pub const NOT_AVAILABLE: &str = "-";
