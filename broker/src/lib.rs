pub mod address;
pub mod error;
pub mod mqtt;
pub use address::BrokerAddress;
pub use error::BrokerError;
pub use mqtt::MqttBroker;

use std::time::Duration;

pub const CLIENT_ID: &str = "mqtt-cron";
pub const DEFAULT_PORT: u16 = 1883;
pub const KEEP_ALIVE: Duration = Duration::from_secs(5);
pub const DISCONNECT_GRACE: Duration = Duration::from_millis(250);

/// Exclusive handle on a broker connection.
pub trait Broker {
    /// Publishes `payload` on `topic` and waits until the client has sent it.
    async fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> Result<(), BrokerError>;

    /// Drives the connection while there is nothing to publish.
    async fn poll(&mut self) -> Result<(), BrokerError>;

    async fn disconnect(&mut self) -> Result<(), BrokerError>;
}
