use rumqttc::{ClientError, ConnectReturnCode, ConnectionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("invalid broker address `{address}`: {reason}")]
    InvalidAddress {
        address: String,
        reason: &'static str,
    },

    #[error("broker refused the connection: {0:?}")]
    Refused(ConnectReturnCode),

    #[error("broker client request failed: {0}")]
    Client(#[from] ClientError),

    #[error("broker connection failed: {0}")]
    Connection(#[from] ConnectionError),

    #[error("disconnect not sent within {0:?}")]
    DisconnectTimeout(std::time::Duration),
}
