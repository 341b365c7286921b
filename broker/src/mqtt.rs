use crate::{Broker, BrokerAddress, BrokerError, CLIENT_ID, DISCONNECT_GRACE, KEEP_ALIVE};
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};

const REQUEST_CAPACITY: usize = 10;

/// MQTT connection that is only ever driven by its owner.
///
/// The event loop is polled inline by every call, so a publish returns once its
/// packet has been written and no background task is needed.
pub struct MqttBroker {
    client: AsyncClient,
    event_loop: EventLoop,
}

impl MqttBroker {
    /// Opens the connection and waits for the broker's CONNACK.
    pub async fn connect(address: &BrokerAddress) -> Result<Self, BrokerError> {
        let mut options = MqttOptions::new(CLIENT_ID, address.host.clone(), address.port);
        options.set_keep_alive(KEEP_ALIVE).set_clean_session(true);

        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);
        loop {
            if let Event::Incoming(Packet::ConnAck(ack)) = event_loop.poll().await? {
                if ack.code != ConnectReturnCode::Success {
                    return Err(BrokerError::Refused(ack.code));
                }
                break;
            }
        }

        Ok(Self { client, event_loop })
    }
}

impl Broker for MqttBroker {
    async fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> Result<(), BrokerError> {
        self.client
            .publish(topic, QoS::AtMostOnce, retain, payload.as_bytes().to_vec())
            .await?;
        loop {
            if let Event::Outgoing(Outgoing::Publish(_)) = self.event_loop.poll().await? {
                return Ok(());
            }
        }
    }

    async fn poll(&mut self) -> Result<(), BrokerError> {
        self.event_loop.poll().await?;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), BrokerError> {
        self.client.disconnect().await?;
        let event_loop = &mut self.event_loop;
        let sent = tokio::time::timeout(DISCONNECT_GRACE, async {
            loop {
                if let Event::Outgoing(Outgoing::Disconnect) = event_loop.poll().await? {
                    return Ok::<(), BrokerError>(());
                }
            }
        })
        .await;
        sent.map_err(|_| BrokerError::DisconnectTimeout(DISCONNECT_GRACE))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];
    const CONNACK_NOT_AUTHORIZED: [u8; 4] = [0x20, 0x02, 0x00, 0x05];

    /// Accepts one client, answers its CONNECT and returns every byte sent afterwards.
    async fn fake_broker(connack: [u8; 4]) -> (BrokerAddress, JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = BrokerAddress {
            host: "127.0.0.1".to_string(),
            port: listener.local_addr().unwrap().port(),
        };
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 1024];
            let read = socket.read(&mut buf).await.unwrap();
            assert!(read > 0);
            assert_eq!(buf[0], 0x10, "expected CONNECT");
            socket.write_all(&connack).await.unwrap();

            let mut received = Vec::new();
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(read) => received.extend_from_slice(&buf[..read]),
                }
            }
            received
        });
        (address, handle)
    }

    fn publish_frame(first_byte: u8, topic: &str, payload: &str) -> Vec<u8> {
        let mut frame = vec![first_byte, (2 + topic.len() + payload.len()) as u8];
        frame.extend_from_slice(&(topic.len() as u16).to_be_bytes());
        frame.extend_from_slice(topic.as_bytes());
        frame.extend_from_slice(payload.as_bytes());
        frame
    }

    #[tokio::test]
    async fn publish_writes_qos0_packets_in_order() {
        let (address, broker_side) = fake_broker(CONNACK_ACCEPTED).await;

        let mut broker = MqttBroker::connect(&address).await.unwrap();
        broker
            .publish("/home.arpa/weather/humidity", "77", false)
            .await
            .unwrap();
        broker
            .publish("/home.arpa/weather/wind", "4.2", true)
            .await
            .unwrap();
        broker.disconnect().await.unwrap();
        drop(broker);

        let mut expected = publish_frame(0x30, "/home.arpa/weather/humidity", "77");
        expected.extend(publish_frame(0x31, "/home.arpa/weather/wind", "4.2"));
        expected.extend([0xE0, 0x00]);
        assert_eq!(broker_side.await.unwrap(), expected);
    }

    #[tokio::test]
    async fn connect_reports_refused_connection() {
        let (address, _broker_side) = fake_broker(CONNACK_NOT_AUTHORIZED).await;
        let result = MqttBroker::connect(&address).await;
        assert!(matches!(
            result,
            Err(BrokerError::Refused(_)) | Err(BrokerError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn connect_fails_without_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let address = BrokerAddress {
            host: "127.0.0.1".to_string(),
            port,
        };
        assert!(matches!(
            MqttBroker::connect(&address).await,
            Err(BrokerError::Connection(_))
        ));
    }
}
