use anyhow::{Context, Result};
use buienradar_broker::{BrokerAddress, MqttBroker};
use reqwest::Client as HTTPClient;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, DEFAULT_PREFIX, PREFIX_KEY};
use crate::feed::buienradar::Buienradar;
use crate::logging::Logger;
mod bridge;
mod config;
mod error;
mod feed;
mod logging;
mod observation_loop;
mod publisher;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() {
    logging::init();

    let logger = Logger::new();
    if let Err(err) = run(&logger).await {
        logger.error("bridge.fatal", &err, &format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn run(logger: &Logger) -> Result<()> {
    let config = Config::from_env()?;
    match &config.prefix {
        Some(prefix) => logger
            .clone()
            .key(PREFIX_KEY)
            .info("config.prefix", &format!("`{PREFIX_KEY}` set to `{prefix}`")),
        None => logger.clone().key(PREFIX_KEY).info(
            "config.prefix",
            &format!("`{PREFIX_KEY}` undefined, using default `{DEFAULT_PREFIX}`"),
        ),
    }

    let address: BrokerAddress = config.broker_host.parse()?;
    let broker = MqttBroker::connect(&address)
        .await
        .with_context(|| format!("could not connect to the broker at {address}"))?;
    logger.info("broker.connected", &format!("Connected to {address}"));

    let http_client = HTTPClient::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        let logger = logger.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                logger.info("bridge.shutdown", "Shutdown signal received");
                cancel.cancel();
            }
        }
    });

    bridge::run(
        Buienradar::new(http_client),
        broker,
        &config,
        logger.clone(),
        cancel,
    )
    .await?;

    logger.info("bridge.stopped", "Bridge stopped");
    Ok(())
}
