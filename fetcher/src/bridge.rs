use crate::config::Config;
use crate::error::BridgeError;
use crate::feed::Feed;
use crate::logging::Logger;
use crate::observation_loop::ObservationLoop;
use crate::publisher::Publisher;
use buienradar_broker::Broker;
use buienradar_core::handoff;
use tokio_util::sync::CancellationToken;

/// Spawns the observation loop and publishes on the current task until the
/// publisher stops or either side fails. The first failure is returned as is.
pub async fn run<F, B>(
    feed: F,
    broker: B,
    config: &Config,
    logger: Logger,
    cancel: CancellationToken,
) -> Result<(), BridgeError>
where
    F: Feed + Send + Sync + 'static,
    B: Broker,
{
    let (sender, receiver) = handoff::channel();
    // Keeps the channel open when the observation loop disables itself.
    let idle_sender = sender.clone();

    let observation = ObservationLoop::new(
        feed,
        config.observation.clone(),
        sender,
        logger.clone(),
        cancel.clone(),
    );
    let mut observation = tokio::spawn(observation.run());

    let publisher = Publisher::new(broker, receiver, config.prefix(), logger, cancel).run();
    tokio::pin!(publisher);

    let mut observing = true;
    let result = loop {
        tokio::select! {
            joined = &mut observation, if observing => {
                observing = false;
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => break Err(err),
                    Err(err) => break Err(BridgeError::ObservationTask(err)),
                }
            }
            published = &mut publisher => break published,
        }
    };

    if result.is_err() {
        observation.abort();
    }
    drop(idle_sender);
    result
}
