use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use roam_core::{CoreError, CoreResult};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

fn encode<E: Serialize>(event: &E) -> CoreResult<String> {
    serde_json::to_string(event)
        .map_err(|e| CoreError::Dependency(format!("event encoding failed: {}", e)))
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }

    /// Serializes the event and publishes it keyed for per-entity
    /// ordering. Callers on the request path treat the result as
    /// fire-and-forget.
    pub async fn publish<E: Serialize>(
        &self,
        topic: &str,
        key: &str,
        event: &E,
    ) -> CoreResult<()> {
        let payload = encode(event)?;
        let record = FutureRecord::to(topic).key(key).payload(&payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                info!(
                    "Published to {} key {}: partition {} offset {}",
                    topic, key, delivery.partition, delivery.offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to publish to {}: {}", topic, e);
                Err(CoreError::Dependency(format!(
                    "kafka publish failed: {}",
                    e
                )))
            }
        }
    }
}
