//! Push notifications to a pub/sub hub over HTTP.

use anyhow::{Context, Result};
use hostwatch::HostStatus;
use serde::Serialize;
use tracing::debug;

const ACTION_PUB: &str = "PUB";
const TYPE_PLAIN: &str = "PLAIN";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PubMessage {
    pub action: &'static str,
    pub topics: Vec<String>,
    pub message: PayloadMessage,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PayloadMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: String,
}

impl PubMessage {
    /// Plain-text transition message published to the global topic, the
    /// service prefix and the host's own topic
    pub fn for_event(event: &HostStatus, topic_prefix: &str) -> Self {
        Self {
            action: ACTION_PUB,
            topics: vec![
                "global".to_string(),
                topic_prefix.to_string(),
                format!("{topic_prefix}/{}", event.host),
            ],
            message: PayloadMessage { kind: TYPE_PLAIN, data: event.to_string() },
        }
    }
}

pub struct HubClient {
    client: reqwest::Client,
    api_url: String,
    topic_prefix: String,
}

impl HubClient {
    pub fn new(client: reqwest::Client, api_url: String, topic_prefix: String) -> Self {
        Self { client, api_url, topic_prefix }
    }

    pub async fn publish(&self, event: &HostStatus) -> Result<()> {
        let message = PubMessage::for_event(event, &self.topic_prefix);
        debug!(topics = ?message.topics, "posting to hub");

        self.client
            .post(&self.api_url)
            .json(&message)
            .send()
            .await
            .context("hub request failed")?
            .error_for_status()
            .context("hub rejected message")?;

        Ok(())
    }
}
