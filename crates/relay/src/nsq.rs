//! Client for the nsqd HTTP publish endpoint.

use crate::RelayError;

const MAX_TOPIC_LEN: usize = 64;

/// Publishes raw messages to one NSQ topic via `POST {url}/pub?topic=...`.
///
/// The topic is sent as an encoded query parameter, so `#ephemeral` reaches
/// nsqd instead of being read as a URL fragment.
#[derive(Clone, Debug)]
pub struct NsqPublisher {
    client: reqwest::Client,
    endpoint: String,
    topic: String,
}

impl NsqPublisher {
    /// `url` is the nsqd HTTP address, e.g. `http://127.0.0.1:4151`.
    pub fn new(url: &str, topic: &str) -> Result<Self, RelayError> {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(RelayError::Config("empty nsqd url".to_string()));
        }
        if !is_valid_topic(topic) {
            return Err(RelayError::Config(format!("invalid nsq topic \"{topic}\"")));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: format!("{url}/pub"),
            topic: topic.to_string(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn publish(&self, data: Vec<u8>) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("topic", self.topic.as_str())])
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!("published to {}", self.topic);
        Ok(())
    }
}

/// nsqd accepts 1 to 64 characters out of `[.a-zA-Z0-9_-]`, optionally
/// followed by `#ephemeral`.
fn is_valid_topic(topic: &str) -> bool {
    let name = topic.strip_suffix("#ephemeral").unwrap_or(topic);
    !name.is_empty()
        && topic.len() <= MAX_TOPIC_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
