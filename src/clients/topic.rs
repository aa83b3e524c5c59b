//! Topic client.

use serde::Serialize;

use crate::clients::cache::CacheValue;
use crate::clients::validation::{validate_cache_name, validate_name};
use crate::clients::wire::{call, Empty};
use crate::clients::ClientBuilder;
use crate::config::ConfigError;
use crate::outcome::{Outcome, OutcomeFamily};
use crate::pipeline::Pipeline;
use crate::transport::MethodDescriptor;

pub type TopicPublishResponse = Outcome<()>;

/// Publishing twice delivers twice, so publish is never retried.
const PUBLISH: MethodDescriptor =
    MethodDescriptor::data("cache_client.pubsub.Pubsub/Publish", false);

/// Message body published to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicValue {
    Text(String),
    Binary(CacheValue),
}

impl From<&str> for TopicValue {
    fn from(value: &str) -> Self {
        TopicValue::Text(value.to_string())
    }
}

impl From<String> for TopicValue {
    fn from(value: String) -> Self {
        TopicValue::Text(value)
    }
}

impl From<Vec<u8>> for TopicValue {
    fn from(value: Vec<u8>) -> Self {
        TopicValue::Binary(CacheValue::from(value))
    }
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    cache_name: &'a str,
    topic: &'a str,
    value: &'a TopicValue,
}

#[derive(Debug, Clone)]
pub struct TopicClient {
    pipeline: Pipeline,
}

impl TopicClient {
    pub fn builder() -> ClientBuilder<TopicClient> {
        ClientBuilder::new()
    }

    pub async fn publish(
        &self,
        cache_name: &str,
        topic_name: &str,
        value: impl Into<TopicValue>,
    ) -> TopicPublishResponse {
        let value = value.into();
        if let Err(error) =
            validate_cache_name(cache_name).and_then(|()| validate_name("topic", topic_name))
        {
            return Outcome::failure(error);
        }
        let request = PublishRequest { cache_name, topic: topic_name, value: &value };
        call(&self.pipeline, PUBLISH, cache_name, &request, |_: Empty| Outcome::Success(())).await
    }
}

impl ClientBuilder<TopicClient> {
    pub fn build(self) -> Result<TopicClient, ConfigError> {
        Ok(TopicClient { pipeline: self.pipeline()? })
    }
}
