//! # Published Messages
//!
//! A [`PubMsg`] is the external form of one publishable event: the event kind
//! as key and a JSON document with the block height and the attributes as
//! value.

use serde::Serialize;
use shared_types::Event;

/// Message handed to the publication sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubMsg {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

#[derive(Serialize)]
struct PubMsgBody<'a> {
    height: u64,
    attributes: Vec<(&'a str, &'a str)>,
}

impl PubMsg {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Convert a publishable event emitted at `height`.
    pub fn from_event(height: u64, event: &Event) -> Result<Self, serde_json::Error> {
        let body = PubMsgBody {
            height,
            attributes: event
                .attributes
                .iter()
                .map(|a| (a.key.as_str(), a.value.as_str()))
                .collect(),
        };
        Ok(Self {
            key: event.kind.as_bytes().to_vec(),
            value: serde_json::to_vec(&body)?,
        })
    }

    /// Key as text (event kind).
    pub fn topic(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }
}

/// Subscriber-side filter on message keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFilter {
    /// Keys to include. Empty means all keys.
    pub topics: Vec<String>,
}

impl TopicFilter {
    /// Create a filter that accepts every message.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific keys.
    #[must_use]
    pub fn topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn matches(&self, msg: &PubMsg) -> bool {
        self.topics.is_empty() || self.topics.iter().any(|t| t.as_bytes() == msg.key.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_event_keeps_kind_and_attributes() {
        let event = Event::new("send_coins")
            .with_attribute("from", "aa")
            .with_attribute("amount", 7);
        let msg = PubMsg::from_event(12, &event).unwrap();

        assert_eq!(msg.topic(), "send_coins");
        let body: serde_json::Value = serde_json::from_slice(&msg.value).unwrap();
        assert_eq!(body["height"], 12);
        assert_eq!(body["attributes"][1][1], "7");
    }

    #[test]
    fn test_topic_filter() {
        let msg = PubMsg::new("send_coins", "{}");
        assert!(TopicFilter::all().matches(&msg));
        assert!(TopicFilter::topics(["send_coins"]).matches(&msg));
        assert!(!TopicFilter::topics(["create_validator"]).matches(&msg));
    }
}
