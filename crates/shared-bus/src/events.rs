//! # Bus Events
//!
//! The trait every bus payload implements, and the topic filter used by
//! subscribers.

/// Wildcard topic accepted by every filter.
pub const ALL_TOPICS: &str = "*";

/// An event that can travel through the bus.
///
/// Events are cloned once per subscriber, so payloads should be cheap to
/// clone or wrapped in `Arc`.
pub trait BusEvent: Clone + Send + Sync + 'static {
    /// Topic used for subscription filtering.
    fn topic(&self) -> &'static str;
}

/// Filter for subscribing to specific topics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
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

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches<E: BusEvent>(&self, event: &E) -> bool {
        let topic = event.topic();
        self.topics.is_empty() || self.topics.iter().any(|t| t == ALL_TOPICS || t == topic)
    }
}
