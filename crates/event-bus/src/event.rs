//! Domain event record and its identity types.
//!
//! Events are immutable once built. The payload is an open JSON map so
//! publishers and handlers agree on keys rather than on a shared struct.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregate version at the moment an event was emitted.
///
/// Events default to version 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the first version (1).
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::first()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Discriminator of a domain event.
///
/// Known budget lifecycle events get their own variant. Anything else is
/// carried verbatim in `Unrecognized` so that consumers can log and skip it
/// instead of failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    BudgetSent,
    BudgetApproved,
    BudgetRejected,
    Unrecognized(String),
}

impl EventType {
    /// Returns the wire name of the event type.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::BudgetSent => "BudgetSent",
            EventType::BudgetApproved => "BudgetApproved",
            EventType::BudgetRejected => "BudgetRejected",
            EventType::Unrecognized(name) => name,
        }
    }

    /// Returns true for the budget lifecycle variants.
    pub fn is_known(&self) -> bool {
        !matches!(self, EventType::Unrecognized(_))
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        match name {
            "BudgetSent" => EventType::BudgetSent,
            "BudgetApproved" => EventType::BudgetApproved,
            "BudgetRejected" => EventType::BudgetRejected,
            other => EventType::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        match EventType::from(name.as_str()) {
            EventType::Unrecognized(_) => EventType::Unrecognized(name),
            known => known,
        }
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Unrecognized(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// An immutable record describing something that happened to an aggregate.
///
/// Fields are only readable once built; a new event is created for every
/// state transition and dropped after dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    event_id: EventId,
    aggregate_id: String,
    event_type: EventType,
    timestamp: DateTime<Utc>,
    version: Version,
    data: HashMap<String, serde_json::Value>,
}

impl DomainEvent {
    /// Creates an event with version 1, the current time and the given payload.
    pub fn new(
        aggregate_id: impl Into<String>,
        event_type: impl Into<EventType>,
        data: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::builder(aggregate_id, event_type).data(data).build()
    }

    /// Starts building an event for the given aggregate and type.
    pub fn builder(
        aggregate_id: impl Into<String>,
        event_type: impl Into<EventType>,
    ) -> DomainEventBuilder {
        DomainEventBuilder {
            event_id: None,
            aggregate_id: aggregate_id.into(),
            event_type: event_type.into(),
            timestamp: None,
            version: Version::first(),
            data: HashMap::new(),
        }
    }

    /// Returns the unique id of this event.
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Returns the id of the aggregate the event concerns.
    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    /// Returns the type discriminator handlers are routed by.
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Returns when the event was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the aggregate version the event was recorded at.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the event-specific payload.
    pub fn data(&self) -> &HashMap<String, serde_json::Value> {
        &self.data
    }

    /// Returns a payload entry as a string slice, if present and textual.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(serde_json::Value::as_str)
    }

    /// Returns a payload entry as an integer, if present and numeric.
    pub fn data_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(serde_json::Value::as_i64)
    }
}

/// Builder for domain events.
///
/// Identity and timestamp are generated at `build` unless set explicitly.
#[derive(Debug)]
pub struct DomainEventBuilder {
    event_id: Option<EventId>,
    aggregate_id: String,
    event_type: EventType,
    timestamp: Option<DateTime<Utc>>,
    version: Version,
    data: HashMap<String, serde_json::Value>,
}

impl DomainEventBuilder {
    /// Sets the event ID. If not set, a new ID will be generated.
    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    /// Sets the aggregate version.
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Adds a single payload entry.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Replaces the payload with the given map.
    pub fn data(mut self, data: HashMap<String, serde_json::Value>) -> Self {
        self.data = data;
        self
    }

    /// Merges the fields of a serializable struct into the payload.
    ///
    /// Fails if `payload` does not serialize to a JSON object.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        let fields: HashMap<String, serde_json::Value> =
            serde_json::from_value(serde_json::to_value(payload)?)?;
        self.data.extend(fields);
        Ok(self)
    }

    /// Builds the event, filling in a fresh id and the current time if unset.
    pub fn build(self) -> DomainEvent {
        DomainEvent {
            event_id: self.event_id.unwrap_or_default(),
            aggregate_id: self.aggregate_id,
            event_type: self.event_type,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            version: self.version,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_id_new_creates_unique_ids() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn version_defaults_to_first() {
        assert_eq!(Version::default(), Version::first());
        assert_eq!(Version::first().next().as_i64(), 2);
    }

    #[test]
    fn event_type_parses_known_names() {
        assert_eq!(EventType::from("BudgetSent"), EventType::BudgetSent);
        assert_eq!(EventType::from("BudgetApproved"), EventType::BudgetApproved);
        assert_eq!(EventType::from("BudgetRejected"), EventType::BudgetRejected);
        assert!(EventType::BudgetSent.is_known());
    }

    #[test]
    fn event_type_keeps_unknown_names_verbatim() {
        let event_type = EventType::from("UnknownType".to_string());
        assert_eq!(event_type, EventType::Unrecognized("UnknownType".into()));
        assert!(!event_type.is_known());
        assert_eq!(event_type.to_string(), "UnknownType");
    }

    #[test]
    fn new_event_gets_generated_identity_and_default_version() {
        let before = Utc::now();
        let a = DomainEvent::new("b-1", "BudgetSent", HashMap::new());
        let b = DomainEvent::new("b-1", "BudgetSent", HashMap::new());

        assert_ne!(a.event_id(), b.event_id());
        assert_eq!(a.version(), Version::first());
        assert!(a.timestamp() >= before);
        assert_eq!(a.aggregate_id(), "b-1");
        assert_eq!(a.event_type(), &EventType::BudgetSent);
    }

    #[test]
    fn builder_sets_payload_fields() {
        let event = DomainEvent::builder("b-1", EventType::BudgetSent)
            .version(Version::new(3))
            .field("clientId", "c1")
            .field("budgetTotal", "100.00")
            .field("validityPeriod", 7)
            .build();

        assert_eq!(event.version().as_i64(), 3);
        assert_eq!(event.data_str("clientId"), Some("c1"));
        assert_eq!(event.data_str("budgetTotal"), Some("100.00"));
        assert_eq!(event.data_i64("validityPeriod"), Some(7));
        assert_eq!(event.data_str("validityPeriod"), None);
        assert_eq!(event.data_str("missing"), None);
    }

    #[test]
    fn builder_merges_struct_payload() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            client_id: String,
            reason: String,
        }

        let event = DomainEvent::builder("b-1", EventType::BudgetRejected)
            .payload(&Payload {
                client_id: "c1".into(),
                reason: "too expensive".into(),
            })
            .unwrap()
            .build();

        assert_eq!(event.data_str("clientId"), Some("c1"));
        assert_eq!(event.data_str("reason"), Some("too expensive"));
    }

    #[test]
    fn builder_rejects_non_object_payload() {
        let result = DomainEvent::builder("b-1", EventType::BudgetSent).payload(&42);
        assert!(result.is_err());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let event = DomainEvent::builder("b-1", EventType::BudgetSent)
            .field("clientId", "c1")
            .build();

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["aggregateId"], json!("b-1"));
        assert_eq!(value["eventType"], json!("BudgetSent"));
        assert_eq!(value["version"], json!(1));
        assert_eq!(value["data"]["clientId"], json!("c1"));
        assert!(value.get("eventId").is_some());
        assert!(value.get("timestamp").is_some());
    }
}
