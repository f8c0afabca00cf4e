use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw status as delivered by the firehose (or synthesized by the
/// mock stream). Internal shape, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStatus {
    pub id: i64,
    pub text: String,
    pub user: StatusUser,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUser {
    pub id: i64,
}

impl RawStatus {
    pub fn new(id: i64, user_id: i64, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            user: StatusUser { id: user_id },
            created_at,
        }
    }
}

/// The outbound message payload produced to Kafka.
///
/// `id` and `user_id` are set once at construction and never change;
/// an instance lives only for the duration of the send that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEvent {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at_ms: i64,
}

impl From<&RawStatus> for WireEvent {
    /// Pure mapping from a raw status to the wire shape. No I/O, no
    /// retained state; deterministic given the status fields.
    fn from(status: &RawStatus) -> Self {
        Self {
            id: status.id,
            user_id: status.user.id,
            text: status.text.clone(),
            created_at_ms: status.created_at.timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn wire_event_maps_all_fields() {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let status = RawStatus::new(42, 7, "hello rust world".to_string(), created_at);

        let event = WireEvent::from(&status);

        assert_eq!(event.id, 42);
        assert_eq!(event.user_id, 7);
        assert_eq!(event.text, "hello rust world");
        assert_eq!(event.created_at_ms, 1_700_000_000_123);
    }

    #[test]
    fn transform_is_deterministic() {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let status = RawStatus::new(1, 2, "same input".to_string(), created_at);

        let first = WireEvent::from(&status);
        let second = WireEvent::from(&status);

        assert_eq!(first.id, second.id);
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(first.text, second.text);
        assert_eq!(first.created_at_ms, second.created_at_ms);
    }

    #[test]
    fn raw_status_round_trips_through_json() {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let status = RawStatus::new(99, 11, "serialized status".to_string(), created_at);

        let json = serde_json::to_string(&status).unwrap();
        let parsed: RawStatus = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, 99);
        assert_eq!(parsed.user.id, 11);
        assert_eq!(parsed.text, "serialized status");
    }
}
