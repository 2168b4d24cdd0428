//! Wire event envelope (§4.5, §6). Field names are snake_case and stable —
//! they go straight over the duplex connection as JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Envelope {
    NewMessage {
        match_id: Uuid,
        message_id: Uuid,
        sender_id: Uuid,
        content: Option<String>,
        image_url: Option<String>,
        created_at: DateTime<Utc>,
    },
    MessageRead {
        match_id: Uuid,
        message_ids: Vec<Uuid>,
        read_at: DateTime<Utc>,
    },
    TypingStart {
        match_id: Uuid,
        user_id: Uuid,
    },
    TypingStop {
        match_id: Uuid,
        user_id: Uuid,
    },
    ImageEnabled {
        match_id: Uuid,
        user_id: Uuid,
    },
    ImageDisabled {
        match_id: Uuid,
        user_id: Uuid,
    },
    MatchCreated {
        match_id: Uuid,
        other_user_id: Uuid,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_and_payload_tag() {
        let envelope = Envelope::MatchCreated {
            match_id: Uuid::nil(),
            other_user_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "match_created");
        assert!(json["payload"]["other_user_id"].is_string());
    }
}
