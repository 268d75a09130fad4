//! Chat entity definitions

use serde::{Deserialize, Serialize};

/// A two-party chat created by accepting an offer. At most one chat
/// exists per offer; `offer_id` carries a UNIQUE constraint so creation
/// is idempotent. `last_message`/`last_message_time` are denormalized
/// from the newest message for cheap listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub public_id: String,
    pub offer_id: i64,
    pub gig_id: i64,
    pub gig_title: String,
    pub participant_a: String,
    pub participant_a_name: String,
    pub participant_b: String,
    pub participant_b_name: String,
    pub last_message: Option<String>,
    pub last_message_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Chat {
    /// The exactly-two participant principal ids.
    pub fn participants(&self) -> [&str; 2] {
        [&self.participant_a, &self.participant_b]
    }

    pub fn has_participant(&self, principal_id: &str) -> bool {
        self.participant_a == principal_id || self.participant_b == principal_id
    }

    /// The other side of the conversation, if `principal_id` is in it.
    pub fn counterpart(&self, principal_id: &str) -> Option<&str> {
        if self.participant_a == principal_id {
            Some(&self.participant_b)
        } else if self.participant_b == principal_id {
            Some(&self.participant_a)
        } else {
            None
        }
    }
}

/// Request to provision the chat for an accepted offer. Participant A is
/// the gig poster, participant B the offer maker; names and gig title are
/// creation-time snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionChatRequest {
    pub offer_id: i64,
    pub gig_id: i64,
    pub gig_title: String,
    pub participant_a: String,
    pub participant_a_name: String,
    pub participant_b: String,
    pub participant_b_name: String,
}

impl ProvisionChatRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.participant_a.trim().is_empty() || self.participant_b.trim().is_empty() {
            return Err("Chat participants cannot be empty".to_string());
        }
        if self.participant_a == self.participant_b {
            return Err("Chat participants must be distinct".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat() -> Chat {
        Chat {
            id: 1,
            public_id: "chat-1".to_string(),
            offer_id: 7,
            gig_id: 3,
            gig_title: "Essay editing".to_string(),
            participant_a: "principal-a".to_string(),
            participant_a_name: "Asha Patel".to_string(),
            participant_b: "principal-b".to_string(),
            participant_b_name: "Ben Cole".to_string(),
            last_message: None,
            last_message_time: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_participant_helpers() {
        let chat = chat();
        assert!(chat.has_participant("principal-a"));
        assert!(chat.has_participant("principal-b"));
        assert!(!chat.has_participant("principal-c"));
        assert_eq!(chat.counterpart("principal-a"), Some("principal-b"));
        assert_eq!(chat.counterpart("principal-c"), None);
        assert_eq!(chat.participants(), ["principal-a", "principal-b"]);
    }

    #[test]
    fn test_provision_validation() {
        let request = ProvisionChatRequest {
            offer_id: 7,
            gig_id: 3,
            gig_title: "Essay editing".to_string(),
            participant_a: "principal-a".to_string(),
            participant_a_name: "Asha Patel".to_string(),
            participant_b: "principal-b".to_string(),
            participant_b_name: "Ben Cole".to_string(),
        };
        assert!(request.validate().is_ok());

        let mut same = request.clone();
        same.participant_b = "principal-a".to_string();
        assert!(same.validate().is_err());

        let mut empty = request;
        empty.participant_a = "".to_string();
        assert!(empty.validate().is_err());
    }
}
