// ============================================================================
// Structure : Notification
// ============================================================================
// Message envoyé à un utilisateur (ou à tous si user_id est absent)
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{bool_from_any, Record};

api_enum! {
    /// État de lecture, dérivé du flag `read`
    ReadState {
        Read => "read",
        Unread => "unread",
    }
}

/// Notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,

    /// Destinataire, None pour une diffusion générale
    #[serde(default)]
    pub user_id: Option<i64>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub message: String,

    #[serde(default, deserialize_with = "bool_from_any")]
    pub read: bool,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn read_state(&self) -> ReadState {
        if self.read {
            ReadState::Read
        } else {
            ReadState::Unread
        }
    }
}

impl Record for Notification {
    fn id(&self) -> i64 {
        self.id
    }

    fn status_key(&self) -> &str {
        self.read_state().as_str()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.message.as_str()]
    }
}

/// Corps de la requête d'envoi d'une notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNotification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    /// Parse une saisie "titre;message" ou "user_id;titre;message"
    pub fn parse(input: &str) -> Option<Self> {
        let parts: Vec<&str> = input.splitn(3, ';').map(str::trim).collect();
        let (user_id, title, message) = match parts.as_slice() {
            [title, message] => (None, *title, *message),
            [user, title, message] => (Some(user.parse().ok()?), *title, *message),
            _ => return None,
        };
        if title.is_empty() || message.is_empty() {
            return None;
        }
        Some(Self {
            user_id,
            title: title.to_string(),
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_parse() {
        let broadcast = NewNotification::parse("Maintenance;Back at 10:00").unwrap();
        assert_eq!(broadcast.user_id, None);

        let targeted = NewNotification::parse("42;Hello;Welcome aboard").unwrap();
        assert_eq!(targeted.user_id, Some(42));
        assert_eq!(targeted.message, "Welcome aboard");

        assert!(NewNotification::parse("x;Hello;World").is_none());
        assert!(NewNotification::parse("only title").is_none());
    }

    #[test]
    fn test_read_state_key() {
        let n: Notification = serde_json::from_str(r#"{"id": 1, "read": 0}"#).unwrap();
        assert_eq!(n.status_key(), "unread");
    }
}
