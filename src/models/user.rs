// ============================================================================
// Structure : User
// ============================================================================
// Investisseur inscrit sur la plateforme, tel que renvoyé par /admin/users
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{amount_from_any, KycStatus, Record};

api_enum! {
    /// État du compte utilisateur
    UserStatus {
        Active => "active",
        Blocked => "blocked",
        Pending => "pending",
    }
}

/// Utilisateur de la plateforme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    /// Solde du compte (géré côté serveur, affiché tel quel)
    #[serde(default, deserialize_with = "amount_from_any")]
    pub balance: f64,

    /// Nom du plan souscrit, None si aucun
    #[serde(default)]
    pub plan: Option<String>,

    #[serde(default)]
    pub status: UserStatus,

    #[serde(default)]
    pub kyc_status: KycStatus,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_blocked(&self) -> bool {
        self.status == UserStatus::Blocked
    }

    /// Nom du plan pour l'affichage et la distribution par plan
    pub fn plan_label(&self) -> &str {
        self.plan.as_deref().filter(|p| !p.is_empty()).unwrap_or("none")
    }
}

impl Record for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn status_key(&self) -> &str {
        self.status.as_str()
    }

    fn kind_key(&self) -> Option<&str> {
        Some(self.plan_label())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn amount(&self) -> f64 {
        self.balance
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_minimal_payload() {
        let user: User = serde_json::from_str(r#"{"id": 7, "email": "a@b.io"}"#).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.status, UserStatus::Unknown);
        assert_eq!(user.plan_label(), "none");
        assert_eq!(user.balance, 0.0);
    }

    #[test]
    fn test_user_full_payload() {
        let json = r#"{
            "id": 1, "name": "Ada", "email": "ada@example.com",
            "balance": "1250.75", "plan": "Gold", "status": "blocked",
            "kyc_status": "approved", "created_at": "2026-10-12T08:00:00Z"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_blocked());
        assert_eq!(user.balance, 1250.75);
        assert_eq!(user.kyc_status, KycStatus::Approved);
        assert_eq!(user.kind_key(), Some("Gold"));
    }
}
