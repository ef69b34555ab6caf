// ============================================================================
// Structure : Payment
// ============================================================================
// Paiement déclaré par un utilisateur (virement, crypto) à confirmer
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{amount_from_any, Record};

api_enum! {
    /// Statut de confirmation d'un paiement
    PaymentStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Paiement entrant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,

    #[serde(default)]
    pub user_id: i64,

    #[serde(default, deserialize_with = "amount_from_any")]
    pub amount: f64,

    #[serde(default)]
    pub method: String,

    #[serde(default)]
    pub status: PaymentStatus,

    #[serde(default)]
    pub reference: String,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Record for Payment {
    fn id(&self) -> i64 {
        self.id
    }

    fn status_key(&self) -> &str {
        self.status.as_str()
    }

    fn kind_key(&self) -> Option<&str> {
        Some(self.method.as_str())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.method.as_str(), self.reference.as_str()]
    }
}
