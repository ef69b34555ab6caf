// ============================================================================
// Structure : Withdrawal
// ============================================================================
// Demande de retrait en attente de validation par un administrateur
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{amount_from_any, Record};

api_enum! {
    /// Cycle de vie d'une demande de retrait
    WithdrawalStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Demande de retrait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,

    #[serde(default)]
    pub user_id: i64,

    #[serde(default, deserialize_with = "amount_from_any")]
    pub amount: f64,

    /// Moyen de retrait ("bank", "usdt", ...)
    #[serde(default)]
    pub method: String,

    #[serde(default)]
    pub wallet_address: String,

    #[serde(default)]
    pub status: WithdrawalStatus,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Record for Withdrawal {
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
        vec![self.method.as_str(), self.wallet_address.as_str()]
    }
}
