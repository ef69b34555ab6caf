// ============================================================================
// Structure : Transaction
// ============================================================================
// Mouvement de fonds d'un utilisateur (dépôt, retrait, investissement, ...)
//
// C'est l'entité principale des agrégations du dashboard : les montants sont
// sommés par type et par bucket temporel.
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{amount_from_any, Record};

api_enum! {
    /// Type de transaction
    TransactionKind {
        Deposit => "deposit",
        Withdrawal => "withdrawal",
        Investment => "investment",
        Profit => "profit",
        Referral => "referral",
        Bonus => "bonus",
    }
}

api_enum! {
    /// Statut de traitement d'une transaction
    TransactionStatus {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// Transaction financière
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,

    #[serde(default)]
    pub user_id: i64,

    /// Type : "type" côté API (mot réservé en Rust)
    #[serde(rename = "type", default)]
    pub kind: TransactionKind,

    #[serde(default, deserialize_with = "amount_from_any")]
    pub amount: f64,

    #[serde(default)]
    pub status: TransactionStatus,

    /// Référence externe (hash, numéro de virement, ...)
    #[serde(default)]
    pub reference: String,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Crée une transaction (utilisé par les tests et les fixtures)
    pub fn new(
        id: i64,
        kind: TransactionKind,
        amount: f64,
        status: TransactionStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id: 0,
            kind,
            amount,
            status,
            reference: String::new(),
            created_at,
        }
    }

    pub fn is_completed_deposit(&self) -> bool {
        self.kind == TransactionKind::Deposit && self.status == TransactionStatus::Completed
    }
}

impl Record for Transaction {
    fn id(&self) -> i64 {
        self.id
    }

    fn status_key(&self) -> &str {
        self.status.as_str()
    }

    fn kind_key(&self) -> Option<&str> {
        Some(self.kind.as_str())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.reference.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_field() {
        let json = r#"{"id": 3, "user_id": 9, "type": "deposit", "amount": 100, "status": "completed"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert!(tx.is_completed_deposit());
        assert_eq!(tx.kind_key(), Some("deposit"));
    }

    #[test]
    fn test_transaction_kind_keys() {
        assert_eq!(TransactionKind::keys().len(), 6);
        assert_eq!(TransactionKind::keys()[0], "deposit");
    }
}
