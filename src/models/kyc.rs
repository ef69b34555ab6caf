// ============================================================================
// Structure : KycDocument
// ============================================================================
// Pièce d'identité soumise par un utilisateur pour vérification (KYC)
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Record;

api_enum! {
    /// Résultat de la revue KYC
    KycStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Document KYC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycDocument {
    pub id: i64,

    #[serde(default)]
    pub user_id: i64,

    /// Type de pièce ("passport", "id_card", "proof_of_address", ...)
    #[serde(default)]
    pub document_type: String,

    #[serde(default)]
    pub status: KycStatus,

    /// Motif saisi lors d'un rejet
    #[serde(default)]
    pub rejection_reason: Option<String>,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Record for KycDocument {
    fn id(&self) -> i64 {
        self.id
    }

    fn status_key(&self) -> &str {
        self.status.as_str()
    }

    fn kind_key(&self) -> Option<&str> {
        Some(self.document_type.as_str())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.document_type.as_str()];
        if let Some(reason) = &self.rejection_reason {
            fields.push(reason.as_str());
        }
        fields
    }
}
