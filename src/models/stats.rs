// ============================================================================
// Structure : DashboardStats
// ============================================================================
// Statistiques agrégées calculées par le serveur (/admin/dashboard/stats)
//
// CONCEPT : Objet "placeholder"
// - Tous les champs ont une valeur par défaut (0)
// - Un payload partiel ou une erreur réseau donne DashboardStats::default()
// - L'écran dashboard s'affiche toujours, même sans réponse du serveur
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::amount_from_any;

/// Statistiques serveur du dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_users: u64,
    pub pending_kyc: u64,
    pub pending_withdrawals: u64,

    #[serde(deserialize_with = "amount_from_any")]
    pub total_deposits: f64,

    #[serde(deserialize_with = "amount_from_any")]
    pub total_withdrawals: f64,

    #[serde(deserialize_with = "amount_from_any")]
    pub total_invested: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_stats_payload() {
        let stats: DashboardStats =
            serde_json::from_str(r#"{"total_users": 12, "total_deposits": "999.90"}"#).unwrap();
        assert_eq!(stats.total_users, 12);
        assert_eq!(stats.total_deposits, 999.9);
        assert_eq!(stats.pending_kyc, 0);
    }

    #[test]
    fn test_empty_stats_payload() {
        let stats: DashboardStats = serde_json::from_str("{}").unwrap();
        assert_eq!(stats, DashboardStats::default());
    }
}
