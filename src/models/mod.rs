// ============================================================================
// Module : models
// ============================================================================
// DTOs renvoyés par l'API d'administration (users, transactions, retraits,
// KYC, paiements, plans, tâches, notifications, paramètres)
//
// CONCEPT : Validation à la frontière
// - L'API renvoie des champs parfois absents ou typés de façon lâche
// - Chaque champ optionnel a une valeur par défaut explicite
// - Un statut inconnu devient `Unknown` au lieu de faire échouer toute la liste
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

// ============================================================================
// Macro : api_enum!
// ============================================================================
// Les statuts et types sont des littéraux string côté API ("pending",
// "approved", ...). La macro génère l'enum, son parsing serde tolérant
// (`#[serde(other)]`), et les helpers as_str()/ALL utilisés par les filtres.
//
// Doit être définie AVANT les `pub mod` pour être visible dans les sous-modules.
// ============================================================================

macro_rules! api_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $lit:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $lit)]
                $variant,
            )+
            /// Valeur non reconnue renvoyée par le serveur
            #[serde(rename = "unknown")]
            #[serde(other)]
            Unknown,
        }

        impl $name {
            /// Toutes les valeurs connues (ordre d'affichage des filtres)
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Littéral tel qu'envoyé par l'API
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $lit,)+
                    $name::Unknown => "unknown",
                }
            }

            /// Littéraux connus, pour cycler les filtres dans l'UI
            pub fn keys() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::Unknown
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod user;
pub mod transaction;
pub mod withdrawal;
pub mod kyc;
pub mod payment;
pub mod plan;
pub mod task;
pub mod notification;
pub mod setting;
pub mod stats;

pub use user::{User, UserStatus};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
pub use withdrawal::{Withdrawal, WithdrawalStatus};
pub use kyc::{KycDocument, KycStatus};
pub use payment::{Payment, PaymentStatus};
pub use plan::{NewPlan, Plan, PlanStatus};
pub use task::{NewTask, Task, TaskStatus};
pub use notification::{NewNotification, Notification, ReadState};
pub use setting::Setting;
pub use stats::DashboardStats;

// ============================================================================
// Trait : Record
// ============================================================================
// CONCEPT RUST : Trait comme "vue" commune sur des types différents
// - Les filtres et agrégations sont écrits une seule fois, génériquement
// - Chaque DTO expose son id, ses clés d'enum et ses champs texte
// ============================================================================

/// Vue commune de toutes les entités listables
pub trait Record {
    /// Identifiant numérique (unique dans une liste)
    fn id(&self) -> i64;

    /// Clé de statut ("pending", "approved", ...), vide si l'entité n'en a pas
    fn status_key(&self) -> &str;

    /// Clé de type ("deposit", "withdrawal", ...) pour les entités typées
    fn kind_key(&self) -> Option<&str> {
        None
    }

    /// Date de création (UTC)
    fn created_at(&self) -> DateTime<Utc>;

    /// Montant associé, 0 pour les entités sans montant
    fn amount(&self) -> f64 {
        0.0
    }

    /// Champs texte parcourus par la recherche (l'id est ajouté par le filtre)
    fn text_fields(&self) -> Vec<&str>;
}

// ============================================================================
// Helpers serde
// ============================================================================

/// Désérialise un montant envoyé en nombre, en string ("100.50") ou null
///
/// Une string non numérique donne 0 plutôt qu'une erreur : un montant
/// illisible ne doit pas empêcher l'affichage du reste de la liste.
pub(crate) fn amount_from_any<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Désérialise un booléen envoyé en bool, en entier (0/1) ou en string
pub(crate) fn bool_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_i64().map(|v| v != 0).unwrap_or(false),
        serde_json::Value::String(s) => matches!(s.as_str(), "1" | "true" | "yes"),
        _ => false,
    })
}

/// Réponse de liste : tableau nu ou enveloppe `{"data": [...]}`
///
/// CONCEPT SERDE : #[serde(untagged)]
/// - Serde essaie chaque variant dans l'ordre
/// - Le premier qui matche gagne
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Wrapped { data } => data,
            ListEnvelope::Bare(items) => items,
        }
    }
}

/// Réponse portant une seule entité : nue ou `{"data": {...}}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ItemEnvelope<T> {
    pub fn into_item(self) -> T {
        match self {
            ItemEnvelope::Wrapped { data } => data,
            ItemEnvelope::Bare(item) => item,
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
