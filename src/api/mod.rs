// ============================================================================
// Module : api
// ============================================================================
// Client de l'API REST d'administration et son type d'erreur
// ============================================================================

pub mod client; // Client HTTP (listes, stats, mutations)
pub mod error;  // ApiError + message affichable

// Re-exports
pub use client::ApiClient;
pub use error::{ApiError, GENERIC_ERROR};
