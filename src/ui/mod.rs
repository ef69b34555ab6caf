// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod layout;    // Cadre commun : onglets, bandeau, footer
pub mod dashboard; // Cartes de statistiques et graphique des dépôts
pub mod table;     // Tableaux des listes d'administration

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use layout::render;
