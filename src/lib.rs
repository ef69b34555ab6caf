// ============================================================================
// LazyAdmin - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Client HTTP de l'API d'administration
pub mod models;    // Structures de données (DTO validés)
pub mod filter;    // Filtres, recherche, tri et pagination
pub mod aggregate; // Buckets jour / semaine / mois et résumé du dashboard
pub mod store;     // Listes chargées + compteur de génération
pub mod mutation;  // Actions d'administration
pub mod config;    // Configuration (fichier TOML + environnement)
pub mod session;   // Token et URL de l'API
pub mod worker;    // Thread des appels API
pub mod app;       // État de l'application
pub mod ui;        // Interface utilisateur
