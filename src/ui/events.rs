// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de la console.
// Les touches sont sensibles à la casse (t ≠ T, l ≠ L).
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Polling avec timeout : l'event loop n'est jamais bloquée
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

// ============================================================================
// Enum Event
// ============================================================================
// CONCEPT RUST : Enums avec données
// - Chaque variant peut contenir des données différentes
// - Key(KeyEvent) : stocke l'événement clavier complet
// - Tick : variant sans données (unit variant), émis après TICK_RATE sans touche
// ============================================================================

/// Durée max d'attente d'une touche avant d'émettre un Tick
pub const TICK_RATE: Duration = Duration::from_millis(250);

/// Nombre de ticks couvrant `secs` secondes (0 désactive le rafraîchissement)
pub fn ticks_for_secs(secs: u64) -> u64 {
    let tick_ms = (TICK_RATE.as_millis() as u64).max(1);
    secs.saturating_mul(1000) / tick_ms
}

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (rafraîchissement du compteur de notifications)
    Tick,
}

// ============================================================================
// Structure EventHandler
// ============================================================================
// CONCEPT : Singleton pattern pour gérer les événements
// - Un seul handler pour toute l'application
// - Pas besoin de stocker d'état (stateless)
// ============================================================================

/// Gestionnaire d'événements
pub struct EventHandler;

impl EventHandler {
    /// Crée un nouveau gestionnaire d'événements
    pub fn new() -> Self {
        Self
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT RUST : Result et ?
    /// - poll() peut échouer (I/O error)
    /// - read() peut échouer
    /// - ? propage automatiquement les erreurs
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(TICK_RATE) attend max 250ms
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    /// - Si événement, le lit et le convertit
    pub fn next(&self) -> Result<Event> {
        // Poll avec timeout de 250ms
        // CONCEPT RUST : if expression
        // - if retourne une valeur en Rust (comme un ternaire ?)
        if event::poll(TICK_RATE)? {
            // Il y a un événement, on le lit
            match event::read()? {
                // Événement clavier
                CrosstermEvent::Key(key) => {
                    // CONCEPT : Filter sur KeyEventKind
                    // Sur certains OS, on reçoit Press ET Release
                    // On ne veut gérer que Press pour éviter les doublons
                    if key.kind == KeyEventKind::Press {
                        Ok(Event::Key(key))
                    } else {
                        // Ignore Release, retourne Tick
                        Ok(Event::Tick)
                    }
                }

                // Autres événements (resize, mouse, etc.) ignorés pour l'instant
                _ => Ok(Event::Tick),
            }
        } else {
            // Timeout : pas d'événement, retourne Tick
            Ok(Event::Tick)
        }
    }
}

// ============================================================================
// Helper : Convertir KeyEvent en action
// ============================================================================
// CONCEPT RUST : Pattern matching avancé
// - Match sur KeyCode pour identifier la touche
// - Peut aussi matcher sur les modifiers (Ctrl, Alt, Shift)
// ============================================================================

/// Vérifie si l'événement est la touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    // CONCEPT RUST : Pattern matching avec if let
    // - Destructure Event::Key et vérifie le KeyCode en une ligne
    // - Plus élégant que match pour un seul cas
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Échap
pub fn is_escape_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc)
    } else {
        false
    }
}

/// Vérifie si l'événement est Entrée
pub fn is_enter_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Enter)
    } else {
        false
    }
}

/// Vérifie si l'événement est la flèche vers le haut ou 'k' (vim)
///
/// CONCEPT RUST : Multiple patterns avec |
/// - KeyCode::Up | KeyCode::Char('k') : match l'un ou l'autre
/// - Support des touches Vim pour les power users !
pub fn is_up_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    } else {
        false
    }
}

/// Vérifie si l'événement est la flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Tab (onglet suivant)
pub fn is_next_tab_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Tab)
    } else {
        false
    }
}

/// Vérifie si l'événement est Shift+Tab (onglet précédent)
pub fn is_previous_tab_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::BackTab)
    } else {
        false
    }
}

/// Vérifie si l'événement est un caractère précis
///
/// CONCEPT : Sensible à la casse
/// - 't' (filtre de type) et 'T' (token) sont deux actions différentes
fn is_char_event(event: &Event, expected: char) -> bool {
    if let Event::Key(key) = event {
        key.code == KeyCode::Char(expected)
    } else {
        false
    }
}

/// 'a' : approuver la ligne sélectionnée
pub fn is_approve_event(event: &Event) -> bool {
    is_char_event(event, 'a')
}

/// 'x' : rejeter la ligne sélectionnée
pub fn is_reject_event(event: &Event) -> bool {
    is_char_event(event, 'x')
}

/// 'b' : bloquer / débloquer (Users) ou changer le découpage (Dashboard)
pub fn is_block_event(event: &Event) -> bool {
    is_char_event(event, 'b')
}

/// 'd' : supprimer (two-step)
pub fn is_delete_event(event: &Event) -> bool {
    is_char_event(event, 'd')
}

/// 'n' : créer un plan, une tâche ou une notification
pub fn is_create_event(event: &Event) -> bool {
    is_char_event(event, 'n')
}

/// 'e' : modifier la valeur d'un paramètre
pub fn is_edit_event(event: &Event) -> bool {
    is_char_event(event, 'e')
}

/// 'm' : marquer une notification comme lue
pub fn is_mark_read_event(event: &Event) -> bool {
    is_char_event(event, 'm')
}

/// 's' : filtre de statut suivant
pub fn is_status_filter_event(event: &Event) -> bool {
    is_char_event(event, 's')
}

/// 't' : filtre de type suivant
pub fn is_type_filter_event(event: &Event) -> bool {
    is_char_event(event, 't')
}

/// 'c' : effacer les filtres
pub fn is_clear_filters_event(event: &Event) -> bool {
    is_char_event(event, 'c')
}

/// '/' : saisir une recherche
pub fn is_search_event(event: &Event) -> bool {
    is_char_event(event, '/')
}

/// 'o' : tri par date suivant
pub fn is_sort_event(event: &Event) -> bool {
    is_char_event(event, 'o')
}

/// ']' : page suivante
pub fn is_next_page_event(event: &Event) -> bool {
    is_char_event(event, ']')
}

/// '[' : page précédente
pub fn is_previous_page_event(event: &Event) -> bool {
    is_char_event(event, '[')
}

/// 'r' : recharger l'onglet courant
pub fn is_refresh_event(event: &Event) -> bool {
    is_char_event(event, 'r')
}

/// 'T' : saisir un nouveau token
pub fn is_token_event(event: &Event) -> bool {
    is_char_event(event, 'T')
}

/// 'L' : se déconnecter (supprime le token de session)
pub fn is_logout_event(event: &Event) -> bool {
    is_char_event(event, 'L')
}

/// Vérifie si l'événement est Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Backspace)
    } else {
        false
    }
}

/// Vérifie si l'événement est un caractère imprimable (pour la saisie libre)
pub fn is_text_char_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char(c) if !c.is_control())
    } else {
        false
    }
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c) = key.code {
            return Some(c);
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), event::KeyModifiers::empty()))
    }

    #[test]
    fn test_ticks_for_secs() {
        assert_eq!(ticks_for_secs(30), 120);
        assert_eq!(ticks_for_secs(0), 0);
        // Valeur absurde dans la config : pas de dépassement
        assert_eq!(ticks_for_secs(u64::MAX), u64::MAX / 250);
    }

    #[test]
    fn test_case_sensitive_actions() {
        assert!(is_type_filter_event(&key('t')));
        assert!(!is_token_event(&key('t')));
        assert!(is_token_event(&key('T')));
        assert!(is_logout_event(&key('L')));
        assert!(!is_logout_event(&key('l')));
    }

    #[test]
    fn test_text_input_chars() {
        assert!(is_text_char_event(&key(';')));
        assert_eq!(get_char_from_event(&key('@')), Some('@'));
        assert!(!is_text_char_event(&Event::Tick));
    }

    #[test]
    fn test_is_quit_event() {
        let quit_event = Event::Key(KeyEvent::new(KeyCode::Char('q'), event::KeyModifiers::empty()));
        assert!(is_quit_event(&quit_event));

        let other_event = key('a');
        assert!(!is_quit_event(&other_event));

        assert!(!is_quit_event(&Event::Tick));
    }
}
