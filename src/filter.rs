// ============================================================================
// Filtres, recherche, tri et pagination des listes
// ============================================================================
// Transforme une liste complète en vue dérivée selon l'état des filtres
// de l'onglet courant.
//
// CONCEPTS RUST :
// 1. Génériques avec trait bound : fonctionne pour tout T: Record
// 2. Références : la vue filtrée emprunte les items (pas de copie)
// 3. sort_by stable : les ex-aequo gardent leur ordre d'origine
// ============================================================================

use crate::models::Record;

/// Tri par date de création
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSort {
    /// Ordre de l'API conservé
    #[default]
    None,
    /// Plus récents d'abord
    Newest,
    /// Plus anciens d'abord
    Oldest,
}

impl DateSort {
    pub fn next(&self) -> DateSort {
        match self {
            DateSort::None => DateSort::Newest,
            DateSort::Newest => DateSort::Oldest,
            DateSort::Oldest => DateSort::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateSort::None => "api order",
            DateSort::Newest => "newest",
            DateSort::Oldest => "oldest",
        }
    }
}

/// État des filtres d'une liste
///
/// `None` (ou "all") sur status/kind = prédicat désactivé
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub status: Option<String>,
    pub kind: Option<String>,
    pub search: String,
    pub sort: DateSort,
}

impl FilterState {
    /// Vérifie si aucun filtre n'est actif (transformation identité)
    pub fn is_identity(&self) -> bool {
        active(&self.status).is_none()
            && active(&self.kind).is_none()
            && self.search.trim().is_empty()
            && self.sort == DateSort::None
    }

    /// Passe à la valeur suivante d'un filtre : all → k1 → k2 → ... → all
    pub fn cycle(current: &Option<String>, keys: &[&str]) -> Option<String> {
        match active(current) {
            None => keys.first().map(|k| k.to_string()),
            Some(value) => {
                let pos = keys.iter().position(|k| *k == value);
                match pos {
                    Some(i) if i + 1 < keys.len() => Some(keys[i + 1].to_string()),
                    _ => None,
                }
            }
        }
    }

    /// Vérifie si un item passe tous les prédicats actifs
    pub fn matches<T: Record>(&self, item: &T) -> bool {
        if let Some(status) = active(&self.status) {
            if item.status_key() != status {
                return false;
            }
        }

        if let Some(kind) = active(&self.kind) {
            if item.kind_key() != Some(kind) {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        if item.id().to_string().contains(&needle) {
            return true;
        }

        item.text_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Valeur d'un filtre en traitant "all" et "" comme absents
fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// Applique les filtres et le tri à une liste
///
/// Le résultat est un sous-ensemble de `items`. Sans tri, l'ordre relatif
/// d'origine est conservé.
pub fn apply<'a, T: Record>(items: &'a [T], state: &FilterState) -> Vec<&'a T> {
    let mut result: Vec<&T> = items.iter().filter(|item| state.matches(*item)).collect();

    match state.sort {
        DateSort::None => {}
        DateSort::Newest => result.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
        DateSort::Oldest => result.sort_by(|a, b| a.created_at().cmp(&b.created_at())),
    }

    result
}

// ============================================================================
// Pagination
// ============================================================================

/// Fenêtre d'une page dans la liste filtrée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Index de la page (0-based), ramené dans les bornes
    pub index: usize,
    /// Nombre total de pages (au moins 1)
    pub count: usize,
    /// Début de la fenêtre (inclus)
    pub start: usize,
    /// Fin de la fenêtre (exclue)
    pub end: usize,
}

impl Page {
    /// Calcule la fenêtre de la page demandée
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - Une liste vide donne une page unique [0, 0)
    /// - Une page hors bornes est ramenée sur la dernière
    pub fn window(total: usize, page: usize, per_page: usize) -> Page {
        let per_page = per_page.max(1);
        let count = total.div_ceil(per_page).max(1);
        let index = page.min(count - 1);
        let start = (index * per_page).min(total);
        let end = (start + per_page).min(total);

        Page {
            index,
            count,
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Transaction, TransactionKind, TransactionStatus};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn tx(id: i64, kind: TransactionKind, amount: f64, day: u32) -> Transaction {
        let mut t = Transaction::new(
            id,
            kind,
            amount,
            TransactionStatus::Completed,
            Utc.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap(),
        );
        t.reference = format!("REF-{}", id);
        t
    }

    #[test]
    fn test_filter_by_type() {
        let items = vec![
            tx(1, TransactionKind::Deposit, 100.0, 12),
            tx(2, TransactionKind::Withdrawal, 50.0, 13),
        ];
        let state = FilterState {
            kind: Some("deposit".to_string()),
            ..Default::default()
        };

        let result = apply(&items, &state);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].amount, 100.0);
    }

    #[test]
    fn test_all_is_identity() {
        let items = vec![
            tx(1, TransactionKind::Deposit, 100.0, 12),
            tx(2, TransactionKind::Withdrawal, 50.0, 13),
        ];
        let state = FilterState {
            status: Some("all".to_string()),
            kind: Some("all".to_string()),
            ..Default::default()
        };

        assert!(state.is_identity());
        let ids: Vec<i64> = apply(&items, &state).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_matches_id() {
        let items = vec![
            tx(1, TransactionKind::Deposit, 100.0, 12),
            tx(25, TransactionKind::Deposit, 10.0, 13),
        ];

        let by_ref = FilterState {
            search: "ref-1".to_string(),
            ..Default::default()
        };
        assert_eq!(apply(&items, &by_ref).len(), 1);

        let by_id = FilterState {
            search: "25".to_string(),
            ..Default::default()
        };
        assert_eq!(apply(&items, &by_id)[0].id, 25);
    }

    #[test]
    fn test_sort_newest_first() {
        let items = vec![
            tx(1, TransactionKind::Deposit, 1.0, 10),
            tx(2, TransactionKind::Deposit, 2.0, 14),
            tx(3, TransactionKind::Deposit, 3.0, 12),
        ];
        let state = FilterState {
            sort: DateSort::Newest,
            ..Default::default()
        };
        let ids: Vec<i64> = apply(&items, &state).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_cycle_filter_values() {
        let keys = ["pending", "approved"];
        let first = FilterState::cycle(&None, &keys);
        assert_eq!(first.as_deref(), Some("pending"));
        let second = FilterState::cycle(&first, &keys);
        assert_eq!(second.as_deref(), Some("approved"));
        assert_eq!(FilterState::cycle(&second, &keys), None);
    }

    #[test]
    fn test_page_window() {
        assert_eq!(Page::window(0, 0, 10), Page { index: 0, count: 1, start: 0, end: 0 });
        assert_eq!(Page::window(25, 2, 10), Page { index: 2, count: 3, start: 20, end: 25 });
        // Page hors bornes : ramenée sur la dernière
        assert_eq!(Page::window(25, 9, 10).index, 2);
    }

    fn arb_kind() -> impl Strategy<Value = TransactionKind> {
        prop::sample::select(TransactionKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_filtered_is_ordered_subset(
            specs in prop::collection::vec((arb_kind(), 0.0f64..1000.0, 1u32..28), 0..40),
            kind in arb_kind(),
            search in "[a-z0-9-]{0,3}",
        ) {
            let items: Vec<Transaction> = specs
                .iter()
                .enumerate()
                .map(|(i, (k, amount, day))| tx(i as i64, *k, *amount, *day))
                .collect();
            let state = FilterState {
                kind: Some(kind.as_str().to_string()),
                search,
                ..Default::default()
            };

            let result = apply(&items, &state);
            let ids: Vec<i64> = result.iter().map(|t| t.id).collect();

            // Sous-ensemble dans l'ordre d'origine : ids strictement croissants
            prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(result.iter().all(|t| t.kind == kind));
        }

        #[test]
        fn prop_page_windows_cover_list(total in 0usize..200, per_page in 1usize..30) {
            let pages = Page::window(total, 0, per_page).count;
            let covered: usize = (0..pages).map(|p| Page::window(total, p, per_page).len()).sum();
            prop_assert_eq!(covered, total);
        }
    }
}
