// ============================================================================
// Agrégations du dashboard
// ============================================================================
// Compte les items par catégorie et somme les montants par bucket temporel
// (jour de semaine, semaine, mois) pour les cartes et le graphique.
//
// CONCEPT : Buckets fixes ancrés sur "maintenant"
// - Tous les buckets sont initialisés à zéro AVANT d'accumuler
// - Un item hors fenêtre est ignoré
// - Tout est calculé en UTC
// ============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::models::{
    KycDocument, KycStatus, Record, Transaction, TransactionKind, TransactionStatus, User,
    Withdrawal, WithdrawalStatus,
};

/// Labels des jours de la semaine ISO (lundi en premier)
const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Nombre de semaines glissantes du mode Weekly
const WEEKS: i64 = 4;

/// Nombre de mois calendaires du mode Monthly
const MONTHS: i32 = 6;

/// Découpage temporel des montants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bucketing {
    /// Les 7 jours de la semaine ISO contenant `now`
    #[default]
    Daily,
    /// Les 4 dernières fenêtres de 7 jours se terminant à `now`
    Weekly,
    /// Les 6 derniers mois calendaires, mois courant inclus
    Monthly,
}

impl Bucketing {
    pub fn next(&self) -> Bucketing {
        match self {
            Bucketing::Daily => Bucketing::Weekly,
            Bucketing::Weekly => Bucketing::Monthly,
            Bucketing::Monthly => Bucketing::Daily,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Bucketing::Daily => "this week",
            Bucketing::Weekly => "last 4 weeks",
            Bucketing::Monthly => "last 6 months",
        }
    }

    /// Labels des buckets, dans l'ordre chronologique
    pub fn labels(&self, now: DateTime<Utc>) -> Vec<String> {
        match self {
            Bucketing::Daily => WEEKDAY_LABELS.iter().map(|l| l.to_string()).collect(),
            Bucketing::Weekly => (0..WEEKS)
                .map(|i| {
                    let ago = WEEKS - 1 - i;
                    if ago == 0 {
                        "This week".to_string()
                    } else {
                        format!("W-{}", ago)
                    }
                })
                .collect(),
            Bucketing::Monthly => (0..MONTHS)
                .map(|i| {
                    let (year, month) = shift_month(now.year(), now.month(), MONTHS - 1 - i);
                    NaiveDate::from_ymd_opt(year, month, 1)
                        .map(|d| d.format("%b").to_string())
                        .unwrap_or_default()
                })
                .collect(),
        }
    }

    /// Index du bucket d'un timestamp, None s'il est hors fenêtre
    pub fn bucket_index(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> Option<usize> {
        match self {
            Bucketing::Daily => {
                let today = now.date_naive();
                let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
                let offset = (at.date_naive() - monday).num_days();
                (0..7).contains(&offset).then_some(offset as usize)
            }
            Bucketing::Weekly => {
                let age = now - at;
                if age < Duration::zero() || age >= Duration::weeks(WEEKS) {
                    return None;
                }
                let weeks_ago = age.num_weeks();
                Some((WEEKS - 1 - weeks_ago) as usize)
            }
            Bucketing::Monthly => {
                let now_index = now.year() * 12 + now.month0() as i32;
                let at_index = at.year() * 12 + at.month0() as i32;
                let months_ago = now_index - at_index;
                (0..MONTHS)
                    .contains(&months_ago)
                    .then_some((MONTHS - 1 - months_ago) as usize)
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Bucketing::Daily => 7,
            Bucketing::Weekly => WEEKS as usize,
            Bucketing::Monthly => MONTHS as usize,
        }
    }
}

/// Recule de `back` mois à partir de (year, month)
fn shift_month(year: i32, month: u32, back: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - back;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Un bucket du graphique
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub total: f64,
}

/// Somme les montants des items retenus par `predicate`, par bucket
pub fn sum_by_bucket<T, P>(
    items: &[T],
    predicate: P,
    bucketing: Bucketing,
    now: DateTime<Utc>,
) -> Vec<Bucket>
where
    T: Record,
    P: Fn(&T) -> bool,
{
    let mut buckets: Vec<Bucket> = bucketing
        .labels(now)
        .into_iter()
        .map(|label| Bucket { label, total: 0.0 })
        .collect();

    for item in items.iter().filter(|item| predicate(*item)) {
        if let Some(index) = bucketing.bucket_index(item.created_at(), now) {
            buckets[index].total += item.amount();
        }
    }

    buckets
}

/// Compte les items par clé (ordre alphabétique des clés)
pub fn count_by<T, K>(items: &[T], key: K) -> BTreeMap<String, usize>
where
    K: Fn(&T) -> String,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Compte par statut, en partant de zéro pour chaque statut connu
pub fn count_by_status<T: Record>(items: &[T], known: &[&str]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = known.iter().map(|k| (k.to_string(), 0)).collect();
    for item in items {
        *counts.entry(item.status_key().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Arrondi à 2 décimales pour l'affichage
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Résumé du dashboard
// ============================================================================

/// Chiffres des cartes du dashboard, calculés côté client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub users_by_status: BTreeMap<String, usize>,
    pub plan_distribution: BTreeMap<String, usize>,
    pub transactions_by_type: BTreeMap<String, usize>,
    pub pending_withdrawals: usize,
    pub pending_withdrawal_amount: f64,
    pub pending_kyc: usize,
    pub total_deposits: f64,
    pub total_withdrawn: f64,
}

impl DashboardSummary {
    pub fn compute(
        users: &[User],
        transactions: &[Transaction],
        withdrawals: &[Withdrawal],
        kyc: &[KycDocument],
    ) -> Self {
        let pending: Vec<&Withdrawal> = withdrawals
            .iter()
            .filter(|w| w.status == WithdrawalStatus::Pending)
            .collect();

        let total_deposits = transactions
            .iter()
            .filter(|t| t.is_completed_deposit())
            .map(|t| t.amount)
            .sum::<f64>();

        let total_withdrawn = withdrawals
            .iter()
            .filter(|w| w.status == WithdrawalStatus::Approved)
            .map(|w| w.amount)
            .sum::<f64>();

        Self {
            users_by_status: count_by_status(users, &crate::models::UserStatus::keys()),
            plan_distribution: count_by(users, |u| u.plan_label().to_string()),
            transactions_by_type: count_by(transactions, |t| t.kind.as_str().to_string()),
            pending_withdrawals: pending.len(),
            pending_withdrawal_amount: round2(pending.iter().map(|w| w.amount).sum()),
            pending_kyc: kyc.iter().filter(|d| d.status == KycStatus::Pending).count(),
            total_deposits: round2(total_deposits),
            total_withdrawn: round2(total_withdrawn),
        }
    }
}

/// Montants des dépôts complétés, par bucket (graphique du dashboard)
pub fn deposit_buckets(
    transactions: &[Transaction],
    bucketing: Bucketing,
    now: DateTime<Utc>,
) -> Vec<Bucket> {
    sum_by_bucket(
        transactions,
        |t| t.kind == TransactionKind::Deposit && t.status == TransactionStatus::Completed,
        bucketing,
        now,
    )
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn tx(id: i64, kind: TransactionKind, amount: f64, when: DateTime<Utc>) -> Transaction {
        Transaction::new(id, kind, amount, TransactionStatus::Completed, when)
    }

    #[test]
    fn test_daily_deposit_buckets() {
        // 2026-10-19 est un lundi, 2026-10-20 un mardi
        let now = at(2026, 10, 21);
        let items = vec![
            tx(1, TransactionKind::Deposit, 100.0, at(2026, 10, 19)),
            tx(2, TransactionKind::Withdrawal, 50.0, at(2026, 10, 20)),
        ];

        let buckets = deposit_buckets(&items, Bucketing::Daily, now);
        let totals: Vec<f64> = buckets.iter().map(|b| b.total).collect();
        assert_eq!(totals, vec![100.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(buckets[0].label, "Mon");
        assert_eq!(buckets[1].label, "Tue");
    }

    #[test]
    fn test_daily_ignores_previous_week() {
        let now = at(2026, 10, 21);
        let items = vec![tx(1, TransactionKind::Deposit, 80.0, at(2026, 10, 18))];
        let buckets = deposit_buckets(&items, Bucketing::Daily, now);
        assert!(buckets.iter().all(|b| b.total == 0.0));
    }

    #[test]
    fn test_weekly_buckets() {
        let now = at(2026, 10, 21);
        let items = vec![
            tx(1, TransactionKind::Deposit, 10.0, at(2026, 10, 20)),
            tx(2, TransactionKind::Deposit, 20.0, at(2026, 10, 10)),
            tx(3, TransactionKind::Deposit, 40.0, at(2026, 9, 1)),
        ];
        let buckets = deposit_buckets(&items, Bucketing::Weekly, now);
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[3].label, "This week");
        assert_eq!(buckets[3].total, 10.0);
        assert_eq!(buckets[2].total, 20.0);
        assert_eq!(buckets.iter().map(|b| b.total).sum::<f64>(), 30.0);
    }

    #[test]
    fn test_monthly_buckets_cross_year() {
        let now = at(2026, 2, 15);
        let items = vec![
            tx(1, TransactionKind::Deposit, 5.0, at(2025, 9, 3)),
            tx(2, TransactionKind::Deposit, 7.0, at(2026, 2, 1)),
            tx(3, TransactionKind::Deposit, 9.0, at(2025, 8, 31)),
        ];
        let buckets = deposit_buckets(&items, Bucketing::Monthly, now);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
        assert_eq!(buckets[0].total, 5.0);
        assert_eq!(buckets[5].total, 7.0);
    }

    #[test]
    fn test_count_by_status_starts_at_zero() {
        let users: Vec<User> = serde_json::from_str(
            r#"[{"id": 1, "status": "active", "plan": "Gold"},
                {"id": 2, "status": "active"},
                {"id": 3, "status": "blocked", "plan": "Gold"}]"#,
        )
        .unwrap();

        let summary = DashboardSummary::compute(&users, &[], &[], &[]);
        assert_eq!(summary.users_by_status["active"], 2);
        assert_eq!(summary.users_by_status["blocked"], 1);
        assert_eq!(summary.users_by_status["pending"], 0);
        assert_eq!(summary.plan_distribution["Gold"], 2);
        assert_eq!(summary.plan_distribution["none"], 1);
    }

    #[test]
    fn test_summary_withdrawals() {
        let withdrawals: Vec<Withdrawal> = serde_json::from_str(
            r#"[{"id": 1, "amount": "10.25", "status": "pending"},
                {"id": 2, "amount": 20, "status": "pending"},
                {"id": 3, "amount": 99, "status": "approved"}]"#,
        )
        .unwrap();

        let summary = DashboardSummary::compute(&[], &[], &withdrawals, &[]);
        assert_eq!(summary.pending_withdrawals, 2);
        assert_eq!(summary.pending_withdrawal_amount, 30.25);
        assert_eq!(summary.total_withdrawn, 99.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(10.0 / 3.0), 3.33);
        assert_eq!(round2(2.349), 2.35);
    }

    proptest! {
        #[test]
        fn prop_bucket_sum_matches_window(
            specs in prop::collection::vec((0i64..120, 0u32..100_000, any::<bool>()), 0..50),
            mode in 0usize..3,
        ) {
            let now = at(2026, 10, 21);
            let bucketing = [Bucketing::Daily, Bucketing::Weekly, Bucketing::Monthly][mode];
            let items: Vec<Transaction> = specs
                .iter()
                .enumerate()
                .map(|(i, (days_ago, cents, deposit))| {
                    let kind = if *deposit { TransactionKind::Deposit } else { TransactionKind::Bonus };
                    tx(i as i64, kind, *cents as f64 / 100.0, now - Duration::days(*days_ago))
                })
                .collect();

            let buckets = deposit_buckets(&items, bucketing, now);
            let bucketed: f64 = buckets.iter().map(|b| b.total).sum();
            let expected: f64 = items
                .iter()
                .filter(|t| t.kind == TransactionKind::Deposit)
                .filter(|t| bucketing.bucket_index(t.created_at, now).is_some())
                .map(|t| t.amount)
                .sum();

            prop_assert_eq!(buckets.len(), bucketing.len());
            prop_assert!((bucketed - expected).abs() < 1e-6);
        }
    }
}
