// ============================================================================
// État local des listes
// ============================================================================
// Conserve la dernière liste reçue de l'API pour chaque ressource, et
// applique les corrections locales après une mutation confirmée.
//
// CONCEPT : Compteur de génération
// - Chaque fetch reçoit un numéro (Generation) croissant
// - Seule la réponse du DERNIER fetch émis est appliquée
// - Une réponse lente d'un fetch plus ancien est ignorée
//   (sinon elle écraserait un résultat plus récent)
// ============================================================================

use tracing::{debug, warn};

use crate::models::{
    DashboardStats, KycDocument, KycStatus, Notification, Payment, PaymentStatus, Plan, Record,
    Setting, Task, Transaction, User, UserStatus, Withdrawal, WithdrawalStatus,
};
use crate::mutation::{Action, Updated};

/// Ressources exposées par l'API d'administration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Stats,
    Users,
    Transactions,
    Withdrawals,
    Kyc,
    Payments,
    Plans,
    Tasks,
    Notifications,
    Settings,
}

impl Resource {
    /// Ressources listables, dans l'ordre des onglets
    pub const LISTS: [Resource; 9] = [
        Resource::Users,
        Resource::Transactions,
        Resource::Withdrawals,
        Resource::Kyc,
        Resource::Payments,
        Resource::Plans,
        Resource::Tasks,
        Resource::Notifications,
        Resource::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Resource::Stats => "Dashboard",
            Resource::Users => "Users",
            Resource::Transactions => "Transactions",
            Resource::Withdrawals => "Withdrawals",
            Resource::Kyc => "KYC",
            Resource::Payments => "Payments",
            Resource::Plans => "Plans",
            Resource::Tasks => "Tasks",
            Resource::Notifications => "Notifications",
            Resource::Settings => "Settings",
        }
    }

    /// Chemin de l'endpoint de liste, relatif à l'URL de base
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Stats => "admin/dashboard/stats",
            Resource::Users => "admin/users",
            Resource::Transactions => "admin/transactions",
            Resource::Withdrawals => "admin/withdrawals",
            Resource::Kyc => "admin/kyc",
            Resource::Payments => "admin/payments",
            Resource::Plans => "admin/plans",
            Resource::Tasks => "admin/tasks",
            Resource::Notifications => "admin/notifications",
            Resource::Settings => "admin/settings",
        }
    }
}

/// Numéro d'un fetch émis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Valeur rafraîchie depuis l'API, protégée par un compteur de génération
#[derive(Debug, Clone, Default)]
pub struct Tracked<V> {
    value: V,
    issued: u64,
    loading: bool,
    error: Option<String>,
}

impl<V> Tracked<V> {
    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Émet une nouvelle génération : les réponses précédentes deviennent obsolètes
    pub fn begin_fetch(&mut self) -> Generation {
        self.issued += 1;
        self.loading = true;
        Generation(self.issued)
    }

    /// Applique la réponse d'un fetch si elle correspond au dernier émis
    ///
    /// En cas d'erreur la valeur précédente est conservée (liste vide ou
    /// stats à zéro au premier chargement).
    ///
    /// Retourne false si la réponse était obsolète et a été ignorée.
    pub fn finish_fetch(&mut self, generation: Generation, result: Result<V, String>) -> bool {
        if generation.0 != self.issued {
            debug!(
                generation = generation.0,
                latest = self.issued,
                "Discarding stale response"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(value) => {
                self.value = value;
                self.error = None;
            }
            Err(message) => {
                warn!(error = %message, "Fetch failed, keeping previous value");
                self.error = Some(message);
            }
        }
        true
    }
}

impl<T: Record> Tracked<Vec<T>> {
    pub fn items(&self) -> &[T] {
        &self.value
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.value.iter().find(|item| item.id() == id)
    }

    /// Modifie l'item `id` en place ; false si absent
    pub fn update<F>(&mut self, id: i64, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        match self.value.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    /// Remplace l'item de même id, ou l'ajoute en fin de liste
    pub fn upsert(&mut self, item: T) {
        match self.value.iter().position(|existing| existing.id() == item.id()) {
            Some(index) => self.value[index] = item,
            None => self.value.push(item),
        }
    }

    /// Retire l'item `id` ; false si absent
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.value.len();
        self.value.retain(|item| item.id() != id);
        self.value.len() != before
    }
}

/// Réponse d'un fetch, typée par ressource
#[derive(Debug, Clone)]
pub enum Loaded {
    Stats(DashboardStats),
    Users(Vec<User>),
    Transactions(Vec<Transaction>),
    Withdrawals(Vec<Withdrawal>),
    Kyc(Vec<KycDocument>),
    Payments(Vec<Payment>),
    Plans(Vec<Plan>),
    Tasks(Vec<Task>),
    Notifications(Vec<Notification>),
    Settings(Vec<Setting>),
}

/// Suite à donner après une mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// La liste locale est à jour
    Nothing,
    /// Le serveur n'a pas renvoyé l'entité créée : recharger la liste
    Refetch(Resource),
}

/// Toutes les listes de la console
#[derive(Debug, Clone, Default)]
pub struct Lists {
    pub stats: Tracked<DashboardStats>,
    pub users: Tracked<Vec<User>>,
    pub transactions: Tracked<Vec<Transaction>>,
    pub withdrawals: Tracked<Vec<Withdrawal>>,
    pub kyc: Tracked<Vec<KycDocument>>,
    pub payments: Tracked<Vec<Payment>>,
    pub plans: Tracked<Vec<Plan>>,
    pub tasks: Tracked<Vec<Task>>,
    pub notifications: Tracked<Vec<Notification>>,
    pub settings: Tracked<Vec<Setting>>,
}

impl Lists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Émet une génération pour la ressource demandée
    pub fn begin_fetch(&mut self, resource: Resource) -> Generation {
        match resource {
            Resource::Stats => self.stats.begin_fetch(),
            Resource::Users => self.users.begin_fetch(),
            Resource::Transactions => self.transactions.begin_fetch(),
            Resource::Withdrawals => self.withdrawals.begin_fetch(),
            Resource::Kyc => self.kyc.begin_fetch(),
            Resource::Payments => self.payments.begin_fetch(),
            Resource::Plans => self.plans.begin_fetch(),
            Resource::Tasks => self.tasks.begin_fetch(),
            Resource::Notifications => self.notifications.begin_fetch(),
            Resource::Settings => self.settings.begin_fetch(),
        }
    }

    /// Applique une réponse réussie (si elle n'est pas obsolète)
    pub fn finish_fetch(&mut self, generation: Generation, loaded: Loaded) -> bool {
        match loaded {
            Loaded::Stats(v) => self.stats.finish_fetch(generation, Ok(v)),
            Loaded::Users(v) => self.users.finish_fetch(generation, Ok(v)),
            Loaded::Transactions(v) => self.transactions.finish_fetch(generation, Ok(v)),
            Loaded::Withdrawals(v) => self.withdrawals.finish_fetch(generation, Ok(v)),
            Loaded::Kyc(v) => self.kyc.finish_fetch(generation, Ok(v)),
            Loaded::Payments(v) => self.payments.finish_fetch(generation, Ok(v)),
            Loaded::Plans(v) => self.plans.finish_fetch(generation, Ok(v)),
            Loaded::Tasks(v) => self.tasks.finish_fetch(generation, Ok(v)),
            Loaded::Notifications(v) => self.notifications.finish_fetch(generation, Ok(v)),
            Loaded::Settings(v) => self.settings.finish_fetch(generation, Ok(v)),
        }
    }

    /// Enregistre l'échec d'un fetch (si la réponse n'est pas obsolète)
    pub fn fail_fetch(&mut self, resource: Resource, generation: Generation, message: String) -> bool {
        match resource {
            Resource::Stats => self.stats.finish_fetch(generation, Err(message)),
            Resource::Users => self.users.finish_fetch(generation, Err(message)),
            Resource::Transactions => self.transactions.finish_fetch(generation, Err(message)),
            Resource::Withdrawals => self.withdrawals.finish_fetch(generation, Err(message)),
            Resource::Kyc => self.kyc.finish_fetch(generation, Err(message)),
            Resource::Payments => self.payments.finish_fetch(generation, Err(message)),
            Resource::Plans => self.plans.finish_fetch(generation, Err(message)),
            Resource::Tasks => self.tasks.finish_fetch(generation, Err(message)),
            Resource::Notifications => self.notifications.finish_fetch(generation, Err(message)),
            Resource::Settings => self.settings.finish_fetch(generation, Err(message)),
        }
    }

    pub fn is_loading(&self, resource: Resource) -> bool {
        match resource {
            Resource::Stats => self.stats.is_loading(),
            Resource::Users => self.users.is_loading(),
            Resource::Transactions => self.transactions.is_loading(),
            Resource::Withdrawals => self.withdrawals.is_loading(),
            Resource::Kyc => self.kyc.is_loading(),
            Resource::Payments => self.payments.is_loading(),
            Resource::Plans => self.plans.is_loading(),
            Resource::Tasks => self.tasks.is_loading(),
            Resource::Notifications => self.notifications.is_loading(),
            Resource::Settings => self.settings.is_loading(),
        }
    }

    // ========================================================================
    // Mise à jour optimiste
    // ========================================================================

    /// Corrige la liste locale après une mutation CONFIRMÉE par le serveur
    ///
    /// CONCEPT : Patch ciblé
    /// - Seul l'item visé par l'action change
    /// - L'entité renvoyée par le serveur remplace la copie locale seulement
    ///   si elle concerne l'item visé (voir `echo_matches`)
    /// - Le nouveau statut est ensuite appliqué localement dans tous les cas
    ///
    /// Ne doit jamais être appelé après un échec : l'état reste inchangé.
    pub fn apply_mutation(&mut self, action: &Action, updated: Updated) -> Followup {
        let echoed = match updated {
            Updated::Nothing => false,
            other if Self::echo_matches(action, &other) => {
                self.upsert_echo(other);
                true
            }
            other => {
                warn!(
                    action = %action.describe(),
                    echo = ?other,
                    "Ignoring server entity that does not match the action"
                );
                false
            }
        };

        // Le statut impliqué par l'action prime sur celui de l'écho
        match action {
            Action::ApproveWithdrawal(id) => {
                self.withdrawals.update(*id, |w| w.status = WithdrawalStatus::Approved);
            }
            Action::RejectWithdrawal(id) => {
                self.withdrawals.update(*id, |w| w.status = WithdrawalStatus::Rejected);
            }
            Action::ApproveKyc(id) => {
                self.kyc.update(*id, |d| {
                    d.status = KycStatus::Approved;
                    d.rejection_reason = None;
                });
            }
            Action::RejectKyc { id, reason } => {
                self.kyc.update(*id, |d| {
                    d.status = KycStatus::Rejected;
                    d.rejection_reason = Some(reason.clone());
                });
            }
            Action::ApprovePayment(id) => {
                self.payments.update(*id, |p| p.status = PaymentStatus::Approved);
            }
            Action::RejectPayment(id) => {
                self.payments.update(*id, |p| p.status = PaymentStatus::Rejected);
            }
            Action::BlockUser(id) => {
                self.users.update(*id, |u| u.status = UserStatus::Blocked);
            }
            Action::UnblockUser(id) => {
                self.users.update(*id, |u| u.status = UserStatus::Active);
            }
            Action::DeletePlan(id) => {
                self.plans.remove(*id);
            }
            Action::DeleteTask(id) => {
                self.tasks.remove(*id);
            }
            Action::MarkNotificationRead(id) => {
                self.notifications.update(*id, |n| n.read = true);
            }
            Action::UpdateSetting { key, value } => {
                if let Some(setting) = self.settings.value.iter_mut().find(|s| &s.key == key) {
                    setting.value = value.clone();
                }
            }
            Action::CreatePlan(_) | Action::CreateTask(_) | Action::SendNotification(_) => {
                if !echoed {
                    return Followup::Refetch(action.resource());
                }
            }
        }

        Followup::Nothing
    }

    /// Vrai si l'entité renvoyée concerne bien l'item visé par l'action
    ///
    /// Les champs des DTO ont des valeurs par défaut : une réponse partielle
    /// (`{"id": 2, "message": "ok"}`) se décode en entité vide. Elle est
    /// rejetée si la ressource ou l'id diffère, si son statut est inconnu ou
    /// si son libellé est vide.
    fn echo_matches(action: &Action, updated: &Updated) -> bool {
        if updated.resource() != Some(action.resource()) {
            return false;
        }

        let (id, complete) = match updated {
            Updated::Nothing => return false,
            Updated::User(u) => (u.id, u.status != UserStatus::Unknown),
            Updated::Withdrawal(w) => (w.id, w.status != WithdrawalStatus::Unknown),
            Updated::Kyc(d) => (d.id, d.status != KycStatus::Unknown),
            Updated::Payment(p) => (p.id, p.status != PaymentStatus::Unknown),
            Updated::Plan(p) => (p.id, !p.name.is_empty()),
            Updated::Task(t) => (t.id, !t.title.is_empty()),
            Updated::Notification(n) => (n.id, !n.title.is_empty()),
            Updated::Setting(setting) => {
                return matches!(action, Action::UpdateSetting { key, .. } if *key == setting.key);
            }
        };

        complete && action.target_id().map_or(true, |target| target == id)
    }

    fn upsert_echo(&mut self, updated: Updated) {
        match updated {
            Updated::Nothing => {}
            Updated::User(user) => self.users.upsert(user),
            Updated::Withdrawal(withdrawal) => self.withdrawals.upsert(withdrawal),
            Updated::Kyc(doc) => self.kyc.upsert(doc),
            Updated::Payment(payment) => self.payments.upsert(payment),
            Updated::Plan(plan) => self.plans.upsert(plan),
            Updated::Task(task) => self.tasks.upsert(task),
            Updated::Notification(notification) => self.notifications.upsert(notification),
            Updated::Setting(setting) => self.settings.upsert(setting),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn withdrawals() -> Vec<Withdrawal> {
        serde_json::from_str(
            r#"[{"id": 1, "amount": 10, "status": "pending"},
                {"id": 2, "amount": 20, "status": "pending"},
                {"id": 3, "amount": 30, "status": "approved"}]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut tracked: Tracked<Vec<Withdrawal>> = Tracked::default();

        let first = tracked.begin_fetch();
        let second = tracked.begin_fetch();

        // La réponse du second fetch arrive d'abord
        assert!(tracked.finish_fetch(second, Ok(withdrawals())));
        assert!(!tracked.is_loading());

        // La réponse lente du premier fetch ne doit rien écraser
        assert!(!tracked.finish_fetch(first, Ok(Vec::new())));
        assert_eq!(tracked.items().len(), 3);
    }

    #[test]
    fn test_failed_fetch_keeps_previous_value() {
        let mut tracked: Tracked<Vec<Withdrawal>> = Tracked::default();
        let g = tracked.begin_fetch();
        tracked.finish_fetch(g, Ok(withdrawals()));

        let g = tracked.begin_fetch();
        assert!(tracked.finish_fetch(g, Err("boom".to_string())));
        assert_eq!(tracked.items().len(), 3);
        assert_eq!(tracked.last_error(), Some("boom"));
    }

    #[test]
    fn test_approve_patches_only_target() {
        let mut lists = Lists::new();
        let g = lists.begin_fetch(Resource::Withdrawals);
        lists.finish_fetch(g, Loaded::Withdrawals(withdrawals()));
        let before = lists.withdrawals.items().to_vec();

        let followup = lists.apply_mutation(&Action::ApproveWithdrawal(2), Updated::Nothing);
        assert_eq!(followup, Followup::Nothing);

        let after = lists.withdrawals.items();
        assert_eq!(after[1].status, WithdrawalStatus::Approved);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
    }

    #[test]
    fn test_server_entity_replaces_local_copy() {
        let mut lists = Lists::new();
        let g = lists.begin_fetch(Resource::Withdrawals);
        lists.finish_fetch(g, Loaded::Withdrawals(withdrawals()));

        let mut server = withdrawals()[0].clone();
        server.status = WithdrawalStatus::Rejected;
        server.amount = 11.0;

        lists.apply_mutation(&Action::RejectWithdrawal(1), Updated::Withdrawal(server));
        assert_eq!(lists.withdrawals.items()[0].amount, 11.0);
        assert_eq!(lists.withdrawals.items().len(), 3);
    }

    #[test]
    fn test_delete_and_create_followups() {
        let mut lists = Lists::new();
        let g = lists.begin_fetch(Resource::Plans);
        let plans: Vec<Plan> = serde_json::from_str(r#"[{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]"#).unwrap();
        lists.finish_fetch(g, Loaded::Plans(plans));

        lists.apply_mutation(&Action::DeletePlan(1), Updated::Nothing);
        assert_eq!(lists.plans.items().len(), 1);
        assert!(lists.plans.get(1).is_none());

        let new_plan = crate::models::NewPlan::parse("C;1;2;3;4").unwrap();
        let followup = lists.apply_mutation(&Action::CreatePlan(new_plan), Updated::Nothing);
        assert_eq!(followup, Followup::Refetch(Resource::Plans));
    }

    #[test]
    fn test_reject_kyc_records_reason() {
        let mut lists = Lists::new();
        let g = lists.begin_fetch(Resource::Kyc);
        let docs: Vec<KycDocument> = serde_json::from_str(r#"[{"id": 5, "status": "pending"}]"#).unwrap();
        lists.finish_fetch(g, Loaded::Kyc(docs));

        let action = Action::RejectKyc { id: 5, reason: "blurry".to_string() };
        lists.apply_mutation(&action, Updated::Nothing);

        let doc = lists.kyc.get(5).unwrap();
        assert_eq!(doc.status, KycStatus::Rejected);
        assert_eq!(doc.rejection_reason.as_deref(), Some("blurry"));
    }

    #[test]
    fn test_partial_echo_keeps_local_fields() {
        let mut lists = Lists::new();
        let g = lists.begin_fetch(Resource::Withdrawals);
        lists.finish_fetch(g, Loaded::Withdrawals(withdrawals()));

        // Réponse sans statut ni montant : décodée avec les valeurs par défaut
        let echo: Withdrawal =
            serde_json::from_str(r#"{"id": 2, "message": "Withdrawal approved"}"#).unwrap();
        lists.apply_mutation(&Action::ApproveWithdrawal(2), Updated::Withdrawal(echo));

        let item = lists.withdrawals.get(2).unwrap();
        assert_eq!(item.status, WithdrawalStatus::Approved);
        assert_eq!(item.amount, 20.0);
        assert_eq!(lists.withdrawals.items().len(), 3);
    }

    #[test]
    fn test_echo_for_another_item_is_ignored() {
        let mut lists = Lists::new();
        let g = lists.begin_fetch(Resource::Withdrawals);
        let one: Vec<Withdrawal> =
            serde_json::from_str(r#"[{"id": 1, "amount": 10, "status": "pending"}]"#).unwrap();
        lists.finish_fetch(g, Loaded::Withdrawals(one));

        let echo: Withdrawal =
            serde_json::from_str(r#"{"id": 77, "amount": 5, "status": "approved"}"#).unwrap();
        lists.apply_mutation(&Action::ApproveWithdrawal(1), Updated::Withdrawal(echo));

        let ids: Vec<i64> = lists.withdrawals.items().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(lists.withdrawals.get(1).unwrap().status, WithdrawalStatus::Approved);
    }

    #[test]
    fn test_echo_status_is_overridden_by_action() {
        let mut lists = Lists::new();
        let g = lists.begin_fetch(Resource::Withdrawals);
        lists.finish_fetch(g, Loaded::Withdrawals(withdrawals()));

        // Le serveur renvoie l'item encore "pending" : l'action fait foi
        let echo = withdrawals()[0].clone();
        lists.apply_mutation(&Action::ApproveWithdrawal(1), Updated::Withdrawal(echo));
        assert_eq!(lists.withdrawals.get(1).unwrap().status, WithdrawalStatus::Approved);
    }

    #[test]
    fn test_created_entity_is_appended() {
        let mut lists = Lists::new();
        let g = lists.begin_fetch(Resource::Plans);
        let plans: Vec<Plan> = serde_json::from_str(r#"[{"id": 1, "name": "A"}]"#).unwrap();
        lists.finish_fetch(g, Loaded::Plans(plans));

        let created: Plan =
            serde_json::from_str(r#"{"id": 8, "name": "Gold", "active": true}"#).unwrap();
        let action = Action::CreatePlan(crate::models::NewPlan::parse("Gold;1;2;3;4").unwrap());
        let followup = lists.apply_mutation(&action, Updated::Plan(created));

        assert_eq!(followup, Followup::Nothing);
        let ids: Vec<i64> = lists.plans.items().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 8]);

        let g = lists.begin_fetch(Resource::Tasks);
        lists.finish_fetch(g, Loaded::Tasks(Vec::new()));
        let task: Task =
            serde_json::from_str(r#"{"id": 3, "title": "Follow us", "status": "active"}"#).unwrap();
        let action = Action::CreateTask(crate::models::NewTask::parse("Follow us;5").unwrap());
        let followup = lists.apply_mutation(&action, Updated::Task(task));

        assert_eq!(followup, Followup::Nothing);
        assert_eq!(lists.tasks.get(3).map(|t| t.title.as_str()), Some("Follow us"));
    }

    #[test]
    fn test_empty_creation_echo_triggers_refetch() {
        let mut lists = Lists::new();
        let echo: Task = serde_json::from_str(r#"{"id": 9, "message": "created"}"#).unwrap();
        let action = Action::CreateTask(crate::models::NewTask::parse("Follow us;5").unwrap());

        let followup = lists.apply_mutation(&action, Updated::Task(echo));
        assert_eq!(followup, Followup::Refetch(Resource::Tasks));
        assert!(lists.tasks.items().is_empty());
    }
}
