// ============================================================================
// Mutations
// ============================================================================
// Actions d'administration envoyées au serveur (approbation, rejet, blocage,
// création, suppression, ...). Une action = un seul appel API.
//
// Pas de retry, pas de file d'attente : si l'appel échoue, le message est
// affiché et l'état local ne change pas.
// ============================================================================

use crate::models::{
    KycDocument, NewNotification, NewPlan, NewTask, Notification, Payment, Plan, Setting, Task,
    User, Withdrawal,
};
use crate::store::Resource;

/// Action d'administration
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ApproveWithdrawal(i64),
    RejectWithdrawal(i64),
    ApproveKyc(i64),
    RejectKyc { id: i64, reason: String },
    ApprovePayment(i64),
    RejectPayment(i64),
    BlockUser(i64),
    UnblockUser(i64),
    DeletePlan(i64),
    DeleteTask(i64),
    CreatePlan(NewPlan),
    CreateTask(NewTask),
    SendNotification(NewNotification),
    MarkNotificationRead(i64),
    UpdateSetting { key: String, value: String },
}

impl Action {
    /// Ressource modifiée par l'action
    pub fn resource(&self) -> Resource {
        match self {
            Action::ApproveWithdrawal(_) | Action::RejectWithdrawal(_) => Resource::Withdrawals,
            Action::ApproveKyc(_) | Action::RejectKyc { .. } => Resource::Kyc,
            Action::ApprovePayment(_) | Action::RejectPayment(_) => Resource::Payments,
            Action::BlockUser(_) | Action::UnblockUser(_) => Resource::Users,
            Action::DeletePlan(_) | Action::CreatePlan(_) => Resource::Plans,
            Action::DeleteTask(_) | Action::CreateTask(_) => Resource::Tasks,
            Action::SendNotification(_) | Action::MarkNotificationRead(_) => Resource::Notifications,
            Action::UpdateSetting { .. } => Resource::Settings,
        }
    }

    /// Description courte, pour le bandeau et les logs
    pub fn describe(&self) -> String {
        match self {
            Action::ApproveWithdrawal(id) => format!("approve withdrawal #{}", id),
            Action::RejectWithdrawal(id) => format!("reject withdrawal #{}", id),
            Action::ApproveKyc(id) => format!("approve KYC document #{}", id),
            Action::RejectKyc { id, .. } => format!("reject KYC document #{}", id),
            Action::ApprovePayment(id) => format!("approve payment #{}", id),
            Action::RejectPayment(id) => format!("reject payment #{}", id),
            Action::BlockUser(id) => format!("block user #{}", id),
            Action::UnblockUser(id) => format!("unblock user #{}", id),
            Action::DeletePlan(id) => format!("delete plan #{}", id),
            Action::DeleteTask(id) => format!("delete task #{}", id),
            Action::CreatePlan(plan) => format!("create plan '{}'", plan.name),
            Action::CreateTask(task) => format!("create task '{}'", task.title),
            Action::SendNotification(n) => format!("send notification '{}'", n.title),
            Action::MarkNotificationRead(id) => format!("mark notification #{} as read", id),
            Action::UpdateSetting { key, .. } => format!("update setting '{}'", key),
        }
    }

    /// Identifiant de l'item visé, absent pour les créations et les paramètres
    pub fn target_id(&self) -> Option<i64> {
        match self {
            Action::ApproveWithdrawal(id)
            | Action::RejectWithdrawal(id)
            | Action::ApproveKyc(id)
            | Action::RejectKyc { id, .. }
            | Action::ApprovePayment(id)
            | Action::RejectPayment(id)
            | Action::BlockUser(id)
            | Action::UnblockUser(id)
            | Action::DeletePlan(id)
            | Action::DeleteTask(id)
            | Action::MarkNotificationRead(id) => Some(*id),
            Action::CreatePlan(_)
            | Action::CreateTask(_)
            | Action::SendNotification(_)
            | Action::UpdateSetting { .. } => None,
        }
    }

    /// Les actions destructrices ou irréversibles demandent une seconde pression
    ///
    /// Les actions issues d'une saisie (motif de rejet KYC, création, valeur
    /// de paramètre) sont confirmées par Entrée.
    pub fn needs_confirmation(&self) -> bool {
        !matches!(
            self,
            Action::RejectKyc { .. }
                | Action::MarkNotificationRead(_)
                | Action::CreatePlan(_)
                | Action::CreateTask(_)
                | Action::SendNotification(_)
                | Action::UpdateSetting { .. }
        )
    }
}

/// Entité renvoyée par le serveur après une mutation, si présente
#[derive(Debug, Clone, PartialEq)]
pub enum Updated {
    /// Réponse vide (204) ou sans entité exploitable
    Nothing,
    User(User),
    Withdrawal(Withdrawal),
    Kyc(KycDocument),
    Payment(Payment),
    Plan(Plan),
    Task(Task),
    Notification(Notification),
    Setting(Setting),
}

impl Updated {
    /// Convertit une réponse optionnelle en `Updated`
    pub fn from_option<T, F>(item: Option<T>, wrap: F) -> Updated
    where
        F: FnOnce(T) -> Updated,
    {
        item.map(wrap).unwrap_or(Updated::Nothing)
    }

    /// Ressource de l'entité renvoyée
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Updated::Nothing => None,
            Updated::User(_) => Some(Resource::Users),
            Updated::Withdrawal(_) => Some(Resource::Withdrawals),
            Updated::Kyc(_) => Some(Resource::Kyc),
            Updated::Payment(_) => Some(Resource::Payments),
            Updated::Plan(_) => Some(Resource::Plans),
            Updated::Task(_) => Some(Resource::Tasks),
            Updated::Notification(_) => Some(Resource::Notifications),
            Updated::Setting(_) => Some(Resource::Settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_resource_and_confirmation() {
        assert_eq!(Action::BlockUser(1).resource(), Resource::Users);
        assert!(Action::BlockUser(1).needs_confirmation());
        assert!(!Action::MarkNotificationRead(1).needs_confirmation());
        assert_eq!(Action::ApproveWithdrawal(9).describe(), "approve withdrawal #9");
    }

    #[test]
    fn test_target_id() {
        assert_eq!(Action::RejectKyc { id: 4, reason: "x".into() }.target_id(), Some(4));
        let setting = Action::UpdateSetting { key: "fee".into(), value: "1".into() };
        assert_eq!(setting.target_id(), None);
    }

    #[test]
    fn test_updated_from_option() {
        assert_eq!(Updated::from_option(None::<User>, Updated::User), Updated::Nothing);
    }
}
