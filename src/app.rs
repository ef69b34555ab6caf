// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de la console d'administration
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Les réponses du worker sont appliquées par apply_result()
// ============================================================================

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::aggregate::{Bucketing, DashboardSummary};
use crate::filter::{self, FilterState, Page};
use crate::models::{
    KycStatus, NewNotification, NewPlan, NewTask, PaymentStatus, PlanStatus, ReadState, Record,
    TaskStatus, TransactionKind, TransactionStatus, UserStatus, WithdrawalStatus,
};
use crate::mutation::Action;
use crate::store::{Followup, Lists, Resource};
use crate::worker::{AppCommand, AppResult};

/// Ressources chargées au démarrage (nécessaires au dashboard)
pub const DASHBOARD_RESOURCES: [Resource; 5] = [
    Resource::Stats,
    Resource::Users,
    Resource::Transactions,
    Resource::Withdrawals,
    Resource::Kyc,
];

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Cartes de statistiques et graphique des dépôts
    Dashboard,

    /// Tableau d'une ressource
    List(Resource),
}

impl Screen {
    /// Onglets, dans l'ordre d'affichage
    pub fn tabs() -> Vec<Screen> {
        std::iter::once(Screen::Dashboard)
            .chain(Resource::LISTS.iter().map(|r| Screen::List(*r)))
            .collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::List(resource) => resource.label(),
        }
    }
}

/// Ce que la saisie en cours va produire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPurpose {
    Search,
    RejectReason(i64),
    NewPlan,
    NewTask,
    NewNotification,
    SettingValue(String),
    Token,
}

impl InputPurpose {
    pub fn prompt(&self) -> String {
        match self {
            InputPurpose::Search => "Search: ".to_string(),
            InputPurpose::RejectReason(id) => format!("Reject KYC #{} - reason: ", id),
            InputPurpose::NewPlan => "New plan (name;min;max;roi%;days): ".to_string(),
            InputPurpose::NewTask => "New task (title;reward): ".to_string(),
            InputPurpose::NewNotification => "Notify ([user_id;]title;message): ".to_string(),
            InputPurpose::SettingValue(key) => format!("New value for {}: ", key),
            InputPurpose::Token => "Admin token: ".to_string(),
        }
    }
}

/// Gravité du bandeau d'alerte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Error,
}

/// Bandeau affiché sous les onglets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

/// Résultat d'une saisie validée, à traiter par l'event loop
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    /// Rien à faire (recherche appliquée, saisie vide ou invalide)
    Nothing,
    /// Action à envoyer au worker
    Action(Action),
    /// Nouveau token à enregistrer dans la session
    Token(String),
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Onglet affiché
    pub current_screen: Screen,

    /// Listes et stats reçues de l'API
    pub lists: Lists,

    /// Filtres par onglet (conservés quand on change d'onglet)
    pub filters: HashMap<Resource, FilterState>,

    /// Page courante par onglet
    pub pages: HashMap<Resource, usize>,

    /// Ligne sélectionnée dans la page courante
    pub selected_index: usize,

    /// Lignes par page
    pub per_page: usize,

    /// Découpage du graphique du dashboard
    pub bucketing: Bucketing,

    /// Two-step quit
    pub confirm_quit: bool,

    /// Action en attente de seconde pression
    pub pending_action: Option<Action>,

    /// Saisie en cours (None = pas de mode input)
    pub input: Option<InputPurpose>,

    /// Buffer de saisie
    pub input_buffer: String,

    /// Dernier message d'erreur ou de succès
    pub banner: Option<Banner>,

    /// Un appel est en cours côté worker
    pub is_loading: bool,

    /// Message affiché pendant le chargement
    pub loading_message: Option<String>,

    /// Notifications non lues (rafraîchi périodiquement)
    pub unread_count: u64,

    /// Ticks écoulés depuis le dernier rafraîchissement du compteur
    ticks_since_unread: u64,

    /// Nombre de ticks entre deux rafraîchissements du compteur
    unread_every_ticks: u64,
}

impl App {
    /// Crée l'état initial
    ///
    /// `unread_every_ticks` = 0 désactive le rafraîchissement périodique
    pub fn new(per_page: usize, unread_every_ticks: u64) -> Self {
        Self {
            running: true,
            current_screen: Screen::Dashboard,
            lists: Lists::new(),
            filters: HashMap::new(),
            pages: HashMap::new(),
            selected_index: 0,
            per_page: per_page.max(1),
            bucketing: Bucketing::default(),
            confirm_quit: false,
            pending_action: None,
            input: None,
            input_buffer: String::new(),
            banner: None,
            is_loading: false,
            loading_message: None,
            unread_count: 0,
            ticks_since_unread: 0,
            unread_every_ticks,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Chargement
    // ========================================================================

    /// Prépare le fetch d'une ressource (nouvelle génération)
    pub fn fetch(&mut self, resource: Resource) -> AppCommand {
        let generation = self.lists.begin_fetch(resource);
        AppCommand::Fetch { resource, generation }
    }

    /// Commandes du chargement initial
    pub fn initial_fetches(&mut self) -> Vec<AppCommand> {
        let mut commands: Vec<AppCommand> =
            DASHBOARD_RESOURCES.iter().map(|r| self.fetch(*r)).collect();
        commands.push(AppCommand::RefreshUnread);
        commands
    }

    /// Commandes du rafraîchissement explicite de l'onglet courant
    pub fn refresh_current(&mut self) -> Vec<AppCommand> {
        match self.current_screen {
            Screen::Dashboard => DASHBOARD_RESOURCES.iter().map(|r| self.fetch(*r)).collect(),
            Screen::List(resource) => vec![self.fetch(resource)],
        }
    }

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    /// Tick : déclenche le rafraîchissement du compteur de non-lues
    pub fn tick(&mut self) -> Option<AppCommand> {
        if self.unread_every_ticks == 0 {
            return None;
        }
        self.ticks_since_unread += 1;
        if self.ticks_since_unread >= self.unread_every_ticks {
            self.ticks_since_unread = 0;
            return Some(AppCommand::RefreshUnread);
        }
        None
    }

    /// Applique un résultat du worker ; retourne les commandes de suivi
    pub fn apply_result(&mut self, result: AppResult) -> Vec<AppCommand> {
        match result {
            AppResult::Fetched { generation, loaded } => {
                if !self.lists.finish_fetch(generation, loaded) {
                    debug!("Ignored stale fetch result");
                }
                self.clamp_selection();
                Vec::new()
            }
            AppResult::FetchFailed {
                resource,
                generation,
                message,
                unauthorized,
            } => {
                if self.lists.fail_fetch(resource, generation, message.clone()) {
                    if unauthorized {
                        warn!(resource = resource.label(), "Unauthorized, token refresh needed");
                    }
                    self.show_error(message);
                }
                Vec::new()
            }
            AppResult::Mutated { action, updated } => {
                info!(action = %action.describe(), "Applying confirmed mutation");
                let followup = self.lists.apply_mutation(&action, updated);
                self.show_info(format!("Done: {}", action.describe()));
                self.clamp_selection();

                let mut commands = match followup {
                    Followup::Nothing => Vec::new(),
                    Followup::Refetch(resource) => vec![self.fetch(resource)],
                };
                // Le badge suit immédiatement, le serveur corrige au retour
                if let Action::MarkNotificationRead(_) = action {
                    self.unread_count = self.unread_count.saturating_sub(1);
                    commands.push(AppCommand::RefreshUnread);
                }
                commands
            }
            AppResult::MutationFailed { action, message } => {
                warn!(action = %action.describe(), error = %message, "Mutation rejected");
                self.show_error(message);
                Vec::new()
            }
            AppResult::UnreadCount(count) => {
                self.unread_count = count;
                Vec::new()
            }
        }
    }

    /// Nouveau token saisi : le transmet au worker et recharge le dashboard
    ///
    /// Un échec de sauvegarde reste affiché : le token ne vaut que pour la session.
    pub fn token_changed(&mut self, token: String, saved: anyhow::Result<()>) -> Vec<AppCommand> {
        match saved {
            Ok(()) => self.show_info("Token updated".to_string()),
            Err(e) => {
                warn!(error = ?e, "Failed to persist token");
                self.show_error(format!("Token not saved: {:#}", e));
            }
        }
        info!("New admin token set");

        let mut commands = vec![AppCommand::SetToken(Some(token))];
        commands.extend(self.initial_fetches());
        commands
    }

    // ========================================================================
    // Bandeau
    // ========================================================================

    pub fn show_error(&mut self, text: String) {
        self.banner = Some(Banner {
            kind: BannerKind::Error,
            text,
        });
    }

    pub fn show_info(&mut self, text: String) {
        self.banner = Some(Banner {
            kind: BannerKind::Info,
            text,
        });
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    // ========================================================================
    // Onglets et navigation
    // ========================================================================

    /// Ressource de l'onglet courant (None sur le dashboard)
    pub fn current_resource(&self) -> Option<Resource> {
        match self.current_screen {
            Screen::Dashboard => None,
            Screen::List(resource) => Some(resource),
        }
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    /// Passe à l'onglet suivant (cycle)
    pub fn next_tab(&mut self) -> Option<AppCommand> {
        let tabs = Screen::tabs();
        let pos = tabs.iter().position(|t| *t == self.current_screen).unwrap_or(0);
        self.switch_to(tabs[(pos + 1) % tabs.len()])
    }

    /// Passe à l'onglet précédent (cycle)
    pub fn previous_tab(&mut self) -> Option<AppCommand> {
        let tabs = Screen::tabs();
        let pos = tabs.iter().position(|t| *t == self.current_screen).unwrap_or(0);
        self.switch_to(tabs[(pos + tabs.len() - 1) % tabs.len()])
    }

    /// Change d'onglet ; charge la liste à la première visite
    fn switch_to(&mut self, screen: Screen) -> Option<AppCommand> {
        self.current_screen = screen;
        self.selected_index = 0;
        self.cancel_confirmations();

        match screen {
            Screen::List(resource) if !self.has_loaded_or_loading(resource) => {
                Some(self.fetch(resource))
            }
            _ => None,
        }
    }

    fn has_loaded_or_loading(&self, resource: Resource) -> bool {
        self.lists.is_loading(resource) || self.row_count(resource) > 0
    }

    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.current_page().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Ramène la sélection dans la page (après un filtre ou une suppression)
    fn clamp_selection(&mut self) {
        let max_index = self.current_page().len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);
    }

    // ========================================================================
    // Filtres et pagination
    // ========================================================================

    /// Filtre de l'onglet courant (défaut sur le dashboard)
    pub fn filter(&self) -> FilterState {
        self.current_resource()
            .and_then(|r| self.filters.get(&r).cloned())
            .unwrap_or_default()
    }

    fn update_filter<F>(&mut self, f: F)
    where
        F: FnOnce(&mut FilterState),
    {
        if let Some(resource) = self.current_resource() {
            f(self.filters.entry(resource).or_default());
            self.pages.insert(resource, 0);
            self.selected_index = 0;
        }
    }

    /// Valeurs de statut connues de l'onglet courant
    pub fn status_keys(&self) -> Vec<&'static str> {
        match self.current_resource() {
            Some(Resource::Users) => UserStatus::keys(),
            Some(Resource::Transactions) => TransactionStatus::keys(),
            Some(Resource::Withdrawals) => WithdrawalStatus::keys(),
            Some(Resource::Kyc) => KycStatus::keys(),
            Some(Resource::Payments) => PaymentStatus::keys(),
            Some(Resource::Plans) => PlanStatus::keys(),
            Some(Resource::Tasks) => TaskStatus::keys(),
            Some(Resource::Notifications) => ReadState::keys(),
            _ => Vec::new(),
        }
    }

    /// Valeurs de type de l'onglet courant
    ///
    /// Pour les types libres (moyen de paiement, type de document, plan),
    /// les valeurs sont celles présentes dans la liste chargée.
    pub fn kind_keys(&self) -> Vec<String> {
        match self.current_resource() {
            Some(Resource::Transactions) => {
                TransactionKind::keys().into_iter().map(str::to_string).collect()
            }
            Some(Resource::Users) => distinct_kinds(self.lists.users.items()),
            Some(Resource::Withdrawals) => distinct_kinds(self.lists.withdrawals.items()),
            Some(Resource::Kyc) => distinct_kinds(self.lists.kyc.items()),
            Some(Resource::Payments) => distinct_kinds(self.lists.payments.items()),
            _ => Vec::new(),
        }
    }

    pub fn cycle_status_filter(&mut self) {
        let keys = self.status_keys();
        self.update_filter(|f| f.status = FilterState::cycle(&f.status, &keys));
    }

    pub fn cycle_kind_filter(&mut self) {
        let keys = self.kind_keys();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.update_filter(|f| f.kind = FilterState::cycle(&f.kind, &keys));
    }

    pub fn cycle_sort(&mut self) {
        self.update_filter(|f| f.sort = f.sort.next());
    }

    pub fn clear_filters(&mut self) {
        self.update_filter(|f| *f = FilterState::default());
    }

    pub fn next_page(&mut self) {
        if let Some(resource) = self.current_resource() {
            let page = self.current_page();
            if page.index + 1 < page.count {
                self.pages.insert(resource, page.index + 1);
                self.selected_index = 0;
            }
        }
    }

    pub fn previous_page(&mut self) {
        if let Some(resource) = self.current_resource() {
            let page = self.current_page();
            self.pages.insert(resource, page.index.saturating_sub(1));
            self.selected_index = 0;
        }
    }

    pub fn cycle_bucketing(&mut self) {
        self.bucketing = self.bucketing.next();
    }

    /// Vue filtrée et paginée d'une liste, selon l'état de l'onglet `resource`
    pub fn view<'a, T: Record>(&self, resource: Resource, items: &'a [T]) -> (Vec<&'a T>, Page) {
        let state = self.filters.get(&resource).cloned().unwrap_or_default();
        let filtered = filter::apply(items, &state);
        let page = Page::window(
            filtered.len(),
            self.pages.get(&resource).copied().unwrap_or(0),
            self.per_page,
        );
        let rows = filtered[page.start..page.end].to_vec();
        (rows, page)
    }

    /// Nombre d'items chargés d'une ressource
    fn row_count(&self, resource: Resource) -> usize {
        match resource {
            Resource::Stats => 0,
            Resource::Users => self.lists.users.items().len(),
            Resource::Transactions => self.lists.transactions.items().len(),
            Resource::Withdrawals => self.lists.withdrawals.items().len(),
            Resource::Kyc => self.lists.kyc.items().len(),
            Resource::Payments => self.lists.payments.items().len(),
            Resource::Plans => self.lists.plans.items().len(),
            Resource::Tasks => self.lists.tasks.items().len(),
            Resource::Notifications => self.lists.notifications.items().len(),
            Resource::Settings => self.lists.settings.items().len(),
        }
    }

    /// Page courante de l'onglet
    pub fn current_page(&self) -> Page {
        let resource = match self.current_resource() {
            Some(resource) => resource,
            None => return Page::window(0, 0, self.per_page),
        };
        match resource {
            Resource::Stats => Page::window(0, 0, self.per_page),
            Resource::Users => self.view(resource, self.lists.users.items()).1,
            Resource::Transactions => self.view(resource, self.lists.transactions.items()).1,
            Resource::Withdrawals => self.view(resource, self.lists.withdrawals.items()).1,
            Resource::Kyc => self.view(resource, self.lists.kyc.items()).1,
            Resource::Payments => self.view(resource, self.lists.payments.items()).1,
            Resource::Plans => self.view(resource, self.lists.plans.items()).1,
            Resource::Tasks => self.view(resource, self.lists.tasks.items()).1,
            Resource::Notifications => self.view(resource, self.lists.notifications.items()).1,
            Resource::Settings => self.view(resource, self.lists.settings.items()).1,
        }
    }

    /// Item sélectionné d'une liste (dans la vue filtrée)
    fn selected_in<'a, T: Record>(&self, resource: Resource, items: &'a [T]) -> Option<&'a T> {
        let (rows, _) = self.view(resource, items);
        rows.get(self.selected_index).copied()
    }

    /// Id de la ligne sélectionnée
    pub fn selected_id(&self) -> Option<i64> {
        let resource = self.current_resource()?;
        match resource {
            Resource::Stats => None,
            Resource::Users => self.selected_in(resource, self.lists.users.items()).map(Record::id),
            Resource::Transactions => self
                .selected_in(resource, self.lists.transactions.items())
                .map(Record::id),
            Resource::Withdrawals => self
                .selected_in(resource, self.lists.withdrawals.items())
                .map(Record::id),
            Resource::Kyc => self.selected_in(resource, self.lists.kyc.items()).map(Record::id),
            Resource::Payments => self
                .selected_in(resource, self.lists.payments.items())
                .map(Record::id),
            Resource::Plans => self.selected_in(resource, self.lists.plans.items()).map(Record::id),
            Resource::Tasks => self.selected_in(resource, self.lists.tasks.items()).map(Record::id),
            Resource::Notifications => self
                .selected_in(resource, self.lists.notifications.items())
                .map(Record::id),
            Resource::Settings => self
                .selected_in(resource, self.lists.settings.items())
                .map(Record::id),
        }
    }

    /// Résumé client du dashboard
    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::compute(
            self.lists.users.items(),
            self.lists.transactions.items(),
            self.lists.withdrawals.items(),
            self.lists.kyc.items(),
        )
    }

    // ========================================================================
    // Actions sur la sélection
    // ========================================================================

    /// Action "approuver" sur la ligne sélectionnée
    pub fn approve_action(&self) -> Option<Action> {
        let id = self.selected_id()?;
        match self.current_resource()? {
            Resource::Withdrawals => Some(Action::ApproveWithdrawal(id)),
            Resource::Kyc => Some(Action::ApproveKyc(id)),
            Resource::Payments => Some(Action::ApprovePayment(id)),
            _ => None,
        }
    }

    /// Action "rejeter" ; pour le KYC, ouvre la saisie du motif
    pub fn reject_action(&mut self) -> Option<Action> {
        let id = self.selected_id()?;
        match self.current_resource()? {
            Resource::Withdrawals => Some(Action::RejectWithdrawal(id)),
            Resource::Payments => Some(Action::RejectPayment(id)),
            Resource::Kyc => {
                self.start_input(InputPurpose::RejectReason(id));
                None
            }
            _ => None,
        }
    }

    /// Bloque ou débloque l'utilisateur sélectionné
    pub fn block_toggle_action(&self) -> Option<Action> {
        if self.current_resource()? != Resource::Users {
            return None;
        }
        let id = self.selected_id()?;
        let user = self.lists.users.get(id)?;
        Some(if user.is_blocked() {
            Action::UnblockUser(id)
        } else {
            Action::BlockUser(id)
        })
    }

    pub fn delete_action(&self) -> Option<Action> {
        let id = self.selected_id()?;
        match self.current_resource()? {
            Resource::Plans => Some(Action::DeletePlan(id)),
            Resource::Tasks => Some(Action::DeleteTask(id)),
            _ => None,
        }
    }

    pub fn mark_read_action(&self) -> Option<Action> {
        if self.current_resource()? != Resource::Notifications {
            return None;
        }
        let id = self.selected_id()?;
        let notification = self.lists.notifications.get(id)?;
        (!notification.read).then_some(Action::MarkNotificationRead(id))
    }

    /// Ouvre la saisie de création adaptée à l'onglet
    pub fn start_create(&mut self) {
        let purpose = match self.current_resource() {
            Some(Resource::Plans) => InputPurpose::NewPlan,
            Some(Resource::Tasks) => InputPurpose::NewTask,
            Some(Resource::Notifications) => InputPurpose::NewNotification,
            _ => return,
        };
        self.start_input(purpose);
    }

    /// Ouvre la saisie de la nouvelle valeur du paramètre sélectionné
    pub fn start_edit_setting(&mut self) {
        if self.current_resource() != Some(Resource::Settings) {
            return;
        }
        let key = self
            .selected_id()
            .and_then(|id| self.lists.settings.get(id))
            .map(|s| s.key.clone());
        if let Some(key) = key {
            self.start_input(InputPurpose::SettingValue(key));
        }
    }

    // ========================================================================
    // Confirmations (two-step)
    // ========================================================================

    /// Soumet une action ; retourne Some(action) si elle doit partir maintenant
    ///
    /// CONCEPT : Two-step confirmation
    /// - Action sensible : première pression = mise en attente
    /// - Seconde pression sur la même action = envoi
    /// - Toute autre action remplace l'attente
    pub fn request_action(&mut self, action: Action) -> Option<Action> {
        self.confirm_quit = false;
        if !action.needs_confirmation() {
            self.pending_action = None;
            return Some(action);
        }

        if self.pending_action.as_ref() == Some(&action) {
            info!(action = %action.describe(), "User confirmed action");
            self.pending_action = None;
            Some(action)
        } else {
            info!(action = %action.describe(), "Awaiting confirmation");
            self.pending_action = Some(action);
            None
        }
    }

    pub fn request_quit(&mut self) {
        self.pending_action = None;
        self.confirm_quit = true;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    pub fn cancel_confirmations(&mut self) {
        self.confirm_quit = false;
        self.pending_action = None;
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    pub fn start_input(&mut self, purpose: InputPurpose) {
        self.cancel_confirmations();
        self.input_buffer = match &purpose {
            InputPurpose::Search => self.filter().search,
            _ => String::new(),
        };
        self.input = Some(purpose);
    }

    pub fn cancel_input(&mut self) {
        self.input = None;
        self.input_buffer.clear();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.input.is_some()
    }

    pub fn input_prompt(&self) -> String {
        self.input.as_ref().map(InputPurpose::prompt).unwrap_or_default()
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    /// Valide la saisie et la convertit selon son objet
    pub fn submit_input(&mut self) -> Submitted {
        let purpose = match self.input.take() {
            Some(purpose) => purpose,
            None => return Submitted::Nothing,
        };
        let value = std::mem::take(&mut self.input_buffer);
        let trimmed = value.trim();

        match purpose {
            InputPurpose::Search => {
                let search = trimmed.to_string();
                self.update_filter(|f| f.search = search);
                Submitted::Nothing
            }
            InputPurpose::RejectReason(id) => {
                let reason = if trimmed.is_empty() {
                    "Rejected by administrator".to_string()
                } else {
                    trimmed.to_string()
                };
                Submitted::Action(Action::RejectKyc { id, reason })
            }
            InputPurpose::NewPlan => self.parsed(NewPlan::parse(trimmed).map(Action::CreatePlan)),
            InputPurpose::NewTask => self.parsed(NewTask::parse(trimmed).map(Action::CreateTask)),
            InputPurpose::NewNotification => {
                self.parsed(NewNotification::parse(trimmed).map(Action::SendNotification))
            }
            InputPurpose::SettingValue(key) => Submitted::Action(Action::UpdateSetting {
                key,
                value: trimmed.to_string(),
            }),
            InputPurpose::Token if trimmed.is_empty() => Submitted::Nothing,
            InputPurpose::Token => Submitted::Token(trimmed.to_string()),
        }
    }

    fn parsed(&mut self, action: Option<Action>) -> Submitted {
        match action {
            Some(action) => Submitted::Action(action),
            None => {
                self.show_error("Invalid input, nothing was sent".to_string());
                Submitted::Nothing
            }
        }
    }
}

/// Valeurs de type distinctes, dans l'ordre de première apparition
fn distinct_kinds<T: Record>(items: &[T]) -> Vec<String> {
    let mut kinds: Vec<String> = Vec::new();
    for kind in items.iter().filter_map(T::kind_key) {
        if !kind.is_empty() && !kinds.iter().any(|k| k == kind) {
            kinds.push(kind.to_string());
        }
    }
    kinds
}

impl Default for App {
    fn default() -> Self {
        Self::new(15, 0)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Withdrawal, User};
    use crate::mutation::Updated;
    use crate::store::Loaded;

    fn load_withdrawals(app: &mut App) {
        let items: Vec<Withdrawal> = serde_json::from_str(
            r#"[{"id": 1, "amount": 10, "method": "bank", "status": "pending"},
                {"id": 2, "amount": 20, "method": "usdt", "status": "pending"},
                {"id": 3, "amount": 30, "method": "bank", "status": "approved"}]"#,
        )
        .unwrap();
        let cmd = app.fetch(Resource::Withdrawals);
        let generation = match cmd {
            AppCommand::Fetch { generation, .. } => generation,
            _ => unreachable!(),
        };
        app.apply_result(AppResult::Fetched {
            generation,
            loaded: Loaded::Withdrawals(items),
        });
    }

    fn go_to(app: &mut App, resource: Resource) {
        while app.current_screen != Screen::List(resource) {
            app.next_tab();
        }
    }

    #[test]
    fn test_app_creation() {
        let app = App::default();
        assert!(app.is_running());
        assert!(app.is_on_dashboard());
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_tabs_cycle() {
        let mut app = App::default();
        app.previous_tab();
        assert_eq!(app.current_screen, Screen::List(Resource::Settings));
        app.next_tab();
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_first_visit_fetches() {
        let mut app = App::default();
        let cmd = app.next_tab();
        assert!(matches!(
            cmd,
            Some(AppCommand::Fetch { resource: Resource::Users, .. })
        ));
    }

    #[test]
    fn test_two_step_approve() {
        let mut app = App::default();
        load_withdrawals(&mut app);
        go_to(&mut app, Resource::Withdrawals);
        app.navigate_down();

        let action = app.approve_action().unwrap();
        assert_eq!(action, Action::ApproveWithdrawal(2));

        // Première pression : mise en attente
        assert!(app.request_action(action.clone()).is_none());
        // Seconde pression : envoi
        assert_eq!(app.request_action(action), Some(Action::ApproveWithdrawal(2)));
        assert!(app.pending_action.is_none());
    }

    #[test]
    fn test_confirmed_mutation_then_failure() {
        let mut app = App::default();
        load_withdrawals(&mut app);

        app.apply_result(AppResult::Mutated {
            action: Action::ApproveWithdrawal(2),
            updated: Updated::Nothing,
        });
        assert_eq!(app.lists.withdrawals.get(2).unwrap().status, WithdrawalStatus::Approved);

        let before = app.lists.withdrawals.items().to_vec();
        app.apply_result(AppResult::MutationFailed {
            action: Action::RejectWithdrawal(1),
            message: "Not allowed".to_string(),
        });
        assert_eq!(app.lists.withdrawals.items(), before.as_slice());
        assert_eq!(
            app.banner,
            Some(Banner { kind: BannerKind::Error, text: "Not allowed".to_string() })
        );
    }

    #[test]
    fn test_filter_changes_selection() {
        let mut app = App::default();
        load_withdrawals(&mut app);
        go_to(&mut app, Resource::Withdrawals);

        // Statut : pending → la ligne 0 est le retrait #1
        app.cycle_status_filter();
        assert_eq!(app.filter().status.as_deref(), Some("pending"));
        assert_eq!(app.current_page().len(), 2);

        // Type libre : valeurs tirées de la liste (bank, usdt)
        assert_eq!(app.kind_keys(), vec!["bank".to_string(), "usdt".to_string()]);
        app.cycle_kind_filter();
        app.cycle_kind_filter();
        assert_eq!(app.selected_id(), Some(2));
    }

    #[test]
    fn test_search_input() {
        let mut app = App::default();
        load_withdrawals(&mut app);
        go_to(&mut app, Resource::Withdrawals);

        app.start_input(InputPurpose::Search);
        for c in "USDT".chars() {
            app.append_char(c);
        }
        assert_eq!(app.submit_input(), Submitted::Nothing);
        assert_eq!(app.current_page().len(), 1);
        assert_eq!(app.selected_id(), Some(2));
    }

    #[test]
    fn test_reject_kyc_asks_reason() {
        let mut app = App::default();
        let docs = serde_json::from_str(r#"[{"id": 7, "status": "pending"}]"#).unwrap();
        let generation = match app.fetch(Resource::Kyc) {
            AppCommand::Fetch { generation, .. } => generation,
            _ => unreachable!(),
        };
        app.apply_result(AppResult::Fetched { generation, loaded: Loaded::Kyc(docs) });
        go_to(&mut app, Resource::Kyc);

        assert!(app.reject_action().is_none());
        assert_eq!(app.input, Some(InputPurpose::RejectReason(7)));
        app.append_char('x');
        assert_eq!(
            app.submit_input(),
            Submitted::Action(Action::RejectKyc { id: 7, reason: "x".to_string() })
        );
    }

    #[test]
    fn test_block_toggle() {
        let mut app = App::default();
        let users: Vec<User> =
            serde_json::from_str(r#"[{"id": 1, "status": "blocked"}]"#).unwrap();
        let generation = match app.fetch(Resource::Users) {
            AppCommand::Fetch { generation, .. } => generation,
            _ => unreachable!(),
        };
        app.apply_result(AppResult::Fetched { generation, loaded: Loaded::Users(users) });
        go_to(&mut app, Resource::Users);

        assert_eq!(app.block_toggle_action(), Some(Action::UnblockUser(1)));
    }

    #[test]
    fn test_invalid_create_input() {
        let mut app = App::default();
        go_to(&mut app, Resource::Plans);
        app.start_create();
        assert_eq!(app.input, Some(InputPurpose::NewPlan));
        app.append_char('?');
        assert_eq!(app.submit_input(), Submitted::Nothing);
        assert!(matches!(app.banner, Some(Banner { kind: BannerKind::Error, .. })));
    }

    #[test]
    fn test_tick_refreshes_unread() {
        let mut app = App::new(10, 3);
        assert!(app.tick().is_none());
        assert!(app.tick().is_none());
        assert!(matches!(app.tick(), Some(AppCommand::RefreshUnread)));

        app.apply_result(AppResult::UnreadCount(4));
        assert_eq!(app.unread_count, 4);
    }

    #[test]
    fn test_mark_read_refreshes_badge() {
        let mut app = App::default();
        app.apply_result(AppResult::UnreadCount(2));

        let commands = app.apply_result(AppResult::Mutated {
            action: Action::MarkNotificationRead(7),
            updated: crate::mutation::Updated::Nothing,
        });
        assert_eq!(app.unread_count, 1);
        assert!(commands.iter().any(|c| matches!(c, AppCommand::RefreshUnread)));
    }

    #[test]
    fn test_token_save_failure_stays_visible() {
        let mut app = App::default();
        let commands = app.token_changed("fresh".to_string(), Err(anyhow::anyhow!("read-only")));

        let banner = app.banner.clone().unwrap();
        assert_eq!(banner.kind, BannerKind::Error);
        assert!(banner.text.contains("read-only"));
        assert!(matches!(commands.first(), Some(AppCommand::SetToken(Some(t))) if t == "fresh"));
        assert!(commands.iter().any(|c| matches!(c, AppCommand::RefreshUnread)));

        app.token_changed("fresh".to_string(), Ok(()));
        assert_eq!(app.banner.unwrap().kind, BannerKind::Info);
    }
}
