// ============================================================================
// Background Worker
// ============================================================================
// Thread séparé qui exécute les appels API sans bloquer l'interface
//
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des AppCommand au worker (command_tx)
// - Le worker exécute l'appel async et renvoie un AppResult (result_tx)
// - Communication via mpsc channels (multi-producer, single-consumer)
//
// Les commandes sont traitées une par une, dans l'ordre d'arrivée.
// ============================================================================

use std::sync::{mpsc, Arc, Mutex};

use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::app::App;
use crate::mutation::{Action, Updated};
use crate::store::{Generation, Loaded, Resource};

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Charger une ressource ; la génération est renvoyée avec la réponse
    Fetch {
        resource: Resource,
        generation: Generation,
    },

    /// Exécuter une action d'administration
    Execute { action: Action },

    /// Rafraîchir le compteur de notifications non lues
    RefreshUnread,

    /// Remplacer le token bearer du client
    SetToken(Option<String>),
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
pub enum AppResult {
    /// Ressource chargée
    Fetched {
        generation: Generation,
        loaded: Loaded,
    },

    /// Échec du chargement d'une ressource
    FetchFailed {
        resource: Resource,
        generation: Generation,
        message: String,
        unauthorized: bool,
    },

    /// Mutation confirmée par le serveur
    Mutated { action: Action, updated: Updated },

    /// Mutation refusée ou échouée : l'état local ne doit pas changer
    MutationFailed { action: Action, message: String },

    /// Nouveau compteur de notifications non lues
    UnreadCount(u64),
}

/// Exécute une commande et construit le résultat à renvoyer à l'UI
///
/// SetToken ne produit pas de résultat.
pub async fn process(client: &mut ApiClient, command: AppCommand) -> Option<AppResult> {
    match command {
        AppCommand::Fetch { resource, generation } => match client.fetch(resource).await {
            Ok(loaded) => Some(AppResult::Fetched { generation, loaded }),
            Err(e) => {
                error!(resource = resource.label(), error = %e, "Failed to fetch resource");
                Some(AppResult::FetchFailed {
                    resource,
                    generation,
                    message: e.display_message(),
                    unauthorized: e.is_unauthorized(),
                })
            }
        },

        AppCommand::Execute { action } => match client.execute(&action).await {
            Ok(updated) => Some(AppResult::Mutated { action, updated }),
            Err(e) => {
                error!(action = %action.describe(), error = %e, "Mutation failed");
                Some(AppResult::MutationFailed {
                    action,
                    message: e.display_message(),
                })
            }
        },

        AppCommand::RefreshUnread => match client.unread_count().await {
            Ok(count) => Some(AppResult::UnreadCount(count)),
            Err(e) => {
                // Un compteur en retard n'est pas bloquant : pas de bandeau
                warn!(error = %e, "Failed to refresh unread count");
                None
            }
        },

        AppCommand::SetToken(token) => {
            info!(authenticated = token.is_some(), "Worker token updated");
            client.set_token(token);
            None
        }
    }
}

/// Lance le worker thread
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async propre à ce thread
/// - block_on() bloque le worker, jamais l'UI
///
/// # Arguments
/// * `command_rx` - Receiver des commandes
/// * `result_tx` - Sender des résultats
/// * `client` - Client API (déplacé dans le thread)
/// * `app` - État partagé, pour l'indicateur de chargement
pub fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    mut client: ApiClient,
    app: Arc<Mutex<App>>,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("lazyadmin-worker".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!(error = %e, "Failed to create tokio runtime, worker exiting");
                    return;
                }
            };

            // Boucle de traitement : se termine quand l'UI ferme le channel
            while let Ok(command) = command_rx.recv() {
                info!(?command, "Worker received command");

                let loading = loading_message(&command);
                if let Some(message) = &loading {
                    if let Ok(mut app_lock) = app.lock() {
                        app_lock.start_loading(Some(message.clone()));
                    }
                }

                let result = runtime.block_on(process(&mut client, command));

                if loading.is_some() {
                    if let Ok(mut app_lock) = app.lock() {
                        app_lock.stop_loading();
                    }
                }

                if let Some(result) = result {
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            }

            info!("Worker thread exiting (channel closed)");
        })
}

/// Message de chargement affiché pendant l'exécution d'une commande
fn loading_message(command: &AppCommand) -> Option<String> {
    match command {
        AppCommand::Fetch { resource, .. } => Some(format!("Loading {}...", resource.label())),
        AppCommand::Execute { action } => Some(format!("Sending: {}...", action.describe())),
        AppCommand::RefreshUnread | AppCommand::SetToken(_) => None,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
