// ============================================================================
// LazyAdmin - Console d'administration de la plateforme d'investissement
// ============================================================================
// Programme TUI : onglets par ressource, dashboard, actions d'administration
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Worker thread : les appels API ne bloquent jamais l'interface
// 4. Arc<Mutex<App>> : état partagé entre UI et worker
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazyadmin::api::ApiClient;
use lazyadmin::app::{App, InputPurpose, Submitted};
use lazyadmin::config::Config;
use lazyadmin::mutation::Action;
use lazyadmin::session::Session;
use lazyadmin::ui::events::{ticks_for_secs, EventHandler};
use lazyadmin::ui::render;
use lazyadmin::worker::{spawn_background_worker, AppCommand, AppResult};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans ./logs/lazyadmin.log
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f logs/lazyadmin.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=lazyadmin=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazyadmin.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // UI et worker loguent en parallèle
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour lazyadmin, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazyadmin=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyAdmin starting up");

    // Configuration et session AVANT le mode TUI : les erreurs restent lisibles
    let config = Config::load().context("Impossible de charger la configuration")?;
    let mut session = Session::start(&config).context("Impossible d'ouvrir la session")?;
    let client = ApiClient::new(&session, Duration::from_secs(config.request_timeout_secs))
        .context("Impossible de créer le client HTTP")?;

    let unread_every_ticks = ticks_for_secs(config.unread_refresh_secs);
    let app = Arc::new(Mutex::new(App::new(config.per_page, unread_every_ticks)));

    // CONCEPT RUST : mpsc channels
    // - command_tx/rx : l'UI envoie des commandes au worker
    // - result_tx/rx : le worker renvoie les résultats à l'UI
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, client, app.clone())
        .context("Impossible de lancer le worker")?;

    {
        let mut app_lock = lock(&app)?;
        for command in app_lock.initial_fetches() {
            send(&command_tx, command);
        }
        if !session.is_authenticated() {
            app_lock.show_error(format!(
                "No admin token: set ${} or press [T]",
                config.token_env
            ));
        }
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx, &mut session);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Verrouille l'état partagé
///
/// Un Mutex empoisonné (panic dans le worker) termine l'application.
fn lock(app: &Arc<Mutex<App>>) -> Result<MutexGuard<'_, App>> {
    app.lock().map_err(|_| anyhow!("État de l'application corrompu (mutex empoisonné)"))
}

/// Envoie une commande au worker
fn send(command_tx: &mpsc::Sender<AppCommand>, command: AppCommand) {
    if command_tx.send(command).is_err() {
        error!("Worker channel closed, command dropped");
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Appliquer les résultats du worker
//   1. Dessiner l'interface (render)
//   2. Traiter l'événement clavier ou le tick (input / update)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
    session: &mut Session,
) -> Result<()> {
    loop {
        if !lock(&app)?.is_running() {
            break;
        }

        // ========================================
        // 0. RÉSULTATS : Traite les résultats du worker
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        // - On vide le channel à chaque tour
        // - Les réponses obsolètes sont filtrées par App (génération)
        loop {
            match result_rx.try_recv() {
                Ok(result) => {
                    let followups = lock(&app)?.apply_result(result);
                    for command in followups {
                        send(&command_tx, command);
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // ========================================
        // 1. RENDER : Dessine l'interface
        // ========================================
        {
            let app_lock = lock(&app)?;
            terminal.draw(|frame| render(frame, &app_lock))?;
        }

        // ========================================
        // 2. INPUT / UPDATE
        // ========================================
        match events.next() {
            Ok(event) => {
                let mut app_lock = lock(&app)?;
                handle_event(&mut app_lock, event, &command_tx, session);
            }
            Err(e) => warn!(error = %e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Soumet une action : envoyée tout de suite ou mise en attente de confirmation
fn submit_action(app: &mut App, action: Option<Action>, command_tx: &mpsc::Sender<AppCommand>) {
    match action {
        Some(action) => {
            if let Some(action) = app.request_action(action) {
                info!(action = %action.describe(), "Sending action");
                send(command_tx, AppCommand::Execute { action });
            }
        }
        None => app.cancel_confirmations(),
    }
}

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Le mode input capture toutes les touches en premier
/// - Les actions dépendent de l'onglet courant
fn handle_event(
    app: &mut App,
    event: lazyadmin::ui::Event,
    command_tx: &mpsc::Sender<AppCommand>,
    session: &mut Session,
) {
    use lazyadmin::ui::events::*;

    match event {
        // ========================================
        // Input Mode : Gestion de la saisie
        // ========================================
        Event::Key(_) if app.is_in_input_mode() && is_escape_event(&event) => {
            info!("User cancelled input");
            app.cancel_input();
        }

        Event::Key(_) if app.is_in_input_mode() && is_enter_event(&event) => {
            match app.submit_input() {
                Submitted::Nothing => {}
                Submitted::Action(action) => submit_action(app, Some(action), command_tx),
                Submitted::Token(token) => {
                    let saved = session.save_token(token.clone());
                    for command in app.token_changed(token, saved) {
                        send(command_tx, command);
                    }
                }
            }
        }

        Event::Key(_) if app.is_in_input_mode() && is_backspace_event(&event) => {
            app.backspace();
        }

        Event::Key(_) if app.is_in_input_mode() => {
            if let Some(c) = get_char_from_event(&event).filter(|_| is_text_char_event(&event)) {
                app.append_char(c);
            }
        }

        // ========================================
        // Commandes globales
        // ========================================
        Event::Key(_) if is_quit_event(&event) => {
            // Two-step : première pression = confirmation, seconde = quit
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_escape_event(&event) => {
            app.cancel_confirmations();
            app.dismiss_banner();
        }

        Event::Key(_) if is_next_tab_event(&event) => {
            if let Some(command) = app.next_tab() {
                send(command_tx, command);
            }
        }

        Event::Key(_) if is_previous_tab_event(&event) => {
            if let Some(command) = app.previous_tab() {
                send(command_tx, command);
            }
        }

        Event::Key(_) if is_up_event(&event) => {
            app.cancel_confirmations();
            app.navigate_up();
        }

        Event::Key(_) if is_down_event(&event) => {
            app.cancel_confirmations();
            app.navigate_down();
        }

        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_confirmations();
            info!(screen = app.current_screen.label(), "User requested refresh");
            for command in app.refresh_current() {
                send(command_tx, command);
            }
        }

        Event::Key(_) if is_token_event(&event) => {
            app.start_input(InputPurpose::Token);
        }

        Event::Key(_) if is_logout_event(&event) => {
            app.cancel_confirmations();
            match session.end() {
                Ok(()) => app.show_info("Logged out, press [T] to set a token".to_string()),
                Err(e) => {
                    error!(error = ?e, "Failed to end session");
                    app.show_error(format!("Logout failed: {}", e));
                }
            }
            send(command_tx, AppCommand::SetToken(None));
        }

        // ========================================
        // Dashboard
        // ========================================
        Event::Key(_) if is_block_event(&event) && app.is_on_dashboard() => {
            app.cancel_confirmations();
            app.cycle_bucketing();
            debug!(bucketing = app.bucketing.label(), "User changed bucketing");
        }

        // ========================================
        // Actions sur la ligne sélectionnée
        // ========================================
        Event::Key(_) if is_approve_event(&event) => {
            let action = app.approve_action();
            submit_action(app, action, command_tx);
        }

        Event::Key(_) if is_reject_event(&event) => {
            let action = app.reject_action();
            if action.is_some() || !app.is_in_input_mode() {
                submit_action(app, action, command_tx);
            }
        }

        Event::Key(_) if is_block_event(&event) => {
            let action = app.block_toggle_action();
            submit_action(app, action, command_tx);
        }

        Event::Key(_) if is_delete_event(&event) => {
            let action = app.delete_action();
            submit_action(app, action, command_tx);
        }

        Event::Key(_) if is_mark_read_event(&event) => {
            let action = app.mark_read_action();
            submit_action(app, action, command_tx);
        }

        Event::Key(_) if is_create_event(&event) => app.start_create(),

        Event::Key(_) if is_edit_event(&event) => app.start_edit_setting(),

        // ========================================
        // Filtres et pagination
        // ========================================
        Event::Key(_) if is_search_event(&event) && !app.is_on_dashboard() => {
            app.start_input(InputPurpose::Search);
        }

        Event::Key(_) if is_status_filter_event(&event) => {
            app.cancel_confirmations();
            app.cycle_status_filter();
        }

        Event::Key(_) if is_type_filter_event(&event) => {
            app.cancel_confirmations();
            app.cycle_kind_filter();
        }

        Event::Key(_) if is_sort_event(&event) => {
            app.cancel_confirmations();
            app.cycle_sort();
        }

        Event::Key(_) if is_clear_filters_event(&event) => {
            app.cancel_confirmations();
            app.clear_filters();
        }

        Event::Key(_) if is_next_page_event(&event) => {
            app.cancel_confirmations();
            app.next_page();
        }

        Event::Key(_) if is_previous_page_event(&event) => {
            app.cancel_confirmations();
            app.previous_page();
        }

        Event::Key(_) => {
            // Toute autre touche : annule les confirmations si actives
            app.cancel_confirmations();
        }

        Event::Tick => {
            if let Some(command) = app.tick() {
                send(command_tx, command);
            }
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);

    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
