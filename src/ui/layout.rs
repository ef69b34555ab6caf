// ============================================================================
// Layout - Cadre commun à tous les écrans
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// ┌ header : onglets + badge des notifications non lues ┐
// │ bandeau : dernière erreur ou dernier succès          │
// │ contenu : dashboard ou tableau de l'onglet           │
// └ footer : raccourcis, confirmation ou ligne de saisie ┘
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Tabs : barre d'onglets avec sélection
// ============================================================================

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, BannerKind, Screen};
use crate::mutation::Action;
use crate::store::Resource;
use crate::ui::dashboard::{now_label, render_dashboard};
use crate::ui::table::render_table;

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Pattern matching sur app.current_screen
/// - Le compilateur garantit l'exhaustivité (tous les cas gérés)
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size(), app.banner.is_some());

    render_header(frame, app, chunks[0]);

    let content = if app.banner.is_some() {
        render_banner(frame, app, chunks[1]);
        chunks[2]
    } else {
        chunks[1]
    };

    match app.current_screen {
        Screen::Dashboard => render_dashboard(frame, app, content),
        Screen::List(resource) => render_table(frame, app, resource, content),
    }

    let footer = chunks[chunks.len() - 1];
    if app.is_in_input_mode() {
        render_input_footer(frame, app, footer);
    } else {
        render_footer(frame, app, footer);
    }
}

/// Crée le layout principal (header, [bandeau], contenu, footer)
fn create_layout(area: Rect, with_banner: bool) -> Vec<Rect> {
    let mut constraints = vec![Constraint::Length(3)]; // Header
    if with_banner {
        constraints.push(Constraint::Length(1)); // Bandeau
    }
    constraints.push(Constraint::Min(0)); // Contenu
    constraints.push(Constraint::Length(4)); // Footer

    Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : onglets
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = Screen::tabs();
    let selected = tabs.iter().position(|t| *t == app.current_screen).unwrap_or(0);

    let titles: Vec<Line> = tabs
        .iter()
        .map(|tab| match tab {
            Screen::List(Resource::Notifications) if app.unread_count > 0 => Line::from(vec![
                Span::raw(tab.label()),
                Span::styled(
                    format!(" ({})", app.unread_count),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
            ]),
            _ => Line::from(tab.label()),
        })
        .collect();

    let status = match (app.is_loading, &app.loading_message) {
        (true, Some(message)) => format!(" {} ", message),
        _ => format!(" {} ", now_label(Utc::now())),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" LazyAdmin ")
        .title_alignment(Alignment::Left)
        .title(Title::from(status).alignment(Alignment::Right));

    let widget = Tabs::new(titles)
        .block(block)
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");

    frame.render_widget(widget, area);
}

// ============================================================================
// Bandeau d'alerte
// ============================================================================

fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    let Some(banner) = &app.banner else {
        return;
    };

    let (prefix, style) = match banner.kind {
        BannerKind::Error => ("✗ ", Style::default().fg(Color::White).bg(Color::Red)),
        BannerKind::Info => ("✓ ", Style::default().fg(Color::Black).bg(Color::Green)),
    };

    let line = Line::from(vec![
        Span::styled(format!(" {}{}", prefix, banner.text), style.add_modifier(Modifier::BOLD)),
        Span::styled("  [Esc] dismiss", style),
    ]);

    frame.render_widget(Paragraph::new(line).style(style), area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn key(label: &str) -> Span<'_> {
    Span::styled(
        label,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )
}

/// Message de confirmation two-step ("appuyez à nouveau sur ...")
fn confirmation_line(key_label: &str, what: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            "⚠  Press ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("[{}]", key_label),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
        Span::styled(
            format!(" again to {}, any other key to cancel ⚠", what),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Raccourcis propres à l'onglet
fn tab_shortcuts(app: &App) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut push = |k: &'static str, text: &'static str| {
        spans.push(key(k));
        spans.push(Span::raw(text));
    };

    match app.current_resource() {
        None => push("[b]", " Bucketing  "),
        Some(Resource::Withdrawals) | Some(Resource::Kyc) | Some(Resource::Payments) => {
            push("[a]", " Approve  ");
            push("[x]", " Reject  ");
        }
        Some(Resource::Users) => push("[b]", " Block/unblock  "),
        Some(Resource::Plans) | Some(Resource::Tasks) => {
            push("[n]", " New  ");
            push("[d]", " Delete  ");
        }
        Some(Resource::Notifications) => {
            push("[n]", " Send  ");
            push("[m]", " Mark read  ");
        }
        Some(Resource::Settings) => push("[e]", " Edit  "),
        Some(Resource::Stats) | Some(Resource::Transactions) => {}
    }
    spans
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = if let Some(action) = &app.pending_action {
        let key_label = match action {
            Action::ApproveWithdrawal(_)
            | Action::ApproveKyc(_)
            | Action::ApprovePayment(_) => "a",
            Action::RejectWithdrawal(_)
            | Action::RejectPayment(_) => "x",
            Action::BlockUser(_) | Action::UnblockUser(_) => "b",
            Action::DeletePlan(_) | Action::DeleteTask(_) => "d",
            _ => "Enter",
        };
        vec![confirmation_line(key_label, action.describe())]
    } else if app.is_awaiting_quit_confirmation() {
        vec![confirmation_line("q", "quit".to_string())]
    } else {
        let mut first = tab_shortcuts(app);
        if !app.is_on_dashboard() {
            first.extend([
                key("[s]"),
                Span::raw(" Status  "),
                key("[t]"),
                Span::raw(" Type  "),
                key("[/]"),
                Span::raw(" Search  "),
                key("[o]"),
                Span::raw(" Sort  "),
                key("[c]"),
                Span::raw(" Clear  "),
                key("[ ]"),
                Span::raw(" Page"),
            ]);
        }

        let second = Line::from(vec![
            key("[Tab]"),
            Span::raw(" Next tab  "),
            key("[↑↓ / j k]"),
            Span::raw(" Navigate  "),
            key("[r]"),
            Span::raw(" Refresh  "),
            key("[T]"),
            Span::raw(" Token  "),
            key("[L]"),
            Span::raw(" Logout  "),
            key("[q]"),
            Span::raw(" Quit"),
        ]);

        vec![Line::from(first), second]
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Input Mode : ligne de saisie
// ============================================================================

/// Dessine le footer en mode input avec la ligne de saisie
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let help_line = Line::from(vec![
        Span::styled(
            "[Enter]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Confirm  "),
        Span::styled(
            "[ESC]",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
