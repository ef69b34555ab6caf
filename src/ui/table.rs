// ============================================================================
// Table - Rendu des listes d'administration
// ============================================================================
// Un tableau par ressource : la liste chargée passe par les filtres de
// l'onglet (filter::apply), puis seule la page courante est affichée.
//
// CONCEPTS RUST :
// 1. Fonction générique : render_rows fonctionne pour tout T: Record
// 2. Pointeurs de fonction : chaque ressource fournit ses colonnes
//
// CONCEPTS RATATUI :
// 1. Table widget : lignes + en-tête + largeurs de colonnes
// 2. TableState : ligne sélectionnée (render_stateful_widget)
// ============================================================================

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::models::{
    KycDocument, KycStatus, Notification, Payment, PaymentStatus, Plan, Record, Setting, Task,
    TaskStatus, Transaction, TransactionStatus, User, UserStatus, Withdrawal, WithdrawalStatus,
};
use crate::store::{Resource, Tracked};

/// Colonnes d'une ressource
struct Columns<T> {
    headers: &'static [&'static str],
    widths: &'static [Constraint],
    cells: fn(&T) -> Vec<String>,
    style: fn(&T) -> Style,
}

/// Dessine le tableau de la ressource demandée
pub fn render_table(frame: &mut Frame, app: &App, resource: Resource, area: Rect) {
    let lists = &app.lists;
    match resource {
        Resource::Stats => {}
        Resource::Users => render_rows(frame, app, area, resource, &lists.users, &USERS),
        Resource::Transactions => {
            render_rows(frame, app, area, resource, &lists.transactions, &TRANSACTIONS)
        }
        Resource::Withdrawals => {
            render_rows(frame, app, area, resource, &lists.withdrawals, &WITHDRAWALS)
        }
        Resource::Kyc => render_rows(frame, app, area, resource, &lists.kyc, &KYC),
        Resource::Payments => render_rows(frame, app, area, resource, &lists.payments, &PAYMENTS),
        Resource::Plans => render_rows(frame, app, area, resource, &lists.plans, &PLANS),
        Resource::Tasks => render_rows(frame, app, area, resource, &lists.tasks, &TASKS),
        Resource::Notifications => {
            render_rows(frame, app, area, resource, &lists.notifications, &NOTIFICATIONS)
        }
        Resource::Settings => render_rows(frame, app, area, resource, &lists.settings, &SETTINGS),
    }
}

/// Dessine la page courante d'une liste filtrée
fn render_rows<T: Record>(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    resource: Resource,
    list: &Tracked<Vec<T>>,
    columns: &Columns<T>,
) {
    let (rows, page) = app.view(resource, list.items());
    let state = app.filters.get(&resource).cloned().unwrap_or_default();

    let mut title = format!(
        " {} - page {}/{} ",
        resource.label(),
        page.index + 1,
        page.count
    );
    if !state.is_identity() {
        title.push_str(&format!(
            "[status: {} | type: {} | search: {} | sort: {}] ",
            state.status.as_deref().unwrap_or("all"),
            state.kind.as_deref().unwrap_or("all"),
            if state.search.is_empty() { "-" } else { state.search.as_str() },
            state.sort.label(),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    if rows.is_empty() {
        let message = if list.is_loading() {
            "Loading..."
        } else if list.items().is_empty() {
            "Nothing to show"
        } else {
            "No item matches the current filters"
        };
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ])
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(columns.headers.to_vec()).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let body: Vec<Row> = rows
        .iter()
        .map(|item| Row::new((columns.cells)(item)).style((columns.style)(item)))
        .collect();

    let table = Table::new(body, columns.widths.to_vec())
        .header(header)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol("▶ ");

    let mut table_state = TableState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(table, area, &mut table_state);
}

// ============================================================================
// Formatage des cellules
// ============================================================================

fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Couleur d'un statut de workflow (pending / approved / rejected)
fn workflow_style(pending: bool, approved: bool) -> Style {
    if pending {
        Style::default().fg(Color::Yellow)
    } else if approved {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    }
}

// ============================================================================
// Colonnes par ressource
// ============================================================================

const USERS: Columns<User> = Columns {
    headers: &["ID", "Name", "Email", "Balance", "Plan", "Status", "KYC", "Joined"],
    widths: &[
        Constraint::Length(6),
        Constraint::Min(14),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(17),
    ],
    cells: |u| {
        vec![
            u.id.to_string(),
            u.name.clone(),
            u.email.clone(),
            money(u.balance),
            u.plan_label().to_string(),
            u.status.to_string(),
            u.kyc_status.to_string(),
            date(u.created_at),
        ]
    },
    style: |u| match u.status {
        UserStatus::Blocked => Style::default().fg(Color::Red),
        UserStatus::Pending => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    },
};

const TRANSACTIONS: Columns<Transaction> = Columns {
    headers: &["ID", "User", "Type", "Amount", "Status", "Reference", "Date"],
    widths: &[
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(11),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Min(12),
        Constraint::Length(17),
    ],
    cells: |t| {
        vec![
            t.id.to_string(),
            t.user_id.to_string(),
            t.kind.to_string(),
            money(t.amount),
            t.status.to_string(),
            t.reference.clone(),
            date(t.created_at),
        ]
    },
    style: |t| match t.status {
        TransactionStatus::Completed => Style::default().fg(Color::Green),
        TransactionStatus::Pending => Style::default().fg(Color::Yellow),
        TransactionStatus::Failed | TransactionStatus::Cancelled => Style::default().fg(Color::Red),
        TransactionStatus::Unknown => Style::default(),
    },
};

const WITHDRAWALS: Columns<Withdrawal> = Columns {
    headers: &["ID", "User", "Amount", "Method", "Wallet", "Status", "Requested"],
    widths: &[
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Min(16),
        Constraint::Length(9),
        Constraint::Length(17),
    ],
    cells: |w| {
        vec![
            w.id.to_string(),
            w.user_id.to_string(),
            money(w.amount),
            w.method.clone(),
            w.wallet_address.clone(),
            w.status.to_string(),
            date(w.created_at),
        ]
    },
    style: |w| {
        workflow_style(
            w.status == WithdrawalStatus::Pending,
            w.status == WithdrawalStatus::Approved,
        )
    },
};

const KYC: Columns<KycDocument> = Columns {
    headers: &["ID", "User", "Document", "Status", "Reason", "Submitted"],
    widths: &[
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Length(9),
        Constraint::Min(16),
        Constraint::Length(17),
    ],
    cells: |d| {
        vec![
            d.id.to_string(),
            d.user_id.to_string(),
            d.document_type.clone(),
            d.status.to_string(),
            d.rejection_reason.clone().unwrap_or_default(),
            date(d.created_at),
        ]
    },
    style: |d| workflow_style(d.status == KycStatus::Pending, d.status == KycStatus::Approved),
};

const PAYMENTS: Columns<Payment> = Columns {
    headers: &["ID", "User", "Amount", "Method", "Reference", "Status", "Date"],
    widths: &[
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Min(12),
        Constraint::Length(9),
        Constraint::Length(17),
    ],
    cells: |p| {
        vec![
            p.id.to_string(),
            p.user_id.to_string(),
            money(p.amount),
            p.method.clone(),
            p.reference.clone(),
            p.status.to_string(),
            date(p.created_at),
        ]
    },
    style: |p| {
        workflow_style(
            p.status == PaymentStatus::Pending,
            p.status == PaymentStatus::Approved,
        )
    },
};

const PLANS: Columns<Plan> = Columns {
    headers: &["ID", "Name", "Min", "Max", "ROI", "Days", "Status"],
    widths: &[
        Constraint::Length(6),
        Constraint::Min(14),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(9),
    ],
    cells: |p| {
        vec![
            p.id.to_string(),
            p.name.clone(),
            money(p.min_amount),
            money(p.max_amount),
            format!("{:.2}%", p.roi_percent),
            p.duration_days.to_string(),
            p.status().to_string(),
        ]
    },
    style: |p| {
        if p.active {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        }
    },
};

const TASKS: Columns<Task> = Columns {
    headers: &["ID", "Title", "Reward", "Status", "Created"],
    widths: &[
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(17),
    ],
    cells: |t| {
        vec![
            t.id.to_string(),
            t.title.clone(),
            money(t.reward),
            t.status.to_string(),
            date(t.created_at),
        ]
    },
    style: |t| match t.status {
        TaskStatus::Inactive => Style::default().fg(Color::DarkGray),
        TaskStatus::Completed => Style::default().fg(Color::Green),
        _ => Style::default(),
    },
};

const NOTIFICATIONS: Columns<Notification> = Columns {
    headers: &["ID", "To", "Title", "Message", "Read", "Sent"],
    widths: &[
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(20),
        Constraint::Min(20),
        Constraint::Length(7),
        Constraint::Length(17),
    ],
    cells: |n| {
        vec![
            n.id.to_string(),
            n.user_id.map(|id| id.to_string()).unwrap_or_else(|| "all".to_string()),
            n.title.clone(),
            n.message.clone(),
            n.read_state().to_string(),
            date(n.created_at),
        ]
    },
    style: |n| {
        if n.read {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        }
    },
};

const SETTINGS: Columns<Setting> = Columns {
    headers: &["ID", "Key", "Value", "Updated"],
    widths: &[
        Constraint::Length(6),
        Constraint::Length(24),
        Constraint::Min(20),
        Constraint::Length(17),
    ],
    cells: |s| {
        vec![
            s.id.to_string(),
            s.key.clone(),
            s.value.clone(),
            date(s.updated_at),
        ]
    },
    style: |_| Style::default(),
};

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_cell_formatting() {
        assert_eq!(money(1234.5), "$1234.50");
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 0).unwrap();
        assert_eq!(date(at), "2026-10-19 08:05");
    }

    #[test]
    fn test_empty_table_renders_message() {
        let app = App::default();
        let backend = TestBackend::new(80, 10);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| render_table(frame, &app, Resource::Withdrawals, frame.size()))
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Nothing to show"));
    }
}
