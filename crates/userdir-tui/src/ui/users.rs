use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use userdir_core::QueryStatus;

use crate::app::App;
use crate::ui::styles;
use crate::utils::truncate_string;

/// Width of the name column in the user list
const NAME_COLUMN_WIDTH: usize = 24;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match app.cache.status() {
        QueryStatus::Idle | QueryStatus::Loading => {
            render_notice(frame, area, "Loading users...", styles::muted_style());
        }
        QueryStatus::Failed(_) => {
            render_notice(frame, area, "Failed to fetch users.", styles::error_style());
        }
        QueryStatus::Ready => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(area);

            render_user_list(frame, app, chunks[0]);
            render_user_detail(frame, app, chunks[1]);
        }
    }
}

fn render_notice(frame: &mut Frame, area: Rect, text: &str, style: ratatui::style::Style) {
    let block = Block::default()
        .title(" Users List ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(Line::from(Span::styled(format!(" {}", text), style))).block(block);
    frame.render_widget(paragraph, area);
}

fn render_user_list(frame: &mut Frame, app: &App, area: Rect) {
    let users = app.users();

    let items: Vec<ListItem> = users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let line = Line::from(format!(
                "{:<width$} {}",
                truncate_string(&user.name, NAME_COLUMN_WIDTH),
                user.email,
                width = NAME_COLUMN_WIDTH
            ));

            let style = if i == app.selection {
                styles::selected_style()
            } else if user.id.is_placeholder() {
                styles::pending_style()
            } else {
                styles::list_item_style()
            };

            ListItem::new(line).style(style)
        })
        .collect();

    let block = Block::default()
        .title(format!(" Users List ({}) ", users.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    if !users.is_empty() {
        state.select(Some(app.selection));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_user_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Details ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let lines = match app.selected_user() {
        Some(user) => {
            let sync_line = if user.id.is_placeholder() {
                Span::styled("Not yet saved (temporary id)", styles::pending_style())
            } else {
                Span::styled("Saved", styles::success_style())
            };

            vec![
                Line::from(vec![
                    Span::styled("Name:  ", styles::highlight_style()),
                    Span::raw(user.name.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Email: ", styles::highlight_style()),
                    Span::raw(user.email.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Id:    ", styles::highlight_style()),
                    Span::raw(user.id.to_string()),
                ]),
                Line::from(""),
                Line::from(sync_line),
                Line::from(""),
                Line::from(Span::styled(
                    "[e]dit  [d]elete  [a]dd",
                    styles::muted_style(),
                )),
            ]
        }
        None => vec![
            Line::from(Span::styled("No users", styles::muted_style())),
            Line::from(""),
            Line::from(Span::styled("Press [a] to add one", styles::muted_style())),
        ],
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
