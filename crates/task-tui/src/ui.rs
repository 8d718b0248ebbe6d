//! Rendering for the login, register and task routes

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::{App, Focus, Route};
use crate::notify::Level;

pub fn draw(frame: &mut Frame, app: &App, route: Route) {
    match route {
        Route::Login => draw_auth(frame, app, "Log in", "Enter: log in | Tab: switch field | Ctrl-R: register | Esc: quit"),
        Route::Register => draw_auth(frame, app, "Register", "Enter: create account | Tab: switch field | Ctrl-R: back to login | Esc: quit"),
        Route::Tasks => draw_tasks(frame, app),
    }
    draw_notice(frame, app);
}

fn draw_auth(frame: &mut Frame, app: &App, title: &str, help: &str) {
    let area = centered_rect(frame.area(), 50, 11);

    let outer = Block::default().borders(Borders::ALL).title(title.to_string());
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let email = Paragraph::new(app.auth_form.email.as_str()).block(
        field_block("Email", !app.auth_form.password_focused),
    );
    frame.render_widget(email, rows[0]);

    let masked = "\u{2022}".repeat(app.auth_form.password.chars().count());
    let password =
        Paragraph::new(masked).block(field_block("Password", app.auth_form.password_focused));
    frame.render_widget(password, rows[1]);

    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, rows[2]);
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title.to_string())
}

fn draw_tasks(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new("Task Manager")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, rows[0]);

    let input = Paragraph::new(app.input.as_str()).block(field_block(
        "Add a new task",
        app.focus == Focus::Input && app.edit.is_none(),
    ));
    frame.render_widget(input, rows[1]);

    draw_task_list(frame, app, rows[2]);
    draw_footer(frame, app, rows[3]);
}

fn draw_task_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = field_block("Tasks", app.focus == Focus::List || app.edit.is_some());

    if app.tasks.is_loading() {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    if let Some(error) = app.tasks.error() {
        let error = Paragraph::new(error.to_string())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(error, area);
        return;
    }

    if app.tasks.is_empty() {
        let empty = Paragraph::new("No tasks yet. Add a task to get started!")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .tasks
        .tasks()
        .iter()
        .map(|task| {
            if let Some(edit) = app.edit.as_ref().filter(|edit| edit.id == task.id) {
                return ListItem::new(Line::from(vec![
                    Span::raw("edit: "),
                    Span::styled(
                        format!("{}\u{258f}", edit.buffer),
                        Style::default().fg(Color::Cyan),
                    ),
                ]));
            }

            let checkbox = if task.is_done { "[x] " } else { "[ ] " };
            let style = if task.is_done {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw(checkbox),
                Span::styled(task.title.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let summary = format!(
        "{} of {} tasks completed",
        app.tasks.done_count(),
        app.tasks.len()
    );
    let help = "Tab: focus | Space: toggle | e: edit | d: delete | r: refresh | Ctrl-L: log out | q: quit";

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(summary.len() as u16 + 2), Constraint::Min(1)])
        .split(area);

    frame.render_widget(
        Paragraph::new(summary).style(Style::default().fg(Color::DarkGray)),
        columns[0],
    );
    frame.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Right),
        columns[1],
    );
}

/// Bottom-line toast for the most recent notice
fn draw_notice(frame: &mut Frame, app: &App) {
    let Some(notice) = app.notices.latest() else {
        return;
    };
    let style = match notice.level {
        Level::Info => Style::default().fg(Color::Green),
        Level::Error => Style::default().fg(Color::Red),
    };

    let area = frame.area();
    if area.height == 0 {
        return;
    }
    let line = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
    frame.render_widget(
        Paragraph::new(notice.text.as_str())
            .style(style)
            .alignment(Alignment::Center),
        line,
    );
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
