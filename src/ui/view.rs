use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::auth::{PASSWORD_REQUIRED, USERNAME_REQUIRED};
use crate::filter::TaskFilter;
use crate::storage::KvStore;
use crate::task::TaskRecord;

use super::app::{AppState, LoginField, Screen, StatusKind, TaskMode};
use super::editor::TextInput;

const LOGIN_WIDTH: u16 = 44;
const LOGIN_HEIGHT: u16 = 12;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER: Color = Color::Rgb(92, 126, 166);

pub fn render<S: KvStore>(frame: &mut Frame, app: &AppState<S>) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    render_header(frame, app, chunks[0]);
    match app.screen() {
        Screen::Login => render_login(frame, app, chunks[1]),
        Screen::Tasks => render_tasks(frame, app, chunks[1]),
    }
    render_notification(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

fn render_header<S: KvStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let mut spans = vec![Span::styled(
        "Task Manager",
        Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD),
    )];
    if let Some(user) = app.tracker.user() {
        spans.push(Span::styled("  ", Style::default()));
        spans.push(Span::styled(user.to_string(), Style::default().fg(COLOR_TEXT)));
        spans.push(Span::styled("  [L] Logout", Style::default().fg(COLOR_MUTED)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_login<S: KvStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let rect = centered_rect(LOGIN_WIDTH, LOGIN_HEIGHT, area);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title("Login")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let form = &app.login;
    let mut lines = Vec::new();
    lines.push(Line::from(""));
    push_field(
        &mut lines,
        "Username",
        &form.username,
        form.focus == LoginField::Username,
        form.missing.username.then_some(USERNAME_REQUIRED),
    );
    push_field(
        &mut lines,
        "Password",
        &form.password,
        form.focus == LoginField::Password,
        form.missing.password.then_some(PASSWORD_REQUIRED),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] Login",
        Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(Paragraph::new(lines), inner);

    let (input, row) = match form.focus {
        LoginField::Username => (&form.username, 1),
        LoginField::Password => (&form.password, 4),
    };
    let label_width = "Username: ".len();
    frame.set_cursor(
        cursor_x(inner, label_width.saturating_add(input.cursor())),
        inner.y.saturating_add(row),
    );
}

fn push_field(
    lines: &mut Vec<Line<'static>>,
    label: &str,
    input: &TextInput,
    focused: bool,
    error: Option<&str>,
) {
    let label_style = match (error.is_some(), focused) {
        (true, _) => Style::default().fg(COLOR_ERROR),
        (false, true) => Style::default().fg(COLOR_ACCENT),
        (false, false) => Style::default().fg(COLOR_MUTED),
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{label:<8}: "), label_style),
        Span::styled(input.display(), Style::default().fg(COLOR_TEXT)),
    ]));
    match error {
        Some(message) => lines.push(Line::from(Span::styled(
            format!("          {message}"),
            Style::default().fg(COLOR_ERROR),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(""));
}

fn render_tasks<S: KvStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(0)].as_ref())
        .split(area);

    render_input(frame, app, chunks[0]);
    render_filter(frame, app.filter, chunks[1]);
    render_list(frame, app, chunks[2]);
}

fn render_input<S: KvStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let (title, input) = match &app.mode {
        TaskMode::Adding(input) => ("New Task", Some(input)),
        TaskMode::Editing { input, .. } => ("Edit Task", Some(input)),
        TaskMode::Browse => ("New Task  [a]", None),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if input.is_some() {
            COLOR_ACCENT
        } else {
            COLOR_BORDER
        }));
    let inner = block.inner(area);
    let text = input.map(|input| input.display()).unwrap_or_default();
    frame.render_widget(Paragraph::new(text).block(block), area);

    if let Some(input) = input {
        frame.set_cursor(cursor_x(inner, input.cursor()), inner.y);
    }
}

fn render_filter(frame: &mut Frame, current: TaskFilter, area: Rect) {
    let mut spans = vec![Span::styled("Filter [f]: ", Style::default().fg(COLOR_MUTED))];
    for (idx, filter) in TaskFilter::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(COLOR_MUTED)));
        }
        let style = if filter == current {
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        spans.push(Span::styled(filter.label(), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list<S: KvStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let visible = app.visible();
    let block = Block::default()
        .title(format!("ALL TASKS ({}/{})", visible.len(), app.tracker.tasks().len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER));
    let inner = block.inner(area);

    let lines: Vec<Line> = if visible.is_empty() {
        vec![Line::from(Span::styled(
            "No tasks. Press [a] to add one.",
            Style::default().fg(COLOR_MUTED),
        ))]
    } else {
        let (start, end) = list_window(visible.len(), app.selected, inner.height as usize);
        visible[start..end]
            .iter()
            .enumerate()
            .map(|(offset, task)| render_row(task, start + offset == app.selected))
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_row(task: &TaskRecord, selected: bool) -> Line<'static> {
    let (mark, label, label_color) = if task.completed {
        ("[x]", "Completed", COLOR_SUCCESS)
    } else {
        ("[ ]", "Incomplete", COLOR_MUTED)
    };
    let mut title_style = Style::default().fg(COLOR_TEXT);
    if task.completed {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
    }
    let mut line = Line::from(vec![
        Span::styled(if selected { "> " } else { "  " }, Style::default().fg(COLOR_ACCENT)),
        Span::styled(format!("{mark} "), Style::default().fg(label_color)),
        Span::styled(task.title.clone(), title_style),
        Span::styled(format!("  {label}"), Style::default().fg(label_color)),
    ]);
    if selected {
        line = line.style(Style::default().add_modifier(Modifier::REVERSED));
    }
    line
}

fn render_notification<S: KvStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let Some(note) = app.notification() else {
        return;
    };
    let color = match note.kind {
        StatusKind::Error => COLOR_ERROR,
        StatusKind::Info => COLOR_SUCCESS,
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        note.message.clone(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_footer<S: KvStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let help = match (app.screen(), &app.mode) {
        (Screen::Login, _) => "Tab switch field  Enter login  Esc quit",
        (Screen::Tasks, TaskMode::Browse) => {
            "a add  space toggle  e edit  d delete  f filter  L logout  q quit"
        }
        (Screen::Tasks, _) => "Enter save  Esc cancel  Ctrl-U clear",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(COLOR_MUTED))),
        area,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// Column `offset` cells into `area`, kept on the area's last column at most
fn cursor_x(area: Rect, offset: usize) -> u16 {
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    area.x
        .saturating_add(offset)
        .min(area.right().saturating_sub(1))
}

/// Rows `[start, end)` to draw so that `selected` stays in view
fn list_window(total: usize, selected: usize, height: usize) -> (usize, usize) {
    if height == 0 || total == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let start = selected.saturating_sub(height - 1).min(total - height);
    (start, start + height)
}
