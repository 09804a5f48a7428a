use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::auth::{LoginOutcome, MissingFields};
use crate::config::UiConfig;
use crate::error::{Error, Result};
use crate::filter::TaskFilter;
use crate::storage::KvStore;
use crate::task::{TaskId, TaskRecord};
use crate::tracker::Tracker;

use super::editor::{InputAction, TextInput};
use super::view;

const EVENT_POLL_MS: u64 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub(crate) struct Notification {
    pub(crate) message: String,
    pub(crate) kind: StatusKind,
    expires_at: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Screen {
    Login,
    Tasks,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoginField {
    Username,
    Password,
}

pub(crate) struct LoginForm {
    pub(crate) username: TextInput,
    pub(crate) password: TextInput,
    pub(crate) focus: LoginField,
    pub(crate) missing: MissingFields,
}

impl LoginForm {
    fn new() -> Self {
        Self {
            username: TextInput::new(),
            password: TextInput::masked(),
            focus: LoginField::Username,
            missing: MissingFields::default(),
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn focused_mut(&mut self) -> &mut TextInput {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }
}

pub(crate) enum TaskMode {
    Browse,
    Adding(TextInput),
    Editing { id: TaskId, input: TextInput },
}

pub struct AppState<S: KvStore> {
    pub(crate) tracker: Tracker<S>,
    pub(crate) login: LoginForm,
    pub(crate) mode: TaskMode,
    pub(crate) filter: TaskFilter,
    pub(crate) selected: usize,
    pub(crate) notification: Option<Notification>,
    default_filter: TaskFilter,
    notification_ttl: Duration,
}

impl<S: KvStore> AppState<S> {
    pub fn new(tracker: Tracker<S>, config: &UiConfig) -> Self {
        Self {
            tracker,
            login: LoginForm::new(),
            mode: TaskMode::Browse,
            filter: config.default_filter,
            selected: 0,
            notification: None,
            default_filter: config.default_filter,
            notification_ttl: Duration::from_millis(config.notification_ms),
        }
    }

    pub(crate) fn screen(&self) -> Screen {
        if self.tracker.is_logged_in() {
            Screen::Tasks
        } else {
            Screen::Login
        }
    }

    pub(crate) fn visible(&self) -> Vec<&TaskRecord> {
        self.tracker.visible(self.filter)
    }

    pub(crate) fn selected_task(&self) -> Option<&TaskRecord> {
        self.visible().get(self.selected).copied()
    }

    pub(crate) fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Load the restored user's list; a failure is shown, not fatal, so the
    /// user can still log out or switch accounts
    pub fn hydrate(&mut self) {
        if let Err(err) = self.tracker.hydrate() {
            self.notify_error(&err);
        }
        self.clamp_selection();
    }

    /// Drop the notification once its display time has passed
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.notification {
            Some(note) if now >= note.expires_at => {
                self.notification = None;
                true
            }
            _ => false,
        }
    }

    fn notify(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            kind,
            expires_at: Instant::now() + self.notification_ttl,
        });
    }

    fn notify_error(&mut self, err: &Error) {
        self.notify(StatusKind::Error, err.to_string());
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn select_id(&mut self, id: TaskId) {
        if let Some(idx) = self.visible().iter().position(|task| task.id == id) {
            self.selected = idx;
        }
        self.clamp_selection();
    }

    /// Handle one key press; returns true when the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match self.screen() {
            Screen::Login => self.handle_login_key(key),
            Screen::Tasks => self.handle_task_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login.toggle_focus();
                return false;
            }
            _ => {}
        }

        if self.login.focused_mut().handle_key(key) == InputAction::Submit {
            self.submit_login();
        }
        false
    }

    fn submit_login(&mut self) {
        let username = self.login.username.value().to_string();
        let password = self.login.password.value().to_string();

        let missing = MissingFields::check(&username, &password);
        self.login.missing = missing;
        if let Some(message) = missing.message() {
            self.notify(StatusKind::Error, message);
            return;
        }

        match self.tracker.login(&username, &password) {
            Ok(outcome) => {
                self.login = LoginForm::new();
                self.mode = TaskMode::Browse;
                self.filter = self.default_filter;
                self.selected = 0;
                let user = self.tracker.user().unwrap_or_default().to_string();
                let message = match outcome {
                    LoginOutcome::Registered => format!("Welcome, {user}! Account created"),
                    LoginOutcome::LoggedIn => format!("Welcome back, {user}"),
                };
                self.notify(StatusKind::Info, message);
            }
            Err(err) => {
                self.login.password.clear();
                self.login.focus = LoginField::Password;
                self.notify_error(&err);
            }
        }
    }

    fn handle_task_key(&mut self, key: KeyEvent) -> bool {
        match std::mem::replace(&mut self.mode, TaskMode::Browse) {
            TaskMode::Browse => self.handle_browse_key(key),
            TaskMode::Adding(mut input) => {
                match input.handle_key(key) {
                    InputAction::None => self.mode = TaskMode::Adding(input),
                    InputAction::Cancel => {}
                    InputAction::Submit => match self.tracker.add(input.value()) {
                        Ok(result) => {
                            // New tasks are incomplete; keep them on screen.
                            if self.filter == TaskFilter::Completed {
                                self.filter = TaskFilter::All;
                            }
                            if let Some(id) = result.id {
                                self.select_id(id);
                            }
                        }
                        Err(err) => {
                            self.notify_error(&err);
                            self.mode = TaskMode::Adding(input);
                        }
                    },
                }
                false
            }
            TaskMode::Editing { id, mut input } => {
                match input.handle_key(key) {
                    InputAction::None => self.mode = TaskMode::Editing { id, input },
                    InputAction::Cancel => {}
                    InputAction::Submit => match self.tracker.edit(id, input.value()) {
                        Ok(_) => self.select_id(id),
                        Err(err) => {
                            self.notify_error(&err);
                            self.mode = TaskMode::Editing { id, input };
                        }
                    },
                }
                false
            }
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = self.selected.saturating_add(1);
                self.clamp_selection();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('a') => {
                self.mode = TaskMode::Adding(TextInput::new());
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.selected_task().map(|task| task.id) {
                    if let Err(err) = self.tracker.complete(id) {
                        self.notify_error(&err);
                    }
                    self.clamp_selection();
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(task) = self.selected_task() {
                    let id = task.id;
                    let input = TextInput::with_value(task.title.clone());
                    self.mode = TaskMode::Editing { id, input };
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_task().map(|task| task.id) {
                    match self.tracker.delete(id) {
                        Ok(_) => self.notify(StatusKind::Info, "Task deleted"),
                        Err(err) => self.notify_error(&err),
                    }
                    self.clamp_selection();
                }
            }
            KeyCode::Char('f') => {
                self.filter = self.filter.cycle();
                self.selected = 0;
            }
            KeyCode::Char('L') => {
                match self.tracker.logout() {
                    Ok(()) => self.notify(StatusKind::Info, "Logged out"),
                    Err(err) => self.notify_error(&err),
                }
                self.mode = TaskMode::Browse;
                self.selected = 0;
            }
            _ => {}
        }
        false
    }
}

/// Run the terminal UI until the user quits
pub fn run<S: KvStore>(tracker: Tracker<S>, config: &UiConfig) -> Result<()> {
    let mut app = AppState::new(tracker, config);
    app.hydrate();
    run_terminal(&mut app)
}

fn run_terminal<S: KvStore>(app: &mut AppState<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<S: KvStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<S>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if app.tick(Instant::now()) {
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{self, CorruptDataPolicy};
    use crate::storage::MemoryStore;

    fn app() -> AppState<MemoryStore> {
        let tracker = Tracker::open(MemoryStore::new(), CorruptDataPolicy::Reset).unwrap();
        AppState::new(tracker, &UiConfig::default())
    }

    fn press(app: &mut AppState<MemoryStore>, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut AppState<MemoryStore>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn log_in(app: &mut AppState<MemoryStore>, user: &str, password: &str) {
        type_text(app, user);
        press(app, KeyCode::Tab);
        type_text(app, password);
        press(app, KeyCode::Enter);
    }

    fn notification(app: &AppState<MemoryStore>) -> Option<(StatusKind, String)> {
        app.notification().map(|n| (n.kind, n.message.clone()))
    }

    #[test]
    fn empty_login_flags_fields_and_notifies() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Login);
        assert!(app.login.missing.username);
        assert!(app.login.missing.password);
        assert_eq!(
            notification(&app),
            Some((StatusKind::Error, "Password is required".to_string()))
        );
    }

    #[test]
    fn login_registers_and_switches_screen() {
        let mut app = app();
        log_in(&mut app, "alice", "pw1");

        assert_eq!(app.screen(), Screen::Tasks);
        assert_eq!(app.tracker.user(), Some("alice"));
        assert!(matches!(notification(&app), Some((StatusKind::Info, _))));
    }

    #[test]
    fn wrong_password_stays_on_login() {
        let mut app = app();
        log_in(&mut app, "alice", "pw1");
        press(&mut app, KeyCode::Char('L'));

        log_in(&mut app, "alice", "pw2");
        assert_eq!(app.screen(), Screen::Login);
        assert_eq!(
            notification(&app),
            Some((StatusKind::Error, "Invalid credentials".to_string()))
        );
        assert_eq!(persist::load_session(app.tracker.store()).unwrap(), None);
    }

    #[test]
    fn add_toggle_edit_delete_through_keys() {
        let mut app = app();
        log_in(&mut app, "alice", "pw");

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "buy milk");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tracker.tasks().len(), 1);
        assert!(matches!(app.mode, TaskMode::Browse));

        press(&mut app, KeyCode::Char(' '));
        assert!(app.tracker.tasks()[0].completed);

        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('!'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tracker.tasks()[0].title, "buy milk!");

        press(&mut app, KeyCode::Char('d'));
        assert!(app.tracker.tasks().is_empty());
    }

    #[test]
    fn empty_title_keeps_editor_open() {
        let mut app = app();
        log_in(&mut app, "alice", "pw");

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "  ");
        press(&mut app, KeyCode::Enter);

        assert!(app.tracker.tasks().is_empty());
        assert!(matches!(app.mode, TaskMode::Adding(_)));
        assert_eq!(
            notification(&app),
            Some((StatusKind::Error, "Task title cannot be empty".to_string()))
        );
    }

    #[test]
    fn filter_cycles_and_limits_visible() {
        let mut app = app();
        log_in(&mut app, "alice", "pw");
        for title in ["one", "two"] {
            press(&mut app, KeyCode::Char('a'));
            type_text(&mut app, title);
            press(&mut app, KeyCode::Enter);
        }
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Char('x'));

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, TaskFilter::Completed);
        assert_eq!(app.visible().len(), 1);
        assert_eq!(app.visible()[0].title, "one");

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, TaskFilter::Incomplete);
        assert_eq!(app.visible()[0].title, "two");

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, TaskFilter::All);
    }

    #[test]
    fn notification_expires_on_tick() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert!(app.notification().is_some());

        assert!(!app.tick(Instant::now()));
        assert!(app.tick(Instant::now() + Duration::from_secs(4)));
        assert!(app.notification().is_none());
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        log_in(&mut app, "alice", "pw");
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn corrupt_restored_list_is_reported_and_logout_still_works() {
        let mut store = MemoryStore::new();
        persist::save_session(&mut store, "alice").unwrap();
        store
            .set(&crate::storage::StorageKey::tasks("alice"), "{not json".to_string())
            .unwrap();
        let tracker = Tracker::restore(store, CorruptDataPolicy::Fail).unwrap();
        let mut app = AppState::new(tracker, &UiConfig::default());

        app.hydrate();
        let (kind, message) = notification(&app).unwrap();
        assert_eq!(kind, StatusKind::Error);
        assert!(message.contains("tasks_alice"));
        assert_eq!(app.screen(), Screen::Tasks);

        press(&mut app, KeyCode::Char('L'));
        assert_eq!(app.screen(), Screen::Login);
    }
}
