//! Application state and the event reducer
//!
//! All inputs are funneled into one inbox and applied in arrival order:
//! key presses come from the terminal event stream, and every remote call
//! is spawned with a clone of the inbox sender so its result lands as an
//! [`AppEvent`]. Only the reducer mutates the stores; local state changes
//! strictly after server confirmation.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use api_client::{ApiError, AuthResponse, Credentials, TaskApi};
use td_core::session::SessionStore;
use td_core::task::{Task, TaskPatch, TaskStore};

use crate::notify::Notices;

/// Tick rate for notice expiry and redraws
const TICK: Duration = Duration::from_millis(200);

/// Navigation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Tasks,
}

/// Route guard: protected content requires an authenticated session
pub fn guard_route(requested: Route, authenticated: bool) -> Route {
    match requested {
        Route::Tasks if !authenticated => Route::Login,
        route => route,
    }
}

/// Which widget receives text input on the tasks route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    List,
}

/// In-progress edit of a single task title
#[derive(Debug, Clone)]
pub struct Edit {
    pub id: Uuid,
    pub buffer: String,
}

/// Credential form shared by the login and register routes
#[derive(Debug, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub password_focused: bool,
}

impl AuthForm {
    fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }

    fn field_mut(&mut self) -> &mut String {
        if self.password_focused {
            &mut self.password
        } else {
            &mut self.email
        }
    }

    fn clear(&mut self) {
        self.email.clear();
        self.password.clear();
        self.password_focused = false;
    }
}

/// Results delivered to the reducer by spawned API calls
#[derive(Debug)]
pub enum AppEvent {
    TasksFetched(Result<Vec<Task>, ApiError>),
    TaskCreated(Result<Task, ApiError>),
    TaskUpdated {
        id: Uuid,
        result: Result<Task, ApiError>,
    },
    TaskDeleted {
        id: Uuid,
        result: Result<(), ApiError>,
    },
    LoggedIn(Result<AuthResponse, ApiError>),
    Registered(Result<(), ApiError>),
}

/// A title is valid once trimmed text remains
pub fn validated_title(raw: &str) -> Option<String> {
    let title = raw.trim();
    (!title.is_empty()).then(|| title.to_string())
}

pub struct App {
    api: Arc<dyn TaskApi>,
    session: SessionStore,
    pub tasks: TaskStore,
    pub route: Route,
    pub focus: Focus,
    pub auth_form: AuthForm,
    pub input: String,
    pub edit: Option<Edit>,
    pub selected: usize,
    pub notices: Notices,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
    should_quit: bool,
}

impl App {
    pub fn new(api: Arc<dyn TaskApi>, session: SessionStore) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api,
            session,
            tasks: TaskStore::new(),
            route: Route::Tasks,
            focus: Focus::Input,
            auth_form: AuthForm::default(),
            input: String::new(),
            edit: None,
            selected: 0,
            notices: Notices::default(),
            events_tx,
            events_rx: Some(events_rx),
            should_quit: false,
        }
    }

    /// The route actually rendered, re-evaluated on every pass
    pub async fn active_route(&self) -> Route {
        guard_route(self.route, self.session.is_authenticated().await)
    }

    /// Drive the UI until the user quits
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> anyhow::Result<()> {
        // A persisted session skips the login route; seed the list now.
        if self.session.is_authenticated().await {
            self.refresh();
        }

        let mut events_rx = self.events_rx.take().expect("run may only be called once");
        let mut term_events = crossterm::event::EventStream::new();
        let mut tick = tokio::time::interval(TICK);

        while !self.should_quit {
            let route = self.active_route().await;
            terminal.draw(|frame| crate::ui::draw(frame, &self, route))?;

            tokio::select! {
                maybe_event = term_events.next() => match maybe_event {
                    Some(Ok(TermEvent::Key(key))) if key.kind != KeyEventKind::Release => {
                        self.handle_key(route, key).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => warn!("Terminal event error: {}", e),
                    None => break,
                },
                Some(event) = events_rx.recv() => {
                    self.handle_event(event).await;
                }
                _ = tick.tick() => {
                    self.notices.prune();
                }
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Reducer
    // ------------------------------------------------------------------

    /// Apply one API result. Results are applied in arrival order; the
    /// store's tombstones keep a late update from undoing a delete.
    pub async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TasksFetched(Ok(tasks)) => {
                self.tasks.set_tasks(tasks);
                self.clamp_selection();
            }
            AppEvent::TasksFetched(Err(err)) => {
                if self.force_logout_on_auth(&err).await {
                    return;
                }
                self.tasks.set_error(err.to_string());
            }
            AppEvent::TaskCreated(Ok(task)) => {
                self.tasks.commit_created(task);
                self.notices.success("Task added");
            }
            AppEvent::TaskCreated(Err(err)) => {
                if self.force_logout_on_auth(&err).await {
                    return;
                }
                self.notices.error(format!("Failed to add task: {}", err));
            }
            AppEvent::TaskUpdated { result: Ok(task), .. } => {
                if self.tasks.commit_updated(task) {
                    self.notices.success("Task updated");
                }
            }
            AppEvent::TaskUpdated { result: Err(err), .. } => {
                if self.force_logout_on_auth(&err).await {
                    return;
                }
                self.notices.error(format!("Failed to update task: {}", err));
            }
            AppEvent::TaskDeleted { id, result: Ok(()) } => {
                self.tasks.commit_deleted(id);
                self.clamp_selection();
                self.notices.success("Task deleted");
            }
            AppEvent::TaskDeleted { result: Err(err), .. } => {
                if self.force_logout_on_auth(&err).await {
                    return;
                }
                self.notices.error("Failed to delete task");
            }
            AppEvent::LoggedIn(Ok(auth)) => {
                if let Err(err) = self.session.login_success(auth.token).await {
                    self.notices.error(format!("Failed to store session: {}", err));
                    return;
                }
                self.auth_form.clear();
                self.route = Route::Tasks;
                self.refresh();
            }
            AppEvent::LoggedIn(Err(err)) => {
                self.notices.error(format!("Login failed: {}", err));
            }
            AppEvent::Registered(Ok(())) => {
                self.route = Route::Login;
                self.notices.success("Account created, log in to continue");
            }
            AppEvent::Registered(Err(err)) => {
                self.notices.error(format!("Registration failed: {}", err));
            }
        }
    }

    /// The server no longer accepts the session: clear it and return to
    /// the login route. Reacts uniformly, whatever the operation was.
    async fn force_logout_on_auth(&mut self, err: &ApiError) -> bool {
        if !err.is_auth() {
            return false;
        }
        warn!("Session rejected by server: {}", err);
        if let Err(e) = self.session.logout().await {
            warn!("Failed to clear session: {}", e);
        }
        self.reset_task_view();
        self.route = Route::Login;
        self.notices.error("Session expired, log in again");
        true
    }

    // ------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------

    /// Start a full fetch. The current list stays visible until the
    /// response lands.
    fn refresh(&mut self) {
        self.tasks.set_loading();
        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::TasksFetched(api.list_tasks().await));
        });
    }

    /// Submit the add-task form. Whitespace-only input is refused
    /// silently: no request, no store mutation.
    fn submit_new_task(&mut self) {
        let Some(title) = validated_title(&self.input) else {
            return;
        };
        self.input.clear();
        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::TaskCreated(api.create_task(&title).await));
        });
    }

    fn toggle_task(&mut self, id: Uuid) {
        let Some(task) = self.tasks.get_task(id) else {
            return;
        };
        let patch = TaskPatch::done(!task.is_done);
        self.spawn_update(id, patch);
    }

    fn delete_task(&mut self, id: Uuid) {
        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.delete_task(id).await;
            let _ = tx.send(AppEvent::TaskDeleted { id, result });
        });
    }

    fn spawn_update(&mut self, id: Uuid, patch: TaskPatch) {
        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.update_task(id, &patch).await;
            let _ = tx.send(AppEvent::TaskUpdated { id, result });
        });
    }

    /// Begin editing the selected task. Any unsaved edit in progress is
    /// silently abandoned.
    fn start_edit(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        self.edit = Some(Edit {
            id: task.id,
            buffer: task.title.clone(),
        });
    }

    /// Discard the edit buffer without contacting the server
    fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Save the edit buffer. A whitespace-only buffer is refused
    /// silently and the edit stays open.
    fn save_edit(&mut self) {
        let Some(edit) = &self.edit else {
            return;
        };
        let Some(title) = validated_title(&edit.buffer) else {
            return;
        };
        let id = edit.id;
        self.edit = None;
        self.spawn_update(id, TaskPatch::title(title));
    }

    async fn logout(&mut self) {
        if let Err(err) = self.session.logout().await {
            self.notices.error(format!("Failed to clear session: {}", err));
            return;
        }
        self.reset_task_view();
        self.route = Route::Login;
    }

    fn submit_auth(&mut self, route: Route) {
        let credentials = self.auth_form.credentials();
        if credentials.email.is_empty() || credentials.password.is_empty() {
            return;
        }
        let api = Arc::clone(&self.api);
        let tx = self.events_tx.clone();
        if route == Route::Register {
            tokio::spawn(async move {
                let _ = tx.send(AppEvent::Registered(api.register(&credentials).await));
            });
        } else {
            tokio::spawn(async move {
                let _ = tx.send(AppEvent::LoggedIn(api.login(&credentials).await));
            });
        }
    }

    fn reset_task_view(&mut self) {
        self.tasks = TaskStore::new();
        self.edit = None;
        self.input.clear();
        self.selected = 0;
        self.focus = Focus::Input;
    }

    // ------------------------------------------------------------------
    // Key handling
    // ------------------------------------------------------------------

    async fn handle_key(&mut self, route: Route, key: KeyEvent) {
        if is_ctrl(&key) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match route {
            Route::Login | Route::Register => self.handle_auth_key(route, key),
            Route::Tasks => self.handle_tasks_key(key).await,
        }
    }

    fn handle_auth_key(&mut self, route: Route, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') if is_ctrl(&key) => {
                self.route = if route == Route::Register {
                    Route::Login
                } else {
                    Route::Register
                };
            }
            KeyCode::Tab => {
                self.auth_form.password_focused = !self.auth_form.password_focused;
            }
            KeyCode::Enter => self.submit_auth(route),
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Backspace => {
                self.auth_form.field_mut().pop();
            }
            KeyCode::Char(c) if !is_ctrl(&key) => {
                self.auth_form.field_mut().push(c);
            }
            _ => {}
        }
    }

    async fn handle_tasks_key(&mut self, key: KeyEvent) {
        if self.edit.is_some() {
            match key.code {
                KeyCode::Esc => self.cancel_edit(),
                KeyCode::Enter => self.save_edit(),
                KeyCode::Backspace => {
                    if let Some(edit) = &mut self.edit {
                        edit.buffer.pop();
                    }
                }
                KeyCode::Char(c) if !is_ctrl(&key) => {
                    if let Some(edit) = &mut self.edit {
                        edit.buffer.push(c);
                    }
                }
                _ => {}
            }
            return;
        }

        match self.focus {
            Focus::Input => match key.code {
                KeyCode::Enter => self.submit_new_task(),
                KeyCode::Tab => self.focus = Focus::List,
                KeyCode::Esc => self.should_quit = true,
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) if !is_ctrl(&key) => self.input.push(c),
                _ => {}
            },
            Focus::List => match key.code {
                KeyCode::Char('l') if is_ctrl(&key) => self.logout().await,
                KeyCode::Tab => self.focus = Focus::Input,
                KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
                KeyCode::Down | KeyCode::Char('j') => self.select_next(),
                KeyCode::Char(' ') => {
                    if let Some(id) = self.selected_id() {
                        self.toggle_task(id);
                    }
                }
                KeyCode::Char('e') => self.start_edit(),
                KeyCode::Char('d') => {
                    if let Some(id) = self.selected_id() {
                        self.delete_task(id);
                    }
                }
                KeyCode::Char('r') => self.refresh(),
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.tasks().get(self.selected)
    }

    fn selected_id(&self) -> Option<Uuid> {
        self.selected_task().map(|task| task.id)
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.tasks.len() {
            self.selected += 1;
        }
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.tasks.len() {
            self.selected = self.tasks.len().saturating_sub(1);
        }
    }
}

fn is_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}
