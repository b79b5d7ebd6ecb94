//! Interactive board and comment-thread viewer.
//!
//! A background loader thread owns the gateway; the UI thread owns all
//! state and applies loader results delivered over a channel. Comment
//! fetches travel with a [`FetchTicket`] so responses that arrive after a
//! newer fetch was issued for the same thread are discarded.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::client::{Gateway, NewComment};
use crate::comment::{CommentCache, CommentKey, CommentRecord, FetchTicket};
use crate::config::Config;
use crate::error::Result;
use crate::org::{OrgContext, OrganizationRecord};
use crate::task::{Board, TaskRecord, ViewMode};

use super::form::{CommentForm, FormAction};
use super::view;

const EVENT_POLL_MS: u64 = 120;

enum LoadRequest {
    Organizations,
    Tasks { organization_slug: String },
    Comments { ticket: FetchTicket },
    Submit { key: CommentKey, input: NewComment },
}

enum UiMsg {
    OrganizationsLoaded(Vec<OrganizationRecord>),
    OrganizationsFailed(String),
    TasksLoaded(Vec<TaskRecord>),
    TasksFailed(String),
    CommentsLoaded(FetchTicket, Vec<CommentRecord>),
    CommentsFailed(CommentKey, String),
    CommentCreated(CommentKey, CommentRecord),
    CommentRejected(CommentKey, String),
}

/// What the thread panel should show for the current selection.
pub(crate) enum ThreadPhase<'a> {
    NoOrganization,
    NoSelection,
    Loading,
    Failed(&'a str),
    Loaded(&'a [CommentRecord]),
}

pub struct AppState {
    pub(crate) config: Config,
    pub(crate) org: OrgContext,
    pub(crate) tasks: Vec<TaskRecord>,
    pub(crate) tasks_loaded: bool,
    pub(crate) tasks_error: Option<String>,
    pub(crate) board: Board,
    pub(crate) view_mode: ViewMode,
    pub(crate) selected: Option<usize>,
    pub(crate) cache: CommentCache,
    pub(crate) form: Option<CommentForm>,
    pub(crate) status_message: Option<String>,
    thread_errors: HashMap<CommentKey, String>,
    pending_threads: HashSet<CommentKey>,
}

impl AppState {
    fn new(config: Config) -> Self {
        Self {
            config,
            org: OrgContext::default(),
            tasks: Vec::new(),
            tasks_loaded: false,
            tasks_error: None,
            board: Board::default(),
            view_mode: ViewMode::default(),
            selected: None,
            cache: CommentCache::new(),
            form: None,
            status_message: None,
            thread_errors: HashMap::new(),
            pending_threads: HashSet::new(),
        }
    }

    /// Tasks in the order the panels display and navigate them.
    pub(crate) fn visible_tasks(&self) -> Vec<&TaskRecord> {
        match self.view_mode {
            ViewMode::Board => self
                .board
                .todo
                .iter()
                .chain(self.board.in_progress.iter())
                .chain(self.board.done.iter())
                .collect(),
            ViewMode::List => self.tasks.iter().collect(),
        }
    }

    pub(crate) fn selected_task(&self) -> Option<&TaskRecord> {
        let index = self.selected?;
        self.visible_tasks().get(index).copied()
    }

    pub(crate) fn thread_key(&self) -> Option<CommentKey> {
        let slug = self.org.current_slug()?;
        let task = self.selected_task()?;
        Some(CommentKey::new(task.id.clone(), slug))
    }

    pub(crate) fn thread_phase(&self) -> ThreadPhase<'_> {
        if self.org.current_slug().is_none() {
            return ThreadPhase::NoOrganization;
        }
        let key = match self.thread_key() {
            Some(key) => key,
            None => return ThreadPhase::NoSelection,
        };
        if let Some(error) = self.thread_errors.get(&key) {
            return ThreadPhase::Failed(error);
        }
        match self.cache.get(&key) {
            Some(comments) => ThreadPhase::Loaded(comments),
            None => ThreadPhase::Loading,
        }
    }

    pub(crate) fn footer_hint(&self) -> String {
        if let Some(form) = self.form.as_ref() {
            if form.is_submitting() {
                return "submitting...".to_string();
            }
            return "tab switch field  enter submit  ctrl-u clear  esc cancel".to_string();
        }
        "j/k move  v view mode  c comment  r retry  q quit".to_string()
    }

    fn select_delta(&mut self, delta: isize) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.selected = None;
            return;
        }
        let current = self.selected.unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.selected = Some(next as usize);
    }

    fn toggle_view_mode(&mut self) {
        let previous_id = self.selected_task().map(|task| task.id.clone());
        self.view_mode = self.view_mode.toggled();
        self.restore_selection(previous_id);
    }

    fn restore_selection(&mut self, previous_id: Option<String>) {
        let visible = self.visible_tasks();
        if visible.is_empty() {
            self.selected = None;
            return;
        }
        let index = previous_id
            .and_then(|id| visible.iter().position(|task| task.id == id))
            .unwrap_or_else(|| {
                self.selected
                    .map(|index| index.min(visible.len() - 1))
                    .unwrap_or(0)
            });
        self.selected = Some(index);
    }

    fn install_tasks(&mut self, tasks: Vec<TaskRecord>) {
        let previous_id = self.selected_task().map(|task| task.id.clone());
        self.board = Board::partition(tasks.clone());
        self.tasks = tasks;
        self.tasks_loaded = true;
        self.tasks_error = None;
        self.restore_selection(previous_id);
    }

    fn bump_comment_count(&mut self, task_id: &str) {
        for task in &mut self.tasks {
            if task.id == task_id {
                task.comment_count += 1;
            }
        }
        let previous_id = self.selected_task().map(|task| task.id.clone());
        self.board = Board::partition(self.tasks.clone());
        self.restore_selection(previous_id);
    }

    /// Request a fresh copy of the selected thread. A cached list stays
    /// visible while the fetch runs; only a failed thread (which waits for
    /// an explicit retry) or one already in flight is skipped.
    fn ensure_thread_loaded(&mut self, req_tx: &Sender<LoadRequest>) {
        let key = match self.thread_key() {
            Some(key) => key,
            None => return,
        };
        if self.thread_errors.contains_key(&key) || self.pending_threads.contains(&key) {
            return;
        }
        self.request_thread(key, req_tx);
    }

    fn request_thread(&mut self, key: CommentKey, req_tx: &Sender<LoadRequest>) {
        let ticket = self.cache.begin_fetch(&key);
        self.thread_errors.remove(&key);
        self.pending_threads.insert(key);
        let _ = req_tx.send(LoadRequest::Comments { ticket });
    }

    fn open_form(&mut self) {
        if self.org.current_slug().is_none() {
            self.status_message = Some("no organization selected".to_string());
            return;
        }
        if self.selected_task().is_none() {
            self.status_message = Some("select a task first".to_string());
            return;
        }
        self.form = Some(CommentForm::new(&self.config.author.email));
        self.status_message = None;
    }

    fn submit_form(&mut self, req_tx: &Sender<LoadRequest>) {
        let key = match self.thread_key() {
            Some(key) => key,
            None => return,
        };
        let input = match self.form.as_mut().and_then(CommentForm::begin_submit) {
            Some(input) => input,
            None => return,
        };
        let request = NewComment {
            task_id: key.task_id.clone(),
            content: input.content,
            author_email: input.author_email,
            organization_slug: key.slug.clone(),
        };
        let _ = req_tx.send(LoadRequest::Submit {
            key,
            input: request,
        });
    }

    fn retry(&mut self, req_tx: &Sender<LoadRequest>) {
        if self.org.error().is_some() {
            self.org = OrgContext::Loading;
            let _ = req_tx.send(LoadRequest::Organizations);
            return;
        }
        if self.tasks_error.is_some() {
            self.tasks_error = None;
            self.tasks_loaded = false;
            if let Some(slug) = self.org.current_slug() {
                let _ = req_tx.send(LoadRequest::Tasks {
                    organization_slug: slug.to_string(),
                });
            }
            return;
        }
        if let Some(key) = self.thread_key() {
            if self.thread_errors.contains_key(&key) {
                self.request_thread(key, req_tx);
            }
        }
    }
}

pub fn run(gateway: Box<dyn Gateway>, config: Config) -> Result<()> {
    let (ui_tx, ui_rx) = mpsc::channel();
    let (req_tx, req_rx) = mpsc::channel();

    spawn_loader(gateway, req_rx, ui_tx);
    let _ = req_tx.send(LoadRequest::Organizations);

    let mut app = AppState::new(config);
    run_terminal(&mut app, ui_rx, req_tx)
}

fn run_terminal(
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app, ui_rx, req_tx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            handle_ui_msg(app, msg, &req_tx);
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key, &req_tx) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_ui_msg(app: &mut AppState, msg: UiMsg, req_tx: &Sender<LoadRequest>) {
    match msg {
        UiMsg::OrganizationsLoaded(organizations) => {
            let configured = app.config.organization.slug.clone();
            app.org = OrgContext::ready(organizations, Some(configured.as_str()));
            if let Some(slug) = app.org.current_slug() {
                let _ = req_tx.send(LoadRequest::Tasks {
                    organization_slug: slug.to_string(),
                });
            }
        }
        UiMsg::OrganizationsFailed(err) => {
            app.org = OrgContext::failed(err);
        }
        UiMsg::TasksLoaded(tasks) => {
            app.install_tasks(tasks);
            app.ensure_thread_loaded(req_tx);
        }
        UiMsg::TasksFailed(err) => {
            app.tasks_error = Some(err);
        }
        UiMsg::CommentsLoaded(ticket, comments) => {
            app.pending_threads.remove(ticket.key());
            app.thread_errors.remove(ticket.key());
            app.cache.apply_fetch(ticket, comments);
        }
        UiMsg::CommentsFailed(key, err) => {
            app.pending_threads.remove(&key);
            app.thread_errors.insert(key, err);
        }
        UiMsg::CommentCreated(key, comment) => {
            let task_id = comment.task_id.clone();
            app.cache.merge_prepend(&key, comment);
            app.bump_comment_count(&task_id);
            if let Some(form) = app.form.as_mut() {
                form.submit_succeeded();
            }
            app.form = None;
            app.status_message = Some("comment added".to_string());
        }
        UiMsg::CommentRejected(_key, err) => {
            if let Some(form) = app.form.as_mut() {
                form.submit_failed();
            }
            app.status_message = Some(format!("comment failed: {err}"));
        }
    }
}

/// Returns true when the app should quit.
fn handle_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.form.is_some() {
        let action = app
            .form
            .as_mut()
            .map(|form| form.handle_key(key))
            .unwrap_or(FormAction::None);
        match action {
            FormAction::Submit => app.submit_form(req_tx),
            FormAction::Cancel => {
                let closed = app
                    .form
                    .as_mut()
                    .map(|form| form.cancel())
                    .unwrap_or(false);
                if closed {
                    app.form = None;
                }
            }
            FormAction::None => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('v') => app.toggle_view_mode(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_delta(1);
            app.ensure_thread_loaded(req_tx);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_delta(-1);
            app.ensure_thread_loaded(req_tx);
        }
        KeyCode::Char('c') => app.open_form(),
        KeyCode::Char('r') => app.retry(req_tx),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::org::OrganizationRecord;
    use crate::task::TaskStatus;

    fn task(id: &str) -> TaskRecord {
        let now = Utc::now();
        TaskRecord {
            id: id.to_string(),
            project_id: "p-1".to_string(),
            title: "Wire up invoice export".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            assignee_email: None,
            due_date: None,
            created_at: now,
            updated_at: now,
            comment_count: 0,
        }
    }

    fn comment(id: &str) -> CommentRecord {
        CommentRecord {
            id: id.to_string(),
            task_id: "t-1".to_string(),
            content: "export format agreed".to_string(),
            author_email: "jane.smith@example.com".to_string(),
            author_display_name: None,
            created_at: Utc::now(),
        }
    }

    fn app_with_selected_task() -> AppState {
        let mut app = AppState::new(Config::default());
        app.org = OrgContext::ready(
            vec![OrganizationRecord {
                id: "org-1".to_string(),
                slug: "acme".to_string(),
                name: "Acme".to_string(),
                contact_email: String::new(),
            }],
            Some("acme"),
        );
        app.install_tasks(vec![task("t-1")]);
        app
    }

    #[test]
    fn cached_thread_is_refreshed_but_stays_visible() {
        let mut app = app_with_selected_task();
        let (req_tx, req_rx) = mpsc::channel();

        let key = app.thread_key().expect("key");
        let ticket = app.cache.begin_fetch(&key);
        assert!(app.cache.apply_fetch(ticket, vec![comment("c-1")]));

        // A cached thread still gets a fresh fetch.
        app.ensure_thread_loaded(&req_tx);
        assert!(matches!(
            req_rx.try_recv(),
            Ok(LoadRequest::Comments { .. })
        ));

        // The cached list is shown while that fetch is in flight.
        assert!(matches!(
            app.thread_phase(),
            ThreadPhase::Loaded(comments) if comments.len() == 1
        ));
    }

    #[test]
    fn in_flight_thread_is_not_requested_twice() {
        let mut app = app_with_selected_task();
        let (req_tx, req_rx) = mpsc::channel();

        app.ensure_thread_loaded(&req_tx);
        app.ensure_thread_loaded(&req_tx);

        assert!(req_rx.try_recv().is_ok());
        assert!(req_rx.try_recv().is_err());
    }
}

fn spawn_loader(gateway: Box<dyn Gateway>, req_rx: Receiver<LoadRequest>, ui_tx: Sender<UiMsg>) {
    thread::spawn(move || {
        while let Ok(req) = req_rx.recv() {
            match req {
                LoadRequest::Organizations => match gateway.organizations() {
                    Ok(organizations) => {
                        let _ = ui_tx.send(UiMsg::OrganizationsLoaded(organizations));
                    }
                    Err(err) => {
                        let _ = ui_tx.send(UiMsg::OrganizationsFailed(err.to_string()));
                    }
                },
                LoadRequest::Tasks { organization_slug } => {
                    match gateway.tasks(&organization_slug, None) {
                        Ok(tasks) => {
                            let _ = ui_tx.send(UiMsg::TasksLoaded(tasks));
                        }
                        Err(err) => {
                            let _ = ui_tx.send(UiMsg::TasksFailed(err.to_string()));
                        }
                    }
                }
                LoadRequest::Comments { ticket } => {
                    let key = ticket.key().clone();
                    match gateway.task_comments(&key.task_id, &key.slug) {
                        Ok(comments) => {
                            let _ = ui_tx.send(UiMsg::CommentsLoaded(ticket, comments));
                        }
                        Err(err) => {
                            let _ = ui_tx.send(UiMsg::CommentsFailed(key, err.to_string()));
                        }
                    }
                }
                LoadRequest::Submit { key, input } => match gateway.create_comment(&input) {
                    Ok(comment) => {
                        let _ = ui_tx.send(UiMsg::CommentCreated(key, comment));
                    }
                    Err(err) => {
                        let _ = ui_tx.send(UiMsg::CommentRejected(key, err.to_string()));
                    }
                },
            }
        }
    });
}
