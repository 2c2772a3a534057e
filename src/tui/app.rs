//! Screen state and key dispatch. No I/O here: every key maps to an `Action`
//! that the run loop carries out against storage or the intake pipeline.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::event::AppEvent;
use crate::types::{Category, Job};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    AddJob,
    JobList,
    Search,
    Detail,
}

/// Side effects requested by a key press or background event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// Re-query storage for whatever the current screen shows
    Reload,
    OpenDetail(i64),
    Delete(i64),
    Submit(String),
    CancelSubmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    Checking,
    Available,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Progress,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub text: String,
}

impl Notice {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct AddJobState {
    pub buffer: String,
    pub status: Option<Notice>,
    pub in_flight: bool,
}

#[derive(Debug, Default)]
pub struct JobListState {
    pub filter: Option<Category>,
    pub jobs: Vec<Job>,
    pub cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFocus {
    #[default]
    Input,
    Results,
}

#[derive(Debug, Default)]
pub struct SearchState {
    pub query: String,
    pub last_query: String,
    pub results: Vec<Job>,
    pub cursor: usize,
    pub focus: SearchFocus,
}

#[derive(Debug, Default)]
pub struct DetailState {
    pub job: Option<Job>,
    pub scroll: u16,
}

pub struct App {
    pub screen: Screen,
    history: Vec<Screen>,
    pub model_name: String,
    pub model_status: ModelStatus,
    pub total_jobs: i64,
    pub categories: Vec<(Category, i64)>,
    pub category_cursor: usize,
    pub recent: Vec<Job>,
    pub add: AddJobState,
    pub list: JobListState,
    pub search: SearchState,
    pub detail: DetailState,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl App {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            screen: Screen::Dashboard,
            history: Vec::new(),
            model_name: model_name.into(),
            model_status: ModelStatus::Checking,
            total_jobs: 0,
            categories: Vec::new(),
            category_cursor: 0,
            recent: Vec::new(),
            add: AddJobState::default(),
            list: JobListState::default(),
            search: SearchState::default(),
            detail: DetailState::default(),
            notice: None,
            should_quit: false,
        }
    }

    fn push_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            self.history.push(self.screen);
            self.screen = screen;
        }
    }

    /// Pop back to the previous screen; the landing screen is reloaded
    pub fn go_back(&mut self) -> Action {
        match self.history.pop() {
            Some(previous) => {
                self.screen = previous;
                Action::Reload
            }
            None => Action::None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        self.notice = None;

        match self.screen {
            Screen::Dashboard => self.dashboard_key(key),
            Screen::AddJob => self.add_job_key(key),
            Screen::JobList => self.job_list_key(key),
            Screen::Search => self.search_key(key),
            Screen::Detail => self.detail_key(key),
        }
    }

    /// Bracketed paste lands in whichever text field has focus
    pub fn handle_paste(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        match self.screen {
            Screen::AddJob if !self.add.in_flight => self.add.buffer.push_str(&text),
            Screen::Search if self.search.focus == SearchFocus::Input => {
                self.search.query.push_str(text.lines().next().unwrap_or_default())
            }
            _ => {}
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Action {
        match event {
            AppEvent::JobAdded(job) => {
                self.add.in_flight = false;
                self.add.buffer.clear();
                self.add.status = None;
                self.notice = Some(Notice::new(
                    Tone::Success,
                    format!(
                        "Job '{}' added to {}",
                        crate::utils::ellipsize(&job.title, 30),
                        job.category
                    ),
                ));
                if self.screen == Screen::AddJob {
                    self.go_back()
                } else {
                    Action::Reload
                }
            }
            AppEvent::IntakeFailed(message) => {
                self.add.in_flight = false;
                self.add.status = Some(Notice::new(Tone::Error, format!("Error: {message}")));
                Action::None
            }
            AppEvent::ModelChecked(available) => {
                self.model_status = if available {
                    ModelStatus::Available
                } else {
                    ModelStatus::Missing
                };
                Action::None
            }
        }
    }

    // ===== Data setters used by the run loop =====

    pub fn set_dashboard(&mut self, total_jobs: i64, categories: Vec<(Category, i64)>, recent: Vec<Job>) {
        self.total_jobs = total_jobs;
        self.categories = categories;
        self.recent = recent;
        self.category_cursor = clamp_cursor(self.category_cursor, self.categories.len());
    }

    pub fn set_job_list(&mut self, jobs: Vec<Job>) {
        self.list.jobs = jobs;
        self.list.cursor = clamp_cursor(self.list.cursor, self.list.jobs.len());
    }

    pub fn set_search_results(&mut self, results: Vec<Job>) {
        self.search.results = results;
        self.search.cursor = clamp_cursor(self.search.cursor, self.search.results.len());
        self.search.focus = if self.search.results.is_empty() {
            SearchFocus::Input
        } else {
            SearchFocus::Results
        };
    }

    pub fn show_detail(&mut self, job: Job) {
        self.detail = DetailState {
            job: Some(job),
            scroll: 0,
        };
        self.push_screen(Screen::Detail);
    }

    /// Called after a successful delete; leaves the detail view if it was open
    pub fn after_delete(&mut self) {
        self.notice = Some(Notice::new(Tone::Info, "Job deleted"));
        if self.screen == Screen::Detail {
            self.detail = DetailState::default();
            self.go_back();
        }
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice::new(Tone::Error, text));
    }

    pub fn selected_category(&self) -> Option<Category> {
        self.categories.get(self.category_cursor).map(|(c, _)| *c)
    }

    // ===== Per-screen key handling =====

    fn dashboard_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('a') => {
                self.push_screen(Screen::AddJob);
                Action::None
            }
            KeyCode::Char('l') => self.open_list(None),
            KeyCode::Char('s') => {
                self.search = SearchState::default();
                self.push_screen(Screen::Search);
                Action::None
            }
            KeyCode::Char('c') | KeyCode::Enter => match self.selected_category() {
                Some(category) => self.open_list(Some(category)),
                None => Action::None,
            },
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Up | KeyCode::Char('k') => {
                self.category_cursor = self.category_cursor.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.category_cursor = step_down(self.category_cursor, self.categories.len());
                Action::None
            }
            _ => Action::None,
        }
    }

    fn open_list(&mut self, filter: Option<Category>) -> Action {
        self.list = JobListState {
            filter,
            ..Default::default()
        };
        self.push_screen(Screen::JobList);
        Action::Reload
    }

    fn add_job_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                let cancel = self.add.in_flight;
                self.add.in_flight = false;
                self.add.status = None;
                let back = self.go_back();
                if cancel {
                    Action::CancelSubmit
                } else {
                    back
                }
            }
            KeyCode::Char('s') if ctrl => self.submit(),
            _ if self.add.in_flight => Action::None,
            KeyCode::Char(c) if !ctrl => {
                self.add.buffer.push(c);
                Action::None
            }
            KeyCode::Enter => {
                self.add.buffer.push('\n');
                Action::None
            }
            KeyCode::Tab => {
                self.add.buffer.push('\t');
                Action::None
            }
            KeyCode::Backspace => {
                self.add.buffer.pop();
                Action::None
            }
            KeyCode::Char('u') if ctrl => {
                self.add.buffer.clear();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn submit(&mut self) -> Action {
        if self.add.in_flight {
            return Action::None;
        }
        let raw_text = self.add.buffer.trim();
        if raw_text.is_empty() {
            self.add.status = Some(Notice::new(Tone::Error, "Please paste a job posting first!"));
            return Action::None;
        }

        self.add.in_flight = true;
        self.add.status = Some(Notice::new(Tone::Progress, "Parsing job posting with LLM..."));
        Action::Submit(raw_text.to_string())
    }

    fn job_list_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.go_back(),
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.cursor = self.list.cursor.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.cursor = step_down(self.list.cursor, self.list.jobs.len());
                Action::None
            }
            KeyCode::Enter => self
                .list
                .jobs
                .get(self.list.cursor)
                .map(|job| Action::OpenDetail(job.id))
                .unwrap_or(Action::None),
            KeyCode::Char('d') | KeyCode::Delete => self
                .list
                .jobs
                .get(self.list.cursor)
                .map(|job| Action::Delete(job.id))
                .unwrap_or(Action::None),
            _ => Action::None,
        }
    }

    fn search_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Esc {
            return self.go_back();
        }

        match self.search.focus {
            SearchFocus::Input => match key.code {
                KeyCode::Enter => {
                    let query = self.search.query.trim().to_string();
                    if query.is_empty() {
                        return Action::None;
                    }
                    self.search.last_query = query;
                    self.search.cursor = 0;
                    Action::Reload
                }
                KeyCode::Backspace => {
                    self.search.query.pop();
                    Action::None
                }
                KeyCode::Down | KeyCode::Tab if !self.search.results.is_empty() => {
                    self.search.focus = SearchFocus::Results;
                    Action::None
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.search.query.push(c);
                    Action::None
                }
                _ => Action::None,
            },
            SearchFocus::Results => match key.code {
                KeyCode::Char('/') | KeyCode::Tab => {
                    self.search.focus = SearchFocus::Input;
                    Action::None
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    if self.search.cursor == 0 {
                        self.search.focus = SearchFocus::Input;
                    }
                    self.search.cursor = self.search.cursor.saturating_sub(1);
                    Action::None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.search.cursor = step_down(self.search.cursor, self.search.results.len());
                    Action::None
                }
                KeyCode::Enter => self
                    .search
                    .results
                    .get(self.search.cursor)
                    .map(|job| Action::OpenDetail(job.id))
                    .unwrap_or(Action::None),
                KeyCode::Char('d') | KeyCode::Delete => self
                    .search
                    .results
                    .get(self.search.cursor)
                    .map(|job| Action::Delete(job.id))
                    .unwrap_or(Action::None),
                _ => Action::None,
            },
        }
    }

    fn detail_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.go_back(),
            KeyCode::Char('d') | KeyCode::Delete => self
                .detail
                .job
                .as_ref()
                .map(|job| Action::Delete(job.id))
                .unwrap_or(Action::None),
            KeyCode::Up | KeyCode::Char('k') => {
                self.detail.scroll = self.detail.scroll.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.detail.scroll = self.detail.scroll.saturating_add(1);
                Action::None
            }
            _ => Action::None,
        }
    }
}

fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

fn step_down(cursor: usize, len: usize) -> usize {
    if cursor + 1 < len {
        cursor + 1
    } else {
        cursor
    }
}
