//! Terminal front end: owns the terminal, dispatches keys, runs intake in the background.

pub mod app;
pub mod event;
pub mod ui;

use anyhow::{Context, Result};
use crossterm::event::{
    self as term_event, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::core::database::JobRepository;
use crate::core::OllamaClient;
use crate::intake::JobIntake;
use app::{Action, App, Screen};
use event::AppEvent;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(20);
const RECENT_JOBS: i64 = 5;

/// Restores the terminal on every exit path, panics included
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
    }
}

pub async fn run(repo: JobRepository, intake: JobIntake, ollama: OllamaClient) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let _guard = TerminalGuard;
    execute!(std::io::stdout(), EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(ollama.model());
    let mut runner = Runner {
        repo,
        intake,
        tx: tx.clone(),
        pending: None,
    };

    let model_check = tokio::spawn(async move {
        let available = ollama.check_model_available().await;
        if !available {
            warn!("Model {} is not available on {}", ollama.model(), ollama.base_url());
        }
        let _ = tx.send(AppEvent::ModelChecked(available));
    });

    runner.perform(&mut app, Action::Reload).await;
    info!("TUI started");

    let result = event_loop(&mut terminal, &mut app, &mut runner, &mut rx).await;

    runner.cancel_pending();
    model_check.abort();
    terminal.show_cursor().ok();
    info!("TUI stopped");
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    runner: &mut Runner,
    rx: &mut UnboundedReceiver<AppEvent>,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, app))?;

        while let Ok(background) = rx.try_recv() {
            if matches!(background, AppEvent::JobAdded(_) | AppEvent::IntakeFailed(_)) {
                runner.pending = None;
            }
            let action = app.handle_event(background);
            runner.perform(app, action).await;
        }

        if !term_event::poll(INPUT_POLL_INTERVAL)? {
            continue;
        }
        let action = match term_event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => app.handle_key(key),
            Event::Paste(text) => {
                app.handle_paste(&text);
                Action::None
            }
            _ => Action::None,
        };
        runner.perform(app, action).await;
    }
    Ok(())
}

/// Carries out `Action`s against storage and the intake pipeline
struct Runner {
    repo: JobRepository,
    intake: JobIntake,
    tx: UnboundedSender<AppEvent>,
    /// At most one extraction runs at a time
    pending: Option<JoinHandle<()>>,
}

impl Runner {
    async fn perform(&mut self, app: &mut App, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => {
                self.cancel_pending();
                app.should_quit = true;
            }
            Action::Reload => self.reload(app).await,
            Action::OpenDetail(id) => match self.repo.get(id).await {
                Ok(Some(job)) => app.show_detail(job),
                Ok(None) => {
                    app.set_error(format!("Job {id} no longer exists"));
                    self.reload(app).await;
                }
                Err(e) => {
                    error!("Failed to load job {}: {:#}", id, e);
                    app.set_error(format!("Failed to load job: {e}"));
                }
            },
            Action::Delete(id) => match self.repo.delete(id).await {
                Ok(deleted) => {
                    if !deleted {
                        warn!("Delete of missing job {}", id);
                    }
                    app.after_delete();
                    self.reload(app).await;
                }
                Err(e) => {
                    error!("Failed to delete job {}: {:#}", id, e);
                    app.set_error(format!("Failed to delete job: {e}"));
                }
            },
            Action::Submit(raw_text) => self.submit(raw_text),
            Action::CancelSubmit => {
                self.cancel_pending();
                self.reload(app).await;
            }
        }
    }

    fn submit(&mut self, raw_text: String) {
        self.cancel_pending();

        let intake = self.intake.clone();
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            let event = match intake.add(&raw_text).await {
                Ok(job) => AppEvent::JobAdded(job),
                Err(e) => {
                    warn!("Add job failed: {}", e);
                    AppEvent::IntakeFailed(e.user_message())
                }
            };
            let _ = tx.send(event);
        }));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            info!("Cancelling in-flight extraction");
            handle.abort();
        }
    }

    async fn reload(&mut self, app: &mut App) {
        if let Err(e) = self.load_screen(app).await {
            error!("Failed to load data: {:#}", e);
            app.set_error(format!("Failed to load data: {e}"));
        }
    }

    async fn load_screen(&mut self, app: &mut App) -> Result<()> {
        let total = self.repo.count().await?;
        match app.screen {
            Screen::Dashboard => {
                let categories = self.repo.category_counts().await?;
                let recent = self.repo.recent(RECENT_JOBS).await?;
                app.set_dashboard(total, categories, recent);
            }
            Screen::JobList => {
                let jobs = match app.list.filter {
                    Some(category) => self.repo.list_by_category(category).await?,
                    None => self.repo.list_all().await?,
                };
                app.set_job_list(jobs);
            }
            Screen::Search => {
                if !app.search.last_query.is_empty() {
                    let results = self.repo.search(&app.search.last_query).await?;
                    app.set_search_results(results);
                }
            }
            Screen::AddJob | Screen::Detail => {}
        }
        app.total_jobs = total;
        Ok(())
    }
}
