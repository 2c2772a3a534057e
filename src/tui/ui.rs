//! Rendering. Reads `App`, never mutates it.

use chrono::Local;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap,
};
use ratatui::Frame;

use crate::tui::app::{App, ModelStatus, Notice, Screen, SearchFocus, Tone};
use crate::types::Job;
use crate::utils::ellipsize;

const TITLE_WIDTH: usize = 40;
const SKILLS_WIDTH: usize = 30;

pub fn draw(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, app, rows[0]);

    match app.screen {
        Screen::Dashboard => draw_dashboard(frame, app, rows[1]),
        Screen::AddJob => draw_add_job(frame, app, rows[1]),
        Screen::JobList => draw_job_list(frame, app, rows[1]),
        Screen::Search => draw_search(frame, app, rows[1]),
        Screen::Detail => draw_detail(frame, app, rows[1]),
    }

    draw_footer(frame, app, rows[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let (status, color) = match app.model_status {
        ModelStatus::Checking => ("checking...", Color::Gray),
        ModelStatus::Available => ("available", Color::Green),
        ModelStatus::Missing => ("not available", Color::Red),
    };

    let line = Line::from(vec![
        Span::styled("TermiJob", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("   Jobs: {}   Model: {} ", app.total_jobs, app.model_name)),
        Span::styled(format!("({status})"), Style::default().fg(color)),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let keys = match app.screen {
        Screen::Dashboard => "[a] add  [l] list all  [s] search  [Enter] open category  [j/k] move  [q] quit",
        Screen::AddJob => "[Ctrl+S] parse & save  [Ctrl+U] clear  [Esc] back",
        Screen::JobList => "[Enter] details  [d] delete  [r] refresh  [j/k] move  [Esc] back",
        Screen::Search => match app.search.focus {
            SearchFocus::Input => "[Enter] search  [Tab] results  [Esc] back",
            SearchFocus::Results => "[Enter] details  [d] delete  [/] edit query  [Esc] back",
        },
        Screen::Detail => "[d] delete  [j/k] scroll  [Esc] back",
    };

    let line = match &app.notice {
        Some(notice) => notice_line(notice),
        None => Line::from(keys),
    };
    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn notice_line(notice: &Notice) -> Line<'static> {
    Line::from(Span::styled(notice.text.clone(), tone_style(notice.tone)))
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Info => Style::default(),
        Tone::Progress => Style::default().fg(Color::Yellow),
        Tone::Success => Style::default().fg(Color::Green),
        Tone::Error => Style::default().fg(Color::Red),
    }
}

fn draw_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mut summary = vec![
        Line::from(format!("Total jobs stored: {}", app.total_jobs)),
        Line::from(""),
    ];
    if app.model_status == ModelStatus::Missing {
        summary.push(Line::from(Span::styled(
            format!("Model '{}' not found. Run: ollama pull {}", app.model_name, app.model_name),
            Style::default().fg(Color::Red),
        )));
    }
    if app.total_jobs == 0 {
        summary.push(Line::from("No jobs yet. Press [a] to paste a job posting."));
    } else {
        summary.push(Line::from(Span::styled(
            "Recently added",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        summary.extend(app.recent.iter().map(|job| {
            Line::from(format!(
                "  {}  {} [{}]",
                format_date(job),
                ellipsize(&job.title, TITLE_WIDTH),
                job.category
            ))
        }));
    }
    let summary = Paragraph::new(summary)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Dashboard"));
    frame.render_widget(summary, cols[0]);

    let items: Vec<ListItem> = if app.categories.is_empty() {
        vec![ListItem::new("(no categories yet)")]
    } else {
        app.categories
            .iter()
            .map(|(category, count)| ListItem::new(format!("{category} ({count})")))
            .collect()
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Categories"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.categories.is_empty() {
        state.select(Some(app.category_cursor));
    }
    frame.render_stateful_widget(list, cols[1], &mut state);
}

fn draw_add_job(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let mut text = app.add.buffer.clone();
    if !app.add.in_flight {
        text.push('_');
    }
    // keep the end of long pastes in view, counting wrapped rows
    let inner_width = rows[0].width.saturating_sub(2);
    let inner_height = rows[0].height.saturating_sub(2);
    let input = Paragraph::new(text).wrap(Wrap { trim: false });
    let line_count = u16::try_from(input.line_count(inner_width)).unwrap_or(u16::MAX);
    let scroll = line_count.saturating_sub(inner_height);

    let input = input
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Paste job posting"),
        );
    frame.render_widget(input, rows[0]);

    let status = match &app.add.status {
        Some(notice) => notice_line(notice),
        None => Line::from("Paste the full posting, then press Ctrl+S"),
    };
    let status = Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, rows[1]);
}

fn draw_job_list(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.list.filter {
        Some(category) => format!("Jobs: {category} ({})", app.list.jobs.len()),
        None => format!("All Jobs ({})", app.list.jobs.len()),
    };

    let header = Row::new(["ID", "Title", "Category", "Budget", "Type", "Date"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = app.list.jobs.iter().map(|job| {
        Row::new(vec![
            job.id.to_string(),
            ellipsize(&job.title, TITLE_WIDTH),
            job.category.to_string(),
            job.budget.clone().unwrap_or_else(|| "-".to_string()),
            job.job_type.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
            format_date(job),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(20),
            Constraint::Length(22),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !app.list.jobs.is_empty() {
        state.select(Some(app.list.cursor));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_search(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let input_style = match app.search.focus {
        SearchFocus::Input => Style::default().fg(Color::Yellow),
        SearchFocus::Results => Style::default(),
    };
    let input = Paragraph::new(app.search.query.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(input_style)
            .title("Search title, description, skills"),
    );
    frame.render_widget(input, rows[0]);

    let title = if app.search.last_query.is_empty() {
        "Results".to_string()
    } else {
        format!("Results for '{}' ({})", app.search.last_query, app.search.results.len())
    };

    let header = Row::new(["ID", "Title", "Category", "Budget", "Skills"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let results = app.search.results.iter().map(|job| {
        Row::new(vec![
            job.id.to_string(),
            ellipsize(&job.title, TITLE_WIDTH),
            job.category.to_string(),
            job.budget.clone().unwrap_or_else(|| "-".to_string()),
            ellipsize(&job.skills_display(), SKILLS_WIDTH),
        ])
    });

    let table = Table::new(
        results,
        [
            Constraint::Length(6),
            Constraint::Min(20),
            Constraint::Length(22),
            Constraint::Length(14),
            Constraint::Length(32),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if app.search.focus == SearchFocus::Results && !app.search.results.is_empty() {
        state.select(Some(app.search.cursor));
    }
    frame.render_stateful_widget(table, rows[1], &mut state);
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(job) = &app.detail.job else {
        let empty = Paragraph::new("Job not found").block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let label = Style::default().add_modifier(Modifier::BOLD);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{name}: "), label), Span::raw(value)])
    };
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "Not specified".to_string());

    let mut lines = vec![
        Line::from(Span::styled(
            job.title.clone(),
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
        )),
        Line::from(""),
        field("Category", job.category.to_string()),
        field("Budget", or_dash(job.budget.clone())),
        field("Job type", or_dash(job.job_type.map(|t| t.to_string()))),
        field("Experience", or_dash(job.experience_level.map(|l| l.to_string()))),
        field("Client location", or_dash(job.client_location.clone())),
        field("Added", job.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()),
        field("Skills", {
            let skills = job.skills_display();
            if skills.is_empty() {
                "None listed".to_string()
            } else {
                skills
            }
        }),
        Line::from(""),
        Line::from(Span::styled("Description", label)),
    ];
    lines.extend(job.description.lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Original posting", label)));
    lines.extend(job.raw_text.lines().map(|l| Line::from(l.to_string())));

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.detail.scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Job #{}", job.id)),
        );
    frame.render_widget(detail, area);
}

fn format_date(job: &Job) -> String {
    job.created_at.with_timezone(&Local).format("%Y-%m-%d").to_string()
}
