use chrono::{DateTime, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::comment::CommentRecord;
use crate::format::{derive_display_name, derive_initials, format_relative_time};
use crate::task::{TaskRecord, TaskStatus, ViewMode};

use super::app::{AppState, ThreadPhase};
use super::form::{CommentForm, FormField};

const SKELETON_ROWS: usize = 3;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_title(frame, app, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    if let Some(form) = app.form.as_ref() {
        render_form_modal(frame, area, form);
    }
}

fn render_title(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![Span::styled(
        "taskboard",
        Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
    )];
    if let Some(org) = app.org.current_organization() {
        spans.push(Span::styled("  ", Style::default()));
        spans.push(Span::styled(
            org.name.clone(),
            Style::default().fg(COLOR_ACCENT),
        ));
        spans.push(Span::styled(
            format!("  ({})", org.slug),
            Style::default().fg(COLOR_MUTED_DARK),
        ));
    }
    let mode = match app.view_mode {
        ViewMode::Board => "board",
        ViewMode::List => "list",
    };
    spans.push(Span::styled(
        format!("  [{mode}]"),
        Style::default().fg(COLOR_MUTED),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_body(frame: &mut Frame, app: &AppState, area: Rect) {
    if app.org.is_loading() {
        render_notice(frame, area, "Loading organizations...", COLOR_MUTED);
        return;
    }
    if let Some(error) = app.org.error() {
        render_notice(
            frame,
            area,
            &format!("Could not load organizations: {error}\n\nPress r to retry."),
            COLOR_ERROR,
        );
        return;
    }
    if app.org.current_slug().is_none() {
        render_notice(
            frame,
            area,
            "No organization selected.\n\nSet organization.slug in .taskboard.toml or pass --org.",
            COLOR_WARNING,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(area);

    match app.view_mode {
        ViewMode::Board => render_board(frame, app, chunks[0]),
        ViewMode::List => render_list(frame, app, chunks[0]),
    }
    render_thread(frame, app, chunks[1]);
}

fn render_notice(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let widget = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_board(frame: &mut Frame, app: &AppState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    // Selection indices run down the To Do column, then In Progress, then
    // Done, matching AppState::visible_tasks.
    let mut offset = 0usize;
    for (idx, status) in TaskStatus::ALL.iter().enumerate() {
        let bucket = app.board.bucket(*status);
        render_column(frame, app, columns[idx], *status, bucket, offset);
        offset += bucket.len();
    }
}

fn render_column(
    frame: &mut Frame,
    app: &AppState,
    area: Rect,
    status: TaskStatus,
    bucket: &[TaskRecord],
    offset: usize,
) {
    let title = bucket_header(status, bucket.len());
    let mut lines: Vec<Line> = Vec::new();

    if let Some(error) = app.tasks_error.as_ref() {
        lines.push(Line::from(Span::styled(
            format!("load failed: {error}"),
            Style::default().fg(COLOR_ERROR),
        )));
        lines.push(Line::from(Span::styled(
            "r to retry",
            Style::default().fg(COLOR_MUTED),
        )));
    } else if !app.tasks_loaded {
        for line in skeleton_lines(SKELETON_ROWS) {
            lines.push(Line::from(Span::styled(
                line,
                Style::default().fg(COLOR_BG_MUTED),
            )));
        }
    } else if bucket.is_empty() {
        lines.push(Line::from(Span::styled(
            "nothing here",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    } else {
        for (idx, task) in bucket.iter().enumerate() {
            lines.push(task_line(task, app.selected == Some(offset + idx)));
        }
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(status_color(status))),
    );
    frame.render_widget(widget, area);
}

fn render_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(error) = app.tasks_error.as_ref() {
        lines.push(Line::from(Span::styled(
            format!("load failed: {error}  (r to retry)"),
            Style::default().fg(COLOR_ERROR),
        )));
    } else if !app.tasks_loaded {
        for line in skeleton_lines(SKELETON_ROWS * 2) {
            lines.push(Line::from(Span::styled(
                line,
                Style::default().fg(COLOR_BG_MUTED),
            )));
        }
    } else if app.tasks.is_empty() {
        lines.push(Line::from(Span::styled(
            "no tasks in this organization",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    } else {
        for (idx, task) in app.tasks.iter().enumerate() {
            let selected = app.selected == Some(idx);
            let marker = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(COLOR_TEXT)
            };
            lines.push(Line::from(vec![
                Span::styled(marker.to_string(), style),
                Span::styled(
                    format!("{:<11} ", task.status.label()),
                    Style::default().fg(status_color(task.status)),
                ),
                Span::styled(task.title.clone(), style),
                Span::styled(
                    format!("  ({})", task.comment_count),
                    Style::default().fg(COLOR_MUTED_DARK),
                ),
            ]));
        }
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Tasks ({})", app.tasks.len())),
    );
    frame.render_widget(widget, area);
}

fn render_thread(frame: &mut Frame, app: &AppState, area: Rect) {
    let (title, lines) = thread_body(&app.thread_phase(), Utc::now());
    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(COLOR_ACCENT)),
    );
    frame.render_widget(widget, area);
}

fn thread_body(phase: &ThreadPhase, now: DateTime<Utc>) -> (String, Vec<Line<'static>>) {
    let mut title = "Comments".to_string();
    let mut lines: Vec<Line<'static>> = Vec::new();

    match phase {
        ThreadPhase::NoOrganization => {
            lines.push(muted_line("no organization selected"));
        }
        ThreadPhase::NoSelection => {
            lines.push(muted_line("select a task to see its thread"));
        }
        ThreadPhase::Loading => {
            for line in skeleton_lines(SKELETON_ROWS) {
                lines.push(Line::from(Span::styled(
                    line,
                    Style::default().fg(COLOR_BG_MUTED),
                )));
            }
        }
        ThreadPhase::Failed(error) => {
            lines.push(Line::from(Span::styled(
                format!("could not load comments: {error}"),
                Style::default().fg(COLOR_ERROR),
            )));
            lines.push(muted_line("r to retry"));
        }
        ThreadPhase::Loaded(comments) => {
            title = thread_header(comments.len());
            if comments.is_empty() {
                lines.push(muted_line(EMPTY_THREAD_MESSAGE));
            } else {
                for comment in comments.iter() {
                    push_comment_lines(&mut lines, comment, now);
                }
            }
        }
    }

    (title, lines)
}

fn push_comment_lines(lines: &mut Vec<Line>, comment: &CommentRecord, now: DateTime<Utc>) {
    lines.push(Line::from(vec![
        Span::styled(
            format!("[{}] ", comment_initials(comment)),
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            comment_author(comment),
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", format_relative_time(comment.created_at, now)),
            Style::default().fg(COLOR_MUTED),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        comment.created_at.to_rfc3339(),
        Style::default().fg(COLOR_MUTED_DARK),
    )));
    // Line breaks in the content are preserved verbatim.
    for content_line in comment.content.split('\n') {
        lines.push(Line::from(Span::styled(
            content_line.to_string(),
            Style::default().fg(COLOR_TEXT),
        )));
    }
    lines.push(Line::from(""));
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let line = if let Some(message) = app.status_message.as_ref() {
        Line::from(vec![
            Span::styled(message.clone(), Style::default().fg(COLOR_WARNING)),
            Span::styled(
                format!("  {}", app.footer_hint()),
                Style::default().fg(COLOR_MUTED_DARK),
            ),
        ])
    } else {
        Line::from(Span::styled(
            app.footer_hint(),
            Style::default().fg(COLOR_MUTED),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_form_modal(frame: &mut Frame, area: Rect, form: &CommentForm) {
    let modal = centered_rect(area, 60, 9);
    frame.render_widget(Clear, modal);

    let field_style = |field: FormField| {
        if form.active_field() == field && !form.is_submitting() {
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_MUTED)
        }
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Comment: ", field_style(FormField::Content)),
            Span::styled(form.content().to_string(), Style::default().fg(COLOR_TEXT)),
        ]),
        Line::from(vec![
            Span::styled("Author:  ", field_style(FormField::AuthorEmail)),
            Span::styled(
                form.author_email().to_string(),
                Style::default().fg(COLOR_TEXT),
            ),
        ]),
        Line::from(""),
    ];
    if form.is_submitting() {
        lines.push(Line::from(Span::styled(
            "submitting...",
            Style::default().fg(COLOR_WARNING),
        )));
    } else if form.is_valid() {
        lines.push(Line::from(Span::styled(
            "enter to submit",
            Style::default().fg(COLOR_SUCCESS),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "both fields are required",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Add comment")
            .border_style(Style::default().fg(COLOR_ACCENT)),
    );
    frame.render_widget(widget, modal);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn task_line(task: &TaskRecord, selected: bool) -> Line<'static> {
    let marker = if selected { "> " } else { "  " };
    let style = if selected {
        Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_TEXT)
    };
    Line::from(vec![
        Span::styled(marker.to_string(), style),
        Span::styled(task.title.clone(), style),
        Span::styled(
            format!("  ({})", task.comment_count),
            Style::default().fg(COLOR_MUTED_DARK),
        ),
    ])
}

fn muted_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(COLOR_MUTED_DARK),
    ))
}

const EMPTY_THREAD_MESSAGE: &str = "No comments yet. Press c to add the first one.";

fn skeleton_lines(rows: usize) -> Vec<String> {
    std::iter::repeat("▒▒▒▒▒▒▒▒▒▒▒▒".to_string())
        .take(rows)
        .collect()
}

fn bucket_header(status: TaskStatus, count: usize) -> String {
    format!("{} ({count})", status.label())
}

fn thread_header(count: usize) -> String {
    format!("Comments ({count})")
}

fn comment_author(comment: &CommentRecord) -> String {
    derive_display_name(&comment.author_email, comment.author_display_name.as_deref())
}

fn comment_initials(comment: &CommentRecord) -> String {
    derive_initials(&comment.author_email, comment.author_display_name.as_deref())
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => COLOR_MUTED,
        TaskStatus::InProgress => COLOR_WARNING,
        TaskStatus::Done => COLOR_SUCCESS,
    }
}
