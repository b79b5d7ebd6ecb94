//! taskboard comments subcommand implementations
//!
//! Threads go through [`CommentStore`] so the CLI enforces the same
//! preconditions as the interactive board: no organization means no
//! network call, and blank fields are rejected locally.

use chrono::Utc;

use crate::client::NewComment;
use crate::comment::{CommentRecord, CommentStore};
use crate::error::{Error, Result};
use crate::format::{derive_display_name, format_relative_time};
use crate::output::{emit_success, HumanOutput};

use super::CommandContext;

/// Options for the comments add command
pub struct AddOptions {
    pub task: String,
    pub message: String,
    pub author: Option<String>,
}

#[derive(serde::Serialize)]
struct ListReport {
    task: String,
    organization: String,
    comments: Vec<CommentRecord>,
    total: usize,
}

#[derive(serde::Serialize)]
struct AddReport {
    task: String,
    organization: String,
    comment: CommentRecord,
}

/// Run the comments list command
pub fn run_list(context: CommandContext, task: String) -> Result<()> {
    let slug = context.organization_slug.clone();
    let mut store = CommentStore::new(context.gateway);
    let comments = store.list(&task, &slug)?;

    let now = Utc::now();
    let mut human = HumanOutput::new(format!("Comments ({})", comments.len()));
    human.push_summary("task", task.clone());
    for comment in &comments {
        let author =
            derive_display_name(&comment.author_email, comment.author_display_name.as_deref());
        human.push_detail(format!(
            "{author}, {}: {}",
            format_relative_time(comment.created_at, now),
            comment.content
        ));
    }
    if comments.is_empty() {
        human.push_detail("no comments yet".to_string());
        human.push_next_step(format!(
            "taskboard comments add {task} --message \"...\""
        ));
    }

    let report = ListReport {
        task,
        organization: slug.trim().to_string(),
        total: comments.len(),
        comments,
    };
    emit_success(context.output, "comments list", &report, Some(&human))
}

/// Run the comments add command
pub fn run_add(context: CommandContext, options: AddOptions) -> Result<()> {
    let slug = context.organization_slug.clone();
    let author_email = options
        .author
        .unwrap_or_else(|| context.config.author.email.clone());
    if author_email.trim().is_empty() {
        return Err(Error::ValidationBlocked {
            field: "author email",
        });
    }

    let mut store = CommentStore::new(context.gateway);
    let comment = store.create(&NewComment {
        task_id: options.task.clone(),
        content: options.message,
        author_email,
        organization_slug: slug.clone(),
    })?;

    let mut human = HumanOutput::new("Comment added");
    human.push_summary("task", options.task.clone());
    human.push_summary("id", comment.id.clone());
    human.push_summary(
        "author",
        derive_display_name(&comment.author_email, comment.author_display_name.as_deref()),
    );
    human.push_next_step(format!("taskboard comments list {}", options.task));

    let report = AddReport {
        task: options.task,
        organization: slug.trim().to_string(),
        comment,
    };
    emit_success(context.output, "comments add", &report, Some(&human))
}
