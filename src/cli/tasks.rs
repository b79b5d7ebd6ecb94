//! taskboard tasks subcommand implementations
//!
//! Both commands fetch the same organization-scoped task set; board groups
//! it into the three status columns, list prints it flat.

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::task::{Board, TaskRecord, TaskStatus};

use super::CommandContext;

#[derive(serde::Serialize)]
struct BoardReport {
    organization: String,
    todo: Vec<TaskRecord>,
    in_progress: Vec<TaskRecord>,
    done: Vec<TaskRecord>,
    total: usize,
}

#[derive(serde::Serialize)]
struct ListReport {
    organization: String,
    tasks: Vec<TaskRecord>,
    total: usize,
}

/// Run the tasks board command
pub fn run_board(context: CommandContext, project: Option<String>) -> Result<()> {
    let slug = context.require_organization()?;
    let tasks = context.gateway.tasks(slug, project.as_deref())?;
    let total = tasks.len();
    let board = Board::partition(tasks);

    let mut human = HumanOutput::new(format!("Board for {slug}"));
    human.push_summary("tasks", total.to_string());
    for status in TaskStatus::ALL {
        let bucket = board.bucket(status);
        human.push_summary(status.label(), bucket.len().to_string());
        for task in bucket {
            human.push_detail(task_row(task, status));
        }
    }
    if board.is_empty() {
        human.push_detail("no tasks in this organization".to_string());
    }

    let report = BoardReport {
        organization: slug.to_string(),
        todo: board.todo,
        in_progress: board.in_progress,
        done: board.done,
        total,
    };
    emit_success(context.output, "tasks board", &report, Some(&human))
}

/// Run the tasks list command
pub fn run_list(context: CommandContext, project: Option<String>) -> Result<()> {
    let slug = context.require_organization()?;
    let tasks = context.gateway.tasks(slug, project.as_deref())?;

    let mut human = HumanOutput::new(format!("Tasks in {slug}"));
    human.push_summary("total", tasks.len().to_string());
    for task in &tasks {
        human.push_detail(task_row(task, task.status));
    }
    if tasks.is_empty() {
        human.push_detail("no tasks in this organization".to_string());
    }

    let report = ListReport {
        organization: slug.to_string(),
        total: tasks.len(),
        tasks,
    };
    emit_success(context.output, "tasks list", &report, Some(&human))
}

fn task_row(task: &TaskRecord, status: TaskStatus) -> String {
    let mut row = format!("[{}] {} - {}", task.id, status.label(), task.title);
    if let Some(assignee) = task.assignee_email.as_deref() {
        row.push_str(&format!(" ({assignee})"));
    }
    row.push_str(&format!(" [{} comments]", task.comment_count));
    row
}
