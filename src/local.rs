//! Offline gateway backed by JSONL files.
//!
//! Serves the same [`Gateway`] trait as the HTTP client from append-only
//! files under a data directory, so the CLI and TUI can be demoed and
//! integration-tested without a backend:
//!
//! ```text
//! <data-dir>/
//!   organizations.jsonl
//!   tasks.jsonl
//!   comments.jsonl
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::client::{Gateway, NewComment};
use crate::comment::CommentRecord;
use crate::error::{Error, Result};
use crate::org::OrganizationRecord;
use crate::task::{TaskRecord, TaskStatus};

const ORGANIZATIONS_FILE: &str = "organizations.jsonl";
const TASKS_FILE: &str = "tasks.jsonl";
const COMMENTS_FILE: &str = "comments.jsonl";

/// JSONL-backed gateway rooted at a data directory.
pub struct LocalGateway {
    dir: PathBuf,
}

impl LocalGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn organizations_file(&self) -> PathBuf {
        self.dir.join(ORGANIZATIONS_FILE)
    }

    fn tasks_file(&self) -> PathBuf {
        self.dir.join(TASKS_FILE)
    }

    fn comments_file(&self) -> PathBuf {
        self.dir.join(COMMENTS_FILE)
    }

    fn require_organization(&self, slug: &str) -> Result<OrganizationRecord> {
        let organizations: Vec<OrganizationRecord> = read_jsonl(&self.organizations_file())?;
        organizations
            .into_iter()
            .find(|org| org.slug == slug)
            .ok_or_else(|| Error::OrganizationNotFound(slug.to_string()))
    }

    fn scoped_tasks(&self, slug: &str) -> Result<Vec<LocalTask>> {
        self.require_organization(slug)?;
        let tasks: Vec<LocalTask> = read_jsonl(&self.tasks_file())?;
        Ok(tasks
            .into_iter()
            .filter(|task| task.organization_slug == slug)
            .collect())
    }
}

/// Task row as stored on disk: the wire record plus its tenant scope.
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
struct LocalTask {
    organization_slug: String,
    #[serde(flatten)]
    record: TaskRecord,
}

impl Gateway for LocalGateway {
    fn organizations(&self) -> Result<Vec<OrganizationRecord>> {
        read_jsonl(&self.organizations_file())
    }

    fn tasks(&self, organization_slug: &str, project_id: Option<&str>) -> Result<Vec<TaskRecord>> {
        let comments: Vec<CommentRecord> = read_jsonl(&self.comments_file())?;
        let mut tasks: Vec<TaskRecord> = self
            .scoped_tasks(organization_slug)?
            .into_iter()
            .map(|task| task.record)
            .collect();
        if let Some(project_id) = project_id {
            tasks.retain(|task| task.project_id == project_id);
        }
        for task in &mut tasks {
            task.comment_count = comments
                .iter()
                .filter(|comment| comment.task_id == task.id)
                .count() as u32;
        }
        // Newest first, matching the backend's default ordering.
        tasks.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(tasks)
    }

    fn task_comments(
        &self,
        task_id: &str,
        organization_slug: &str,
    ) -> Result<Vec<CommentRecord>> {
        let tasks = self.scoped_tasks(organization_slug)?;
        if !tasks.iter().any(|task| task.record.id == task_id) {
            return Err(Error::TaskNotFound(task_id.to_string()));
        }

        let comments: Vec<CommentRecord> = read_jsonl(&self.comments_file())?;
        let mut comments: Vec<CommentRecord> = comments
            .into_iter()
            .filter(|comment| comment.task_id == task_id)
            .collect();
        // Newest first, so a re-fetch agrees with the local merge-prepend.
        comments.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(comments)
    }

    fn create_comment(&self, input: &NewComment) -> Result<CommentRecord> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(Error::SubmitFailed("content cannot be empty".to_string()));
        }
        let author_email = input.author_email.trim();
        if author_email.is_empty() {
            return Err(Error::SubmitFailed(
                "author email cannot be empty".to_string(),
            ));
        }

        let tasks = self.scoped_tasks(&input.organization_slug)?;
        if !tasks.iter().any(|task| task.record.id == input.task_id) {
            return Err(Error::TaskNotFound(input.task_id.clone()));
        }

        let comment = CommentRecord {
            id: Uuid::new_v4().to_string(),
            task_id: input.task_id.clone(),
            content: content.to_string(),
            author_email: author_email.to_string(),
            author_display_name: None,
            created_at: Utc::now(),
        };
        append_jsonl(&self.comments_file(), &comment)?;
        Ok(comment)
    }
}

/// Summary of seeded demo data.
#[derive(Debug, Serialize)]
pub struct SeedSummary {
    pub organization_slug: String,
    pub tasks: usize,
    pub comments: usize,
}

/// Seed a data directory with a demo organization, a handful of tasks in
/// each status bucket, and a short comment thread.
pub fn seed_demo_data(dir: &Path) -> Result<SeedSummary> {
    fs::create_dir_all(dir)?;
    let gateway = LocalGateway::new(dir);

    let org = OrganizationRecord {
        id: "org-1".to_string(),
        slug: "acme".to_string(),
        name: "Acme".to_string(),
        contact_email: "ops@acme.example.com".to_string(),
    };
    append_jsonl(&gateway.organizations_file(), &org)?;

    let now = Utc::now();
    let tasks = [
        ("t-1", "Design the billing schema", TaskStatus::Todo, None),
        (
            "t-2",
            "Wire up invoice export",
            TaskStatus::InProgress,
            Some("jane.smith@example.com"),
        ),
        (
            "t-3",
            "Fix the signup redirect",
            TaskStatus::InProgress,
            Some("bob_o.neil@example.com"),
        ),
        ("t-4", "Ship the onboarding email", TaskStatus::Done, None),
    ];
    for (idx, (id, title, status, assignee)) in tasks.iter().enumerate() {
        let created = now - chrono::Duration::hours((tasks.len() - idx) as i64);
        let task = LocalTask {
            organization_slug: org.slug.clone(),
            record: TaskRecord {
                id: (*id).to_string(),
                project_id: "p-1".to_string(),
                title: (*title).to_string(),
                description: String::new(),
                status: *status,
                assignee_email: assignee.map(str::to_string),
                due_date: None,
                created_at: created,
                updated_at: created,
                comment_count: 0,
            },
        };
        append_jsonl(&gateway.tasks_file(), &task)?;
    }

    let comments = [
        ("c-1", "t-2", "jane.smith@example.com", "Export format agreed with finance."),
        ("c-2", "t-2", "bob_o.neil@example.com", "CSV first, PDF can wait."),
    ];
    for (idx, (id, task_id, author, content)) in comments.iter().enumerate() {
        let comment = CommentRecord {
            id: (*id).to_string(),
            task_id: (*task_id).to_string(),
            content: (*content).to_string(),
            author_email: (*author).to_string(),
            author_display_name: None,
            created_at: now - chrono::Duration::minutes((comments.len() - idx) as i64 * 30),
        };
        append_jsonl(&gateway.comments_file(), &comment)?;
    }

    Ok(SeedSummary {
        organization_slug: org.slug,
        tasks: tasks.len(),
        comments: comments.len(),
    })
}

fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        records.push(serde_json::from_str(trimmed)?);
    }
    Ok(records)
}

fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let serialized = serde_json::to_vec(record)?;
    file.write_all(&serialized)?;
    file.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_dir_serves_scoped_tasks_and_comments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let summary = seed_demo_data(dir.path()).expect("seed");
        assert_eq!(summary.organization_slug, "acme");

        let gateway = LocalGateway::new(dir.path());
        let tasks = gateway.tasks("acme", None).expect("tasks");
        assert_eq!(tasks.len(), summary.tasks);
        let with_comments = tasks.iter().find(|task| task.id == "t-2").expect("t-2");
        assert_eq!(with_comments.comment_count, 2);

        let comments = gateway.task_comments("t-2", "acme").expect("comments");
        assert_eq!(comments.len(), 2);
        // Newest first.
        assert!(comments[0].created_at >= comments[1].created_at);
    }

    #[test]
    fn unknown_organization_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_demo_data(dir.path()).expect("seed");

        let gateway = LocalGateway::new(dir.path());
        let err = gateway.tasks("globex", None).expect_err("unknown org");
        assert!(matches!(err, Error::OrganizationNotFound(_)));
    }

    #[test]
    fn create_appends_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_demo_data(dir.path()).expect("seed");
        let gateway = LocalGateway::new(dir.path());

        let created = gateway
            .create_comment(&NewComment {
                task_id: "t-1".to_string(),
                content: "kickoff notes attached".to_string(),
                author_email: "carol@example.com".to_string(),
                organization_slug: "acme".to_string(),
            })
            .expect("create");

        let comments = gateway.task_comments("t-1", "acme").expect("comments");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, created.id);
    }

    #[test]
    fn create_for_missing_task_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_demo_data(dir.path()).expect("seed");
        let gateway = LocalGateway::new(dir.path());

        let err = gateway
            .create_comment(&NewComment {
                task_id: "t-999".to_string(),
                content: "hello".to_string(),
                author_email: "carol@example.com".to_string(),
                organization_slug: "acme".to_string(),
            })
            .expect_err("missing task");
        assert!(matches!(err, Error::TaskNotFound(_)));
    }
}
