//! GraphQL data layer.
//!
//! The backend is reachable through the [`Gateway`] trait; everything above
//! it (cache, UI, CLI) is transport-agnostic. [`HttpGateway`] posts
//! `{query, variables}` envelopes to a GraphQL endpoint;
//! [`crate::local::LocalGateway`] serves the same trait from JSONL files for
//! demos and tests.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::comment::CommentRecord;
use crate::error::{Error, Result};
use crate::org::OrganizationRecord;
use crate::task::TaskRecord;

const HTTP_TIMEOUT_SECS: u64 = 30;

pub const ORGANIZATIONS_QUERY: &str = "\
query Organizations {
  organizations { id slug name contactEmail }
}";

pub const TASKS_QUERY: &str = "\
query Tasks($organizationSlug: String!, $projectId: ID) {
  tasks(organizationSlug: $organizationSlug, projectId: $projectId) {
    id projectId title description status assigneeEmail dueDate
    createdAt updatedAt commentCount
  }
}";

pub const TASK_COMMENTS_QUERY: &str = "\
query TaskComments($taskId: ID!, $organizationSlug: String!) {
  taskComments(taskId: $taskId, organizationSlug: $organizationSlug) {
    id taskId content authorEmail authorDisplayName createdAt
  }
}";

pub const CREATE_COMMENT_MUTATION: &str = "\
mutation CreateTaskComment($taskId: ID!, $content: String!, $authorEmail: String!, $organizationSlug: String!) {
  createTaskComment(taskId: $taskId, content: $content, authorEmail: $authorEmail, organizationSlug: $organizationSlug) {
    success
    errors
    comment { id taskId content authorEmail authorDisplayName createdAt }
  }
}";

/// Input for the create-comment mutation. Fields are used as-is; trimming
/// and validation happen in [`crate::comment::CommentStore`] before any
/// gateway call is issued.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub task_id: String,
    pub content: String,
    pub author_email: String,
    pub organization_slug: String,
}

/// Backend operations used by this client.
pub trait Gateway: Send {
    fn organizations(&self) -> Result<Vec<OrganizationRecord>>;

    fn tasks(&self, organization_slug: &str, project_id: Option<&str>) -> Result<Vec<TaskRecord>>;

    fn task_comments(&self, task_id: &str, organization_slug: &str)
        -> Result<Vec<CommentRecord>>;

    fn create_comment(&self, input: &NewComment) -> Result<CommentRecord>;
}

#[derive(Serialize)]
struct GraphQlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationsData {
    organizations: Vec<OrganizationRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TasksData {
    tasks: Vec<TaskRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskCommentsData {
    task_comments: Vec<CommentRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentData {
    create_task_comment: CreateCommentPayload,
}

/// Mutation result envelope: `{ success, errors, comment }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentPayload {
    pub success: bool,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    #[serde(default)]
    pub comment: Option<CommentRecord>,
}

impl CreateCommentPayload {
    /// Collapse the payload into a created comment or a submit error.
    pub fn into_comment(self) -> Result<CommentRecord> {
        if self.success {
            // A successful payload without a comment object is a backend
            // contract violation; surface it rather than fabricating one.
            return self
                .comment
                .ok_or_else(|| Error::SubmitFailed("backend returned no comment".to_string()));
        }
        let reasons = self
            .errors
            .unwrap_or_default()
            .join("; ");
        if reasons.is_empty() {
            Err(Error::SubmitFailed("backend reported failure".to_string()))
        } else {
            Err(Error::SubmitFailed(reasons))
        }
    }
}

/// GraphQL-over-HTTP gateway.
pub struct HttpGateway {
    endpoint: String,
    http: reqwest::blocking::Client,
}

impl HttpGateway {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    fn post<V: Serialize, T: DeserializeOwned>(&self, query: &str, variables: V) -> Result<T> {
        let request = GraphQlRequest { query, variables };
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()?
            .error_for_status()?;
        let body: GraphQlResponse<T> = response.json()?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|err| err.message).collect();
            return Err(Error::Backend(messages.join("; ")));
        }
        body.data
            .ok_or_else(|| Error::Backend("response missing data".to_string()))
    }
}

impl Gateway for HttpGateway {
    fn organizations(&self) -> Result<Vec<OrganizationRecord>> {
        let data: OrganizationsData = self.post(ORGANIZATIONS_QUERY, json!({}))?;
        Ok(data.organizations)
    }

    fn tasks(&self, organization_slug: &str, project_id: Option<&str>) -> Result<Vec<TaskRecord>> {
        let data: TasksData = self.post(
            TASKS_QUERY,
            json!({
                "organizationSlug": organization_slug,
                "projectId": project_id,
            }),
        )?;
        Ok(data.tasks)
    }

    fn task_comments(
        &self,
        task_id: &str,
        organization_slug: &str,
    ) -> Result<Vec<CommentRecord>> {
        let data: TaskCommentsData = self.post(
            TASK_COMMENTS_QUERY,
            json!({
                "taskId": task_id,
                "organizationSlug": organization_slug,
            }),
        )?;
        Ok(data.task_comments)
    }

    fn create_comment(&self, input: &NewComment) -> Result<CommentRecord> {
        let data: CreateCommentData = self.post(CREATE_COMMENT_MUTATION, input)?;
        data.create_task_comment.into_comment()
    }
}
