//! Comment records, the keyed comment cache, and the store adapter.
//!
//! The cache is an explicit map from `(task_id, organization_slug)` to the
//! ordered comment list for that key. Fetches go through a ticket protocol
//! so a stale in-flight response can never overwrite a newer one, and a
//! successful create is reconciled locally with a merge-prepend instead of a
//! re-fetch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::{Gateway, NewComment};
use crate::error::{Error, Result};

/// A comment as returned by the backend. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: String,
    pub task_id: String,
    pub content: String,
    pub author_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Cache key scoping a comment list to one task in one organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentKey {
    pub task_id: String,
    pub slug: String,
}

impl CommentKey {
    pub fn new(task_id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            slug: slug.into(),
        }
    }
}

/// Handle for one in-flight fetch. Must be redeemed through
/// [`CommentCache::apply_fetch`]; a ticket older than the last applied one
/// for its key is dropped on redemption.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    key: CommentKey,
    seq: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &CommentKey {
        &self.key
    }
}

/// Keyed comment cache with last-write-wins fetch sequencing.
#[derive(Debug, Default)]
pub struct CommentCache {
    entries: HashMap<CommentKey, Vec<CommentRecord>>,
    issued_seq: HashMap<CommentKey, u64>,
    applied_seq: HashMap<CommentKey, u64>,
}

impl CommentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for `key`. Any cached list stays visible while the
    /// fetch is in flight (cache-and-network).
    pub fn begin_fetch(&mut self, key: &CommentKey) -> FetchTicket {
        let seq = self.issued_seq.entry(key.clone()).or_insert(0);
        *seq += 1;
        FetchTicket {
            key: key.clone(),
            seq: *seq,
        }
    }

    /// Install a fetch result. Returns false (and leaves the cache
    /// untouched) when a later-issued fetch for the same key already
    /// completed.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, comments: Vec<CommentRecord>) -> bool {
        let applied = self.applied_seq.get(&ticket.key).copied().unwrap_or(0);
        if ticket.seq <= applied {
            return false;
        }
        self.applied_seq.insert(ticket.key.clone(), ticket.seq);
        self.entries.insert(ticket.key, comments);
        true
    }

    /// Prepend a freshly created comment into the cached list for `key`.
    /// No-op when the key was never loaded; the next fetch picks it up.
    pub fn merge_prepend(&mut self, key: &CommentKey, comment: CommentRecord) -> bool {
        match self.entries.get_mut(key) {
            Some(list) => {
                list.insert(0, comment);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &CommentKey) -> Option<&[CommentRecord]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn is_loaded(&self, key: &CommentKey) -> bool {
        self.entries.contains_key(key)
    }
}

/// Store adapter: validation guards, gateway calls, cache reconciliation.
pub struct CommentStore {
    gateway: Box<dyn Gateway>,
    cache: CommentCache,
}

impl CommentStore {
    pub fn new(gateway: Box<dyn Gateway>) -> Self {
        Self {
            gateway,
            cache: CommentCache::new(),
        }
    }

    pub fn cache(&self) -> &CommentCache {
        &self.cache
    }

    pub fn cached(&self, key: &CommentKey) -> Option<&[CommentRecord]> {
        self.cache.get(key)
    }

    /// Fetch the comment list for a task. Skipped entirely (no gateway
    /// call) when no organization slug is available.
    pub fn list(&mut self, task_id: &str, slug: &str) -> Result<Vec<CommentRecord>> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(Error::NoOrganization);
        }

        let key = CommentKey::new(task_id, slug);
        let ticket = self.cache.begin_fetch(&key);
        match self.gateway.task_comments(task_id, slug) {
            Ok(comments) => {
                self.cache.apply_fetch(ticket, comments.clone());
                Ok(comments)
            }
            Err(err) => {
                warn!(task_id, slug, "comment fetch failed: {err}");
                Err(Error::FetchFailed(err.to_string()))
            }
        }
    }

    /// Create a comment. Blank content or author email never reaches the
    /// gateway; on success the cached list for the key is updated in place.
    pub fn create(&mut self, input: &NewComment) -> Result<CommentRecord> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(Error::ValidationBlocked { field: "content" });
        }
        let author_email = input.author_email.trim();
        if author_email.is_empty() {
            return Err(Error::ValidationBlocked {
                field: "author email",
            });
        }
        let slug = input.organization_slug.trim();
        if slug.is_empty() {
            return Err(Error::NoOrganization);
        }

        let trimmed = NewComment {
            task_id: input.task_id.clone(),
            content: content.to_string(),
            author_email: author_email.to_string(),
            organization_slug: slug.to_string(),
        };

        match self.gateway.create_comment(&trimmed) {
            Ok(comment) => {
                let key = CommentKey::new(&trimmed.task_id, slug);
                self.cache.merge_prepend(&key, comment.clone());
                Ok(comment)
            }
            Err(err) => {
                // The cache is untouched; the caller keeps its form state
                // and may resubmit.
                warn!(task_id = %trimmed.task_id, "comment submit failed: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::org::OrganizationRecord;
    use crate::task::TaskRecord;

    fn comment(id: &str, content: &str) -> CommentRecord {
        CommentRecord {
            id: id.to_string(),
            task_id: "t-1".to_string(),
            content: content.to_string(),
            author_email: "jane.smith@example.com".to_string(),
            author_display_name: None,
            created_at: "2026-08-27T10:00:00Z".parse().expect("valid timestamp"),
        }
    }

    #[derive(Default)]
    struct Recorder {
        list_calls: AtomicUsize,
        create_calls: AtomicUsize,
        created: Mutex<Vec<NewComment>>,
        fail_create: std::sync::atomic::AtomicBool,
    }

    struct MockGateway {
        recorder: Arc<Recorder>,
        comments: Vec<CommentRecord>,
    }

    impl Gateway for MockGateway {
        fn organizations(&self) -> Result<Vec<OrganizationRecord>> {
            Ok(Vec::new())
        }

        fn tasks(&self, _slug: &str, _project_id: Option<&str>) -> Result<Vec<TaskRecord>> {
            Ok(Vec::new())
        }

        fn task_comments(&self, _task_id: &str, _slug: &str) -> Result<Vec<CommentRecord>> {
            self.recorder.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.comments.clone())
        }

        fn create_comment(&self, input: &NewComment) -> Result<CommentRecord> {
            self.recorder.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.recorder.fail_create.load(Ordering::SeqCst) {
                return Err(Error::SubmitFailed("backend down".to_string()));
            }
            self.recorder
                .created
                .lock()
                .expect("lock")
                .push(input.clone());
            Ok(CommentRecord {
                id: "c-new".to_string(),
                task_id: input.task_id.clone(),
                content: input.content.clone(),
                author_email: input.author_email.clone(),
                author_display_name: None,
                created_at: "2026-08-27T11:00:00Z".parse().expect("valid timestamp"),
            })
        }
    }

    fn store_with(comments: Vec<CommentRecord>) -> (CommentStore, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let gateway = MockGateway {
            recorder: Arc::clone(&recorder),
            comments,
        };
        (CommentStore::new(Box::new(gateway)), recorder)
    }

    #[test]
    fn merge_prepend_is_noop_for_unloaded_key() {
        let mut cache = CommentCache::new();
        let key = CommentKey::new("t-1", "acme");
        assert!(!cache.merge_prepend(&key, comment("c-1", "hello")));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn merge_prepend_puts_new_comment_first() {
        let mut cache = CommentCache::new();
        let key = CommentKey::new("t-1", "acme");
        let ticket = cache.begin_fetch(&key);
        cache.apply_fetch(ticket, vec![comment("c-1", "older")]);

        assert!(cache.merge_prepend(&key, comment("c-2", "newer")));
        let ids: Vec<&str> = cache
            .get(&key)
            .expect("loaded")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c-2", "c-1"]);
    }

    #[test]
    fn stale_fetch_result_is_dropped() {
        let mut cache = CommentCache::new();
        let key = CommentKey::new("t-1", "acme");

        let old_ticket = cache.begin_fetch(&key);
        let new_ticket = cache.begin_fetch(&key);

        assert!(cache.apply_fetch(new_ticket, vec![comment("c-2", "fresh")]));
        assert!(!cache.apply_fetch(old_ticket, vec![comment("c-1", "stale")]));

        let ids: Vec<&str> = cache
            .get(&key)
            .expect("loaded")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c-2"]);
    }

    #[test]
    fn out_of_order_completion_converges_to_latest() {
        let mut cache = CommentCache::new();
        let key = CommentKey::new("t-1", "acme");

        let old_ticket = cache.begin_fetch(&key);
        let new_ticket = cache.begin_fetch(&key);

        // Older response lands first, then the newer one replaces it.
        assert!(cache.apply_fetch(old_ticket, vec![comment("c-1", "stale")]));
        assert!(cache.apply_fetch(new_ticket, vec![comment("c-2", "fresh")]));
        assert_eq!(cache.get(&key).expect("loaded")[0].id, "c-2");
    }

    #[test]
    fn fetch_for_one_key_never_touches_another() {
        let mut cache = CommentCache::new();
        let acme = CommentKey::new("t-1", "acme");
        let globex = CommentKey::new("t-1", "globex");

        let ticket = cache.begin_fetch(&acme);
        cache.apply_fetch(ticket, vec![comment("c-1", "acme data")]);

        let ticket = cache.begin_fetch(&globex);
        cache.apply_fetch(ticket, Vec::new());

        assert_eq!(cache.get(&acme).expect("loaded").len(), 1);
        assert_eq!(cache.get(&globex).expect("loaded").len(), 0);
    }

    #[test]
    fn list_without_organization_issues_no_call() {
        let (mut store, recorder) = store_with(vec![comment("c-1", "hello")]);
        let err = store.list("t-1", "  ").expect_err("precondition");
        assert!(matches!(err, Error::NoOrganization));
        assert_eq!(recorder.list_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn list_populates_cache() {
        let (mut store, recorder) = store_with(vec![comment("c-1", "hello")]);
        let comments = store.list("t-1", "acme").expect("fetch");
        assert_eq!(comments.len(), 1);
        assert_eq!(recorder.list_calls.load(Ordering::SeqCst), 1);

        let key = CommentKey::new("t-1", "acme");
        assert_eq!(store.cached(&key).expect("cached").len(), 1);
    }

    #[test]
    fn create_trims_and_issues_exactly_one_call() {
        let (mut store, recorder) = store_with(vec![comment("c-1", "hello")]);
        store.list("t-1", "acme").expect("fetch");

        let created = store
            .create(&NewComment {
                task_id: "t-1".to_string(),
                content: "  ship it  ".to_string(),
                author_email: " jane.smith@example.com ".to_string(),
                organization_slug: "acme".to_string(),
            })
            .expect("create");

        assert_eq!(recorder.create_calls.load(Ordering::SeqCst), 1);
        // No re-fetch after the mutation.
        assert_eq!(recorder.list_calls.load(Ordering::SeqCst), 1);

        let sent = recorder.created.lock().expect("lock");
        assert_eq!(sent[0].content, "ship it");
        assert_eq!(sent[0].author_email, "jane.smith@example.com");

        // New entry appears at the head of the cached list.
        let key = CommentKey::new("t-1", "acme");
        let cached = store.cached(&key).expect("cached");
        assert_eq!(cached[0].id, created.id);
        assert_eq!(cached.len(), 2);
    }

    #[test]
    fn blank_fields_block_submission_locally() {
        let (mut store, recorder) = store_with(Vec::new());
        for (content, email) in [("   ", "jane@x.io"), ("hello", "   ")] {
            let err = store
                .create(&NewComment {
                    task_id: "t-1".to_string(),
                    content: content.to_string(),
                    author_email: email.to_string(),
                    organization_slug: "acme".to_string(),
                })
                .expect_err("blocked");
            assert!(matches!(err, Error::ValidationBlocked { .. }));
        }
        assert_eq!(recorder.create_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_create_leaves_cache_intact() {
        let (mut store, recorder) = store_with(vec![comment("c-1", "hello")]);
        store.list("t-1", "acme").expect("fetch");
        recorder.fail_create.store(true, Ordering::SeqCst);

        let err = store
            .create(&NewComment {
                task_id: "t-1".to_string(),
                content: "new".to_string(),
                author_email: "jane@x.io".to_string(),
                organization_slug: "acme".to_string(),
            })
            .expect_err("submit fails");
        assert!(matches!(err, Error::SubmitFailed(_)));

        let key = CommentKey::new("t-1", "acme");
        assert_eq!(store.cached(&key).expect("cached").len(), 1);
    }
}
