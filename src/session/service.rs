//! Session service coordinating extraction, the corpus builder, retrieval, and storage.

use crate::{
    config::Config,
    corpus,
    extraction::{ExtractorRegistry, UploadedFile},
    metrics::{ChatMetrics, MetricsSnapshot},
    retrieval::{Query, answer_query},
    session::types::{AskOutcome, DocumentPreview, ServiceError, SessionContext, UploadOutcome},
    storage::{ChatMessage, Role, SessionStore},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Owns the extractor registry, the session store, and activity metrics.
///
/// Construct once near process start and share it through an `Arc`. Every call takes an explicit
/// [`SessionContext`]; there is no ambient "current user". Read-modify-write cycles on a user's
/// record are serialized per user, while extraction runs outside that lock.
pub struct ChatService<S> {
    store: S,
    extractors: ExtractorRegistry,
    metrics: Arc<ChatMetrics>,
    preview_chars: usize,
    user_locks: UserLocks,
}

/// Per-user write locks. An entry exists only while a call holds or waits on it.
#[derive(Default)]
struct UserLocks {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    async fn acquire(&self, user_id: &str) -> UserLockGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(user_id.to_string()).or_default().clone()
        };
        UserLockGuard {
            owner: self,
            user_id: user_id.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

struct UserLockGuard<'a> {
    owner: &'a UserLocks,
    user_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLockGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self
            .owner
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.guard.take();
        // The map's own clone is the last one: nobody else holds or waits on this user.
        if locks
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.user_id);
        }
    }
}

/// Abstraction over the session service used by external surfaces (HTTP).
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Extract a batch of files and replace the user's document with the result.
    async fn upload(
        &self,
        ctx: &SessionContext,
        files: Vec<UploadedFile>,
    ) -> Result<UploadOutcome, ServiceError>;

    /// Reset the user's document to empty, keeping the chat history.
    async fn clear_document(&self, ctx: &SessionContext) -> Result<(), ServiceError>;

    /// Preview the user's current document.
    async fn document_preview(&self, ctx: &SessionContext)
    -> Result<DocumentPreview, ServiceError>;

    /// Answer a question from the user's document and log the exchange.
    async fn ask(&self, ctx: &SessionContext, query: &str) -> Result<AskOutcome, ServiceError>;

    /// Return the user's chat log in order.
    async fn history(&self, ctx: &SessionContext) -> Result<Vec<ChatMessage>, ServiceError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl<S: SessionStore> ChatService<S> {
    /// Build a service from its collaborators.
    pub fn new(store: S, extractors: ExtractorRegistry, preview_chars: usize) -> Self {
        Self {
            store,
            extractors,
            metrics: Arc::new(ChatMetrics::new()),
            preview_chars,
            user_locks: UserLocks::default(),
        }
    }

    /// Build a service with the standard extractors configured from `config`.
    pub fn from_config(store: S, config: &Config) -> Self {
        tracing::info!(
            tesseract = %config.tesseract_path,
            ocr_language = %config.ocr_language,
            "Initializing extractors"
        );
        Self::new(
            store,
            ExtractorRegistry::from_config(config),
            config.preview_chars,
        )
    }

    /// Extract every file, build the aggregated document, and store it.
    ///
    /// All files are extracted concurrently and joined before the corpus is built, so the
    /// document always reflects the complete batch in upload order. Failed files contribute
    /// empty text and are listed in the outcome.
    pub async fn upload(
        &self,
        ctx: &SessionContext,
        files: Vec<UploadedFile>,
    ) -> Result<UploadOutcome, ServiceError> {
        if files.is_empty() {
            return Err(ServiceError::NoFiles);
        }
        tracing::info!(user = ctx.user_id(), files = files.len(), "Processing upload");

        let fragments = self.extractors.extract_all(&files).await;
        let failed_files: Vec<String> = fragments
            .iter()
            .filter(|fragment| fragment.failed())
            .map(|fragment| fragment.file_name.clone())
            .collect();
        let document = corpus::build_document(fragments.iter().map(|fragment| &fragment.text));
        let characters = document.chars().count();
        let fingerprint = corpus::fingerprint(&document);
        let preview = corpus::preview(&document, self.preview_chars).to_string();

        {
            let _guard = self.user_locks.acquire(ctx.user_id()).await;
            let mut record = self.store.load(ctx.user_id()).await?;
            record.document = document;
            self.store.save(ctx.user_id(), record).await?;
        }

        self.metrics.record_upload(
            files.len() as u64,
            failed_files.len() as u64,
            characters as u64,
        );
        tracing::info!(
            user = ctx.user_id(),
            files = files.len(),
            failed = failed_files.len(),
            characters,
            fingerprint = %fingerprint,
            "Document loaded"
        );

        Ok(UploadOutcome {
            files: files.len(),
            failed_files,
            characters,
            fingerprint,
            preview,
        })
    }

    /// Reset the user's document to empty, keeping the chat history.
    pub async fn clear_document(&self, ctx: &SessionContext) -> Result<(), ServiceError> {
        let _guard = self.user_locks.acquire(ctx.user_id()).await;
        let mut record = self.store.load(ctx.user_id()).await?;
        record.document.clear();
        self.store.save(ctx.user_id(), record).await?;
        tracing::info!(user = ctx.user_id(), "Document cleared");
        Ok(())
    }

    /// Preview the user's current document.
    pub async fn document_preview(
        &self,
        ctx: &SessionContext,
    ) -> Result<DocumentPreview, ServiceError> {
        let record = self.store.load(ctx.user_id()).await?;
        Ok(DocumentPreview {
            loaded: !record.document.is_empty(),
            characters: record.document.chars().count(),
            preview: corpus::preview(&record.document, self.preview_chars).to_string(),
        })
    }

    /// Answer a question from the user's document and append both sides to the chat log.
    ///
    /// Blank queries are rejected before anything is recorded.
    pub async fn ask(&self, ctx: &SessionContext, query: &str) -> Result<AskOutcome, ServiceError> {
        let query = Query::new(query)?;

        let _guard = self.user_locks.acquire(ctx.user_id()).await;
        let mut record = self.store.load(ctx.user_id()).await?;

        let answer = answer_query(&record.document, &query);
        let kind = answer.kind();
        let reply = answer.to_string();

        record
            .history
            .push(ChatMessage::new(Role::User, query.text()));
        record.history.push(ChatMessage::new(Role::Bot, reply.clone()));
        self.store.save(ctx.user_id(), record).await?;

        self.metrics.record_answer(kind);
        tracing::info!(
            user = ctx.user_id(),
            words = query.words().len(),
            kind = ?kind,
            excerpts = answer.excerpts().len(),
            "Query answered"
        );

        Ok(AskOutcome {
            answer: reply,
            kind,
        })
    }

    /// Return the user's chat log in order.
    pub async fn history(&self, ctx: &SessionContext) -> Result<Vec<ChatMessage>, ServiceError> {
        Ok(self.store.load(ctx.user_id()).await?.history)
    }

    /// Return the current activity metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl<S: SessionStore> ChatApi for ChatService<S> {
    async fn upload(
        &self,
        ctx: &SessionContext,
        files: Vec<UploadedFile>,
    ) -> Result<UploadOutcome, ServiceError> {
        ChatService::upload(self, ctx, files).await
    }

    async fn clear_document(&self, ctx: &SessionContext) -> Result<(), ServiceError> {
        ChatService::clear_document(self, ctx).await
    }

    async fn document_preview(
        &self,
        ctx: &SessionContext,
    ) -> Result<DocumentPreview, ServiceError> {
        ChatService::document_preview(self, ctx).await
    }

    async fn ask(&self, ctx: &SessionContext, query: &str) -> Result<AskOutcome, ServiceError> {
        ChatService::ask(self, ctx, query).await
    }

    async fn history(&self, ctx: &SessionContext) -> Result<Vec<ChatMessage>, ServiceError> {
        ChatService::history(self, ctx).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        ChatService::metrics_snapshot(self)
    }
}
