use std::sync::atomic::{AtomicU64, Ordering};

use crate::retrieval::AnswerKind;

/// Thread-safe counters describing upload and query activity.
#[derive(Default)]
pub struct ChatMetrics {
    uploads: AtomicU64,
    files_extracted: AtomicU64,
    extraction_failures: AtomicU64,
    queries_answered: AtomicU64,
    fallback_answers: AtomicU64,
    last_document_chars: AtomicU64,
}

impl ChatMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed upload batch.
    pub fn record_upload(&self, files: u64, failures: u64, document_chars: u64) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
        self.files_extracted.fetch_add(files, Ordering::Relaxed);
        self.extraction_failures
            .fetch_add(failures, Ordering::Relaxed);
        self.last_document_chars
            .store(document_chars, Ordering::Relaxed);
    }

    /// Record an answered query and which branch produced it.
    pub fn record_answer(&self, kind: AnswerKind) {
        self.queries_answered.fetch_add(1, Ordering::Relaxed);
        if kind == AnswerKind::Fallback {
            self.fallback_answers.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let uploads = self.uploads.load(Ordering::Relaxed);
        MetricsSnapshot {
            uploads,
            files_extracted: self.files_extracted.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            queries_answered: self.queries_answered.load(Ordering::Relaxed),
            fallback_answers: self.fallback_answers.load(Ordering::Relaxed),
            last_document_chars: (uploads > 0)
                .then(|| self.last_document_chars.load(Ordering::Relaxed)),
        }
    }
}

/// Immutable view of activity counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Upload batches processed since startup.
    pub uploads: u64,
    /// Files run through an extractor.
    pub files_extracted: u64,
    /// Files whose extraction failed and contributed no text.
    pub extraction_failures: u64,
    /// Queries answered, including no-document replies.
    pub queries_answered: u64,
    /// Answers that fell back to leading excerpts.
    pub fallback_answers: u64,
    /// Character count of the most recently built document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_document_chars: Option<u64>,
}
