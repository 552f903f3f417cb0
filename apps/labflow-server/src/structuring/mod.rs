//! Structuring Module
//!
//! Hands extracted report text to a language model that returns
//! [`ExamRecord`]s. The production backend is Gemini; tests inject their own
//! [`StructuringService`].

mod gemini;
mod types;

use async_trait::async_trait;

pub use gemini::{build_prompt, GeminiClient, GeminiConfig};
pub use types::{
    parse_records, response_schema, ExamRecord, StructuringError, RECORD_FIELDS,
    WRAPPED_ARRAY_FIELD,
};

/// Texts shorter than this (after trimming) are not worth structuring
pub const MIN_STRUCTURABLE_CHARS: usize = 50;

/// Language-model backed structuring service
#[async_trait]
pub trait StructuringService: Send + Sync {
    /// Convert raw report text into exam records
    async fn structure(&self, raw_text: &str) -> Result<Vec<ExamRecord>, StructuringError>;
}

/// Structure `raw_text`, skipping the service call for near-empty text
pub async fn structure_text(
    service: &dyn StructuringService,
    raw_text: &str,
) -> Result<Vec<ExamRecord>, StructuringError> {
    if raw_text.trim().chars().count() < MIN_STRUCTURABLE_CHARS {
        tracing::warn!("Extracted text is empty or too short, skipping structuring");
        return Ok(Vec::new());
    }
    service.structure(raw_text).await
}

/// Mock service for testing
#[cfg(test)]
pub struct MockStructuring {
    pub records: Vec<ExamRecord>,
    pub fail: bool,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockStructuring {
    pub fn returning(records: Vec<ExamRecord>) -> Self {
        Self {
            records,
            fail: false,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            fail: true,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl StructuringService for MockStructuring {
    async fn structure(&self, _raw_text: &str) -> Result<Vec<ExamRecord>, StructuringError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail {
            return Err(StructuringError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.records.clone())
    }
}
