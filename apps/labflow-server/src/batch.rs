//! Batch orchestration
//!
//! Fans uploaded documents through the extraction pipeline and the
//! structuring service, a few documents at a time, and flattens the records
//! in upload order. A document that fails is logged and left out; it never
//! fails the batch.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::document::RawDocument;
use crate::extract::ExtractionPipeline;
use crate::structuring::{structure_text, ExamRecord, StructuringError, StructuringService};

/// Why one document produced no records
#[derive(Debug, thiserror::Error)]
pub enum DocumentFailure {
    #[error("Extraction task failed: {0}")]
    Extraction(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Structuring(#[from] StructuringError),
}

/// Runs uploaded documents end to end
#[derive(Clone)]
pub struct BatchProcessor {
    pipeline: ExtractionPipeline,
    structurer: Arc<dyn StructuringService>,
    concurrency: usize,
}

impl BatchProcessor {
    pub fn new(
        pipeline: ExtractionPipeline,
        structurer: Arc<dyn StructuringService>,
        concurrency: usize,
    ) -> Self {
        Self {
            pipeline,
            structurer,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Process a batch and return every record, tagged with its source file
    pub async fn process(&self, documents: Vec<RawDocument>) -> Vec<ExamRecord> {
        let span = info_span!("batch", id = %Uuid::new_v4(), files = documents.len());

        async move {
            let per_file: Vec<Vec<ExamRecord>> = stream::iter(documents)
                .map(|document| self.process_one(document))
                .buffered(self.concurrency)
                .collect()
                .await;

            let records: Vec<ExamRecord> = per_file.into_iter().flatten().collect();
            info!(records = records.len(), "Batch finished");
            records
        }
        .instrument(span)
        .await
    }

    async fn process_one(&self, document: RawDocument) -> Vec<ExamRecord> {
        let filename = document.filename.clone();

        match self.run(document).await {
            Ok(records) => {
                info!(file = %filename, records = records.len(), "File processed");
                records
                    .into_iter()
                    .map(|record| record.tagged(&filename))
                    .collect()
            }
            Err(e) => {
                error!(file = %filename, "Failed to process file: {}", e);
                Vec::new()
            }
        }
    }

    async fn run(&self, document: RawDocument) -> Result<Vec<ExamRecord>, DocumentFailure> {
        info!(file = %document.filename, kind = %document.kind, bytes = document.bytes.len(), "Processing file");

        let pipeline = self.pipeline.clone();
        let extracted = tokio::task::spawn_blocking(move || {
            pipeline.select_and_extract(&document.bytes, &document.kind)
        })
        .await?;

        if extracted.is_empty() {
            warn!("No text extracted, skipping file");
            return Ok(Vec::new());
        }

        info!(method = %extracted.method, chars = extracted.trimmed_len(), "Text extracted");
        Ok(structure_text(self.structurer.as_ref(), &extracted.text).await?)
    }
}
