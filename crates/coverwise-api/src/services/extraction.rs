//! Policy document extraction.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use coverwise_core::defaults::{DETERMINISTIC_TEMPERATURE, FALLBACK_FEATURES, FEATURES_DATASET};
use coverwise_core::{Error, ExtractedDocument, GenerationRequest, Result};
use coverwise_inference::{salvage, FallbackInvoker};
use coverwise_reconcile::{normalize_document, CsvReferenceStore};

use super::run_blocking;
use crate::prompts::extraction_prompt;

/// An uploaded policy file.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Extracts structured facts from a policy document and corrects derived fields.
pub struct ExtractionService {
    invoker: FallbackInvoker,
    store: Arc<CsvReferenceStore>,
}

impl ExtractionService {
    pub fn new(invoker: FallbackInvoker, store: Arc<CsvReferenceStore>) -> Self {
        Self { invoker, store }
    }

    /// Extract and normalize a document as of `today`.
    ///
    /// Fails only when the upload is empty or every model candidate fails.
    /// Unrecoverable model output yields an empty document.
    #[instrument(skip(self, upload), fields(subsystem = "api", component = "extraction", op = "extract", mime_type = %upload.mime_type, size = upload.data.len()))]
    pub async fn extract(
        &self,
        upload: UploadedDocument,
        today: NaiveDate,
    ) -> Result<ExtractedDocument> {
        if upload.data.is_empty() {
            return Err(Error::InvalidInput("Uploaded file is empty".to_string()));
        }

        let store = Arc::clone(&self.store);
        let features = run_blocking(move || store.load_raw(FEATURES_DATASET))
            .await?
            .unwrap_or_else(|| FALLBACK_FEATURES.to_string());

        let request = GenerationRequest::new(extraction_prompt(&features, today))
            .with_attachment(upload.mime_type, upload.data)
            .with_temperature(DETERMINISTIC_TEMPERATURE);
        let generation = self.invoker.invoke(&request).await?;

        let parsed = salvage::<ExtractedDocument>(&generation.text);
        if parsed.outcome.is_degraded() {
            warn!(model = %generation.model, "Extraction output unrecoverable, returning empty document");
        }

        let document = normalize_document(parsed.value, today);
        info!(
            model = %generation.model,
            salvage_outcome = parsed.outcome.as_str(),
            holders = document.policy_holders.len(),
            components = document.sum_insured.components.len(),
            "Policy extracted"
        );
        Ok(document)
    }
}
