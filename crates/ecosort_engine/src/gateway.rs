use std::sync::Arc;

use ecosort_core::{ClassificationResult, ImageArtifact, RequestId};
use ecosort_logging::{clear_scan_context, eco_debug, eco_info, eco_warn, set_scan_context};

use crate::classify::{validate, Classifier};

/// Explanation shown when the service could not produce an answer.
pub const FAILURE_EXPLANATION: &str = "Could not analyze the image. Please try again.";

/// Wraps a [`Classifier`] so that every call yields a displayable result.
///
/// Errors never cross this boundary: they are logged and replaced by the
/// unrecognized fallback, which the ledger does not credit.
#[derive(Clone)]
pub struct ClassificationGateway {
    classifier: Arc<dyn Classifier>,
}

impl ClassificationGateway {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub async fn classify(
        &self,
        request_id: RequestId,
        image: &ImageArtifact,
    ) -> ClassificationResult {
        set_scan_context(request_id);
        eco_debug!("classifying {:?}", image);
        let outcome = match self.classifier.classify(image).await {
            Ok(result) => validate(&result).map(|()| result),
            Err(err) => Err(err),
        };
        // The task may have resumed on another worker thread.
        set_scan_context(request_id);
        let result = match outcome {
            Ok(result) => {
                eco_info!(
                    "classified {:?} as {} ({} points)",
                    result.item_name,
                    result.category,
                    result.eco_points
                );
                result
            }
            Err(err) => {
                eco_warn!("classification failed: {}", err);
                ClassificationResult::failed(FAILURE_EXPLANATION)
            }
        };
        clear_scan_context();
        result
    }
}
