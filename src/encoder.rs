//! Report encoder
//!
//! Wraps evaluator output in a versioned JSON payload with producer metadata.

use crate::error::ComputeError;
use crate::types::{ReportKind, ReportPayload, ReportProducer};
use crate::{PRODUCER_NAME, SLEEPSYNC_VERSION};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report encoder
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode an evaluator result into a report payload
    pub fn encode<T: Serialize>(
        &self,
        kind: ReportKind,
        policy: &str,
        result: &T,
    ) -> Result<ReportPayload, ComputeError> {
        let result = serde_json::to_value(result)
            .map_err(|e| ComputeError::EncodingError(format!("{} result: {e}", kind.as_str())))?;

        Ok(ReportPayload {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: SLEEPSYNC_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            policy: policy.to_string(),
            kind,
            result,
        })
    }

    /// Encode to JSON string
    pub fn encode_to_json<T: Serialize>(
        &self,
        kind: ReportKind,
        policy: &str,
        result: &T,
    ) -> Result<String, ComputeError> {
        let payload = self.encode(kind, policy, result)?;
        serde_json::to_string_pretty(&payload).map_err(ComputeError::JsonError)
    }
}
