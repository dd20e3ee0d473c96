//! Versioned result envelope returned by the `StockWatch` facade.

use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorKind};

pub const RESPONSE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Outcome of one facade operation.
///
/// `data` is set only on success and `error_kind` only on failure.
#[derive(Debug, Clone, Serialize)]
pub struct OperationResponse<T> {
    pub schema_version: u32,
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub data: Option<T>,
}

impl<T> OperationResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: RESPONSE_SCHEMA_VERSION,
            status: ResponseStatus::Success,
            message: message.into(),
            error_kind: None,
            data: Some(data),
        }
    }

    /// Error envelope. Internal failures are logged here and replaced with
    /// the generic backend message.
    pub fn failure(err: &DomainError) -> Self {
        match err.kind() {
            ErrorKind::Internal => {
                tracing::error!(code = %err.code, error = %err.message, "Operation failed");
            }
            _ => tracing::debug!(code = %err.code, "Operation refused: {}", err.message),
        }
        Self {
            schema_version: RESPONSE_SCHEMA_VERSION,
            status: ResponseStatus::Error,
            message: err.public_message().to_string(),
            error_kind: Some(err.kind()),
            data: None,
        }
    }

    pub fn from_result(result: Result<T, DomainError>, success_message: &str) -> Self {
        match result {
            Ok(data) => Self::success(success_message, data),
            Err(err) => Self::failure(&err),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Consumes the envelope, returning the payload on success.
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, GENERIC_BACKEND_MESSAGE};

    #[test]
    fn success_serializes_without_error_kind() {
        let response = OperationResponse::success("Product added successfully", 42u32);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], 42);
        assert!(json.get("error_kind").is_none());
    }

    #[test]
    fn business_rule_failure_keeps_message() {
        let err = DomainError::new(ErrorCode::DuplicateProduct, "You are already tracking this product");
        let response: OperationResponse<u32> = OperationResponse::failure(&err);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "error");
        assert_eq!(json["error_kind"], "business_rule");
        assert_eq!(json["message"], "You are already tracking this product");
        assert!(json["data"].is_null());
    }

    #[test]
    fn internal_failure_hides_cause() {
        let err = DomainError::database("Failed to insert product", "connection reset by peer");
        let response: OperationResponse<()> = OperationResponse::from_result(Err(err), "unused");

        assert!(!response.is_success());
        assert_eq!(response.message, GENERIC_BACKEND_MESSAGE);
        assert_eq!(response.error_kind, Some(ErrorKind::Internal));
    }
}
