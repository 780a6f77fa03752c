//! Classification of everything that makes a query come back empty.

use std::error::Error;

use crate::model::{PostalCode, WasteType};
use crate::ports::Diagnostics;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Non-fatal problem encountered while looking up a pickup date.
pub enum QueryIssue {
    /// No HTTP response could be obtained.
    #[error("Connection failure while requesting OpenERZ: {cause}")]
    ConnectionFailure {
        /// Underlying transport error text.
        cause: String,
    },
    /// The service answered with a non-success status.
    #[error("Last request to OpenERZ was not successful. Status code: {status}")]
    UnsuccessfulResponse {
        /// Numeric HTTP status.
        status: u16,
    },
    /// The service reported zero matching pickups.
    #[error("Request to OpenERZ returned no results")]
    EmptyResultSet,
    /// The first pickup belongs to another area or collection stream.
    #[error(
        "Returned pickup ({actual_zip}, {actual_type}) does not match the configured zip {expected_zip} and waste type {expected_type}"
    )]
    MismatchedResult {
        /// Configured postal code.
        expected_zip: PostalCode,
        /// Configured waste type.
        expected_type: WasteType,
        /// Postal code of the first returned entry.
        actual_zip: u32,
        /// Waste type tag of the first returned entry.
        actual_type: String,
    },
    /// The body could not be understood.
    #[error("Malformed response from OpenERZ: {reason}")]
    MalformedResponse {
        /// What was wrong with the body.
        reason: String,
    },
}

impl QueryIssue {
    /// Connection failure carrying `err` and every error in its source chain.
    #[must_use]
    pub fn connection_failure(err: &dyn Error) -> Self {
        let mut cause = err.to_string();
        let mut source = err.source();
        while let Some(inner) = source {
            cause.push_str(": ");
            cause.push_str(&inner.to_string());
            source = inner.source();
        }
        QueryIssue::ConnectionFailure { cause }
    }

    /// Short machine-friendly name of the issue kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            QueryIssue::ConnectionFailure { .. } => "connection_failure",
            QueryIssue::UnsuccessfulResponse { .. } => "unsuccessful_response",
            QueryIssue::EmptyResultSet => "empty_result_set",
            QueryIssue::MismatchedResult { .. } => "mismatched_result",
            QueryIssue::MalformedResponse { .. } => "malformed_response",
        }
    }
}

/// Forwards issues to `tracing`: connection failures at error level, the rest as warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, issue: &QueryIssue) {
        match issue {
            QueryIssue::ConnectionFailure { .. } => {
                tracing::error!(kind = issue.kind(), "{issue}");
            }
            QueryIssue::UnsuccessfulResponse { .. }
            | QueryIssue::EmptyResultSet
            | QueryIssue::MismatchedResult { .. }
            | QueryIssue::MalformedResponse { .. } => {
                tracing::warn!(kind = issue.kind(), "{issue}");
            }
        }
    }
}
