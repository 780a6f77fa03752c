//! Traits describing the collaborators a query depends on.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use reqwest::Error as ReqwestError;

use crate::diagnostics::QueryIssue;
use crate::model::{CalendarRequest, RawResponse};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur before the calendar service answers.
pub enum PortError {
    /// Network layer failed; details are in the source chain.
    #[error("Network error")]
    Network(#[from] ReqwestError),
}

#[async_trait]
/// Transport able to send a [`CalendarRequest`] to the calendar service.
pub trait CalendarPort: Send + Sync {
    /// Send the request and hand back whatever HTTP response arrived.
    ///
    /// Non-success statuses are still `Ok`; only failures to obtain a response are errors.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when no HTTP response could be obtained.
    async fn fetch(&self, request: &CalendarRequest) -> Result<RawResponse, PortError>;
}

/// Source of the current moment.
pub trait Clock: Send + Sync {
    /// Local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Sink for non-fatal problems found while running a query.
pub trait Diagnostics: Send + Sync {
    /// Record one issue.
    fn report(&self, issue: &QueryIssue);
}
