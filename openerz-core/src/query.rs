//! Stateful lookup of the next pickup date for one area and collection stream.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::diagnostics::{QueryIssue, TracingDiagnostics};
use crate::model::{
    CalendarRequest, CalendarResponse, DATE_FORMAT, DateWindow, PostalCode, RawResponse,
    ResponseState, WasteType,
};
use crate::ports::{CalendarPort, Clock, Diagnostics, SystemClock};

/// Session object wrapping one postal code and waste type.
///
/// Every call to [`PickupQuery::find_next_pickup`] overwrites the date window and the stored
/// response. Operations take `&mut self`; sharing one query between several callers needs
/// external synchronization.
pub struct PickupQuery {
    zip: PostalCode,
    waste_type: WasteType,
    window: DateWindow,
    response: ResponseState,
    port: Arc<dyn CalendarPort>,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl PickupQuery {
    /// Create a query using the system clock and `tracing` diagnostics.
    #[must_use]
    pub fn new(zip: PostalCode, waste_type: WasteType, port: Arc<dyn CalendarPort>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            zip,
            waste_type,
            window: DateWindow::starting_at(clock.now()),
            response: ResponseState::NotRequested,
            port,
            clock,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Replace the clock. The start date is re-read from the new clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.window = DateWindow::starting_at(clock.now());
        self.clock = clock;
        self
    }

    /// Replace the sink receiving query issues.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Configured postal code.
    #[must_use]
    pub fn postal_code(&self) -> PostalCode {
        self.zip
    }

    /// Configured waste type.
    #[must_use]
    pub fn waste_type(&self) -> &WasteType {
        &self.waste_type
    }

    /// Current date window.
    #[must_use]
    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    /// Outcome of the most recent exchange.
    #[must_use]
    pub fn response(&self) -> &ResponseState {
        &self.response
    }

    /// Move the start of the window to now.
    pub fn refresh_start_date(&mut self) {
        self.window.start = self.clock.now();
    }

    /// Set the end of the window `day_offset` days after its start.
    ///
    /// Negative offsets are accepted and yield an end before the start.
    pub fn compute_end_date(&mut self, day_offset: i32) {
        self.window.end = Some(self.window.offset_from_start(day_offset));
    }

    /// Send the calendar request and store its outcome.
    ///
    /// Transport failures are reported as [`QueryIssue::ConnectionFailure`] and leave no
    /// response behind; HTTP error statuses are stored like any other response.
    pub async fn execute_request(&mut self) {
        let request = CalendarRequest::new(self.zip, self.waste_type.clone(), &self.window);
        tracing::debug!(
            path = %request.path(),
            start = %request.start,
            end = %request.end,
            "requesting pickup calendar"
        );

        match self.port.fetch(&request).await {
            Ok(raw) => {
                tracing::debug!(status = raw.status, "calendar response received");
                self.response = ResponseState::Received(raw);
            }
            Err(err) => {
                self.response = ResponseState::TransportFailed;
                self.diagnostics
                    .report(&QueryIssue::connection_failure(&err));
            }
        }
    }

    /// Extract the next pickup date from the stored response.
    ///
    /// Returns `None` when there is no response or it does not yield a matching pickup; the
    /// latter case is reported to the diagnostics sink.
    #[must_use]
    pub fn parse_response(&self) -> Option<NaiveDate> {
        let raw = match &self.response {
            ResponseState::Received(raw) => raw,
            ResponseState::NotRequested => {
                tracing::debug!("no calendar request issued yet");
                return None;
            }
            ResponseState::TransportFailed => {
                tracing::debug!("last calendar request failed, nothing to parse");
                return None;
            }
        };

        match self.first_pickup(raw) {
            Ok(date) => Some(date),
            Err(issue) => {
                self.diagnostics.report(&issue);
                None
            }
        }
    }

    /// Run the whole cycle for a window of `day_offset` days starting now.
    pub async fn find_next_pickup(&mut self, day_offset: i32) -> Option<NaiveDate> {
        self.refresh_start_date();
        self.compute_end_date(day_offset);
        self.execute_request().await;
        self.parse_response()
    }

    fn first_pickup(&self, raw: &RawResponse) -> Result<NaiveDate, QueryIssue> {
        if !raw.ok {
            return Err(QueryIssue::UnsuccessfulResponse { status: raw.status });
        }

        let body = serde_json::from_str::<CalendarResponse>(&raw.body).map_err(|err| {
            QueryIssue::MalformedResponse {
                reason: err.to_string(),
            }
        })?;

        if body.metadata.total_count == 0 {
            return Err(QueryIssue::EmptyResultSet);
        }

        let first = body
            .result
            .into_iter()
            .next()
            .ok_or_else(|| QueryIssue::MalformedResponse {
                reason: "result list is empty although total_count is positive".to_owned(),
            })?;

        if first.zip != self.zip.get() || first.typ != self.waste_type.as_str() {
            return Err(QueryIssue::MismatchedResult {
                expected_zip: self.zip,
                expected_type: self.waste_type.clone(),
                actual_zip: first.zip,
                actual_type: first.typ,
            });
        }

        NaiveDate::parse_from_str(&first.date, DATE_FORMAT).map_err(|err| {
            QueryIssue::MalformedResponse {
                reason: format!("invalid pickup date {:?}: {err}", first.date),
            }
        })
    }
}
