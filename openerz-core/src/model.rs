//! Domain data structures for calendar queries, date windows, and service responses.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Format used for every date sent to or received from the calendar service.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default distance in days between the start and end of a query window.
pub const DEFAULT_DAY_OFFSET: i32 = 31;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors raised while building domain values from user input.
pub enum ModelError {
    /// Postal codes are positive integers.
    #[error("Invalid postal code: {0}")]
    InvalidPostalCode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
/// Positive integer identifying the area a query is scoped to.
pub struct PostalCode(u32);

impl PostalCode {
    /// Wrap a raw postal code.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPostalCode`] for zero.
    pub fn new(code: u32) -> Result<Self, ModelError> {
        if code == 0 {
            return Err(ModelError::InvalidPostalCode(code.to_string()));
        }
        Ok(Self(code))
    }

    /// Raw numeric value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl TryFrom<u32> for PostalCode {
    type Error = ModelError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<PostalCode> for u32 {
    fn from(zip: PostalCode) -> Self {
        zip.0
    }
}

impl FromStr for PostalCode {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let code = raw
            .trim()
            .parse::<u32>()
            .map_err(|_err| ModelError::InvalidPostalCode(raw.to_owned()))?;
        Self::new(code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
/// Collection stream offered by the calendar service.
///
/// Tags the service may add later are kept verbatim in [`WasteType::Other`] and only the
/// remote side decides whether they exist.
pub enum WasteType {
    /// Paper collection.
    Paper,
    /// Cardboard collection.
    Cardboard,
    /// Mixed household waste.
    Waste,
    /// Cargo tram stops for bulky items.
    Cargotram,
    /// E-tram stops for electronic waste.
    Etram,
    /// Organic waste.
    Organic,
    /// Textile collection.
    Textile,
    /// Any other tag, passed through unchanged.
    Other(String),
}

impl WasteType {
    /// Slug used in the resource path and in service responses.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            WasteType::Paper => "paper",
            WasteType::Cardboard => "cardboard",
            WasteType::Waste => "waste",
            WasteType::Cargotram => "cargotram",
            WasteType::Etram => "etram",
            WasteType::Organic => "organic",
            WasteType::Textile => "textile",
            WasteType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for WasteType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl From<&str> for WasteType {
    fn from(tag: &str) -> Self {
        match tag {
            "paper" => WasteType::Paper,
            "cardboard" => WasteType::Cardboard,
            "waste" => WasteType::Waste,
            "cargotram" => WasteType::Cargotram,
            "etram" => WasteType::Etram,
            "organic" => WasteType::Organic,
            "textile" => WasteType::Textile,
            other => WasteType::Other(other.to_owned()),
        }
    }
}

impl From<String> for WasteType {
    fn from(tag: String) -> Self {
        WasteType::from(tag.as_str())
    }
}

impl From<WasteType> for String {
    fn from(waste_type: WasteType) -> Self {
        match waste_type {
            WasteType::Other(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

impl FromStr for WasteType {
    type Err = std::convert::Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(WasteType::from(tag))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Start and optional end of the period a query covers.
pub struct DateWindow {
    /// Moment the window starts at.
    pub start: NaiveDateTime,
    /// End of the window, unset until explicitly computed.
    pub end: Option<NaiveDateTime>,
}

impl DateWindow {
    /// Window starting at `start` with no end yet.
    #[must_use]
    pub fn starting_at(start: NaiveDateTime) -> Self {
        Self { start, end: None }
    }

    /// `start` shifted by `day_offset` days, saturating at the representable bounds.
    #[must_use]
    pub fn offset_from_start(&self, day_offset: i32) -> NaiveDateTime {
        let delta = TimeDelta::days(i64::from(day_offset));
        self.start.checked_add_signed(delta).unwrap_or(if day_offset < 0 {
            NaiveDateTime::MIN
        } else {
            NaiveDateTime::MAX
        })
    }

    /// End used for a request: the computed one, or the default offset when unset.
    #[must_use]
    pub fn effective_end(&self) -> NaiveDateTime {
        self.end
            .unwrap_or_else(|| self.offset_from_start(DEFAULT_DAY_OFFSET))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fully resolved calendar request, independent of the transport.
pub struct CalendarRequest {
    /// Collection stream, embedded in the resource path.
    pub waste_type: WasteType,
    /// Area of interest.
    pub zip: PostalCode,
    /// First day covered.
    pub start: NaiveDate,
    /// Last day covered.
    pub end: NaiveDate,
    /// Page offset, always zero.
    pub offset: u32,
    /// Page size; zero lets the service pick its default.
    pub limit: u32,
    /// Response language.
    pub lang: &'static str,
    /// Sort key.
    pub sort: &'static str,
}

impl CalendarRequest {
    /// Build the request for a query over `window`.
    #[must_use]
    pub fn new(zip: PostalCode, waste_type: WasteType, window: &DateWindow) -> Self {
        Self {
            waste_type,
            zip,
            start: window.start.date(),
            end: window.effective_end().date(),
            offset: 0,
            limit: 0,
            lang: "en",
            sort: "date",
        }
    }

    /// Resource path relative to the service root.
    #[must_use]
    pub fn path(&self) -> String {
        format!("api/calendar/{}.json", self.waste_type)
    }

    /// Query string parameters in the order the service documents them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("zip", self.zip.to_string()),
            ("start", self.start.format(DATE_FORMAT).to_string()),
            ("end", self.end.format(DATE_FORMAT).to_string()),
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
            ("lang", self.lang.to_owned()),
            ("sort", self.sort.to_owned()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Unprocessed outcome of one HTTP exchange.
pub struct RawResponse {
    /// Numeric HTTP status.
    pub status: u16,
    /// Whether the status counts as success: any status below 400.
    ///
    /// Set by [`RawResponse::new`], which every transport uses so the rule lives in one place.
    pub ok: bool,
    /// Body as received.
    pub body: String,
}

impl RawResponse {
    /// Build a response, deriving the success flag from the status.
    #[must_use]
    pub fn new<B: Into<String>>(status: u16, body: B) -> Self {
        Self {
            status,
            ok: status < 400,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// State of the most recent exchange held by a query.
pub enum ResponseState {
    /// No request has been issued yet.
    #[default]
    NotRequested,
    /// The last request failed before any HTTP response arrived.
    TransportFailed,
    /// The last request produced an HTTP response.
    Received(RawResponse),
}

impl ResponseState {
    /// Stored response, if the last exchange produced one.
    #[must_use]
    pub fn raw(&self) -> Option<&RawResponse> {
        match self {
            ResponseState::Received(raw) => Some(raw),
            ResponseState::NotRequested | ResponseState::TransportFailed => None,
        }
    }
}

/// Body of `/api/calendar/<type>.json`
#[derive(Debug, Deserialize)]
pub(crate) struct CalendarResponse {
    #[serde(rename = "_metadata")]
    pub(crate) metadata: Metadata,
    #[serde(default)]
    pub(crate) result: Vec<CalendarEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Metadata {
    pub(crate) total_count: u64,
}

/// Single scheduled pickup; other fields (station, region, ...) are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct CalendarEntry {
    pub(crate) zip: u32,
    #[serde(rename = "type")]
    pub(crate) typ: String,
    pub(crate) date: String,
}
