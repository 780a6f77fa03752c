//! Calendar transport for the public OpenERZ API over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;

use openerz_core::{
    model::{CalendarRequest, PostalCode, RawResponse, WasteType},
    ports::{CalendarPort, PortError},
    query::PickupQuery,
};

/// Root of the public OpenERZ service.
pub const BASE_URL: &str = "http://openerz.metaodi.ch";

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("openerz/", env!("CARGO_PKG_VERSION"));

/// [`CalendarPort`] backed by a `reqwest` client.
pub struct OpenErzHttpPort {
    client: Client,
    base_url: String,
}

impl OpenErzHttpPort {
    /// Create a port talking to the public service.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    /// Create a port talking to another deployment of the service.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(client: Client, base_url: S) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    /// Root URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for the request's resource path.
    #[must_use]
    pub fn url_for(&self, request: &CalendarRequest) -> String {
        format!("{}/{}", self.base_url, request.path())
    }
}

#[async_trait]
impl CalendarPort for OpenErzHttpPort {
    async fn fetch(&self, request: &CalendarRequest) -> Result<RawResponse, PortError> {
        let resp = self
            .client
            .get(self.url_for(request))
            .query(&request.query_pairs())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(PortError::from)?;

        let status = resp.status();
        let body = resp.text().await.map_err(PortError::from)?;

        Ok(RawResponse::new(status.as_u16(), body))
    }
}

/// Build an HTTP client with the crate's user agent.
///
/// # Errors
///
/// Returns a [`PortError`] when the TLS backend cannot be initialised.
pub fn client() -> Result<Client, PortError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(PortError::from)
}

/// Build a pickup query for `zip` and `waste_type` against the service at `base_url`.
#[must_use]
pub fn connector(
    client: Client,
    base_url: &str,
    zip: PostalCode,
    waste_type: WasteType,
) -> PickupQuery {
    let port = Arc::new(OpenErzHttpPort::with_base_url(client, base_url));
    PickupQuery::new(zip, waste_type, port)
}
