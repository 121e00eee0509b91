// Panel API HTTP client
//
// Wraps `reqwest::Client` with HKC-specific URL construction, credential
// injection and response decoding. Endpoint methods live in `panel.rs`
// (reads) and `commands.rs` (arm/disarm) as inherent impls, keeping this
// module focused on transport mechanics.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::PanelCredentials;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Default root of the HKC cloud API.
pub const DEFAULT_BASE_URL: &str = "https://api.hkcsecurity.com/api/v1/";

/// Raw HTTP client for one HKC panel.
///
/// Every request is a `POST` carrying the credential triple in its JSON
/// body; the panel API has no session, so there is nothing to log out of.
pub struct HkcClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: PanelCredentials,
}

impl HkcClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(
        base_url: Url,
        credentials: PanelCredentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: PanelCredentials) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
            credentials,
        }
    }

    /// The panel this client talks to.
    pub fn panel_id(&self) -> &str {
        &self.credentials.panel_id
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the full URL for an endpoint path relative to the base.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// POST the credential body to an endpoint and return the raw response
    /// for status handling.
    pub(crate) async fn send(&self, path: &str) -> Result<reqwest::Response, Error> {
        let url = self.endpoint_url(path)?;
        debug!(panel_id = %self.credentials.panel_id, "POST {}", url);

        Ok(self
            .http
            .post(url)
            .json(&self.credentials.body())
            .send()
            .await?)
    }

    /// POST to an endpoint and decode the JSON reply into `T`.
    pub(crate) async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.send(path).await?;
        Self::decode(resp).await
    }

    /// Map non-success statuses to errors and decode the body.
    pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("panel rejected credentials (HTTP {status})"),
            });
        }

        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        trace!(bytes = body.len(), "decoding panel response");
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

/// Ensure the base ends with `/` so `Url::join` appends instead of replacing
/// the last path segment.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}
