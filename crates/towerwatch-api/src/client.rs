// Gateway HTTP client
//
// Wraps `reqwest::Client` with gateway URL construction and response
// decoding. Every method performs exactly one request; retry and fallback
// policy belongs to the caller.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{Ack, HistoryEntry, ModeRequest, PumpRequest, StatusRecord, TowerRecord};
use crate::transport::TransportConfig;

/// Raw HTTP client for the water-tower gateway.
///
/// All paths are resolved relative to `base_url`, so a gateway mounted under
/// a sub-path (`http://host/tower-gw/`) works the same as one at the root.
#[derive(Debug, Clone)]
pub struct TowerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TowerClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET api/status`
    pub async fn get_status(&self) -> Result<StatusRecord, Error> {
        let url = self.api_url("status")?;
        self.get(url).await
    }

    /// `GET api/towers`
    pub async fn list_towers(&self) -> Result<Vec<TowerRecord>, Error> {
        let url = self.api_url("towers")?;
        self.get(url).await
    }

    /// `GET api/tower/{id}`
    pub async fn get_tower(&self, tower_id: u32) -> Result<TowerRecord, Error> {
        let url = self.api_url(&format!("tower/{tower_id}"))?;
        self.get(url).await
    }

    /// `GET api/history?towerId={id}&hours={hours}`
    pub async fn get_history(&self, tower_id: u32, hours: u32) -> Result<Vec<HistoryEntry>, Error> {
        let mut url = self.api_url("history")?;
        url.query_pairs_mut()
            .append_pair("towerId", &tower_id.to_string())
            .append_pair("hours", &hours.to_string());
        self.get(url).await
    }

    /// `POST api/pump`
    pub async fn send_pump(&self, command: &PumpRequest) -> Result<Ack, Error> {
        let url = self.api_url("pump")?;
        debug!(tower_id = command.tower_id, pump_on = command.pump_on, "sending pump command");
        self.post(url, command).await
    }

    /// `POST api/mode`
    pub async fn send_mode(&self, auto_mode: bool) -> Result<Ack, Error> {
        let url = self.api_url("mode")?;
        debug!(auto_mode, "sending mode command");
        self.post(url, &ModeRequest { auto_mode }).await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        let body = Self::read_body(resp).await?;
        decode(&body)
    }

    async fn post(&self, url: Url, body: &(impl Serialize + Sync)) -> Result<Ack, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        let body = Self::read_body(resp).await?;
        Ok(parse_ack(&body))
    }

    /// Read the body, turning non-2xx statuses into `Error::Http`.
    async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }
        let body = resp.text().await?;
        trace!(bytes = body.len(), "response body received");
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

/// Commands answer with a JSON map on the app surface but plain `OK` from
/// the firmware; both become an ack map.
fn parse_ack(body: &str) -> Ack {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ack::new();
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(other) => {
            let mut ack = Ack::new();
            ack.insert("value".into(), other);
            ack
        }
        Err(_) => {
            let mut ack = Ack::new();
            ack.insert("message".into(), serde_json::Value::String(trimmed.to_owned()));
            ack
        }
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn api_url_handles_trailing_slash_and_subpath() {
        let client = TowerClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://10.0.0.2/gw/").unwrap(),
        );
        assert_eq!(client.base_url().as_str(), "http://10.0.0.2/gw/");
        assert_eq!(
            client.api_url("towers").unwrap().as_str(),
            "http://10.0.0.2/gw/api/towers"
        );
    }

    #[test]
    fn plain_text_ack_is_wrapped() {
        let ack = parse_ack("OK\n");
        assert_eq!(ack.get("message").and_then(|v| v.as_str()), Some("OK"));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "水".repeat(100);
        assert!(preview(&body).len() <= 200);
    }
}
