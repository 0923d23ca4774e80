//! Transmission JSON-RPC transport.
//!
//! The daemon guards every call with a CSRF token: a request without a current
//! `X-Transmission-Session-Id` header is answered with 409 and the token to use.
//! The token is negotiated once while connecting; removal calls are never re-sent.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};
use unlinked_config::ConnectionConfig;
use unlinked_core::{
    TorrentCatalog, TorrentId, TorrentRecord, TorrentRemover, TransportError, TransportResult,
};
use url::Url;

pub(crate) const SESSION_HEADER: &str = "X-Transmission-Session-Id";

/// Fields requested from `torrent-get`.
pub(crate) const TORRENT_FIELDS: [&str; 7] = [
    "id",
    "name",
    "downloadDir",
    "files",
    "trackers",
    "addedDate",
    "doneDate",
];

const RESULT_SUCCESS: &str = "success";

#[derive(Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    arguments: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: String,
    arguments: Option<T>,
}

#[derive(Deserialize)]
struct TorrentList {
    #[serde(default)]
    torrents: Vec<WireTorrent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTorrent {
    id: i64,
    name: String,
    download_dir: String,
    #[serde(default)]
    files: Vec<WireFile>,
    #[serde(default)]
    trackers: Vec<WireTracker>,
    #[serde(default)]
    added_date: i64,
    #[serde(default)]
    done_date: i64,
}

#[derive(Deserialize)]
struct WireFile {
    name: String,
}

#[derive(Deserialize)]
struct WireTracker {
    announce: String,
}

impl WireTorrent {
    fn into_record(self) -> TorrentRecord {
        let root = PathBuf::from(self.download_dir);
        let files = self.files.iter().map(|file| root.join(&file.name)).collect();
        let mut trackers: Vec<String> = Vec::with_capacity(self.trackers.len());
        for tracker in &self.trackers {
            let host = tracker_host(&tracker.announce);
            if !trackers.contains(&host) {
                trackers.push(host);
            }
        }
        TorrentRecord {
            id: TorrentId(self.id),
            name: self.name,
            root,
            files,
            trackers,
            added_at: timestamp(self.added_date).unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            completed_at: timestamp(self.done_date),
        }
    }
}

/// Host part of an announce URL; announces that do not parse are kept verbatim.
pub(crate) fn tracker_host(announce: &str) -> String {
    Url::parse(announce)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| announce.to_string())
}

fn timestamp(seconds: i64) -> Option<DateTime<Utc>> {
    if seconds <= 0 {
        None
    } else {
        DateTime::from_timestamp(seconds, 0)
    }
}

/// Session with one Transmission daemon.
#[derive(Debug, Clone)]
pub(crate) struct TransmissionClient {
    http: Client,
    endpoint: Url,
    username: Option<String>,
    password: Option<String>,
    session_id: Option<HeaderValue>,
}

impl TransmissionClient {
    /// Open a session, negotiating the CSRF token.
    pub(crate) async fn connect(
        config: &ConnectionConfig,
        timeout: Duration,
    ) -> TransportResult<Self> {
        let endpoint = Url::parse(&config.rpc_endpoint()).map_err(|err| {
            TransportError::connection("session-get", format!("invalid endpoint: {err}"))
        })?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::connection("session-get", err.to_string()))?;
        let mut client = Self {
            http,
            endpoint,
            username: config.username.clone(),
            password: config.password.clone(),
            session_id: None,
        };

        let mut response = client.send("session-get", json!({})).await?;
        if response.status() == StatusCode::CONFLICT {
            let token = response.headers().get(SESSION_HEADER).cloned().ok_or_else(|| {
                TransportError::connection("session-get", "409 without a session id")
            })?;
            debug!("adopting daemon session id");
            client.session_id = Some(token);
            response = client.send("session-get", json!({})).await?;
        }
        let _: Value = read_arguments("session-get", response).await?;
        info!(endpoint = %client.endpoint, "connected to transmission");
        Ok(client)
    }

    fn request(&self) -> RequestBuilder {
        let mut request = self.http.post(self.endpoint.clone());
        if let Some(token) = &self.session_id {
            request = request.header(SESSION_HEADER, token.clone());
        }
        if self.username.is_some() || self.password.is_some() {
            request = request.basic_auth(
                self.username.as_deref().unwrap_or_default(),
                self.password.as_deref(),
            );
        }
        request
    }

    async fn send(&self, method: &'static str, arguments: Value) -> TransportResult<Response> {
        self.request()
            .json(&RpcRequest { method, arguments })
            .send()
            .await
            .map_err(|err| TransportError::connection(method, err.to_string()))
    }
}

async fn read_arguments<T: DeserializeOwned>(
    method: &'static str,
    response: Response,
) -> TransportResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::connection(method, format!("HTTP {status}")));
    }
    let body: RpcResponse<T> = response
        .json()
        .await
        .map_err(|err| TransportError::connection(method, format!("malformed response: {err}")))?;
    if body.result != RESULT_SUCCESS {
        return Err(TransportError::connection(method, body.result));
    }
    body.arguments
        .ok_or_else(|| TransportError::connection(method, "response without arguments"))
}

#[async_trait]
impl TorrentCatalog for TransmissionClient {
    async fn list_torrents(&self) -> TransportResult<Vec<TorrentRecord>> {
        let response = self
            .send("torrent-get", json!({ "fields": TORRENT_FIELDS }))
            .await?;
        let list: TorrentList = read_arguments("torrent-get", response).await?;
        let records: Vec<TorrentRecord> = list
            .torrents
            .into_iter()
            .map(WireTorrent::into_record)
            .collect();
        info!(count = records.len(), "fetched torrent list");
        Ok(records)
    }
}

#[async_trait]
impl TorrentRemover for TransmissionClient {
    async fn remove_torrent(&self, id: TorrentId, delete_data: bool) -> TransportResult<()> {
        let response = self
            .request()
            .json(&RpcRequest {
                method: "torrent-remove",
                arguments: json!({ "ids": [id.0], "delete-local-data": delete_data }),
            })
            .send()
            .await
            .map_err(|err| TransportError::removal(id, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::removal(id, format!("HTTP {status}")));
        }
        let body: RpcResponse<Value> = response
            .json()
            .await
            .map_err(|err| TransportError::removal(id, format!("malformed response: {err}")))?;
        if body.result == RESULT_SUCCESS {
            Ok(())
        } else {
            Err(TransportError::removal(id, body.result))
        }
    }
}
