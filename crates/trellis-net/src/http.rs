//! The reqwest-backed remote transport.
//!
//! Row pages are fetched with GET requests carrying the query as URL
//! parameters; reorders are POSTed as a JSON body `{"ids": [...]}`.
//! Responses may be a bare JSON array of rows or an object wrapping them
//! under `"data"` (the common server-side grid protocol shape). Errors are
//! surfaced as rejected futures; retries and recovery belong to the
//! caller.

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde_json::{Value, json};
use url::Url;

use trellis::{RecordId, RemoteQuery, RemoteTransport, TransportError};

use crate::error::{NetworkError, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP implementation of [`RemoteTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create a transport with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get_rows(client: reqwest::Client, url: String, query: RemoteQuery) -> Result<Vec<Value>> {
        let url = Url::parse(&url)?;
        let pairs = query_pairs(&query);

        let response = client.get(url).query(&pairs).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.ok().filter(|body| !body.is_empty());
            return Err(NetworkError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        parse_rows(body)
    }

    async fn post_order(client: reqwest::Client, url: String, ids: Vec<RecordId>) -> Result<()> {
        let url = Url::parse(&url)?;

        let response = client.post(url).json(&json!({ "ids": ids })).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.ok().filter(|body| !body.is_empty());
            return Err(NetworkError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

impl RemoteTransport for HttpTransport {
    fn fetch_rows(
        &self,
        url: &str,
        query: &RemoteQuery,
    ) -> BoxFuture<'static, std::result::Result<Vec<Value>, TransportError>> {
        let client = self.client.clone();
        let url = url.to_string();
        let query = query.clone();
        Box::pin(async move {
            Self::get_rows(client, url, query).await.map_err(|err| {
                tracing::error!(error = %err, "row fetch failed");
                TransportError::from(err)
            })
        })
    }

    fn submit_order(
        &self,
        url: &str,
        ids: &[RecordId],
    ) -> BoxFuture<'static, std::result::Result<(), TransportError>> {
        let client = self.client.clone();
        let url = url.to_string();
        let ids = ids.to_vec();
        Box::pin(async move {
            Self::post_order(client, url, ids).await.map_err(|err| {
                tracing::error!(error = %err, "reorder submit failed");
                TransportError::from(err)
            })
        })
    }
}

/// Flatten a remote query into URL parameter pairs.
///
/// Scalar filter values are rendered bare; containers are rendered as
/// compact JSON so no filter shape is silently dropped.
fn query_pairs(query: &RemoteQuery) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("page".to_string(), query.page.to_string()),
        ("length".to_string(), query.length.to_string()),
    ];
    for (key, value) in &query.filters {
        pairs.push((key.clone(), scalar_string(value)));
    }
    pairs
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Accept a bare row array or the `{"data": [...]}` wrapper.
fn parse_rows(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err(NetworkError::InvalidBody(
                "expected a row array or a `data` array".to_string(),
            )),
        },
        other => Err(NetworkError::InvalidBody(format!(
            "expected rows, got {other}"
        ))),
    }
}
