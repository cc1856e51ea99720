//! HTTP backend for the document store (`<base>/<path>.json` REST layout).
//!
//! # Invariants
//! - One request per call; no retries, no caching.
//! - Any non-2xx response becomes `StoreError::Status`.
//! - Log lines carry a redacted path label, never document bodies.

use super::{path_label, split_path, RemoteStore, StoreError, StoreResult, StoredDocument};
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client for a Firebase-style realtime database.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    base_url: Url,
    client: Client,
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl HttpRemoteStore {
    /// Builds a client for `base_url` with the given request timeout.
    ///
    /// # Errors
    /// - `InvalidPath` when `base_url` is not an absolute http(s) URL.
    /// - `Unavailable` when the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|_| StoreError::InvalidPath(base_url.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidPath(base_url.to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Resolves `path` to `<base>/<path>.json`, percent-encoding each segment.
    pub fn url_for(&self, path: &str) -> StoreResult<Url> {
        let segments = split_path(path)?;
        let mut url = self.base_url.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidPath(path.to_string()))?;
            parts.pop_if_empty();
            let (last, parents) = segments
                .split_last()
                .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
            parts.extend(parents.iter().copied());
            parts.push(&format!("{last}.json"));
        }
        Ok(url)
    }

    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> StoreResult<Value> {
        let url = self.url_for(path)?;
        let label = path_label(path);
        let started_at = Instant::now();

        let mut request: RequestBuilder = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().map_err(|err| {
            warn!(
                "event=store_request module=remote status=error method={} path={} duration_ms={} error_code=transport",
                method.as_str(),
                label,
                started_at.elapsed().as_millis()
            );
            StoreError::Transport {
                method: method.as_str(),
                path: path.to_string(),
                message: err.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "event=store_request module=remote status=error method={} path={} http_status={} duration_ms={}",
                method.as_str(),
                label,
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(StoreError::Status {
                method: method.as_str(),
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().map_err(|err| StoreError::Transport {
            method: method.as_str(),
            path: path.to_string(),
            message: err.to_string(),
        })?;
        debug!(
            "event=store_request module=remote status=ok method={} path={} http_status={} duration_ms={} bytes={}",
            method.as_str(),
            label,
            status.as_u16(),
            started_at.elapsed().as_millis(),
            text.len()
        );

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| StoreError::Decode {
            path: path.to_string(),
            message: err.to_string(),
        })
    }
}

impl RemoteStore for HttpRemoteStore {
    fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        let value = self.send(Method::Get, path, None)?;
        Ok((!value.is_null()).then_some(value))
    }

    fn create(&self, path: &str, value: &Value) -> StoreResult<StoredDocument> {
        let response = self.send(Method::Post, path, Some(value))?;
        let key = response
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Decode {
                path: path.to_string(),
                message: "create response carries no generated `name`".to_string(),
            })?;
        Ok(StoredDocument {
            key: Some(key),
            value: value.clone(),
        })
    }

    fn replace(&self, path: &str, value: &Value) -> StoreResult<StoredDocument> {
        let response = self.send(Method::Put, path, Some(value))?;
        let value = if response.is_null() {
            value.clone()
        } else {
            response
        };
        Ok(StoredDocument { key: None, value })
    }

    fn remove(&self, path: &str) -> StoreResult<()> {
        self.send(Method::Delete, path, None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpRemoteStore, DEFAULT_TIMEOUT};

    #[test]
    fn url_for_appends_json_suffix_and_encodes_segments() {
        let store = HttpRemoteStore::new("https://db.example.com/", DEFAULT_TIMEOUT).unwrap();
        let url = store.url_for("users/a b/u1/board/todo").unwrap();
        assert_eq!(
            url.as_str(),
            "https://db.example.com/users/a%20b/u1/board/todo.json"
        );
    }

    #[test]
    fn url_for_keeps_base_path_prefix() {
        let store = HttpRemoteStore::new("http://127.0.0.1:9000/root", DEFAULT_TIMEOUT).unwrap();
        let url = store.url_for("users").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/root/users.json");
    }

    #[test]
    fn new_rejects_non_http_urls() {
        assert!(HttpRemoteStore::new("ftp://db.example.com", DEFAULT_TIMEOUT).is_err());
        assert!(HttpRemoteStore::new("not a url", DEFAULT_TIMEOUT).is_err());
    }
}
