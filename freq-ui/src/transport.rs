//! `reqwest` implementation of the gateway transport.
//!
//! On wasm the browser's fetch is used with `credentials: include`, so the
//! session and CSRF cookies travel with every request.

use freq_core::error::{FreqError, Result};
use freq_core::gateway::{ApiRequest, Method, Transport};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Relative URLs are resolved against the page origin.
fn absolute(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default();
    format!("{}{}", origin, url)
}

impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<String> {
        let url = absolute(&request.url);
        let builder = match request.method {
            Method::Get => self.client.get(&url).query(&request.params),
            Method::Post => self.client.post(&url).form(&request.params),
        };
        let mut builder = builder.timeout(Duration::from_secs(request.timeout_secs));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        #[cfg(target_arch = "wasm32")]
        if request.with_credentials {
            builder = builder.fetch_credentials_include();
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FreqError::Timeout(request.timeout_secs)
            } else {
                FreqError::Transport(e.to_string())
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FreqError::Status {
                status: status.as_u16(),
                url: request.url,
            });
        }
        response
            .text()
            .await
            .map_err(|e| FreqError::Transport(e.to_string()))
    }

    fn cookies(&self) -> String {
        crate::js_bridge::document_cookies()
    }
}
