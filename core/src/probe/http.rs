//! Probe that routes an HTTP client through the candidate as a proxy.
//!
//! A fresh client is built per probe so no connection pool outlives it; the
//! client is dropped on every path out of [`HttpProbe::probe`].

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use tokio::time::timeout;
use tracing::debug;

use super::{ProbeClient, ProbeRequest, page_passes};
use crate::error::ProbeError;

const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";
const REFERER_VALUE: &str = "https://www.google.com/";

pub struct HttpProbe {
    challenge_marker: String,
    user_agent: String,
}

impl HttpProbe {
    pub fn new(challenge_marker: String, user_agent: String) -> Self {
        Self {
            challenge_marker,
            user_agent,
        }
    }

    fn client(&self, request: &ProbeRequest) -> Result<Client, ProbeError> {
        let proxy = reqwest::Proxy::all(format!("http://{}", request.proxy_addr()))
            .map_err(ProbeError::Client)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_VALUE));

        Client::builder()
            .proxy(proxy)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .connect_timeout(request.timeout)
            .timeout(request.timeout)
            .build()
            .map_err(ProbeError::Client)
    }

    async fn load_page(&self, request: &ProbeRequest) -> Result<bool, ProbeError> {
        let client: Client = self.client(request)?;

        let response = client
            .get(&request.target_url)
            .send()
            .await
            .map_err(|e| request_error(e, request))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| request_error(e, request))?;

        let passed = status.is_success() && page_passes(&body, &self.challenge_marker);
        if request.debug {
            debug!(
                endpoint = %request.proxy_addr(),
                status = status.as_u16(),
                bytes = body.len(),
                passed,
                "page loaded through proxy"
            );
        }
        Ok(passed)
    }
}

fn request_error(err: reqwest::Error, request: &ProbeRequest) -> ProbeError {
    if err.is_timeout() {
        ProbeError::Timeout(request.timeout)
    } else {
        ProbeError::Request(err)
    }
}

#[async_trait]
impl ProbeClient for HttpProbe {
    async fn probe(&self, request: &ProbeRequest) -> Result<bool, ProbeError> {
        match timeout(request.timeout, self.load_page(request)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ProbeError::Timeout(request.timeout)),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
