//! HTTP transport using reqwest.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Proxy};

use crate::fetcher::Transport;
use crate::proxy::ProxyEndpoint;
use crate::{CrawlError, Result};

/// Browser-like user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// A [`Transport`] backed by reqwest.
///
/// reqwest binds proxies per client, so one client is built lazily for each
/// proxy URL and reused for later requests through the same proxy. Proxied
/// clients accept invalid TLS certificates, since many public proxies
/// intercept TLS.
pub struct HttpTransport {
    direct: Client,
    proxied: Mutex<HashMap<String, Client>>,
    user_agent: String,
}

impl HttpTransport {
    /// Creates a transport with the default user agent.
    pub fn new() -> Result<Self> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Creates a transport with a custom user agent.
    pub fn with_user_agent(user_agent: impl Into<String>) -> Result<Self> {
        let user_agent = user_agent.into();
        let direct = base_builder(&user_agent).build()?;
        Ok(Self {
            direct,
            proxied: Mutex::new(HashMap::new()),
            user_agent,
        })
    }

    fn client_for(&self, proxy: &ProxyEndpoint) -> Result<Client> {
        let mut clients = self
            .proxied
            .lock()
            .map_err(|_| CrawlError::Other("Proxy client cache poisoned".to_string()))?;

        if let Some(client) = clients.get(proxy.url()) {
            return Ok(client.clone());
        }

        let client = base_builder(&self.user_agent)
            .proxy(Proxy::all(proxy.url())?)
            .danger_accept_invalid_certs(true)
            .build()?;
        clients.insert(proxy.url().to_string(), client.clone());
        Ok(client)
    }
}

fn base_builder(user_agent: &str) -> reqwest::ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        proxy: Option<&ProxyEndpoint>,
        timeout: Duration,
    ) -> Result<String> {
        let client = match proxy {
            Some(proxy) => self.client_for(proxy)?,
            None => self.direct.clone(),
        };

        let response = client
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| match e.status() {
                Some(status) => CrawlError::Status(status.as_u16()),
                None => CrawlError::Http(e),
            })?;
        Ok(response.text().await?)
    }
}
