use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Proxy;
use serde_json::Value;
use tracing::debug;

use super::{EgressBinder, EgressDescriptor, QueryRequest, Transport, TransportError};
use crate::config::TransportConfig;

/// Binds a lazily built reqwest client to each record's egress descriptor
#[derive(Debug, Clone)]
pub struct ReqwestBinder {
    settings: Arc<TransportConfig>,
}

impl ReqwestBinder {
    pub fn new(settings: &TransportConfig) -> Self {
        Self {
            settings: Arc::new(settings.clone()),
        }
    }
}

impl EgressBinder for ReqwestBinder {
    type Handle = ReqwestTransport;

    fn bind(&self, descriptor: &EgressDescriptor) -> Self::Handle {
        ReqwestTransport {
            descriptor: descriptor.clone(),
            settings: Arc::clone(&self.settings),
        }
    }
}

/// Single-use transport; the client is only built when a request is sent
#[derive(Debug)]
pub struct ReqwestTransport {
    descriptor: EgressDescriptor,
    settings: Arc<TransportConfig>,
}

impl ReqwestTransport {
    pub fn descriptor(&self) -> &EgressDescriptor {
        &self.descriptor
    }

    fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(self.settings.timeout_secs));

        if let Some(agent) = &self.settings.user_agent {
            builder = builder.user_agent(agent);
        }

        match self.descriptor.proxy_url()? {
            Some(proxy_url) => {
                let proxy =
                    Proxy::all(proxy_url.as_str()).map_err(|err| TransportError::Configuration {
                        descriptor: self.descriptor.redacted(),
                        reason: err.to_string(),
                    })?;
                builder = builder.proxy(proxy);
                if self.settings.accept_invalid_certs {
                    builder = builder.danger_accept_invalid_certs(true);
                }
            }
            None => {
                builder = builder.no_proxy();
            }
        }

        builder.build().map_err(|err| TransportError::Configuration {
            descriptor: self.descriptor.redacted(),
            reason: format!("failed to build HTTP client: {}", err),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &QueryRequest) -> Result<Value, TransportError> {
        let client = self.build_client()?;

        debug!(
            egress = %self.descriptor,
            method = %request.method,
            url = %request.url,
            "Sending request"
        );

        let response = client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_reqwest_error)?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: parse_error_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|err| TransportError::Decode(err.to_string()))
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        TransportError::Network(err.to_string())
    } else if let Some(status) = err.status() {
        TransportError::Status {
            status: status.as_u16(),
            body: None,
        }
    } else {
        TransportError::Other(err.to_string())
    }
}

/// Error bodies are kept as JSON when possible, otherwise as a JSON string
fn parse_error_body(body: &str) -> Option<Value> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string())))
}
