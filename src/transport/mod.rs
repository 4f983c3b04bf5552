pub mod client;
pub mod egress;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Method};
use serde_json::Value;
use thiserror::Error;

pub use client::{ReqwestBinder, ReqwestTransport};
pub use egress::{EgressBinder, EgressDescriptor};

/// A fully built outbound request
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("HTTP status {status}")]
    Status { status: u16, body: Option<Value> },

    #[error("network failure: {0}")]
    Network(String),

    #[error("invalid egress descriptor `{descriptor}`: {reason}")]
    Configuration { descriptor: String, reason: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

/// One request/response exchange through a bound egress point
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &QueryRequest) -> Result<Value, TransportError>;
}
