use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, IF_NONE_MATCH, ORIGIN, REFERER},
    Method,
};
use tracing::{debug, warn};

use crate::{
    airdrop::{
        address::NormalizedAddress,
        types::{FailureReason, QueryOutcome, RemotePayload},
    },
    config::{AirdropConfig, HeaderConfig},
    error::{CheckerError, Result},
    transport::{QueryRequest, Transport, TransportError},
};

/// Looks up one address's allocation and classifies the reply
#[derive(Debug, Clone)]
pub struct AirdropQueryService {
    endpoint_base: String,
    headers: HeaderMap,
}

impl AirdropQueryService {
    /// Header values are validated here, once, rather than per request
    pub fn new(config: &AirdropConfig) -> Result<Self> {
        Ok(Self {
            endpoint_base: config.endpoint_base.trim().trim_end_matches('/').to_string(),
            headers: build_headers(&config.headers)?,
        })
    }

    pub fn endpoint_for(&self, address: &NormalizedAddress) -> String {
        format!("{}/{}", self.endpoint_base, address)
    }

    pub fn request_for(&self, address: &NormalizedAddress) -> QueryRequest {
        QueryRequest {
            method: Method::GET,
            url: self.endpoint_for(address),
            headers: self.headers.clone(),
        }
    }

    /// Dispatch once through `transport`. Never retries and never errors;
    /// every failure comes back as [`QueryOutcome::Failure`].
    pub async fn query<T>(&self, address: &NormalizedAddress, transport: &T) -> QueryOutcome
    where
        T: Transport + ?Sized,
    {
        let request = self.request_for(address);
        debug!("Querying allocation for {} at {}", address, request.url);

        match transport.send(&request).await {
            Ok(body) => QueryOutcome::Success {
                payload: RemotePayload::from(body),
            },
            Err(err) => {
                warn!("Allocation query for {} failed: {}", address, err);
                QueryOutcome::Failure {
                    reason: FailureReason::from(err),
                }
            }
        }
    }
}

impl From<TransportError> for FailureReason {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status, body } => FailureReason::Http {
                status_code: status,
                body,
            },
            TransportError::Network(detail) => FailureReason::Network { detail },
            TransportError::Configuration { .. } => FailureReason::TransportConfiguration {
                detail: err.to_string(),
            },
            TransportError::Decode(_) | TransportError::Other(_) => {
                FailureReason::unknown(err.to_string())
            }
        }
    }
}

fn build_headers(config: &HeaderConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (name, value) in [
        (ACCEPT, &config.accept),
        (ACCEPT_LANGUAGE, &config.accept_language),
        (IF_NONE_MATCH, &config.if_none_match),
        (ORIGIN, &config.origin),
        (REFERER, &config.referer),
    ] {
        insert_header(&mut headers, name, value)?;
    }

    Ok(headers)
}

/// Empty values leave the header out
fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }

    let value = HeaderValue::from_str(value)
        .map_err(|err| CheckerError::Config(format!("invalid `{}` header: {}", name, err)))?;
    headers.insert(name, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airdrop::address::AddressNormalizer;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Replies with a fixed result and remembers what it was asked
    struct CannedTransport {
        reply: std::result::Result<Value, TransportError>,
        seen: Mutex<Vec<QueryRequest>>,
    }

    impl CannedTransport {
        fn new(reply: std::result::Result<Value, TransportError>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send(&self, request: &QueryRequest) -> std::result::Result<Value, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn service() -> AirdropQueryService {
        AirdropQueryService::new(&AirdropConfig::default()).unwrap()
    }

    fn address() -> NormalizedAddress {
        AddressNormalizer::default().normalize("0x52908400098527886E0F7030069857D2E4169EE7")
    }

    #[test]
    fn test_request_shape() {
        let request = service().request_for(&address());

        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url,
            "https://airdrop-api.initia.xyz/info/initia/0x52908400098527886e0f7030069857d2e4169ee7"
        );
        assert_eq!(request.headers.len(), 5);
        assert_eq!(request.headers[ORIGIN], "https://airdrop.initia.xyz");
        assert_eq!(request.headers[REFERER], "https://airdrop.initia.xyz/");
        assert!(request.headers.contains_key(IF_NONE_MATCH));
    }

    #[test]
    fn test_headers_are_identical_between_calls() {
        let service = service();
        let first = service.request_for(&address());
        let second = service.request_for(&AddressNormalizer::default().normalize("abc"));

        assert_eq!(first.headers, second.headers);
    }

    #[test]
    fn test_trailing_slash_in_endpoint() {
        let config = AirdropConfig {
            endpoint_base: "http://localhost:8080/info/".to_string(),
            ..AirdropConfig::default()
        };
        let service = AirdropQueryService::new(&config).unwrap();

        assert_eq!(
            service.endpoint_for(&AddressNormalizer::default().normalize("abc")),
            "http://localhost:8080/info/0xabc"
        );
    }

    #[test]
    fn test_empty_header_is_omitted_and_invalid_rejected() {
        let mut config = AirdropConfig::default();
        config.headers.if_none_match = String::new();
        let service = AirdropQueryService::new(&config).unwrap();
        assert!(!service.request_for(&address()).headers.contains_key(IF_NONE_MATCH));

        config.headers.origin = "bad\nvalue".to_string();
        assert!(matches!(
            AirdropQueryService::new(&config),
            Err(CheckerError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_success_outcome() {
        let transport = CannedTransport::new(Ok(json!({"amount": "2500000", "xp_rank": 9})));

        let outcome = service().query(&address(), &transport).await;

        match outcome {
            QueryOutcome::Success { payload } => {
                assert_eq!(payload.raw_amount(), "2500000");
                assert_eq!(payload.field_text("xp_rank"), "9");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_outcome_keeps_body() {
        let transport = CannedTransport::new(Err(TransportError::Status {
            status: 429,
            body: Some(json!({"error": "too many requests"})),
        }));

        let outcome = service().query(&address(), &transport).await;

        let QueryOutcome::Failure { reason } = outcome else {
            panic!("expected failure");
        };
        let message = reason.to_string();
        assert!(message.contains("429"));
        assert!(message.contains(r#"{"error":"too many requests"}"#));
    }

    #[tokio::test]
    async fn test_network_outcome_is_not_http() {
        let transport =
            CannedTransport::new(Err(TransportError::Network("connection reset".to_string())));

        let outcome = service().query(&address(), &transport).await;

        let QueryOutcome::Failure { reason } = outcome else {
            panic!("expected failure");
        };
        assert!(matches!(reason, FailureReason::Network { .. }));
        assert_eq!(reason.to_string(), "network error");
    }

    #[tokio::test]
    async fn test_configuration_and_unknown_outcomes() {
        let misconfigured = CannedTransport::new(Err(TransportError::Configuration {
            descriptor: "nope".to_string(),
            reason: "expected host:port".to_string(),
        }));
        let garbled = CannedTransport::new(Err(TransportError::Decode("eof".to_string())));

        let first = service().query(&address(), &misconfigured).await;
        let second = service().query(&address(), &garbled).await;

        assert!(matches!(
            first,
            QueryOutcome::Failure {
                reason: FailureReason::TransportConfiguration { .. }
            }
        ));
        assert!(matches!(
            second,
            QueryOutcome::Failure {
                reason: FailureReason::Unknown { .. }
            }
        ));
    }
}
