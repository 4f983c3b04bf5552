use url::Url;

use super::{Transport, TransportError};

const SUPPORTED_SCHEMES: [&str; 4] = ["http", "https", "socks5", "socks5h"];

/// Outbound path for one record, usually a proxy. Empty means direct.
///
/// Parsing is deferred until the descriptor is used, so a malformed value
/// only fails the record that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EgressDescriptor(String);

impl EgressDescriptor {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn direct() -> Self {
        Self::default()
    }

    pub fn is_direct(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the proxy URL.
    ///
    /// Accepts `scheme://[user:pass@]host[:port]` for http, https, socks5 and
    /// socks5h, or the `host:port[:user:pass]` shorthand for http proxies.
    pub fn proxy_url(&self) -> Result<Option<Url>, TransportError> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let url = if raw.contains("://") {
            Url::parse(raw).map_err(|err| self.invalid(err.to_string()))?
        } else {
            self.parse_shorthand(raw)?
        };

        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(self.invalid(format!("unsupported proxy scheme `{}`", url.scheme())));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(self.invalid("missing proxy host"));
        }

        Ok(Some(url))
    }

    /// Printable form with credentials stripped
    pub fn redacted(&self) -> String {
        match self.proxy_url() {
            Ok(None) => "direct".to_string(),
            Ok(Some(url)) => match url.port_or_known_default() {
                Some(port) => format!(
                    "{}://{}:{}",
                    url.scheme(),
                    url.host_str().unwrap_or_default(),
                    port
                ),
                None => format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default()),
            },
            Err(_) => self.masked(),
        }
    }

    fn masked(&self) -> String {
        match self.0.rsplit_once('@') {
            Some((_, host)) => format!("***@{}", host.trim()),
            None => self.0.trim().to_string(),
        }
    }

    fn parse_shorthand(&self, raw: &str) -> Result<Url, TransportError> {
        let parts: Vec<&str> = raw.split(':').collect();
        let (host, port, credentials) = match parts.as_slice() {
            [host, port] => (*host, *port, None),
            [host, port, user, pass] => (*host, *port, Some((*user, *pass))),
            _ => return Err(self.invalid("expected host:port or host:port:user:pass")),
        };

        let port: u16 = port
            .parse()
            .map_err(|_| self.invalid(format!("invalid proxy port `{}`", port)))?;

        let mut url = Url::parse(&format!("http://{}:{}", host, port))
            .map_err(|err| self.invalid(err.to_string()))?;

        if let Some((user, pass)) = credentials {
            url.set_username(user)
                .map_err(|_| self.invalid("proxy host cannot carry credentials"))?;
            url.set_password(Some(pass))
                .map_err(|_| self.invalid("proxy host cannot carry credentials"))?;
        }

        Ok(url)
    }

    fn invalid(&self, reason: impl Into<String>) -> TransportError {
        TransportError::Configuration {
            descriptor: self.masked(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for EgressDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl From<&str> for EgressDescriptor {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Builds a fresh transport for every record.
///
/// Binding performs no I/O and cannot fail. Handles are never pooled, so each
/// record gets its own connection identity.
pub trait EgressBinder: Send + Sync {
    type Handle: Transport;

    fn bind(&self, descriptor: &EgressDescriptor) -> Self::Handle;
}

impl<T, F> EgressBinder for F
where
    T: Transport,
    F: Fn(&EgressDescriptor) -> T + Send + Sync,
{
    type Handle = T;

    fn bind(&self, descriptor: &EgressDescriptor) -> Self::Handle {
        (self)(descriptor)
    }
}
