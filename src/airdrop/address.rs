use crate::config::ChainConfig;
use tracing::warn;

/// Lowercase, prefixed address as sent to the allocation service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedAddress(String);

impl NormalizedAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct AddressNormalizer {
    prefix: String,
    expected_length: usize,
}

impl Default for AddressNormalizer {
    fn default() -> Self {
        Self::from_config(&ChainConfig::default())
    }
}

impl AddressNormalizer {
    pub fn new(prefix: impl Into<String>, expected_length: usize) -> Self {
        Self {
            prefix: prefix.into().to_lowercase(),
            expected_length,
        }
    }

    pub fn from_config(chain: &ChainConfig) -> Self {
        Self::new(chain.address_prefix.clone(), chain.address_length)
    }

    /// Canonicalize an address. Never fails.
    ///
    /// A result whose length differs from the chain's address width is still
    /// returned; the mismatch is only logged.
    pub fn normalize(&self, raw: &str) -> NormalizedAddress {
        let mut normalized = raw.to_lowercase();

        if !normalized.starts_with(&self.prefix) {
            normalized.insert_str(0, &self.prefix);
        }

        if normalized.len() != self.expected_length {
            warn!(
                address = %raw,
                length = normalized.len(),
                expected = self.expected_length,
                "Address {} has unexpected length: {} characters",
                raw,
                normalized.len()
            );
        }

        NormalizedAddress(normalized)
    }

    pub fn has_expected_length(&self, address: &NormalizedAddress) -> bool {
        address.len() == self.expected_length
    }

    pub fn expected_length(&self) -> usize {
        self.expected_length
    }
}
