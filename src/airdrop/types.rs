use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

/// Decimal places kept in stored amounts
pub const AMOUNT_DECIMALS: u32 = 6;

/// Largest display amount kept, 10^22. Anything beyond it converts to zero so
/// that a formatted amount and the running total always stay representable.
pub const MAX_DISPLAY_AMOUNT: Decimal = Decimal::from_parts(2_990_538_752, 434_162_106, 542, false, 0);

/// Field carrying the base-unit allocation amount
pub const AMOUNT_FIELD: &str = "amount";

/// JSON object returned by the allocation service.
///
/// Only [`AMOUNT_FIELD`] is interpreted; everything else is carried through
/// to the result row as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemotePayload(Map<String, Value>);

impl RemotePayload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw amount exactly as the service sent it, empty when absent
    pub fn raw_amount(&self) -> String {
        self.field_text(AMOUNT_FIELD)
    }

    /// Raw amount converted to display units
    pub fn display_amount(&self, scale: u64) -> Decimal {
        to_display_units(&self.raw_amount(), scale)
    }

    /// Render a field for tabular output; strings unquoted, null and absent empty
    pub fn field_text(&self, name: &str) -> String {
        match self.0.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Value> for RemotePayload {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self::default(),
        }
    }
}

/// Convert a base-unit integer string to display units.
///
/// Anything that is not an integer, or lands beyond [`MAX_DISPLAY_AMOUNT`],
/// converts to zero.
pub fn to_display_units(raw: &str, scale: u64) -> Decimal {
    let Ok(units) = raw.trim().parse::<i128>() else {
        return Decimal::ZERO;
    };
    let Ok(units) = Decimal::try_from_i128_with_scale(units, 0) else {
        return Decimal::ZERO;
    };

    units
        .checked_div(Decimal::from(scale))
        .map(|amount| amount.round_dp(AMOUNT_DECIMALS))
        .filter(|amount| amount.abs() <= MAX_DISPLAY_AMOUNT)
        .unwrap_or(Decimal::ZERO)
}

/// Why a single address query failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureReason {
    #[error(
        "HTTP error {status_code}{}",
        .body.as_ref().map(|body| format!(": {}", body)).unwrap_or_default()
    )]
    Http {
        status_code: u16,
        body: Option<Value>,
    },

    /// No status code was ever received
    #[error("network error")]
    Network { detail: String },

    #[error("transport configuration error: {detail}")]
    TransportConfiguration { detail: String },

    #[error("{message}")]
    Unknown { message: String },
}

impl FailureReason {
    pub fn unknown(message: impl Into<String>) -> Self {
        FailureReason::Unknown {
            message: message.into(),
        }
    }
}

/// Classified result of one allocation lookup
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Success { payload: RemotePayload },
    Failure { reason: FailureReason },
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success { .. })
    }
}
