use serde::{Deserialize, Serialize};

/// One row of the input wallet sheet
#[derive(Clone, Deserialize, PartialEq)]
pub struct InputRecord {
    #[serde(rename = "num")]
    pub sequence_number: String,
    /// Opaque key material, copied to the output untouched
    #[serde(rename = "pk", default)]
    pub secret_material: String,
    #[serde(rename = "add")]
    pub address: String,
    #[serde(rename = "proxy", default)]
    pub egress_descriptor: String,
}

impl InputRecord {
    pub fn new(
        sequence_number: impl Into<String>,
        address: impl Into<String>,
        egress_descriptor: impl Into<String>,
    ) -> Self {
        Self {
            sequence_number: sequence_number.into(),
            secret_material: String::new(),
            address: address.into(),
            egress_descriptor: egress_descriptor.into(),
        }
    }
}

// Key material never reaches the logs.
impl std::fmt::Debug for InputRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputRecord")
            .field("sequence_number", &self.sequence_number)
            .field("secret_material", &"<redacted>")
            .field("address", &self.address)
            .field("egress_descriptor", &self.egress_descriptor)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Success,
    Error,
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowStatus::Success => write!(f, "success"),
            RowStatus::Error => write!(f, "error"),
        }
    }
}

/// One output row per input record
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub num: String,
    pub pk: String,
    pub address: String,
    pub amount: String,
    pub amount_raw: String,
    /// Payload fields in configured order, empty strings on failure
    pub passthrough: Vec<(String, String)>,
    pub status: RowStatus,
    pub error: String,
}

impl ResultRow {
    /// Column names for a report with the given pass-through fields
    pub fn header(passthrough_fields: &[String]) -> Vec<String> {
        let mut header = vec![
            "num".to_string(),
            "pk".to_string(),
            "address".to_string(),
            "amount".to_string(),
            "amount_raw".to_string(),
        ];
        header.extend(passthrough_fields.iter().cloned());
        header.push("status".to_string());
        header.push("error".to_string());
        header
    }

    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![
            self.num.clone(),
            self.pk.clone(),
            self.address.clone(),
            self.amount.clone(),
            self.amount_raw.clone(),
        ];
        record.extend(self.passthrough.iter().map(|(_, value)| value.clone()));
        record.push(self.status.to_string());
        record.push(self.error.clone());
        record
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.passthrough
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        self.status == RowStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret_material() {
        let mut record = InputRecord::new("1", "0xabc", "");
        record.secret_material = "deadbeef".to_string();

        let rendered = format!("{:?}", record);
        assert!(!rendered.contains("deadbeef"));
        assert!(rendered.contains("0xabc"));
    }

    #[test]
    fn test_header_and_record_align() {
        let fields = vec!["xp_rank".to_string(), "total_xp".to_string()];
        let row = ResultRow {
            num: "7".to_string(),
            pk: "pk".to_string(),
            address: "0xabc".to_string(),
            amount: "1.500000".to_string(),
            amount_raw: "1500000".to_string(),
            passthrough: vec![
                ("xp_rank".to_string(), "12".to_string()),
                ("total_xp".to_string(), "900".to_string()),
            ],
            status: RowStatus::Success,
            error: String::new(),
        };

        let header = ResultRow::header(&fields);
        let record = row.to_record();

        assert_eq!(header.len(), record.len());
        assert_eq!(header[5], "xp_rank");
        assert_eq!(record[5], "12");
        assert_eq!(record[7], "success");
        assert_eq!(row.field("total_xp"), Some("900"));
    }
}
