use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No records found in {0}")]
    NoRecords(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CheckerError {
    /// Process exit status for a fatal batch error
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckerError::NoRecords(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_records_has_distinct_exit_code() {
        let empty = CheckerError::NoRecords("wallet.csv".to_string());
        let parse = CheckerError::Config("bad".to_string());

        assert_eq!(empty.exit_code(), 2);
        assert_eq!(parse.exit_code(), 1);
        assert_eq!(empty.to_string(), "No records found in wallet.csv");
    }
}
