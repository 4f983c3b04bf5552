use std::path::Path;

use crate::{
    error::{CheckerError, Result},
    storage::models::{InputRecord, ResultRow},
};
use tracing::{debug, info};

/// Read wallet records from a CSV sheet with `num,pk,add,proxy` columns.
///
/// Row order is preserved. A sheet that parses but holds no records is
/// reported as [`CheckerError::NoRecords`], separately from parse failures.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<InputRecord>> {
    let path = path.as_ref();

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let records = reader
        .deserialize::<InputRecord>()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

    if records.is_empty() {
        return Err(CheckerError::NoRecords(path.display().to_string()));
    }

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Keep only the first `limit` records; a limit that leaves nothing is
/// reported as [`CheckerError::NoRecords`] for `source`
pub fn limit_records(
    mut records: Vec<InputRecord>,
    limit: Option<usize>,
    source: &str,
) -> Result<Vec<InputRecord>> {
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    if records.is_empty() {
        return Err(CheckerError::NoRecords(source.to_string()));
    }

    Ok(records)
}

/// Write result rows to a CSV report, header first
pub fn write_results(
    path: impl AsRef<Path>,
    passthrough_fields: &[String],
    rows: &[ResultRow],
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(ResultRow::header(passthrough_fields))?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::RowStatus;
    use std::io::Write;

    fn sheet(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_preserves_row_order() {
        let file = sheet(
            "num,pk,add,proxy\n\
             1,key1,0xAAA,http://10.0.0.1:8080\n\
             2,key2,bbb,\n\
             3,key3,0xccc,10.0.0.3:3128:user:pass\n",
        );

        let records = load_records(file.path()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].sequence_number, "1");
        assert_eq!(records[0].egress_descriptor, "http://10.0.0.1:8080");
        assert_eq!(records[1].address, "bbb");
        assert_eq!(records[1].egress_descriptor, "");
        assert_eq!(records[2].secret_material, "key3");
    }

    #[test]
    fn test_load_without_proxy_column() {
        let file = sheet("num,pk,add\n1,key1,0xabc\n");

        let records = load_records(file.path()).unwrap();

        assert_eq!(records[0].egress_descriptor, "");
    }

    #[test]
    fn test_header_only_sheet_is_no_records() {
        let file = sheet("num,pk,add,proxy\n");

        let err = load_records(file.path()).unwrap_err();

        assert!(matches!(err, CheckerError::NoRecords(_)));
    }

    #[test]
    fn test_limit_keeps_leading_records() {
        let records = vec![
            InputRecord::new("1", "0xa", ""),
            InputRecord::new("2", "0xb", ""),
            InputRecord::new("3", "0xc", ""),
        ];

        let limited = limit_records(records.clone(), Some(2), "wallet.csv").unwrap();
        let nums: Vec<&str> = limited.iter().map(|r| r.sequence_number.as_str()).collect();
        assert_eq!(nums, vec!["1", "2"]);

        assert_eq!(limit_records(records.clone(), None, "wallet.csv").unwrap().len(), 3);
        assert_eq!(limit_records(records, Some(10), "wallet.csv").unwrap().len(), 3);
    }

    #[test]
    fn test_zero_limit_is_no_records() {
        let records = vec![InputRecord::new("1", "0xa", "")];

        let err = limit_records(records, Some(0), "wallet.csv").unwrap_err();

        assert!(matches!(err, CheckerError::NoRecords(source) if source == "wallet.csv"));
    }

    #[test]
    fn test_missing_address_column_is_parse_error() {
        let file = sheet("num,pk,wallet\n1,key,0xabc\n");

        let err = load_records(file.path()).unwrap_err();

        assert!(matches!(err, CheckerError::Csv(_)));
    }

    #[test]
    fn test_missing_file_is_not_no_records() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_records(dir.path().join("absent.csv")).unwrap_err();

        assert!(!matches!(err, CheckerError::NoRecords(_)));
    }

    #[test]
    fn test_write_results_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        let fields = vec!["xp_rank".to_string()];
        let rows = vec![ResultRow {
            num: "1".to_string(),
            pk: "key1".to_string(),
            address: "0xabc".to_string(),
            amount: "0".to_string(),
            amount_raw: "0".to_string(),
            passthrough: vec![("xp_rank".to_string(), String::new())],
            status: RowStatus::Error,
            error: "HTTP error 429: {\"message\":\"slow down\"}".to_string(),
        }];

        write_results(&path, &fields, &rows).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("num,pk,address,amount,amount_raw,xp_rank,status,error")
        );
        let line = lines.next().unwrap();
        assert!(line.starts_with("1,key1,0xabc,0,0,,error,"));
        assert!(line.contains("429"));
    }
}
