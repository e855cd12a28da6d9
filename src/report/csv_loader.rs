//! Reading and writing the survey CSV export

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::io::{Read, Write};
use std::time::Duration;

use crate::error::{Result, SurveyError};
use crate::model::{SubmissionRecord, RECORD_FIELDS};

/// One data row of the export, with its position among the data rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub index: usize,
    pub record: SubmissionRecord,
}

/// Parse CSV text (RFC4180 quoting, header row required)
pub fn read_records(content: &str) -> Result<Vec<CsvRow>> {
    read_records_from(content.as_bytes())
}

pub fn read_records_from<R: Read>(input: R) -> Result<Vec<CsvRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let columns = column_positions(&headers)?;

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let raw = result?;
        let field = |i: usize| raw.get(columns[i]).unwrap_or("").to_string();

        rows.push(CsvRow {
            index,
            record: SubmissionRecord {
                timestamp: field(0),
                language: field(1),
                player_name: field(2),
                q2_time: field(3),
                q3_time: field(4),
                q4_day: field(5),
            },
        });
    }

    log::debug!("Read {} CSV rows", rows.len());
    Ok(rows)
}

/// Map each required column to its position, or report every missing one
fn column_positions(headers: &StringRecord) -> Result<[usize; 6]> {
    let names: Vec<&str> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect();

    let mut positions = [0usize; 6];
    let mut missing = Vec::new();
    for (slot, wanted) in RECORD_FIELDS.iter().enumerate() {
        match names.iter().position(|n| n == wanted) {
            Some(pos) => positions[slot] = pos,
            None => missing.push(wanted.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(SurveyError::MissingColumns(missing));
    }
    Ok(positions)
}

/// Write records with the standard header, quoting only where needed
pub fn write_records<W: Write>(records: &[SubmissionRecord], output: W) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(output);
    writer.write_record(RECORD_FIELDS)?;
    for record in records {
        writer.write_record(record.values())?;
    }
    writer.flush()?;
    Ok(())
}

/// Load CSV text from a local path or an http(s) URL
pub fn load_source(source: &str) -> Result<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        log::info!("Fetching CSV from {}", source);
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let response = client.get(source).send()?.error_for_status()?;
        return Ok(response.text()?);
    }

    log::info!("Reading CSV from {}", source);
    Ok(std::fs::read_to_string(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_quoted_fields() {
        let csv = "timestamp,language,player_name,Q2_time,Q3_time,Q4_day\n\
                   2025-01-01T00:00:00Z,en,\"Smith, \"\"Ace\"\"\",A,B,\"A. Monday\"\n\
                   2025-01-02T00:00:00Z,ja,\"multi\nline\",B,C,D\n";
        let rows = read_records(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].record.player_name, "Smith, \"Ace\"");
        assert_eq!(rows[0].record.q4_day, "A. Monday");
        assert_eq!(rows[1].record.player_name, "multi\nline");
        assert_eq!(rows[1].index, 1);
    }

    #[test]
    fn test_columns_in_any_order_with_extras() {
        let csv = "\u{feff}player_name,note,Q4_day,Q3_time,Q2_time,language,timestamp\nBob,hi,H,E,D,fr,t\n";
        let rows = read_records(csv).unwrap();
        let r = &rows[0].record;
        assert_eq!((r.player_name.as_str(), r.language.as_str(), r.q4_day.as_str()), ("Bob", "fr", "H"));
        assert_eq!(r.timestamp, "t");
    }

    #[test]
    fn test_missing_header_is_fatal() {
        let csv = "timestamp,language,player_name,Q2_time,Q3_time\nt,en,Bob,A,B\n";
        match read_records(csv) {
            Err(SurveyError::MissingColumns(cols)) => assert_eq!(cols, vec!["Q4_day"]),
            other => panic!("expected missing columns, got {:?}", other),
        }
        assert!(matches!(read_records(""), Err(SurveyError::MissingColumns(_))));
    }

    #[test]
    fn test_short_rows_padded() {
        let csv = "timestamp,language,player_name,Q2_time,Q3_time,Q4_day\nt,en,Bob\n";
        let rows = read_records(csv).unwrap();
        assert_eq!(rows[0].record.q2_time, "");
    }

    #[test]
    fn test_write_then_read() {
        let records = vec![SubmissionRecord {
            timestamp: "2025-01-01T00:00:00Z".to_string(),
            language: "en".to_string(),
            player_name: "O'Neil, Pat".to_string(),
            q2_time: "A".to_string(),
            q3_time: "B".to_string(),
            q4_day: "C".to_string(),
        }];
        let mut out = Vec::new();
        write_records(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("timestamp,language,player_name,Q2_time,Q3_time,Q4_day\n"));
        assert!(text.contains("\"O'Neil, Pat\""));
        assert_eq!(read_records(&text).unwrap()[0].record, records[0]);
    }

    #[test]
    fn test_load_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.csv");
        std::fs::write(&path, "timestamp,language,player_name,Q2_time,Q3_time,Q4_day\n").unwrap();
        let text = load_source(path.to_str().unwrap()).unwrap();
        assert!(read_records(&text).unwrap().is_empty());
    }
}
