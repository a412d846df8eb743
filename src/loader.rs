use crate::errors::StoreError;
use crate::models::{LoadedRow, LoadedTable, Record, TIMESTAMP_FORMAT};
use crate::store::TableStore;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

const DATETIME_FORMATS: [&str; 5] = [
    TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

pub async fn load<S: TableStore>(store: &S) -> Result<LoadedTable, StoreError> {
    let records = store.get_all_records().await?;
    Ok(load_records(records))
}

pub fn load_records(records: Vec<Record>) -> LoadedTable {
    let has_timestamps = records.iter().any(|record| record.contains_key("timestamp"));
    if !has_timestamps {
        return LoadedTable {
            rows: records.into_iter().map(|record| dateless_row(record, None)).collect(),
            warning: None,
        };
    }

    // A header with a timestamp column but no cell filled in anywhere.
    let column_blank = records.iter().all(|record| {
        record
            .get("timestamp")
            .is_none_or(|value| value.trim().is_empty())
    });
    if column_blank {
        let message = "Error parsing timestamps: the timestamp column is empty".to_string();
        warn!(rows = records.len(), "{message}");
        return LoadedTable {
            rows: records.into_iter().map(|record| dateless_row(record, None)).collect(),
            warning: Some(message),
        };
    }

    let parsed: Vec<(Option<NaiveDateTime>, Record)> = records
        .into_iter()
        .map(|record| {
            let timestamp = record.get("timestamp").and_then(|value| parse_timestamp(value));
            (timestamp, record)
        })
        .collect();

    let valid = parsed.iter().filter(|(timestamp, _)| timestamp.is_some()).count();
    let dropped = parsed.len() - valid;
    if dropped > 0 {
        debug!(dropped, "skipped rows with unreadable timestamps");
    }

    let rows = parsed
        .into_iter()
        .filter_map(|(timestamp, record)| {
            let timestamp = timestamp?;
            let mut row = dateless_row(record, Some(timestamp));
            row.date = Some(timestamp.date());
            Some(row)
        })
        .collect();

    LoadedTable { rows, warning: None }
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Local).naive_local());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn dateless_row(mut record: Record, timestamp: Option<NaiveDateTime>) -> LoadedRow {
    LoadedRow {
        timestamp,
        mood: record.remove("mood").unwrap_or_default().trim().to_string(),
        note: record.remove("note").unwrap_or_default(),
        date: None,
    }
}
