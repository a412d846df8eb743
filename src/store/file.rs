use super::{records_from_rows, TableStore};
use crate::errors::StoreError;
use crate::models::Record;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

pub struct FileSheet {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSheet {
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(Self {
                path: path.to_path_buf(),
                lock: Mutex::new(()),
            }),
            Ok(_) => Err(StoreError::NotFound(format!("{} is not a file", path.display()))),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.display().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
impl FileSheet {
    pub async fn create(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let header: Vec<String> = crate::models::HEADER
            .iter().map(|name| name.to_string()).collect();
        fs::write(path, encode_row(&header)).await?;
        Self::open(path).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableStore for FileSheet {
    async fn append_row(&self, fields: &[String]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let mut file = fs::OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        let len = file.metadata().await?.len();
        let mut line = String::new();
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1)).await?;
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                line.push('\n');
            }
        }
        line.push_str(&encode_row(fields));

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn get_all_records(&self) -> Result<Vec<Record>, StoreError> {
        let content = {
            let _guard = self.lock.lock().await;
            fs::read(&self.path).await?
        };
        let content = String::from_utf8_lossy(&content);
        Ok(records_from_rows(parse_rows(&content)))
    }
}

fn encode_row(fields: &[String]) -> String {
    let mut line = fields
        .iter()
        .map(|field| encode_field(field))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn encode_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// Quoted fields may span lines, so rows are split while scanning rather
// than line by line.
fn parse_rows(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows.retain(|row| !(row.len() == 1 && row[0].trim().is_empty()));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_sheet_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("mood_queue_{name}_{}_{nanos}.csv", std::process::id()));
        path
    }

    fn fields(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn parse_rows_handles_quotes_and_crlf() {
        let rows = parse_rows("timestamp,mood,note\r\n2024-03-01 09:15:00,😕,\"slow, \"\"very\"\"\nslow\"\r\n\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], fields(&["timestamp", "mood", "note"]));
        assert_eq!(rows[1][2], "slow, \"very\"\nslow");
    }

    #[test]
    fn parse_rows_keeps_final_row_without_newline() {
        let rows = parse_rows("timestamp,mood,note\n2024-03-01 09:15:00,😊,");
        assert_eq!(rows[1], fields(&["2024-03-01 09:15:00", "😊", ""]));
    }

    #[tokio::test]
    async fn open_rejects_missing_file() {
        let path = temp_sheet_path("missing");
        let err = FileSheet::open(&path).await.err().expect("missing sheet should fail");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn appended_rows_read_back_in_order() {
        let path = temp_sheet_path("append");
        let sheet = FileSheet::create(&path).await.unwrap();
        assert!(sheet.get_all_records().await.unwrap().is_empty());

        sheet
            .append_row(&fields(&["2024-03-01 09:15:00", "😕", "slow day"]))
            .await
            .unwrap();
        sheet
            .append_row(&fields(&["2024-03-01 09:20:00", "🎉", "shipped, finally \"done\""]))
            .await
            .unwrap();

        let records = sheet.get_all_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["mood"], "😕");
        assert_eq!(records[0]["note"], "slow day");
        assert_eq!(records[1]["note"], "shipped, finally \"done\"");

        std::fs::remove_file(sheet.path()).ok();
    }

    #[tokio::test]
    async fn append_repairs_missing_trailing_newline() {
        let path = temp_sheet_path("newline");
        std::fs::write(&path, "timestamp,mood,note\n2024-03-01 08:00:00,😊,x").unwrap();
        let sheet = FileSheet::open(&path).await.unwrap();

        sheet
            .append_row(&fields(&["2024-03-01 09:00:00", "😠", ""]))
            .await
            .unwrap();

        let records = sheet.get_all_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["mood"], "😠");

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn append_to_empty_file_writes_no_blank_line() {
        let path = temp_sheet_path("empty");
        std::fs::write(&path, "").unwrap();
        let sheet = FileSheet::open(&path).await.unwrap();

        sheet.append_row(&fields(&["timestamp", "mood", "note"])).await.unwrap();
        sheet
            .append_row(&fields(&["2024-03-01 09:00:00", "😊", ""]))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "timestamp,mood,note\n2024-03-01 09:00:00,😊,\n");

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn invalid_utf8_cells_still_load() {
        let path = temp_sheet_path("latin1");
        let mut content = b"timestamp,mood,note\n2024-03-01 09:00:00,\xf0\x9f\x98\x8a,caf".to_vec();
        content.extend_from_slice(&[0xe9, b'\n']);
        content.extend_from_slice("2024-03-01 10:00:00,😠,fine\n".as_bytes());
        std::fs::write(&path, content).unwrap();
        let sheet = FileSheet::open(&path).await.unwrap();

        let records = sheet.get_all_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["mood"], "😊");
        assert_eq!(records[0]["note"], "caf\u{fffd}");
        assert_eq!(records[1]["note"], "fine");

        std::fs::remove_file(&path).ok();
    }
}
