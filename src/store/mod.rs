mod file;
mod google;

pub use file::FileSheet;
pub use google::GoogleSheet;

use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::models::Record;
use tracing::info;

pub trait TableStore {
    fn append_row(&self, fields: &[String]) -> impl Future<Output = Result<(), StoreError>> + Send;
    fn get_all_records(&self) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send;
}

pub enum Sheet {
    File(FileSheet),
    Google(GoogleSheet),
}

impl TableStore for Sheet {
    async fn append_row(&self, fields: &[String]) -> Result<(), StoreError> {
        match self {
            Sheet::File(sheet) => sheet.append_row(fields).await,
            Sheet::Google(sheet) => sheet.append_row(fields).await,
        }
    }

    async fn get_all_records(&self) -> Result<Vec<Record>, StoreError> {
        match self {
            Sheet::File(sheet) => sheet.get_all_records().await,
            Sheet::Google(sheet) => sheet.get_all_records().await,
        }
    }
}

pub async fn connect(config: &StoreConfig) -> Result<Sheet, StoreError> {
    match config {
        StoreConfig::File { path } => {
            let sheet = FileSheet::open(path).await?;
            info!(path = %path.display(), "using file sheet");
            Ok(Sheet::File(sheet))
        }
        StoreConfig::Google { key_file, sheet } => {
            let sheet = GoogleSheet::connect(key_file, sheet).await?;
            info!(
                spreadsheet = sheet.spreadsheet_id(),
                worksheet = sheet.worksheet(),
                "using google sheet"
            );
            Ok(Sheet::Google(sheet))
        }
    }
}

// Short rows are padded and cells past the header are dropped.
pub(crate) fn records_from_rows(rows: Vec<Vec<String>>) -> Vec<Record> {
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header
        .into_iter()
        .map(|name| name.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    rows.map(|row| {
        let mut cells = row.into_iter();
        header
            .iter()
            .map(|name| (name, cells.next().unwrap_or_default()))
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, cell)| (name.clone(), cell))
            .collect()
    })
    .collect()
}
