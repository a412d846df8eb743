use super::{records_from_rows, TableStore};
use crate::config::SheetLocator;
use crate::errors::StoreError;
use crate::models::Record;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::{fs, sync::Mutex};
use tracing::debug;

const SCOPES: &str = "https://spreadsheets.google.com/feeds https://www.googleapis.com/auth/drive";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SHEETS_API: &str = "https://sheets.googleapis.com/";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const TOKEN_LIFETIME_SECS: i64 = 3600;
// Refresh a little early so a token never expires mid-request.
const TOKEN_SLACK_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct DriveFiles {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<WorksheetMeta>,
}

#[derive(Debug, Deserialize)]
struct WorksheetMeta {
    properties: WorksheetProperties,
}

#[derive(Debug, Deserialize)]
struct WorksheetProperties {
    title: String,
    #[serde(default)]
    index: u32,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct GoogleSheet {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    spreadsheet_id: String,
    worksheet: String,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheet {
    pub async fn connect(key_file: &Path, locator: &SheetLocator) -> Result<Self, StoreError> {
        let raw = fs::read(key_file).await?;
        let key: ServiceAccountKey = serde_json::from_slice(&raw)?;
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;

        let mut sheet = Self {
            client: Client::new(),
            key,
            encoding_key,
            spreadsheet_id: String::new(),
            worksheet: String::new(),
            token: Mutex::new(None),
        };

        sheet.spreadsheet_id = match locator {
            SheetLocator::Id(id) => id.clone(),
            SheetLocator::Name(name) => sheet.find_spreadsheet(name).await?,
        };
        sheet.worksheet = sheet.first_worksheet().await?;
        Ok(sheet)
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion =
            jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("token exchange returned {status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = token
            .expires_in
            .unwrap_or(TOKEN_LIFETIME_SECS as u64)
            .saturating_sub(TOKEN_SLACK_SECS);
        debug!(lifetime_secs = lifetime, "refreshed sheet access token");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(token.access_token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let token = self.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                StoreError::Auth(format!("{status}: {body}"))
            }
            StatusCode::NOT_FOUND => StoreError::NotFound(format!("{status}: {body}")),
            _ => StoreError::Malformed(format!("unexpected response {status}: {body}")),
        })
    }

    async fn find_spreadsheet(&self, name: &str) -> Result<String, StoreError> {
        let query = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'")
        );
        let request = self.client.get(DRIVE_FILES_API).query(&[
            ("q", query.as_str()),
            ("fields", "files(id,name)"),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ]);
        let listing: DriveFiles = self.send(request).await?;
        listing
            .files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| StoreError::NotFound(format!("no spreadsheet named {name:?}")))
    }

    async fn first_worksheet(&self) -> Result<String, StoreError> {
        let url = self.api_url(&[])?;
        let request = self
            .client
            .get(url)
            .query(&[("fields", "sheets.properties(title,index)")]);
        let meta: SpreadsheetMeta = self.send(request).await?;
        meta.sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .min_by_key(|properties| properties.index)
            .map(|properties| properties.title)
            .ok_or_else(|| StoreError::NotFound(format!("{} has no worksheets", self.spreadsheet_id)))
    }

    fn api_url(&self, tail: &[&str]) -> Result<Url, StoreError> {
        let mut url = Url::parse(SHEETS_API).map_err(|err| StoreError::Malformed(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Malformed("sheets api url has no path".into()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(tail);
        Ok(url)
    }

    fn worksheet_range(&self) -> String {
        format!("'{}'", self.worksheet.replace('\'', "''"))
    }
}

impl TableStore for GoogleSheet {
    async fn append_row(&self, fields: &[String]) -> Result<(), StoreError> {
        let segment = format!("{}:append", self.worksheet_range());
        let url = self.api_url(&["values", segment.as_str()])?;
        let request = self
            .client
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": [fields] }));
        let _: Value = self.send(request).await?;
        Ok(())
    }

    async fn get_all_records(&self) -> Result<Vec<Record>, StoreError> {
        let range = self.worksheet_range();
        let url = self.api_url(&["values", range.as_str()])?;
        let request = self.client.get(url).query(&[("majorDimension", "ROWS")]);
        let values: ValueRange = self.send(request).await?;

        let rows = values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        Ok(records_from_rows(rows))
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
