use crate::errors::ConfigError;
use std::{env, net::IpAddr, path::PathBuf, time::Duration};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    File {
        path: PathBuf,
    },
    Google {
        key_file: PathBuf,
        sheet: SheetLocator,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetLocator {
    Id(String),
    Name(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub store: StoreConfig,
    pub refresh_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = match var("HOST") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "HOST", value })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port = match var("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => 8080,
        };
        let refresh_secs: u64 = match var("MOOD_REFRESH_SECS") {
            Some(value) => match value.parse() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(ConfigError::Invalid { name: "MOOD_REFRESH_SECS", value }),
            },
            None => 30,
        };

        let store = match var("MOOD_STORE").as_deref().map(str::trim) {
            None | Some("file") => StoreConfig::File {
                path: var("MOOD_SHEET_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("data/mood_log.csv")),
            },
            Some("google") => {
                let key_file = var("GOOGLE_SERVICE_ACCOUNT_FILE").ok_or(ConfigError::Missing {
                    name: "GOOGLE_SERVICE_ACCOUNT_FILE",
                    store: "google",
                })?;
                let sheet = match (var("MOOD_SPREADSHEET_ID"), var("MOOD_SHEET_NAME")) {
                    (Some(id), _) => SheetLocator::Id(id),
                    (None, Some(name)) => SheetLocator::Name(name),
                    (None, None) => {
                        return Err(ConfigError::Missing {
                            name: "MOOD_SHEET_NAME",
                            store: "google",
                        });
                    }
                };
                StoreConfig::Google {
                    key_file: PathBuf::from(key_file),
                    sheet,
                }
            }
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "MOOD_STORE",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            host,
            port,
            store,
            refresh_interval: Duration::from_secs(refresh_secs),
        })
    }
}
