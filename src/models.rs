use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const HEADER: [&str; 3] = ["timestamp", "mood", "note"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Angry,
    Confused,
    Celebrating,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Angry, Mood::Confused, Mood::Celebrating];

    pub fn symbol(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Angry => "😠",
            Mood::Confused => "😕",
            Mood::Celebrating => "🎉",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Angry => "Angry",
            Mood::Confused => "Confused",
            Mood::Celebrating => "Celebrating",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Mood::Happy => "#f2b134",
            Mood::Angry => "#d9483b",
            Mood::Confused => "#6c8ebf",
            Mood::Celebrating => "#4fa36c",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let symbol = symbol.trim();
        Self::ALL.into_iter().find(|mood| mood.symbol() == symbol)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

pub type Record = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodEntry {
    pub timestamp: String,
    pub mood: String,
    pub note: String,
}

impl MoodEntry {
    pub fn new(at: NaiveDateTime, mood: Mood, note: &str) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            mood: mood.symbol().to_string(),
            note: note.to_string(),
        }
    }

    pub fn fields(&self) -> Vec<String> {
        vec![self.timestamp.clone(), self.mood.clone(), self.note.clone()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRow {
    pub timestamp: Option<NaiveDateTime>,
    pub mood: String,
    pub note: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadedTable {
    pub rows: Vec<LoadedRow>,
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoodRequest {
    pub mood: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct MoodForm {
    pub mood: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub refresh: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    pub logged: Option<u8>,
    #[serde(default)]
    pub refresh: Option<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoodCount {
    pub mood: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: String,
    pub counts: Vec<MoodCount>,
    pub total: u64,
    pub warning: Option<String>,
}
