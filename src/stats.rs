use crate::models::{LoadedTable, Mood, MoodCount};
use chrono::NaiveDate;
use std::cmp::Reverse;
use std::collections::BTreeMap;

pub fn aggregate(table: &LoadedTable, today: NaiveDate) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for row in table.rows.iter().filter(|row| row.date == Some(today)) {
        let count = counts.entry(row.mood.clone()).or_insert(0u64);
        *count = count.saturating_add(1);
    }
    counts
}

// Most frequent first, then selector order, then unknown symbols by name.
pub fn ranked(counts: &BTreeMap<String, u64>) -> Vec<MoodCount> {
    let mut ranked: Vec<MoodCount> = counts
        .iter()
        .map(|(mood, count)| MoodCount {
            mood: mood.clone(),
            count: *count,
        })
        .collect();

    ranked.sort_by_key(|entry| {
        let position = Mood::ALL
            .iter()
            .position(|mood| mood.symbol() == entry.mood)
            .unwrap_or(Mood::ALL.len());
        (Reverse(entry.count), position, entry.mood.clone())
    });
    ranked
}
