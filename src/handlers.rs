use crate::errors::AppError;
use crate::loader::load;
use crate::models::{IndexQuery, Mood, MoodEntry, MoodForm, MoodRequest, TodayResponse};
use crate::recorder::record;
use crate::state::AppState;
use crate::stats::{aggregate, ranked};
use crate::ui::{render_index, render_today, IndexPage};
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate};

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    let today_section = today_section(&state).await?;
    Ok(Html(render_index(&IndexPage {
        today_section: &today_section,
        logged: query.logged.is_some_and(|flag| flag != 0),
        auto_refresh: query.refresh.is_some_and(|flag| flag != 0),
        refresh_secs: state.refresh_interval.as_secs(),
    })))
}

pub async fn today(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(today_section(&state).await?))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    let date = today_date();
    let table = load(state.sheet.as_ref()).await?;
    let counts = ranked(&aggregate(&table, date));

    Ok(Json(TodayResponse {
        date: date.to_string(),
        total: counts.iter().map(|entry| entry.count).sum(),
        counts,
        warning: table.warning,
    }))
}

pub async fn submit_mood(
    State(state): State<AppState>,
    Form(form): Form<MoodForm>,
) -> Result<Redirect, AppError> {
    let mood = parse_mood(&form.mood)?;
    record(state.sheet.as_ref(), mood, &form.note).await?;

    if form.refresh.is_empty() {
        Ok(Redirect::to("/?logged=1"))
    } else {
        Ok(Redirect::to("/?logged=1&refresh=1"))
    }
}

pub async fn create_mood(
    State(state): State<AppState>,
    Json(payload): Json<MoodRequest>,
) -> Result<Json<MoodEntry>, AppError> {
    let mood = parse_mood(&payload.mood)?;
    let entry = record(state.sheet.as_ref(), mood, &payload.note).await?;
    Ok(Json(entry))
}

async fn today_section(state: &AppState) -> Result<String, AppError> {
    let date = today_date();
    let table = load(state.sheet.as_ref()).await?;
    let counts = ranked(&aggregate(&table, date));
    Ok(render_today(&date.to_string(), &counts, table.warning.as_deref()))
}

fn parse_mood(symbol: &str) -> Result<Mood, AppError> {
    Mood::from_symbol(symbol).ok_or_else(|| {
        let allowed = Mood::ALL
            .iter()
            .map(|mood| mood.symbol())
            .collect::<Vec<_>>()
            .join(", ");
        AppError::bad_request(format!("mood must be one of {allowed}"))
    })
}

fn today_date() -> NaiveDate {
    Local::now().date_naive()
}
