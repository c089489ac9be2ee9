//! Mood, task and journaling summaries over a trailing window of days.
//!
//! The computations are pure and take `today` explicitly; the handlers load
//! the window, compute, and store the result as the user's latest insight.

use std::collections::{BTreeMap, HashSet};

use axum::{Extension, Json, extract::State};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use herspace_types::api::{
    AnalyticsQuery, Claims, EntryLengthStats, JournalAnalytics, MoodAnalytics, MoodTrendPoint,
    TaskAnalytics, TaskTrendPoint,
};
use herspace_types::enums::InsightType;
use herspace_types::models::{DailyTask, JournalEntry, MoodCheckIn, UserInsight};

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::extract::QueryParams;

pub const DEFAULT_DAYS: i64 = 30;
const MAX_DAYS: i64 = 365;
const TREND_DAYS: i64 = 7;
const STREAK_LOOKBACK: i64 = 30;
const NO_DATA: &str = "No data";
const WEEKDAYS: [&str; 7] = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];

pub fn clamp_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 { 0.0 } else { round2(f64::from(part) / f64::from(whole) * 100.0) }
}

/// First key with the highest count; ties go to the earlier key.
fn most_frequent<'a>(counts: impl IntoIterator<Item = (&'a str, u32)>) -> Option<&'a str> {
    let mut best: Option<(&str, u32)> = None;
    for (key, count) in counts {
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}

pub fn mood_analytics(checkins: &[MoodCheckIn], today: NaiveDate) -> MoodAnalytics {
    let mut distribution: BTreeMap<String, u32> = BTreeMap::new();
    for checkin in checkins {
        *distribution.entry(checkin.mood.as_ref().to_string()).or_default() += 1;
    }

    let total = checkins.len() as u32;
    let score: u32 = checkins.iter().map(|c| c.mood.score()).sum();
    let average = if total == 0 { 0.0 } else { round2(f64::from(score) / f64::from(total)) };

    let trend_start = today - Duration::days(TREND_DAYS - 1);
    let mood_trend = checkins
        .iter()
        .filter(|c| c.date >= trend_start && c.date <= today)
        .map(|c| MoodTrendPoint { date: c.date, mood: c.mood })
        .collect();

    let most_common = most_frequent(distribution.iter().map(|(k, v)| (k.as_str(), *v)))
        .unwrap_or(NO_DATA)
        .to_string();

    MoodAnalytics {
        total_checkins: total,
        most_common_mood: most_common,
        mood_distribution: distribution,
        average_mood_score: average,
        mood_trend,
    }
}

pub fn task_analytics(tasks: &[DailyTask], today: NaiveDate) -> TaskAnalytics {
    let total = tasks.len() as u32;
    let completed = tasks.iter().filter(|t| t.completed).count() as u32;

    let task_completion_trend = (0..TREND_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let day: Vec<&DailyTask> = tasks.iter().filter(|t| t.date == date).collect();
            let done = day.iter().filter(|t| t.completed).count() as u32;
            let all = day.len() as u32;
            TaskTrendPoint { date, completed: done, total: all, rate: percent(done, all) }
        })
        .collect();

    TaskAnalytics {
        total_tasks: total,
        completed_tasks: completed,
        completion_rate: percent(completed, total),
        task_completion_trend,
    }
}

pub fn journal_analytics(entries: &[JournalEntry], days: i64, today: NaiveDate) -> JournalAnalytics {
    if entries.is_empty() {
        return JournalAnalytics {
            total_entries: 0,
            average_entries_per_week: 0.0,
            most_active_day: NO_DATA.to_string(),
            entry_length_stats: None,
            journaling_streak: 0,
        };
    }

    let total = entries.len() as u32;
    let weeks = (days as f64 / 7.0).max(1.0);

    let mut per_weekday = [0u32; 7];
    for entry in entries {
        per_weekday[entry.created_at.weekday().num_days_from_sunday() as usize] += 1;
    }
    let most_active_day = most_frequent(WEEKDAYS.iter().copied().zip(per_weekday))
        .unwrap_or(NO_DATA)
        .to_string();

    let lengths: Vec<usize> = entries.iter().map(|e| e.content.chars().count()).collect();
    let entry_length_stats = EntryLengthStats {
        average_length: (lengths.iter().sum::<usize>() as f64 / lengths.len() as f64).round() as usize,
        shortest: lengths.iter().copied().min().unwrap_or_default(),
        longest: lengths.iter().copied().max().unwrap_or_default(),
    };

    let active_days: HashSet<NaiveDate> = entries.iter().map(|e| e.created_at.date_naive()).collect();
    let journaling_streak = (0..STREAK_LOOKBACK)
        .take_while(|offset| active_days.contains(&(today - Duration::days(*offset))))
        .count() as u32;

    JournalAnalytics {
        total_entries: total,
        average_entries_per_week: round2(f64::from(total) / weeks),
        most_active_day,
        entry_length_stats: Some(entry_length_stats),
        journaling_streak,
    }
}

fn insight<T: Serialize>(insight_type: InsightType, data: &T) -> anyhow::Result<UserInsight> {
    Ok(UserInsight {
        id: uuid::Uuid::new_v4(),
        insight_type,
        data: serde_json::to_value(data)?,
        computed_at: Utc::now(),
    })
}

pub async fn mood(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    QueryParams(query): QueryParams<AnalyticsQuery>,
) -> Result<Json<MoodAnalytics>, ApiError> {
    let today = Utc::now().date_naive();
    let since = today - Duration::days(clamp_days(query.days));
    let analytics = blocking(&state, move |db| {
        let analytics = mood_analytics(&db.mood_checkins_since(claims.sub, since)?, today);
        db.upsert_insight(claims.sub, &insight(InsightType::MoodPattern, &analytics)?)?;
        Ok(analytics)
    })
    .await?;
    Ok(Json(analytics))
}

pub async fn tasks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    QueryParams(query): QueryParams<AnalyticsQuery>,
) -> Result<Json<TaskAnalytics>, ApiError> {
    let today = Utc::now().date_naive();
    let since = today - Duration::days(clamp_days(query.days));
    let analytics = blocking(&state, move |db| {
        let analytics = task_analytics(&db.daily_tasks_since(claims.sub, since)?, today);
        db.upsert_insight(claims.sub, &insight(InsightType::TaskCompletion, &analytics)?)?;
        Ok(analytics)
    })
    .await?;
    Ok(Json(analytics))
}

pub async fn journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    QueryParams(query): QueryParams<AnalyticsQuery>,
) -> Result<Json<JournalAnalytics>, ApiError> {
    let days = clamp_days(query.days);
    let today = Utc::now().date_naive();
    let since = (today - Duration::days(days)).and_time(NaiveTime::MIN).and_utc();
    let analytics = blocking(&state, move |db| {
        let analytics = journal_analytics(&db.journal_entries_since(claims.sub, since)?, days, today);
        db.upsert_insight(claims.sub, &insight(InsightType::JournalFrequency, &analytics)?)?;
        Ok(analytics)
    })
    .await?;
    Ok(Json(analytics))
}

pub async fn insights(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserInsight>>, ApiError> {
    let insights = blocking(&state, move |db| db.list_insights(claims.sub)).await?;
    Ok(Json(insights))
}
