#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A monitored employer row.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyRow {
    pub id: i64,
    pub name: String,
    pub career_url: String,
    pub ats_platform: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub last_scraped_at: Option<DateTime<Utc>>,
}
