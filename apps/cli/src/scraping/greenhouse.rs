//! Greenhouse board API client. Works for any company using Greenhouse ATS:
//! one endpoint lists all postings for a board token, another returns the
//! full HTML description per posting.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

const BOARDS_API: &str = "https://boards-api.greenhouse.io/v1/boards";

/// A normalized posting as returned to the scrape orchestrator.
#[derive(Debug, Clone)]
pub struct ScrapedJob {
    pub greenhouse_id: i64,
    pub title: String,
    pub url: String,
    pub location: String,
    pub job_type: Option<String>,
    pub posted_date: Option<DateTime<Utc>>,
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BoardResponse {
    #[serde(default)]
    jobs: Vec<BoardJob>,
}

#[derive(Debug, Deserialize)]
struct BoardJob {
    id: i64,
    title: String,
    absolute_url: Option<String>,
    location: Option<BoardLocation>,
    updated_at: Option<String>,
    #[serde(default)]
    metadata: Option<Vec<BoardMetadata>>,
}

#[derive(Debug, Deserialize)]
struct BoardLocation {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoardMetadata {
    name: Option<String>,
    value: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JobDetailResponse {
    content: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────────────

pub struct GreenhouseClient {
    http: reqwest::Client,
    token: String,
}

impl GreenhouseClient {
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            token: token.to_string(),
        }
    }

    /// Lists all postings on the board whose location contains
    /// `location_filter` (case-insensitive). Empty filter returns everything.
    pub async fn list_jobs(&self, location_filter: &str) -> Result<Vec<ScrapedJob>, reqwest::Error> {
        let url = format!("{BOARDS_API}/{}/jobs", self.token);
        debug!("Fetching {url}");

        let response: BoardResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let filter = location_filter.to_lowercase();
        let jobs = response
            .jobs
            .into_iter()
            .map(|raw| parse_board_job(raw, &self.token))
            .filter(|job| filter.is_empty() || job.location.to_lowercase().contains(&filter))
            .collect();

        Ok(jobs)
    }

    /// Fetches the full HTML description for one posting.
    pub async fn job_description(&self, greenhouse_id: i64) -> Result<Option<String>, reqwest::Error> {
        let url = format!("{BOARDS_API}/{}/jobs/{greenhouse_id}", self.token);

        let detail: JobDetailResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(detail.content.filter(|c| !c.is_empty()))
    }
}

// ── Parsing ─────────────────────────────────────────────────────────────────

fn parse_board_job(raw: BoardJob, token: &str) -> ScrapedJob {
    let location = raw
        .location
        .and_then(|l| l.name)
        .unwrap_or_else(|| "Remote".to_string());

    let url = raw
        .absolute_url
        .unwrap_or_else(|| format!("https://boards.greenhouse.io/{token}/jobs/{}", raw.id));

    let job_type = raw.metadata.unwrap_or_default().into_iter().find_map(|m| {
        if m.name.as_deref() == Some("Employment Type") {
            m.value.and_then(|v| v.as_str().map(str::to_string))
        } else {
            None
        }
    });

    let posted_date = raw
        .updated_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    ScrapedJob {
        greenhouse_id: raw.id,
        title: raw.title,
        url,
        location,
        job_type,
        posted_date,
    }
}
