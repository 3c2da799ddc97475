use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::FromRow;

/// A job row joined with its company name, as consumed by the scoring pipeline.
/// Only ever produced by queries filtering on `match_score IS NULL`.
#[derive(Debug, Clone, FromRow)]
pub struct UnscoredJob {
    pub id: i64,
    pub company_name: String,
    pub title: String,
    pub description: Option<String>,
}

/// A job row as queried for the weekly digest.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DigestJob {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub url: String,
    pub location: Option<String>,
    pub match_score: Option<f64>,
    pub match_reasons: Option<serde_json::Value>,
    pub first_seen_at: DateTime<Utc>,
}

/// Fields for inserting a newly scraped job.
#[derive(Debug, Clone)]
pub struct NewJob<'a> {
    pub company_id: i64,
    /// Company display name — part of the dedup hash, not stored on the row.
    pub company_name: &'a str,
    pub title: &'a str,
    pub url: &'a str,
    pub location: Option<&'a str>,
    pub job_type: Option<&'a str>,
    pub posted_date: Option<DateTime<Utc>>,
}

impl NewJob<'_> {
    pub fn job_hash(&self) -> String {
        job_hash(self.company_name, self.title, self.url)
    }
}

/// Dedup hash: SHA-256 over company, lowercased title, and URL, truncated
/// to 16 hex chars. Stable across scrape runs for the same posting.
pub fn job_hash(company: &str, title: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(company.as_bytes());
    hasher.update(b":");
    hasher.update(title.to_lowercase().trim().as_bytes());
    hasher.update(b":");
    hasher.update(url.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_hash_is_stable() {
        let a = job_hash("Jane Street", "Software Engineer", "https://example.com/1");
        let b = job_hash("Jane Street", "Software Engineer", "https://example.com/1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_job_hash_ignores_title_case_and_padding() {
        let a = job_hash("Jane Street", "Software Engineer", "https://example.com/1");
        let b = job_hash("Jane Street", "  software engineer ", "https://example.com/1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_job_hash_differs_by_url() {
        let a = job_hash("Jane Street", "Software Engineer", "https://example.com/1");
        let b = job_hash("Jane Street", "Software Engineer", "https://example.com/2");
        assert_ne!(a, b);
    }
}
