//! Batch and single-job scorers against the Claude API.
//!
//! Both paths run every raw result through the same `validate_result`
//! predicate before anything reaches the store. An item that fails
//! validation is skipped, never defaulted — the job keeps its NULL score
//! and is retried on the next run.

use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::llm_client::{strip_json_fences, LlmClient, LlmError};
use crate::matching::prompts::{BATCH_SYSTEM, SINGLE_SYSTEM};
use crate::models::job::UnscoredJob;

/// Jobs per batch request. Batching amortizes request overhead roughly 5:1
/// versus one-by-one scoring.
pub const BATCH_SIZE: usize = 5;
/// Scores at or above this count as matches in the run summary and digest.
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Output token budget per job in a request.
const MAX_TOKENS_PER_JOB: u32 = 200;
/// Description length cap for batch items (keeps the request small).
const BATCH_DESC_LIMIT: usize = 800;
/// Description length cap for the single-job fallback.
const SINGLE_DESC_LIMIT: usize = 2000;

/// A validated scoring result: score in [0,1] plus short textual reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64,
    pub reasons: Vec<String>,
}

impl ScoreResult {
    pub fn is_match(&self) -> bool {
        self.score >= MATCH_THRESHOLD
    }
}

/// Outcome of one batch request, dispatched exhaustively by the pipeline.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// Response parsed as an array; map of batch index → validated result.
    /// Unmapped positions mean "unknown, retry next run".
    Parsed(HashMap<usize, ScoreResult>),
    /// Response was not a JSON array at all — the whole batch falls back
    /// to single-job scoring.
    Malformed(String),
    /// The request itself failed (network, API error). No fallback; every
    /// job in the batch counts as an error for this run.
    Transport(String),
}

/// The scorer seam. The pipeline dispatches through this trait so tests can
/// substitute a scripted scorer for the live Claude-backed one.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score_batch(&self, profile: &str, jobs: &[UnscoredJob]) -> BatchOutcome;

    /// Single-job fallback. `Ok(None)` means the response was unparseable or
    /// failed validation (retry later); `Err` means the call itself failed.
    async fn score_single(
        &self,
        profile: &str,
        job: &UnscoredJob,
    ) -> Result<Option<ScoreResult>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Validation — the one predicate shared by both paths
// ────────────────────────────────────────────────────────────────────────────

/// Validates a single raw result object from the API.
///
/// Accepts: a `score` that coerces to a float in [0,1] (number or numeric
/// string), and `reasons` that is absent, null, or a list of strings (empty
/// allowed; empty/non-string elements dropped). Anything else → `None`.
pub fn validate_result(item: &Value) -> Option<ScoreResult> {
    let raw_score = item.get("score")?;
    let score = raw_score
        .as_f64()
        .or_else(|| raw_score.as_str()?.trim().parse().ok())?;
    if !(0.0..=1.0).contains(&score) {
        return None;
    }

    let reasons = match item.get("reasons") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|r| r.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(_) => return None,
    };

    Some(ScoreResult { score, reasons })
}

// ────────────────────────────────────────────────────────────────────────────
// Response parsing (pure — exercised directly by tests)
// ────────────────────────────────────────────────────────────────────────────

/// Parses a raw batch response into a map of batch index → validated result.
///
/// Per item: the 1-based `job` ordinal must be numeric (number or numeric
/// string) and resolve to an in-range zero-based index; the (score, reasons)
/// pair must pass `validate_result`. Items failing either check are skipped.
/// A top level that is not a JSON array is an error — the caller escalates
/// to the fallback path rather than partially trusting the response.
pub fn parse_batch_response(
    raw: &str,
    batch_len: usize,
) -> Result<HashMap<usize, ScoreResult>, String> {
    let text = strip_json_fences(raw);
    let parsed: Value =
        serde_json::from_str(text).map_err(|e| format!("response is not valid JSON: {e}"))?;

    let items = parsed
        .as_array()
        .ok_or_else(|| "response is not a JSON array".to_string())?;

    let mut validated = HashMap::new();
    for item in items {
        let Some(idx) = item_ordinal(item).and_then(|n| n.checked_sub(1)) else {
            continue;
        };
        if idx >= batch_len {
            continue;
        }
        if let Some(result) = validate_result(item) {
            validated.insert(idx, result);
        }
    }

    Ok(validated)
}

/// Parses a raw single-job response. `None` for anything unparseable or
/// invalid — the caller leaves the job unscored.
pub fn parse_single_response(raw: &str) -> Option<ScoreResult> {
    let parsed: Value = serde_json::from_str(strip_json_fences(raw)).ok()?;
    validate_result(&parsed)
}

fn item_ordinal(item: &Value) -> Option<usize> {
    let raw = item.get("job")?;
    raw.as_u64()
        .map(|n| n as usize)
        .or_else(|| raw.as_str()?.trim().parse().ok())
}

// ────────────────────────────────────────────────────────────────────────────
// Request text
// ────────────────────────────────────────────────────────────────────────────

/// Strips HTML tags, collapses whitespace, and truncates to `limit` chars.
pub fn clean_description(html: &str, limit: usize) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));

    let text = tags.replace_all(html, " ");
    let text = spaces.replace_all(&text, " ");
    text.trim().chars().take(limit).collect()
}

/// Renders the batch as an ordinal-numbered job list. The 1-based ordinal is
/// what the response must carry back for positional round-tripping.
fn batch_jobs_text(jobs: &[UnscoredJob]) -> String {
    jobs.iter()
        .enumerate()
        .map(|(i, job)| {
            let mut entry = format!("Job {}: {} — {}", i + 1, job.company_name, job.title);
            if let Some(desc) = job.description.as_deref() {
                entry.push('\n');
                entry.push_str(&clean_description(desc, BATCH_DESC_LIMIT));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn single_job_text(job: &UnscoredJob) -> String {
    let mut text = format!("Company: {}\nTitle: {}", job.company_name, job.title);
    if let Some(desc) = job.description.as_deref() {
        text.push_str("\n\n");
        text.push_str(&clean_description(desc, SINGLE_DESC_LIMIT));
    }
    text
}

// ────────────────────────────────────────────────────────────────────────────
// ClaudeScorer — the live implementation
// ────────────────────────────────────────────────────────────────────────────

/// Scores jobs via the Claude API through the shared `LlmClient`.
pub struct ClaudeScorer {
    llm: LlmClient,
}

impl ClaudeScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl MatchScorer for ClaudeScorer {
    async fn score_batch(&self, profile: &str, jobs: &[UnscoredJob]) -> BatchOutcome {
        let prompt = format!(
            "CANDIDATE PROFILE:\n{profile}\n\n---\n\nJobs to score:\n{}",
            batch_jobs_text(jobs)
        );
        let max_tokens = MAX_TOKENS_PER_JOB * jobs.len() as u32;

        let response = match self.llm.call(&prompt, BATCH_SYSTEM, max_tokens).await {
            Ok(r) => r,
            Err(e) => return BatchOutcome::Transport(e.to_string()),
        };

        // Missing text content is a structural failure, not a transport one:
        // the call succeeded but its content can't be trusted.
        let Some(text) = response.text() else {
            return BatchOutcome::Malformed("response carried no text content".to_string());
        };

        match parse_batch_response(text, jobs.len()) {
            Ok(map) => {
                debug!("batch response: {}/{} items validated", map.len(), jobs.len());
                BatchOutcome::Parsed(map)
            }
            Err(reason) => BatchOutcome::Malformed(reason),
        }
    }

    async fn score_single(
        &self,
        profile: &str,
        job: &UnscoredJob,
    ) -> Result<Option<ScoreResult>, LlmError> {
        let prompt = format!(
            "CANDIDATE PROFILE:\n{profile}\n\n---\n\nJob:\n{}",
            single_job_text(job)
        );

        let response = self.llm.call(&prompt, SINGLE_SYSTEM, MAX_TOKENS_PER_JOB).await?;
        Ok(response.text().and_then(parse_single_response))
    }
}
