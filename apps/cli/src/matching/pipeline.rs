//! Run orchestrator — drives pre-filter → batch scoring → fallback → persistence.
//!
//! The orchestrator holds no state of its own: the candidate set is
//! re-derived each run from the store's NULL-score column, so a partially
//! completed run is always safe to re-run.

use std::time::Duration;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::matching::prefilter::pre_filter;
use crate::matching::scorer::{
    BatchOutcome, ClaudeScorer, MatchScorer, ScoreResult, BATCH_SIZE,
};
use crate::models::job::UnscoredJob;
use crate::store;

/// Courtesy pause between external calls. Rate-limit politeness only,
/// not required for correctness.
const RATE_LIMIT_DELAY: Duration = Duration::from_millis(500);

/// Per-category counts for one matcher run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub pre_filtered: usize,
    pub scored: usize,
    pub matched: usize,
    /// Valid API call, but the job was missing from the response or failed
    /// validation — left NULL, retried next run.
    pub skipped: usize,
    pub errors: usize,
    pub api_calls: usize,
}

impl RunSummary {
    /// True when every job that reached the external service errored.
    /// Drives the process exit code.
    pub fn all_errored(&self) -> bool {
        let attempted = self.scored + self.skipped + self.errors;
        attempted > 0 && self.errors == attempted
    }
}

/// A validated write the pipeline decided on. Pre-filtered jobs carry the
/// sentinel score 0.0 plus the rejection reason.
#[derive(Debug, Clone)]
pub struct ScoreDecision {
    pub job_id: i64,
    pub result: ScoreResult,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub decisions: Vec<ScoreDecision>,
    pub summary: RunSummary,
}

/// Scores a candidate set without touching the store. Pure with respect to
/// persistence: callers commit `decisions` afterwards (or don't, on dry runs).
pub async fn score_jobs(
    scorer: &dyn MatchScorer,
    profile: &str,
    jobs: &[UnscoredJob],
    pause: Duration,
) -> PipelineOutcome {
    let mut decisions = Vec::new();
    let mut summary = RunSummary::default();

    // Step 1 — pre-filter, zero API cost
    let mut to_score: Vec<&UnscoredJob> = Vec::new();
    for job in jobs {
        if let Some(reason) = pre_filter(&job.title) {
            info!("⊘  {} — {}", job.company_name, job.title);
            decisions.push(ScoreDecision {
                job_id: job.id,
                result: ScoreResult {
                    score: 0.0,
                    reasons: vec![reason.to_string()],
                },
            });
            summary.pre_filtered += 1;
        } else {
            to_score.push(job);
        }
    }

    let total_batches = to_score.len().div_ceil(BATCH_SIZE);
    info!(
        "{} jobs to score → {} batches of up to {}",
        to_score.len(),
        total_batches,
        BATCH_SIZE
    );

    // Step 2 — batch scoring, strictly in order
    for (batch_num, chunk) in to_score.chunks(BATCH_SIZE).enumerate() {
        info!("── Batch {}/{} ({} jobs)", batch_num + 1, total_batches, chunk.len());
        let batch: Vec<UnscoredJob> = chunk.iter().map(|j| (*j).clone()).collect();

        let outcome = scorer.score_batch(profile, &batch).await;
        summary.api_calls += 1;

        match outcome {
            BatchOutcome::Parsed(results) => {
                for (i, job) in batch.iter().enumerate() {
                    match results.get(&i) {
                        Some(result) => {
                            record(&mut decisions, &mut summary, job, result.clone());
                        }
                        None => {
                            // Missing from response — leave NULL, retry next run
                            info!(
                                "  ?  {} — {}  (missing, will retry)",
                                job.company_name, job.title
                            );
                            summary.skipped += 1;
                        }
                    }
                }
            }
            BatchOutcome::Malformed(reason) => {
                // Structural failure — fall back to one-by-one for this batch
                warn!("  batch parse failed ({reason}), falling back to individual scoring");
                for job in &batch {
                    summary.api_calls += 1;
                    match scorer.score_single(profile, job).await {
                        Ok(Some(result)) => {
                            record(&mut decisions, &mut summary, job, result);
                        }
                        Ok(None) => {
                            info!(
                                "  ?  {} — {}  (unparseable, will retry)",
                                job.company_name, job.title
                            );
                            summary.skipped += 1;
                        }
                        Err(e) => {
                            warn!("  ✗  {} — {}  error: {e}", job.company_name, job.title);
                            summary.errors += 1;
                        }
                    }
                    tokio::time::sleep(pause).await;
                }
            }
            BatchOutcome::Transport(reason) => {
                warn!("  batch call failed: {reason}");
                summary.errors += batch.len();
            }
        }

        tokio::time::sleep(pause).await;
    }

    PipelineOutcome { decisions, summary }
}

fn record(
    decisions: &mut Vec<ScoreDecision>,
    summary: &mut RunSummary,
    job: &UnscoredJob,
    result: ScoreResult,
) {
    info!(
        "  {}  {:.2}  {} — {}",
        if result.is_match() { "✓" } else { "✗" },
        result.score,
        job.company_name,
        job.title
    );
    if result.is_match() {
        summary.matched += 1;
    }
    summary.scored += 1;
    decisions.push(ScoreDecision {
        job_id: job.id,
        result,
    });
}

/// Full matcher run: fetch candidates, score, persist, summarize.
pub async fn run_matcher(
    pool: &PgPool,
    llm: LlmClient,
    config: &Config,
    dry_run: bool,
) -> Result<RunSummary, AppError> {
    let profile = std::fs::read_to_string(&config.profile_path)?;
    let profile = profile.trim();
    if profile.is_empty() {
        return Err(AppError::Validation(format!(
            "candidate profile at {} is empty",
            config.profile_path.display()
        )));
    }

    let jobs = store::jobs::get_unscored_jobs(pool).await?;
    info!("Unscored jobs: {}", jobs.len());
    if jobs.is_empty() {
        info!("Nothing to score.");
        return Ok(RunSummary::default());
    }

    let scorer = ClaudeScorer::new(llm);
    let outcome = score_jobs(&scorer, profile, &jobs, RATE_LIMIT_DELAY).await;

    if dry_run {
        info!("Dry run — nothing saved.");
    } else {
        for decision in &outcome.decisions {
            store::jobs::update_job_match(
                pool,
                decision.job_id,
                decision.result.score,
                &decision.result.reasons,
            )
            .await?;
        }
    }

    let summary = &outcome.summary;
    info!("Done{}", if dry_run { " (dry run)" } else { "" });
    info!("  Pre-filtered (no API):  {}", summary.pre_filtered);
    info!("  Scored via API:         {}  ({} API calls)", summary.scored, summary.api_calls);
    info!("  Matched (≥ threshold):  {}", summary.matched);
    info!("  Will retry next run:    {}", summary.skipped);
    info!("  Errors:                 {}", summary.errors);

    if !dry_run {
        let stats = store::stats::get_stats(pool).await?;
        info!("  Jobs above threshold:   {}", stats.matching_jobs);
    }

    Ok(outcome.summary)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::LlmError;
    use crate::matching::prefilter::PREFILTER_REASON;

    fn job(id: i64, title: &str) -> UnscoredJob {
        UnscoredJob {
            id,
            company_name: "Jane Street".to_string(),
            title: title.to_string(),
            description: None,
        }
    }

    fn result(score: f64) -> ScoreResult {
        ScoreResult {
            score,
            reasons: vec!["scripted".to_string()],
        }
    }

    /// Scripted scorer: pops pre-arranged outcomes, counts calls.
    struct ScriptedScorer {
        batches: Mutex<VecDeque<BatchOutcome>>,
        singles: Mutex<VecDeque<Result<Option<ScoreResult>, LlmError>>>,
        batch_calls: AtomicUsize,
        single_calls: AtomicUsize,
    }

    impl ScriptedScorer {
        fn new(
            batches: Vec<BatchOutcome>,
            singles: Vec<Result<Option<ScoreResult>, LlmError>>,
        ) -> Self {
            Self {
                batches: Mutex::new(batches.into()),
                singles: Mutex::new(singles.into()),
                batch_calls: AtomicUsize::new(0),
                single_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MatchScorer for ScriptedScorer {
        async fn score_batch(&self, _profile: &str, _jobs: &[UnscoredJob]) -> BatchOutcome {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            self.batches
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected batch call")
        }

        async fn score_single(
            &self,
            _profile: &str,
            _job: &UnscoredJob,
        ) -> Result<Option<ScoreResult>, LlmError> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            self.singles.lock().unwrap().pop_front().unwrap_or(Ok(None))
        }
    }

    fn five_jobs() -> Vec<UnscoredJob> {
        (1..=5).map(|i| job(i, &format!("Engineer {i}"))).collect()
    }

    #[tokio::test]
    async fn scenario_a_full_batch_response_persists_all_five() {
        let results: HashMap<usize, ScoreResult> =
            (0..5).map(|i| (i, result(0.7))).collect();
        let scorer = ScriptedScorer::new(vec![BatchOutcome::Parsed(results)], vec![]);

        let outcome = score_jobs(&scorer, "profile", &five_jobs(), Duration::ZERO).await;

        assert_eq!(outcome.decisions.len(), 5);
        assert_eq!(outcome.summary.scored, 5);
        assert_eq!(outcome.summary.matched, 5);
        assert_eq!(outcome.summary.skipped, 0);
        assert_eq!(scorer.single_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scenario_b_missing_ordinal_leaves_job_for_next_run() {
        // Index 2 (ordinal 3) absent from the response map.
        let results: HashMap<usize, ScoreResult> = [0usize, 1, 3, 4]
            .into_iter()
            .map(|i| (i, result(0.7)))
            .collect();
        let scorer = ScriptedScorer::new(vec![BatchOutcome::Parsed(results)], vec![]);

        let outcome = score_jobs(&scorer, "profile", &five_jobs(), Duration::ZERO).await;

        assert_eq!(outcome.summary.scored, 4);
        assert_eq!(outcome.summary.skipped, 1);
        let scored_ids: Vec<i64> = outcome.decisions.iter().map(|d| d.job_id).collect();
        assert!(!scored_ids.contains(&3), "job 3 must stay unscored");
        assert_eq!(scorer.single_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scenario_c_malformed_batch_triggers_one_fallback_per_job() {
        let singles = vec![
            Ok(Some(result(0.8))),
            Ok(Some(result(0.2))),
            Ok(None), // unparseable — retry later
            Ok(Some(result(0.9))),
            Err(LlmError::EmptyContent),
        ];
        let scorer = ScriptedScorer::new(
            vec![BatchOutcome::Malformed("not JSON".to_string())],
            singles,
        );

        let outcome = score_jobs(&scorer, "profile", &five_jobs(), Duration::ZERO).await;

        assert_eq!(scorer.single_calls.load(Ordering::SeqCst), 5);
        assert_eq!(outcome.summary.scored, 3);
        assert_eq!(outcome.summary.skipped, 1);
        assert_eq!(outcome.summary.errors, 1);
        assert_eq!(outcome.summary.matched, 2);
        // 1 batch call + 5 fallback calls
        assert_eq!(outcome.summary.api_calls, 6);
    }

    #[tokio::test]
    async fn scenario_d_prefiltered_title_never_reaches_the_scorer() {
        let scorer = ScriptedScorer::new(vec![], vec![]);
        let jobs = vec![job(1, "Senior Compliance Officer")];

        let outcome = score_jobs(&scorer, "profile", &jobs, Duration::ZERO).await;

        assert_eq!(scorer.batch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(scorer.single_calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.summary.pre_filtered, 1);
        assert_eq!(outcome.decisions.len(), 1);
        assert_eq!(outcome.decisions[0].result.score, 0.0);
        assert_eq!(
            outcome.decisions[0].result.reasons,
            vec![PREFILTER_REASON.to_string()]
        );
    }

    #[tokio::test]
    async fn transport_failure_errors_whole_batch_without_fallback() {
        let scorer = ScriptedScorer::new(
            vec![BatchOutcome::Transport("connection refused".to_string())],
            vec![],
        );

        let outcome = score_jobs(&scorer, "profile", &five_jobs(), Duration::ZERO).await;

        assert_eq!(outcome.summary.errors, 5);
        assert!(outcome.decisions.is_empty());
        assert_eq!(scorer.single_calls.load(Ordering::SeqCst), 0);
        assert!(outcome.summary.all_errored());
    }

    #[tokio::test]
    async fn oversized_candidate_set_is_chunked_in_order() {
        // 7 jobs → one batch of 5, one of 2
        let jobs: Vec<UnscoredJob> =
            (1..=7).map(|i| job(i, &format!("Engineer {i}"))).collect();
        let first: HashMap<usize, ScoreResult> = (0..5).map(|i| (i, result(0.7))).collect();
        let second: HashMap<usize, ScoreResult> = (0..2).map(|i| (i, result(0.3))).collect();
        let scorer = ScriptedScorer::new(
            vec![BatchOutcome::Parsed(first), BatchOutcome::Parsed(second)],
            vec![],
        );

        let outcome = score_jobs(&scorer, "profile", &jobs, Duration::ZERO).await;

        assert_eq!(scorer.batch_calls.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.summary.scored, 7);
        let ids: Vec<i64> = outcome.decisions.iter().map(|d| d.job_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[tokio::test]
    async fn empty_candidate_set_is_a_no_op() {
        let scorer = ScriptedScorer::new(vec![], vec![]);
        let outcome = score_jobs(&scorer, "profile", &[], Duration::ZERO).await;
        assert_eq!(outcome.summary, RunSummary::default());
        assert!(outcome.decisions.is_empty());
    }

    #[test]
    fn all_errored_requires_at_least_one_attempt() {
        assert!(!RunSummary::default().all_errored());
        let partial = RunSummary {
            scored: 1,
            errors: 4,
            ..Default::default()
        };
        assert!(!partial.all_errored());
        let total = RunSummary {
            errors: 5,
            ..Default::default()
        };
        assert!(total.all_errored());
    }
}
