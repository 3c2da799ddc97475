use sqlx::PgPool;

use crate::models::job::{DigestJob, NewJob, UnscoredJob};

/// Inserts a newly scraped job unless its dedup hash already exists.
/// Returns the new row id, or `None` for a duplicate (whose `last_seen_at`
/// is bumped instead).
pub async fn insert_job(pool: &PgPool, job: &NewJob<'_>) -> Result<Option<i64>, sqlx::Error> {
    let hash = job.job_hash();

    let inserted: Option<i64> = sqlx::query_scalar(
        r#"
        INSERT INTO jobs (company_id, job_hash, title, url, location, job_type, posted_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (job_hash) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(job.company_id)
    .bind(&hash)
    .bind(job.title)
    .bind(job.url)
    .bind(job.location)
    .bind(job.job_type)
    .bind(job.posted_date)
    .fetch_optional(pool)
    .await?;

    if inserted.is_none() {
        sqlx::query("UPDATE jobs SET last_seen_at = NOW() WHERE job_hash = $1")
            .bind(&hash)
            .execute(pool)
            .await?;
    }

    Ok(inserted)
}

pub async fn update_job_description(
    pool: &PgPool,
    job_id: i64,
    description: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE jobs SET description = $1 WHERE id = $2")
        .bind(description)
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// All jobs never evaluated by the scorer, in stable arrival order.
/// Already-scored jobs are excluded by construction, which is what makes
/// re-running the matcher idempotent.
pub async fn get_unscored_jobs(pool: &PgPool) -> Result<Vec<UnscoredJob>, sqlx::Error> {
    sqlx::query_as::<_, UnscoredJob>(
        r#"
        SELECT j.id, c.name AS company_name, j.title, j.description
        FROM jobs j
        JOIN companies c ON j.company_id = c.id
        WHERE j.status = 'new' AND j.match_score IS NULL
        ORDER BY j.first_seen_at DESC, j.id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Writes a validated (score, reasons) pair. Guarded with
/// `match_score IS NULL`: a job moves from NULL to exactly one terminal
/// score and is never overwritten. Returns false if the row was already
/// scored (or missing).
pub async fn update_job_match(
    pool: &PgPool,
    job_id: i64,
    score: f64,
    reasons: &[String],
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET match_score = $1, match_reasons = $2
        WHERE id = $3 AND match_score IS NULL
        "#,
    )
    .bind(score)
    .bind(serde_json::json!(reasons))
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// All unsent jobs from the last 7 days: scored first (descending), then
/// unscored. The digest renders them in this order.
pub async fn get_digest_jobs(pool: &PgPool) -> Result<Vec<DigestJob>, sqlx::Error> {
    sqlx::query_as::<_, DigestJob>(
        r#"
        SELECT j.id, j.title, c.name AS company, j.url, j.location,
               j.match_score, j.match_reasons, j.first_seen_at
        FROM jobs j
        JOIN companies c ON j.company_id = c.id
        WHERE j.notified_at IS NULL
          AND j.first_seen_at >= NOW() - INTERVAL '7 days'
        ORDER BY j.match_score DESC NULLS LAST, c.name
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn mark_job_notified(pool: &PgPool, job_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE jobs SET notified_at = NOW() WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}
