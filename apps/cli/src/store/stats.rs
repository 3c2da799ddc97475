use sqlx::PgPool;

use crate::matching::scorer::MATCH_THRESHOLD;

/// Aggregate store statistics, printed by the `stats` subcommand and the
/// matcher's run summary.
#[derive(Debug, Clone)]
pub struct Stats {
    pub active_companies: i64,
    pub new_jobs: i64,
    pub unscored_jobs: i64,
    pub matching_jobs: i64,
}

pub async fn get_stats(pool: &PgPool) -> Result<Stats, sqlx::Error> {
    let active_companies: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM companies WHERE is_active = TRUE")
            .fetch_one(pool)
            .await?;

    let new_jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = 'new'")
        .fetch_one(pool)
        .await?;

    let unscored_jobs: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM jobs WHERE status = 'new' AND match_score IS NULL",
    )
    .fetch_one(pool)
    .await?;

    let matching_jobs: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = 'new' AND match_score >= $1")
            .bind(MATCH_THRESHOLD)
            .fetch_one(pool)
            .await?;

    Ok(Stats {
        active_companies,
        new_jobs,
        unscored_jobs,
        matching_jobs,
    })
}
