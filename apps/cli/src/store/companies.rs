use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::company::CompanyRow;
use crate::scraping::boards::{career_url, GREENHOUSE_BOARDS};

/// Adds a company unless one with the same name exists.
/// Returns true if a new row was inserted.
pub async fn add_company(
    pool: &PgPool,
    name: &str,
    career_url: &str,
    ats_platform: &str,
    notes: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let inserted: Option<i64> = sqlx::query_scalar(
        r#"
        INSERT INTO companies (name, career_url, ats_platform, notes)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(career_url)
    .bind(ats_platform)
    .bind(notes)
    .fetch_optional(pool)
    .await?;

    Ok(inserted.is_some())
}

pub async fn get_active_companies(pool: &PgPool) -> Result<Vec<CompanyRow>, sqlx::Error> {
    sqlx::query_as::<_, CompanyRow>(
        "SELECT * FROM companies WHERE is_active = TRUE ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

pub async fn mark_company_scraped(pool: &PgPool, company_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE companies SET last_scraped_at = NOW() WHERE id = $1")
        .bind(company_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Seeds the companies table from the configured Greenhouse board list.
/// Idempotent: existing companies are skipped.
pub async fn seed_companies(pool: &PgPool) -> Result<(), AppError> {
    let mut added = 0;
    let mut skipped = 0;

    for board in GREENHOUSE_BOARDS {
        let new = add_company(
            pool,
            board.name,
            &career_url(board.token),
            "Greenhouse",
            None,
        )
        .await?;
        if new {
            info!("Added company: {}", board.name);
            added += 1;
        } else {
            skipped += 1;
        }
    }

    info!(
        "Seed complete: {added} added, {skipped} already present ({} boards configured)",
        GREENHOUSE_BOARDS.len()
    );
    Ok(())
}
