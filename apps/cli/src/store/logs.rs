use sqlx::PgPool;

/// Parameters for recording one scrape run of one company.
#[derive(Debug)]
pub struct ScrapeLog<'a> {
    pub company_id: i64,
    pub status: &'a str,
    pub jobs_found: i32,
    pub new_jobs: i32,
    pub error_message: Option<&'a str>,
    pub duration_seconds: f64,
}

pub async fn log_scrape(pool: &PgPool, log: &ScrapeLog<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO scrape_logs
            (company_id, status, jobs_found, new_jobs, error_message, duration_seconds)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(log.company_id)
    .bind(log.status)
    .bind(log.jobs_found)
    .bind(log.new_jobs)
    .bind(log.error_message)
    .bind(log.duration_seconds)
    .execute(pool)
    .await?;
    Ok(())
}
