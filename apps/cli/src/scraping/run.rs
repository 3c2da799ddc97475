//! Scrape orchestrator — runs every configured board against the store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::company::CompanyRow;
use crate::models::job::NewJob;
use crate::scraping::boards::GREENHOUSE_BOARDS;
use crate::scraping::greenhouse::GreenhouseClient;
use crate::store;
use crate::store::logs::ScrapeLog;

const LOCATION_FILTER: &str = "Hong Kong";
/// Pause between per-job description fetches.
const DESCRIPTION_DELAY: Duration = Duration::from_millis(300);
/// Pause between companies.
const COMPANY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct CompanyReport {
    company: String,
    found: usize,
    new: usize,
    duplicates: usize,
    failed: bool,
}

/// Scrapes all configured Greenhouse boards and saves new jobs.
/// Failures are per-company: one broken board never aborts the run.
pub async fn scrape_all(pool: &PgPool, fetch_descriptions: bool) -> Result<(), AppError> {
    info!(
        "Scraping {} Greenhouse boards (mode: {})",
        GREENHOUSE_BOARDS.len(),
        if fetch_descriptions { "full" } else { "metadata only" }
    );

    let companies = store::companies::get_active_companies(pool).await?;
    let by_name: HashMap<&str, &CompanyRow> =
        companies.iter().map(|c| (c.name.as_str(), c)).collect();

    let missing: Vec<&str> = GREENHOUSE_BOARDS
        .iter()
        .filter(|b| !by_name.contains_key(b.name))
        .map(|b| b.name)
        .collect();
    if !missing.is_empty() {
        warn!("Not in companies table (run `jobscout seed`): {missing:?}");
    }

    let mut reports = Vec::new();
    for board in GREENHOUSE_BOARDS {
        let Some(company) = by_name.get(board.name) else {
            continue;
        };
        let report =
            scrape_company(pool, company, board.token, fetch_descriptions).await?;
        reports.push(report);
        tokio::time::sleep(COMPANY_DELAY).await;
    }

    let total_found: usize = reports.iter().map(|r| r.found).sum();
    let total_new: usize = reports.iter().map(|r| r.new).sum();
    let failed: Vec<&str> = reports
        .iter()
        .filter(|r| r.failed)
        .map(|r| r.company.as_str())
        .collect();

    info!("── Scrape summary");
    for r in &reports {
        if r.failed {
            info!("  ✗ {} — FAILED", r.company);
        } else {
            info!(
                "  ✓ {} — {} found, {} new, {} dupes",
                r.company, r.found, r.new, r.duplicates
            );
        }
    }
    info!("  TOTAL — {total_found} found, {total_new} new");
    if !failed.is_empty() {
        warn!("Failures: {failed:?}");
    }

    let stats = store::stats::get_stats(pool).await?;
    info!(
        "Store: {} unscored jobs | {} active companies",
        stats.unscored_jobs, stats.active_companies
    );

    Ok(())
}

/// Scrapes one board and saves its jobs. Only database errors propagate;
/// scrape failures are logged against the company and reported.
async fn scrape_company(
    pool: &PgPool,
    company: &CompanyRow,
    token: &str,
    fetch_descriptions: bool,
) -> Result<CompanyReport, AppError> {
    let start = Instant::now();
    let client = GreenhouseClient::new(token);
    info!("Fetching {} ({token})...", company.name);

    let jobs = match client.list_jobs(LOCATION_FILTER).await {
        Ok(jobs) => jobs,
        Err(e) => {
            warn!("  ✗ {} failed: {e}", company.name);
            store::logs::log_scrape(
                pool,
                &ScrapeLog {
                    company_id: company.id,
                    status: "failed",
                    jobs_found: 0,
                    new_jobs: 0,
                    error_message: Some(&e.to_string()),
                    duration_seconds: start.elapsed().as_secs_f64(),
                },
            )
            .await?;
            return Ok(CompanyReport {
                company: company.name.clone(),
                found: 0,
                new: 0,
                duplicates: 0,
                failed: true,
            });
        }
    };

    info!("  {} jobs matching '{LOCATION_FILTER}'", jobs.len());

    let mut new_count = 0;
    let mut dupe_count = 0;

    for job in &jobs {
        let inserted = store::jobs::insert_job(
            pool,
            &NewJob {
                company_id: company.id,
                company_name: &company.name,
                title: &job.title,
                url: &job.url,
                location: Some(&job.location),
                job_type: job.job_type.as_deref(),
                posted_date: job.posted_date,
            },
        )
        .await?;

        let Some(job_id) = inserted else {
            dupe_count += 1;
            continue;
        };

        new_count += 1;
        info!("  NEW  {}", job.title);

        // Description is optional — a failed fetch never fails the job
        if fetch_descriptions {
            match client.job_description(job.greenhouse_id).await {
                Ok(Some(description)) => {
                    store::jobs::update_job_description(pool, job_id, &description).await?;
                }
                Ok(None) => {}
                Err(e) => warn!("  description fetch failed for {}: {e}", job.title),
            }
            tokio::time::sleep(DESCRIPTION_DELAY).await;
        }
    }

    store::companies::mark_company_scraped(pool, company.id).await?;
    store::logs::log_scrape(
        pool,
        &ScrapeLog {
            company_id: company.id,
            status: if jobs.is_empty() { "no_jobs" } else { "success" },
            jobs_found: jobs.len() as i32,
            new_jobs: new_count as i32,
            error_message: None,
            duration_seconds: start.elapsed().as_secs_f64(),
        },
    )
    .await?;

    Ok(CompanyReport {
        company: company.name.clone(),
        found: jobs.len(),
        new: new_count,
        duplicates: dupe_count,
        failed: false,
    })
}
