//! Digest — weekly HTML email of new jobs, canonical unified-table variant.

pub mod html;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use sqlx::PgPool;
use tracing::info;

use crate::config::{Config, SmtpConfig};
use crate::errors::AppError;
use crate::store;

const SMTP_RELAY: &str = "smtp.gmail.com";
const PREVIEW_PATH: &str = "digest_preview.html";

/// Builds and sends the digest. On `dry_run`, writes an HTML preview to disk
/// instead of sending, and marks nothing as notified.
pub async fn run_digest(pool: &PgPool, config: &Config, dry_run: bool) -> Result<(), AppError> {
    let jobs = store::jobs::get_digest_jobs(pool).await?;
    let scored = jobs.iter().filter(|j| j.match_score.is_some()).count();
    info!(
        "New jobs (last 7 days): {} ({scored} scored, {} unscored)",
        jobs.len(),
        jobs.len() - scored
    );

    if jobs.is_empty() {
        info!("Nothing to send.");
        return Ok(());
    }

    let body = html::build_html(&jobs);

    if dry_run {
        std::fs::write(PREVIEW_PATH, &body)?;
        info!("Dry run — preview saved to {PREVIEW_PATH}");
        return Ok(());
    }

    let smtp = config.smtp.as_ref().ok_or_else(|| {
        AppError::Validation(
            "GMAIL_ADDRESS, GMAIL_APP_PASSWORD and NOTIFY_EMAIL must be set to send the digest"
                .to_string(),
        )
    })?;

    send(smtp, html::subject(&jobs), body).await?;

    for job in &jobs {
        store::jobs::mark_job_notified(pool, job.id).await?;
    }
    info!(
        "Sent to {} recipient(s), marked {} jobs as notified",
        smtp.recipients.len(),
        jobs.len()
    );

    Ok(())
}

async fn send(smtp: &SmtpConfig, subject: String, body: String) -> Result<(), AppError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&smtp.sender)?)
        .subject(subject)
        .header(ContentType::TEXT_HTML);
    for recipient in &smtp.recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }
    let message = builder
        .body(body)
        .map_err(|e| AppError::Email(format!("failed to build message: {e}")))?;

    let mailer: AsyncSmtpTransport<Tokio1Executor> =
        AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_RELAY)
            .map_err(|e| AppError::Email(format!("SMTP setup failed: {e}")))?
            .credentials(Credentials::new(
                smtp.sender.clone(),
                smtp.app_password.clone(),
            ))
            .build();

    mailer
        .send(message)
        .await
        .map_err(|e| AppError::Email(format!("send failed: {e}")))?;
    Ok(())
}

fn parse_mailbox(addr: &str) -> Result<lettre::message::Mailbox, AppError> {
    addr.parse()
        .map_err(|e| AppError::Email(format!("invalid email address '{addr}': {e}")))
}
