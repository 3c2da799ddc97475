//! HTML rendering for the weekly digest — one unified table of all
//! last-7-day jobs, scored first (descending), unscored at the bottom.

use chrono::Utc;
use serde_json::Value;

use crate::models::job::DigestJob;

const TABLE_STYLE: &str = "width:100%;border-collapse:collapse;font-size:13px;";
const TH_STYLE: &str = "padding:8px 12px;text-align:left;background:#1e3a5f;color:#fff;font-weight:600;white-space:nowrap;";
const TD_STYLE: &str = "padding:10px 12px;border-bottom:1px solid #e5e7eb;vertical-align:top;";
const TD_ALT_STYLE: &str = "padding:10px 12px;border-bottom:1px solid #e5e7eb;vertical-align:top;background:#f9fafb;";

/// Renders the score as a colored percentage badge; em-dash badge when unscored.
pub fn score_badge(score: Option<f64>) -> String {
    let Some(score) = score else {
        return r#"<span style="display:inline-block;padding:2px 8px;border-radius:12px;background:#f3f4f6;color:#9ca3af;font-size:12px;">&#8212;</span>"#
            .to_string();
    };
    let pct = (score * 100.0).round() as i64;
    let (color, bg) = if pct >= 70 {
        ("#166534", "#dcfce7")
    } else if pct >= 45 {
        ("#92400e", "#fef3c7")
    } else {
        ("#374151", "#f3f4f6")
    };
    format!(
        r#"<span style="display:inline-block;padding:2px 8px;border-radius:12px;background:{bg};color:{color};font-weight:700;font-size:12px;">{pct}%</span>"#
    )
}

/// Extracts display reasons from the stored JSON, dropping pre-filter
/// sentinels (they explain exclusion, not fit).
pub fn display_reasons(raw: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|r| r.as_str())
        .filter(|s| !s.is_empty() && !s.starts_with("Pre-filtered"))
        .map(str::to_string)
        .collect()
}

fn jobs_table(jobs: &[DigestJob]) -> String {
    if jobs.is_empty() {
        return r#"<p style="color:#6b7280;font-style:italic;">No new jobs this week.</p>"#
            .to_string();
    }

    let mut rows = String::new();
    for (i, job) in jobs.iter().enumerate() {
        let td = if i % 2 == 1 { TD_ALT_STYLE } else { TD_STYLE };
        let reasons = if job.match_score.is_some() {
            display_reasons(job.match_reasons.as_ref())
        } else {
            Vec::new()
        };
        let reasons_html = if reasons.is_empty() {
            String::new()
        } else {
            let items: String = reasons
                .iter()
                .take(3)
                .map(|r| format!("<li>{r}</li>"))
                .collect();
            format!(
                "<ul style='margin:4px 0 0 0;padding-left:16px;color:#374151;font-size:12px;'>{items}</ul>"
            )
        };

        rows.push_str(&format!(
            r#"<tr>
  <td style="{td}">{badge}</td>
  <td style="{td}"><strong>{company}</strong></td>
  <td style="{td}"><a href="{url}" style="color:#1d4ed8;text-decoration:none;font-weight:600;">{title}</a>{reasons_html}</td>
  <td style="{td};color:#6b7280;">{location}</td>
</tr>"#,
            badge = score_badge(job.match_score),
            company = job.company,
            url = job.url,
            title = job.title,
            location = job.location.as_deref().unwrap_or("-"),
        ));
    }

    format!(
        r#"<table style="{TABLE_STYLE}">
  <thead><tr>
    <th style="{TH_STYLE}">Score</th>
    <th style="{TH_STYLE}">Company</th>
    <th style="{TH_STYLE}">Role</th>
    <th style="{TH_STYLE}">Location</th>
  </tr></thead>
  <tbody>{rows}</tbody>
</table>"#
    )
}

/// Builds the full digest document.
pub fn build_html(jobs: &[DigestJob]) -> String {
    let today = Utc::now().format("%d %b %Y");
    let scored = jobs.iter().filter(|j| j.match_score.is_some()).count();
    let unscored = jobs.len() - scored;
    let table = jobs_table(jobs);
    let total = jobs.len();
    let plural = if total == 1 { "" } else { "s" };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><meta name="viewport" content="width=device-width,initial-scale=1"></head>
<body style="margin:0;padding:0;background:#f3f4f6;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Helvetica,sans-serif;">
<table width="100%" cellpadding="0" cellspacing="0" style="background:#f3f4f6;padding:32px 16px;">
<tr><td align="center">
<table width="680" cellpadding="0" cellspacing="0" style="background:#fff;border-radius:8px;overflow:hidden;">
  <tr>
    <td style="background:#1e3a5f;padding:28px 32px;">
      <p style="margin:0;font-size:11px;color:#93c5fd;letter-spacing:1.5px;text-transform:uppercase;">Weekly Job Digest</p>
      <h1 style="margin:6px 0 0;font-size:24px;color:#fff;font-weight:700;">{total} job{plural} this week</h1>
      <p style="margin:6px 0 0;font-size:13px;color:#93c5fd;">{today} &middot; {scored} scored &middot; {unscored} unscored &middot; sorted by fit</p>
    </td>
  </tr>
  <tr><td style="padding:24px 32px;">
    {table}
  </td></tr>
  <tr>
    <td style="padding:24px 32px;background:#f9fafb;border-top:1px solid #e5e7eb;">
      <p style="margin:0;font-size:11px;color:#9ca3af;text-align:center;">jobscout &middot; Greenhouse boards &middot; scored by Claude</p>
    </td>
  </tr>
</table>
</td></tr>
</table>
</body>
</html>"#
    )
}

/// Subject line: totals plus the send date.
pub fn subject(jobs: &[DigestJob]) -> String {
    let scored = jobs.iter().filter(|j| j.match_score.is_some()).count();
    let today = Utc::now().format("%d %b %Y");
    format!(
        "[Jobs] {} new job{} — {scored} scored — {today}",
        jobs.len(),
        if jobs.len() == 1 { "" } else { "s" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn digest_job(title: &str, score: Option<f64>, reasons: Option<Value>) -> DigestJob {
        DigestJob {
            id: 1,
            title: title.to_string(),
            company: "Jane Street".to_string(),
            url: "https://example.com/job".to_string(),
            location: Some("Hong Kong".to_string()),
            match_score: score,
            match_reasons: reasons,
            first_seen_at: Utc::now(),
        }
    }

    #[test]
    fn test_score_badge_buckets() {
        assert!(score_badge(Some(0.85)).contains("85%"));
        assert!(score_badge(Some(0.85)).contains("#166534"));
        assert!(score_badge(Some(0.5)).contains("#92400e"));
        assert!(score_badge(Some(0.1)).contains("#374151"));
        assert!(score_badge(None).contains("&#8212;"));
    }

    #[test]
    fn test_display_reasons_filters_prefilter_sentinel() {
        let raw = json!(["Strong stack match", "Pre-filtered: function mismatch"]);
        let reasons = display_reasons(Some(&raw));
        assert_eq!(reasons, vec!["Strong stack match"]);
    }

    #[test]
    fn test_display_reasons_tolerates_missing_or_wrong_shape() {
        assert!(display_reasons(None).is_empty());
        assert!(display_reasons(Some(&json!("just a string"))).is_empty());
    }

    #[test]
    fn test_build_html_contains_jobs_and_counts() {
        let jobs = vec![
            digest_job("Graduate Engineer", Some(0.9), Some(json!(["Great fit"]))),
            digest_job("Quant Researcher", None, None),
        ];
        let html = build_html(&jobs);
        assert!(html.contains("Graduate Engineer"));
        assert!(html.contains("Quant Researcher"));
        assert!(html.contains("2 jobs this week"));
        assert!(html.contains("1 scored"));
        assert!(html.contains("Great fit"));
    }

    #[test]
    fn test_build_html_empty_week() {
        let html = build_html(&[]);
        assert!(html.contains("No new jobs this week"));
    }

    #[test]
    fn test_subject_counts() {
        let jobs = vec![digest_job("Engineer", Some(0.9), None)];
        let s = subject(&jobs);
        assert!(s.starts_with("[Jobs] 1 new job —"));
        assert!(s.contains("1 scored"));
    }
}
