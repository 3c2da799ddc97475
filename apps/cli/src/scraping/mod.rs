//! Scraping — Greenhouse ATS board adapters and the scrape-all orchestrator.

pub mod boards;
pub mod greenhouse;
pub mod run;
