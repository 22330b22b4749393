//! Pipeline orchestrator: ties sources → cleaner → matcher → gap report.
//!
//! ## Scrape pass
//!
//! `run()` — one scrape-and-match pass:
//!   1. Dispatch every adapter concurrently (bounded by the semaphore),
//!      per-adapter timeout, overall deadline. Failures are isolated: a dead
//!      source costs its own results, never the pass.
//!   2. Fold candidates into canonical records, backfill requirement sets
//!      from descriptions where the page had no explicit tags.
//!   3. Score, filter, rank; aggregate the skill-gap report.
//!
//! The core holds no state between passes; the report is the whole result.

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::extract;
use crate::gap::{self, ResourceCatalog, StaticCatalog};
use crate::matcher::{self, SimilarityScorer, TokenSetScorer};
use crate::models::{JobCandidate, MatchReport, SourceError};
use crate::scraper::{self, cleaner, JobSource};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{error, info, warn};

pub struct Pipeline {
    config: AppConfig,
    sources: Vec<Arc<dyn JobSource>>,
    scorer: Box<dyn SimilarityScorer>,
    catalog: Box<dyn ResourceCatalog>,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Result<Self> {
        let sources =
            scraper::default_sources(&config.scraper).context("Failed to build job sources")?;
        Ok(Self {
            config,
            sources,
            scorer: Box::new(TokenSetScorer),
            catalog: Box::new(StaticCatalog),
        })
    }

    /// Swap the adapter set. Used by tests and callers with custom sources.
    pub fn with_sources(mut self, sources: Vec<Arc<dyn JobSource>>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_catalog(mut self, catalog: Box<dyn ResourceCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Fetch from every source concurrently. Per-adapter failures become
    /// `SourceError` records; the union of successes is returned either way.
    pub async fn scrape_all(
        &self,
        query: &str,
        location: &str,
    ) -> (Vec<JobCandidate>, Vec<SourceError>) {
        let sem = Arc::new(Semaphore::new(self.config.scheduler.concurrency));
        let adapter_timeout = Duration::from_secs(self.config.scheduler.adapter_timeout_secs);
        let deadline = Instant::now() + Duration::from_secs(self.config.scheduler.deadline_secs);
        let max_results = self.config.scraper.max_results;

        let mut handles = Vec::new();

        for source in &self.sources {
            let id = source.id();
            let source = Arc::clone(source);
            let sem = Arc::clone(&sem);
            let query = query.to_string();
            let location = location.to_string();

            let handle = tokio::spawn(async move {
                let _permit = sem
                    .acquire()
                    .await
                    .map_err(|e| FetchError::Request(e.to_string()))?;

                match timeout(adapter_timeout, source.fetch(&query, &location, max_results)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout),
                }
            });

            handles.push((id, handle));
        }

        let mut candidates = Vec::new();
        let mut errors = Vec::new();

        for (id, handle) in handles {
            let abort = handle.abort_handle();
            match timeout_at(deadline, handle).await {
                // Overall deadline: abandon the in-flight call, keep what
                // already completed.
                Err(_elapsed) => {
                    abort.abort();
                    warn!("{}: abandoned at overall deadline", id);
                    errors.push(SourceError {
                        source: id.to_string(),
                        reason: "overall deadline exceeded".to_string(),
                    });
                }
                Ok(Err(join_err)) => {
                    error!("Task panic for {}: {}", id, join_err);
                    errors.push(SourceError {
                        source: id.to_string(),
                        reason: format!("task failed: {}", join_err),
                    });
                }
                Ok(Ok(Err(fetch_err))) => {
                    warn!("{}: {}", id, fetch_err);
                    errors.push(SourceError {
                        source: id.to_string(),
                        reason: fetch_err.to_string(),
                    });
                }
                Ok(Ok(Ok(fetch))) => {
                    info!("{}: {} candidates", id, fetch.candidates.len());
                    if fetch.dropped > 0 {
                        errors.push(SourceError {
                            source: id.to_string(),
                            reason: format!("{} malformed rows dropped", fetch.dropped),
                        });
                    }
                    candidates.extend(fetch.candidates);
                }
            }
        }

        (candidates, errors)
    }

    /// One full scrape-and-match pass against a skill profile.
    pub async fn run(
        &self,
        profile_skills: &[String],
        query: &str,
        location: &str,
    ) -> Result<MatchReport> {
        let skills: Vec<String> = profile_skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        anyhow::ensure!(!skills.is_empty(), "Profile skill set must not be empty");

        info!("=== Step 1: Scraping {} sources ===", self.sources.len());
        let (raw_candidates, source_errors) = self.scrape_all(query, location).await;

        if raw_candidates.is_empty() {
            warn!(
                "No candidates from any source ({} errors) — soft failure",
                source_errors.len()
            );
            return Ok(MatchReport {
                ranked_jobs: Vec::new(),
                gaps: Vec::new(),
                source_errors,
            });
        }

        info!("=== Step 2: Normalizing {} candidates ===", raw_candidates.len());
        let mut records = cleaner::normalize(raw_candidates);
        info!("{} canonical jobs after dedup", records.len());

        // Listing snippets rarely carry explicit requirement chips; derive
        // them from the description when the adapter found none.
        for record in &mut records {
            if record.requirements.is_empty() && !record.description.is_empty() {
                record.requirements = extract::heuristic_skills(&record.description);
            }
        }

        info!("=== Step 3: Matching {} jobs ===", records.len());
        let ranked = matcher::rank(
            self.scorer.as_ref(),
            &skills,
            records,
            &self.config.matcher,
        );

        let gaps = gap::aggregate(
            &ranked,
            &skills,
            self.catalog.as_ref(),
            self.config.matcher.max_gaps,
        );

        info!(
            "=== Done: {} ranked matches | {} gaps | {} source errors ===",
            ranked.len(),
            gaps.len(),
            source_errors.len()
        );

        Ok(MatchReport {
            ranked_jobs: ranked,
            gaps,
            source_errors,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
