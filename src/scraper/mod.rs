pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::models::JobCandidate;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use url::form_urlencoded;

use self::cleaner::row_to_candidate;
use self::http_client::HttpClient;
use self::parsers::{parse_with_fallback, SelectorStrategy};

// ── Source trait ──────────────────────────────────────────────────────────────

/// Result of one adapter call. `dropped` counts rows that parsed but were
/// missing required fields — a partial-parse signal the scheduler surfaces
/// without discarding the rows that did survive.
#[derive(Debug)]
pub struct AdapterFetch {
    pub candidates: Vec<JobCandidate>,
    pub dropped: usize,
}

/// Swappable listing-site abstraction: fetch raw HTML for a search and parse
/// it into candidates. Adapters share no mutable state.
#[async_trait]
pub trait JobSource: Send + Sync {
    fn id(&self) -> &'static str;

    async fn fetch(
        &self,
        query: &str,
        location: &str,
        max_results: usize,
    ) -> Result<AdapterFetch, FetchError>;
}

/// The default adapter set, one per supported listing site.
pub fn default_sources(config: &ScraperConfig) -> Result<Vec<Arc<dyn JobSource>>, FetchError> {
    Ok(vec![
        Arc::new(IndeedSource::new(config)?),
        Arc::new(LinkedInSource::new(config)?),
        Arc::new(ZipRecruiterSource::new(config)?),
        Arc::new(SimplyHiredSource::new(config)?),
    ])
}

// ── Shared fetch-and-parse ────────────────────────────────────────────────────

fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

async fn fetch_listing(
    client: &HttpClient,
    source: &'static str,
    base_url: &str,
    search_url: &str,
    strategies: &[SelectorStrategy],
    max_results: usize,
) -> Result<AdapterFetch, FetchError> {
    debug!("{}: fetching {}", source, search_url);

    let html = client.get_text(search_url).await?;
    let rows = parse_with_fallback(&html, strategies, source);
    let total = rows.len();

    let mut candidates: Vec<JobCandidate> = rows
        .into_iter()
        .filter_map(|row| row_to_candidate(row, source, base_url))
        .collect();

    let dropped = total - candidates.len();
    if dropped > 0 {
        warn!("{}: {} of {} rows dropped as malformed", source, dropped, total);
    }

    candidates.truncate(max_results);
    Ok(AdapterFetch { candidates, dropped })
}

// ── Indeed ────────────────────────────────────────────────────────────────────

const INDEED_STRATEGIES: &[SelectorStrategy] = &[
    SelectorStrategy {
        name: "job_seen_beacon",
        card: "div.job_seen_beacon",
        title: "h2.jobTitle a",
        company: "span[data-testid='company-name']",
        location: "div[data-testid='text-location']",
        description: "div.job-snippet",
        link: "h2.jobTitle a",
        tags: Some("div.metadata li"),
        posted: Some("span.date"),
    },
    SelectorStrategy {
        name: "resultContent",
        card: "td.resultContent",
        title: "h2.jobTitle a",
        company: "span.companyName",
        location: "div.companyLocation",
        description: "div.job-snippet",
        link: "h2.jobTitle a",
        tags: None,
        posted: Some("span.date"),
    },
    SelectorStrategy {
        name: "serp_card",
        card: "div.jobsearch-SerpJobCard",
        title: "a.jobtitle",
        company: "span.company",
        location: "span.location",
        description: "div.summary",
        link: "a.jobtitle",
        tags: None,
        posted: Some("span.date"),
    },
];

pub struct IndeedSource {
    client: HttpClient,
    base_url: String,
}

impl IndeedSource {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: HttpClient::new(config)?,
            base_url: "https://www.indeed.com".to_string(),
        })
    }

    fn search_url(&self, query: &str, location: &str) -> String {
        format!(
            "{}/jobs?q={}&l={}",
            self.base_url,
            encode(query),
            encode(location)
        )
    }
}

#[async_trait]
impl JobSource for IndeedSource {
    fn id(&self) -> &'static str {
        "indeed"
    }

    async fn fetch(
        &self,
        query: &str,
        location: &str,
        max_results: usize,
    ) -> Result<AdapterFetch, FetchError> {
        let url = self.search_url(query, location);
        fetch_listing(&self.client, self.id(), &self.base_url, &url, INDEED_STRATEGIES, max_results).await
    }
}

// ── LinkedIn (guest search) ───────────────────────────────────────────────────

const LINKEDIN_STRATEGIES: &[SelectorStrategy] = &[
    SelectorStrategy {
        name: "base_card",
        card: "div.base-card",
        title: "h3.base-search-card__title",
        company: "h4.base-search-card__subtitle",
        location: "span.job-search-card__location",
        description: "p.base-search-card__snippet",
        link: "a.base-card__full-link",
        tags: None,
        posted: Some("time"),
    },
    SelectorStrategy {
        name: "result_card",
        card: "li.result-card",
        title: "h3.result-card__title",
        company: "h4.result-card__subtitle",
        location: "span.job-result-card__location",
        description: "p.job-result-card__snippet",
        link: "a.result-card__full-card-link",
        tags: None,
        posted: Some("time.job-result-card__listdate"),
    },
];

pub struct LinkedInSource {
    client: HttpClient,
    base_url: String,
}

impl LinkedInSource {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: HttpClient::new(config)?,
            base_url: "https://www.linkedin.com".to_string(),
        })
    }

    fn search_url(&self, query: &str, location: &str) -> String {
        format!(
            "{}/jobs/search?keywords={}&location={}",
            self.base_url,
            encode(query),
            encode(location)
        )
    }
}

#[async_trait]
impl JobSource for LinkedInSource {
    fn id(&self) -> &'static str {
        "linkedin"
    }

    async fn fetch(
        &self,
        query: &str,
        location: &str,
        max_results: usize,
    ) -> Result<AdapterFetch, FetchError> {
        let url = self.search_url(query, location);
        fetch_listing(&self.client, self.id(), &self.base_url, &url, LINKEDIN_STRATEGIES, max_results).await
    }
}

// ── ZipRecruiter ──────────────────────────────────────────────────────────────

const ZIPRECRUITER_STRATEGIES: &[SelectorStrategy] = &[
    SelectorStrategy {
        name: "job_result",
        card: "article.job_result",
        title: "h2.job_title a",
        company: "a.t_org_link",
        location: "a.t_location_link",
        description: "p.job_snippet",
        link: "h2.job_title a",
        tags: Some("div.job_tags span"),
        posted: Some("time"),
    },
    SelectorStrategy {
        name: "job_content",
        card: "div.job_content",
        title: "span.just_job_title",
        company: "span.company_name",
        location: "span.location",
        description: "div.job_description",
        link: "a.job_link",
        tags: None,
        posted: None,
    },
];

pub struct ZipRecruiterSource {
    client: HttpClient,
    base_url: String,
}

impl ZipRecruiterSource {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: HttpClient::new(config)?,
            base_url: "https://www.ziprecruiter.com".to_string(),
        })
    }

    fn search_url(&self, query: &str, location: &str) -> String {
        format!(
            "{}/jobs-search?search={}&location={}",
            self.base_url,
            encode(query),
            encode(location)
        )
    }
}

#[async_trait]
impl JobSource for ZipRecruiterSource {
    fn id(&self) -> &'static str {
        "ziprecruiter"
    }

    async fn fetch(
        &self,
        query: &str,
        location: &str,
        max_results: usize,
    ) -> Result<AdapterFetch, FetchError> {
        let url = self.search_url(query, location);
        fetch_listing(&self.client, self.id(), &self.base_url, &url, ZIPRECRUITER_STRATEGIES, max_results).await
    }
}

// ── SimplyHired ───────────────────────────────────────────────────────────────

const SIMPLYHIRED_STRATEGIES: &[SelectorStrategy] = &[
    SelectorStrategy {
        name: "serp_job_card",
        card: "div.SerpJob-jobCard",
        title: "a.SerpJob-link",
        company: "span.jobposting-company",
        location: "span.jobposting-location",
        description: "p.jobposting-snippet",
        link: "a.SerpJob-link",
        tags: Some("li.jobposting-qualification"),
        posted: Some("time"),
    },
    SelectorStrategy {
        name: "job_listing",
        card: "li.job-listing",
        title: "h3.job-title a",
        company: "span.company",
        location: "span.location",
        description: "p.description",
        link: "h3.job-title a",
        tags: None,
        posted: None,
    },
];

pub struct SimplyHiredSource {
    client: HttpClient,
    base_url: String,
}

impl SimplyHiredSource {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: HttpClient::new(config)?,
            base_url: "https://www.simplyhired.com".to_string(),
        })
    }

    fn search_url(&self, query: &str, location: &str) -> String {
        format!(
            "{}/search?q={}&l={}",
            self.base_url,
            encode(query),
            encode(location)
        )
    }
}

#[async_trait]
impl JobSource for SimplyHiredSource {
    fn id(&self) -> &'static str {
        "simplyhired"
    }

    async fn fetch(
        &self,
        query: &str,
        location: &str,
        max_results: usize,
    ) -> Result<AdapterFetch, FetchError> {
        let url = self.search_url(query, location);
        fetch_listing(&self.client, self.id(), &self.base_url, &url, SIMPLYHIRED_STRATEGIES, max_results).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperConfig;

    #[test]
    fn test_search_urls_are_encoded() {
        let config = ScraperConfig::default();
        let indeed = IndeedSource::new(&config).unwrap();
        assert_eq!(
            indeed.search_url("store manager", "cape town"),
            "https://www.indeed.com/jobs?q=store+manager&l=cape+town"
        );

        let linkedin = LinkedInSource::new(&config).unwrap();
        assert!(linkedin
            .search_url("c# developer", "")
            .contains("keywords=c%23+developer"));
    }

    #[test]
    fn test_default_sources_are_distinct() {
        let sources = default_sources(&ScraperConfig::default()).unwrap();
        assert_eq!(sources.len(), 4);
        let ids: Vec<&str> = sources.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["indeed", "linkedin", "ziprecruiter", "simplyhired"]);
    }
}
