//! Skill extraction: a thin client for the external AI service, plus the
//! local keyword heuristic the pipeline falls back to when the service is
//! down. Matching cannot proceed without some skill set, so the fallback
//! lives here rather than in the caller.

use crate::config::ServicesConfig;
use crate::error::ExtractionError;
use crate::models::JobRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{debug, warn};

// ── Service client ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CoverLetterResponse {
    letter: String,
}

pub struct ExtractorClient {
    inner: reqwest::Client,
    base_url: String,
}

impl ExtractorClient {
    pub fn new(config: &ServicesConfig) -> Result<Self, ExtractionError> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.extractor_timeout_secs))
            .build()?;

        Ok(Self {
            inner,
            base_url: config.extractor_url.trim_end_matches('/').to_string(),
        })
    }

    /// Derive a skill set from free profile text. One retry on transient
    /// failure, then the error is the caller's to recover from.
    pub async fn extract_skills(&self, text: &str) -> Result<Vec<String>, ExtractionError> {
        let url = format!("{}/api/extract-skills", self.base_url);

        let resp = Retry::spawn(FixedInterval::from_millis(500).take(1), || async {
            let resp = self
                .inner
                .post(&url)
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                return Err(ExtractionError::Status(status.as_u16()));
            }
            Ok(resp)
        })
        .await?;

        let body: ExtractResponse = resp
            .json()
            .await
            .map_err(|e| ExtractionError::Malformed(e.to_string()))?;

        let skills = dedupe_skills(body.skills);
        if skills.is_empty() {
            return Err(ExtractionError::Malformed("empty skill set".to_string()));
        }

        debug!("Extraction service returned {} skills", skills.len());
        Ok(skills)
    }

    /// Pass-through to the cover-letter generator. The core only consumes
    /// this; scoring never depends on it.
    pub async fn generate_cover_letter(
        &self,
        skills: &[String],
        job: &JobRecord,
    ) -> Result<String, ExtractionError> {
        let url = format!("{}/api/cover-letter", self.base_url);

        let resp = self
            .inner
            .post(&url)
            .json(&serde_json::json!({
                "skills": skills,
                "title": job.title,
                "company": job.company,
                "description": job.description,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExtractionError::Status(status.as_u16()));
        }

        let body: CoverLetterResponse = resp
            .json()
            .await
            .map_err(|e| ExtractionError::Malformed(e.to_string()))?;
        Ok(body.letter)
    }
}

/// Service first, keyword heuristic on failure. Degrades accuracy, never
/// blocks matching.
pub async fn profile_skills(client: &ExtractorClient, text: &str) -> Vec<String> {
    match client.extract_skills(text).await {
        Ok(skills) => skills,
        Err(e) => {
            warn!("Skill extraction service failed ({}), using keyword fallback", e);
            heuristic_skills(text)
        }
    }
}

fn dedupe_skills(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

// ── Keyword heuristic ─────────────────────────────────────────────────────────

// Flat keyword table: languages, data/cloud tooling, office and retail
// skills, soft skills. Multi-word entries match as phrases.
static KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Programming and data
        "python", "javascript", "typescript", "java", "c++", "c#", "go", "rust",
        "ruby", "php", "swift", "kotlin", "sql", "html", "css", "bash",
        "react", "angular", "vue", "django", "flask", "spring", "node.js",
        "pandas", "numpy", "tensorflow", "pytorch", "machine learning",
        "data analysis", "data entry", "etl",
        // Infrastructure
        "docker", "kubernetes", "terraform", "jenkins", "git", "linux",
        "aws", "azure", "gcp", "ci/cd",
        // Databases
        "mysql", "postgresql", "mongodb", "redis", "elasticsearch",
        // Office and retail
        "excel", "microsoft office", "powerpoint", "quickbooks", "salesforce",
        "crm", "pos systems", "point of sale", "inventory management",
        "merchandising", "cash handling", "scheduling", "bookkeeping",
        "payroll", "forklift",
        // Soft skills
        "customer service", "communication", "leadership", "teamwork",
        "problem solving", "time management", "project management",
        "conflict resolution", "attention to detail", "multitasking",
        "agile", "scrum",
    ]
});

// '+' and '#' survive so "c++" and "c#" keep their identity; everything
// else becomes a word boundary.
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9+#]+").unwrap());

/// Scan text for known skill keywords on word boundaries. Returns trimmed,
/// lowercase, deduplicated skills in table order.
pub fn heuristic_skills(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let padded = format!(" {} ", NON_WORD.replace_all(&lowered, " "));

    KEYWORDS
        .iter()
        .filter(|kw| {
            let needle = format!(" {} ", NON_WORD.replace_all(kw, " "));
            padded.contains(&needle)
        })
        .map(|kw| kw.to_string())
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServicesConfig;

    #[test]
    fn test_heuristic_finds_keywords_case_insensitively() {
        let text = "Seasoned retail lead. EXCEL wizard, strong Customer Service, \
                    trained staff on POS systems and inventory management.";
        let skills = heuristic_skills(text);

        assert!(skills.contains(&"excel".to_string()));
        assert!(skills.contains(&"customer service".to_string()));
        assert!(skills.contains(&"pos systems".to_string()));
        assert!(skills.contains(&"inventory management".to_string()));
    }

    #[test]
    fn test_heuristic_respects_word_boundaries() {
        // "going" must not match "go", "excellent" must not match "excel"
        let skills = heuristic_skills("going places, excellent attitude");
        assert!(!skills.contains(&"go".to_string()));
        assert!(!skills.contains(&"excel".to_string()));
    }

    #[test]
    fn test_dedupe_skills_trims_and_lowercases() {
        let skills = dedupe_skills(vec![
            " Excel ".to_string(),
            "excel".to_string(),
            "SQL".to_string(),
            "  ".to_string(),
        ]);
        assert_eq!(skills, vec!["excel", "sql"]);
    }

    #[tokio::test]
    async fn test_cover_letter_surfaces_service_errors() {
        let config = ServicesConfig {
            extractor_url: "http://127.0.0.1:1".to_string(),
            extractor_timeout_secs: 1,
        };
        let client = ExtractorClient::new(&config).unwrap();

        let job = crate::scraper::cleaner::row_to_candidate(
            crate::models::RawJobRow {
                title: Some("Cashier".to_string()),
                url: Some("/jobs/1".to_string()),
                ..Default::default()
            },
            "indeed",
            "https://example.com",
        )
        .map(|c| crate::scraper::cleaner::normalize(vec![c]).remove(0))
        .unwrap();

        let result = client
            .generate_cover_letter(&["excel".to_string()], &job)
            .await;
        assert!(matches!(result, Err(ExtractionError::Service(_))));
    }

    #[tokio::test]
    async fn test_profile_skills_falls_back_on_service_error() {
        // Nothing listens here; the client fails fast and the heuristic runs.
        let config = ServicesConfig {
            extractor_url: "http://127.0.0.1:1".to_string(),
            extractor_timeout_secs: 1,
        };
        let client = ExtractorClient::new(&config).unwrap();

        let skills = profile_skills(&client, "Excel and customer service background").await;
        assert!(skills.contains(&"excel".to_string()));
        assert!(skills.contains(&"customer service".to_string()));
    }
}
