use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ── Raw parse row ─────────────────────────────────────────────────────────────

/// One job card as lifted off a listing page. All fields optional: selector
/// strategies fill what they can, the cleaner decides what survives.
#[derive(Debug, Clone, Default)]
pub struct RawJobRow {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Vec<String>,
    pub url: Option<String>,
    pub posted: Option<String>,
}

// ── Job candidate ─────────────────────────────────────────────────────────────

/// Pre-dedup extraction from a single adapter. Transient: folded into
/// `JobRecord`s during normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobCandidate {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    /// Requirement-skill strings, may be empty when the page has no tag chips.
    pub requirements: Vec<String>,
    pub source: String,
    pub url: String,
    /// Posted-date text as shown on the page, best-effort.
    pub posted: Option<String>,
}

// ── Job record ────────────────────────────────────────────────────────────────

/// Canonical, deduplicated job. Exactly one record survives per dedup key;
/// score fields are populated by the matcher after deduplication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    /// All source identifiers that contributed a candidate for this key.
    pub sources: Vec<String>,
    pub url: String,
    pub posted: Option<String>,
    pub dedup_key: String,
    /// 0–100, percentage of requirement-skills satisfied by the profile.
    pub match_score: u8,
    pub matched_skills: Vec<SkillMatch>,
    pub missing_skills: Vec<String>,
    pub scraped_at: NaiveDateTime,
}

/// A requirement satisfied by a profile skill, with the similarity that won.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillMatch {
    pub requirement: String,
    pub skill: String,
    pub similarity: u8,
}

// ── Skill gap ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillGapEntry {
    pub skill: String,
    /// Number of distinct ranked jobs missing this skill.
    pub frequency: usize,
    /// Recommended learning resources; empty when the catalog has no mapping.
    pub resources: Vec<String>,
}

// ── Scrape outcome ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceError {
    pub source: String,
    pub reason: String,
}

/// What one scrape-and-match pass returns to the caller. The core holds no
/// state between calls; this is the whole result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchReport {
    pub ranked_jobs: Vec<JobRecord>,
    pub gaps: Vec<SkillGapEntry>,
    pub source_errors: Vec<SourceError>,
}

impl MatchReport {
    /// Soft-failure check: nothing matched and at least one source reported
    /// a reason. Callers render a "try again later" state off this.
    pub fn is_empty_with_errors(&self) -> bool {
        self.ranked_jobs.is_empty() && !self.source_errors.is_empty()
    }
}
