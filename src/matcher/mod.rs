//! Compatibility scoring between a profile's skill set and extracted job
//! requirements.
//!
//! A requirement counts as matched when its best fuzzy similarity against any
//! profile skill reaches the acceptance threshold. The job's score is the
//! matched fraction as a 0–100 percentage; jobs below the display threshold
//! are dropped from the ranked result.

use crate::config::MatcherConfig;
use crate::models::{JobRecord, SkillMatch};
use crate::scraper::cleaner::normalise_text;
use strsim::jaro_winkler;

// ── Similarity ────────────────────────────────────────────────────────────────

/// Pluggable fuzzy comparison: 0 (disjoint) to 100 (identical). Any token-set
/// style algorithm can slot in without touching the scoring logic.
pub trait SimilarityScorer: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> u8;
}

/// Token-set Jaro-Winkler: case and word-order insensitive.
/// "Customer Service" vs "service, customer" → 100.
pub struct TokenSetScorer;

fn token_set(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.dedup();
    tokens.join(" ")
}

impl SimilarityScorer for TokenSetScorer {
    fn similarity(&self, a: &str, b: &str) -> u8 {
        let ta = token_set(a);
        let tb = token_set(b);
        if ta.is_empty() || tb.is_empty() {
            return 0;
        }
        if ta == tb {
            return 100;
        }
        (jaro_winkler(&ta, &tb) * 100.0).round() as u8
    }
}

// ── Scoring ───────────────────────────────────────────────────────────────────

/// Populate match_score / matched_skills / missing_skills on one record.
/// A job with no requirement-skills cannot be evaluated and scores 0.
pub fn score_job(
    scorer: &dyn SimilarityScorer,
    profile: &[String],
    job: &mut JobRecord,
    accept_threshold: u8,
) {
    job.matched_skills.clear();
    job.missing_skills.clear();
    job.match_score = 0;

    if job.requirements.is_empty() {
        return;
    }

    let mut matched = 0usize;

    for req in &job.requirements {
        // First profile skill wins on equal similarity, keeping the
        // pairing deterministic.
        let mut best: Option<(u8, &String)> = None;
        for skill in profile {
            let sim = scorer.similarity(req, skill);
            if best.is_none_or(|(b, _)| sim > b) {
                best = Some((sim, skill));
            }
        }

        match best {
            Some((sim, skill)) if sim >= accept_threshold => {
                matched += 1;
                job.matched_skills.push(SkillMatch {
                    requirement: normalise_text(req),
                    skill: skill.clone(),
                    similarity: sim,
                });
            }
            _ => job.missing_skills.push(normalise_text(req)),
        }
    }

    job.match_score =
        ((matched as f64 / job.requirements.len() as f64) * 100.0).round() as u8;
}

/// Score every record, apply the display threshold, and order the survivors:
/// descending score, then matched-count descending, then original candidate
/// order (stable sort). Deterministic for identical inputs.
pub fn rank(
    scorer: &dyn SimilarityScorer,
    profile: &[String],
    mut jobs: Vec<JobRecord>,
    config: &MatcherConfig,
) -> Vec<JobRecord> {
    for job in &mut jobs {
        score_job(scorer, profile, job, config.accept_threshold);
    }

    let mut ranked: Vec<JobRecord> = jobs
        .into_iter()
        .filter(|j| !j.requirements.is_empty() && j.match_score >= config.min_score)
        .collect();

    ranked.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then(b.matched_skills.len().cmp(&a.matched_skills.len()))
    });

    ranked
}

// ── Tests ─────────────────────────────────────────────────────────────────────
