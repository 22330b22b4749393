//! Skill-gap aggregation over the ranked match set.

use crate::models::{JobRecord, SkillGapEntry};
use std::collections::{HashMap, HashSet};

// ── Resource catalog ──────────────────────────────────────────────────────────

/// External recommendation lookup keyed by skill string. A missing mapping is
/// normal: the gap entry still appears, with no resources.
pub trait ResourceCatalog: Send + Sync {
    fn resources_for(&self, skill: &str) -> Vec<String>;
}

/// Small built-in lookup covering common skills.
pub struct StaticCatalog;

impl ResourceCatalog for StaticCatalog {
    fn resources_for(&self, skill: &str) -> Vec<String> {
        let links: &[&str] = match skill {
            "sql" => &["https://sqlbolt.com", "https://mode.com/sql-tutorial"],
            "excel" => &["https://exceljet.net"],
            "python" => &["https://docs.python.org/3/tutorial"],
            "javascript" => &["https://javascript.info"],
            "docker" => &["https://docs.docker.com/get-started"],
            "kubernetes" => &["https://kubernetes.io/docs/tutorials"],
            "project management" => &["https://www.pmi.org/learning"],
            "customer service" => &["https://www.coursera.org/courses?query=customer%20service"],
            "inventory management" => &["https://www.coursera.org/courses?query=inventory"],
            "data entry" => &["https://www.typing.com"],
            _ => &[],
        };
        links.iter().map(|l| l.to_string()).collect()
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Top unmet skills across the ranked jobs, descending by the number of
/// distinct jobs missing each skill; lexicographic tie-break. Jobs below the
/// display threshold never reach this function, so the signal stays tied to
/// realistically attainable roles.
pub fn aggregate(
    ranked: &[JobRecord],
    profile_skills: &[String],
    catalog: &dyn ResourceCatalog,
    top_n: usize,
) -> Vec<SkillGapEntry> {
    let profile: HashSet<String> = profile_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();

    let mut freq: HashMap<&str, usize> = HashMap::new();
    for job in ranked {
        let distinct: HashSet<&str> = job.missing_skills.iter().map(String::as_str).collect();
        for skill in distinct {
            if profile.contains(skill) {
                continue;
            }
            *freq.entry(skill).or_default() += 1;
        }
    }

    let mut entries: Vec<(&str, usize)> = freq.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    entries.truncate(top_n);

    entries
        .into_iter()
        .map(|(skill, frequency)| SkillGapEntry {
            skill: skill.to_string(),
            frequency,
            resources: catalog.resources_for(skill),
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ranked_job(title: &str, missing: &[&str]) -> JobRecord {
        JobRecord {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: String::new(),
            description: String::new(),
            requirements: missing.iter().map(|m| m.to_string()).collect(),
            sources: vec!["indeed".to_string()],
            url: String::new(),
            posted: None,
            dedup_key: title.to_lowercase(),
            match_score: 60,
            matched_skills: Vec::new(),
            missing_skills: missing.iter().map(|m| m.to_string()).collect(),
            scraped_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_frequency_counts_distinct_jobs() {
        let jobs = vec![
            ranked_job("A", &["sql", "sql", "docker"]),
            ranked_job("B", &["sql"]),
            ranked_job("C", &["docker"]),
        ];
        let gaps = aggregate(&jobs, &[], &StaticCatalog, 5);

        // "sql" appears twice in job A but counts once per job
        assert_eq!(gaps[0].skill, "docker");
        assert_eq!(gaps[0].frequency, 2);
        assert_eq!(gaps[1].skill, "sql");
        assert_eq!(gaps[1].frequency, 2);
    }

    #[test]
    fn test_lexicographic_tie_break_and_bound() {
        let jobs = vec![ranked_job("A", &["f", "e", "d", "c", "b", "a"])];
        let gaps = aggregate(&jobs, &[], &StaticCatalog, 5);

        assert_eq!(gaps.len(), 5);
        let skills: Vec<&str> = gaps.iter().map(|g| g.skill.as_str()).collect();
        assert_eq!(skills, vec!["a", "b", "c", "d", "e"]);
        assert!(gaps.windows(2).all(|w| w[0].frequency >= w[1].frequency));
    }

    #[test]
    fn test_gap_without_catalog_mapping_still_appears() {
        let jobs = vec![ranked_job("A", &["underwater basket weaving"])];
        let gaps = aggregate(&jobs, &[], &StaticCatalog, 5);

        assert_eq!(gaps.len(), 1);
        assert!(gaps[0].resources.is_empty());

        let known = aggregate(&[ranked_job("B", &["sql"])], &[], &StaticCatalog, 5);
        assert!(!known[0].resources.is_empty());
    }

    #[test]
    fn test_profile_skills_never_reported_as_gaps() {
        let jobs = vec![ranked_job("A", &["sql", "docker"])];
        let profile = vec!["SQL".to_string()];
        let gaps = aggregate(&jobs, &profile, &StaticCatalog, 5);

        let skills: Vec<&str> = gaps.iter().map(|g| g.skill.as_str()).collect();
        assert_eq!(skills, vec!["docker"]);
    }
}
