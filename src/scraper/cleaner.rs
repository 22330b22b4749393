use crate::models::{JobCandidate, JobRecord, RawJobRow};
use chrono::Utc;
use std::collections::HashMap;
use url::Url;

// ── Canonicalization ──────────────────────────────────────────────────────────

/// Lowercase and collapse runs of whitespace.
/// "Store  Manager " → "store manager"
pub fn normalise_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical identity for one real posting across sources.
pub fn dedup_key(title: &str, company: &str, location: &str) -> String {
    format!(
        "{}|{}|{}",
        normalise_text(title),
        normalise_text(company),
        normalise_text(location)
    )
}

const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "tk",
    "from",
];

/// Strip tracking parameters from a URL; real query params survive.
pub fn canonical_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw.trim()) else {
        return raw.trim().to_string();
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
    }

    url.to_string()
}

/// Resolve a possibly-relative href against the source's base URL.
pub fn absolute_url(href: &str, base: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

// ── Raw row → candidate ───────────────────────────────────────────────────────

/// Validate one parsed row. Rows without a title or link are malformed
/// extractions and are dropped silently.
pub fn row_to_candidate(row: RawJobRow, source: &str, base_url: &str) -> Option<JobCandidate> {
    let title = row
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())?
        .to_string();

    let href = row
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())?;

    Some(JobCandidate {
        title,
        company: row.company.unwrap_or_default().trim().to_string(),
        location: row.location.unwrap_or_default().trim().to_string(),
        description: row.description.unwrap_or_default().trim().to_string(),
        requirements: row
            .requirements
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect(),
        source: source.to_string(),
        url: absolute_url(href, base_url),
        posted: row.posted.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
    })
}

// ── Dedup ─────────────────────────────────────────────────────────────────────

/// Fold candidates into canonical records, unique by dedup key.
/// First-seen order is preserved so the ranker's final tie-break is stable.
pub fn normalize(candidates: Vec<JobCandidate>) -> Vec<JobRecord> {
    let now = Utc::now().naive_utc();

    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, JobRecord> = HashMap::new();

    for cand in candidates {
        let key = dedup_key(&cand.title, &cand.company, &cand.location);
        match by_key.get_mut(&key) {
            None => {
                order.push(key.clone());
                let record = JobRecord {
                    url: canonical_url(&cand.url),
                    title: cand.title,
                    company: cand.company,
                    location: cand.location,
                    description: cand.description,
                    requirements: cand.requirements,
                    sources: vec![cand.source],
                    posted: cand.posted,
                    dedup_key: key.clone(),
                    match_score: 0,
                    matched_skills: Vec::new(),
                    missing_skills: Vec::new(),
                    scraped_at: now,
                };
                by_key.insert(key, record);
            }
            Some(existing) => merge_into(existing, cand),
        }
    }

    order
        .into_iter()
        .filter_map(|k| by_key.remove(&k))
        .collect()
}

/// Merge a colliding candidate into its record. A non-empty requirement set
/// wins over an empty one; between equals, the longer description wins.
/// Collisions fold left-to-right in arrival order.
fn merge_into(existing: &mut JobRecord, cand: JobCandidate) {
    if !existing.sources.contains(&cand.source) {
        existing.sources.push(cand.source.clone());
    }
    if existing.posted.is_none() {
        existing.posted = cand.posted.clone();
    }

    let requirements_win = !cand.requirements.is_empty() && existing.requirements.is_empty();
    let description_win = cand.requirements.is_empty() == existing.requirements.is_empty()
        && cand.description.len() > existing.description.len();

    if requirements_win || description_win {
        existing.description = cand.description;
        existing.url = canonical_url(&cand.url);
        if !cand.requirements.is_empty() {
            existing.requirements = cand.requirements;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(source: &str, title: &str, desc: &str, reqs: &[&str]) -> JobCandidate {
        JobCandidate {
            title: title.to_string(),
            company: "Acme Retail".to_string(),
            location: "Cape Town".to_string(),
            description: desc.to_string(),
            requirements: reqs.iter().map(|r| r.to_string()).collect(),
            source: source.to_string(),
            url: format!("https://{}.example.com/jobs/1", source),
            posted: None,
        }
    }

    #[test]
    fn test_normalise_text() {
        assert_eq!(normalise_text("  Store   Manager "), "store manager");
        assert_eq!(normalise_text("ACME\tRetail"), "acme retail");
    }

    #[test]
    fn test_canonical_url_strips_tracking() {
        assert_eq!(
            canonical_url("https://example.com/jobs/1?utm_source=feed&page=2"),
            "https://example.com/jobs/1?page=2"
        );
        assert_eq!(
            canonical_url("https://example.com/jobs/1?utm_campaign=x&gclid=abc"),
            "https://example.com/jobs/1"
        );
        // Non-URL input passes through trimmed
        assert_eq!(canonical_url(" not a url "), "not a url");
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("/jobs/5", "https://example.com"),
            "https://example.com/jobs/5"
        );
        assert_eq!(
            absolute_url("https://other.com/x", "https://example.com"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_malformed_row_dropped() {
        let no_title = RawJobRow {
            url: Some("/jobs/1".to_string()),
            ..Default::default()
        };
        assert!(row_to_candidate(no_title, "indeed", "https://example.com").is_none());

        let no_url = RawJobRow {
            title: Some("Cashier".to_string()),
            ..Default::default()
        };
        assert!(row_to_candidate(no_url, "indeed", "https://example.com").is_none());
    }

    #[test]
    fn test_cross_source_merge_accumulates_sources() {
        let records = normalize(vec![
            cand("indeed", "Store Manager", "short", &[]),
            cand("linkedin", "Store  MANAGER", "short", &[]),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sources, vec!["indeed", "linkedin"]);
    }

    #[test]
    fn test_merge_prefers_requirements_then_description() {
        // Non-empty requirement set beats a longer description
        let records = normalize(vec![
            cand("indeed", "Cashier", "a much longer description of the role", &[]),
            cand("linkedin", "Cashier", "short", &["Excel"]),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].requirements, vec!["Excel"]);
        assert_eq!(records[0].description, "short");

        // Both empty: longer description wins
        let records = normalize(vec![
            cand("indeed", "Cashier", "short", &[]),
            cand("linkedin", "Cashier", "a much longer description", &[]),
        ]);
        assert_eq!(records[0].description, "a much longer description");
    }

    #[test]
    fn test_three_way_collision_folds_in_order() {
        let records = normalize(vec![
            cand("indeed", "Cashier", "medium length text", &[]),
            cand("linkedin", "Cashier", "short", &["POS Systems"]),
            cand("ziprecruiter", "Cashier", "the longest description of them all", &[]),
        ]);
        assert_eq!(records.len(), 1);
        // Second candidate won on requirements; third loses to it despite length
        assert_eq!(records[0].requirements, vec!["POS Systems"]);
        assert_eq!(records[0].description, "short");
        assert_eq!(records[0].sources.len(), 3);
    }

    #[test]
    fn test_normalize_idempotent() {
        let once = normalize(vec![
            cand("indeed", "Store Manager", "desc", &["Excel"]),
            cand("linkedin", "Store Manager", "desc", &["Excel"]),
            cand("indeed", "Cashier", "other", &[]),
        ]);

        let back: Vec<JobCandidate> = once
            .iter()
            .map(|r| JobCandidate {
                title: r.title.clone(),
                company: r.company.clone(),
                location: r.location.clone(),
                description: r.description.clone(),
                requirements: r.requirements.clone(),
                source: r.sources[0].clone(),
                url: r.url.clone(),
                posted: r.posted.clone(),
            })
            .collect();

        let twice = normalize(back);
        assert_eq!(twice.len(), once.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.dedup_key, b.dedup_key);
            assert_eq!(a.requirements, b.requirements);
            assert_eq!(a.description, b.description);
        }
    }
}
