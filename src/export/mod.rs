//! CSV export of ranked matches. Presentation only — the core itself keeps
//! everything in memory.

use crate::models::JobRecord;
use anyhow::{Context, Result};
use std::path::Path;

pub fn write_matches_csv(jobs: &[JobRecord], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;

    writer.write_record([
        "title", "company", "location", "score", "matched", "missing", "sources", "url",
    ])?;

    for job in jobs {
        let matched = job
            .matched_skills
            .iter()
            .map(|m| m.skill.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        writer.write_record([
            job.title.clone(),
            job.company.clone(),
            job.location.clone(),
            job.match_score.to_string(),
            matched,
            job.missing_skills.join("; "),
            job.sources.join("; "),
            job.url.clone(),
        ])?;
    }

    writer.flush().context("Failed to flush CSV")?;
    Ok(())
}
