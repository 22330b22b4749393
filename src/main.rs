mod config;
mod error;
mod export;
mod extract;
mod gap;
mod matcher;
mod models;
mod pipeline;
mod scraper;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::extract::ExtractorClient;
use crate::models::MatchReport;
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "jobscout", about = "Multi-source job search with skill matching", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape sources and rank postings against a skill profile
    Match {
        /// Comma-separated skill list (takes precedence over --resume)
        #[arg(short, long)]
        skills: Option<String>,

        /// Plain-text resume to derive skills from
        #[arg(short, long)]
        resume: Option<PathBuf>,

        /// Search query, e.g. "store manager"
        #[arg(short, long)]
        query: String,

        /// Free-text location filter passed to every source
        #[arg(short, long, default_value = "")]
        location: String,

        /// Write the ranked matches to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the configured job sources
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "jobscout=info,warn",
        1 => "jobscout=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Match { skills, resume, query, location, output } => {
            let _t = utils::Timer::start("Scrape and match");

            let profile = resolve_profile(&config, skills, resume).await?;
            info!("Profile: {} skills", profile.len());

            let report = Pipeline::new(config)?.run(&profile, &query, &location).await?;

            print_report(&report);

            if let Some(path) = output {
                export::write_matches_csv(&report.ranked_jobs, &path)?;
                println!("Saved {} matches to {:?}", report.ranked_jobs.len(), path);
            }
        }

        Command::Sources => {
            let sources = scraper::default_sources(&config.scraper)?;
            println!("{} sources:", sources.len());
            for source in &sources {
                println!("  {}", source.id());
            }
        }
    }

    Ok(())
}

async fn resolve_profile(
    config: &AppConfig,
    skills: Option<String>,
    resume: Option<PathBuf>,
) -> Result<Vec<String>> {
    if let Some(list) = skills {
        let parsed: Vec<String> = list
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        anyhow::ensure!(!parsed.is_empty(), "--skills contained no usable entries");
        return Ok(parsed);
    }

    let Some(path) = resume else {
        anyhow::bail!("Either --skills or --resume is required");
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {:?}", path))?;

    let client = ExtractorClient::new(&config.services)?;
    let profile = extract::profile_skills(&client, &text).await;
    anyhow::ensure!(!profile.is_empty(), "No skills could be derived from {:?}", path);
    Ok(profile)
}

fn print_report(report: &MatchReport) {
    if report.ranked_jobs.is_empty() {
        println!("No matches found.");
        for err in &report.source_errors {
            println!("  {}: {}", err.source, err.reason);
        }
        if report.is_empty_with_errors() {
            println!("All or most sources failed — try again in a few minutes.");
        }
        return;
    }

    println!("─────────────────────────────────────────────");
    println!("  Ranked matches ({})", report.ranked_jobs.len());
    println!("─────────────────────────────────────────────");
    for job in &report.ranked_jobs {
        println!(
            "  {:>3}%  {} — {} [{}]",
            job.match_score,
            utils::ellipsize(&job.title, 40),
            utils::ellipsize(&job.company, 25),
            job.sources.join(", "),
        );
        println!("        {}", job.url);
    }

    if !report.gaps.is_empty() {
        println!("─────────────────────────────────────────────");
        println!("  Top skill gaps");
        println!("─────────────────────────────────────────────");
        for gapentry in &report.gaps {
            println!("  {:>2}×  {}", gapentry.frequency, gapentry.skill);
            for resource in &gapentry.resources {
                println!("        {}", resource);
            }
        }
    }

    if !report.source_errors.is_empty() {
        println!("─────────────────────────────────────────────");
        for err in &report.source_errors {
            println!("  ⚠ {}: {}", err.source, err.reason);
        }
    }
}
