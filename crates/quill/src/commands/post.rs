//! Short-term memory commands.
//!
//! Recording a post runs one analysis call against the text generator and,
//! once enough posts are waiting, compresses them into long-term memory.

use anyhow::{Context, Result};
use colored::Colorize;
use quill_sdk::{CompressionOutcome, CompressionStatus, EngagementInsights, InsightTrend, NewPost};

use super::print_json;
use crate::cli::{PostAction, PostCommand};
use crate::config::Config;
use crate::engine;
use crate::error::QuillError;

/// Execute post command.
pub async fn execute(cmd: PostCommand, config: &Config, user: Option<&str>, json: bool) -> Result<()> {
    let engine = engine::open(config, user)?;
    let sdk = &engine.sdk;
    let ctx = &engine.ctx;

    match cmd.action {
        PostAction::Record {
            text,
            topic,
            post_type,
            engagement,
        } => {
            let mut post = NewPost::new(text, topic).with_post_type(post_type);
            if let Some(counts) = engagement.counts() {
                post = post.with_engagement(counts);
            }
            let recorded = sdk
                .memory()
                .record(ctx, post)
                .await
                .context("Failed to record post")?;

            if json {
                return print_json(&recorded);
            }
            println!("{} Recorded post {}", "✓".green(), recorded.entry_id.cyan());
            println!("  Engagement score: {:.2}", recorded.engagement_score);
            if recorded.used_fallback {
                println!("  {} Analysis unavailable, default analysis stored", "⚠".yellow());
            }
            print_compression_status(&recorded.compression);
            Ok(())
        }

        PostAction::Engagement { id, engagement } => {
            let counts = engagement.counts().ok_or(QuillError::NoEngagement)?;
            let entry = sdk
                .memory()
                .update_engagement(ctx, &id, counts)
                .await
                .context("Failed to update engagement")?;

            if json {
                return print_json(&entry);
            }
            println!(
                "{} Updated {}: engagement score {:.2}",
                "✓".green(),
                entry.id.cyan(),
                entry.engagement_score
            );
            Ok(())
        }

        PostAction::Compress => {
            let outcome = sdk
                .compression()
                .compress(ctx)
                .await
                .context("Compression failed")?;

            if json {
                return print_json(&outcome);
            }
            match outcome {
                Some(outcome) => print_outcome(&outcome),
                None => {
                    let waiting = sdk.compression().unprocessed_count(ctx)?;
                    println!(
                        "{} Nothing to compress ({} of {} posts waiting)",
                        "⚠".yellow(),
                        waiting,
                        sdk.config().memory.compression_threshold
                    );
                }
            }
            Ok(())
        }

        PostAction::Insights => {
            let insights = sdk.memory().insights(ctx)?;
            if json {
                return print_json(&insights);
            }
            match insights {
                Some(insights) => print_insights(&insights),
                None => println!("{} No posts recorded yet", "⚠".yellow()),
            }
            Ok(())
        }

        PostAction::List { limit } => {
            let mut entries = sdk.memory().entries(ctx)?;
            entries.reverse();
            entries.truncate(limit);

            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("{} No posts recorded yet", "⚠".yellow());
                return Ok(());
            }
            for entry in &entries {
                let state = if entry.processed {
                    "compressed".dimmed()
                } else {
                    "waiting".yellow()
                };
                println!(
                    "{} [{}] {:.2} {}",
                    entry.id.cyan(),
                    state,
                    entry.engagement_score,
                    entry.timestamp.format("%Y-%m-%d %H:%M")
                );
                println!("  {} / {}", entry.analysis.topic, entry.analysis.tone);
                println!("  {}", quill_sdk::utils::truncate_chars(&entry.document, 100));
            }
            Ok(())
        }
    }
}

fn print_compression_status(status: &CompressionStatus) {
    match status {
        CompressionStatus::NotTriggered => {}
        CompressionStatus::Compressed(outcome) => {
            println!();
            print_outcome(outcome);
        }
        CompressionStatus::Failed { message } => {
            println!("  {} Compression failed, will retry on next post: {}", "⚠".yellow(), message);
        }
    }
}

fn print_outcome(outcome: &CompressionOutcome) {
    println!(
        "{} Compressed {} posts into long-term memory {}",
        "✓".green(),
        outcome.post_count,
        outcome.ltm_id.cyan()
    );
    println!(
        "  Average {:.2}, peak {:.2}, {} high performers, trend {}",
        outcome.avg_engagement,
        outcome.max_engagement,
        outcome.high_engagement_count,
        outcome.engagement_trend
    );
    if let Some(err) = &outcome.snapshot_error {
        println!("  {} Persona snapshot not updated: {}", "⚠".yellow(), err);
    }
}

fn print_insights(insights: &EngagementInsights) {
    let trend = match insights.trend {
        InsightTrend::Improving => insights.trend.to_string().green(),
        InsightTrend::Stable => insights.trend.to_string().yellow(),
    };
    println!("{}", "Engagement".bold());
    println!("  Total posts:     {}", insights.total_posts);
    println!("  Average:         {:.2}", insights.avg_engagement);
    println!("  Peak:            {:.2}", insights.peak_engagement);
    println!("  High performers: {}", insights.high_performers);
    println!("  Trend:           {}", trend);
}
