//! Persona snapshot commands.

use anyhow::{Context, Result};
use colored::Colorize;
use quill_sdk::types::{PersonaSnapshot, VoiceProfile};

use super::print_json;
use crate::cli::{PersonaAction, PersonaCommand};
use crate::config::Config;
use crate::engine;

/// Execute persona command.
pub async fn execute(cmd: PersonaCommand, config: &Config, user: Option<&str>, json: bool) -> Result<()> {
    let engine = engine::open(config, user)?;
    let snapshots = engine.sdk.snapshots();
    let ctx = &engine.ctx;

    match cmd.action {
        PersonaAction::Show => {
            let snapshot = snapshots.current(ctx).context("Failed to load persona snapshot")?;
            if json {
                return print_json(&snapshot);
            }
            match snapshot {
                Some(snapshot) => print_snapshot(&snapshot),
                None => println!(
                    "{} No persona yet. Record at least {} posts to build one.",
                    "⚠".yellow(),
                    engine.sdk.config().memory.compression_threshold
                ),
            }
            Ok(())
        }

        PersonaAction::Rebuild => {
            let snapshot = snapshots
                .rebuild(ctx)
                .await
                .context("Failed to rebuild persona snapshot")?;
            if json {
                return print_json(&snapshot);
            }
            match snapshot {
                Some(snapshot) => {
                    println!("{} Persona rebuilt", "✓".green());
                    println!();
                    print_snapshot(&snapshot);
                }
                None => println!("{} No long-term memory to build from", "⚠".yellow()),
            }
            Ok(())
        }

        PersonaAction::History => {
            let entries = snapshots.long_term_entries(ctx)?;
            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("{} No long-term memory yet", "⚠".yellow());
                return Ok(());
            }
            for entry in &entries {
                println!(
                    "{} {} posts, avg {:.2}, peak {:.2}, {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M").to_string().cyan(),
                    entry.post_count,
                    entry.avg_engagement,
                    entry.max_engagement,
                    entry.engagement_trend
                );
                if !entry.summary.period_summary.is_empty() {
                    println!("  {}", entry.summary.period_summary);
                }
            }
            Ok(())
        }
    }
}

fn print_snapshot(snapshot: &PersonaSnapshot) {
    println!("{}", "Persona".bold());
    println!("  Updated:          {}", snapshot.last_updated.format("%Y-%m-%d %H:%M"));
    println!("  Avg engagement:   {:.2}", snapshot.avg_engagement);
    println!("  Peak engagement:  {:.2}", snapshot.peak_engagement);
    println!("  High performers:  {:.0}%", snapshot.high_engagement_ratio * 100.0);
    println!();
    print_voice(&snapshot.voice);
}

fn print_voice(voice: &VoiceProfile) {
    println!("{}", "Voice".bold());
    if !voice.current_voice.is_empty() {
        println!("  {}", voice.current_voice);
    }
    print_list("Tones", &voice.primary_tones);
    print_list("Beliefs", &voice.core_beliefs);
    print_list("Structures", &voice.preferred_structures);
    print_list("Focus", &voice.content_focus_areas);
    print_list("Winning hooks", &voice.winning_hooks);
    print_list("Success patterns", &voice.success_patterns);
    println!(
        "  Maturity {:.2}, engagement mastery {:.2}",
        voice.voice_maturity_level, voice.engagement_mastery
    );
    if !voice.evolution_direction.is_empty() {
        println!("  Heading: {}", voice.evolution_direction.dimmed());
    }
}

fn print_list(label: &str, items: &[String]) {
    if !items.is_empty() {
        println!("  {}: {}", label, items.join(", "));
    }
}
