//! Personal, company and achievement context commands.

use anyhow::{Context, Result};
use colored::Colorize;
use quill_sdk::{NewAchievement, NewCompanyInfo, NewPersonalContext, StoreSummary};

use super::print_json;
use crate::cli::{ContextAction, ContextCommand};
use crate::config::Config;
use crate::engine;

/// Execute context command.
pub async fn execute(cmd: ContextCommand, config: &Config, user: Option<&str>, json: bool) -> Result<()> {
    let engine = engine::open(config, user)?;
    let store = engine.sdk.context();
    let ctx = &engine.ctx;

    match cmd.action {
        ContextAction::AddPersonal {
            title,
            content,
            context_type,
            tags,
            importance,
        } => {
            let input = NewPersonalContext::new(context_type, title, content)
                .with_tags(tags)
                .with_importance(importance);
            let id = store
                .add_personal(ctx, input)
                .await
                .context("Failed to add personal context")?;
            print_added(&id, "personal context", json)
        }

        ContextAction::AddCompany {
            company,
            title,
            content,
            info_type,
            relevance,
        } => {
            let input = NewCompanyInfo::new(company, info_type, title, content).with_relevance(relevance);
            let id = store
                .add_company(ctx, input)
                .await
                .context("Failed to add company info")?;
            print_added(&id, "company info", json)
        }

        ContextAction::AddAchievement {
            title,
            description,
            achievement_type,
            impact,
            date,
            skills,
        } => {
            let input = NewAchievement::new(achievement_type, title, description)
                .with_impact(impact)
                .with_date(date)
                .with_skills(skills);
            let id = store
                .add_achievement(ctx, input)
                .await
                .context("Failed to add achievement")?;
            print_added(&id, "achievement", json)
        }

        ContextAction::Search { query, limit } => {
            let found = store
                .relevant_context(ctx, &query, limit)
                .await
                .context("Context search failed")?;
            if json {
                return print_json(&found);
            }
            if found.is_empty() {
                println!("{} No context stored yet", "⚠".yellow());
                return Ok(());
            }

            if !found.user_context.is_empty() {
                println!("{}", "Personal".bold());
                for item in &found.user_context {
                    println!("  {} [{}] {}", item.id.cyan(), item.context_type, item.title);
                    println!("    {}", quill_sdk::utils::truncate_chars(&item.content, 100));
                }
            }
            if !found.company_info.is_empty() {
                println!("{}", "Company".bold());
                for item in &found.company_info {
                    println!(
                        "  {} [{}] {}: {}",
                        item.id.cyan(),
                        item.info_type,
                        item.company_name,
                        item.title
                    );
                }
            }
            if !found.achievements.is_empty() {
                println!("{}", "Achievements".bold());
                for item in &found.achievements {
                    println!("  {} [{}] {}", item.id.cyan(), item.achievement_type, item.title);
                    if !item.impact.is_empty() {
                        println!("    Impact: {}", item.impact);
                    }
                }
            }
            Ok(())
        }

        ContextAction::Summary => {
            let summary = store.summary(ctx)?;
            if json {
                return print_json(&summary);
            }
            print_store("Personal context", &summary.personal);
            print_store("Company info", &summary.company);
            print_store("Achievements", &summary.achievements);
            Ok(())
        }
    }
}

fn print_added(id: &str, what: &str, json: bool) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({ "id": id }));
    }
    println!("{} Added {} {}", "✓".green(), what, id.cyan());
    Ok(())
}

fn print_store(label: &str, summary: &StoreSummary) {
    println!("{} ({})", label.bold(), summary.count);
    for title in &summary.recent_titles {
        println!("  - {}", title);
    }
}
