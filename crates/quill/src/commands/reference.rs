//! Reference post library commands.

use anyhow::{Context, Result};
use colored::Colorize;
use quill_sdk::types::ReferencePost;
use std::path::Path;

use super::print_json;
use crate::cli::{ReferenceAction, ReferenceCommand};
use crate::config::Config;
use crate::engine;
use crate::error::QuillError;

/// Execute reference command.
pub async fn execute(cmd: ReferenceCommand, config: &Config, user: Option<&str>, json: bool) -> Result<()> {
    let engine = engine::open(config, user)?;
    let library = engine.sdk.references();

    match cmd.action {
        ReferenceAction::Add { creator, text, category } => {
            let post = ReferencePost {
                id: String::new(),
                profile_name: creator,
                category,
                post_text: text,
                scraped_at: None,
            };
            let id = library.add(post).await.context("Failed to add reference post")?;
            if json {
                return print_json(&serde_json::json!({ "id": id }));
            }
            println!("{} Added reference post {}", "✓".green(), id.cyan());
            Ok(())
        }

        ReferenceAction::Import { file } => {
            let posts = read_posts(&file)?;
            let ids = library
                .add_many(posts)
                .await
                .context("Failed to import reference posts")?;
            if json {
                return print_json(&serde_json::json!({ "imported": ids.len(), "ids": ids }));
            }
            println!("{} Imported {} reference posts", "✓".green(), ids.len());
            Ok(())
        }

        ReferenceAction::Search { query, creators, top_k } => {
            let found = library
                .similar(&query, &creators, top_k)
                .await
                .context("Reference search failed")?;
            if json {
                return print_json(&found);
            }
            if found.is_empty() {
                println!("{} No posts by {}", "⚠".yellow(), creators.join(", "));
                return Ok(());
            }
            for (i, hit) in found.iter().enumerate() {
                println!(
                    "{}. {} ({:.2})",
                    i + 1,
                    hit.post.profile_name.cyan(),
                    hit.similarity_score
                );
                println!("   {}", quill_sdk::utils::truncate_chars(&hit.post.post_text, 120));
            }
            Ok(())
        }

        ReferenceAction::Creators => {
            let creators = library.creators()?;
            if json {
                return print_json(&creators);
            }
            if creators.is_empty() {
                println!("{} Library is empty", "⚠".yellow());
                return Ok(());
            }
            println!("{} ({} posts)", "Creators".bold(), library.count()?);
            for name in &creators {
                println!("  - {}", name);
            }
            Ok(())
        }
    }
}

/// Read a JSON array of reference posts
fn read_posts(path: &Path) -> Result<Vec<ReferencePost>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| QuillError::invalid_input(path, e).into())
}
