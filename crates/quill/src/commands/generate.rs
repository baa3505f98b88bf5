//! Post generation command.

use anyhow::{Context, Result};
use colored::Colorize;
use quill_sdk::{GeneratedPost, GenerationRequest, UserProfile};
use std::path::Path;

use super::print_json;
use crate::cli::GenerateArgs;
use crate::config::Config;
use crate::engine;
use crate::error::QuillError;

/// Execute generate command.
pub async fn execute(args: GenerateArgs, config: &Config, user: Option<&str>, json: bool) -> Result<()> {
    let engine = engine::open(config, user)?;
    let sdk = &engine.sdk;

    let profile = match &args.profile {
        Some(path) => load_profile(path)?,
        None => config.profile.clone(),
    };

    let creators = reference_creators(&args.creators, &profile);
    let top_k = args.top_k.unwrap_or(sdk.config().generation.reference_top_k);
    let references = sdk
        .references()
        .similar(&args.query, &creators, top_k)
        .await
        .context("Reference search failed")?;

    let request = GenerationRequest::new(args.query, profile).with_reference_posts(references);
    let post = sdk
        .content()
        .generate(&engine.ctx, request)
        .await
        .context("Generation failed")?;

    if json {
        return print_json(&post);
    }
    print_post(&post);
    Ok(())
}

/// Creators named on the command line, or the profile's reference creators
fn reference_creators(requested: &[String], profile: &UserProfile) -> Vec<String> {
    if !requested.is_empty() {
        return requested.to_vec();
    }
    profile
        .reference_creators
        .iter()
        .map(|c| c.name.clone())
        .collect()
}

/// Load a user profile from a `.toml` file, or JSON otherwise
fn load_profile(path: &Path) -> Result<UserProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let profile = if is_toml {
        toml::from_str(&content).map_err(|e| QuillError::invalid_input(path, e))?
    } else {
        serde_json::from_str(&content).map_err(|e| QuillError::invalid_input(path, e))?
    };
    Ok(profile)
}

fn print_post(post: &GeneratedPost) {
    println!("{}", post.text);
    println!();
    match &post.recorded {
        Some(recorded) => println!(
            "{} Saved to memory as {} (context items used: {})",
            "✓".green(),
            recorded.entry_id.cyan(),
            post.context_items_used
        ),
        None => println!("{} Post was not saved to memory", "⚠".yellow()),
    }
    if post.persona.is_none() {
        println!(
            "{} No persona yet; record more posts to personalize generation",
            "⚠".yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_profile_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(
            &path,
            r#"
name = "Alice"
role = "Engineer"
preferred_tone = ["candid"]

[[reference_creators]]
name = "Ada"
tone = ["playful"]
"#,
        )
        .unwrap();

        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.preferred_tone, vec!["candid"]);
        assert_eq!(profile.reference_creators[0].name, "Ada");
        assert!(profile.linkedin_goal.is_empty());
    }

    #[test]
    fn test_load_profile_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, r#"{"name": "Bob", "creator_likes": "short hooks"}"#).unwrap();

        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.name, "Bob");
        assert_eq!(profile.creator_likes.as_deref(), Some("short hooks"));
    }

    #[test]
    fn test_reference_creators_fall_back_to_profile() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"name": "Bob", "reference_creators": [{"name": "Ada"}, {"name": "Grace"}]}"#,
        )
        .unwrap();

        assert_eq!(reference_creators(&[], &profile), vec!["Ada", "Grace"]);
        assert_eq!(
            reference_creators(&["Linus".to_string()], &profile),
            vec!["Linus"]
        );
        assert!(reference_creators(&[], &UserProfile::default()).is_empty());
    }

    #[test]
    fn test_load_profile_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_profile(&path).unwrap_err();
        assert!(err.downcast_ref::<QuillError>().is_some());
    }
}
