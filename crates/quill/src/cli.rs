//! CLI argument definitions using clap derive macros.
//!
//! Command structure for the persona evolution engine.

use clap::{Args, Parser, Subcommand};
use quill_sdk::types::{AchievementType, ContextType, EngagementCounts, InfoType};
use std::path::PathBuf;

/// Quill - persona-aware LinkedIn content
///
/// Records your posts, evolves your writing persona from their engagement,
/// and generates new posts in your evolved voice.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// User whose memory is read and written
    #[arg(short, long, global = true, env = "QUILL_USER_ID")]
    pub user: Option<String>,

    /// Print machine-readable JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Short-term memory (record, engagement, compress, insights)
    Post(PostCommand),

    /// Evolved persona snapshot (show, rebuild)
    Persona(PersonaCommand),

    /// Personal, company and achievement context
    Context(ContextCommand),

    /// Reference posts by creators you follow
    Reference(ReferenceCommand),

    /// Generate a post in your evolved voice
    Generate(GenerateArgs),

    /// Show version information
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Post Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct PostCommand {
    #[command(subcommand)]
    pub action: PostAction,
}

/// Real interaction counts of a post
#[derive(Args, Debug, Default, Clone)]
pub struct EngagementArgs {
    #[arg(long)]
    pub likes: Option<u64>,

    #[arg(long)]
    pub comments: Option<u64>,

    #[arg(long)]
    pub shares: Option<u64>,

    #[arg(long)]
    pub views: Option<u64>,
}

impl EngagementArgs {
    /// Counts if any were given; missing counts are zero
    pub fn counts(&self) -> Option<EngagementCounts> {
        if self.likes.is_none() && self.comments.is_none() && self.shares.is_none() && self.views.is_none() {
            return None;
        }
        Some(EngagementCounts::new(
            self.likes.unwrap_or(0),
            self.comments.unwrap_or(0),
            self.shares.unwrap_or(0),
            self.views.unwrap_or(0),
        ))
    }
}

#[derive(Subcommand, Debug)]
pub enum PostAction {
    /// Analyze a post and add it to short-term memory
    Record {
        /// Post text
        text: String,

        /// Topic of the post
        #[arg(short, long)]
        topic: String,

        /// Post type (story, tips, announcement, ...)
        #[arg(short = 'p', long, default_value = "Manual")]
        post_type: String,

        #[command(flatten)]
        engagement: EngagementArgs,
    },

    /// Re-score a recorded post once its engagement is known
    Engagement {
        /// Entry ID returned by `post record`
        id: String,

        #[command(flatten)]
        engagement: EngagementArgs,
    },

    /// Compress unprocessed posts into long-term memory if enough are waiting
    Compress,

    /// Engagement statistics over all recorded posts
    Insights,

    /// List recorded posts
    List {
        /// Maximum entries to show (newest first)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Persona Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct PersonaCommand {
    #[command(subcommand)]
    pub action: PersonaAction,
}

#[derive(Subcommand, Debug)]
pub enum PersonaAction {
    /// Show the current persona snapshot
    Show,

    /// Rebuild the snapshot from long-term memory
    Rebuild,

    /// List long-term memory entries
    History,
}

// ─────────────────────────────────────────────────────────────────────────────
// Context Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ContextCommand {
    #[command(subcommand)]
    pub action: ContextAction,
}

#[derive(Subcommand, Debug)]
pub enum ContextAction {
    /// Add personal or professional context
    AddPersonal {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        /// personal, professional, experience, background or values
        #[arg(short = 'k', long = "type", default_value = "personal")]
        context_type: ContextType,

        /// Tags for categorization
        #[arg(short = 'T', long = "tag", action = clap::ArgAction::Append)]
        tags: Vec<String>,

        /// Importance between 0 and 1
        #[arg(short, long, default_value = "0.5")]
        importance: f64,
    },

    /// Add information about your company
    AddCompany {
        /// Company name
        #[arg(short = 'n', long)]
        company: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        /// culture, values, news, achievements, products or industry
        #[arg(short = 'k', long = "type", default_value = "culture")]
        info_type: InfoType,

        /// Relevance between 0 and 1
        #[arg(short, long, default_value = "0.5")]
        relevance: f64,
    },

    /// Add an achievement or significant experience
    AddAchievement {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,

        /// project, award, milestone or learning
        #[arg(short = 'k', long = "type", default_value = "project")]
        achievement_type: AchievementType,

        #[arg(long, default_value = "")]
        impact: String,

        #[arg(long, default_value = "")]
        date: String,

        /// Skills used
        #[arg(short, long = "skill", action = clap::ArgAction::Append)]
        skills: Vec<String>,
    },

    /// Find context relevant to a query
    Search {
        query: String,

        /// Maximum results per store
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Show what is stored
    Summary,
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ReferenceCommand {
    #[command(subcommand)]
    pub action: ReferenceAction,
}

#[derive(Subcommand, Debug)]
pub enum ReferenceAction {
    /// Add one reference post
    Add {
        /// Creator name
        #[arg(short, long)]
        creator: String,

        /// Post text
        text: String,

        #[arg(long, default_value = "")]
        category: String,
    },

    /// Import reference posts from a JSON array
    Import {
        /// File with `[{"profile_name", "post_text", "category"?}, ...]`
        file: PathBuf,
    },

    /// Search reference posts by the given creators
    Search {
        query: String,

        /// Creators to search (repeatable)
        #[arg(short, long = "creator", action = clap::ArgAction::Append, required = true)]
        creators: Vec<String>,

        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,
    },

    /// List creators in the library
    Creators,
}

// ─────────────────────────────────────────────────────────────────────────────
// Generate
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// What the post should be about
    pub query: String,

    /// Creators whose posts are used as references (repeatable; defaults to the profile's creators)
    #[arg(short, long = "creator", action = clap::ArgAction::Append)]
    pub creators: Vec<String>,

    /// Reference posts to include
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// JSON or TOML file with the user profile (overrides the config file)
    #[arg(long)]
    pub profile: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_record_with_engagement() {
        let cli = Cli::try_parse_from([
            "quill", "--user", "alice", "post", "record", "Shipped it", "--topic", "Launch", "--likes", "40",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("alice"));
        match cli.command {
            Commands::Post(PostCommand {
                action: PostAction::Record { topic, engagement, post_type, .. },
            }) => {
                assert_eq!(topic, "Launch");
                assert_eq!(post_type, "Manual");
                assert_eq!(engagement.counts(), Some(EngagementCounts::new(40, 0, 0, 0)));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_context_type() {
        let cli = Cli::try_parse_from([
            "quill", "context", "add-personal", "--title", "T", "--content", "C", "--type", "Values",
        ])
        .unwrap();
        match cli.command {
            Commands::Context(ContextCommand {
                action: ContextAction::AddPersonal { context_type, .. },
            }) => assert_eq!(context_type, ContextType::Values),
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from([
            "quill", "context", "add-personal", "--title", "T", "--content", "C", "--type", "hobby",
        ])
        .is_err());
    }

    #[test]
    fn test_engagement_args_absent() {
        assert_eq!(EngagementArgs::default().counts(), None);
    }
}
