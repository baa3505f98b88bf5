//! Collection names in the vector store.

/// Shared reference posts by followed creators
pub const REFERENCE_POSTS: &str = "posts_collection";

/// Analyzed posts awaiting or past compression
pub const SHORT_TERM: &str = "user_short_term_memory";

/// Compressed period summaries
pub const LONG_TERM: &str = "user_long_term_memory";

/// One current voice record per user
pub const PERSONA_SNAPSHOTS: &str = "user_persona_snapshots";

/// Personal context items
pub const USER_CONTEXT: &str = "user_context_memory";

/// Company information items
pub const COMPANY_INFO: &str = "company_info_memory";

/// Achievement items
pub const ACHIEVEMENTS: &str = "user_achievements_memory";
