//! Content Generation
//!
//! Turns a query, the user's profile and selected reference posts into one
//! post written in the user's evolved voice. Every generated post is fed
//! back into short-term memory so the persona keeps evolving.

mod orchestrator;
pub mod prompt;
mod reference;
mod types;

pub use orchestrator::{ContentGenerator, GENERATED_POST_TYPE};
pub use prompt::{build_generation_prompt, PromptInputs};
pub use reference::ReferenceLibrary;
pub use types::{
    CreatorPreference, GeneratedPost, GenerationRequest, SelfExample, SimilarPost, UserProfile,
};
