//! Context Memory
//!
//! Append-only logs of facts the user wants woven into generated posts:
//! personal context, company information and achievements. Each log is
//! searched by similarity and scoped to the requesting user.

mod store;
mod types;

pub use store::ContextStore;
pub use types::{
    ContextKind, ContextSummary, NewAchievement, NewCompanyInfo, NewPersonalContext,
    RelevantContext, StoreSummary,
};
