//! Context store inputs and views.

use quill_core::types::{
    Achievement, AchievementType, CompanyInfo, ContextType, InfoType, PersonalContext,
};
use serde::{Deserialize, Serialize};

fn default_weight() -> f64 {
    0.5
}

/// Input for [`ContextStore::add_personal`](super::ContextStore::add_personal)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPersonalContext {
    #[serde(default)]
    pub context_type: ContextType,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 0.0 to 1.0
    #[serde(default = "default_weight")]
    pub importance: f64,
}

impl NewPersonalContext {
    pub fn new(context_type: ContextType, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            context_type,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            importance: default_weight(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }
}

/// Input for [`ContextStore::add_company`](super::ContextStore::add_company)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompanyInfo {
    pub company_name: String,
    #[serde(default)]
    pub info_type: InfoType,
    pub title: String,
    pub content: String,
    /// 0.0 to 1.0
    #[serde(default = "default_weight")]
    pub relevance: f64,
}

impl NewCompanyInfo {
    pub fn new(
        company_name: impl Into<String>,
        info_type: InfoType,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            info_type,
            title: title.into(),
            content: content.into(),
            relevance: default_weight(),
        }
    }

    pub fn with_relevance(mut self, relevance: f64) -> Self {
        self.relevance = relevance;
        self
    }
}

/// Input for [`ContextStore::add_achievement`](super::ContextStore::add_achievement)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAchievement {
    #[serde(default)]
    pub achievement_type: AchievementType,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub skills_used: Vec<String>,
}

impl NewAchievement {
    pub fn new(
        achievement_type: AchievementType,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            achievement_type,
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_impact(mut self, impact: impl Into<String>) -> Self {
        self.impact = impact.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills_used = skills;
        self
    }
}

/// Which context log an item lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Personal,
    Company,
    Achievement,
}

impl ContextKind {
    pub fn collection(&self) -> &'static str {
        use crate::memory::collections::{ACHIEVEMENTS, COMPANY_INFO, USER_CONTEXT};
        match self {
            ContextKind::Personal => USER_CONTEXT,
            ContextKind::Company => COMPANY_INFO,
            ContextKind::Achievement => ACHIEVEMENTS,
        }
    }
}

/// Context items relevant to a query, closest first per store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevantContext {
    pub user_context: Vec<PersonalContext>,
    pub company_info: Vec<CompanyInfo>,
    pub achievements: Vec<Achievement>,
}

impl RelevantContext {
    pub fn is_empty(&self) -> bool {
        self.user_context.is_empty() && self.company_info.is_empty() && self.achievements.is_empty()
    }

    /// Every item as `(kind, id)`
    pub fn item_refs(&self) -> Vec<(ContextKind, String)> {
        let personal = self
            .user_context
            .iter()
            .map(|c| (ContextKind::Personal, c.id.clone()));
        let company = self
            .company_info
            .iter()
            .map(|c| (ContextKind::Company, c.id.clone()));
        let achievements = self
            .achievements
            .iter()
            .map(|a| (ContextKind::Achievement, a.id.clone()));
        personal.chain(company).chain(achievements).collect()
    }
}

/// Size and latest titles of one context log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub count: usize,
    pub recent_titles: Vec<String>,
}

/// Overview of everything a user has stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub personal: StoreSummary,
    pub company: StoreSummary,
    pub achievements: StoreSummary,
}
