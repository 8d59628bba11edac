use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FileContent;
use crate::vcs::Provider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// The caller as seen by one request. Built fresh from the identity
/// provider every time; never cached across requests.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub display_name: String,
    /// `None` means no active subscription.
    pub plan_id: Option<String>,
    pub access_tokens: HashMap<Provider, String>,
}

impl UserIdentity {
    #[must_use]
    pub fn from_user(user: User, access_tokens: HashMap<Provider, String>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            plan_id: user.plan_id,
            access_tokens,
        }
    }

    #[must_use]
    pub fn access_token(&self, provider: Provider) -> Option<&str> {
        self.access_tokens.get(&provider).map(String::as_str)
    }

    #[must_use]
    pub fn has_plan(&self) -> bool {
        self.plan_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub owner_user_id: String,
    pub name: String,
    pub summary: String,
    pub referenced_repos: Vec<String>,
    pub packages: Vec<String>,
    pub file_refs: Vec<String>,
    pub goal: String,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: String,
    pub project_id: String,
    pub owner_user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub content: FileContent,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

/// Refreshed activity timestamp that never moves backwards.
#[must_use]
pub fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous)
}
