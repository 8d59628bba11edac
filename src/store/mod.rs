mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use std::collections::HashMap;

use crate::error::Result;
use crate::types::*;
use crate::vcs::Provider;

/// Outcome of a capped file insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAdmission {
    Inserted,
    LimitReached,
    /// The parent project is gone or belongs to another user.
    ParentMissing,
}

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn set_user_plan(&self, id: &str, plan_id: Option<&str>) -> Result<()>;

    // Provider access tokens
    fn set_access_token(&self, user_id: &str, provider: Provider, token: &str) -> Result<()>;
    fn list_access_tokens(&self, user_id: &str) -> Result<HashMap<Provider, String>>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    // Project operations. `create_project_capped` counts and inserts in one
    // statement and returns false when the owner already has `max_projects`.
    fn create_project_capped(&self, project: &Project, max_projects: u32) -> Result<bool>;
    fn get_project(&self, project_id: &str) -> Result<Option<Project>>;
    fn list_user_projects(&self, user_id: &str) -> Result<Vec<Project>>;
    fn count_user_projects(&self, user_id: &str) -> Result<u32>;
    fn update_project(&self, project: &Project) -> Result<()>;
    /// Deletes the project and every file under it.
    fn delete_project(&self, project_id: &str) -> Result<bool>;

    // File operations, capped per project like projects are per user. The
    // insert also requires the parent project to exist under the same owner.
    fn create_file_capped(&self, file: &FileRecord, max_files: u32) -> Result<FileAdmission>;
    fn get_file(&self, file_id: &str) -> Result<Option<FileRecord>>;
    fn list_user_files(&self, user_id: &str) -> Result<Vec<FileRecord>>;
    fn list_project_files(&self, project_id: &str) -> Result<Vec<FileRecord>>;
    fn count_project_files(&self, project_id: &str) -> Result<u32>;
    fn update_file(&self, file: &FileRecord) -> Result<()>;
    fn delete_file(&self, file_id: &str) -> Result<bool>;

    // Diagnostic message log
    fn append_message(&self, user_id: &str, message: &str) -> Result<()>;
    fn list_messages(&self, user_id: &str) -> Result<MessageLog>;

    fn close(&self) -> Result<()>;
}
