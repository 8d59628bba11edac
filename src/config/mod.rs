mod plans;
mod server;

pub use plans::{load_plan_table, parse_plan_table};
pub use server::{
    DB_FILE_NAME, DEFAULT_GITHUB_API_URL, DEFAULT_GITLAB_API_URL, DEFAULT_PROVIDER_TIMEOUT_SECS, ProviderConfig,
    ServerConfig,
};
