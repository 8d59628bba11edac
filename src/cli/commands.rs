use clap::Subcommand;

use crate::vcs::Provider;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Initialize the data directory and database
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a new user, optionally with an API token
    Add {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Email address, unique per user
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Plan identifier (omit for no plan)
        #[arg(long)]
        plan: Option<String>,

        /// Also create an API token for the user
        #[arg(long)]
        create_token: bool,
    },

    /// Set or clear a user's plan
    SetPlan {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// User ID
        #[arg(long)]
        user_id: String,

        /// Plan identifier (omit to clear)
        #[arg(long)]
        plan: Option<String>,
    },

    /// Link a GitHub or GitLab access token to a user
    LinkToken {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// User ID
        #[arg(long)]
        user_id: String,

        /// Provider the token belongs to (github or gitlab)
        #[arg(long)]
        provider: Provider,

        /// The provider access token
        #[arg(long)]
        token: String,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Create an API token for a user
    Create {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// User ID
        #[arg(long)]
        user_id: String,

        /// Days until the token expires (omit for no expiry)
        #[arg(long)]
        expires_days: Option<i64>,
    },
}
