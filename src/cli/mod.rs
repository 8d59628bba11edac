mod commands;
mod init;
mod token;
mod user;

pub use commands::{AdminCommands, TokenCommands, UserCommands};
pub use init::run_init;
pub use token::run_token_create;
pub use user::{run_user_add, run_user_link_token, run_user_set_plan};

use crate::store::SqliteStore;

/// Initialize store from data directory, checking it exists
pub fn init_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let data_path: std::path::PathBuf = data_dir.into();
    let db_path = data_path.join(crate::config::DB_FILE_NAME);

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'recombinant admin init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}

fn print_token_once(raw_token: &str) {
    println!();
    println!("========================================");
    println!("API token (save this, it won't be shown again):");
    println!();
    println!("  {raw_token}");
    println!();
    println!("========================================");
    println!();
}
