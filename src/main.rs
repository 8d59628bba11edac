use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use recombinant::auth::StoreIdentityProvider;
use recombinant::cli::{
    AdminCommands, TokenCommands, UserCommands, run_init, run_token_create, run_user_add,
    run_user_link_token, run_user_set_plan,
};
use recombinant::config::{
    DEFAULT_GITHUB_API_URL, DEFAULT_GITLAB_API_URL, ProviderConfig, ServerConfig, load_plan_table,
};
use recombinant::server::{AppState, create_router};
use recombinant::store::{SqliteStore, Store};
use recombinant::vcs::VcsConnector;

#[derive(Parser)]
#[command(name = "recombinant")]
#[command(about = "Repository browsing and project notes backend for chat plugins", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8000")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// TOML file with plan limits. Built-in tiers are used when omitted.
        #[arg(long)]
        plans: Option<String>,

        /// GitHub REST API base URL
        #[arg(long, env = "RECOMBINANT_GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
        github_api_url: String,

        /// GitLab REST API base URL
        #[arg(long, env = "RECOMBINANT_GITLAB_API_URL", default_value = DEFAULT_GITLAB_API_URL)]
        gitlab_api_url: String,

        /// Timeout for each upstream provider request, in seconds
        #[arg(long, env = "RECOMBINANT_PROVIDER_TIMEOUT_SECS", default_value = "30")]
        provider_timeout_secs: u64,
    },
}

fn run_admin(command: AdminCommands) -> anyhow::Result<()> {
    match command {
        AdminCommands::Init { data_dir } => run_init(data_dir),
        AdminCommands::User { command } => match command {
            UserCommands::Add {
                data_dir,
                email,
                name,
                plan,
                create_token,
            } => run_user_add(data_dir, email, name, plan, create_token),
            UserCommands::SetPlan {
                data_dir,
                user_id,
                plan,
            } => run_user_set_plan(data_dir, user_id, plan),
            UserCommands::LinkToken {
                data_dir,
                user_id,
                provider,
                token,
            } => run_user_link_token(data_dir, user_id, provider, token),
        },
        AdminCommands::Token { command } => match command {
            TokenCommands::Create {
                data_dir,
                user_id,
                expires_days,
            } => run_token_create(data_dir, user_id, expires_days),
        },
    }
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        bail!(
            "Database not found at {}. Run 'recombinant admin init' first.",
            db_path.display()
        );
    }

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;
    let store: Arc<dyn Store> = Arc::new(store);

    let plans = load_plan_table(config.plans_path.as_deref())?;
    let vcs = VcsConnector::new(&config.providers)?;

    let state = Arc::new(AppState {
        identity: Arc::new(StoreIdentityProvider::new(store.clone())),
        store,
        vcs,
        plans,
    });

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("recombinant=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => run_admin(command)?,
        Commands::Serve {
            host,
            port,
            data_dir,
            plans,
            github_api_url,
            gitlab_api_url,
            provider_timeout_secs,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                plans_path: plans.map(Into::into),
                providers: ProviderConfig {
                    github_api_url,
                    gitlab_api_url,
                    timeout: Duration::from_secs(provider_timeout_secs),
                },
            };
            run_serve(config).await?;
        }
    }

    Ok(())
}
