use chrono::Utc;
use uuid::Uuid;

use crate::store::Store;
use crate::types::User;
use crate::vcs::Provider;

use super::token::issue_token;
use super::{init_store, print_token_once};

pub fn run_user_add(
    data_dir: String,
    email: String,
    name: String,
    plan: Option<String>,
    create_token: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let email = email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        anyhow::bail!("'{}' is not a valid email address", email);
    }
    if store.get_user_by_email(&email)?.is_some() {
        anyhow::bail!("A user with email '{}' already exists", email);
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        display_name: name,
        plan_id: plan,
        created_at: now,
        updated_at: now,
    };
    store.create_user(&user)?;

    println!("Created user {} ({})", user.id, user.email);

    if create_token {
        let raw_token = issue_token(&store, &user.id, None)?;
        print_token_once(&raw_token);
    }

    Ok(())
}

pub fn run_user_set_plan(
    data_dir: String,
    user_id: String,
    plan: Option<String>,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    store.set_user_plan(&user_id, plan.as_deref())?;

    match plan {
        Some(plan) => println!("User {user_id} is now on plan '{plan}'"),
        None => println!("Cleared plan for user {user_id}"),
    }
    Ok(())
}

pub fn run_user_link_token(
    data_dir: String,
    user_id: String,
    provider: Provider,
    token: String,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    if store.get_user(&user_id)?.is_none() {
        anyhow::bail!("User '{}' not found", user_id);
    }
    store.set_access_token(&user_id, provider, token.trim())?;

    println!("Linked {provider} token to user {user_id}");
    Ok(())
}
