use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::TokenGenerator;
use crate::error::Error;
use crate::store::Store;
use crate::types::Token;

use super::{init_store, print_token_once};

const MAX_COLLISION_RETRIES: usize = 3;

/// Mints a token for `user_id` and stores its hash. Returns the raw token.
pub(crate) fn issue_token(
    store: &impl Store,
    user_id: &str,
    expires_in: Option<Duration>,
) -> anyhow::Result<String> {
    let generator = TokenGenerator::new();

    for _ in 0..MAX_COLLISION_RETRIES {
        let generated = generator.generate()?;
        let now = Utc::now();
        let token = Token {
            id: Uuid::new_v4().to_string(),
            token_hash: generated.hash,
            token_lookup: generated.lookup,
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: expires_in.map(|d| now + d),
            last_used_at: None,
        };

        match store.create_token(&token) {
            Ok(()) => return Ok(generated.raw),
            Err(Error::TokenLookupCollision) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    anyhow::bail!("Could not generate a unique token; try again")
}

pub fn run_token_create(
    data_dir: String,
    user_id: String,
    expires_days: Option<i64>,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    if store.get_user(&user_id)?.is_none() {
        anyhow::bail!("User '{}' not found", user_id);
    }
    if let Some(days) = expires_days {
        if days <= 0 {
            anyhow::bail!("--expires-days must be positive");
        }
    }

    let raw_token = issue_token(&store, &user_id, expires_days.map(Duration::days))?;
    print_token_once(&raw_token);
    Ok(())
}
