//! Token command handler: store or clear the session token.

use anyhow::{Result, anyhow};
use librova_reader::{JsonFileStore, KeyValueStore, SESSION_TOKEN_KEY};
use tracing::info;

use crate::app_config::Settings;

pub fn run_token_command(settings: &Settings, token: Option<&str>, clear: bool) -> Result<()> {
    let store = JsonFileStore::new(&settings.store_path);

    if clear {
        let removed = store
            .remove(SESSION_TOKEN_KEY)
            .map_err(|error| anyhow!("Failed to clear session token: {error}"))?;
        if removed {
            info!(path = %store.path().display(), "Cleared session token");
        } else {
            info!("No session token stored");
        }
        return Ok(());
    }

    let token = token
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| anyhow!("Session token must not be blank"))?;
    store
        .set(SESSION_TOKEN_KEY, token)
        .map_err(|error| anyhow!("Failed to store session token: {error}"))?;
    info!(path = %store.path().display(), "Stored session token");

    Ok(())
}
