//! Append-only tariff store.
//!
//! Every write inserts a new `PricingConfigVersion`; the current tariff is
//! the most recently created version, falling back to the compiled-in
//! defaults when nothing has ever been stored. Old versions are never
//! mutated or deleted, so the log doubles as an audit trail.

use bson::doc;
use mongodb::{Client, Collection};

use crate::db::mongo::DB_NAME;
use crate::models::pricing::{PricingConfig, PricingConfigVersion};

pub const COLLECTION: &str = "PricingConfig";

fn collection(client: &Client) -> Collection<PricingConfigVersion> {
    client.database(DB_NAME).collection(COLLECTION)
}

/// The tariff in effect right now. Readable without credentials.
pub async fn current_config(client: &Client) -> mongodb::error::Result<PricingConfig> {
    let latest = collection(client)
        .find_one(doc! {})
        .sort(doc! { "created_at": -1 })
        .await?;

    Ok(latest
        .map(|version| version.config)
        .unwrap_or_else(PricingConfig::default))
}

/// Same as `current_config`, with the version metadata attached. Returns
/// `None` when only the defaults exist.
pub async fn current_version(
    client: &Client,
) -> mongodb::error::Result<Option<PricingConfigVersion>> {
    collection(client)
        .find_one(doc! {})
        .sort(doc! { "created_at": -1 })
        .await
}

/// Validates and appends a new tariff version. The write is a full
/// replacement of the field set; partial updates do not exist.
pub async fn save_config(client: &Client, config: PricingConfig) -> Result<(), SaveConfigError> {
    config.validate().map_err(SaveConfigError::Validation)?;

    let version = PricingConfigVersion::new(config);
    collection(client)
        .insert_one(&version)
        .await
        .map_err(SaveConfigError::Database)?;

    log::info!("Stored new pricing configuration version");
    Ok(())
}

#[derive(Debug)]
pub enum SaveConfigError {
    /// Message names the first offending field.
    Validation(String),
    Database(mongodb::error::Error),
}
