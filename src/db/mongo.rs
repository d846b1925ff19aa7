use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client,
};
use std::sync::Arc;
use std::time::Duration;

/// All collections (Bookings, PricingConfig, Quotes, DistanceCache) live
/// in this single database.
pub const DB_NAME: &str = "TaxiBooking";

pub async fn create_mongo_client(uri: &str) -> Arc<Client> {
    let mut client_options = ClientOptions::parse(uri)
        .await
        .expect("MONGODB_URI may be incorrect! Failed to parse.");

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client =
        Client::with_options(client_options).expect("Failed to create MongoDB client with options");

    // Verify connectivity up front so a bad URI fails loudly at startup.
    match client
        .database(DB_NAME)
        .run_command(bson::doc! { "ping": 1 })
        .await
    {
        Ok(_) => log::info!("Connected to MongoDB and verified with ping"),
        Err(e) => {
            log::warn!("Connected to MongoDB but ping failed: {}", e);
            log::warn!("The API may still work, but some functionality might be impaired");
        }
    }

    Arc::new(client)
}
