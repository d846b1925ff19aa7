//! Distance provider backed by the Google Distance Matrix API.
//!
//! Results are cached in MongoDB so repeated quotes for the same route do
//! not burn API calls. The provider is treated as fallible: any failure
//! (missing key, timeout, bad response) degrades to a fixed estimate so a
//! quote can still be produced, marked as estimated.

use std::sync::Arc;
use std::time::Duration;

use bson::{doc, oid::ObjectId, DateTime};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use crate::db::mongo::DB_NAME;
use crate::models::booking::Coordinates;

pub const COLLECTION: &str = "DistanceCache";

/// Estimate used when no coordinates are given or the provider is down.
pub const FALLBACK_DISTANCE_KM: f64 = 5.0;
pub const FALLBACK_DURATION_MIN: u32 = 15;

const CACHE_TTL_SECONDS: i64 = 86_400;
const REQUEST_TIMEOUT_SECONDS: u64 = 10;
// Roughly 10 meters; close-enough coordinates share a cache entry.
const COORD_TOLERANCE: f64 = 0.0001;

#[derive(Debug, Clone, Copy)]
pub struct DistanceEstimate {
    pub distance_km: f64,
    pub duration_min: u32,
    /// True when this is the fixed fallback rather than a provider result.
    pub estimated: bool,
}

impl DistanceEstimate {
    fn fallback() -> Self {
        DistanceEstimate {
            distance_km: FALLBACK_DISTANCE_KM,
            duration_min: FALLBACK_DURATION_MIN,
            estimated: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedRoute {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    origin_lat: f64,
    origin_lng: f64,
    destination_lat: f64,
    destination_lng: f64,
    distance_meters: u32,
    duration_seconds: u32,
    cached_at: DateTime,
    expires_at: DateTime,
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
    duration: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: u32,
}

pub struct DistanceService {
    client: Arc<Client>,
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl DistanceService {
    /// Builds the service. A missing `GOOGLE_MAPS_API_KEY` is not fatal;
    /// every lookup then falls back to the fixed estimate.
    pub fn new(client: Arc<Client>) -> Self {
        let api_key = std::env::var("GOOGLE_MAPS_API_KEY").ok();
        if api_key.is_none() {
            log::warn!("GOOGLE_MAPS_API_KEY not set; all quotes will use the fallback estimate");
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_default();

        DistanceService {
            client,
            http_client,
            api_key,
        }
    }

    /// Distance and duration for a route, or the fallback estimate when
    /// coordinates are missing or the provider fails.
    pub async fn distance_or_fallback(
        &self,
        pickup: Option<Coordinates>,
        destination: Option<Coordinates>,
    ) -> DistanceEstimate {
        let (origin, destination) = match (pickup, destination) {
            (Some(a), Some(b)) => (a, b),
            _ => return DistanceEstimate::fallback(),
        };

        if self.api_key.is_none() {
            return DistanceEstimate::fallback();
        }

        if let Ok(Some(cached)) = self.cached_route(origin, destination).await {
            return DistanceEstimate {
                distance_km: round_km(cached.distance_meters),
                duration_min: cached.duration_seconds / 60,
                estimated: false,
            };
        }

        match self.fetch_route(origin, destination).await {
            Ok((distance_meters, duration_seconds)) => {
                if let Err(e) = self
                    .cache_route(origin, destination, distance_meters, duration_seconds)
                    .await
                {
                    log::warn!("Failed to cache distance result: {}", e);
                }
                DistanceEstimate {
                    distance_km: round_km(distance_meters),
                    duration_min: duration_seconds / 60,
                    estimated: false,
                }
            }
            Err(e) => {
                log::warn!("Distance provider unavailable, using fallback estimate: {}", e);
                DistanceEstimate::fallback()
            }
        }
    }

    fn collection(&self) -> Collection<CachedRoute> {
        self.client.database(DB_NAME).collection(COLLECTION)
    }

    async fn cached_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> mongodb::error::Result<Option<CachedRoute>> {
        let filter = doc! {
            "origin_lat": { "$gte": origin.lat - COORD_TOLERANCE, "$lte": origin.lat + COORD_TOLERANCE },
            "origin_lng": { "$gte": origin.lng - COORD_TOLERANCE, "$lte": origin.lng + COORD_TOLERANCE },
            "destination_lat": { "$gte": destination.lat - COORD_TOLERANCE, "$lte": destination.lat + COORD_TOLERANCE },
            "destination_lng": { "$gte": destination.lng - COORD_TOLERANCE, "$lte": destination.lng + COORD_TOLERANCE },
            "expires_at": { "$gt": DateTime::now() },
        };

        self.collection().find_one(filter).await
    }

    async fn cache_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        distance_meters: u32,
        duration_seconds: u32,
    ) -> mongodb::error::Result<()> {
        let now = DateTime::now();
        let cached = CachedRoute {
            id: None,
            origin_lat: origin.lat,
            origin_lng: origin.lng,
            destination_lat: destination.lat,
            destination_lng: destination.lng,
            distance_meters,
            duration_seconds,
            cached_at: now,
            expires_at: DateTime::from_millis(now.timestamp_millis() + CACHE_TTL_SECONDS * 1000),
        };

        self.collection().insert_one(cached).await?;
        Ok(())
    }

    async fn fetch_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<(u32, u32), String> {
        let api_key = self.api_key.as_deref().ok_or("No API key configured")?;
        let url = format!(
            "https://maps.googleapis.com/maps/api/distancematrix/json?origins={},{}&destinations={},{}&mode=driving&key={}",
            origin.lat, origin.lng, destination.lat, destination.lng, api_key
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let matrix: MatrixResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        if matrix.status != "OK" {
            return Err(format!("Distance Matrix API error: {}", matrix.status));
        }

        let element = matrix
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .ok_or("No route data in response")?;

        if element.status != "OK" {
            return Err(format!("No route between points: {}", element.status));
        }

        let distance = element.distance.as_ref().ok_or("Distance missing")?;
        let duration = element.duration.as_ref().ok_or("Duration missing")?;

        Ok((distance.value, duration.value))
    }

    /// Drops expired cache entries. Called opportunistically, not on the
    /// request path.
    pub async fn cleanup_expired_cache(&self) -> mongodb::error::Result<u64> {
        let result = self
            .collection()
            .delete_many(doc! { "expires_at": { "$lt": DateTime::now() } })
            .await?;
        Ok(result.deleted_count)
    }
}

fn round_km(meters: u32) -> f64 {
    (meters as f64 / 1000.0 * 100.0).round() / 100.0
}
