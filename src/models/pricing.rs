use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Tariff parameters applied to every quote. All amounts are euros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub base_fare: f64,
    pub price_per_km: f64,
    pub extra_luggage_fee: f64,
    pub large_group_surcharge: f64,
    pub accessible_vehicle_fee: f64,
    pub child_seat_fee: f64,
    pub night_surcharge: f64,
    pub minimum_fare: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            base_fare: 2.50,
            price_per_km: 1.00,
            extra_luggage_fee: 10.00,
            large_group_surcharge: 5.00,
            accessible_vehicle_fee: 2.00,
            child_seat_fee: 3.00,
            night_surcharge: 10.00,
            minimum_fare: 5.00,
        }
    }
}

impl PricingConfig {
    /// Fields in wire order, used for validation so the first offending
    /// field is always reported deterministically.
    pub fn fields(&self) -> [(&'static str, f64); 8] {
        [
            ("baseFare", self.base_fare),
            ("pricePerKm", self.price_per_km),
            ("extraLuggageFee", self.extra_luggage_fee),
            ("largeGroupSurcharge", self.large_group_surcharge),
            ("accessibleVehicleFee", self.accessible_vehicle_fee),
            ("childSeatFee", self.child_seat_fee),
            ("nightSurcharge", self.night_surcharge),
            ("minimumFare", self.minimum_fare),
        ]
    }

    /// Every tariff field must be a non-negative finite number. Returns the
    /// name of the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in self.fields() {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number", name));
            }
        }
        Ok(())
    }
}

/// One entry of the append-only tariff log. Writes always insert a new
/// version; the current config is the most recently created one.
#[derive(Debug, Serialize, Deserialize)]
pub struct PricingConfigVersion {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub config: PricingConfig,
    pub created_at: DateTime,
}

impl PricingConfigVersion {
    pub fn new(config: PricingConfig) -> Self {
        PricingConfigVersion {
            id: None,
            config,
            created_at: DateTime::now(),
        }
    }
}
