use serde::{Deserialize, Serialize};

/// Itemized fare for a single one-way trip, frozen onto quotes and
/// bookings at the moment it is computed.
///
/// `total` is `max(base_fare + distance_fare + surcharges, minimum_fare)`
/// rounded half-up to the cent; the component fields are kept unrounded so
/// the total can always be reproduced from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareBreakdown {
    pub distance_km: f64,
    /// Informational only, never priced.
    pub duration_min: u32,
    pub base_fare: f64,
    pub distance_fare: f64,
    pub surcharges: f64,
    pub total: f64,
}
