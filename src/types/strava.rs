use serde::Deserialize;

/// Payload of a successful `POST /oauth/token`, for both grant types.
/// Strava includes the athlete summary on the initial code exchange only.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    #[serde(default)]
    pub athlete: Option<AthleteRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AthleteRef {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Activity {
    pub name: String,
    /// Meters.
    #[serde(default)]
    pub distance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AthleteProfile {
    pub id: u64,
    pub username: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AthleteZones {
    pub heart_rate: Option<HeartRateZones>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeartRateZones {
    pub zones: Vec<ZoneRange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneRange {
    pub min: i32,
    /// `-1` (or absent) marks the open-ended top zone.
    pub max: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AthleteStats {
    #[serde(default)]
    pub all_run_totals: StatTotals,
    #[serde(default)]
    pub all_ride_totals: StatTotals,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatTotals {
    pub count: u32,
    /// Meters.
    pub distance: f64,
}
