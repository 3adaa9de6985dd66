mod strava;

pub use strava::{StravaApi, StravaConfig, SCOPE};
