mod session;
mod strava;
mod token;

pub use session::ChatSession;
pub use strava::{
    Activity, AthleteProfile, AthleteRef, AthleteStats, AthleteZones, HeartRateZones, StatTotals,
    TokenGrant, ZoneRange,
};
pub use token::TokenSet;
