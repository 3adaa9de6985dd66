use crate::types::{Activity, AthleteProfile, AthleteStats, AthleteZones};

pub fn format_activities(activities: &[Activity]) -> String {
    if activities.is_empty() {
        return "No activities found.".to_string();
    }

    let mut message = String::from("Your recent Strava activities:\n");
    for activity in activities.iter().take(10) {
        let distance_km = activity.distance / 1000.0;
        message.push_str(&format!("• {} - {:.2}km\n", activity.name, distance_km));
    }
    message
}

pub fn format_athlete(athlete: &AthleteProfile) -> String {
    let not_set = |value: &Option<String>| {
        value
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "Not set".to_string())
    };

    let weight = athlete
        .weight
        .map_or_else(|| "Not set".to_string(), |w| format!("{w}kg"));

    format!(
        "🏃 Your Strava Profile:\n\
        Name: {} {}\n\
        Username: {}\n\
        City: {}\n\
        Country: {}\n\
        Weight: {}",
        athlete.firstname.as_deref().unwrap_or(""),
        athlete.lastname.as_deref().unwrap_or(""),
        not_set(&athlete.username),
        not_set(&athlete.city),
        not_set(&athlete.country),
        weight,
    )
}

pub fn format_zones(zones: &AthleteZones) -> String {
    let Some(heart_rate) = &zones.heart_rate else {
        return "No heart rate zones found in your profile.".to_string();
    };

    let mut message = String::from("❤️ Your Heart Rate Zones:\n");
    for (i, zone) in heart_rate.zones.iter().enumerate() {
        let max = match zone.max {
            Some(max) if max > 0 => max.to_string(),
            _ => "max".to_string(),
        };
        message.push_str(&format!("Zone {}: {} - {} bpm\n", i + 1, zone.min, max));
    }
    message
}

pub fn format_stats(stats: &AthleteStats) -> String {
    format!(
        "📊 Your Strava Stats:\n\
        Total runs: {} ({:.2}km)\n\
        Total rides: {} ({:.2}km)",
        stats.all_run_totals.count,
        stats.all_run_totals.distance / 1000.0,
        stats.all_ride_totals.count,
        stats.all_ride_totals.distance / 1000.0,
    )
}
