use crate::domain::place::PlaceRecord;
use crate::domain::report::{CompetitorAnalysis, Level, MarketLeader};
use crate::metrics::{businesses_per_km2, density_score, round1, NEUTRAL_RATING, RATING_SCALE};

/// Competitor counts up to this are low density.
pub const LOW_DENSITY_MAX: usize = 3;
/// Competitor counts up to this (and above `LOW_DENSITY_MAX`) are medium density.
pub const MEDIUM_DENSITY_MAX: usize = 8;

// Count saturates the competition score at this many competitors.
const COMPETITION_COUNT_CAP: f64 = 10.0;

pub const MAX_LEADERS: usize = 3;
pub const MAX_WEAK_COMPETITORS: usize = 3;
/// Below 3.5 stars.
pub const WEAK_RATING_BELOW: f64 = 7.0;

pub fn density_level(count: usize) -> Level {
    if count <= LOW_DENSITY_MAX {
        Level::Low
    } else if count <= MEDIUM_DENSITY_MAX {
        Level::Medium
    } else {
        Level::High
    }
}

/// Weighted blend of how many competitors there are (60%) and how well rated they are (40%).
pub fn competition_score(count: usize, average_rating: Option<f64>) -> f64 {
    let count_factor = (count as f64 / COMPETITION_COUNT_CAP).min(1.0);
    let rating_factor = average_rating.unwrap_or(NEUTRAL_RATING).clamp(0.0, RATING_SCALE) / RATING_SCALE;
    count_factor * 0.6 + rating_factor * 0.4
}

pub fn competition_level(count: usize, average_rating: Option<f64>) -> Level {
    let score = competition_score(count, average_rating);
    if score < 0.3 {
        Level::Low
    } else if score < 0.7 {
        Level::Medium
    } else {
        Level::High
    }
}

/// Mean over places that report a positive rating.
pub fn average_rating(places: &[PlaceRecord]) -> Option<f64> {
    let ratings: Vec<f64> = places
        .iter()
        .filter_map(|p| p.rating)
        .filter(|r| *r > 0.0)
        .collect();
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

pub fn recommendations(density: Level, average_rating: Option<f64>) -> Vec<String> {
    let lines: [String; 3] = match density {
        Level::Low => [
            "Excellent location with low competition - a strong opportunity".to_string(),
            "Focus on building a recognizable local brand early".to_string(),
            "Limited competition leaves room for premium pricing".to_string(),
        ],
        Level::Medium => [
            "Balanced competition level - focus on differentiation".to_string(),
            match average_rating {
                Some(r) => format!("Aim to exceed the local average rating of {r:.1}/10"),
                None => "Aim to set the local standard for service quality".to_string(),
            },
            "Monitor competitor pricing and service offerings closely".to_string(),
        ],
        Level::High => [
            "High competition area - strong differentiation required".to_string(),
            "Lead with a unique value proposition and superior service".to_string(),
            "Consider a niche specialization to stand out".to_string(),
        ],
    };
    lines.into()
}

/// 60% star rating (0-5, unrated counts as 0) plus 40% proximity, where anything within 100 m
/// gets the full proximity bonus and it falls off as 100/distance beyond that.
pub fn leader_score(rating: Option<f64>, distance_m: u32) -> f64 {
    let stars = rating.unwrap_or(0.0).clamp(0.0, RATING_SCALE) / 2.0;
    let proximity = 1.0 / (f64::from(distance_m) / 100.0).max(1.0);
    let score = stars * 0.6 + proximity * 0.4;
    (score * 100.0).round() / 100.0
}

/// Top competitors by `leader_score`; ties keep search order.
pub fn market_leaders(competitors: &[PlaceRecord]) -> Vec<MarketLeader> {
    let mut leaders: Vec<MarketLeader> = competitors
        .iter()
        .map(|p| MarketLeader {
            name: p.name.clone(),
            rating: p.rating,
            distance_m: p.distance_m,
            score: leader_score(p.rating, p.distance_m),
        })
        .collect();
    leaders.sort_by(|a, b| b.score.total_cmp(&a.score));
    leaders.truncate(MAX_LEADERS);
    leaders
}

/// Unrated places are not counted as weak.
pub fn weak_competitors(competitors: &[PlaceRecord]) -> Vec<PlaceRecord> {
    competitors
        .iter()
        .filter(|p| p.rating.is_some_and(|r| r < WEAK_RATING_BELOW))
        .take(MAX_WEAK_COMPETITORS)
        .cloned()
        .collect()
}

pub fn analyze(competitors: &[PlaceRecord], radius_m: u32) -> CompetitorAnalysis {
    let count = competitors.len();
    let avg = average_rating(competitors);
    let density = density_level(count);
    let per_km2 = businesses_per_km2(count, radius_m);

    CompetitorAnalysis {
        market_density: density,
        competition_level: competition_level(count, avg),
        total_competitors: count,
        average_rating: avg.map(round1),
        businesses_per_km2: round1(per_km2),
        density_score: round1(density_score(per_km2)),
        recommendations: recommendations(density, avg),
        market_leaders: market_leaders(competitors),
        weak_competitors: weak_competitors(competitors),
    }
}
