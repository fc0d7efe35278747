use crate::domain::place::PlaceRecord;
use crate::domain::week::{day_name, WEEK};
use chrono::Weekday;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Three-step label used for density, competition and saturation. Ordered Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetitorAnalysis {
    pub market_density: Level,
    pub competition_level: Level,
    pub total_competitors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    pub businesses_per_km2: f64,
    pub density_score: f64,
    pub recommendations: Vec<String>,
    pub market_leaders: Vec<MarketLeader>,
    /// Nearby places rated below 3.5 stars, in search order.
    pub weak_competitors: Vec<PlaceRecord>,
}

/// A competitor ranked by rating with a bonus for being close to the search point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketLeader {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(rename = "distance")]
    pub distance_m: u32,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetitorReport {
    pub competitors: Vec<PlaceRecord>,
    pub analysis: CompetitorAnalysis,
}

/// Exactly one time-range string per calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [String; 7],
}

impl WeeklySchedule {
    pub fn new(days: [String; 7]) -> Self {
        Self { days }
    }

    pub fn get(&self, day: Weekday) -> &str {
        &self.days[day.num_days_from_monday() as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &str)> + '_ {
        WEEK.iter().map(move |day| (*day, self.get(*day)))
    }
}

impl Serialize for WeeklySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(WEEK.len()))?;
        for (day, hours) in self.iter() {
            map.serialize_entry(day_name(day), hours)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeakWindow {
    pub label: &'static str,
    pub window: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoursRecommendation {
    pub weekly_schedule: WeeklySchedule,
    pub insights: Vec<String>,
    pub peak_hours: Vec<PeakWindow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayHoursSummary {
    pub day: &'static str,
    pub avg_open: String,
    pub avg_close: String,
    pub earliest_open: String,
    pub latest_close: String,
    pub sample_size: usize,
}

/// What nearby places of the same category actually report as their hours.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HoursAnalysis {
    pub days: Vec<DayHoursSummary>,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoursReport {
    pub recommendation: HoursRecommendation,
    pub hours_analysis: HoursAnalysis,
    pub business_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_hours: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub category: String,
    pub score: f64,
    pub description: String,
    pub current_count: usize,
    pub market_gap: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketData {
    pub total_businesses: usize,
    pub market_score: f64,
    pub radius_m: u32,
    pub businesses_per_km2: f64,
    pub density_score: f64,
    pub diversity_score: f64,
    pub saturation_level: Level,
    pub categories: BTreeMap<String, usize>,
    pub market_health: MarketHealth,
    pub location_score: LocationScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum GapSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// A staple business type with fewer nearby places than a balanced neighbourhood would have.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketGap {
    pub business_type: &'static str,
    pub current_count: usize,
    pub expected_count: usize,
    pub gap_size: usize,
    pub severity: GapSeverity,
    pub opportunity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthIndicators {
    pub business_diversity: f64,
    pub service_quality: f64,
    pub market_activity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketHealth {
    pub health_score: f64,
    /// Absent when the scan found nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<HealthIndicators>,
    pub assessment: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationFactors {
    pub business_density: f64,
    pub business_diversity: f64,
    pub area_quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationScore {
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factors: Option<LocationFactors>,
    pub recommendation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketScanReport {
    pub market_data: MarketData,
    pub opportunities: Vec<Opportunity>,
    pub market_gaps: Vec<MarketGap>,
}
