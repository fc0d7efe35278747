use crate::domain::place::PlaceRecord;
use crate::domain::report::{
    GapSeverity, HealthIndicators, Level, LocationFactors, LocationScore, MarketData, MarketGap,
    MarketHealth, MarketScanReport, Opportunity,
};
use crate::metrics::competitors::average_rating;
use crate::metrics::{businesses_per_km2, clamp_score, density_score, round1, NEUTRAL_RATING};
use std::collections::BTreeMap;

pub const MAX_OPPORTUNITIES: usize = 6;

// Density score bounds (0-10 scale) for the saturation label.
const LOW_SATURATION_BELOW: f64 = 3.0;
const MEDIUM_SATURATION_BELOW: f64 = 7.0;

/// A category the scanner expects a healthy neighbourhood to have at least `threshold` of.
#[derive(Debug, Clone, Copy)]
struct ReferenceCategory {
    name: &'static str,
    threshold: usize,
    multiplier: f64,
    keywords: &'static [&'static str],
    pitch: &'static str,
}

const REFERENCE: &[ReferenceCategory] = &[
    ReferenceCategory {
        name: "Specialty Coffee Shop",
        threshold: 2,
        multiplier: 1.2,
        keywords: &["coffee", "cafe", "espresso"],
        pitch: "Foot traffic from nearby offices and homes supports another coffee option.",
    },
    ReferenceCategory {
        name: "Fitness Studio",
        threshold: 3,
        multiplier: 1.1,
        keywords: &["fitness", "gym", "yoga", "pilates"],
        pitch: "Residents looking for convenient workouts have few places to go.",
    },
    ReferenceCategory {
        name: "Pet Services",
        threshold: 1,
        multiplier: 1.3,
        keywords: &["pet", "veterinar", "groom"],
        pitch: "Grooming and pet care are thinly covered.",
    },
    ReferenceCategory {
        name: "Coworking Space",
        threshold: 1,
        multiplier: 1.4,
        keywords: &["coworking", "shared office"],
        pitch: "Remote workers and freelancers need flexible workspace.",
    },
    ReferenceCategory {
        name: "Healthy Fast Food",
        threshold: 5,
        multiplier: 1.1,
        keywords: &["salad", "juice", "healthy", "vegan"],
        pitch: "Quick healthy dining is under-represented.",
    },
    ReferenceCategory {
        name: "Mobile Phone Repair",
        threshold: 2,
        multiplier: 1.0,
        keywords: &["phone", "mobile", "repair"],
        pitch: "Steady smartphone use keeps repair demand consistent.",
    },
    ReferenceCategory {
        name: "Tutoring Center",
        threshold: 2,
        multiplier: 1.0,
        keywords: &["tutor", "learning", "education"],
        pitch: "Families nearby have limited academic support options.",
    },
    ReferenceCategory {
        name: "Laundromat",
        threshold: 1,
        multiplier: 1.0,
        keywords: &["laundr", "dry clean"],
        pitch: "Apartment dwellers need convenient laundry.",
    },
];

impl ReferenceCategory {
    fn matches(&self, category: &str) -> bool {
        let lower = category.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(*k))
    }

    fn current_count(&self, categories: &BTreeMap<String, usize>) -> usize {
        categories
            .iter()
            .filter(|(name, _)| self.matches(name))
            .map(|(_, count)| count)
            .sum()
    }
}

pub fn category_counts(places: &[PlaceRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for place in places {
        *counts.entry(place.category.clone()).or_insert(0) += 1;
    }
    counts
}

pub fn diversity_score(distinct_categories: usize) -> f64 {
    clamp_score(distinct_categories as f64 / 2.0)
}

pub fn saturation_level(density_score: f64) -> Level {
    if density_score < LOW_SATURATION_BELOW {
        Level::Low
    } else if density_score < MEDIUM_SATURATION_BELOW {
        Level::Medium
    } else {
        Level::High
    }
}

pub fn market_score(density: f64, diversity: f64) -> f64 {
    round1(clamp_score(0.5 * density + 0.5 * diversity))
}

/// Gap to the reference threshold, plus a bonus for overall market size, scaled per category.
pub fn opportunity_score(current: usize, threshold: usize, total: usize, multiplier: f64) -> f64 {
    let gap = 2.0 * threshold.saturating_sub(current) as f64;
    let size = (total as f64 / 20.0).min(5.0);
    round1(clamp_score((gap + size) * multiplier))
}

fn describe(reference: &ReferenceCategory, current: usize) -> String {
    let existing = match current {
        0 => "No existing competitors found".to_string(),
        1 => "Only 1 existing competitor".to_string(),
        n => format!("Only {n} existing competitors"),
    };
    format!("{existing} for {}. {}", reference.name.to_lowercase(), reference.pitch)
}

pub fn opportunities(
    categories: &BTreeMap<String, usize>,
    total: usize,
    focus_industry: Option<&str>,
) -> Vec<Opportunity> {
    let focus = focus_industry
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty());

    let mut out: Vec<Opportunity> = REFERENCE
        .iter()
        .filter(|r| match &focus {
            Some(f) => r.name.to_lowercase().contains(f.as_str()),
            None => true,
        })
        .filter_map(|r| {
            let current = r.current_count(categories);
            if current > r.threshold {
                return None;
            }
            Some(Opportunity {
                category: r.name.to_string(),
                score: opportunity_score(current, r.threshold, total, r.multiplier),
                description: describe(r, current),
                current_count: current,
                market_gap: r.threshold - current,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.category.cmp(&b.category))
    });
    out.truncate(MAX_OPPORTUNITIES);
    out
}

/// Staple business types and how many of each a balanced neighbourhood has.
struct ExpectedBusiness {
    name: &'static str,
    expected: usize,
    keywords: &'static [&'static str],
}

const EXPECTED: &[ExpectedBusiness] = &[
    ExpectedBusiness {
        name: "Coffee Shop",
        expected: 3,
        keywords: &["coffee", "cafe"],
    },
    ExpectedBusiness {
        name: "Restaurant",
        expected: 8,
        keywords: &["restaurant", "dining", "food"],
    },
    ExpectedBusiness {
        name: "Convenience Store",
        expected: 2,
        keywords: &["convenience", "market", "corner"],
    },
    ExpectedBusiness {
        name: "Fitness Center",
        expected: 2,
        keywords: &["fitness", "gym", "health"],
    },
    ExpectedBusiness {
        name: "Beauty Salon",
        expected: 2,
        keywords: &["salon", "beauty", "spa"],
    },
    ExpectedBusiness {
        name: "Pharmacy",
        expected: 1,
        keywords: &["pharmacy", "drug", "cvs", "walgreens"],
    },
    ExpectedBusiness {
        name: "Bank/ATM",
        expected: 1,
        keywords: &["bank", "atm"],
    },
    ExpectedBusiness {
        name: "Gas Station",
        expected: 1,
        keywords: &["gas"],
    },
    ExpectedBusiness {
        name: "Grocery Store",
        expected: 2,
        keywords: &["grocery", "supermarket", "food store"],
    },
    ExpectedBusiness {
        name: "Auto Services",
        expected: 2,
        keywords: &["auto"],
    },
];

impl ExpectedBusiness {
    fn current_count(&self, categories: &BTreeMap<String, usize>) -> usize {
        categories
            .iter()
            .filter(|(name, _)| {
                let lower = name.to_lowercase();
                self.keywords.iter().any(|k| lower.contains(*k))
            })
            .map(|(_, count)| count)
            .sum()
    }
}

/// Share of the expected count that is missing.
pub fn gap_severity(current: usize, expected: usize) -> GapSeverity {
    if expected == 0 {
        return GapSeverity::Low;
    }
    let ratio = expected.saturating_sub(current) as f64 / expected as f64;
    if ratio >= 0.8 {
        GapSeverity::Critical
    } else if ratio >= 0.5 {
        GapSeverity::High
    } else if ratio >= 0.3 {
        GapSeverity::Medium
    } else {
        GapSeverity::Low
    }
}

/// Two points per missing place, scaled by market size (0 at an empty market, x2 from 100 places).
pub fn gap_opportunity_score(current: usize, expected: usize, total: usize) -> f64 {
    let gap = expected.saturating_sub(current) as f64;
    let size = (total as f64 / 50.0).min(2.0);
    round1(clamp_score(gap * 2.0 * size))
}

/// Staple types below their expected count, highest opportunity first; ties keep table order.
pub fn market_gaps(categories: &BTreeMap<String, usize>, total: usize) -> Vec<MarketGap> {
    let mut gaps: Vec<MarketGap> = EXPECTED
        .iter()
        .filter_map(|e| {
            let current = e.current_count(categories);
            (current < e.expected).then(|| MarketGap {
                business_type: e.name,
                current_count: current,
                expected_count: e.expected,
                gap_size: e.expected - current,
                severity: gap_severity(current, e.expected),
                opportunity_score: gap_opportunity_score(current, e.expected, total),
            })
        })
        .collect();
    gaps.sort_by(|a, b| b.opportunity_score.total_cmp(&a.opportunity_score));
    gaps
}

/// Average rating mapped onto the score scale, neutral when nothing is rated.
fn quality_score(places: &[PlaceRecord]) -> f64 {
    clamp_score(average_rating(places).unwrap_or(NEUTRAL_RATING))
}

fn health_assessment(score: f64) -> &'static str {
    if score >= 8.0 {
        "Thriving market with strong fundamentals"
    } else if score >= 6.0 {
        "Healthy market with good potential"
    } else if score >= 4.0 {
        "Developing market with mixed indicators"
    } else {
        "Challenging market conditions - careful analysis required"
    }
}

/// 30% category diversity, 40% service quality, 30% activity (one point per five places).
pub fn market_health(places: &[PlaceRecord], distinct_categories: usize) -> MarketHealth {
    if places.is_empty() {
        return MarketHealth {
            health_score: 0.0,
            indicators: None,
            assessment: health_assessment(0.0),
        };
    }
    let indicators = HealthIndicators {
        business_diversity: round1(diversity_score(distinct_categories)),
        service_quality: round1(quality_score(places)),
        market_activity: round1(clamp_score(places.len() as f64 / 5.0)),
    };
    let score = indicators.business_diversity * 0.3
        + indicators.service_quality * 0.4
        + indicators.market_activity * 0.3;
    MarketHealth {
        health_score: round1(score),
        indicators: Some(indicators),
        assessment: health_assessment(score),
    }
}

/// Scores moderate counts best: rising to 7 at 20 places, 10 from 20 to 50, then one point
/// off per ten extra places down to 3.
pub fn location_density_factor(count: usize) -> f64 {
    let n = count as f64;
    if count < 20 {
        n / 20.0 * 7.0
    } else if count < 50 {
        10.0
    } else {
        (10.0 - (n - 50.0) / 10.0).max(3.0)
    }
}

fn location_recommendation(score: f64) -> &'static str {
    if score >= 8.0 {
        "Excellent location with strong market potential"
    } else if score >= 6.0 {
        "Good location with moderate opportunities"
    } else if score >= 4.0 {
        "Average location - consider market positioning carefully"
    } else {
        "Challenging location - strong differentiation required"
    }
}

const EMPTY_LOCATION_SCORE: f64 = 5.0;

/// 40% density, 30% diversity (one point per three categories), 30% area quality.
pub fn location_score(places: &[PlaceRecord], distinct_categories: usize) -> LocationScore {
    if places.is_empty() {
        return LocationScore {
            score: EMPTY_LOCATION_SCORE,
            factors: None,
            recommendation: location_recommendation(EMPTY_LOCATION_SCORE),
        };
    }
    let factors = LocationFactors {
        business_density: round1(location_density_factor(places.len())),
        business_diversity: round1(clamp_score(distinct_categories as f64 / 3.0)),
        area_quality: round1(quality_score(places)),
    };
    let score = factors.business_density * 0.4
        + factors.business_diversity * 0.3
        + factors.area_quality * 0.3;
    LocationScore {
        score: round1(score),
        factors: Some(factors),
        recommendation: location_recommendation(score),
    }
}

pub fn scan(places: &[PlaceRecord], radius_m: u32, focus_industry: Option<&str>) -> MarketScanReport {
    let total = places.len();
    let categories = category_counts(places);
    let per_km2 = businesses_per_km2(total, radius_m);
    let density = density_score(per_km2);
    let diversity = diversity_score(categories.len());

    let opportunities = opportunities(&categories, total, focus_industry);
    let market_gaps = market_gaps(&categories, total);
    let market_health = market_health(places, categories.len());
    let location_score = location_score(places, categories.len());

    MarketScanReport {
        market_data: MarketData {
            total_businesses: total,
            market_score: market_score(density, diversity),
            radius_m,
            businesses_per_km2: round1(per_km2),
            density_score: round1(density),
            diversity_score: round1(diversity),
            saturation_level: saturation_level(density),
            categories,
            market_health,
            location_score,
        },
        opportunities,
        market_gaps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(i: usize, category: &str) -> PlaceRecord {
        PlaceRecord {
            id: format!("p{i}"),
            name: format!("Place {i}"),
            category: category.to_string(),
            distance_m: 100 + i as u32,
            address: String::new(),
            hours: None,
            rating: None,
        }
    }

    fn twelve_across_four() -> Vec<PlaceRecord> {
        ["Coffee Shop", "Restaurant", "Fitness Center", "Bank"]
            .iter()
            .cycle()
            .take(12)
            .enumerate()
            .map(|(i, c)| place(i, c))
            .collect()
    }

    #[test]
    fn twelve_places_across_four_categories() {
        let report = scan(&twelve_across_four(), 2000, None);
        assert_eq!(report.market_data.total_businesses, 12);
        assert_eq!(report.market_data.categories.len(), 4);
        assert_eq!(report.market_data.diversity_score, 2.0);
        assert_eq!(report.market_data.saturation_level, Level::Low);
        assert!(!report.opportunities.is_empty());
        assert!(report.opportunities.len() <= MAX_OPPORTUNITIES);
        for o in &report.opportunities {
            assert!((0.0..=10.0).contains(&o.score), "{o:?}");
        }
        // Three coffee shops exceed the threshold of two.
        assert!(report
            .opportunities
            .iter()
            .all(|o| o.category != "Specialty Coffee Shop"));
    }

    #[test]
    fn scores_stay_bounded_for_any_radius() {
        let many: Vec<_> = (0..50)
            .map(|i| place(i, &format!("Category {}", i % 25)))
            .collect();
        for radius in [1, 10, 100, 1000, 5000, 20_000, 50_000] {
            for places in [&many[..], &many[..3], &[][..]] {
                let report = scan(places, radius, None);
                let score = report.market_data.market_score;
                assert!((0.0..=10.0).contains(&score), "radius={radius} score={score}");
                for o in &report.opportunities {
                    assert!((0.0..=10.0).contains(&o.score));
                }
            }
        }
    }

    #[test]
    fn ordering_is_score_desc_then_name_asc() {
        let report = scan(&[], 1000, None);
        let ops = &report.opportunities;
        assert_eq!(ops.len(), MAX_OPPORTUNITIES);
        for pair in ops.windows(2) {
            assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].category < pair[1].category),
                "{pair:?}"
            );
        }
        // Empty market: gap-only scores.
        assert_eq!(ops[0].category, "Healthy Fast Food");
        assert_eq!(ops[0].score, 10.0);
        assert_eq!(ops[0].market_gap, 5);
    }

    #[test]
    fn opportunity_score_formula() {
        assert_eq!(opportunity_score(0, 2, 0, 1.2), 4.8);
        assert_eq!(opportunity_score(2, 2, 40, 1.0), 2.0);
        assert_eq!(opportunity_score(0, 5, 200, 1.1), 10.0);
        assert_eq!(opportunity_score(3, 1, 0, 1.0), 0.0);
    }

    #[test]
    fn focus_industry_filters_case_insensitively() {
        let report = scan(&twelve_across_four(), 1000, Some("  FITNESS "));
        assert_eq!(report.opportunities.len(), 1);
        assert_eq!(report.opportunities[0].category, "Fitness Studio");
        assert_eq!(report.opportunities[0].current_count, 3);
        assert_eq!(report.opportunities[0].market_gap, 0);

        let none = scan(&twelve_across_four(), 1000, Some("submarine"));
        assert!(none.opportunities.is_empty());
    }

    #[test]
    fn focus_applies_before_truncation() {
        let unfocused = scan(&[], 1000, None);
        assert!(unfocused.opportunities.iter().all(|o| o.category != "Laundromat"));

        let focused = scan(&[], 1000, Some("laundromat"));
        assert_eq!(focused.opportunities.len(), 1);
        assert_eq!(focused.opportunities[0].category, "Laundromat");
        assert_eq!(focused.opportunities[0].score, 2.0);
    }

    #[test]
    fn keyword_matching_uses_category_names() {
        let places = vec![place(0, "Pet Store"), place(1, "Veterinarian"), place(2, "Yoga Studio")];
        let counts = category_counts(&places);
        let pets = REFERENCE.iter().find(|r| r.name == "Pet Services").unwrap();
        assert_eq!(pets.current_count(&counts), 2);

        let report = scan(&places, 1000, None);
        assert!(report.opportunities.iter().all(|o| o.category != "Pet Services"));
    }

    #[test]
    fn saturation_thresholds() {
        assert_eq!(saturation_level(0.0), Level::Low);
        assert_eq!(saturation_level(2.9), Level::Low);
        assert_eq!(saturation_level(3.0), Level::Medium);
        assert_eq!(saturation_level(6.9), Level::Medium);
        assert_eq!(saturation_level(7.0), Level::High);
        assert_eq!(saturation_level(10.0), Level::High);
    }

    #[test]
    fn saturation_follows_density_not_count() {
        // 60 places spread over 5 km is still sparse.
        let many: Vec<_> = (0..60).map(|i| place(i, "Restaurant")).collect();
        let sparse = scan(&many, 5000, None);
        assert_eq!(sparse.market_data.saturation_level, Level::Low);

        // 15 places inside 200 m is packed.
        let packed = scan(&many[..15], 200, None);
        assert_eq!(packed.market_data.density_score, 10.0);
        assert_eq!(packed.market_data.saturation_level, Level::High);
    }

    #[test]
    fn expected_table_counts() {
        let expected = |name: &str| EXPECTED.iter().find(|e| e.name == name).unwrap().expected;
        assert_eq!(expected("Coffee Shop"), 3);
        assert_eq!(expected("Restaurant"), 8);
        assert_eq!(expected("Pharmacy"), 1);
        assert_eq!(EXPECTED.len(), 10);
    }

    #[test]
    fn gap_severity_thresholds() {
        assert_eq!(gap_severity(0, 1), GapSeverity::Critical);
        assert_eq!(gap_severity(1, 5), GapSeverity::Critical);
        assert_eq!(gap_severity(2, 5), GapSeverity::High);
        assert_eq!(gap_severity(4, 8), GapSeverity::High);
        assert_eq!(gap_severity(5, 8), GapSeverity::Medium);
        assert_eq!(gap_severity(7, 10), GapSeverity::Medium);
        assert_eq!(gap_severity(6, 8), GapSeverity::Low);
        assert_eq!(gap_severity(3, 3), GapSeverity::Low);
    }

    #[test]
    fn gap_score_scales_with_market_size() {
        assert_eq!(gap_opportunity_score(0, 3, 0), 0.0);
        assert_eq!(gap_opportunity_score(0, 3, 25), 3.0);
        assert_eq!(gap_opportunity_score(0, 3, 50), 6.0);
        assert_eq!(gap_opportunity_score(0, 8, 100), 10.0);
        assert_eq!(gap_opportunity_score(1, 2, 500), 4.0);
    }

    #[test]
    fn gaps_for_twelve_places() {
        let places = twelve_across_four();
        let gaps = market_gaps(&category_counts(&places), places.len());
        let names: Vec<&str> = gaps.iter().map(|g| g.business_type).collect();
        assert_eq!(
            names,
            [
                "Restaurant",
                "Convenience Store",
                "Beauty Salon",
                "Grocery Store",
                "Auto Services",
                "Pharmacy",
                "Gas Station",
            ]
        );
        let restaurant = &gaps[0];
        assert_eq!(restaurant.current_count, 3);
        assert_eq!(restaurant.gap_size, 5);
        assert_eq!(restaurant.severity, GapSeverity::High);
        assert_eq!(restaurant.opportunity_score, 2.4);
        assert_eq!(gaps[1].severity, GapSeverity::Critical);
        assert_eq!(gaps[1].opportunity_score, 1.0);
        assert_eq!(gaps[6].opportunity_score, 0.5);
    }

    #[test]
    fn health_blend_and_assessment() {
        let places = twelve_across_four();
        let health = market_health(&places, 4);
        let indicators = health.indicators.clone().unwrap();
        assert_eq!(indicators.business_diversity, 2.0);
        assert_eq!(indicators.service_quality, 7.0);
        assert_eq!(indicators.market_activity, 2.4);
        assert_eq!(health.health_score, 4.1);
        assert_eq!(health.assessment, "Developing market with mixed indicators");

        let rated: Vec<_> = (0..50)
            .map(|i| PlaceRecord {
                rating: Some(9.0),
                ..place(i, &format!("Category {}", i % 20))
            })
            .collect();
        let thriving = market_health(&rated, 20);
        assert_eq!(thriving.health_score, 9.6);
        assert_eq!(thriving.assessment, "Thriving market with strong fundamentals");

        let empty = market_health(&[], 0);
        assert_eq!(empty.health_score, 0.0);
        assert!(empty.indicators.is_none());
    }

    #[test]
    fn location_density_prefers_moderate_counts() {
        assert_eq!(location_density_factor(0), 0.0);
        assert_eq!(location_density_factor(10), 3.5);
        assert_eq!(location_density_factor(20), 10.0);
        assert_eq!(location_density_factor(49), 10.0);
        assert_eq!(location_density_factor(50), 10.0);
        assert_eq!(location_density_factor(100), 5.0);
        assert_eq!(location_density_factor(500), 3.0);
    }

    #[test]
    fn location_score_blend() {
        let score = location_score(&twelve_across_four(), 4);
        let factors = score.factors.clone().unwrap();
        assert_eq!(factors.business_density, 4.2);
        assert_eq!(factors.business_diversity, 1.3);
        assert_eq!(factors.area_quality, 7.0);
        assert_eq!(score.score, 4.2);
        assert_eq!(score.recommendation, "Average location - consider market positioning carefully");

        let empty = location_score(&[], 0);
        assert_eq!(empty.score, 5.0);
        assert!(empty.factors.is_none());
    }

    #[test]
    fn scan_carries_gaps_health_and_location() {
        let report = scan(&twelve_across_four(), 2000, None);
        assert_eq!(report.market_gaps.len(), 7);
        assert_eq!(report.market_data.market_health.health_score, 4.1);
        assert_eq!(report.market_data.location_score.score, 4.2);
    }
}
