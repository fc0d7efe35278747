//! Derived statistics over a list of places. Everything here is pure and deterministic.

pub mod competitors;
pub mod hours;
pub mod market;

use std::f64::consts::PI;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

/// Ratings stay on the upstream 0-10 scale.
pub const RATING_SCALE: f64 = 10.0;
/// Assumed rating when nobody nearby has one (3.5 stars).
pub const NEUTRAL_RATING: f64 = 7.0;

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Bounded to the score scale, with non-finite input treated as the minimum.
pub fn clamp_score(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(SCORE_MIN, SCORE_MAX)
    } else {
        SCORE_MIN
    }
}

/// Places per square kilometre over a circle of `radius_m`.
pub fn businesses_per_km2(count: usize, radius_m: u32) -> f64 {
    if radius_m == 0 {
        return 0.0;
    }
    let radius_km = f64::from(radius_m) / 1000.0;
    count as f64 / (PI * radius_km * radius_km)
}

pub fn density_score(per_km2: f64) -> f64 {
    clamp_score(per_km2 / 10.0)
}
