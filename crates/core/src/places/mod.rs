pub mod clean;
pub mod foursquare;
pub mod types;

use crate::domain::business::BusinessType;
use crate::domain::place::PlaceRecord;
use crate::error::IntelResult;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceQuery {
    pub location: String,
    pub category: Option<BusinessType>,
    pub radius_m: u32,
    pub limit: u32,
}

/// Where to center a search: a free-text place name, or explicit coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchArea<'a> {
    Near(&'a str),
    LatLng { lat: f64, lng: f64 },
}

impl PlaceQuery {
    pub fn area(&self) -> SearchArea<'_> {
        match parse_coordinates(&self.location) {
            Some((lat, lng)) => SearchArea::LatLng { lat, lng },
            None => SearchArea::Near(self.location.trim()),
        }
    }
}

/// Accepts `"lat,lng"` with both parts in range; anything else is a place name.
pub fn parse_coordinates(location: &str) -> Option<(f64, f64)> {
    let (lat, lng) = location.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
        Some((lat, lng))
    } else {
        None
    }
}

#[async_trait::async_trait]
pub trait PlacesClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Places near `query.location`, in the order the provider returns them.
    async fn search(&self, query: &PlaceQuery) -> IntelResult<Vec<PlaceRecord>>;
}
