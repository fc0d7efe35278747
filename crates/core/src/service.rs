use crate::config::Settings;
use crate::domain::business::BusinessType;
use crate::domain::place::PlaceRecord;
use crate::domain::report::{CompetitorReport, HoursReport, MarketScanReport};
use crate::error::{IntelError, IntelResult};
use crate::metrics;
use crate::places::foursquare::FoursquareClient;
use crate::places::{PlaceQuery, PlacesClient};
use serde::Deserialize;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Uncategorized market scans pull as many places as one upstream page allows.
pub const MARKET_SCAN_LIMIT: u32 = 50;
const PROBE_LIMIT: u32 = 1;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitorRequest {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HoursRequest {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub current_hours: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketScanRequest {
    #[serde(default)]
    pub location: Option<String>,
    /// Number or numeric string; anything unparseable falls back to the default radius.
    #[serde(default)]
    pub radius: Option<serde_json::Value>,
    #[serde(default)]
    pub focus_industry: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    pub default_radius_m: u32,
    pub max_radius_m: u32,
    pub max_competitors: u32,
}

impl ServiceOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            default_radius_m: settings.default_search_radius,
            max_radius_m: settings.max_search_radius,
            max_competitors: settings.max_competitors,
        }
    }
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Validates requests, makes exactly one places search per operation and runs the metrics over
/// the result.
#[derive(Clone)]
pub struct IntelService {
    places: Arc<dyn PlacesClient>,
    options: ServiceOptions,
}

impl IntelService {
    pub fn new(places: Arc<dyn PlacesClient>, options: ServiceOptions) -> Self {
        Self { places, options }
    }

    /// Service backed by the Foursquare client. Fails when the API key is missing.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = FoursquareClient::from_settings(settings)?;
        Ok(Self::new(
            Arc::new(client),
            ServiceOptions::from_settings(settings),
        ))
    }

    pub async fn analyze_competitors(&self, req: &CompetitorRequest) -> IntelResult<CompetitorReport> {
        let location = required_location(req.location.as_deref())?;
        let business_type = required_business_type(req.business_type.as_deref())?;

        let span = request_span("competitors");
        async move {
            let radius_m = self.options.default_radius_m.min(self.options.max_radius_m);
            let query = PlaceQuery {
                location,
                category: Some(business_type),
                radius_m,
                limit: self.options.max_competitors,
            };
            let competitors = self.search(&query).await?;
            let analysis = metrics::competitors::analyze(&competitors, radius_m);

            tracing::info!(
                %business_type,
                total = analysis.total_competitors,
                density = ?analysis.market_density,
                competition = ?analysis.competition_level,
                "competitor analysis completed"
            );
            Ok(CompetitorReport {
                competitors,
                analysis,
            })
        }
        .instrument(span)
        .await
    }

    pub async fn optimize_hours(&self, req: &HoursRequest) -> IntelResult<HoursReport> {
        let location = required_location(req.location.as_deref())?;
        let business_type = required_business_type(req.business_type.as_deref())?;
        let current_hours = req
            .current_hours
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let span = request_span("hours");
        async move {
            let query = PlaceQuery {
                location,
                category: Some(business_type),
                radius_m: self.options.default_radius_m.min(self.options.max_radius_m),
                limit: self.options.max_competitors,
            };
            let local = self.search(&query).await?;

            let recommendation = metrics::hours::recommend(business_type, &local);
            let hours_analysis = metrics::hours::analyze_local_hours(&local);

            tracing::info!(
                %business_type,
                business_count = local.len(),
                reporting_hours = hours_analysis.sample_size,
                "hours optimization completed"
            );
            Ok(HoursReport {
                recommendation,
                hours_analysis,
                business_count: local.len(),
                current_hours,
            })
        }
        .instrument(span)
        .await
    }

    pub async fn scan_market(&self, req: &MarketScanRequest) -> IntelResult<MarketScanReport> {
        let location = required_location(req.location.as_deref())?;
        let radius_m = resolve_radius(req.radius.as_ref(), self.options)?;
        let focus = req
            .focus_industry
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let span = request_span("market_scan");
        async move {
            let query = PlaceQuery {
                location,
                category: None,
                radius_m,
                limit: MARKET_SCAN_LIMIT,
            };
            let places = self.search(&query).await?;
            let report = metrics::market::scan(&places, radius_m, focus);

            tracing::info!(
                radius_m,
                total = report.market_data.total_businesses,
                market_score = report.market_data.market_score,
                opportunities = report.opportunities.len(),
                "market scan completed"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// One-result search to confirm the places provider is reachable with the configured key.
    pub async fn check_connection(&self, location: &str) -> IntelResult<usize> {
        let location = required_location(Some(location))?;
        let query = PlaceQuery {
            location,
            category: None,
            radius_m: self.options.default_radius_m.min(self.options.max_radius_m),
            limit: PROBE_LIMIT,
        };
        let places = self
            .search(&query)
            .instrument(request_span("check"))
            .await?;
        Ok(places.len())
    }

    async fn search(&self, query: &PlaceQuery) -> IntelResult<Vec<PlaceRecord>> {
        let provider = self.places.provider_name();
        match self.places.search(query).await {
            Ok(places) => Ok(places),
            Err(err) => {
                tracing::warn!(provider, kind = err.kind(), error = %err, "places search failed");
                Err(err)
            }
        }
    }
}

fn request_span(operation: &'static str) -> tracing::Span {
    let request_id = Uuid::new_v4();
    tracing::info_span!("analysis", %request_id, operation)
}

fn required_location(location: Option<&str>) -> IntelResult<String> {
    match location.map(str::trim) {
        Some(l) if !l.is_empty() => Ok(l.to_string()),
        _ => Err(IntelError::validation("Location is required")),
    }
}

fn required_business_type(business_type: Option<&str>) -> IntelResult<BusinessType> {
    let raw = match business_type.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Err(IntelError::validation("Business type is required")),
    };
    BusinessType::standardize(raw).ok_or_else(|| {
        let supported: Vec<&str> = BusinessType::ALL.iter().map(|t| t.as_str()).collect();
        IntelError::validation(format!(
            "Unsupported business type \"{raw}\". Choose one of: {}",
            supported.join(", ")
        ))
    })
}

/// Absent or unparseable radius means the default; non-positive is rejected; oversize is clamped.
/// Fractional meters are truncated, with anything between 0 and 1 searched as 1.
pub fn resolve_radius(raw: Option<&serde_json::Value>, options: ServiceOptions) -> IntelResult<u32> {
    let parsed = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    let Some(radius) = parsed.filter(|r| r.is_finite()) else {
        return Ok(options.default_radius_m.min(options.max_radius_m));
    };
    if radius <= 0.0 {
        return Err(IntelError::validation("Radius must be a positive number of meters"));
    }

    let radius = radius.trunc().max(1.0);
    let max = f64::from(options.max_radius_m);
    if radius > max {
        tracing::debug!(requested = radius, max, "clamping search radius");
    }
    Ok(radius.min(max) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::Level;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingPlaces {
        calls: AtomicUsize,
        last_query: Mutex<Option<PlaceQuery>>,
        result: fn() -> IntelResult<Vec<PlaceRecord>>,
    }

    impl CountingPlaces {
        fn returning(result: fn() -> IntelResult<Vec<PlaceRecord>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
                result,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_query(&self) -> PlaceQuery {
            self.last_query.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl PlacesClient for CountingPlaces {
        fn provider_name(&self) -> &'static str {
            "mock"
        }

        async fn search(&self, query: &PlaceQuery) -> IntelResult<Vec<PlaceRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.clone());
            (self.result)()
        }
    }

    fn place(i: usize, category: &str) -> PlaceRecord {
        PlaceRecord {
            id: format!("p{i}"),
            name: format!("Place {i}"),
            category: category.to_string(),
            distance_m: 50 * i as u32,
            address: format!("{i} Main Street"),
            hours: None,
            rating: Some(7.5),
        }
    }

    fn five_restaurants() -> IntelResult<Vec<PlaceRecord>> {
        Ok((0..5).map(|i| place(i, "Restaurant")).collect())
    }

    fn twelve_mixed() -> IntelResult<Vec<PlaceRecord>> {
        Ok(["Coffee Shop", "Restaurant", "Fitness Center", "Bank"]
            .iter()
            .cycle()
            .take(12)
            .enumerate()
            .map(|(i, c)| place(i, c))
            .collect())
    }

    fn upstream_down() -> IntelResult<Vec<PlaceRecord>> {
        Err(IntelError::Upstream(anyhow::anyhow!("HTTP 503")))
    }

    fn service(places: &Arc<CountingPlaces>) -> IntelService {
        IntelService::new(places.clone(), ServiceOptions::default())
    }

    #[tokio::test]
    async fn missing_inputs_never_reach_the_places_client() {
        let places = CountingPlaces::returning(five_restaurants);
        let svc = service(&places);

        let cases = [
            CompetitorRequest::default(),
            CompetitorRequest {
                location: Some("   ".to_string()),
                business_type: Some("restaurant".to_string()),
            },
            CompetitorRequest {
                location: Some("Austin, TX".to_string()),
                business_type: None,
            },
            CompetitorRequest {
                location: Some("Austin, TX".to_string()),
                business_type: Some("spaceport".to_string()),
            },
        ];
        for req in &cases {
            let err = svc.analyze_competitors(req).await.unwrap_err();
            assert_eq!(err.kind(), "validation", "{req:?}");
        }

        let err = svc.optimize_hours(&HoursRequest::default()).await.unwrap_err();
        assert_eq!(err.user_message(), "Location is required");

        let err = svc
            .scan_market(&MarketScanRequest {
                location: Some("Austin, TX".to_string()),
                radius: Some(json!(-5)),
                focus_industry: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");

        assert_eq!(places.calls(), 0);
    }

    #[tokio::test]
    async fn competitor_analysis_makes_one_category_search() {
        let places = CountingPlaces::returning(five_restaurants);
        let svc = service(&places);

        let report = svc
            .analyze_competitors(&CompetitorRequest {
                location: Some(" Austin, TX ".to_string()),
                business_type: Some("Coffee shop".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(places.calls(), 1);
        let q = places.last_query();
        assert_eq!(q.location, "Austin, TX");
        assert_eq!(q.category, Some(BusinessType::Restaurant));
        assert_eq!(q.limit, 20);
        assert_eq!(q.radius_m, 1000);

        assert_eq!(report.competitors.len(), 5);
        let ids: Vec<&str> = report.competitors.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p0", "p1", "p2", "p3", "p4"]);
        assert_eq!(report.analysis.market_density, Level::Medium);
    }

    #[tokio::test]
    async fn hours_echo_current_hours_and_use_same_category() {
        let places = CountingPlaces::returning(five_restaurants);
        let svc = service(&places);

        let report = svc
            .optimize_hours(&HoursRequest {
                location: Some("Austin, TX".to_string()),
                business_type: Some("fitness".to_string()),
                current_hours: Some(" 6am-9pm ".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(places.calls(), 1);
        assert_eq!(places.last_query().category, Some(BusinessType::Fitness));
        assert_eq!(report.business_count, 5);
        assert_eq!(report.current_hours.as_deref(), Some("6am-9pm"));
        assert_eq!(report.recommendation.weekly_schedule.iter().count(), 7);
        assert_eq!(report.hours_analysis.sample_size, 0);
    }

    #[tokio::test]
    async fn market_scan_over_twelve_places() {
        let places = CountingPlaces::returning(twelve_mixed);
        let svc = service(&places);

        let report = svc
            .scan_market(&MarketScanRequest {
                location: Some("Austin, TX".to_string()),
                radius: Some(json!(2000)),
                focus_industry: None,
            })
            .await
            .unwrap();

        assert_eq!(places.calls(), 1);
        let q = places.last_query();
        assert_eq!(q.category, None);
        assert_eq!(q.limit, MARKET_SCAN_LIMIT);
        assert_eq!(q.radius_m, 2000);

        assert_eq!(report.market_data.total_businesses, 12);
        assert!(!report.opportunities.is_empty());
        assert!(report.opportunities.iter().all(|o| o.score <= 10.0));
    }

    #[tokio::test]
    async fn upstream_failure_is_surfaced_not_replaced() {
        let places = CountingPlaces::returning(upstream_down);
        let svc = service(&places);

        let err = svc
            .scan_market(&MarketScanRequest {
                location: Some("Austin, TX".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(places.calls(), 1);
        assert_eq!(err.kind(), "upstream");
        assert!(!err.user_message().contains("503"));
    }

    #[tokio::test]
    async fn check_connection_requests_a_single_result() {
        let places = CountingPlaces::returning(five_restaurants);
        let svc = service(&places);

        assert_eq!(svc.check_connection("New York, NY").await.unwrap(), 5);
        assert_eq!(places.last_query().limit, 1);
        assert!(svc.check_connection("").await.is_err());
        assert_eq!(places.calls(), 1);
    }

    #[test]
    fn radius_resolution() {
        let opts = ServiceOptions::default();
        assert_eq!(resolve_radius(None, opts).unwrap(), 1000);
        assert_eq!(resolve_radius(Some(&json!(null)), opts).unwrap(), 1000);
        assert_eq!(resolve_radius(Some(&json!("abc")), opts).unwrap(), 1000);
        assert_eq!(resolve_radius(Some(&json!("1500")), opts).unwrap(), 1500);
        assert_eq!(resolve_radius(Some(&json!(2500.7)), opts).unwrap(), 2500);
        assert_eq!(resolve_radius(Some(&json!(50_000)), opts).unwrap(), 5000);
        assert_eq!(resolve_radius(Some(&json!(1)), opts).unwrap(), 1);
        assert_eq!(resolve_radius(Some(&json!(0.5)), opts).unwrap(), 1);
        assert_eq!(resolve_radius(Some(&json!("0.5")), opts).unwrap(), 1);
        assert_eq!(resolve_radius(Some(&json!(" 750.9 ")), opts).unwrap(), 750);
        assert!(resolve_radius(Some(&json!(0)), opts).is_err());
        assert!(resolve_radius(Some(&json!(0.0)), opts).is_err());
        assert!(resolve_radius(Some(&json!(-0.5)), opts).is_err());
        assert!(resolve_radius(Some(&json!("-10")), opts).is_err());
    }
}
