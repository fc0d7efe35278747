use crate::config::Settings;
use crate::domain::place::PlaceRecord;
use crate::error::{IntelError, IntelResult};
use crate::places::clean::into_place_record;
use crate::places::types::SearchResponse;
use crate::places::{PlaceQuery, PlacesClient, SearchArea};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use std::time::Duration;

const SEARCH_PATH: &str = "/places/search";
const SEARCH_FIELDS: &str = "fsq_id,name,categories,location,distance,hours,rating";
const UPSTREAM_MAX_RADIUS: u32 = 100_000;
const UPSTREAM_MAX_LIMIT: u32 = 50;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct FoursquareClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retries: u32,
}

/// How a single attempt failed: worth another try, or final.
#[derive(Debug)]
enum AttemptError {
    Transient(anyhow::Error),
    Fatal(IntelError),
}

impl FoursquareClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_foursquare_api_key()?.to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.places_timeout_secs))
            .build()
            .context("failed to build places http client")?;

        Ok(Self {
            http,
            base_url: settings.foursquare_base_url.clone(),
            api_key,
            retries: settings.places_retries.min(1),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH)
    }

    fn headers(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.api_key).context("FOURSQUARE_API_KEY is not a valid header")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn search_once(&self, query: &PlaceQuery) -> Result<Vec<PlaceRecord>, AttemptError> {
        let headers = self
            .headers()
            .map_err(|e| AttemptError::Fatal(IntelError::Internal(e)))?;

        let res = self
            .http
            .get(self.url())
            .headers(headers)
            .query(&search_params(query))
            .send()
            .await
            .map_err(|e| {
                let transient = e.is_timeout() || e.is_connect();
                let err = anyhow::Error::new(e).context("places request failed");
                if transient {
                    AttemptError::Transient(err)
                } else {
                    AttemptError::Fatal(IntelError::Upstream(err))
                }
            })?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read places response")
            .map_err(AttemptError::Transient)?;

        if let Some(err) = classify_status(status, &text, &query.location) {
            return Err(err);
        }

        parse_search_response(&text).map_err(|e| AttemptError::Fatal(IntelError::Upstream(e)))
    }
}

#[async_trait::async_trait]
impl PlacesClient for FoursquareClient {
    fn provider_name(&self) -> &'static str {
        "foursquare"
    }

    async fn search(&self, query: &PlaceQuery) -> IntelResult<Vec<PlaceRecord>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.search_once(query).await {
                Ok(places) => {
                    tracing::debug!(
                        attempt,
                        results = places.len(),
                        category = ?query.category,
                        radius_m = query.radius_m,
                        "places search completed"
                    );
                    return Ok(places);
                }
                Err(AttemptError::Fatal(err)) => return Err(err),
                Err(AttemptError::Transient(err)) => {
                    if attempt > self.retries {
                        return Err(IntelError::Upstream(err));
                    }
                    tracing::warn!(attempt, backoff = ?RETRY_BACKOFF, error = %err, "places search failed; retrying");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
            }
        }
    }
}

fn search_params(query: &PlaceQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(7);
    if let Some(category) = query.category {
        params.push(("query", category.search_query().to_string()));
    }
    match query.area() {
        SearchArea::Near(name) => params.push(("near", name.to_string())),
        SearchArea::LatLng { lat, lng } => params.push(("ll", format!("{lat},{lng}"))),
    }
    params.push(("radius", query.radius_m.min(UPSTREAM_MAX_RADIUS).to_string()));
    params.push(("limit", query.limit.clamp(1, UPSTREAM_MAX_LIMIT).to_string()));
    params.push(("sort", "DISTANCE".to_string()));
    params.push(("fields", SEARCH_FIELDS.to_string()));
    params
}

/// `None` for success statuses. 400 means the upstream could not resolve the location.
fn classify_status(status: StatusCode, body: &str, location: &str) -> Option<AttemptError> {
    if status.is_success() {
        return None;
    }

    let detail = anyhow::anyhow!("places HTTP {status}: {}", truncate(body, 300));
    Some(if status == StatusCode::BAD_REQUEST {
        tracing::info!(%status, location, error = %detail, "places upstream rejected location");
        AttemptError::Fatal(IntelError::validation(format!(
            "Could not find the location \"{location}\". Please check the address and try again."
        )))
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        AttemptError::Transient(detail)
    } else {
        AttemptError::Fatal(IntelError::Upstream(detail))
    })
}

fn parse_search_response(text: &str) -> anyhow::Result<Vec<PlaceRecord>> {
    let parsed = serde_json::from_str::<SearchResponse>(text)
        .with_context(|| format!("places response is not valid JSON: {}", truncate(text, 300)))?;
    Ok(parsed
        .results
        .into_iter()
        .filter_map(into_place_record)
        .collect())
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
